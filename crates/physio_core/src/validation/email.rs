//! Lightweight email syntax check used by registration forms.
//!
//! This is a positional check, not an RFC 5322 grammar.

const MIN_DOMAIN_CHARS: usize = 3;

/// Returns whether `email` looks like `local@domain.tld`.
///
/// Rules, applied around the first `@`:
/// - the local part is non-empty;
/// - the domain has at least three characters;
/// - neither part contains another `@` or whitespace;
/// - the domain has a `.` that is neither its first nor its last character.
pub fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };

    if local.is_empty() || domain.chars().count() < MIN_DOMAIN_CHARS {
        return false;
    }
    if domain.contains('@') {
        return false;
    }
    if local.chars().any(char::is_whitespace) || domain.chars().any(char::is_whitespace) {
        return false;
    }

    match (domain.find('.'), domain.rfind('.')) {
        (Some(first), Some(last)) => first >= 1 && last < domain.len() - 1,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::is_valid_email;

    #[test]
    fn accepts_simple_addresses() {
        assert!(is_valid_email("a@b.co"));
        assert!(is_valid_email("maria.silva@clinica.com.br"));
    }

    #[test]
    fn rejects_domain_without_dot() {
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("a@bcd"));
    }

    #[test]
    fn rejects_empty_local_part() {
        assert!(!is_valid_email("@b.co"));
    }

    #[test]
    fn rejects_spaces() {
        assert!(!is_valid_email("a b@c.co"));
        assert!(!is_valid_email("ab@c .co"));
    }

    #[test]
    fn rejects_dot_at_domain_edges() {
        assert!(!is_valid_email("a@b.co."));
        assert!(!is_valid_email("a@.bco"));
    }

    #[test]
    fn rejects_missing_or_repeated_at() {
        assert!(!is_valid_email("ab.co"));
        assert!(!is_valid_email("a@b@c.co"));
        assert!(!is_valid_email(""));
    }
}
