//! CPF (Brazilian taxpayer id) helpers.
//!
//! # Invariants
//! - A valid CPF has exactly 11 digits after stripping formatting.
//! - Both check digits follow the modulo-11 rule; remainders 10 and 11 map to 0.
//! - `00000000000` is always rejected even though its checksum matches.

use once_cell::sync::Lazy;
use regex::Regex;

const CPF_DIGITS: usize = 11;

static NON_DIGIT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\D").expect("valid non-digit regex"));
static GROUP_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d{3})(\d)").expect("valid cpf group regex"));
static CHECK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d{3})(\d{1,2})$").expect("valid cpf check regex"));

/// Keeps ASCII digits only.
pub fn strip_cpf(raw: &str) -> String {
    NON_DIGIT_RE.replace_all(raw, "").into_owned()
}

/// Validates the two modulo-11 check digits of a CPF.
///
/// Formatting characters (`.`, `-`, spaces) are ignored.
pub fn is_valid_cpf(raw: &str) -> bool {
    let stripped = strip_cpf(raw);
    let digits: Vec<u32> = stripped.chars().filter_map(|ch| ch.to_digit(10)).collect();
    if digits.len() != CPF_DIGITS || digits.iter().all(|digit| *digit == 0) {
        return false;
    }

    check_digit(&digits[..9]) == digits[9] && check_digit(&digits[..10]) == digits[10]
}

fn check_digit(prefix: &[u32]) -> u32 {
    let weight_start = prefix.len() as u32 + 1;
    let sum: u32 = prefix
        .iter()
        .enumerate()
        .map(|(index, digit)| digit * (weight_start - index as u32))
        .sum();
    let remainder = (sum * 10) % 11;
    if remainder == 10 {
        0
    } else {
        remainder
    }
}

/// Applies the `XXX.XXX.XXX-XX` mask progressively, so partial input typed
/// into a form is masked as far as it goes.
pub fn format_cpf(raw: &str) -> String {
    let mut formatted = strip_cpf(raw);
    if formatted.len() >= 3 {
        formatted = GROUP_RE.replacen(&formatted, 1, "${1}.${2}").into_owned();
    }
    if formatted.len() >= 6 {
        formatted = GROUP_RE.replacen(&formatted, 1, "${1}.${2}").into_owned();
    }
    if formatted.len() >= 9 {
        formatted = CHECK_RE.replacen(&formatted, 1, "${1}-${2}").into_owned();
    }
    formatted
}

#[cfg(test)]
mod tests {
    use super::{format_cpf, is_valid_cpf, strip_cpf};

    #[test]
    fn accepts_known_valid_cpf_with_or_without_mask() {
        assert!(is_valid_cpf("11144477735"));
        assert!(is_valid_cpf("111.444.777-35"));
        assert!(is_valid_cpf("529.982.247-25"));
    }

    #[test]
    fn rejects_all_zero_cpf() {
        assert!(!is_valid_cpf("00000000000"));
        assert!(!is_valid_cpf("000.000.000-00"));
    }

    #[test]
    fn rejects_wrong_check_digits() {
        assert!(!is_valid_cpf("11144477736"));
        assert!(!is_valid_cpf("11144477745"));
    }

    #[test]
    fn rejects_wrong_length() {
        assert!(!is_valid_cpf(""));
        assert!(!is_valid_cpf("1114447773"));
        assert!(!is_valid_cpf("111444777350"));
        assert!(!is_valid_cpf("abc"));
    }

    #[test]
    fn strip_keeps_digits_only() {
        assert_eq!(strip_cpf(" 111.444.777-35 "), "11144477735");
    }

    #[test]
    fn formats_full_and_partial_input() {
        assert_eq!(format_cpf("11144477735"), "111.444.777-35");
        assert_eq!(format_cpf("111.444.777-35"), "111.444.777-35");
        assert_eq!(format_cpf("111"), "111");
        assert_eq!(format_cpf("1114"), "111.4");
        assert_eq!(format_cpf("1114447"), "111.444.7");
        assert_eq!(format_cpf("111444777"), "111.444.777");
        assert_eq!(format_cpf("1114447773"), "111.444.777-3");
    }
}
