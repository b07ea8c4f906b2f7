//! Sequential record keys.
//!
//! # Responsibility
//! - Hand out increasing integer keys per entity kind (and per patient for
//!   evaluations) from counters under `keys/`.
//!
//! # Invariants
//! - The first key of a counter is `"1"`.
//! - Keys are unique per counter: allocation relies on `TreeStore::increment`
//!   being atomic, so concurrent writers never share a key.

use super::{record_path, RepoResult, KEYS_ROOT};
use crate::tree::TreeStore;
use log::info;

/// Entity kinds that draw keys from a counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyKind {
    Physiotherapist,
    Patient,
    Evaluation,
}

impl KeyKind {
    /// Counter name under `keys/`.
    pub fn counter_name(self) -> &'static str {
        match self {
            Self::Physiotherapist => "fisioterapeuta",
            Self::Patient => "paciente",
            Self::Evaluation => "avaliacao",
        }
    }
}

/// Counter-backed key allocator.
pub struct KeyAllocator<'s, S: TreeStore + ?Sized> {
    store: &'s S,
}

impl<'s, S: TreeStore + ?Sized> KeyAllocator<'s, S> {
    pub fn new(store: &'s S) -> Self {
        Self { store }
    }

    /// Allocates the next key of `kind`, optionally namespaced by `sub_key`
    /// (the patient id for evaluations).
    pub fn next_key(&self, kind: KeyKind, sub_key: Option<&str>) -> RepoResult<String> {
        let path = match sub_key {
            Some(sub_key) => record_path(KEYS_ROOT, &[kind.counter_name(), sub_key])?,
            None => record_path(KEYS_ROOT, &[kind.counter_name()])?,
        };
        let value = self.store.increment(&path)?;
        info!(
            "event=key_allocate module=repo status=ok counter={} scoped={} value={}",
            kind.counter_name(),
            sub_key.is_some(),
            value
        );
        Ok(value.to_string())
    }
}
