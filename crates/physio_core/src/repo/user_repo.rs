//! Credential ("auth base") records keyed by CPF.
//!
//! # Invariants
//! - Records live at `users/<cpf>` with CPF digits as the key.
//! - CPF values never reach the logs.

use super::{decode_record, encode_record, record_path, RepoError, RepoResult, USERS_ROOT};
use crate::model::user::UserRecord;
use crate::tree::TreeStore;
use log::info;
use serde_json::{Map, Value};

pub struct UserRepository<'s, S: TreeStore + ?Sized> {
    store: &'s S,
}

impl<'s, S: TreeStore + ?Sized> UserRepository<'s, S> {
    pub fn new(store: &'s S) -> Self {
        Self { store }
    }

    /// Creates or replaces the credential for `cpf`.
    pub fn put(&self, cpf: &str, user: &UserRecord) -> RepoResult<()> {
        let path = record_path(USERS_ROOT, &[cpf])?;
        self.store.set(&path, &encode_record(&path, user)?)?;
        info!(
            "event=user_put module=repo status=ok linked_id={} kind={:?}",
            user.id, user.kind
        );
        Ok(())
    }

    pub fn get(&self, cpf: &str) -> RepoResult<Option<UserRecord>> {
        let path = record_path(USERS_ROOT, &[cpf])?;
        self.store
            .get(&path)?
            .map(|value| decode_record(&path, value))
            .transpose()
    }

    pub fn delete(&self, cpf: &str) -> RepoResult<()> {
        let path = record_path(USERS_ROOT, &[cpf])?;
        if !self.store.remove(&path)? {
            return Err(RepoError::NotFound("user credential".to_string()));
        }
        info!("event=user_delete module=repo status=ok");
        Ok(())
    }

    /// Overwrites the listed stored fields of an existing credential.
    ///
    /// Field names use the stored shape (`ativo`, `nome`, ...).
    pub fn update_fields(&self, cpf: &str, fields: &Map<String, Value>) -> RepoResult<()> {
        let path = record_path(USERS_ROOT, &[cpf])?;
        let Some(current) = self.store.get(&path)? else {
            return Err(RepoError::NotFound("user credential".to_string()));
        };

        let Value::Object(mut merged) = current else {
            return Err(RepoError::InvalidData(format!(
                "credential at {} is not an object",
                USERS_ROOT
            )));
        };
        for (key, value) in fields {
            merged.insert(key.clone(), value.clone());
        }
        decode_record::<UserRecord>(&path, Value::Object(merged))?;

        self.store.update(&path, fields)?;
        info!(
            "event=user_update module=repo status=ok fields={}",
            fields.len()
        );
        Ok(())
    }

    pub fn set_active(&self, cpf: &str, active: bool) -> RepoResult<()> {
        let mut fields = Map::new();
        fields.insert("ativo".to_string(), Value::Bool(active));
        self.update_fields(cpf, &fields)
    }
}
