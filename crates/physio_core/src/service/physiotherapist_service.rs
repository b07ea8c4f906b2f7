//! Physiotherapist registration use cases.
//!
//! # Invariants
//! - An email belongs to at most one physiotherapist (checked before write).
//! - Every saved physiotherapist has a credential (`tipo = "F"`) at its CPF.

use super::credentials::{ensure_cpf_available, remove_linked_credential, replace_credential};
use super::{Profile, ServiceError, ServiceResult};
use crate::model::physiotherapist::Physiotherapist;
use crate::model::user::{UserKind, UserRecord};
use crate::model::Keyed;
use crate::repo::physiotherapist_repo::PhysiotherapistRepository;
use crate::repo::user_repo::UserRepository;
use crate::tree::TreeStore;
use crate::validation::cpf::format_cpf;
use crate::validation::form::PersonForm;
use log::{info, warn};

pub struct PhysiotherapistService<'s, S: TreeStore + ?Sized> {
    store: &'s S,
}

impl<'s, S: TreeStore + ?Sized> PhysiotherapistService<'s, S> {
    pub fn new(store: &'s S) -> Self {
        Self { store }
    }

    fn records(&self) -> PhysiotherapistRepository<'s, S> {
        PhysiotherapistRepository::new(self.store)
    }

    fn users(&self) -> UserRepository<'s, S> {
        UserRepository::new(self.store)
    }

    /// Saves the registration screen.
    ///
    /// `existing_id = None` creates a record under a freshly allocated key;
    /// `Some(id)` replaces record `id`, which must exist.
    ///
    /// # Errors
    /// - `Form` when a field fails validation.
    /// - `EmailTaken` when another physiotherapist uses the email.
    /// - `CpfTaken` when the CPF has a credential linked elsewhere.
    /// - `NotFound` when editing a missing record.
    pub fn register(
        &self,
        form: &PersonForm,
        existing_id: Option<&str>,
    ) -> ServiceResult<Keyed<Physiotherapist>> {
        let personal = form.to_personal_data()?;
        let records = self.records();
        let users = self.users();

        if let Some(owner) = records
            .find_by_email(&personal.email)?
            .into_iter()
            .find(|owner| Some(owner.key.as_str()) != existing_id)
        {
            warn!("event=physiotherapist_register module=service status=error error_code=email_taken");
            return Err(ServiceError::EmailTaken { owner: owner.key });
        }

        let previous = match existing_id {
            Some(id) => Some(
                records
                    .get(id)?
                    .ok_or_else(|| ServiceError::NotFound(format!("physiotherapist {id}")))?,
            ),
            None => None,
        };
        ensure_cpf_available(&users, &personal.cpf, existing_id, UserKind::Physiotherapist)?;

        let key = match existing_id {
            Some(id) => id.to_string(),
            None => records.next_key()?,
        };
        let record = Physiotherapist { personal };
        records.save(&key, &record)?;

        let user = UserRecord::new(
            key.as_str(),
            record.personal.email.as_str(),
            record.personal.name.as_str(),
            UserKind::Physiotherapist,
            record.personal.active,
        );
        replace_credential(
            &users,
            previous.as_ref().map(|previous| previous.personal.cpf.as_str()),
            &record.personal.cpf,
            &user,
        )?;

        info!(
            "event=physiotherapist_register module=service status=ok key={key} mode={}",
            if existing_id.is_some() { "edit" } else { "create" }
        );
        Ok(Keyed::new(key, record))
    }

    pub fn get(&self, id: &str) -> ServiceResult<Option<Physiotherapist>> {
        Ok(self.records().get(id)?)
    }

    /// Loads a record for the edit screen; the active flag comes from the
    /// credential when one exists.
    pub fn load_profile(&self, id: &str) -> ServiceResult<Option<Profile<Physiotherapist>>> {
        let Some(record) = self.records().get(id)? else {
            return Ok(None);
        };
        let active = self
            .users()
            .get(&record.personal.cpf)?
            .map_or(record.personal.active, |user| user.active);

        Ok(Some(Profile {
            key: id.to_string(),
            formatted_cpf: format_cpf(&record.personal.cpf),
            active,
            record,
        }))
    }

    /// Deletes the record and the credential linked to it.
    pub fn delete(&self, id: &str) -> ServiceResult<()> {
        let records = self.records();
        let record = records
            .get(id)?
            .ok_or_else(|| ServiceError::NotFound(format!("physiotherapist {id}")))?;
        records.delete(id)?;
        remove_linked_credential(
            &self.users(),
            &record.personal.cpf,
            id,
            UserKind::Physiotherapist,
        )?;
        info!("event=physiotherapist_delete module=service status=ok key={id}");
        Ok(())
    }

    /// Lists the last `limit` physiotherapists in key order; `None` lists all.
    pub fn list_recent(&self, limit: Option<u32>) -> ServiceResult<Vec<Keyed<Physiotherapist>>> {
        Ok(self.records().list_recent(limit)?)
    }
}
