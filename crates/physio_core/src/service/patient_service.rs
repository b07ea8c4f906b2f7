//! Patient registration use cases.
//!
//! # Invariants
//! - A saved patient references an existing physiotherapist (and patient
//!   group, when set) at the time of the write.
//! - Every saved patient has a credential (`tipo = "P"`) at its CPF.

use super::credentials::{ensure_cpf_available, remove_linked_credential, replace_credential};
use super::{Profile, ServiceError, ServiceResult};
use crate::model::patient::Patient;
use crate::model::user::{UserKind, UserRecord};
use crate::model::Keyed;
use crate::repo::patient_group_repo::PatientGroupRepository;
use crate::repo::patient_repo::PatientRepository;
use crate::repo::physiotherapist_repo::PhysiotherapistRepository;
use crate::repo::user_repo::UserRepository;
use crate::tree::TreeStore;
use crate::validation::cpf::format_cpf;
use crate::validation::form::PatientForm;
use log::info;

pub struct PatientService<'s, S: TreeStore + ?Sized> {
    store: &'s S,
}

impl<'s, S: TreeStore + ?Sized> PatientService<'s, S> {
    pub fn new(store: &'s S) -> Self {
        Self { store }
    }

    fn records(&self) -> PatientRepository<'s, S> {
        PatientRepository::new(self.store)
    }

    fn users(&self) -> UserRepository<'s, S> {
        UserRepository::new(self.store)
    }

    /// Saves the patient registration screen.
    ///
    /// `existing_id = None` creates a record under a freshly allocated key;
    /// `Some(id)` replaces record `id`, which must exist.
    pub fn register(
        &self,
        form: &PatientForm,
        existing_id: Option<&str>,
    ) -> ServiceResult<Keyed<Patient>> {
        form.validate()?;
        let personal = form.person.to_personal_data()?;
        let responsible = form.responsible.trim().to_string();
        let group = form
            .group
            .as_deref()
            .map(str::trim)
            .filter(|code| !code.is_empty())
            .map(str::to_string);

        if PhysiotherapistRepository::new(self.store)
            .get(&responsible)?
            .is_none()
        {
            return Err(ServiceError::UnknownPhysiotherapist(responsible));
        }
        if let Some(code) = &group {
            if PatientGroupRepository::new(self.store).get(code)?.is_none() {
                return Err(ServiceError::UnknownPatientGroup(code.clone()));
            }
        }

        let records = self.records();
        let users = self.users();
        let previous = match existing_id {
            Some(id) => Some(
                records
                    .get(id)?
                    .ok_or_else(|| ServiceError::NotFound(format!("patient {id}")))?,
            ),
            None => None,
        };
        ensure_cpf_available(&users, &personal.cpf, existing_id, UserKind::Patient)?;

        let key = match existing_id {
            Some(id) => id.to_string(),
            None => records.next_key()?,
        };
        let record = Patient {
            personal,
            responsible,
            group,
        };
        records.save(&key, &record)?;

        let user = UserRecord::new(
            key.as_str(),
            record.personal.email.as_str(),
            record.personal.name.as_str(),
            UserKind::Patient,
            record.personal.active,
        );
        replace_credential(
            &users,
            previous.as_ref().map(|previous| previous.personal.cpf.as_str()),
            &record.personal.cpf,
            &user,
        )?;

        info!(
            "event=patient_register module=service status=ok key={key} mode={}",
            if existing_id.is_some() { "edit" } else { "create" }
        );
        Ok(Keyed::new(key, record))
    }

    pub fn get(&self, id: &str) -> ServiceResult<Option<Patient>> {
        Ok(self.records().get(id)?)
    }

    /// Loads a record for the edit screen.
    pub fn load_profile(&self, id: &str) -> ServiceResult<Option<Profile<Patient>>> {
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

    /// Deletes the patient and the credential linked to it.
    ///
    /// Evaluations are left in place.
    pub fn delete(&self, id: &str) -> ServiceResult<()> {
        let records = self.records();
        let record = records
            .get(id)?
            .ok_or_else(|| ServiceError::NotFound(format!("patient {id}")))?;
        records.delete(id)?;
        remove_linked_credential(&self.users(), &record.personal.cpf, id, UserKind::Patient)?;
        info!("event=patient_delete module=service status=ok key={id}");
        Ok(())
    }

    /// Lists the last `limit` patients in key order; `None` lists all.
    pub fn list_recent(&self, limit: Option<u32>) -> ServiceResult<Vec<Keyed<Patient>>> {
        Ok(self.records().list_recent(limit)?)
    }

    /// Lists the patients a physiotherapist is responsible for.
    pub fn list_for_physiotherapist(
        &self,
        physiotherapist_id: &str,
    ) -> ServiceResult<Vec<Keyed<Patient>>> {
        Ok(self.records().list_by_responsible(physiotherapist_id)?)
    }
}
