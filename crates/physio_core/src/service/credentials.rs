//! Credential bookkeeping shared by the registration services.

use super::{ServiceError, ServiceResult};
use crate::model::user::{UserKind, UserRecord};
use crate::repo::user_repo::UserRepository;
use crate::repo::RepoError;
use crate::tree::TreeStore;
use log::warn;

/// Fails when `cpf` already has a credential linked to a different record.
pub(super) fn ensure_cpf_available<S: TreeStore + ?Sized>(
    users: &UserRepository<'_, S>,
    cpf: &str,
    id: Option<&str>,
    kind: UserKind,
) -> ServiceResult<()> {
    match users.get(cpf)? {
        Some(existing) if existing.kind != kind || Some(existing.id.as_str()) != id => {
            Err(ServiceError::CpfTaken)
        }
        _ => Ok(()),
    }
}

/// Writes the credential for a saved record, dropping the one stored under
/// `previous_cpf` when the CPF changed.
pub(super) fn replace_credential<S: TreeStore + ?Sized>(
    users: &UserRepository<'_, S>,
    previous_cpf: Option<&str>,
    cpf: &str,
    user: &UserRecord,
) -> ServiceResult<()> {
    if let Some(previous_cpf) = previous_cpf.filter(|previous| *previous != cpf) {
        remove_linked_credential(users, previous_cpf, &user.id, user.kind)?;
    }
    users.put(cpf, user)?;
    Ok(())
}

/// Deletes the credential at `cpf` only when it points at `id`.
pub(super) fn remove_linked_credential<S: TreeStore + ?Sized>(
    users: &UserRepository<'_, S>,
    cpf: &str,
    id: &str,
    kind: UserKind,
) -> ServiceResult<()> {
    match users.get(cpf)? {
        Some(existing) if existing.id == id && existing.kind == kind => match users.delete(cpf) {
            Ok(()) | Err(RepoError::NotFound(_)) => Ok(()),
            Err(err) => Err(err.into()),
        },
        Some(_) => {
            warn!("event=credential_remove module=service status=skipped reason=linked_elsewhere");
            Ok(())
        }
        None => Ok(()),
    }
}
