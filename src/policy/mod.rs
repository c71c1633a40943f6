//! Role matrix deciding what an identity may do with an employee record.

use std::fmt;

use crate::errors::AppError;
use crate::models::{EmployeeRecord, Identity, Role};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    ViewBasic,
    ViewSalary,
    EditBasic,
    EditSalary,
    Delete,
    ListAll,
}

impl Capability {
    pub const ALL: [Capability; 6] = [
        Capability::ViewBasic,
        Capability::ViewSalary,
        Capability::EditBasic,
        Capability::EditSalary,
        Capability::Delete,
        Capability::ListAll,
    ];
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Capability::ViewBasic => "VIEW_BASIC",
            Capability::ViewSalary => "VIEW_SALARY",
            Capability::EditBasic => "EDIT_BASIC",
            Capability::EditSalary => "EDIT_SALARY",
            Capability::Delete => "DELETE",
            Capability::ListAll => "LIST_ALL",
        };
        write!(f, "{}", name)
    }
}

/// What a single role grants, given whether the target record is the
/// identity's own.
fn role_grants(role: &Role, capability: Capability, self_owned: bool) -> bool {
    use Capability::*;

    match role {
        Role::Admin => true,
        Role::Hr => match capability {
            ViewBasic | ViewSalary | Delete | ListAll => true,
            EditBasic => !self_owned,
            EditSalary => false,
        },
        Role::Accounts => match capability {
            ViewBasic | ViewSalary => true,
            EditSalary => !self_owned,
            EditBasic | Delete | ListAll => false,
        },
        Role::Employee | Role::Other(_) => false,
    }
}

/// Grants every identity holds regardless of role.
fn baseline_grants(capability: Capability, self_owned: bool) -> bool {
    matches!(capability, Capability::ViewBasic | Capability::ViewSalary) && self_owned
}

/// `owner_id` is the record's owning user reference; `None` means no record is
/// involved or its owner is unknown, which never counts as self-owned.
pub fn authorize(identity: Option<&Identity>, owner_id: Option<&str>, capability: Capability) -> bool {
    let Some(identity) = identity else {
        return false;
    };
    let self_owned = owner_id.is_some_and(|owner| owner == identity.id);

    baseline_grants(capability, self_owned)
        || identity
            .roles
            .iter()
            .any(|role| role_grants(role, capability, self_owned))
}

pub fn capabilities(identity: Option<&Identity>, owner_id: Option<&str>) -> Vec<Capability> {
    Capability::ALL
        .into_iter()
        .filter(|capability| authorize(identity, owner_id, *capability))
        .collect()
}

/// Fail-fast variant used before any gateway call is issued.
pub fn require(
    identity: Option<&Identity>,
    owner_id: Option<&str>,
    capability: Capability,
) -> Result<(), AppError> {
    if authorize(identity, owner_id, capability) {
        return Ok(());
    }
    let reason = match identity {
        None => "Not signed in".to_string(),
        Some(identity) => format!("User '{}' lacks {}", identity.username, capability),
    };
    log::warn!("Denied {} locally: {}", capability, reason);
    Err(AppError::denied(capability, reason))
}

pub fn can_view(identity: Option<&Identity>, record: &EmployeeRecord) -> bool {
    authorize(identity, record.owner_id(), Capability::ViewBasic)
}

pub fn can_view_salary(identity: Option<&Identity>, record: &EmployeeRecord) -> bool {
    authorize(identity, record.owner_id(), Capability::ViewSalary)
}

pub fn can_edit_info(identity: Option<&Identity>, record: &EmployeeRecord) -> bool {
    authorize(identity, record.owner_id(), Capability::EditBasic)
}

pub fn can_edit_salary(identity: Option<&Identity>, record: &EmployeeRecord) -> bool {
    authorize(identity, record.owner_id(), Capability::EditSalary)
}

pub fn can_delete(identity: Option<&Identity>, record: &EmployeeRecord) -> bool {
    authorize(identity, record.owner_id(), Capability::Delete)
}

pub fn can_list_all(identity: Option<&Identity>) -> bool {
    authorize(identity, None, Capability::ListAll)
}

/// Creating a record is an edit on a record nobody owns yet.
pub fn can_create(identity: Option<&Identity>) -> bool {
    authorize(identity, None, Capability::EditBasic)
}
