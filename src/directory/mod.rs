//! Employee directory access gated by the role policy.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::errors::AppError;
use crate::gateways::EmployeeGateway;
use crate::models::{EmployeeRecord, EmployeeRequest, EmployeeStatus, Identity, ProfilePatch};
use crate::policy::{self, Capability};
use crate::session::SessionManager;
use crate::utils::validation::validate_payload;

/// The list view: the last full load plus whatever the current search shows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Roster {
    pub all: Vec<EmployeeRecord>,
    pub visible: Vec<EmployeeRecord>,
    pub keyword: String,
}

/// Ticket pair per slot: the full list and the visible view are ordered
/// independently, so a reload never loses `all` to a newer search.
#[derive(Default)]
struct Tickets {
    issued: u64,
    applied: u64,
}

impl Tickets {
    fn issue(&mut self) -> u64 {
        self.issued += 1;
        self.issued
    }

    /// Marks `ticket` applied unless a newer one already was.
    fn accept(&mut self, ticket: u64) -> bool {
        if ticket > self.applied {
            self.applied = ticket;
            true
        } else {
            false
        }
    }
}

#[derive(Default)]
struct RosterSlot {
    roster: Roster,
    all: Tickets,
    view: Tickets,
}

pub struct EmployeeDirectory {
    session: Arc<SessionManager>,
    gateway: Arc<dyn EmployeeGateway>,
    slot: Mutex<RosterSlot>,
}

fn visible_to(identity: Option<&Identity>, record: EmployeeRecord) -> EmployeeRecord {
    if policy::can_view_salary(identity, &record) {
        record
    } else {
        record.redacted()
    }
}

fn record_id(record: &EmployeeRecord) -> Result<i64, AppError> {
    record.id.ok_or_else(|| {
        AppError::BadRequest(format!("Employee {} has no directory id", record.employee_id))
    })
}

impl EmployeeDirectory {
    pub fn new(session: Arc<SessionManager>, gateway: Arc<dyn EmployeeGateway>) -> Self {
        EmployeeDirectory {
            session,
            gateway,
            slot: Mutex::new(RosterSlot::default()),
        }
    }

    pub fn roster(&self) -> Roster {
        self.lock_slot().roster.clone()
    }

    /// Reloads the full list, which replaces `all` outright. The visible view
    /// is replaced too unless a search issued later has already landed.
    pub async fn load_all(&self) -> Result<Vec<EmployeeRecord>, AppError> {
        let identity = self.session.current_identity();
        policy::require(identity.as_ref(), None, Capability::ListAll)?;

        let (all_ticket, view_ticket) = {
            let mut slot = self.lock_slot();
            (slot.all.issue(), slot.view.issue())
        };
        let records: Vec<EmployeeRecord> = self
            .gateway
            .list_all()
            .await?
            .into_iter()
            .map(|record| visible_to(identity.as_ref(), record))
            .collect();

        let mut slot = self.lock_slot();
        if slot.all.accept(all_ticket) {
            slot.roster.all = records.clone();
        } else {
            log::debug!("Dropping stale employee list (request {})", all_ticket);
        }
        if slot.view.accept(view_ticket) {
            slot.roster.visible = records.clone();
            slot.roster.keyword.clear();
        }
        Ok(records)
    }

    /// A blank keyword restores the last full list without a request and
    /// supersedes any search still in flight.
    pub async fn search(&self, keyword: &str) -> Result<Vec<EmployeeRecord>, AppError> {
        let identity = self.session.current_identity();
        policy::require(identity.as_ref(), None, Capability::ListAll)?;

        let keyword = keyword.trim();
        if keyword.is_empty() {
            let mut slot = self.lock_slot();
            let ticket = slot.view.issue();
            slot.view.accept(ticket);
            slot.roster.keyword.clear();
            let all = slot.roster.all.clone();
            slot.roster.visible = all.clone();
            return Ok(all);
        }

        let ticket = self.lock_slot().view.issue();
        let records: Vec<EmployeeRecord> = self
            .gateway
            .search(keyword)
            .await?
            .into_iter()
            .map(|record| visible_to(identity.as_ref(), record))
            .collect();

        let mut slot = self.lock_slot();
        if slot.view.accept(ticket) {
            slot.roster.visible = records.clone();
            slot.roster.keyword = keyword.to_string();
        } else {
            log::debug!("Dropping stale search result for '{}'", keyword);
        }
        Ok(records)
    }

    pub async fn list_by_department(&self, department: &str) -> Result<Vec<EmployeeRecord>, AppError> {
        let identity = self.session.current_identity();
        policy::require(identity.as_ref(), None, Capability::ListAll)?;

        let records = self.gateway.list_by_department(department).await?;
        Ok(records
            .into_iter()
            .map(|record| visible_to(identity.as_ref(), record))
            .collect())
    }

    /// Fetching someone else's record needs a role that can view any record;
    /// the owner-specific check runs again once the record is known.
    pub async fn get(&self, id: i64) -> Result<EmployeeRecord, AppError> {
        let identity = self.session.current_identity();
        policy::require(identity.as_ref(), None, Capability::ViewBasic)?;

        let record = self.gateway.get_by_id(id).await?;
        policy::require(identity.as_ref(), record.owner_id(), Capability::ViewBasic)?;
        Ok(visible_to(identity.as_ref(), record))
    }

    pub async fn own_profile(&self) -> Result<EmployeeRecord, AppError> {
        let identity = self.session.current_identity();
        let own_id = identity.as_ref().map(|identity| identity.id.clone());
        policy::require(identity.as_ref(), own_id.as_deref(), Capability::ViewBasic)?;

        let record = self.gateway.get_own_profile().await?;
        Ok(visible_to(identity.as_ref(), record))
    }

    /// Salary is only sent along when the caller could also set it afterwards.
    pub async fn create(&self, request: EmployeeRequest) -> Result<EmployeeRecord, AppError> {
        let identity = self.session.current_identity();
        let owner = request.user_id.clone();
        policy::require(identity.as_ref(), owner.as_deref(), Capability::EditBasic)?;
        validate_payload(&request)?;

        let request = if request.salary.is_some()
            && !policy::authorize(identity.as_ref(), owner.as_deref(), Capability::EditSalary)
        {
            log::debug!("Dropping salary from new employee {}", request.employee_id);
            request.without_salary()
        } else {
            request
        };

        let created = self.gateway.create(&request).await?;
        log::info!("Created employee {}", created.employee_id);
        Ok(visible_to(identity.as_ref(), created))
    }

    /// Basic-field update; the salary goes through `update_salary`.
    pub async fn update(
        &self,
        target: &EmployeeRecord,
        request: EmployeeRequest,
    ) -> Result<EmployeeRecord, AppError> {
        let identity = self.session.current_identity();
        policy::require(identity.as_ref(), target.owner_id(), Capability::EditBasic)?;
        let id = record_id(target)?;
        let request = request.without_salary();
        validate_payload(&request)?;

        let updated = self.gateway.update(id, &request).await?;
        log::info!("Updated employee {}", updated.employee_id);
        Ok(visible_to(identity.as_ref(), updated))
    }

    pub async fn update_own_profile(&self, patch: ProfilePatch) -> Result<EmployeeRecord, AppError> {
        let identity = self.session.current_identity();
        let own_id = identity.as_ref().map(|identity| identity.id.clone());
        policy::require(identity.as_ref(), own_id.as_deref(), Capability::EditBasic)?;
        if patch.is_empty() {
            return Err(AppError::BadRequest("Nothing to update".to_string()));
        }

        let updated = self.gateway.update_own_profile(&patch).await?;
        Ok(visible_to(identity.as_ref(), updated))
    }

    pub async fn update_status(
        &self,
        target: &EmployeeRecord,
        status: EmployeeStatus,
    ) -> Result<EmployeeRecord, AppError> {
        let identity = self.session.current_identity();
        policy::require(identity.as_ref(), target.owner_id(), Capability::EditBasic)?;
        let id = record_id(target)?;

        let updated = self.gateway.update_status(id, status).await?;
        log::info!("Employee {} is now {}", updated.employee_id, status);
        Ok(visible_to(identity.as_ref(), updated))
    }

    pub async fn update_salary(&self, target: &EmployeeRecord, amount: f64) -> Result<EmployeeRecord, AppError> {
        let identity = self.session.current_identity();
        policy::require(identity.as_ref(), target.owner_id(), Capability::EditSalary)?;
        let id = record_id(target)?;
        if amount.is_nan() || amount <= 0.0 {
            return Err(AppError::BadRequest("Salary must be positive".to_string()));
        }

        let updated = self.gateway.update_salary(id, amount).await?;
        log::info!("Salary updated for employee {}", updated.employee_id);
        Ok(visible_to(identity.as_ref(), updated))
    }

    pub async fn delete(&self, target: &EmployeeRecord) -> Result<(), AppError> {
        let identity = self.session.current_identity();
        policy::require(identity.as_ref(), target.owner_id(), Capability::Delete)?;
        let id = record_id(target)?;

        self.gateway.delete(id).await?;
        log::info!("Deleted employee {}", target.employee_id);

        let mut slot = self.lock_slot();
        slot.roster.all.retain(|record| record.id != Some(id));
        slot.roster.visible.retain(|record| record.id != Some(id));
        Ok(())
    }

    fn lock_slot(&self) -> MutexGuard<'_, RosterSlot> {
        self.slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
