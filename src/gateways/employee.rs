use async_trait::async_trait;

use crate::errors::AppError;
use crate::gateways::client::{ApiClient, CallKind};
use crate::models::{EmployeeRecord, EmployeeRequest, EmployeeStatus, ProfilePatch, SalaryUpdate};

/// Remote employee directory. Tokens ride along implicitly; nothing here
/// checks permissions.
#[async_trait]
pub trait EmployeeGateway: Send + Sync {
    async fn list_all(&self) -> Result<Vec<EmployeeRecord>, AppError>;
    async fn get_by_id(&self, id: i64) -> Result<EmployeeRecord, AppError>;
    async fn get_own_profile(&self) -> Result<EmployeeRecord, AppError>;
    async fn search(&self, keyword: &str) -> Result<Vec<EmployeeRecord>, AppError>;
    async fn create(&self, request: &EmployeeRequest) -> Result<EmployeeRecord, AppError>;
    async fn update(&self, id: i64, request: &EmployeeRequest) -> Result<EmployeeRecord, AppError>;
    async fn update_own_profile(&self, patch: &ProfilePatch) -> Result<EmployeeRecord, AppError>;
    async fn update_status(&self, id: i64, status: EmployeeStatus) -> Result<EmployeeRecord, AppError>;
    async fn update_salary(&self, id: i64, amount: f64) -> Result<EmployeeRecord, AppError>;
    async fn delete(&self, id: i64) -> Result<(), AppError>;
    async fn list_by_department(&self, department: &str) -> Result<Vec<EmployeeRecord>, AppError>;
}

pub struct HttpEmployeeGateway {
    api: ApiClient,
}

impl HttpEmployeeGateway {
    pub fn new(api: ApiClient) -> Self {
        HttpEmployeeGateway { api }
    }
}

#[async_trait]
impl EmployeeGateway for HttpEmployeeGateway {
    async fn list_all(&self) -> Result<Vec<EmployeeRecord>, AppError> {
        let call = self.api.get("employees")?;
        self.api.send_json(call, CallKind::Session).await
    }

    async fn get_by_id(&self, id: i64) -> Result<EmployeeRecord, AppError> {
        let call = self.api.get(&format!("employees/{}", id))?;
        self.api.send_json(call, CallKind::Session).await
    }

    async fn get_own_profile(&self) -> Result<EmployeeRecord, AppError> {
        let call = self.api.get("employees/my-profile")?;
        self.api.send_json(call, CallKind::Session).await
    }

    async fn search(&self, keyword: &str) -> Result<Vec<EmployeeRecord>, AppError> {
        let call = self.api.get("employees/search")?.query(&[("keyword", keyword)]);
        self.api.send_json(call, CallKind::Session).await
    }

    async fn create(&self, request: &EmployeeRequest) -> Result<EmployeeRecord, AppError> {
        let call = self.api.post("employees")?.json(request);
        self.api.send_json(call, CallKind::Session).await
    }

    async fn update(&self, id: i64, request: &EmployeeRequest) -> Result<EmployeeRecord, AppError> {
        let call = self.api.put(&format!("employees/{}", id))?.json(request);
        self.api.send_json(call, CallKind::Session).await
    }

    async fn update_own_profile(&self, patch: &ProfilePatch) -> Result<EmployeeRecord, AppError> {
        let call = self.api.patch("employees/my-profile")?.json(patch);
        self.api.send_json(call, CallKind::Session).await
    }

    async fn update_status(&self, id: i64, status: EmployeeStatus) -> Result<EmployeeRecord, AppError> {
        let call = self
            .api
            .patch(&format!("employees/{}/status", id))?
            .query(&[("status", status.to_string())]);
        self.api.send_json(call, CallKind::Session).await
    }

    async fn update_salary(&self, id: i64, amount: f64) -> Result<EmployeeRecord, AppError> {
        let call = self
            .api
            .patch(&format!("employees/{}/salary", id))?
            .json(&SalaryUpdate { salary: amount });
        self.api.send_json(call, CallKind::Session).await
    }

    async fn delete(&self, id: i64) -> Result<(), AppError> {
        let call = self.api.delete(&format!("employees/{}", id))?;
        self.api.send_empty(call, CallKind::Session).await
    }

    async fn list_by_department(&self, department: &str) -> Result<Vec<EmployeeRecord>, AppError> {
        let mut url = self.api.endpoint("employees/department")?;
        url.path_segments_mut()
            .map_err(|_| AppError::Config("API base URL cannot carry a path".to_string()))?
            .push(department);
        let call = self.api.get_url(url);
        self.api.send_json(call, CallKind::Session).await
    }
}
