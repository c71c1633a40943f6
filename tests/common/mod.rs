#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

use intellidesk_portal::errors::AppError;
use intellidesk_portal::gateways::{AuthGateway, EmployeeGateway, QaGateway};
use intellidesk_portal::models::{
    AuthResponse, DocumentUploadResponse, EmployeeRecord, EmployeeRequest, EmployeeStatus,
    Identity, LoginRequest, PendingUpload, ProfilePatch, QuestionRequest, QuestionResponse,
    RegisterRequest, Role,
};
use intellidesk_portal::session::SessionManager;
use intellidesk_portal::store::{MemoryCredentialStore, StoredCredentials};

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn identity(id: &str, roles: &[Role]) -> Identity {
    Identity {
        id: id.to_string(),
        username: format!("{}-user", id),
        email: format!("{}@intellidesk.io", id),
        first_name: None,
        last_name: None,
        roles: roles.to_vec(),
        enabled: true,
        created_at: None,
    }
}

pub fn record(id: i64, owner: &str) -> EmployeeRecord {
    serde_json::from_value(serde_json::json!({
        "id": id,
        "employeeId": format!("EMP-{:04}", id),
        "userId": owner,
        "email": format!("{}@intellidesk.io", owner),
        "firstName": "Test",
        "lastName": format!("Employee{}", id),
        "phoneNumber": "9876543210",
        "department": "Operations",
        "designation": "Associate",
        "status": "ACTIVE",
        "salary": 42000.0,
        "bankName": "Union Bank",
        "bankAccountNumber": "1234567890",
        "bankIfscCode": "UBIN0000001"
    }))
    .expect("valid record fixture")
}

pub fn auth_response(identity: Identity) -> AuthResponse {
    AuthResponse {
        token: format!("access-{}", identity.id),
        refresh_token: format!("refresh-{}", identity.id),
        token_type: Some("Bearer".to_string()),
        user: identity,
    }
}

/// Session already signed in as `identity`, restored from memory storage.
pub fn signed_in(identity: Identity) -> Arc<SessionManager> {
    let store = MemoryCredentialStore::with_credentials(StoredCredentials {
        access_token: format!("access-{}", identity.id),
        refresh_token: format!("refresh-{}", identity.id),
        user: identity,
    });
    Arc::new(SessionManager::new(Arc::new(store), Arc::new(FakeAuth::default())))
}

pub fn signed_out() -> Arc<SessionManager> {
    Arc::new(SessionManager::new(
        Arc::new(MemoryCredentialStore::new()),
        Arc::new(FakeAuth::default()),
    ))
}

#[derive(Default)]
pub struct FakeAuth {
    pub replies: Mutex<VecDeque<Result<AuthResponse, AppError>>>,
}

impl FakeAuth {
    pub fn replying(replies: Vec<Result<AuthResponse, AppError>>) -> Self {
        FakeAuth {
            replies: Mutex::new(replies.into()),
        }
    }

    fn next(&self) -> Result<AuthResponse, AppError> {
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(AppError::TransientGateway("auth unavailable".into())))
    }
}

#[async_trait]
impl AuthGateway for FakeAuth {
    async fn login(&self, _request: &LoginRequest) -> Result<AuthResponse, AppError> {
        self.next()
    }

    async fn register(&self, _request: &RegisterRequest) -> Result<AuthResponse, AppError> {
        self.next()
    }
}

/// Records every call so tests can assert that denied actions never got here.
#[derive(Default)]
pub struct FakeEmployees {
    pub records: Mutex<Vec<EmployeeRecord>>,
    pub calls: Mutex<Vec<String>>,
    pub last_request: Mutex<Option<EmployeeRequest>>,
    pub list_gate: Option<Arc<Notify>>,
    pub search_gate: Option<Arc<Notify>>,
}

impl FakeEmployees {
    pub fn with_records(records: Vec<EmployeeRecord>) -> Self {
        FakeEmployees {
            records: Mutex::new(records),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn log(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }

    fn find(&self, id: i64) -> Result<EmployeeRecord, AppError> {
        self.records
            .lock()
            .unwrap()
            .iter()
            .find(|record| record.id == Some(id))
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Employee not found with ID: {}", id)))
    }
}

#[async_trait]
impl EmployeeGateway for FakeEmployees {
    async fn list_all(&self) -> Result<Vec<EmployeeRecord>, AppError> {
        self.log("list_all");
        let snapshot = self.records.lock().unwrap().clone();
        if let Some(gate) = &self.list_gate {
            gate.notified().await;
        }
        Ok(snapshot)
    }

    async fn get_by_id(&self, id: i64) -> Result<EmployeeRecord, AppError> {
        self.log(format!("get_by_id:{}", id));
        self.find(id)
    }

    async fn get_own_profile(&self) -> Result<EmployeeRecord, AppError> {
        self.log("get_own_profile");
        self.find(1)
    }

    async fn search(&self, keyword: &str) -> Result<Vec<EmployeeRecord>, AppError> {
        self.log(format!("search:{}", keyword));
        let found: Vec<EmployeeRecord> = self
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|record| record.last_name.contains(keyword))
            .cloned()
            .collect();
        if let Some(gate) = &self.search_gate {
            gate.notified().await;
        }
        Ok(found)
    }

    async fn create(&self, request: &EmployeeRequest) -> Result<EmployeeRecord, AppError> {
        self.log("create");
        *self.last_request.lock().unwrap() = Some(request.clone());
        let mut created = record(99, request.user_id.as_deref().unwrap_or("new-owner"));
        created.salary = request.salary;
        Ok(created)
    }

    async fn update(&self, id: i64, request: &EmployeeRequest) -> Result<EmployeeRecord, AppError> {
        self.log(format!("update:{}", id));
        *self.last_request.lock().unwrap() = Some(request.clone());
        let mut updated = self.find(id)?;
        updated.designation = request.designation.clone();
        Ok(updated)
    }

    async fn update_own_profile(&self, _patch: &ProfilePatch) -> Result<EmployeeRecord, AppError> {
        self.log("update_own_profile");
        self.find(1)
    }

    async fn update_status(&self, id: i64, status: EmployeeStatus) -> Result<EmployeeRecord, AppError> {
        self.log(format!("update_status:{}:{}", id, status));
        let mut updated = self.find(id)?;
        updated.status = Some(status);
        Ok(updated)
    }

    async fn update_salary(&self, id: i64, amount: f64) -> Result<EmployeeRecord, AppError> {
        self.log(format!("update_salary:{}", id));
        let mut updated = self.find(id)?;
        updated.salary = Some(amount);
        Ok(updated)
    }

    async fn delete(&self, id: i64) -> Result<(), AppError> {
        self.log(format!("delete:{}", id));
        self.find(id)?;
        self.records.lock().unwrap().retain(|record| record.id != Some(id));
        Ok(())
    }

    async fn list_by_department(&self, department: &str) -> Result<Vec<EmployeeRecord>, AppError> {
        self.log(format!("list_by_department:{}", department));
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|record| record.department == department)
            .cloned()
            .collect())
    }
}

/// Answers questions and uploads from a script. With a gate set, each call
/// waits for one `notify_one` before returning.
#[derive(Default)]
pub struct FakeQa {
    pub answers: Mutex<VecDeque<Result<QuestionResponse, AppError>>>,
    pub uploads: Mutex<VecDeque<Result<DocumentUploadResponse, AppError>>>,
    pub asked: Mutex<Vec<QuestionRequest>>,
    pub uploaded: Mutex<Vec<String>>,
    pub gate: Option<Arc<Notify>>,
}

impl FakeQa {
    pub fn answering(answers: Vec<Result<QuestionResponse, AppError>>) -> Self {
        FakeQa {
            answers: Mutex::new(answers.into()),
            ..Default::default()
        }
    }

    pub fn gated(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn with_uploads(self, uploads: Vec<Result<DocumentUploadResponse, AppError>>) -> Self {
        *self.uploads.lock().unwrap() = uploads.into();
        self
    }

    pub fn asked(&self) -> Vec<String> {
        self.asked
            .lock()
            .unwrap()
            .iter()
            .map(|request| request.question.clone())
            .collect()
    }
}

#[async_trait]
impl QaGateway for FakeQa {
    async fn upload_document(&self, document: &PendingUpload) -> Result<DocumentUploadResponse, AppError> {
        self.uploaded.lock().unwrap().push(document.file_name.clone());
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        self.uploads
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(AppError::TransientGateway("no scripted upload".into())))
    }

    async fn ask_question(&self, request: &QuestionRequest) -> Result<QuestionResponse, AppError> {
        self.asked.lock().unwrap().push(request.clone());
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        self.answers
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(AppError::TransientGateway("no scripted answer".into())))
    }
}

pub fn answer(text: &str, sources: &[&str], confidence: f64) -> QuestionResponse {
    QuestionResponse {
        answer: text.to_string(),
        sources: sources.iter().map(|s| s.to_string()).collect(),
        confidence,
    }
}

pub fn upload_ok(segments: u32) -> DocumentUploadResponse {
    DocumentUploadResponse {
        document_id: uuid::Uuid::new_v4(),
        filename: Some("handbook.pdf".to_string()),
        size: Some(2048),
        message: "Document uploaded successfully".to_string(),
        segments_created: segments,
    }
}
