use async_trait::async_trait;

use crate::errors::AppError;
use crate::gateways::client::{ApiClient, CallKind};
use crate::models::{AuthResponse, LoginRequest, RegisterRequest};

#[async_trait]
pub trait AuthGateway: Send + Sync {
    async fn login(&self, request: &LoginRequest) -> Result<AuthResponse, AppError>;
    async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse, AppError>;
}

pub struct HttpAuthGateway {
    api: ApiClient,
}

impl HttpAuthGateway {
    pub fn new(api: ApiClient) -> Self {
        HttpAuthGateway { api }
    }
}

#[async_trait]
impl AuthGateway for HttpAuthGateway {
    async fn login(&self, request: &LoginRequest) -> Result<AuthResponse, AppError> {
        let call = self.api.post("auth/login")?.json(request);
        self.api.send_json(call, CallKind::Credentials).await
    }

    async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse, AppError> {
        let call = self.api.post("auth/register")?.json(request);
        self.api.send_json(call, CallKind::Credentials).await
    }
}
