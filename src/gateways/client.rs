use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

use crate::errors::{AppError, ErrorResponse};

/// Supplies the bearer token attached to every directory and QA call.
/// Implemented by the session manager; gateways never read storage directly.
pub trait TokenSource: Send + Sync {
    fn bearer_token(&self) -> Option<String>;
}

/// Whether a call authenticates the user or rides on an existing session.
/// A 401 means bad credentials for the former and a stale token for the latter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    Credentials,
    Session,
}

/// Shared HTTP plumbing for the remote IntelliDesk services.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base: Url,
    tokens: Option<Arc<dyn TokenSource>>,
}

impl ApiClient {
    pub fn new(base: Url, timeout: Duration) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| AppError::Config(format!("HTTP client: {}", err)))?;
        Ok(ApiClient {
            client,
            base: with_trailing_slash(base),
            tokens: None,
        })
    }

    pub fn with_tokens(mut self, tokens: Arc<dyn TokenSource>) -> Self {
        self.tokens = Some(tokens);
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    pub fn endpoint(&self, path: &str) -> Result<Url, AppError> {
        self.base
            .join(path.trim_start_matches('/'))
            .map_err(|err| AppError::Config(format!("Invalid endpoint '{}': {}", path, err)))
    }

    pub fn get(&self, path: &str) -> Result<RequestBuilder, AppError> {
        Ok(self.client.get(self.endpoint(path)?))
    }

    pub fn get_url(&self, url: Url) -> RequestBuilder {
        self.client.get(url)
    }

    pub fn post(&self, path: &str) -> Result<RequestBuilder, AppError> {
        Ok(self.client.post(self.endpoint(path)?))
    }

    pub fn put(&self, path: &str) -> Result<RequestBuilder, AppError> {
        Ok(self.client.put(self.endpoint(path)?))
    }

    pub fn patch(&self, path: &str) -> Result<RequestBuilder, AppError> {
        Ok(self.client.patch(self.endpoint(path)?))
    }

    pub fn delete(&self, path: &str) -> Result<RequestBuilder, AppError> {
        Ok(self.client.delete(self.endpoint(path)?))
    }

    pub async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        kind: CallKind,
    ) -> Result<T, AppError> {
        let response = self.dispatch(request, kind).await?;
        response
            .json::<T>()
            .await
            .map_err(|err| AppError::TransientGateway(format!("Unexpected response body: {}", err)))
    }

    /// For endpoints whose success body carries nothing the caller needs.
    pub async fn send_empty(&self, request: RequestBuilder, kind: CallKind) -> Result<(), AppError> {
        self.dispatch(request, kind).await.map(|_| ())
    }

    async fn dispatch(
        &self,
        request: RequestBuilder,
        kind: CallKind,
    ) -> Result<reqwest::Response, AppError> {
        let token = match kind {
            CallKind::Session => self.tokens.as_ref().and_then(|source| source.bearer_token()),
            CallKind::Credentials => None,
        };
        let request = match &token {
            Some(token) => request.bearer_auth(token),
            None => request,
        };

        let response = request.send().await.map_err(|err| {
            log::error!("Gateway request failed: {}", err);
            AppError::from(err)
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorResponse>(&body)
            .ok()
            .and_then(ErrorResponse::into_message)
            .unwrap_or_else(|| default_message(status));
        let err = map_status(status, message, kind, token.is_some());
        log::error!("Gateway responded {}: {}", status, err);
        Err(err)
    }
}

fn with_trailing_slash(mut base: Url) -> Url {
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base
}

fn default_message(status: StatusCode) -> String {
    status
        .canonical_reason()
        .map(str::to_string)
        .unwrap_or_else(|| format!("HTTP {}", status.as_u16()))
}

pub(crate) fn map_status(status: StatusCode, message: String, kind: CallKind, sent_token: bool) -> AppError {
    if kind == CallKind::Credentials && status.is_client_error() {
        return AppError::AuthenticationFailure(message);
    }
    match (status, kind) {
        (StatusCode::UNAUTHORIZED, CallKind::Session) if sent_token => AppError::StaleSession(message),
        (StatusCode::UNAUTHORIZED, CallKind::Session) => {
            AppError::StaleSession(format!("Not signed in: {}", message))
        }
        (StatusCode::FORBIDDEN, _) => AppError::Forbidden(message),
        (StatusCode::NOT_FOUND, _) => AppError::NotFound(message),
        (StatusCode::CONFLICT, _) => AppError::Conflict(message),
        (StatusCode::BAD_REQUEST, _) => AppError::BadRequest(message),
        _ => AppError::TransientGateway(message),
    }
}
