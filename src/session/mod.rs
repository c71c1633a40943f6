//! The single owner of the signed-in session.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tokio::sync::watch;

use crate::errors::AppError;
use crate::gateways::{AuthGateway, TokenSource};
use crate::models::{AuthResponse, Identity, LoginRequest, RegisterRequest};
use crate::store::{CredentialStore, StoredCredentials};
use crate::utils::validation::validate_payload;

pub struct SessionManager {
    store: Arc<dyn CredentialStore>,
    auth: Arc<dyn AuthGateway>,
    credentials: RwLock<Option<StoredCredentials>>,
    identity_tx: watch::Sender<Option<Identity>>,
}

impl SessionManager {
    /// Rehydrates from durable storage without any network call. The restored
    /// identity may be stale; a later rejected request is how that surfaces.
    pub fn new(store: Arc<dyn CredentialStore>, auth: Arc<dyn AuthGateway>) -> Self {
        let restored = match store.load() {
            Ok(Some(credentials)) if credentials.access_token.is_empty() => {
                log::warn!("Ignoring stored session for '{}' without a token", credentials.user.username);
                None
            }
            Ok(Some(credentials)) => {
                log::info!("Restored session for '{}'", credentials.user.username);
                Some(credentials)
            }
            Ok(None) => None,
            Err(err) => {
                log::error!("Discarding unreadable stored credentials: {}", err);
                None
            }
        };
        let identity = restored.as_ref().map(|credentials| credentials.user.clone());
        let (identity_tx, _) = watch::channel(identity);

        SessionManager {
            store,
            auth,
            credentials: RwLock::new(restored),
            identity_tx,
        }
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<Identity, AppError> {
        if username.trim().is_empty() || password.is_empty() {
            return Err(AppError::BadRequest("Username and password are required".to_string()));
        }
        let request = LoginRequest {
            username: username.trim().to_string(),
            password: password.to_string(),
        };

        match self.auth.login(&request).await {
            Ok(response) => {
                let identity = self.establish(response)?;
                log::info!("Login succeeded for '{}'", request.username);
                Ok(identity)
            }
            Err(err) => {
                log::warn!("Login failed for '{}': {}", request.username, err);
                Err(err)
            }
        }
    }

    /// Duplicate usernames or emails come back from the auth service as an
    /// `AuthenticationFailure` carrying its message.
    pub async fn register(&self, profile: RegisterRequest) -> Result<Identity, AppError> {
        validate_payload(&profile)?;

        match self.auth.register(&profile).await {
            Ok(response) => {
                let identity = self.establish(response)?;
                log::info!("Registered '{}'", profile.username);
                Ok(identity)
            }
            Err(err) => {
                log::warn!("Registration failed for '{}': {}", profile.username, err);
                Err(err)
            }
        }
    }

    /// Always ends signed out in memory and always publishes `None`, even when
    /// nothing was stored. An error means the stored tokens are still on disk
    /// and the next start would restore them.
    pub fn logout(&self) -> Result<(), AppError> {
        let cleared = self.store.clear();
        let previous = self.write_credentials().take();
        self.identity_tx.send_replace(None);

        match previous {
            Some(credentials) => log::info!("Logged out '{}'", credentials.user.username),
            None => log::debug!("Logout with no active session"),
        }
        cleared.map_err(|err| {
            log::error!("Logout did not clear stored credentials: {}", err);
            err
        })
    }

    pub fn current_identity(&self) -> Option<Identity> {
        self.read_credentials()
            .as_ref()
            .map(|credentials| credentials.user.clone())
    }

    /// Presence check only; expiry and signature are the server's business.
    pub fn is_authenticated(&self) -> bool {
        self.read_credentials()
            .as_ref()
            .is_some_and(|credentials| !credentials.access_token.is_empty())
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Identity>> {
        self.identity_tx.subscribe()
    }

    fn establish(&self, response: AuthResponse) -> Result<Identity, AppError> {
        if response.token.trim().is_empty() {
            log::error!("Auth response for '{}' carried no access token", response.user.username);
            return Err(AppError::AuthenticationFailure(
                "Authentication response carried no access token".to_string(),
            ));
        }
        let credentials = StoredCredentials {
            access_token: response.token,
            refresh_token: response.refresh_token,
            user: response.user,
        };
        if let Err(err) = self.store.save(&credentials) {
            log::error!(
                "Session for '{}' will not survive a restart: {}",
                credentials.user.username,
                err
            );
        }

        let identity = credentials.user.clone();
        *self.write_credentials() = Some(credentials);
        self.identity_tx.send_replace(Some(identity.clone()));
        Ok(identity)
    }

    fn read_credentials(&self) -> RwLockReadGuard<'_, Option<StoredCredentials>> {
        self.credentials
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write_credentials(&self) -> RwLockWriteGuard<'_, Option<StoredCredentials>> {
        self.credentials
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl TokenSource for SessionManager {
    fn bearer_token(&self) -> Option<String> {
        self.read_credentials()
            .as_ref()
            .map(|credentials| credentials.access_token.clone())
    }
}
