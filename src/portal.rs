use std::sync::Arc;

use crate::config::PortalConfig;
use crate::conversation::ConversationEngine;
use crate::directory::EmployeeDirectory;
use crate::errors::AppError;
use crate::gateways::{
    ApiClient, AuthGateway, EmployeeGateway, HttpAuthGateway, HttpEmployeeGateway, HttpQaGateway,
    QaGateway, TokenSource,
};
use crate::session::SessionManager;
use crate::store::{CredentialStore, FileCredentialStore};

/// Everything a portal front end needs, wired around one session.
pub struct Portal {
    pub session: Arc<SessionManager>,
    pub directory: EmployeeDirectory,
    pub conversation: ConversationEngine,
}

impl Portal {
    pub fn from_config(config: &PortalConfig) -> Result<Self, AppError> {
        let api = ApiClient::new(config.api_url.clone(), config.request_timeout)?;
        let store: Arc<dyn CredentialStore> =
            Arc::new(FileCredentialStore::new(config.credentials_path.clone()));
        let auth: Arc<dyn AuthGateway> = Arc::new(HttpAuthGateway::new(api.clone()));
        let session = Arc::new(SessionManager::new(store, auth));

        let authorized = api.with_tokens(session.clone() as Arc<dyn TokenSource>);
        let employees: Arc<dyn EmployeeGateway> = Arc::new(HttpEmployeeGateway::new(authorized.clone()));
        let qa: Arc<dyn QaGateway> = Arc::new(HttpQaGateway::new(authorized));

        log::info!("Portal ready against {}", config.api_url);
        Ok(Self::assemble(session, employees, qa, config.max_results))
    }

    pub fn from_env() -> Result<Self, AppError> {
        Self::from_config(&PortalConfig::from_env()?)
    }

    /// Wires caller-supplied gateways, e.g. in-memory fakes.
    pub fn assemble(
        session: Arc<SessionManager>,
        employees: Arc<dyn EmployeeGateway>,
        qa: Arc<dyn QaGateway>,
        max_results: Option<u32>,
    ) -> Self {
        Portal {
            directory: EmployeeDirectory::new(session.clone(), employees),
            conversation: ConversationEngine::new(session.clone(), qa).with_max_results(max_results),
            session,
        }
    }
}
