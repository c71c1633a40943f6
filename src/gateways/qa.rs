use async_trait::async_trait;
use reqwest::multipart::{Form, Part};

use crate::errors::AppError;
use crate::gateways::client::{ApiClient, CallKind};
use crate::models::{DocumentUploadResponse, PendingUpload, QuestionRequest, QuestionResponse};
use crate::utils::document::screen_document;

/// Document ingestion and question answering. Retrieval itself happens
/// remotely; this only moves requests and answers.
#[async_trait]
pub trait QaGateway: Send + Sync {
    async fn upload_document(&self, document: &PendingUpload) -> Result<DocumentUploadResponse, AppError>;
    async fn ask_question(&self, request: &QuestionRequest) -> Result<QuestionResponse, AppError>;
}

pub struct HttpQaGateway {
    api: ApiClient,
}

impl HttpQaGateway {
    pub fn new(api: ApiClient) -> Self {
        HttpQaGateway { api }
    }
}

#[async_trait]
impl QaGateway for HttpQaGateway {
    async fn upload_document(&self, document: &PendingUpload) -> Result<DocumentUploadResponse, AppError> {
        let mime = screen_document(document)?;
        let part = Part::bytes(document.bytes.clone())
            .file_name(document.file_name.clone())
            .mime_str(mime)
            .map_err(|err| AppError::BadRequest(err.to_string()))?;
        let form = Form::new().part("file", part);

        let call = self.api.post("rag/documents/upload")?.multipart(form);
        self.api.send_json(call, CallKind::Session).await
    }

    async fn ask_question(&self, request: &QuestionRequest) -> Result<QuestionResponse, AppError> {
        let call = self.api.post("rag/question")?.json(request);
        self.api.send_json(call, CallKind::Session).await
    }
}
