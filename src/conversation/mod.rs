use std::sync::{Arc, Mutex, MutexGuard};

use crate::errors::AppError;
use crate::gateways::QaGateway;
use crate::models::{
    ConversationTurn, DocumentUploadResponse, PendingUpload, QuestionRequest,
};
use crate::session::SessionManager;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    AwaitingAnswer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoredReason {
    EmptyQuestion,
    AnswerPending,
    SignedOut,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    Answered(ConversationTurn),
    /// The failure was recorded as an answer turn and is handed back as well.
    Failed(AppError),
    Ignored(IgnoredReason),
    /// The transcript was reset while the question was in flight.
    Discarded,
}

#[derive(Default)]
struct UploadSlot {
    pending: Option<PendingUpload>,
    selection: u64,
    in_flight: bool,
    status: Option<String>,
}

struct ConversationState {
    transcript: Vec<ConversationTurn>,
    draft: String,
    phase: Phase,
    epoch: u64,
    upload: UploadSlot,
}

pub struct ConversationEngine {
    session: Arc<SessionManager>,
    gateway: Arc<dyn QaGateway>,
    max_results: Option<u32>,
    state: Mutex<ConversationState>,
}

impl ConversationEngine {
    pub fn new(session: Arc<SessionManager>, gateway: Arc<dyn QaGateway>) -> Self {
        ConversationEngine {
            session,
            gateway,
            max_results: None,
            state: Mutex::new(ConversationState {
                transcript: Vec::new(),
                draft: String::new(),
                phase: Phase::Idle,
                epoch: 0,
                upload: UploadSlot::default(),
            }),
        }
    }

    pub fn with_max_results(mut self, max_results: Option<u32>) -> Self {
        self.max_results = max_results;
        self
    }

    pub fn transcript(&self) -> Vec<ConversationTurn> {
        self.lock_state().transcript.clone()
    }

    pub fn phase(&self) -> Phase {
        self.lock_state().phase
    }

    pub fn is_awaiting_answer(&self) -> bool {
        self.phase() == Phase::AwaitingAnswer
    }

    pub fn draft(&self) -> String {
        self.lock_state().draft.clone()
    }

    pub fn set_draft(&self, text: impl Into<String>) {
        self.lock_state().draft = text.into();
    }

    /// Types `question` into the input and submits it.
    pub async fn ask(&self, question: impl Into<String>) -> SubmitOutcome {
        self.set_draft(question);
        self.submit().await
    }

    /// Submits the current draft. The draft is cleared only once the answer or
    /// failure has arrived, and only if it was not edited in the meantime.
    pub async fn submit(&self) -> SubmitOutcome {
        if !self.session.is_authenticated() {
            log::debug!("Question ignored: not signed in");
            return SubmitOutcome::Ignored(IgnoredReason::SignedOut);
        }

        let (question, epoch) = {
            let mut state = self.lock_state();
            if state.phase == Phase::AwaitingAnswer {
                log::debug!("Question ignored: previous answer still pending");
                return SubmitOutcome::Ignored(IgnoredReason::AnswerPending);
            }
            let question = state.draft.trim().to_string();
            if question.is_empty() {
                return SubmitOutcome::Ignored(IgnoredReason::EmptyQuestion);
            }
            state.transcript.push(ConversationTurn::question(question.clone()));
            state.phase = Phase::AwaitingAnswer;
            (question, state.epoch)
        };

        log::debug!("Asking question ({} chars)", question.len());
        let request = QuestionRequest {
            question: question.clone(),
            max_results: self.max_results,
        };
        let result = self.gateway.ask_question(&request).await;

        let mut state = self.lock_state();
        if state.epoch != epoch {
            log::debug!("Answer arrived after reset; dropped");
            return SubmitOutcome::Discarded;
        }
        state.phase = Phase::Idle;
        if state.draft.trim() == question {
            state.draft.clear();
        }

        match result {
            Ok(response) => {
                let turn = ConversationTurn::answer(response);
                state.transcript.push(turn.clone());
                SubmitOutcome::Answered(turn)
            }
            Err(err) => {
                log::error!("Question failed: {}", err);
                state.transcript.push(ConversationTurn::failure(err.message()));
                SubmitOutcome::Failed(err)
            }
        }
    }

    /// Replaces any earlier selection.
    pub fn select_file(&self, document: PendingUpload) {
        let mut state = self.lock_state();
        log::debug!("Selected {:?}", document);
        state.upload.pending = Some(document);
        state.upload.selection += 1;
    }

    pub fn clear_selection(&self) {
        let mut state = self.lock_state();
        state.upload.pending = None;
        state.upload.selection += 1;
    }

    pub fn pending_upload(&self) -> Option<PendingUpload> {
        self.lock_state().upload.pending.clone()
    }

    pub fn can_upload(&self) -> bool {
        let state = self.lock_state();
        state.upload.pending.is_some() && !state.upload.in_flight
    }

    /// Last upload status line, reported outside the transcript.
    pub fn upload_status(&self) -> Option<String> {
        self.lock_state().upload.status.clone()
    }

    /// Uploads the selected document. A failure keeps the selection so the
    /// same file can be retried; success clears it unless a new file was
    /// picked while the upload was running.
    pub async fn upload(&self) -> Result<DocumentUploadResponse, AppError> {
        if !self.session.is_authenticated() {
            return Err(AppError::StaleSession("Sign in to upload documents".to_string()));
        }

        let (document, selection, epoch) = {
            let mut state = self.lock_state();
            if state.upload.in_flight {
                return Err(AppError::BadRequest("An upload is already in progress".to_string()));
            }
            let Some(document) = state.upload.pending.clone() else {
                return Err(AppError::BadRequest("No document selected".to_string()));
            };
            state.upload.in_flight = true;
            (document, state.upload.selection, state.epoch)
        };

        log::info!("Uploading '{}' ({} bytes)", document.file_name, document.size());
        let result = self.gateway.upload_document(&document).await;

        let mut state = self.lock_state();
        state.upload.in_flight = false;
        // A reset while uploading wiped the status line; keep it wiped.
        let current = state.epoch == epoch;
        match result {
            Ok(response) => {
                log::info!(
                    "Uploaded '{}' as {} ({} segments)",
                    document.file_name,
                    response.document_id,
                    response.segments_created
                );
                if state.upload.selection == selection {
                    state.upload.pending = None;
                }
                if current {
                    state.upload.status = Some(response.summary());
                }
                Ok(response)
            }
            Err(err) => {
                log::error!("Upload of '{}' failed: {}", document.file_name, err);
                if current {
                    state.upload.status = Some(format!("Upload failed: {}", err.message()));
                }
                Err(err)
            }
        }
    }

    /// Clears transcript, draft and selection. An answer still in flight is
    /// dropped when it arrives.
    pub fn reset(&self) {
        let mut state = self.lock_state();
        state.transcript.clear();
        state.draft.clear();
        state.phase = Phase::Idle;
        state.epoch += 1;
        state.upload.pending = None;
        state.upload.selection += 1;
        state.upload.status = None;
    }

    fn lock_state(&self) -> MutexGuard<'_, ConversationState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
