use serde::{Deserialize, Serialize};

use crate::models::document::QuestionResponse;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TurnKind {
    Question,
    Answer,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ConversationTurn {
    pub kind: TurnKind,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sources: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

impl ConversationTurn {
    pub fn question(text: impl Into<String>) -> Self {
        ConversationTurn {
            kind: TurnKind::Question,
            text: text.into(),
            sources: None,
            confidence: None,
        }
    }

    /// Answer turn with sources kept in the order the service returned them.
    pub fn answer(response: QuestionResponse) -> Self {
        ConversationTurn {
            kind: TurnKind::Answer,
            text: response.answer,
            sources: Some(response.sources),
            confidence: Some(response.confidence),
        }
    }

    pub fn failure(message: impl AsRef<str>) -> Self {
        ConversationTurn {
            kind: TurnKind::Answer,
            text: format!("Error: {}", message.as_ref()),
            sources: None,
            confidence: None,
        }
    }

    pub fn is_question(&self) -> bool {
        self.kind == TurnKind::Question
    }

    pub fn source_count(&self) -> usize {
        self.sources.as_ref().map_or(0, Vec::len)
    }
}
