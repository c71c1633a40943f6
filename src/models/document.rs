use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// A locally selected document waiting to be uploaded.
#[derive(Clone, PartialEq)]
pub struct PendingUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl PendingUpload {
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        PendingUpload {
            file_name: file_name.into(),
            bytes: bytes.into(),
        }
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

impl fmt::Debug for PendingUpload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingUpload")
            .field("file_name", &self.file_name)
            .field("size", &self.bytes.len())
            .finish()
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DocumentUploadResponse {
    pub document_id: Uuid,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
    pub message: String,
    pub segments_created: u32,
}

impl DocumentUploadResponse {
    pub fn summary(&self) -> String {
        format!("{} ({} segments created)", self.message, self.segments_created)
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QuestionRequest {
    pub question: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_results: Option<u32>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QuestionResponse {
    pub answer: String,
    #[serde(default)]
    pub sources: Vec<String>,
    pub confidence: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_summary_matches_status_line() {
        let response: DocumentUploadResponse = serde_json::from_str(
            r#"{
                "documentId": "5f1c2b9e-3f7a-4c55-9a1e-6c2d7b8e9f00",
                "filename": "leave-policy.pdf",
                "size": 20480,
                "message": "Document uploaded successfully",
                "segmentsCreated": 12
            }"#,
        )
        .unwrap();
        assert_eq!(
            response.summary(),
            "Document uploaded successfully (12 segments created)"
        );
    }

    #[test]
    fn question_request_omits_unset_max_results() {
        let request = QuestionRequest {
            question: "How many leave days?".into(),
            max_results: None,
        };
        let json = serde_json::to_string(&request).unwrap();
        assert_eq!(json, r#"{"question":"How many leave days?"}"#);
    }

    #[test]
    fn pending_upload_debug_skips_contents() {
        let pending = PendingUpload::new("handbook.txt", b"confidential".to_vec());
        let debug = format!("{:?}", pending);
        assert!(debug.contains("handbook.txt"));
        assert!(!debug.contains("confidential"));
    }
}
