pub mod conversation;
pub mod document;
pub mod employee;
pub mod identity;

pub use conversation::{ConversationTurn, TurnKind};
pub use document::{DocumentUploadResponse, PendingUpload, QuestionRequest, QuestionResponse};
pub use employee::{
    EmployeeRecord, EmployeeRequest, EmployeeStatus, EmploymentType, Gender, ProfilePatch,
    SalaryUpdate,
};
pub use identity::{AuthResponse, Identity, LoginRequest, RegisterRequest, Role};
