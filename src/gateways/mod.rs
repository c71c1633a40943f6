pub mod auth;
pub mod client;
pub mod employee;
pub mod qa;

pub use auth::{AuthGateway, HttpAuthGateway};
pub use client::{ApiClient, CallKind, TokenSource};
pub use employee::{EmployeeGateway, HttpEmployeeGateway};
pub use qa::{HttpQaGateway, QaGateway};
