pub mod document;
pub mod validation;
