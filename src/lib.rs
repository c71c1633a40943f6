pub mod config;
pub mod conversation;
pub mod directory;
pub mod errors;
pub mod gateways;
pub mod models;
pub mod policy;
pub mod portal;
pub mod session;
pub mod store;
pub mod utils;

pub use errors::AppError;
pub use portal::Portal;
