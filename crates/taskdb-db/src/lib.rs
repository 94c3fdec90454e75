pub mod config;
pub mod error;
pub mod models;
pub mod repository;

// Re-exports
pub use config::DbConfig;
pub use error::{Error, Result};
pub use repository::{Database, MongoTaskStore};
