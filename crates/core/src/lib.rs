//! sectiondb core library
//!
//! Foundational utilities shared by the sectiondb crates:
//! - Error handling (`AppError`, `AppResult`)
//! - Logging infrastructure
//! - Configuration management

pub mod config;
pub mod error;
pub mod logging;

// Re-export commonly used types
pub use config::{AppConfig, MilvusSettings};
pub use error::{AppError, AppResult};
