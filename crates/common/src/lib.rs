//! FabLore Common Library
//!
//! Shared code for the FabLore query engine including:
//! - Configuration management
//! - Error types and handling
//! - Document store abstraction
//! - Generative answer backend abstraction

pub mod backend;
pub mod config;
pub mod errors;
pub mod store;

// Re-export commonly used types
pub use backend::{create_backend, AnswerBackend};
pub use config::EngineConfig;
pub use errors::{EngineError, Result};
pub use store::{DocumentStore, StoredPassage};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default generative model
pub const DEFAULT_BACKEND_MODEL: &str = "gpt-4-turbo-preview";
