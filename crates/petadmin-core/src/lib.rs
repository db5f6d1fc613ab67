pub mod config;
pub mod error;
pub mod types;

pub use config::{DatabaseConfig, LoggingConfig, ServerConfig, Settings};
pub use error::{PetAdminError, Result};
pub use types::*;
