pub mod config;
pub mod error;
pub mod types;

pub use config::{ConfigError, StackConfig, TimeoutPolicy};
pub use error::{Result, StackError};
