use thiserror::Error;

use crate::core::types::EntityId;
use crate::tool::mode::ToolMode;

/// Errors raised by stack operations.
///
/// The `Display` text of the user-recoverable variants is exactly what the
/// user is shown, so callers can forward it to the messaging layer as is.
#[derive(Error, Debug)]
pub enum StackError {
    #[error("You cannot use {mode} on an unstacked entity!")]
    UnstackedTarget { mode: ToolMode },

    #[error("Entity is single, therefore it cannot be sliced!")]
    NothingToSlice,

    #[error("Entity is no longer valid. Modification has been cancelled.")]
    TargetGone(EntityId),

    #[error("Stack size must be at least 1, got {size}")]
    InvalidSize { size: i64 },

    #[error("Entity not found: {0}")]
    UnknownEntity(EntityId),

    #[error("No matching tool mode for stored id {0}")]
    UnsupportedToolMode(i32),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl StackError {
    /// True for conditions caused by user input or world state that the user
    /// can fix by acting differently. Everything else indicates corrupted
    /// state or a caller bug.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            StackError::UnstackedTarget { .. }
                | StackError::NothingToSlice
                | StackError::TargetGone(_)
                | StackError::UnknownEntity(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, StackError>;
