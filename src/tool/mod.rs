//! Stacking tool: mode handling, dispatch and the size prompt

pub mod controller;
pub mod mode;
pub mod prompt;
pub mod sessions;

pub use controller::{ToolController, ToolOutcome};
pub use mode::ToolMode;
pub use prompt::{AbandonReason, Deadline, InputRejection, PromptState, SizePrompt};
pub use sessions::PromptSessions;
