//! Mob Stack - entity stacking engine
//!
//! Groups many same-kind creatures into one visible creature carrying a
//! count. The engine decides when two creatures merge, how units are sliced
//! back off a stack, and drives the stacking tool with its interactive size
//! prompt. The host world is reached only through the traits in [`host`].

pub mod core;
pub mod ecs;
pub mod engine;
pub mod host;
pub mod simulation;
pub mod spatial;
pub mod stack;
pub mod tool;

pub use crate::core::config::StackConfig;
pub use crate::core::error::{Result, StackError};
pub use engine::StackEngine;
