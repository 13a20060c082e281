//! Stack engine configuration
//!
//! Every tunable number lives here. Values can be loaded from a TOML file;
//! anything absent from the file keeps its default.

use ahash::AHashMap;
use serde::Deserialize;

use crate::core::error::StackError;
use crate::core::types::{EntityKind, Tick};
use crate::host::SizeLimits;

/// Largest stack size a creature tag can hold
pub const MAX_PERSISTED_SIZE: u32 = i32::MAX as u32;

/// How the prompt deadline reacts to user input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeoutPolicy {
    /// Deadline restarts on every line the user types
    #[default]
    Inactivity,
    /// Deadline is fixed at session start
    Absolute,
}

/// Configuration for the stack engine
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StackConfig {
    // === STACK LIMITS ===
    /// Maximum stack size for kinds without an explicit entry
    pub default_max_stack: u32,

    /// Per-kind maximum stack size
    ///
    /// Bounds both merges and the sizes accepted by the modify prompt.
    pub max_stack: AHashMap<EntityKind, u32>,

    // === SPATIAL ===
    /// Edge length of a chunk in world units
    ///
    /// REMOVE_CHUNK clears every stack sharing the target's chunk.
    pub chunk_size: f32,

    /// Distance within which two same-kind creatures are merge candidates
    pub merge_radius: f32,

    // === PROMPT ===
    /// Ticks a size prompt waits before it is abandoned
    pub prompt_timeout: Tick,

    /// Whether input pushes the prompt deadline back
    pub timeout_policy: TimeoutPolicy,
}

impl Default for StackConfig {
    fn default() -> Self {
        Self {
            default_max_stack: 30,
            max_stack: AHashMap::new(),
            chunk_size: 16.0,
            merge_radius: 5.0,
            prompt_timeout: 25,
            timeout_policy: TimeoutPolicy::Inactivity,
        }
    }
}

impl StackConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum stack size for one kind (builder style)
    pub fn with_max_stack(mut self, kind: impl Into<EntityKind>, max: u32) -> Self {
        self.max_stack.insert(kind.into(), max);
        self
    }

    /// Load configuration from a TOML file
    pub fn load_from_toml(path: &std::path::Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError(e.to_string()))?;
        Self::parse_toml(&content)
    }

    /// Parse configuration from a TOML string and validate it
    pub fn parse_toml(content: &str) -> Result<Self, ConfigError> {
        let config: StackConfig = toml::from_str(content)
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate().map_err(ConfigError::Invalid)?;
        Ok(config)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<(), String> {
        if self.default_max_stack < 1 {
            return Err("default_max_stack must be at least 1".into());
        }

        if let Some((kind, _)) = self.max_stack.iter().find(|(_, max)| **max < 1) {
            return Err(format!("max_stack for {} must be at least 1", kind));
        }

        // Sizes are persisted as 32-bit signed tags
        if self.default_max_stack > MAX_PERSISTED_SIZE {
            return Err(format!(
                "default_max_stack ({}) cannot exceed {}",
                self.default_max_stack, MAX_PERSISTED_SIZE
            ));
        }

        if let Some((kind, max)) = self.max_stack.iter().find(|(_, max)| **max > MAX_PERSISTED_SIZE) {
            return Err(format!(
                "max_stack for {} ({}) cannot exceed {}",
                kind, max, MAX_PERSISTED_SIZE
            ));
        }

        if self.chunk_size <= 0.0 {
            return Err(format!("chunk_size ({}) must be positive", self.chunk_size));
        }

        if self.merge_radius <= 0.0 {
            return Err(format!("merge_radius ({}) must be positive", self.merge_radius));
        }

        // Neighbor queries only look at the surrounding 3x3 chunks
        if self.merge_radius > self.chunk_size {
            return Err(format!(
                "merge_radius ({}) cannot exceed chunk_size ({})",
                self.merge_radius, self.chunk_size
            ));
        }

        if self.prompt_timeout == 0 {
            return Err("prompt_timeout must be at least one tick".into());
        }

        Ok(())
    }
}

impl SizeLimits for StackConfig {
    fn max_stack(&self, kind: &EntityKind) -> u32 {
        self.max_stack
            .get(kind)
            .copied()
            .unwrap_or(self.default_max_stack)
    }
}

/// Error type for configuration loading
#[derive(Debug, Clone)]
pub enum ConfigError {
    IoError(String),
    ParseError(String),
    Invalid(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError(e) => write!(f, "IO error: {}", e),
            ConfigError::ParseError(e) => write!(f, "Parse error: {}", e),
            ConfigError::Invalid(e) => write!(f, "Invalid configuration: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<ConfigError> for StackError {
    fn from(e: ConfigError) -> Self {
        StackError::Config(e.to_string())
    }
}
