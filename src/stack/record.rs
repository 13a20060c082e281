//! Persisted state of one stack

use serde::{Deserialize, Serialize};

use crate::core::error::{Result, StackError};
use crate::host::{TagKey, TagStore};

/// Size and flags of the stack carried by one creature
///
/// `size` is never below 1. A record of size 1 is a single creature that
/// still carries bookkeeping, which tool interactions treat as stacked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackRecord {
    size: u32,
    forget_on_spawn: bool,
}

impl StackRecord {
    pub fn new() -> Self {
        Self { size: 1, forget_on_spawn: false }
    }

    pub fn with_size(size: u32) -> Result<Self> {
        let mut record = Self::new();
        record.set_size(size)?;
        Ok(record)
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn is_single(&self) -> bool {
        self.size == 1
    }

    pub fn set_size(&mut self, size: u32) -> Result<()> {
        if size < 1 {
            return Err(StackError::InvalidSize { size: size as i64 });
        }
        self.size = size;
        Ok(())
    }

    /// Absorb `units` more units (saturates instead of wrapping)
    pub fn grow(&mut self, units: u32) {
        self.size = self.size.saturating_add(units);
    }

    /// Remove one unit
    pub fn shrink(&mut self) -> Result<()> {
        if self.is_single() {
            return Err(StackError::NothingToSlice);
        }
        self.size -= 1;
        Ok(())
    }

    pub fn forget_on_spawn(&self) -> bool {
        self.forget_on_spawn
    }

    pub fn set_forget_on_spawn(&mut self, forget: bool) {
        self.forget_on_spawn = forget;
    }

    /// Write this record onto a creature's tags
    pub fn write_tags(&self, tags: &mut dyn TagStore) {
        tags.set_int(TagKey::StackSize, i32::try_from(self.size).unwrap_or(i32::MAX));
        if self.forget_on_spawn {
            tags.set_bool(TagKey::ForgetOnSpawn, true);
        } else {
            tags.remove(TagKey::ForgetOnSpawn);
        }
    }

    /// Read a record back from a creature's tags
    ///
    /// Returns `None` when the creature carries no size tag, or when the stored
    /// size is below 1 (corrupted data is treated as unstacked).
    pub fn read_tags(tags: &dyn TagStore) -> Option<Self> {
        let raw = tags.get_int(TagKey::StackSize)?;
        let size = u32::try_from(raw).ok().filter(|s| *s >= 1);
        let Some(size) = size else {
            tracing::warn!("Ignoring stored stack size {} (must be at least 1)", raw);
            return None;
        };
        Some(Self {
            size,
            forget_on_spawn: tags.get_bool(TagKey::ForgetOnSpawn).unwrap_or(false),
        })
    }

    /// Remove every stack tag from a creature
    pub fn clear_tags(tags: &mut dyn TagStore) {
        tags.remove(TagKey::StackSize);
        tags.remove(TagKey::ForgetOnSpawn);
    }
}

impl Default for StackRecord {
    fn default() -> Self {
        Self::new()
    }
}
