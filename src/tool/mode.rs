//! Stacking tool modes and their persistence on the tool item

use crate::core::error::{Result, StackError};
use crate::host::{TagKey, TagStore};

/// What the stacking tool does to the creature it is used on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolMode {
    /// Prompt for an exact stack size
    Modify,
    /// Detach one unit
    Slice,
    /// Detach every unit but one
    SliceAll,
    /// Clear the target's stack data
    RemoveSingle,
    /// Clear stack data of every creature in the target's chunk
    RemoveChunk,
}

impl ToolMode {
    /// Cycling order
    pub const ALL: [ToolMode; 5] = [
        ToolMode::Modify,
        ToolMode::Slice,
        ToolMode::SliceAll,
        ToolMode::RemoveSingle,
        ToolMode::RemoveChunk,
    ];

    /// Mode of a tool that never had one stored
    pub const DEFAULT: ToolMode = ToolMode::Slice;

    /// Stable code persisted on the item; independent of `ALL` ordering
    pub const fn code(self) -> i32 {
        match self {
            ToolMode::Modify => 0,
            ToolMode::Slice => 1,
            ToolMode::SliceAll => 2,
            ToolMode::RemoveSingle => 3,
            ToolMode::RemoveChunk => 4,
        }
    }

    pub fn from_code(code: i32) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.code() == code)
            .ok_or(StackError::UnsupportedToolMode(code))
    }

    /// Next mode in cycling order, wrapping from last to first
    pub fn next(self) -> Self {
        let index = Self::ALL.iter().position(|m| *m == self).unwrap_or(0);
        Self::ALL[(index + 1) % Self::ALL.len()]
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            ToolMode::Modify => "MODIFY",
            ToolMode::Slice => "SLICE",
            ToolMode::SliceAll => "SLICE_ALL",
            ToolMode::RemoveSingle => "REMOVE_SINGLE",
            ToolMode::RemoveChunk => "REMOVE_CHUNK",
        }
    }

    /// Read the mode stored on a tool item
    pub fn read(item: &dyn TagStore) -> Result<Self> {
        match item.get_int(TagKey::ToolMode) {
            Some(code) => Self::from_code(code),
            None => Ok(Self::DEFAULT),
        }
    }

    pub fn write(self, item: &mut dyn TagStore) {
        item.set_int(TagKey::ToolMode, self.code());
    }
}

impl std::fmt::Display for ToolMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
