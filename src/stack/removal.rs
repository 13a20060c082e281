//! Discarding stack data from creatures

use crate::core::error::{Result, StackError};
use crate::core::types::EntityId;
use crate::host::StackWorld;
use crate::stack::record::StackRecord;
use crate::stack::registry::StackRegistry;

/// Result of clearing every stack in a chunk
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChunkSweep {
    pub cleared: usize,
    /// Records dropped whose creature could not have its tags cleared
    pub failed: usize,
}

/// Drop the record on one creature and wipe its persisted tags
///
/// Returns true if the creature had a record.
pub fn remove_stack_data(
    registry: &mut StackRegistry,
    world: &mut dyn StackWorld,
    id: EntityId,
) -> bool {
    let had_record = registry.remove(id).is_some();
    if let Some(tags) = world.tags_mut(id) {
        StackRecord::clear_tags(tags);
    }
    had_record
}

/// Clear every stacked creature in the same chunk as `target`.
///
/// Best effort: a creature that vanished mid-sweep is counted as failed and
/// the sweep carries on.
pub fn remove_chunk(
    registry: &mut StackRegistry,
    world: &mut dyn StackWorld,
    target: EntityId,
) -> Result<ChunkSweep> {
    let chunk = world
        .chunk_of(target)
        .ok_or(StackError::UnknownEntity(target))?;

    let mut sweep = ChunkSweep::default();
    for id in world.entities_in_chunk(chunk) {
        if !registry.is_stacked(id) {
            continue;
        }
        registry.remove(id);
        match world.tags_mut(id) {
            Some(tags) => {
                StackRecord::clear_tags(tags);
                sweep.cleared += 1;
            }
            None => {
                tracing::warn!("Creature {} vanished while clearing chunk {:?}", id, chunk);
                sweep.failed += 1;
            }
        }
    }

    tracing::info!(
        "Cleared {} stacks in chunk {:?} ({} failed)",
        sweep.cleared,
        chunk,
        sweep.failed
    );
    Ok(sweep)
}
