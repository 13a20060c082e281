//! Interfaces to the host simulation
//!
//! The engine never owns creatures. Everything it needs from the world
//! (liveness, kinds, chunk membership, spawning, tag persistence, chat) goes
//! through the traits below.

pub mod messaging;
pub mod tags;

pub use messaging::{Inbox, Message, MessageChannel, Messenger};
pub use tags::{TagKey, TagMap, TagStore, TagValue};

use crate::core::error::Result;
use crate::core::types::{ChunkCoord, EntityId, EntityKind};

/// Host world as seen by the stack engine
pub trait StackWorld {
    fn is_alive(&self, id: EntityId) -> bool;

    fn kind_of(&self, id: EntityId) -> Option<EntityKind>;

    fn chunk_of(&self, id: EntityId) -> Option<ChunkCoord>;

    /// Creatures currently inside a chunk, in no particular order
    fn entities_in_chunk(&self, chunk: ChunkCoord) -> Vec<EntityId>;

    /// Materialize a new standalone creature of the same kind next to `source`
    fn spawn_unit(&mut self, source: EntityId) -> Result<EntityId>;

    fn despawn(&mut self, id: EntityId);

    fn tags(&self, id: EntityId) -> Option<&dyn TagStore>;

    fn tags_mut(&mut self, id: EntityId) -> Option<&mut dyn TagStore>;
}

/// Per-kind maximum stack size table
pub trait SizeLimits {
    fn max_stack(&self, kind: &EntityKind) -> u32;
}
