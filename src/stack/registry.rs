//! Lookup from live creatures to their stack records

use ahash::{AHashMap, AHashSet};

use crate::core::error::{Result, StackError};
use crate::core::types::{ChunkCoord, EntityId};
use crate::host::{StackWorld, TagStore};
use crate::stack::record::StackRecord;

/// Owns every stack record of one loaded world
///
/// The registry only maintains the mapping. Writing records back onto
/// creatures is explicit (`persist`, `unload_entity`) so the caller decides
/// when the host sees a change.
#[derive(Debug, Default)]
pub struct StackRegistry {
    records: AHashMap<EntityId, StackRecord>,
    /// Spawned units whose forget-on-spawn record was dropped; kept out of
    /// merging until they leave memory or are given an explicit size
    forgotten: AHashSet<EntityId>,
}

impl StackRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lookup(&self, id: EntityId) -> Option<&StackRecord> {
        self.records.get(&id)
    }

    pub fn lookup_mut(&mut self, id: EntityId) -> Option<&mut StackRecord> {
        self.records.get_mut(&id)
    }

    /// True when the creature carries any stack record, including size 1
    pub fn is_stacked(&self, id: EntityId) -> bool {
        self.records.contains_key(&id)
    }

    /// Fetch the creature's record, creating a size-1 record if it has none
    pub fn register(&mut self, id: EntityId) -> &mut StackRecord {
        self.records.entry(id).or_insert_with(|| {
            tracing::debug!("Registered stack for {}", id);
            StackRecord::new()
        })
    }

    /// Fetch-or-create the record and set its size
    pub fn set_size(&mut self, id: EntityId, size: u32) -> Result<&StackRecord> {
        if size < 1 {
            return Err(StackError::InvalidSize { size: size as i64 });
        }
        self.forgotten.remove(&id);
        let record = self.register(id);
        record.set_size(size)?;
        Ok(record)
    }

    pub(crate) fn insert(&mut self, id: EntityId, record: StackRecord) -> Option<StackRecord> {
        self.records.insert(id, record)
    }

    /// Delete the creature's record; removing a missing record is a no-op
    pub fn remove(&mut self, id: EntityId) -> Option<StackRecord> {
        let removed = self.records.remove(&id);
        if removed.is_some() {
            tracing::debug!("Removed stack for {}", id);
        }
        removed
    }

    /// A unit was materialized in the world.
    ///
    /// Records flagged forget-on-spawn are discarded so the unit carries no
    /// stack data, but the unit stays excluded from merging (see
    /// [`StackRegistry::is_forgotten`]). Returns true when the record was
    /// forgotten.
    pub fn on_spawn(&mut self, id: EntityId) -> bool {
        let forget = self
            .records
            .get(&id)
            .is_some_and(|record| record.forget_on_spawn());
        if forget {
            self.records.remove(&id);
            self.forgotten.insert(id);
        }
        forget
    }

    /// True for a spawned unit that must not be merged back into a stack
    pub fn is_forgotten(&self, id: EntityId) -> bool {
        self.forgotten.contains(&id)
    }

    /// The creature left the world; its record goes with it
    pub fn on_removed(&mut self, id: EntityId) {
        self.remove(id);
        self.forgotten.remove(&id);
    }

    /// Adopt the record persisted on a creature, if any
    pub fn load_entity(&mut self, id: EntityId, tags: &dyn TagStore) -> Option<StackRecord> {
        let record = StackRecord::read_tags(tags)?;
        self.records.insert(id, record);
        Some(record)
    }

    /// Write the creature's record to its tags and drop it from memory
    pub fn unload_entity(&mut self, id: EntityId, tags: &mut dyn TagStore) -> Option<StackRecord> {
        self.forgotten.remove(&id);
        let record = self.records.remove(&id);
        match &record {
            Some(record) => record.write_tags(tags),
            None => StackRecord::clear_tags(tags),
        }
        record
    }

    /// Mirror the current record (or its absence) onto the creature's tags.
    ///
    /// Returns false when the creature is no longer in the world.
    pub fn persist(&self, id: EntityId, world: &mut dyn StackWorld) -> bool {
        let Some(tags) = world.tags_mut(id) else {
            return false;
        };
        match self.records.get(&id) {
            Some(record) => record.write_tags(tags),
            None => StackRecord::clear_tags(tags),
        }
        true
    }

    /// Load every persisted stack in a chunk. Returns how many were adopted.
    pub fn load_chunk(&mut self, world: &dyn StackWorld, chunk: ChunkCoord) -> usize {
        let mut loaded = 0;
        for id in world.entities_in_chunk(chunk) {
            if let Some(tags) = world.tags(id) {
                if self.load_entity(id, tags).is_some() {
                    loaded += 1;
                }
            }
        }
        tracing::debug!("Loaded {} stacks from chunk {:?}", loaded, chunk);
        loaded
    }

    /// Persist and forget every stack in a chunk. Returns how many were written.
    pub fn unload_chunk(&mut self, world: &mut dyn StackWorld, chunk: ChunkCoord) -> usize {
        let mut unloaded = 0;
        for id in world.entities_in_chunk(chunk) {
            self.forgotten.remove(&id);
            if !self.records.contains_key(&id) {
                continue;
            }
            if let Some(tags) = world.tags_mut(id) {
                self.unload_entity(id, tags);
                unloaded += 1;
            }
        }
        tracing::debug!("Unloaded {} stacks from chunk {:?}", unloaded, chunk);
        unloaded
    }

    /// Drop every record (world unload)
    pub fn clear(&mut self) {
        self.records.clear();
        self.forgotten.clear();
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &StackRecord)> + '_ {
        self.records.iter().map(|(id, record)| (*id, record))
    }
}
