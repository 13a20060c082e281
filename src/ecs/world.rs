//! In-memory world - owns creatures, their positions and their tags
//!
//! Stands in for the host simulation in tests and in the demo binary.

use ahash::AHashMap;

use crate::core::error::{Result, StackError};
use crate::core::types::{ChunkCoord, EntityId, EntityKind, Tick, Vec2};
use crate::host::{StackWorld, TagMap, TagStore};
use crate::spatial::SparseHashGrid;

/// One creature in the world
#[derive(Debug, Clone)]
pub struct Creature {
    pub kind: EntityKind,
    pub position: Vec2,
    pub tags: TagMap,
}

/// The game world containing all creatures
pub struct SimWorld {
    pub current_tick: Tick,
    creatures: AHashMap<EntityId, Creature>,
    grid: SparseHashGrid,
}

impl SimWorld {
    pub fn new(chunk_size: f32) -> Self {
        Self {
            current_tick: 0,
            creatures: AHashMap::new(),
            grid: SparseHashGrid::new(chunk_size),
        }
    }

    pub fn spawn(&mut self, kind: EntityKind, position: Vec2) -> EntityId {
        let entity_id = EntityId::new();
        self.grid.insert(entity_id, position);
        self.creatures.insert(
            entity_id,
            Creature { kind, position, tags: TagMap::new() },
        );
        entity_id
    }

    pub fn despawn(&mut self, entity_id: EntityId) -> Option<Creature> {
        let creature = self.creatures.remove(&entity_id)?;
        self.grid.remove(entity_id, creature.position);
        Some(creature)
    }

    pub fn creature(&self, entity_id: EntityId) -> Option<&Creature> {
        self.creatures.get(&entity_id)
    }

    pub fn position(&self, entity_id: EntityId) -> Option<Vec2> {
        self.creatures.get(&entity_id).map(|c| c.position)
    }

    pub fn count(&self) -> usize {
        self.creatures.len()
    }

    pub fn tick(&mut self) {
        self.current_tick += 1;
    }

    pub fn entities(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.creatures.keys().copied()
    }

    /// Same-kind creatures within `radius` of `entity_id`, excluding itself
    pub fn neighbors(&self, entity_id: EntityId, radius: f32) -> Vec<EntityId> {
        let Some(origin) = self.creatures.get(&entity_id) else {
            return Vec::new();
        };
        self.grid
            .query_neighbors(origin.position)
            .filter(|other| *other != entity_id)
            .filter(|other| {
                self.creatures.get(other).is_some_and(|c| {
                    c.kind == origin.kind && c.position.distance(&origin.position) <= radius
                })
            })
            .collect()
    }
}

impl StackWorld for SimWorld {
    fn is_alive(&self, id: EntityId) -> bool {
        self.creatures.contains_key(&id)
    }

    fn kind_of(&self, id: EntityId) -> Option<EntityKind> {
        self.creatures.get(&id).map(|c| c.kind.clone())
    }

    fn chunk_of(&self, id: EntityId) -> Option<ChunkCoord> {
        self.creatures.get(&id).map(|c| self.grid.chunk_of(c.position))
    }

    fn entities_in_chunk(&self, chunk: ChunkCoord) -> Vec<EntityId> {
        self.grid.in_chunk(chunk).to_vec()
    }

    fn spawn_unit(&mut self, source: EntityId) -> Result<EntityId> {
        let (kind, position) = self
            .creatures
            .get(&source)
            .map(|c| (c.kind.clone(), c.position))
            .ok_or(StackError::UnknownEntity(source))?;
        Ok(self.spawn(kind, position))
    }

    fn despawn(&mut self, id: EntityId) {
        SimWorld::despawn(self, id);
    }

    fn tags(&self, id: EntityId) -> Option<&dyn TagStore> {
        self.creatures.get(&id).map(|c| &c.tags as &dyn TagStore)
    }

    fn tags_mut(&mut self, id: EntityId) -> Option<&mut dyn TagStore> {
        self.creatures.get_mut(&id).map(|c| &mut c.tags as &mut dyn TagStore)
    }
}

impl Default for SimWorld {
    fn default() -> Self {
        Self::new(16.0)
    }
}
