//! Sparse chunk index for neighbor and chunk-membership queries

use ahash::AHashMap;
use crate::core::types::{ChunkCoord, EntityId, Vec2};

/// Sparse hash of chunk coordinates to the creatures inside them
pub struct SparseHashGrid {
    chunk_size: f32,
    cells: AHashMap<ChunkCoord, Vec<EntityId>>,
}

impl SparseHashGrid {
    pub fn new(chunk_size: f32) -> Self {
        Self {
            chunk_size,
            cells: AHashMap::new(),
        }
    }

    #[inline]
    pub fn chunk_of(&self, pos: Vec2) -> ChunkCoord {
        ChunkCoord::containing(pos, self.chunk_size)
    }

    pub fn insert(&mut self, entity: EntityId, pos: Vec2) {
        let coord = self.chunk_of(pos);
        self.cells.entry(coord).or_default().push(entity);
    }

    pub fn remove(&mut self, entity: EntityId, pos: Vec2) {
        let coord = self.chunk_of(pos);
        if let Some(cell) = self.cells.get_mut(&coord) {
            cell.retain(|&e| e != entity);
            if cell.is_empty() {
                self.cells.remove(&coord);
            }
        }
    }

    /// Creatures in exactly one chunk
    pub fn in_chunk(&self, chunk: ChunkCoord) -> &[EntityId] {
        self.cells.get(&chunk).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Query all entities in neighboring chunks (3x3 neighborhood)
    pub fn query_neighbors(&self, pos: Vec2) -> impl Iterator<Item = EntityId> + '_ {
        let ChunkCoord { x: cx, z: cz } = self.chunk_of(pos);

        (-1..=1).flat_map(move |dx| {
            (-1..=1).flat_map(move |dz| {
                self.cells.get(&ChunkCoord::new(cx + dx, cz + dz))
                    .into_iter()
                    .flatten()
                    .copied()
            })
        })
    }
}
