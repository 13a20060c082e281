//! Peeling single units off a stack

use crate::core::error::{Result, StackError};
use crate::core::types::EntityId;
use crate::host::StackWorld;
use crate::stack::record::StackRecord;
use crate::stack::registry::StackRegistry;

/// A unit taken off a stack that the world layer still has to materialize
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlicedUnit {
    /// Creature the unit was taken from; the new unit appears next to it
    pub source: EntityId,
    pub forget_on_spawn: bool,
}

impl SlicedUnit {
    /// Record the materialized unit starts with
    pub fn record(&self) -> StackRecord {
        let mut record = StackRecord::new();
        record.set_forget_on_spawn(self.forget_on_spawn);
        record
    }
}

pub struct SliceOperation;

impl SliceOperation {
    /// Take exactly one unit off `record`
    pub fn slice(record: &mut StackRecord, source: EntityId) -> Result<SlicedUnit> {
        record.shrink()?;
        Ok(SlicedUnit { source, forget_on_spawn: false })
    }

    /// Peel `count` units off the stack on `source`, spawning each one.
    ///
    /// The source keeps its identity and record. `count` is validated before
    /// anything changes; a failing spawn returns its unit to the stack and
    /// stops, leaving units already produced in the world.
    pub fn peel(
        registry: &mut StackRegistry,
        world: &mut dyn StackWorld,
        source: EntityId,
        count: u32,
        forget_on_spawn: bool,
    ) -> Result<Vec<EntityId>> {
        let size = registry
            .lookup(source)
            .map(|record| record.size())
            .ok_or(StackError::NothingToSlice)?;
        if count == 0 || count >= size {
            return Err(StackError::NothingToSlice);
        }

        let mut produced = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let record = registry
                .lookup_mut(source)
                .ok_or(StackError::UnknownEntity(source))?;
            let mut unit = Self::slice(record, source)?;
            unit.forget_on_spawn = forget_on_spawn;

            let spawned = match world.spawn_unit(source) {
                Ok(id) => id,
                Err(e) => {
                    if let Some(record) = registry.lookup_mut(source) {
                        record.grow(1);
                    }
                    tracing::warn!("Failed to spawn unit sliced from {}: {}", source, e);
                    return Err(e);
                }
            };

            let record = unit.record();
            if let Some(tags) = world.tags_mut(spawned) {
                record.write_tags(tags);
            }
            registry.insert(spawned, record);
            produced.push(spawned);
        }

        tracing::debug!(
            "Sliced {} units off {} (forget_on_spawn: {})",
            produced.len(),
            source,
            forget_on_spawn
        );
        Ok(produced)
    }

    /// Peel every unit but one, flagging all products forget-on-spawn
    pub fn slice_all(
        registry: &mut StackRegistry,
        world: &mut dyn StackWorld,
        source: EntityId,
    ) -> Result<Vec<EntityId>> {
        let size = registry
            .lookup(source)
            .map(|record| record.size())
            .ok_or(StackError::NothingToSlice)?;
        Self::peel(registry, world, source, size - 1, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Vec2;
    use crate::ecs::world::SimWorld;

    #[test]
    fn test_slice_decrements_by_one() {
        let mut record = StackRecord::with_size(5).unwrap();
        let source = EntityId::new();
        let unit = SliceOperation::slice(&mut record, source).unwrap();
        assert_eq!(record.size(), 4);
        assert_eq!(unit.source, source);
        assert_eq!(unit.record().size(), 1);
    }

    #[test]
    fn test_slice_single_is_rejected() {
        let mut record = StackRecord::new();
        let result = SliceOperation::slice(&mut record, EntityId::new());
        assert!(matches!(result, Err(StackError::NothingToSlice)));
        assert_eq!(record.size(), 1);
    }

    #[test]
    fn test_peel_spawns_new_units() {
        let mut world = SimWorld::new(16.0);
        let mut registry = StackRegistry::new();
        let source = world.spawn("zombie".into(), Vec2::new(3.0, 3.0));
        registry.set_size(source, 6).unwrap();

        let units = SliceOperation::peel(&mut registry, &mut world, source, 2, false).unwrap();

        assert_eq!(units.len(), 2);
        assert!(units.iter().all(|id| *id != source));
        assert_eq!(registry.lookup(source).map(|r| r.size()), Some(4));
        assert_eq!(world.count(), 3);
        for id in &units {
            assert_eq!(registry.lookup(*id).map(|r| r.size()), Some(1));
            assert_eq!(world.position(*id), Some(Vec2::new(3.0, 3.0)));
        }
    }

    #[test]
    fn test_peel_too_many_changes_nothing() {
        let mut world = SimWorld::new(16.0);
        let mut registry = StackRegistry::new();
        let source = world.spawn("zombie".into(), Vec2::new(0.0, 0.0));
        registry.set_size(source, 3).unwrap();

        let result = SliceOperation::peel(&mut registry, &mut world, source, 3, false);
        assert!(matches!(result, Err(StackError::NothingToSlice)));
        assert_eq!(registry.lookup(source).map(|r| r.size()), Some(3));
        assert_eq!(world.count(), 1);
    }

    #[test]
    fn test_slice_all_flags_products() {
        let mut world = SimWorld::new(16.0);
        let mut registry = StackRegistry::new();
        let source = world.spawn("cow".into(), Vec2::new(0.0, 0.0));
        registry.set_size(source, 4).unwrap();

        let units = SliceOperation::slice_all(&mut registry, &mut world, source).unwrap();

        assert_eq!(units.len(), 3);
        assert_eq!(registry.lookup(source).map(|r| r.size()), Some(1));
        assert!(units
            .iter()
            .all(|id| registry.lookup(*id).is_some_and(|r| r.forget_on_spawn())));
    }
}
