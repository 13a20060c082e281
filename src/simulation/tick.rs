//! Per-tick world systems: the proximity merge pass and prompt expiry

use crate::core::types::EntityId;
use crate::ecs::world::SimWorld;
use crate::engine::StackEngine;
use crate::host::Messenger;
use crate::stack::MergeOutcome;

/// Summary of one merge pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergePassReport {
    pub merged: usize,
    pub vetoed: usize,
    /// Creatures folded into a neighbor and despawned
    pub absorbed: Vec<EntityId>,
}

/// Pair nearby same-kind creatures and fold them together.
///
/// Larger stacks are visited first so that small groups join the biggest
/// stack around them. Absorbed creatures are despawned immediately and never
/// considered again in the same pass.
pub fn run_merge_pass(engine: &mut StackEngine, world: &mut SimWorld) -> MergePassReport {
    let mut report = MergePassReport::default();
    let radius = engine.config().merge_radius;

    let mut candidates: Vec<(EntityId, u32)> = world
        .entities()
        .map(|id| (id, engine.registry().lookup(id).map_or(0, |r| r.size())))
        .collect();
    candidates.sort_by(|a, b| b.1.cmp(&a.1));

    for (first, _) in candidates {
        if world.creature(first).is_none() {
            continue;
        }
        for nearby in world.neighbors(first, radius) {
            match engine.merge(world, first, nearby) {
                MergeOutcome::Merged { absorbed, .. } => {
                    world.despawn(absorbed);
                    engine.entity_removed(absorbed);
                    report.absorbed.push(absorbed);
                    report.merged += 1;
                }
                MergeOutcome::Vetoed => report.vetoed += 1,
                MergeOutcome::Skipped(_) => {}
            }
        }
    }

    if report.merged > 0 {
        tracing::debug!("Merge pass folded {} creatures", report.merged);
    }
    report
}

/// Advance world time by one tick and expire overdue prompts
pub fn run_simulation_tick(
    engine: &mut StackEngine,
    world: &mut SimWorld,
    messenger: &mut dyn Messenger,
) -> usize {
    world.tick();
    engine.advance(world.current_tick, messenger)
}
