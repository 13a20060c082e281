//! Property tests: random sequences of merges and slices never create or
//! destroy units, and never leave a record outside 1..=max.

use mob_stack::core::types::{EntityId, UserId, Vec2};
use mob_stack::ecs::world::SimWorld;
use mob_stack::host::{Inbox, TagMap};
use mob_stack::simulation::run_merge_pass;
use mob_stack::tool::{ToolController, ToolMode};
use mob_stack::{StackConfig, StackEngine};
use proptest::prelude::*;

const MAX: u32 = 12;

#[derive(Debug, Clone)]
enum Op {
    MergePass,
    Slice(usize),
    SliceAll(usize),
    Spawned(usize),
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        Just(Op::MergePass),
        (0usize..64).prop_map(Op::Slice),
        (0usize..64).prop_map(Op::SliceAll),
        (0usize..64).prop_map(Op::Spawned),
    ]
}

fn arb_creature() -> impl Strategy<Value = (bool, f32, f32, u32)> {
    (any::<bool>(), 0.0f32..32.0, 0.0f32..32.0, 1u32..=MAX)
}

/// Units represented by the world: a stacked creature counts as its size
fn total_units(engine: &StackEngine, world: &SimWorld) -> u64 {
    world
        .entities()
        .map(|id| engine.registry().lookup(id).map_or(1, |r| r.size()) as u64)
        .sum()
}

fn pick(world: &SimWorld, index: usize) -> Option<EntityId> {
    let mut ids: Vec<EntityId> = world.entities().collect();
    ids.sort_by_key(|id| id.0);
    if ids.is_empty() {
        return None;
    }
    Some(ids[index % ids.len()])
}

fn use_tool(engine: &mut StackEngine, world: &mut SimWorld, mode: ToolMode, target: EntityId) {
    let mut item = TagMap::new();
    let mut inbox = Inbox::new();
    mode.write(&mut item);
    // Refusals (single or unstacked targets) are expected and leave state alone
    let _ = ToolController::new(UserId::new(), &mut item)
        .perform_action(engine, world, &mut inbox, target, 0);
}

proptest! {
    #[test]
    fn units_are_conserved_and_sizes_stay_in_bounds(
        creatures in prop::collection::vec(arb_creature(), 1..24),
        ops in prop::collection::vec(arb_op(), 0..32),
    ) {
        let mut engine = StackEngine::new(StackConfig::default().with_max_stack("zombie", MAX));
        let mut world = SimWorld::default();
        for (stacked, x, y, size) in creatures {
            let id = world.spawn("zombie".into(), Vec2::new(x, y));
            if stacked {
                engine.registry_mut().set_size(id, size).unwrap();
            }
        }
        let expected = total_units(&engine, &world);

        for op in ops {
            match op {
                Op::MergePass => {
                    run_merge_pass(&mut engine, &mut world);
                }
                Op::Slice(i) => {
                    if let Some(target) = pick(&world, i) {
                        use_tool(&mut engine, &mut world, ToolMode::Slice, target);
                    }
                }
                Op::SliceAll(i) => {
                    if let Some(target) = pick(&world, i) {
                        use_tool(&mut engine, &mut world, ToolMode::SliceAll, target);
                    }
                }
                Op::Spawned(i) => {
                    if let Some(target) = pick(&world, i) {
                        engine.entity_spawned(&mut world, target);
                    }
                }
            }

            prop_assert_eq!(total_units(&engine, &world), expected);
            for (id, record) in engine.registry().iter() {
                prop_assert!(world.creature(id).is_some());
                prop_assert!(record.size() >= 1);
                prop_assert!(record.size() <= MAX);
            }
        }
    }

    #[test]
    fn merge_pass_is_idempotent_once_settled(
        creatures in prop::collection::vec(arb_creature(), 1..16),
    ) {
        let mut engine = StackEngine::new(StackConfig::default().with_max_stack("zombie", MAX));
        let mut world = SimWorld::default();
        for (stacked, x, y, size) in creatures {
            let id = world.spawn("zombie".into(), Vec2::new(x, y));
            if stacked {
                engine.registry_mut().set_size(id, size).unwrap();
            }
        }

        // Each productive pass removes at least one creature, so this settles
        for _ in 0..32 {
            if run_merge_pass(&mut engine, &mut world).merged == 0 {
                break;
            }
        }
        let settled = world.count();
        let report = run_merge_pass(&mut engine, &mut world);
        prop_assert_eq!(report.merged, 0);
        prop_assert_eq!(world.count(), settled);
    }
}
