//! Stack engine service
//!
//! Bundles everything the engine keeps in memory for one loaded world: the
//! configuration, the stack registry, the merge listeners and the pending
//! size prompts. The host creates one engine per world and drops it (or calls
//! [`StackEngine::unload_world`]) when the world unloads.

use crate::core::config::StackConfig;
use crate::core::error::Result;
use crate::core::types::{ChunkCoord, EntityId, Tick, UserId};
use crate::host::{Messenger, StackWorld};
use crate::stack::{MergeBus, MergeEvaluator, MergeListener, MergeOutcome, StackRegistry};
use crate::tool::prompt::{PromptState, SizePrompt};
use crate::tool::sessions::PromptSessions;

#[derive(Debug, Default)]
pub struct StackEngine {
    config: StackConfig,
    registry: StackRegistry,
    merge_bus: MergeBus,
    sessions: PromptSessions,
}

impl StackEngine {
    pub fn new(config: StackConfig) -> Self {
        Self {
            config,
            registry: StackRegistry::new(),
            merge_bus: MergeBus::new(),
            sessions: PromptSessions::new(),
        }
    }

    pub fn config(&self) -> &StackConfig {
        &self.config
    }

    pub fn registry(&self) -> &StackRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut StackRegistry {
        &mut self.registry
    }

    pub fn sessions(&self) -> &PromptSessions {
        &self.sessions
    }

    /// Register external merge policy
    pub fn on_merge(&mut self, listener: impl MergeListener + 'static) {
        self.merge_bus.subscribe(listener);
    }

    /// Evaluate a proximity pair; on success the survivor's tags are updated.
    /// Despawning the absorbed creature is left to the caller.
    pub fn merge(
        &mut self,
        world: &mut dyn StackWorld,
        first: EntityId,
        nearby: EntityId,
    ) -> MergeOutcome {
        let outcome = MergeEvaluator::evaluate(
            &mut self.registry,
            &mut self.merge_bus,
            &*world,
            &self.config,
            first,
            nearby,
        );
        if let MergeOutcome::Merged { survivor, absorbed, .. } = outcome {
            self.registry.persist(survivor, world);
            self.registry.persist(absorbed, world);
        }
        outcome
    }

    /// Start a size prompt for `user` targeting `target`
    pub fn begin_prompt(
        &mut self,
        user: UserId,
        target: EntityId,
        world: &dyn StackWorld,
        messenger: &mut dyn Messenger,
        now: Tick,
    ) -> Result<()> {
        let prompt = SizePrompt::begin(
            user,
            target,
            world,
            &self.config,
            self.config.prompt_timeout,
            self.config.timeout_policy,
            now,
            messenger,
        )?;
        self.sessions.begin(prompt);
        Ok(())
    }

    /// Deliver a chat line. `Ok(None)` means the user had no pending prompt.
    pub fn handle_chat(
        &mut self,
        user: UserId,
        text: &str,
        world: &mut dyn StackWorld,
        messenger: &mut dyn Messenger,
        now: Tick,
    ) -> Result<Option<PromptState>> {
        self.sessions
            .handle_input(user, text, now, &mut self.registry, world, messenger)
    }

    /// Advance engine time; expires overdue prompts. Returns how many expired.
    pub fn advance(&mut self, now: Tick, messenger: &mut dyn Messenger) -> usize {
        self.sessions.advance(now, messenger).len()
    }

    /// Host callback: a creature was materialized
    pub fn entity_spawned(&mut self, world: &mut dyn StackWorld, id: EntityId) -> bool {
        let forgotten = self.registry.on_spawn(id);
        if forgotten {
            self.registry.persist(id, world);
        }
        forgotten
    }

    /// Host callback: a creature left the world
    pub fn entity_removed(&mut self, id: EntityId) {
        self.registry.on_removed(id);
    }

    pub fn load_chunk(&mut self, world: &dyn StackWorld, chunk: ChunkCoord) -> usize {
        self.registry.load_chunk(world, chunk)
    }

    pub fn unload_chunk(&mut self, world: &mut dyn StackWorld, chunk: ChunkCoord) -> usize {
        self.registry.unload_chunk(world, chunk)
    }

    /// Forget all in-memory state for the world
    pub fn unload_world(&mut self) {
        tracing::info!("Unloading {} stacks", self.registry.len());
        self.registry.clear();
        self.sessions.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Vec2;
    use crate::ecs::world::SimWorld;
    use crate::host::{Inbox, TagKey};

    #[test]
    fn test_merge_persists_survivor_tags() {
        let mut engine = StackEngine::default();
        let mut world = SimWorld::default();
        let a = world.spawn("zombie".into(), Vec2::new(0.0, 0.0));
        let b = world.spawn("zombie".into(), Vec2::new(1.0, 0.0));
        engine.registry_mut().set_size(a, 3).unwrap();

        assert!(engine.merge(&mut world, a, b).is_merged());
        assert_eq!(world.tags(a).and_then(|t| t.get_int(TagKey::StackSize)), Some(4));
    }

    #[test]
    fn test_entity_spawned_forgets_flagged_unit() {
        let mut engine = StackEngine::default();
        let mut world = SimWorld::default();
        let unit = world.spawn("zombie".into(), Vec2::new(0.0, 0.0));
        engine.registry_mut().register(unit).set_forget_on_spawn(true);
        engine.registry().persist(unit, &mut world);

        assert!(engine.entity_spawned(&mut world, unit));
        assert!(!engine.registry().is_stacked(unit));
        assert!(world.tags(unit).is_some_and(|t| !t.has(TagKey::ForgetOnSpawn)));
    }

    #[test]
    fn test_chunk_unload_and_reload() {
        let mut engine = StackEngine::default();
        let mut world = SimWorld::default();
        let id = world.spawn("cow".into(), Vec2::new(2.0, 2.0));
        engine.registry_mut().set_size(id, 9).unwrap();
        let chunk = world.chunk_of(id).unwrap();

        assert_eq!(engine.unload_chunk(&mut world, chunk), 1);
        assert!(engine.registry().is_empty());
        assert_eq!(engine.load_chunk(&world, chunk), 1);
        assert_eq!(engine.registry().lookup(id).map(|r| r.size()), Some(9));
    }

    #[test]
    fn test_unload_world_drops_everything() {
        let mut engine = StackEngine::default();
        let mut world = SimWorld::default();
        let mut inbox = Inbox::new();
        let user = UserId::new();
        let id = world.spawn("cow".into(), Vec2::new(2.0, 2.0));
        engine.registry_mut().set_size(id, 2).unwrap();
        engine.begin_prompt(user, id, &world, &mut inbox, 0).unwrap();

        engine.unload_world();
        assert!(engine.registry().is_empty());
        assert!(engine.sessions().is_empty());
        assert_eq!(engine.advance(1_000, &mut inbox), 0);
    }
}
