//! The stacking tool held by a user

use crate::core::error::{Result, StackError};
use crate::core::types::{EntityId, Tick, UserId};
use crate::engine::StackEngine;
use crate::host::{Message, Messenger, StackWorld, TagStore};
use crate::stack::{remove_chunk, remove_stack_data, ChunkSweep, SliceOperation};
use crate::tool::mode::ToolMode;

pub const SHIFTED_PREFIX: &str = "Shifted mode to ";
pub const SUCCESS_TEXT: &str = "Action performed successfully.";

/// What a tool use did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolOutcome {
    /// A size prompt is now waiting for the user's input
    PromptStarted { target: EntityId },
    /// One unit was detached; `remainder` is the size left on the target
    Sliced { unit: EntityId, remainder: u32 },
    /// Every unit but one was detached and the target's stack data cleared
    SlicedAll { units: Vec<EntityId> },
    Removed { target: EntityId },
    ChunkCleared(ChunkSweep),
}

/// A user's stacking tool.
///
/// The mode lives on the item's tags, so the controller is cheap to build
/// for every use and the mode survives across sessions.
pub struct ToolController<'a> {
    user: UserId,
    item: &'a mut dyn TagStore,
}

impl<'a> ToolController<'a> {
    pub fn new(user: UserId, item: &'a mut dyn TagStore) -> Self {
        Self { user, item }
    }

    pub fn mode(&self) -> Result<ToolMode> {
        ToolMode::read(&*self.item)
    }

    /// Advance to the next mode and tell the user which one is active
    pub fn shift_mode(&mut self, messenger: &mut dyn Messenger) -> Result<ToolMode> {
        let next = self.mode()?.next();
        next.write(&mut *self.item);
        messenger.send(self.user, Message::action_bar(format!("{}{}", SHIFTED_PREFIX, next)));
        tracing::debug!("Tool mode shifted to {}", next);
        Ok(next)
    }

    /// Use the tool on `target` in the current mode.
    ///
    /// Recoverable failures are reported to the user before being returned.
    /// An unreadable mode is returned without touching the registry.
    pub fn perform_action(
        &mut self,
        engine: &mut StackEngine,
        world: &mut dyn StackWorld,
        messenger: &mut dyn Messenger,
        target: EntityId,
        now: Tick,
    ) -> Result<ToolOutcome> {
        let mode = self.mode()?;
        match self.dispatch(mode, engine, world, messenger, target, now) {
            Ok(outcome) => {
                if !matches!(outcome, ToolOutcome::PromptStarted { .. }) {
                    messenger.send(self.user, Message::success(SUCCESS_TEXT));
                }
                Ok(outcome)
            }
            Err(e) => {
                if e.is_recoverable() {
                    messenger.send(self.user, Message::error(e.to_string()));
                } else {
                    tracing::warn!("Tool action {} on {} failed: {}", mode, target, e);
                }
                Err(e)
            }
        }
    }

    fn dispatch(
        &self,
        mode: ToolMode,
        engine: &mut StackEngine,
        world: &mut dyn StackWorld,
        messenger: &mut dyn Messenger,
        target: EntityId,
        now: Tick,
    ) -> Result<ToolOutcome> {
        if !world.is_alive(target) {
            return Err(StackError::UnknownEntity(target));
        }

        if !engine.registry().is_stacked(target) {
            if mode != ToolMode::Modify {
                return Err(StackError::UnstackedTarget { mode });
            }
            engine.begin_prompt(self.user, target, &*world, messenger, now)?;
            return Ok(ToolOutcome::PromptStarted { target });
        }

        match mode {
            ToolMode::Modify => {
                engine.begin_prompt(self.user, target, &*world, messenger, now)?;
                Ok(ToolOutcome::PromptStarted { target })
            }
            ToolMode::Slice => {
                let registry = engine.registry_mut();
                let units = SliceOperation::peel(registry, world, target, 1, false)?;
                let remainder = registry.lookup(target).map_or(1, |r| r.size());
                // A remainder of one is just a creature; drop the bookkeeping
                if remainder > 1 {
                    registry.persist(target, world);
                } else {
                    remove_stack_data(registry, world, target);
                }
                let unit = units.first().copied().ok_or(StackError::NothingToSlice)?;
                Ok(ToolOutcome::Sliced { unit, remainder })
            }
            ToolMode::SliceAll => {
                let registry = engine.registry_mut();
                let units = SliceOperation::slice_all(registry, world, target)?;
                remove_stack_data(registry, world, target);
                Ok(ToolOutcome::SlicedAll { units })
            }
            ToolMode::RemoveSingle => {
                remove_stack_data(engine.registry_mut(), world, target);
                Ok(ToolOutcome::Removed { target })
            }
            ToolMode::RemoveChunk => {
                let sweep = remove_chunk(engine.registry_mut(), world, target)?;
                Ok(ToolOutcome::ChunkCleared(sweep))
            }
        }
    }
}
