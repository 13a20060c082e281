//! Merging two adjacent creatures into one stack
//!
//! The proximity system (outside the engine) proposes `(first, nearby)` pairs.
//! The evaluator checks the pair, announces the pending merge to every
//! listener on the [`MergeBus`], and commits only when nobody vetoed:
//!
//! ```text
//! guards -> StackMergeEvent -> listeners (may cancel) -> commit | Vetoed
//! ```
//!
//! On commit the first creature keeps a record holding both sizes and the
//! nearby creature loses its record. Despawning it is the caller's job.

use crate::core::types::{EntityId, EntityKind};
use crate::host::{SizeLimits, StackWorld};
use crate::stack::registry::StackRegistry;

/// Pending merge announced to listeners before anything changes
#[derive(Debug, Clone)]
pub struct StackMergeEvent {
    first: EntityId,
    nearby: EntityId,
    kind: EntityKind,
    first_size: u32,
    nearby_size: u32,
    cancelled: bool,
}

impl StackMergeEvent {
    pub fn first(&self) -> EntityId {
        self.first
    }

    pub fn nearby(&self) -> EntityId {
        self.nearby
    }

    pub fn kind(&self) -> &EntityKind {
        &self.kind
    }

    pub fn first_size(&self) -> u32 {
        self.first_size
    }

    pub fn nearby_size(&self) -> u32 {
        self.nearby_size
    }

    /// Size the first creature will carry if the merge goes through
    pub fn resulting_size(&self) -> u32 {
        self.first_size.saturating_add(self.nearby_size)
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    pub fn set_cancelled(&mut self, cancelled: bool) {
        self.cancelled = cancelled;
    }
}

/// External policy consulted before a merge is committed
pub trait MergeListener {
    fn on_stack_merge(&mut self, event: &mut StackMergeEvent);
}

impl<F> MergeListener for F
where
    F: FnMut(&mut StackMergeEvent),
{
    fn on_stack_merge(&mut self, event: &mut StackMergeEvent) {
        self(event)
    }
}

/// Ordered list of merge listeners
///
/// Every listener sees the event, in subscription order, and observes the
/// cancellation state left by the ones before it.
#[derive(Default)]
pub struct MergeBus {
    listeners: Vec<Box<dyn MergeListener>>,
}

impl MergeBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, listener: impl MergeListener + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Run every listener; returns true when the merge ended up cancelled
    pub fn publish(&mut self, event: &mut StackMergeEvent) -> bool {
        for listener in &mut self.listeners {
            listener.on_stack_merge(event);
        }
        event.is_cancelled()
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

impl std::fmt::Debug for MergeBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MergeBus")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

/// Why a pair was not considered for merging at all
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    SameEntity,
    NotAlive,
    KindMismatch,
    /// Neither creature carries a record; creating stacks is proximity policy
    NeitherStacked,
    /// A sliced unit, before or after it spawned, must not rejoin
    ForgetOnSpawn,
    OverCapacity { size: u32, max: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeOutcome {
    /// `absorbed` lost its record and should be despawned by the caller
    Merged { survivor: EntityId, absorbed: EntityId, size: u32 },
    Vetoed,
    Skipped(SkipReason),
}

impl MergeOutcome {
    pub fn is_merged(&self) -> bool {
        matches!(self, MergeOutcome::Merged { .. })
    }
}

pub struct MergeEvaluator;

impl MergeEvaluator {
    /// Decide whether `nearby` folds into `first`, committing if accepted
    pub fn evaluate(
        registry: &mut StackRegistry,
        bus: &mut MergeBus,
        world: &dyn StackWorld,
        limits: &dyn SizeLimits,
        first: EntityId,
        nearby: EntityId,
    ) -> MergeOutcome {
        if first == nearby {
            return MergeOutcome::Skipped(SkipReason::SameEntity);
        }
        if !world.is_alive(first) || !world.is_alive(nearby) {
            return MergeOutcome::Skipped(SkipReason::NotAlive);
        }

        let (Some(kind), Some(nearby_kind)) = (world.kind_of(first), world.kind_of(nearby)) else {
            return MergeOutcome::Skipped(SkipReason::NotAlive);
        };
        if kind != nearby_kind {
            return MergeOutcome::Skipped(SkipReason::KindMismatch);
        }

        if registry.is_forgotten(first) || registry.is_forgotten(nearby) {
            return MergeOutcome::Skipped(SkipReason::ForgetOnSpawn);
        }

        let first_record = registry.lookup(first).copied();
        let nearby_record = registry.lookup(nearby).copied();
        if first_record.is_none() && nearby_record.is_none() {
            return MergeOutcome::Skipped(SkipReason::NeitherStacked);
        }
        let forget = [first_record, nearby_record]
            .iter()
            .flatten()
            .any(|record| record.forget_on_spawn());
        if forget {
            return MergeOutcome::Skipped(SkipReason::ForgetOnSpawn);
        }

        let first_size = first_record.map_or(1, |r| r.size());
        let nearby_size = nearby_record.map_or(1, |r| r.size());
        let max = limits.max_stack(&kind);
        let size = first_size.saturating_add(nearby_size);
        if size > max {
            return MergeOutcome::Skipped(SkipReason::OverCapacity { size, max });
        }

        let mut event = StackMergeEvent {
            first,
            nearby,
            kind,
            first_size,
            nearby_size,
            cancelled: false,
        };
        if bus.publish(&mut event) {
            tracing::debug!("Merge of {} into {} vetoed", nearby, first);
            return MergeOutcome::Vetoed;
        }

        registry.register(first).grow(nearby_size);
        registry.remove(nearby);
        tracing::debug!(
            "Merged {} ({}) into {} ({}) -> {}",
            nearby,
            nearby_size,
            first,
            first_size,
            size
        );

        MergeOutcome::Merged { survivor: first, absorbed: nearby, size }
    }
}
