//! Interactive stack size prompt
//!
//! A session collects one integer from a user. It is driven entirely by
//! events: a line of input (`handle_input`) or the passage of time
//! (`poll_timeout`). Nothing blocks while the user is typing.
//!
//! ```text
//! AwaitingInput --bad input--> Revalidating --> (awaits again)
//!       |                                      |
//!       +------- valid input -------> Completed(size)
//!       +------- target died -------> Abandoned(TargetInvalid)
//!       +------- deadline ----------> Abandoned(TimedOut)
//! ```
//!
//! The target's liveness is checked when a value is accepted, not when the
//! session starts, since the creature may die while the user types.

use crate::core::config::TimeoutPolicy;
use crate::core::error::{Result, StackError};
use crate::core::types::{EntityId, Tick, UserId};
use crate::host::{Message, Messenger, SizeLimits, StackWorld};
use crate::stack::registry::StackRegistry;

pub const PROMPT_TEXT: &str = "Enter stack size: ";
pub const UPDATED_TEXT: &str = "Stack value has been updated.";
pub const TIMED_OUT_TEXT: &str = "Stack modification has timed out.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputRejection {
    NotANumber,
    OutOfRange { value: i64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbandonReason {
    /// Target died or despawned before a value was accepted
    TargetInvalid,
    /// A newer session for the same user replaced this one
    Superseded,
    TimedOut,
}

impl AbandonReason {
    /// Graceful exits ended the conversation normally and are not announced
    /// by the abandonment listener
    pub fn is_graceful(&self) -> bool {
        matches!(self, AbandonReason::TargetInvalid | AbandonReason::Superseded)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptState {
    AwaitingInput,
    Revalidating(InputRejection),
    Completed(u32),
    Abandoned(AbandonReason),
}

impl PromptState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, PromptState::Completed(_) | PromptState::Abandoned(_))
    }
}

/// Cancellable timer owned by one session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deadline {
    at: Tick,
    cancelled: bool,
}

impl Deadline {
    pub fn new(at: Tick) -> Self {
        Self { at, cancelled: false }
    }

    pub fn at(&self) -> Tick {
        self.at
    }

    pub fn reschedule(&mut self, at: Tick) {
        self.at = at;
    }

    pub fn cancel(&mut self) {
        self.cancelled = true;
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    pub fn is_expired(&self, now: Tick) -> bool {
        !self.cancelled && now >= self.at
    }
}

/// One user's pending stack size entry
#[derive(Debug, Clone)]
pub struct SizePrompt {
    user: UserId,
    target: EntityId,
    max_size: u32,
    timeout: Tick,
    policy: TimeoutPolicy,
    deadline: Deadline,
    state: PromptState,
}

impl SizePrompt {
    /// Open a session and show the prompt text
    #[allow(clippy::too_many_arguments)]
    pub fn begin(
        user: UserId,
        target: EntityId,
        world: &dyn StackWorld,
        limits: &dyn SizeLimits,
        timeout: Tick,
        policy: TimeoutPolicy,
        now: Tick,
        messenger: &mut dyn Messenger,
    ) -> Result<Self> {
        let kind = world.kind_of(target).ok_or(StackError::UnknownEntity(target))?;
        let prompt = Self {
            user,
            target,
            max_size: limits.max_stack(&kind),
            timeout,
            policy,
            deadline: Deadline::new(now.saturating_add(timeout)),
            state: PromptState::AwaitingInput,
        };
        messenger.send(user, Message::prompt(PROMPT_TEXT));
        Ok(prompt)
    }

    pub fn user(&self) -> UserId {
        self.user
    }

    pub fn target(&self) -> EntityId {
        self.target
    }

    pub fn max_size(&self) -> u32 {
        self.max_size
    }

    pub fn state(&self) -> PromptState {
        self.state
    }

    pub fn deadline(&self) -> Deadline {
        self.deadline
    }

    /// Message shown for a number outside the accepted range
    pub fn range_message(&self) -> String {
        format!("Invalid input. Accepted sizes: 1-{}", self.max_size)
    }

    /// Feed one line of user input. Input after a terminal state is ignored.
    pub fn handle_input(
        &mut self,
        raw: &str,
        now: Tick,
        registry: &mut StackRegistry,
        world: &mut dyn StackWorld,
        messenger: &mut dyn Messenger,
    ) -> Result<PromptState> {
        if self.state.is_terminal() {
            return Ok(self.state);
        }
        if self.policy == TimeoutPolicy::Inactivity {
            self.deadline.reschedule(now.saturating_add(self.timeout));
        }

        let Some(value) = parse_number(raw) else {
            self.state = PromptState::Revalidating(InputRejection::NotANumber);
            messenger.send(self.user, Message::prompt(PROMPT_TEXT));
            return Ok(self.state);
        };

        if value < 1 || value > self.max_size as i64 {
            self.state = PromptState::Revalidating(InputRejection::OutOfRange { value });
            messenger.send(self.user, Message::error(self.range_message()));
            messenger.send(self.user, Message::prompt(PROMPT_TEXT));
            return Ok(self.state);
        }

        if !world.is_alive(self.target) {
            self.finish(PromptState::Abandoned(AbandonReason::TargetInvalid));
            let gone = StackError::TargetGone(self.target);
            messenger.send(self.user, Message::error(gone.to_string()));
            tracing::debug!("Size prompt for {} abandoned: target gone", self.target);
            return Ok(self.state);
        }

        // Range-checked above, so the cast is lossless
        let size = value as u32;
        registry.set_size(self.target, size)?;
        registry.persist(self.target, world);
        self.finish(PromptState::Completed(size));
        messenger.send(self.user, Message::success(UPDATED_TEXT));
        tracing::info!("Stack {} set to size {}", self.target, size);
        Ok(self.state)
    }

    /// Expire the session if its deadline passed. Returns true on expiry.
    pub fn poll_timeout(&mut self, now: Tick, messenger: &mut dyn Messenger) -> bool {
        if self.state.is_terminal() || !self.deadline.is_expired(now) {
            return false;
        }
        self.finish(PromptState::Abandoned(AbandonReason::TimedOut));
        notify_abandoned(self.user, AbandonReason::TimedOut, messenger);
        tracing::debug!("Size prompt for {} timed out", self.target);
        true
    }

    /// End the session without notifying anyone
    pub fn cancel(&mut self) {
        if !self.state.is_terminal() {
            self.finish(PromptState::Abandoned(AbandonReason::Superseded));
        }
    }

    fn finish(&mut self, state: PromptState) {
        self.deadline.cancel();
        self.state = state;
    }
}

/// Read a whole number from user input. Decimals are accepted and truncated
/// toward zero, so "3.9" reads as 3 and "0.5" as 0.
fn parse_number(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if let Ok(value) = raw.parse::<i64>() {
        return Some(value);
    }
    let value = raw.parse::<f64>().ok().filter(|v| v.is_finite())?;
    // Saturating cast; anything huge is rejected by the range check anyway
    Some(value.trunc() as i64)
}

/// Abandonment listener: only non-graceful exits reach the user
fn notify_abandoned(user: UserId, reason: AbandonReason, messenger: &mut dyn Messenger) {
    if reason.is_graceful() {
        return;
    }
    messenger.send(user, Message::error(TIMED_OUT_TEXT));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::StackConfig;
    use crate::core::types::Vec2;
    use crate::ecs::world::SimWorld;
    use crate::host::{Inbox, MessageChannel};

    struct Fixture {
        world: SimWorld,
        registry: StackRegistry,
        inbox: Inbox,
        user: UserId,
        target: EntityId,
    }

    fn fixture() -> Fixture {
        let mut world = SimWorld::default();
        let target = world.spawn("zombie".into(), Vec2::new(0.0, 0.0));
        Fixture {
            world,
            registry: StackRegistry::new(),
            inbox: Inbox::new(),
            user: UserId::new(),
            target,
        }
    }

    fn begin(f: &mut Fixture, policy: TimeoutPolicy) -> SizePrompt {
        let config = StackConfig::default().with_max_stack("zombie", 10);
        SizePrompt::begin(f.user, f.target, &f.world, &config, 25, policy, 100, &mut f.inbox)
            .unwrap()
    }

    #[test]
    fn test_begin_shows_prompt() {
        let mut f = fixture();
        let prompt = begin(&mut f, TimeoutPolicy::Inactivity);
        assert_eq!(prompt.state(), PromptState::AwaitingInput);
        assert_eq!(prompt.max_size(), 10);
        assert_eq!(prompt.deadline().at(), 125);
        assert_eq!(f.inbox.last_for(f.user), Some(&Message::prompt(PROMPT_TEXT)));
    }

    #[test]
    fn test_begin_unknown_target_fails() {
        let mut f = fixture();
        let config = StackConfig::default();
        let result = SizePrompt::begin(
            f.user,
            EntityId::new(),
            &f.world,
            &config,
            25,
            TimeoutPolicy::Inactivity,
            0,
            &mut f.inbox,
        );
        assert!(matches!(result, Err(StackError::UnknownEntity(_))));
        assert!(f.inbox.is_empty());
    }

    #[test]
    fn test_non_number_reprompts_without_error() {
        let mut f = fixture();
        let mut prompt = begin(&mut f, TimeoutPolicy::Inactivity);
        let state = prompt
            .handle_input("lots", 101, &mut f.registry, &mut f.world, &mut f.inbox)
            .unwrap();

        assert_eq!(state, PromptState::Revalidating(InputRejection::NotANumber));
        let channels: Vec<_> = f.inbox.messages_for(f.user).map(|m| m.channel).collect();
        assert_eq!(channels, vec![MessageChannel::Prompt, MessageChannel::Prompt]);
        assert!(f.registry.is_empty());
    }

    #[test]
    fn test_zero_and_too_large_share_message() {
        let mut f = fixture();
        let mut prompt = begin(&mut f, TimeoutPolicy::Inactivity);

        for input in ["0", "11"] {
            prompt
                .handle_input(input, 101, &mut f.registry, &mut f.world, &mut f.inbox)
                .unwrap();
        }

        let errors: Vec<_> = f
            .inbox
            .messages_for(f.user)
            .filter(|m| m.channel == MessageChannel::Error)
            .map(|m| m.text.as_str())
            .collect();
        assert_eq!(
            errors,
            vec!["Invalid input. Accepted sizes: 1-10", "Invalid input. Accepted sizes: 1-10"]
        );
        assert!(f.registry.is_empty());
    }

    #[test]
    fn test_decimal_input_is_truncated() {
        for (input, expected) in [("3.0", 3), ("3.9", 3), ("10.5", 10)] {
            let mut f = fixture();
            let mut prompt = begin(&mut f, TimeoutPolicy::Inactivity);
            let state = prompt
                .handle_input(input, 101, &mut f.registry, &mut f.world, &mut f.inbox)
                .unwrap();
            assert_eq!(state, PromptState::Completed(expected));
        }

        // Truncation can land outside the accepted range
        let mut f = fixture();
        let mut prompt = begin(&mut f, TimeoutPolicy::Inactivity);
        let state = prompt
            .handle_input("0.5", 101, &mut f.registry, &mut f.world, &mut f.inbox)
            .unwrap();
        assert_eq!(state, PromptState::Revalidating(InputRejection::OutOfRange { value: 0 }));

        for input in ["NaN", "inf", "3,5"] {
            let state = prompt
                .handle_input(input, 102, &mut f.registry, &mut f.world, &mut f.inbox)
                .unwrap();
            assert_eq!(state, PromptState::Revalidating(InputRejection::NotANumber));
        }
    }

    #[test]
    fn test_bounds_are_inclusive() {
        for input in ["1", "10", " 7 "] {
            let mut f = fixture();
            let mut prompt = begin(&mut f, TimeoutPolicy::Inactivity);
            let state = prompt
                .handle_input(input, 101, &mut f.registry, &mut f.world, &mut f.inbox)
                .unwrap();
            let expected: u32 = input.trim().parse().unwrap();
            assert_eq!(state, PromptState::Completed(expected));
            assert_eq!(f.registry.lookup(f.target).map(|r| r.size()), Some(expected));
        }
    }

    #[test]
    fn test_completion_cancels_deadline() {
        let mut f = fixture();
        let mut prompt = begin(&mut f, TimeoutPolicy::Inactivity);
        prompt
            .handle_input("4", 101, &mut f.registry, &mut f.world, &mut f.inbox)
            .unwrap();

        assert!(prompt.deadline().is_cancelled());
        assert!(!prompt.poll_timeout(1_000, &mut f.inbox));
        assert_eq!(f.inbox.last_for(f.user), Some(&Message::success(UPDATED_TEXT)));
    }

    #[test]
    fn test_dead_target_abandons_without_mutation() {
        let mut f = fixture();
        let mut prompt = begin(&mut f, TimeoutPolicy::Inactivity);
        f.world.despawn(f.target);

        let state = prompt
            .handle_input("5", 101, &mut f.registry, &mut f.world, &mut f.inbox)
            .unwrap();

        assert_eq!(state, PromptState::Abandoned(AbandonReason::TargetInvalid));
        assert!(f.registry.is_empty());
        assert_eq!(
            f.inbox.last_for(f.user).map(|m| m.text.as_str()),
            Some("Entity is no longer valid. Modification has been cancelled.")
        );
        // Graceful exit: no timeout notice later
        assert!(!prompt.poll_timeout(1_000, &mut f.inbox));
    }

    #[test]
    fn test_timeout_notifies_once() {
        let mut f = fixture();
        let mut prompt = begin(&mut f, TimeoutPolicy::Inactivity);

        assert!(!prompt.poll_timeout(124, &mut f.inbox));
        assert!(prompt.poll_timeout(125, &mut f.inbox));
        assert!(!prompt.poll_timeout(126, &mut f.inbox));

        assert_eq!(prompt.state(), PromptState::Abandoned(AbandonReason::TimedOut));
        assert_eq!(f.inbox.last_for(f.user), Some(&Message::error(TIMED_OUT_TEXT)));
        assert!(f.registry.is_empty());
    }

    #[test]
    fn test_inactivity_policy_extends_deadline() {
        let mut f = fixture();
        let mut prompt = begin(&mut f, TimeoutPolicy::Inactivity);
        prompt
            .handle_input("nope", 120, &mut f.registry, &mut f.world, &mut f.inbox)
            .unwrap();
        assert_eq!(prompt.deadline().at(), 145);
        assert!(!prompt.poll_timeout(130, &mut f.inbox));
    }

    #[test]
    fn test_absolute_policy_keeps_deadline() {
        let mut f = fixture();
        let mut prompt = begin(&mut f, TimeoutPolicy::Absolute);
        prompt
            .handle_input("nope", 120, &mut f.registry, &mut f.world, &mut f.inbox)
            .unwrap();
        assert_eq!(prompt.deadline().at(), 125);
        assert!(prompt.poll_timeout(130, &mut f.inbox));
    }

    #[test]
    fn test_input_after_completion_is_ignored() {
        let mut f = fixture();
        let mut prompt = begin(&mut f, TimeoutPolicy::Inactivity);
        prompt
            .handle_input("3", 101, &mut f.registry, &mut f.world, &mut f.inbox)
            .unwrap();
        let state = prompt
            .handle_input("9", 102, &mut f.registry, &mut f.world, &mut f.inbox)
            .unwrap();
        assert_eq!(state, PromptState::Completed(3));
        assert_eq!(f.registry.lookup(f.target).map(|r| r.size()), Some(3));
    }
}
