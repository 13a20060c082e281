//! Active size prompts, at most one per user

use ahash::AHashMap;

use crate::core::error::Result;
use crate::core::types::{Tick, UserId};
use crate::host::{Messenger, StackWorld};
use crate::stack::registry::StackRegistry;
use crate::tool::prompt::{PromptState, SizePrompt};

#[derive(Debug, Default)]
pub struct PromptSessions {
    sessions: AHashMap<UserId, SizePrompt>,
}

impl PromptSessions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track a freshly started prompt. An older session of the same user is
    /// cancelled silently and returned.
    pub fn begin(&mut self, prompt: SizePrompt) -> Option<SizePrompt> {
        let user = prompt.user();
        let mut previous = self.sessions.insert(user, prompt)?;
        previous.cancel();
        tracing::debug!("Replaced pending size prompt for {}", previous.target());
        Some(previous)
    }

    pub fn get(&self, user: UserId) -> Option<&SizePrompt> {
        self.sessions.get(&user)
    }

    pub fn is_active(&self, user: UserId) -> bool {
        self.sessions.contains_key(&user)
    }

    /// Route a line of text to the user's session.
    ///
    /// Returns `Ok(None)` when the user has no session (the text was not meant
    /// for us). Sessions reaching a terminal state are dropped.
    pub fn handle_input(
        &mut self,
        user: UserId,
        raw: &str,
        now: Tick,
        registry: &mut StackRegistry,
        world: &mut dyn StackWorld,
        messenger: &mut dyn Messenger,
    ) -> Result<Option<PromptState>> {
        let Some(prompt) = self.sessions.get_mut(&user) else {
            return Ok(None);
        };
        let result = prompt.handle_input(raw, now, registry, world, messenger);
        let finished = prompt.state().is_terminal();
        if finished || result.is_err() {
            self.sessions.remove(&user);
        }
        result.map(Some)
    }

    /// Expire every session whose deadline has passed
    pub fn advance(&mut self, now: Tick, messenger: &mut dyn Messenger) -> Vec<UserId> {
        let mut expired = Vec::new();
        for (user, prompt) in self.sessions.iter_mut() {
            if prompt.poll_timeout(now, messenger) {
                expired.push(*user);
            }
        }
        for user in &expired {
            self.sessions.remove(user);
        }
        expired
    }

    /// Drop the user's session without notifying them
    pub fn cancel(&mut self, user: UserId) -> bool {
        match self.sessions.remove(&user) {
            Some(mut prompt) => {
                prompt.cancel();
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.sessions.clear();
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
