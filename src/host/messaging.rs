//! User-facing messages

use crate::core::types::UserId;

/// Where the host should present a message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageChannel {
    /// Transient status line (mode changes)
    ActionBar,
    /// Prompt text asking for input
    Prompt,
    Error,
    Success,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub channel: MessageChannel,
    pub text: String,
}

impl Message {
    pub fn new(channel: MessageChannel, text: impl Into<String>) -> Self {
        Self { channel, text: text.into() }
    }

    pub fn action_bar(text: impl Into<String>) -> Self {
        Self::new(MessageChannel::ActionBar, text)
    }

    pub fn prompt(text: impl Into<String>) -> Self {
        Self::new(MessageChannel::Prompt, text)
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self::new(MessageChannel::Error, text)
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self::new(MessageChannel::Success, text)
    }
}

/// Delivers literal text to a specific user
pub trait Messenger {
    fn send(&mut self, user: UserId, message: Message);
}

/// Messenger that keeps everything it was asked to send
#[derive(Debug, Default)]
pub struct Inbox {
    sent: Vec<(UserId, Message)>,
}

impl Inbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages_for(&self, user: UserId) -> impl Iterator<Item = &Message> + '_ {
        self.sent
            .iter()
            .filter(move |(to, _)| *to == user)
            .map(|(_, msg)| msg)
    }

    pub fn last_for(&self, user: UserId) -> Option<&Message> {
        self.messages_for(user).last()
    }

    pub fn len(&self) -> usize {
        self.sent.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sent.is_empty()
    }

    pub fn drain(&mut self) -> impl Iterator<Item = (UserId, Message)> + '_ {
        self.sent.drain(..)
    }
}

impl Messenger for Inbox {
    fn send(&mut self, user: UserId, message: Message) {
        self.sent.push((user, message));
    }
}
