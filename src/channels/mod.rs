//! Channel abstraction for chat panel I/O.

pub mod cli;

use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;

use crate::copilot::{Mode, SessionEvent};
use crate::error::ChannelError;
use crate::model::{ChatMessage, RuleScope, SourceKey};

pub use cli::CliChannel;

/// Raw input lines from the user.
pub type InputStream = Pin<Box<dyn Stream<Item = String> + Send>>;

/// Transient status shown outside the message log.
#[derive(Debug, Clone, PartialEq)]
pub enum StatusUpdate {
    Typing(bool),
    ModeChanged { from: Mode, to: Mode },
    SearchStarted(Vec<SourceKey>),
    RulesChanged(RuleScope),
    Info(String),
}

impl StatusUpdate {
    /// Status line for a session event, if it has one.
    pub fn from_event(event: &SessionEvent) -> Option<Self> {
        match event {
            SessionEvent::MessageAppended(_) => None,
            SessionEvent::TypingChanged(typing) => Some(Self::Typing(*typing)),
            SessionEvent::ModeChanged { from, to } => Some(Self::ModeChanged {
                from: *from,
                to: *to,
            }),
            SessionEvent::SearchStarted { sources } => Some(Self::SearchStarted(sources.clone())),
            SessionEvent::RulesChanged { scope } => Some(Self::RulesChanged(*scope)),
        }
    }
}

/// A surface the co-pilot can be driven from.
#[async_trait]
pub trait Channel: Send + Sync {
    fn name(&self) -> &str;

    /// Start reading user input.
    async fn start(&self) -> Result<InputStream, ChannelError>;

    /// Show a message appended to the log.
    async fn render(&self, message: &ChatMessage) -> Result<(), ChannelError>;

    /// Show a transient status update.
    async fn status(&self, status: StatusUpdate) -> Result<(), ChannelError>;
}
