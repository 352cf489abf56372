//! Data model: chat turns, candidates, jobs, and automation rules.

pub mod candidate;
pub mod message;
pub mod rule;

pub use candidate::{Candidate, Job, SourceKey};
pub use message::{ChatMessage, MessageLog, Role};
pub use rule::{Rule, RuleBook, RuleScope};
