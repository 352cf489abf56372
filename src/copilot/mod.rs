//! Conversational mode controller for the sourcing co-pilot chat panel.
//!
//! A parent view asks the panel to enter a mode (outreach, search
//! refinement, rule authoring, screening actions). The controller then walks
//! a fixed script, interpreting each user turn against the current step.
//! Replies are produced as pending deliveries stamped with the controller's
//! epoch; the session schedules them after a simulated delay and drops any
//! that outlive the mode they were produced in.

pub mod controller;
pub mod flow;
pub mod input;
pub mod mode;
pub mod scheduler;
pub mod session;
pub mod templates;

pub use controller::{
    ControllerEvent, ModeController, ModeRequest, Outcome, Pace, PendingReply, SearchCallback,
};
pub use flow::{DraftAnswers, FlowState, OutreachDraft};
pub use input::{Input, InputParser, Intent, PanelAction, RuleRef};
pub use mode::{Mode, OutreachChannel, ScreeningAction};
pub use scheduler::ReplyScheduler;
pub use session::{CopilotSession, SessionEvent};
