//! Copilot session: async wrapper that owns the controller and its timers.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{Mutex, broadcast};
use tracing::{debug, info};

use crate::config::CopilotConfig;
use crate::error::Result;
use crate::model::{ChatMessage, RuleScope, SourceKey};
use crate::repository::CandidateRepository;

use super::controller::{ControllerEvent, ModeController, ModeRequest, Outcome, SearchCallback};
use super::input::PanelAction;
use super::mode::Mode;
use super::scheduler::ReplyScheduler;
use super::templates;

/// Default broadcast channel capacity.
const DEFAULT_BROADCAST_CAPACITY: usize = 256;

/// Everything a chat view needs to stay in sync with the session.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum SessionEvent {
    MessageAppended(ChatMessage),
    ModeChanged { from: Mode, to: Mode },
    SearchStarted { sources: Vec<SourceKey> },
    RulesChanged { scope: RuleScope },
    TypingChanged(bool),
}

impl From<ControllerEvent> for SessionEvent {
    fn from(event: ControllerEvent) -> Self {
        match event {
            ControllerEvent::ModeChanged { from, to } => Self::ModeChanged { from, to },
            ControllerEvent::SearchStarted { sources } => Self::SearchStarted { sources },
            ControllerEvent::RulesChanged { scope } => Self::RulesChanged { scope },
        }
    }
}

/// One open chat panel.
pub struct CopilotSession {
    controller: Arc<Mutex<ModeController>>,
    scheduler: ReplyScheduler,
    tx: broadcast::Sender<SessionEvent>,
}

impl CopilotSession {
    /// Open a session for the configured job, greeting with live pool counts.
    pub async fn open(
        repo: &dyn CandidateRepository,
        config: CopilotConfig,
        on_search_start: Option<SearchCallback>,
    ) -> Result<Self> {
        let job = repo.job(&config.job_id).await?;
        let summary = repo.summary(&config.job_id).await?;
        info!(job_id = %job.id, title = %job.title, "Opening co-pilot session");

        let mut controller = ModeController::new(config, job, &summary);
        if let Some(callback) = on_search_start {
            controller = controller.with_search_callback(callback);
        }
        Ok(Self::from_controller(controller))
    }

    pub fn from_controller(controller: ModeController) -> Self {
        let (tx, _rx) = broadcast::channel(DEFAULT_BROADCAST_CAPACITY);
        Self {
            controller: Arc::new(Mutex::new(controller)),
            scheduler: ReplyScheduler::new(),
            tx,
        }
    }

    /// Subscribe to session events.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.tx.subscribe()
    }

    pub async fn submit_text(&self, text: &str) {
        let mut controller = self.controller.lock().await;
        let before = controller.messages().len();
        let outcome = controller.submit_text(text);
        if controller.messages().len() > before {
            if let Some(turn) = controller.messages().last() {
                let _ = self.tx.send(SessionEvent::MessageAppended(turn.clone()));
            }
        }
        self.dispatch(outcome, controller.is_typing()).await;
    }

    /// Send the `n`th chat suggestion (1-based) as if the user typed it.
    /// Returns false when there is no such suggestion.
    pub async fn submit_suggestion(&self, n: usize) -> bool {
        match templates::suggestion(n) {
            Some(text) => {
                self.submit_text(text).await;
                true
            }
            None => false,
        }
    }

    pub async fn apply(&self, action: PanelAction) {
        let mut controller = self.controller.lock().await;
        let outcome = controller.apply(action);
        self.dispatch(outcome, controller.is_typing()).await;
    }

    pub async fn enter_mode(&self, request: ModeRequest) {
        let mut controller = self.controller.lock().await;
        let outcome = controller.enter_mode(request);
        self.dispatch(outcome, controller.is_typing()).await;
    }

    /// Publish an outcome's events and schedule its replies.
    ///
    /// Callers hold the controller lock, so delivery tasks cannot run until
    /// the whole outcome is scheduled. A mode change aborts every reply
    /// still waiting from the old mode before the new replies are scheduled.
    /// `typing` is the controller's state after the outcome was produced.
    async fn dispatch(&self, outcome: Outcome, typing: bool) {
        let aborted = if outcome.changed_mode() {
            self.scheduler.cancel_all().await
        } else {
            0
        };

        for event in outcome.events {
            let _ = self.tx.send(event.into());
        }

        if outcome.replies.is_empty() {
            if aborted > 0 && !typing {
                let _ = self.tx.send(SessionEvent::TypingChanged(false));
            }
            return;
        }
        let _ = self.tx.send(SessionEvent::TypingChanged(true));
        debug!(replies = outcome.replies.len(), "Scheduling replies");
        for reply in outcome.replies {
            self.scheduler
                .schedule(reply, Arc::clone(&self.controller), self.tx.clone())
                .await;
        }
    }

    /// Snapshot of the message log.
    pub async fn messages(&self) -> Vec<ChatMessage> {
        self.controller.lock().await.messages().as_slice().to_vec()
    }

    pub async fn mode(&self) -> Mode {
        self.controller.lock().await.mode()
    }

    pub async fn is_typing(&self) -> bool {
        self.controller.lock().await.is_typing()
    }

    /// Run `f` against the controller, for read-only inspection.
    pub async fn inspect<T>(&self, f: impl FnOnce(&ModeController) -> T) -> T {
        let controller = self.controller.lock().await;
        f(&controller)
    }

    /// Wait for every scheduled reply to land or be discarded.
    pub async fn settle(&self) {
        self.scheduler.settle().await;
    }
}
