//! Mode controller: the co-pilot's conversational state machine.
//!
//! The controller is synchronous and owns no timers. Every operation
//! appends user turns immediately and returns an [`Outcome`] whose replies
//! are *pending*: each is stamped with the epoch current at the moment it
//! was produced and must be handed back through [`ModeController::deliver`]
//! once its simulated delay has elapsed. Any mode change bumps the epoch, so
//! replies scheduled for a flow that has since been left are dropped on
//! delivery instead of leaking into the next flow.

use std::collections::BTreeSet;
use std::time::Duration;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::CopilotConfig;
use crate::error::FlowError;
use crate::model::{Candidate, ChatMessage, Job, MessageLog, Rule, RuleBook, RuleScope, SourceKey};
use crate::repository::PipelineSummary;

use super::flow::{
    ConfirmFlow, DraftAnswers, FlowState, OutreachDraft, OutreachFlow, RulesFlow, RulesStage,
    SEARCH_QUESTIONS, SearchFlow, rule_questions,
};
use super::input::{
    ADD_KEYWORDS, EXIT_KEYWORDS, Intent, PanelAction, RuleRef, START_KEYWORDS, contains_any,
};
use super::mode::{Mode, OutreachChannel, ScreeningAction};
use super::templates::{self, DraftContext};

/// Invoked with the selected sources when a refined search starts.
pub type SearchCallback = Box<dyn FnMut(&[SourceKey]) + Send>;

/// How long a reply should "type" before it appears.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pace {
    /// Free-form acknowledgement in default mode.
    Typing,
    /// Next question or prompt inside a flow.
    Prompt,
    /// Terminal "queued" / "completed" style message.
    Processing,
}

/// An assistant message waiting for its simulated delay to elapse.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingReply {
    pub epoch: u64,
    pub delay: Duration,
    pub message: ChatMessage,
}

/// Side effects a parent view may react to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ControllerEvent {
    ModeChanged { from: Mode, to: Mode },
    SearchStarted { sources: Vec<SourceKey> },
    RulesChanged { scope: RuleScope },
}

/// Result of a single controller operation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Outcome {
    pub replies: Vec<PendingReply>,
    pub events: Vec<ControllerEvent>,
}

impl Outcome {
    pub fn is_empty(&self) -> bool {
        self.replies.is_empty() && self.events.is_empty()
    }

    /// Whether this outcome moved the controller to another mode.
    pub fn changed_mode(&self) -> bool {
        self.events
            .iter()
            .any(|e| matches!(e, ControllerEvent::ModeChanged { .. }))
    }
}

/// Parent request to enter a mode.
#[derive(Debug, Clone, PartialEq)]
pub struct ModeRequest {
    pub mode: Mode,
    /// Candidates the mode applies to (outreach and screening actions).
    pub candidates: Vec<Candidate>,
}

impl ModeRequest {
    pub fn new(mode: Mode) -> Self {
        Self {
            mode,
            candidates: Vec::new(),
        }
    }

    pub fn with_candidates(mut self, candidates: Vec<Candidate>) -> Self {
        self.candidates = candidates;
        self
    }
}

/// Drives the scripted dialogue for one chat panel.
pub struct ModeController {
    config: CopilotConfig,
    job: Job,
    log: MessageLog,
    flow: FlowState,
    epoch: u64,
    /// Replies handed out for the current epoch and not yet delivered.
    outstanding: usize,
    sourcing_rules: RuleBook,
    screening_rules: RuleBook,
    rng: StdRng,
    on_search_start: Option<SearchCallback>,
}

impl ModeController {
    /// Create a controller for `job`, seeding the log with the greeting.
    pub fn new(config: CopilotConfig, job: Job, summary: &PipelineSummary) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let mut log = MessageLog::new();
        log.push(
            ChatMessage::assistant(templates::GREETING_INTRO)
                .with_timestamp(templates::GREETING_TIMESTAMP),
        );
        log.push(
            ChatMessage::assistant(templates::greeting_summary(summary))
                .with_timestamp(templates::GREETING_TIMESTAMP),
        );

        Self {
            config,
            job,
            log,
            flow: FlowState::Default,
            epoch: 0,
            outstanding: 0,
            sourcing_rules: RuleBook::seeded(RuleScope::Sourcing),
            screening_rules: RuleBook::seeded(RuleScope::Screening),
            rng,
            on_search_start: None,
        }
    }

    /// Register the callback fired when a refined search starts.
    pub fn with_search_callback(mut self, callback: SearchCallback) -> Self {
        self.on_search_start = Some(callback);
        self
    }

    // ── Accessors ───────────────────────────────────────────────────────

    pub fn mode(&self) -> Mode {
        self.flow.mode()
    }

    pub fn step(&self) -> usize {
        self.flow.step()
    }

    pub fn flow(&self) -> &FlowState {
        &self.flow
    }

    pub fn draft_answers(&self) -> Option<&DraftAnswers> {
        self.flow.draft_answers()
    }

    pub fn outreach_draft(&self) -> Option<&OutreachDraft> {
        self.flow.outreach_draft()
    }

    pub fn selected_sources(&self) -> Option<&BTreeSet<SourceKey>> {
        self.flow.selected_sources()
    }

    pub fn messages(&self) -> &MessageLog {
        &self.log
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn job(&self) -> &Job {
        &self.job
    }

    /// True while replies for the current mode are still pending.
    pub fn is_typing(&self) -> bool {
        self.outstanding > 0
    }

    pub fn rules(&self, scope: RuleScope) -> &RuleBook {
        match scope {
            RuleScope::Sourcing => &self.sourcing_rules,
            RuleScope::Screening => &self.screening_rules,
        }
    }

    fn rules_mut(&mut self, scope: RuleScope) -> &mut RuleBook {
        match scope {
            RuleScope::Sourcing => &mut self.sourcing_rules,
            RuleScope::Screening => &mut self.screening_rules,
        }
    }

    // ── Delivery ────────────────────────────────────────────────────────

    /// Append a pending reply if it still belongs to the current epoch.
    ///
    /// Returns whether the message was appended.
    pub fn deliver(&mut self, reply: PendingReply) -> bool {
        if reply.epoch != self.epoch {
            debug!(
                reply_epoch = reply.epoch,
                current_epoch = self.epoch,
                "Dropping stale reply"
            );
            return false;
        }
        self.outstanding = self.outstanding.saturating_sub(1);
        self.log.push(reply.message);
        true
    }

    fn reply(&mut self, out: &mut Outcome, pace: Pace, content: impl Into<String>) {
        let delay = match pace {
            Pace::Typing => self.config.typing_delay,
            Pace::Prompt => self.config.prompt_delay,
            Pace::Processing => self.config.processing_delay,
        };
        self.outstanding += 1;
        out.replies.push(PendingReply {
            epoch: self.epoch,
            delay,
            message: ChatMessage::assistant(content),
        });
    }

    /// Swap in a new flow, bumping the epoch and forgetting pending replies.
    fn transition(&mut self, next: FlowState, out: &mut Outcome) {
        let from = self.flow.mode();
        let to = next.mode();
        self.flow = next;
        self.epoch += 1;
        self.outstanding = 0;
        info!(%from, %to, epoch = self.epoch, "Co-pilot mode changed");
        out.events.push(ControllerEvent::ModeChanged { from, to });
    }

    fn reset(&mut self, out: &mut Outcome) {
        self.transition(FlowState::Default, out);
    }

    // ── Parent-driven mode changes ──────────────────────────────────────

    /// Enter the requested mode and emit its opening prompt.
    ///
    /// Modes that act on candidates refuse an empty selection: a fixed
    /// notice is appended and the controller falls back to default mode.
    pub fn enter_mode(&mut self, request: ModeRequest) -> Outcome {
        let mut out = Outcome::default();
        let ModeRequest { mode, candidates } = request;

        if mode == Mode::Default && self.mode() == Mode::Default {
            return out;
        }

        if mode.requires_candidates() && candidates.is_empty() {
            let error = FlowError::NoCandidates {
                mode: mode.to_string(),
            };
            warn!(%mode, error = %error, "Mode request refused");
            if self.mode() != Mode::Default {
                self.reset(&mut out);
            }
            self.reply(&mut out, Pace::Prompt, templates::no_candidates(mode));
            return out;
        }

        let candidate_count = candidates.len();
        let (next, opening) = match mode {
            Mode::Default => (FlowState::Default, None),
            Mode::Outreach => {
                let prompt = templates::channel_prompt(&candidates);
                (
                    FlowState::Outreach(OutreachFlow::ChannelSelect { candidates }),
                    Some(prompt),
                )
            }
            Mode::Search => (
                FlowState::Search(SearchFlow::Questions {
                    index: 0,
                    answers: DraftAnswers::default(),
                }),
                Some(templates::search_intro()),
            ),
            Mode::Rules | Mode::ScreeningRules => {
                let scope = mode.rule_scope().unwrap_or(RuleScope::Sourcing);
                (
                    FlowState::Rules(RulesFlow {
                        scope,
                        stage: RulesStage::Listing,
                    }),
                    Some(templates::rules_listing(self.rules(scope))),
                )
            }
            Mode::AutoaiCall | Mode::PriorityReview | Mode::ScreenaiCall => {
                let action = mode
                    .screening_action()
                    .unwrap_or(ScreeningAction::AutoaiCall);
                let prompt = templates::confirm_prompt(action, &candidates);
                (
                    FlowState::Confirm(ConfirmFlow { action, candidates }),
                    Some(prompt),
                )
            }
        };

        debug!(%mode, candidates = candidate_count, "Entering mode");
        self.transition(next, &mut out);
        if let Some(text) = opening {
            self.reply(&mut out, Pace::Prompt, text);
        }
        out
    }

    // ── User input ──────────────────────────────────────────────────────

    /// Interpret a free-text turn against the current mode and step.
    ///
    /// Empty or whitespace-only input is ignored entirely.
    pub fn submit_text(&mut self, text: &str) -> Outcome {
        let mut out = Outcome::default();
        let text = text.trim();
        if text.is_empty() {
            return out;
        }

        self.log.push(ChatMessage::user(text));

        match std::mem::take(&mut self.flow) {
            FlowState::Default => self.chat_reply(&mut out),
            FlowState::Outreach(flow) => self.outreach_text(flow, text, &mut out),
            FlowState::Search(flow) => self.search_text(flow, text, &mut out),
            FlowState::Rules(flow) => self.rules_text(flow, text, &mut out),
            FlowState::Confirm(flow) => self.confirm_text(flow, text, &mut out),
        }
        out
    }

    /// Apply a button-style panel action.
    pub fn apply(&mut self, action: PanelAction) -> Outcome {
        let mut out = Outcome::default();

        if action == PanelAction::Cancel {
            self.cancel(&mut out);
            return out;
        }

        match std::mem::take(&mut self.flow) {
            FlowState::Outreach(flow) => self.outreach_action(flow, action, &mut out),
            FlowState::Search(flow) => self.search_action(flow, action, &mut out),
            FlowState::Rules(flow) => self.rules_action(flow, action, &mut out),
            other => {
                debug!(mode = %other.mode(), ?action, "Action not available in this mode");
                self.flow = other;
            }
        }
        out
    }

    fn chat_reply(&mut self, out: &mut Outcome) {
        let reply = templates::CANNED_REPLIES
            .choose(&mut self.rng)
            .copied()
            .unwrap_or(templates::CANNED_REPLIES[0]);
        self.reply(out, Pace::Typing, reply);
    }

    fn cancel(&mut self, out: &mut Outcome) {
        let message = match &self.flow {
            FlowState::Default => return,
            FlowState::Outreach(_) => templates::OUTREACH_CANCELLED.to_string(),
            FlowState::Search(_) => templates::SEARCH_CANCELLED.to_string(),
            FlowState::Rules(flow) => templates::rules_cancelled(flow.scope),
            FlowState::Confirm(flow) => templates::confirm_cancelled(flow.action),
        };
        self.reset(out);
        self.reply(out, Pace::Prompt, message);
    }

    // ── Outreach ────────────────────────────────────────────────────────

    fn draft_for(&self, channel: OutreachChannel, candidates: Vec<Candidate>) -> OutreachDraft {
        let apply_link = self.config.apply_link(&self.job.id);
        let ctx = DraftContext {
            job: &self.job,
            company: &self.config.company_name,
            apply_link: &apply_link,
        };
        OutreachDraft {
            channel,
            message_text: templates::outreach_draft(channel, &candidates, &ctx),
            target_candidates: candidates,
        }
    }

    fn select_channel(
        &mut self,
        channel: OutreachChannel,
        candidates: Vec<Candidate>,
        out: &mut Outcome,
    ) {
        let draft = self.draft_for(channel, candidates);
        let prompt = templates::compose_prompt(channel, &draft.message_text);
        debug!(%channel, recipients = draft.target_candidates.len(), "Outreach draft created");
        self.flow = FlowState::Outreach(OutreachFlow::Compose(draft));
        self.reply(out, Pace::Prompt, prompt);
    }

    fn edit_draft(&mut self, mut draft: OutreachDraft, text: &str, out: &mut Outcome) {
        draft.message_text = text.to_string();
        let ack = templates::draft_updated(&draft.message_text);
        self.flow = FlowState::Outreach(OutreachFlow::Confirm(draft));
        self.reply(out, Pace::Prompt, ack);
    }

    fn send_draft(&mut self, draft: OutreachDraft, out: &mut Outcome) {
        let recipients = draft.target_candidates.len();
        info!(channel = %draft.channel, recipients, "Outreach queued");
        self.reset(out);
        self.reply(
            out,
            Pace::Processing,
            templates::outreach_queued(draft.channel, recipients),
        );
    }

    fn outreach_text(&mut self, flow: OutreachFlow, text: &str, out: &mut Outcome) {
        match flow {
            OutreachFlow::ChannelSelect { candidates } => {
                match OutreachChannel::mentioned_in(text) {
                    Some(channel) => self.select_channel(channel, candidates, out),
                    None => {
                        self.flow = FlowState::Outreach(OutreachFlow::ChannelSelect { candidates });
                        self.reply(out, Pace::Prompt, templates::CHANNEL_REPROMPT);
                    }
                }
            }
            OutreachFlow::Compose(draft) | OutreachFlow::Confirm(draft) => {
                if Intent::classify(text) == Intent::Affirmative {
                    self.send_draft(draft, out);
                } else {
                    self.edit_draft(draft, text, out);
                }
            }
        }
    }

    fn outreach_action(&mut self, flow: OutreachFlow, action: PanelAction, out: &mut Outcome) {
        match (flow, action) {
            (OutreachFlow::ChannelSelect { candidates }, PanelAction::SelectChannel(channel)) => {
                self.select_channel(channel, candidates, out);
            }
            (
                OutreachFlow::Compose(draft) | OutreachFlow::Confirm(draft),
                PanelAction::SelectChannel(channel),
            ) => {
                self.select_channel(channel, draft.target_candidates, out);
            }
            (
                OutreachFlow::Compose(draft) | OutreachFlow::Confirm(draft),
                PanelAction::EditDraft(text),
            ) => {
                let text = text.trim();
                if text.is_empty() {
                    self.flow = FlowState::Outreach(OutreachFlow::Compose(draft));
                } else {
                    self.edit_draft(draft, text, out);
                }
            }
            (
                OutreachFlow::Compose(draft) | OutreachFlow::Confirm(draft),
                PanelAction::SendDraft,
            ) => {
                self.send_draft(draft, out);
            }
            (flow @ OutreachFlow::ChannelSelect { .. }, PanelAction::SendDraft)
            | (flow @ OutreachFlow::ChannelSelect { .. }, PanelAction::EditDraft(_)) => {
                self.flow = FlowState::Outreach(flow);
                self.reply(out, Pace::Prompt, templates::DRAFT_NOT_READY);
            }
            (flow, action) => {
                debug!(?action, "Action ignored during outreach");
                self.flow = FlowState::Outreach(flow);
            }
        }
    }

    // ── Search refinement ───────────────────────────────────────────────

    fn search_text(&mut self, flow: SearchFlow, text: &str, out: &mut Outcome) {
        match flow {
            SearchFlow::Questions { index, mut answers } => {
                let question = &SEARCH_QUESTIONS[index];
                answers.insert(question.key, text);
                let next = index + 1;
                if let Some(question) = SEARCH_QUESTIONS.get(next) {
                    self.flow = FlowState::Search(SearchFlow::Questions {
                        index: next,
                        answers,
                    });
                    self.reply(out, Pace::Prompt, templates::next_question(question));
                } else {
                    self.flow = FlowState::Search(SearchFlow::Sources {
                        answers,
                        selected: BTreeSet::new(),
                    });
                    self.reply(out, Pace::Prompt, templates::sources_prompt());
                }
            }
            SearchFlow::Sources { answers, selected } => {
                if contains_any(text, &START_KEYWORDS) {
                    self.start_search(answers, selected, out);
                } else {
                    self.flow = FlowState::Search(SearchFlow::Sources { answers, selected });
                    self.reply(out, Pace::Prompt, templates::SOURCES_REPROMPT);
                }
            }
        }
    }

    fn search_action(&mut self, flow: SearchFlow, action: PanelAction, out: &mut Outcome) {
        match (flow, action) {
            (SearchFlow::Sources { answers, mut selected }, PanelAction::ToggleSource(source)) => {
                if !selected.remove(&source) {
                    selected.insert(source);
                }
                debug!(%source, selected = selected.len(), "Search source toggled");
                self.flow = FlowState::Search(SearchFlow::Sources { answers, selected });
            }
            (SearchFlow::Sources { answers, selected }, PanelAction::StartSearch) => {
                self.start_search(answers, selected, out);
            }
            (flow, action) => {
                debug!(?action, "Action ignored during search");
                self.flow = FlowState::Search(flow);
            }
        }
    }

    fn start_search(
        &mut self,
        answers: DraftAnswers,
        selected: BTreeSet<SourceKey>,
        out: &mut Outcome,
    ) {
        if selected.is_empty() {
            self.flow = FlowState::Search(SearchFlow::Sources { answers, selected });
            self.reply(out, Pace::Prompt, templates::NEED_SOURCE);
            return;
        }

        let sources: Vec<SourceKey> = selected.into_iter().collect();
        let summary = templates::search_summary(&answers, &sources);
        info!(sources = ?sources, "Refined search started");

        if let Some(callback) = self.on_search_start.as_mut() {
            callback(&sources);
        }
        self.reset(out);
        out.events.push(ControllerEvent::SearchStarted {
            sources: sources.clone(),
        });
        self.reply(out, Pace::Processing, summary);
    }

    // ── Rules ───────────────────────────────────────────────────────────

    fn rules_text(&mut self, flow: RulesFlow, text: &str, out: &mut Outcome) {
        let RulesFlow { scope, stage } = flow;
        match stage {
            RulesStage::Listing => {
                if contains_any(text, &EXIT_KEYWORDS) {
                    self.reset(out);
                    self.reply(out, Pace::Processing, templates::rules_saved(scope));
                } else if contains_any(text, &ADD_KEYWORDS) {
                    self.begin_add_rule(scope, out);
                } else {
                    self.flow = FlowState::Rules(RulesFlow {
                        scope,
                        stage: RulesStage::Listing,
                    });
                    self.reply(out, Pace::Prompt, templates::RULES_REPROMPT);
                }
            }
            RulesStage::Adding { index, mut answers } => {
                let questions = rule_questions(scope);
                answers.insert(questions[index].key, text);
                let next = index + 1;
                if let Some(question) = questions.get(next) {
                    self.flow = FlowState::Rules(RulesFlow {
                        scope,
                        stage: RulesStage::Adding {
                            index: next,
                            answers,
                        },
                    });
                    self.reply(out, Pace::Prompt, templates::next_question(question));
                } else {
                    self.finish_rule(scope, &answers, out);
                }
            }
        }
    }

    fn begin_add_rule(&mut self, scope: RuleScope, out: &mut Outcome) {
        let first = &rule_questions(scope)[0];
        self.flow = FlowState::Rules(RulesFlow {
            scope,
            stage: RulesStage::Adding {
                index: 0,
                answers: DraftAnswers::default(),
            },
        });
        self.reply(out, Pace::Prompt, templates::add_rule_intro(first));
    }

    fn finish_rule(&mut self, scope: RuleScope, answers: &DraftAnswers, out: &mut Outcome) {
        let part = |key| answers.get(key).unwrap_or_default();
        let label = templates::rule_label(part("trigger"), part("action"), part("timing"));
        self.rules_mut(scope).add(label.clone());
        info!(%scope, rule = %label, "Rule added");

        self.flow = FlowState::Rules(RulesFlow {
            scope,
            stage: RulesStage::Listing,
        });
        out.events.push(ControllerEvent::RulesChanged { scope });
        let message = templates::rule_added(&label, self.rules(scope));
        self.reply(out, Pace::Prompt, message);
    }

    fn rules_action(&mut self, flow: RulesFlow, action: PanelAction, out: &mut Outcome) {
        let scope = flow.scope;
        match action {
            PanelAction::AddRule if flow.stage == RulesStage::Listing => {
                self.begin_add_rule(scope, out);
            }
            PanelAction::ToggleRule(rule) => {
                self.flow = FlowState::Rules(flow);
                let result = self
                    .resolve_rule(scope, rule)
                    .and_then(|id| self.toggle_rule(scope, id).map(|_| ()));
                self.after_rule_edit(scope, result, out);
            }
            PanelAction::DeleteRule(rule) => {
                self.flow = FlowState::Rules(flow);
                let result = self
                    .resolve_rule(scope, rule)
                    .and_then(|id| self.delete_rule(scope, id).map(|_| ()));
                self.after_rule_edit(scope, result, out);
            }
            action => {
                debug!(?action, "Action ignored while editing rules");
                self.flow = FlowState::Rules(flow);
            }
        }
    }

    fn after_rule_edit(
        &mut self,
        scope: RuleScope,
        result: Result<(), FlowError>,
        out: &mut Outcome,
    ) {
        match result {
            Ok(()) => {
                out.events.push(ControllerEvent::RulesChanged { scope });
                let listing = templates::rules_listing(self.rules(scope));
                self.reply(out, Pace::Prompt, listing);
            }
            Err(e) => {
                warn!(%scope, error = %e, "Rule edit failed");
                self.reply(out, Pace::Prompt, templates::RULE_NOT_FOUND);
            }
        }
    }

    fn resolve_rule(&self, scope: RuleScope, rule: RuleRef) -> Result<Uuid, FlowError> {
        match rule {
            RuleRef::Id(id) => Ok(id),
            RuleRef::Position(position) => self
                .rules(scope)
                .id_at(position)
                .ok_or(FlowError::RuleNotFoundAt { position }),
        }
    }

    /// Flip a rule's active flag directly. Returns the new state.
    pub fn toggle_rule(&mut self, scope: RuleScope, id: Uuid) -> Result<bool, FlowError> {
        let active = self.rules_mut(scope).toggle(id)?;
        debug!(%scope, %id, active, "Rule toggled");
        Ok(active)
    }

    /// Delete a rule directly.
    pub fn delete_rule(&mut self, scope: RuleScope, id: Uuid) -> Result<Rule, FlowError> {
        let rule = self.rules_mut(scope).delete(id)?;
        debug!(%scope, %id, "Rule deleted");
        Ok(rule)
    }

    // ── Screening confirmations ─────────────────────────────────────────

    fn confirm_text(&mut self, flow: ConfirmFlow, text: &str, out: &mut Outcome) {
        match Intent::classify(text) {
            Intent::Affirmative => {
                let recipients = flow.candidates.len();
                info!(action = ?flow.action, recipients, "Screening action confirmed");
                self.reset(out);
                self.reply(
                    out,
                    Pace::Processing,
                    templates::confirm_completed(flow.action, recipients),
                );
            }
            Intent::Negative => {
                self.reset(out);
                self.reply(out, Pace::Prompt, templates::confirm_cancelled(flow.action));
            }
            Intent::Other => {
                self.flow = FlowState::Confirm(flow);
                self.reply(out, Pace::Prompt, templates::CONFIRM_REPROMPT);
            }
        }
    }
}
