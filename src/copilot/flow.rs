//! Per-mode flow state.
//!
//! Each variant of [`FlowState`] carries only the data its mode needs, so
//! leaving a flow drops its step cursor, answers, and draft with it.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::model::{Candidate, RuleScope, SourceKey};

use super::mode::{Mode, OutreachChannel, ScreeningAction};

/// Free-text answers keyed by question, in the order they were asked.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DraftAnswers {
    entries: Vec<(&'static str, String)>,
}

impl DraftAnswers {
    /// Store an answer, replacing any earlier answer for the same key.
    pub fn insert(&mut self, key: &'static str, answer: impl Into<String>) {
        let answer = answer.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = answer,
            None => self.entries.push((key, answer)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.entries.iter().map(|(k, v)| (*k, v.as_str()))
    }
}

/// A fixed question asked by a multi-step flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Question {
    pub key: &'static str,
    pub prompt: &'static str,
    /// Short label used when echoing the answer back.
    pub label: &'static str,
}

pub const SEARCH_QUESTIONS: [Question; 3] = [
    Question {
        key: "skills",
        prompt: "What are the must-have skills for this role?",
        label: "Must-have skills",
    },
    Question {
        key: "exclusions",
        prompt: "Anything I should exclude? (e.g. skills, seniority, or profiles to skip)",
        label: "Exclusions",
    },
    Question {
        key: "companies",
        prompt: "Which companies or industries should I target?",
        label: "Target companies",
    },
];

pub const SOURCING_RULE_QUESTIONS: [Question; 3] = [
    Question {
        key: "trigger",
        prompt: "When should this rule fire? (e.g. \"no reply in 3 days\")",
        label: "Trigger",
    },
    Question {
        key: "action",
        prompt: "What should I do when it fires? (e.g. \"send a follow-up\")",
        label: "Action",
    },
    Question {
        key: "timing",
        prompt: "Which channel and timing? (e.g. \"WhatsApp, next morning\")",
        label: "Channel / timing",
    },
];

pub const SCREENING_RULE_QUESTIONS: [Question; 3] = [
    Question {
        key: "trigger",
        prompt: "Which candidates should this apply to? (e.g. \"match score above 85\")",
        label: "Trigger",
    },
    Question {
        key: "action",
        prompt: "What should happen? (e.g. \"trigger an AutoAI call\")",
        label: "Action",
    },
    Question {
        key: "timing",
        prompt: "When should it run? (e.g. \"within 24 hours\")",
        label: "Channel / timing",
    },
];

/// Rule-authoring questions for a rule book.
pub fn rule_questions(scope: RuleScope) -> &'static [Question; 3] {
    match scope {
        RuleScope::Sourcing => &SOURCING_RULE_QUESTIONS,
        RuleScope::Screening => &SCREENING_RULE_QUESTIONS,
    }
}

/// Outreach message under composition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutreachDraft {
    pub channel: OutreachChannel,
    pub message_text: String,
    pub target_candidates: Vec<Candidate>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum OutreachFlow {
    ChannelSelect { candidates: Vec<Candidate> },
    Compose(OutreachDraft),
    /// Draft was edited; the next affirmative sends it.
    Confirm(OutreachDraft),
}

#[derive(Debug, Clone, PartialEq)]
pub enum SearchFlow {
    Questions {
        index: usize,
        answers: DraftAnswers,
    },
    Sources {
        answers: DraftAnswers,
        selected: BTreeSet<SourceKey>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum RulesStage {
    Listing,
    Adding { index: usize, answers: DraftAnswers },
}

#[derive(Debug, Clone, PartialEq)]
pub struct RulesFlow {
    pub scope: RuleScope,
    pub stage: RulesStage,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConfirmFlow {
    pub action: ScreeningAction,
    pub candidates: Vec<Candidate>,
}

/// The active flow and everything it has collected so far.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum FlowState {
    #[default]
    Default,
    Outreach(OutreachFlow),
    Search(SearchFlow),
    Rules(RulesFlow),
    Confirm(ConfirmFlow),
}

impl FlowState {
    pub fn mode(&self) -> Mode {
        match self {
            Self::Default => Mode::Default,
            Self::Outreach(_) => Mode::Outreach,
            Self::Search(_) => Mode::Search,
            Self::Rules(flow) => match flow.scope {
                RuleScope::Sourcing => Mode::Rules,
                RuleScope::Screening => Mode::ScreeningRules,
            },
            Self::Confirm(flow) => flow.action.mode(),
        }
    }

    /// Step cursor within the flow; 0 when no flow is running.
    pub fn step(&self) -> usize {
        match self {
            Self::Default => 0,
            Self::Outreach(OutreachFlow::ChannelSelect { .. }) => 1,
            Self::Outreach(OutreachFlow::Compose(_)) => 2,
            Self::Outreach(OutreachFlow::Confirm(_)) => 3,
            Self::Search(SearchFlow::Questions { index, .. }) => index + 1,
            Self::Search(SearchFlow::Sources { .. }) => SEARCH_QUESTIONS.len() + 1,
            Self::Rules(RulesFlow {
                stage: RulesStage::Listing,
                ..
            }) => 1,
            Self::Rules(RulesFlow {
                stage: RulesStage::Adding { index, .. },
                ..
            }) => index + 2,
            Self::Confirm(_) => 1,
        }
    }

    pub fn draft_answers(&self) -> Option<&DraftAnswers> {
        match self {
            Self::Search(SearchFlow::Questions { answers, .. })
            | Self::Search(SearchFlow::Sources { answers, .. })
            | Self::Rules(RulesFlow {
                stage: RulesStage::Adding { answers, .. },
                ..
            }) => Some(answers),
            _ => None,
        }
    }

    pub fn outreach_draft(&self) -> Option<&OutreachDraft> {
        match self {
            Self::Outreach(OutreachFlow::Compose(draft))
            | Self::Outreach(OutreachFlow::Confirm(draft)) => Some(draft),
            _ => None,
        }
    }

    pub fn selected_sources(&self) -> Option<&BTreeSet<SourceKey>> {
        match self {
            Self::Search(SearchFlow::Sources { selected, .. }) => Some(selected),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn answers_keep_one_entry_per_key() {
        let mut answers = DraftAnswers::default();
        answers.insert("skills", "Go");
        answers.insert("exclusions", "no freshers");
        answers.insert("skills", "Go, Kubernetes");

        assert_eq!(answers.len(), 2);
        assert_eq!(answers.get("skills"), Some("Go, Kubernetes"));
        let keys: Vec<_> = answers.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, ["skills", "exclusions"]);
    }

    #[test]
    fn default_flow_has_no_step_or_answers() {
        let flow = FlowState::default();
        assert_eq!(flow.mode(), Mode::Default);
        assert_eq!(flow.step(), 0);
        assert!(flow.draft_answers().is_none());
        assert!(flow.outreach_draft().is_none());
    }

    #[test]
    fn steps_follow_flow_position() {
        let search = FlowState::Search(SearchFlow::Questions {
            index: 2,
            answers: DraftAnswers::default(),
        });
        assert_eq!(search.step(), 3);

        let sources = FlowState::Search(SearchFlow::Sources {
            answers: DraftAnswers::default(),
            selected: BTreeSet::new(),
        });
        assert_eq!(sources.step(), 4);

        let adding = FlowState::Rules(RulesFlow {
            scope: RuleScope::Screening,
            stage: RulesStage::Adding {
                index: 0,
                answers: DraftAnswers::default(),
            },
        });
        assert_eq!(adding.step(), 2);
        assert_eq!(adding.mode(), Mode::ScreeningRules);
    }
}
