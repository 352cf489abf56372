//! Mode tags and the fixed option sets offered inside flows.

use serde::{Deserialize, Serialize};

use crate::error::FlowError;
use crate::model::RuleScope;

/// The guided flow the chat panel is currently running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    #[default]
    Default,
    Outreach,
    Search,
    Rules,
    AutoaiCall,
    PriorityReview,
    ScreenaiCall,
    ScreeningRules,
}

impl Mode {
    pub const ALL: [Mode; 8] = [
        Self::Default,
        Self::Outreach,
        Self::Search,
        Self::Rules,
        Self::AutoaiCall,
        Self::PriorityReview,
        Self::ScreenaiCall,
        Self::ScreeningRules,
    ];

    /// Whether entering this mode needs a non-empty candidate selection.
    pub fn requires_candidates(&self) -> bool {
        matches!(
            self,
            Self::Outreach | Self::AutoaiCall | Self::PriorityReview | Self::ScreenaiCall
        )
    }

    /// Screening action run by a single-step confirmation mode.
    pub fn screening_action(&self) -> Option<ScreeningAction> {
        match self {
            Self::AutoaiCall => Some(ScreeningAction::AutoaiCall),
            Self::PriorityReview => Some(ScreeningAction::PriorityReview),
            Self::ScreenaiCall => Some(ScreeningAction::ScreenaiCall),
            _ => None,
        }
    }

    /// Rule book edited by a rule-authoring mode.
    pub fn rule_scope(&self) -> Option<RuleScope> {
        match self {
            Self::Rules => Some(RuleScope::Sourcing),
            Self::ScreeningRules => Some(RuleScope::Screening),
            _ => None,
        }
    }

    /// Phrase used when talking about the mode in chat.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Default => "chat",
            Self::Outreach => "outreach",
            Self::Search => "search refinement",
            Self::Rules => "sourcing rules",
            Self::AutoaiCall => "AutoAI calls",
            Self::PriorityReview => "priority review",
            Self::ScreenaiCall => "ScreenAI calls",
            Self::ScreeningRules => "screening rules",
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Default => "default",
            Self::Outreach => "outreach",
            Self::Search => "search",
            Self::Rules => "rules",
            Self::AutoaiCall => "autoai_call",
            Self::PriorityReview => "priority_review",
            Self::ScreenaiCall => "screenai_call",
            Self::ScreeningRules => "screening_rules",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for Mode {
    type Err = FlowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|m| m.to_string() == normalized)
            .ok_or_else(|| FlowError::UnknownMode(s.to_string()))
    }
}

/// Contact method offered in the outreach flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutreachChannel {
    Whatsapp,
    Email,
    Linkedin,
}

impl OutreachChannel {
    pub const ALL: [OutreachChannel; 3] = [Self::Whatsapp, Self::Email, Self::Linkedin];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Whatsapp => "WhatsApp",
            Self::Email => "Email",
            Self::Linkedin => "LinkedIn InMail",
        }
    }

    /// First channel named anywhere in free text, if any.
    pub fn mentioned_in(text: &str) -> Option<Self> {
        let lower = text.to_lowercase();
        Self::ALL.into_iter().find(|c| lower.contains(&c.to_string()))
    }
}

impl std::fmt::Display for OutreachChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Whatsapp => write!(f, "whatsapp"),
            Self::Email => write!(f, "email"),
            Self::Linkedin => write!(f, "linkedin"),
        }
    }
}

impl std::str::FromStr for OutreachChannel {
    type Err = FlowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "whatsapp" | "wa" => Ok(Self::Whatsapp),
            "email" | "mail" => Ok(Self::Email),
            "linkedin" | "inmail" | "linkedin inmail" => Ok(Self::Linkedin),
            _ => Err(FlowError::UnknownChannel(s.to_string())),
        }
    }
}

/// Screening stage actions confirmed through a single yes/cancel step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScreeningAction {
    AutoaiCall,
    PriorityReview,
    ScreenaiCall,
}

impl ScreeningAction {
    pub fn label(&self) -> &'static str {
        match self {
            Self::AutoaiCall => "AutoAI Call",
            Self::PriorityReview => "Priority Review",
            Self::ScreenaiCall => "ScreenAI Call",
        }
    }

    pub fn mode(&self) -> Mode {
        match self {
            Self::AutoaiCall => Mode::AutoaiCall,
            Self::PriorityReview => Mode::PriorityReview,
            Self::ScreenaiCall => Mode::ScreenaiCall,
        }
    }
}
