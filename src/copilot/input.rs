//! Input interpretation: keyword intents and slash commands.
//!
//! Free text is matched against small fixed keyword sets by
//! case-insensitive substring; there is no language understanding. Slash
//! commands stand in for the panel's buttons when driving the co-pilot from
//! a terminal.

use std::sync::LazyLock;

use regex::Regex;
use uuid::Uuid;

use crate::model::SourceKey;

use super::mode::{Mode, OutreachChannel};

pub const AFFIRMATIVE_KEYWORDS: [&str; 4] = ["yes", "send", "confirm", "proceed"];
pub const NEGATIVE_KEYWORDS: [&str; 2] = ["no", "cancel"];
pub const EXIT_KEYWORDS: [&str; 2] = ["done", "save"];
pub const ADD_KEYWORDS: [&str; 1] = ["add"];
pub const START_KEYWORDS: [&str; 1] = ["start"];

/// What a free-text reply means to a yes/cancel prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Affirmative,
    Negative,
    Other,
}

impl Intent {
    /// Classify a reply. Affirmative keywords are checked first.
    pub fn classify(text: &str) -> Self {
        if contains_any(text, &AFFIRMATIVE_KEYWORDS) {
            Self::Affirmative
        } else if contains_any(text, &NEGATIVE_KEYWORDS) {
            Self::Negative
        } else {
            Self::Other
        }
    }
}

/// Case-insensitive substring match against any keyword.
pub fn contains_any(text: &str, keywords: &[&str]) -> bool {
    let lower = text.to_lowercase();
    keywords.iter().any(|k| lower.contains(k))
}

/// Reference to a rule either by id or by 1-based list position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleRef {
    Id(Uuid),
    Position(usize),
}

/// Button-style actions the panel exposes besides free text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelAction {
    SelectChannel(OutreachChannel),
    /// Replace the outreach draft text verbatim.
    EditDraft(String),
    SendDraft,
    ToggleSource(SourceKey),
    StartSearch,
    AddRule,
    ToggleRule(RuleRef),
    DeleteRule(RuleRef),
    /// Abandon the active flow.
    Cancel,
}

/// A parsed line of terminal input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Text(String),
    Action(PanelAction),
    /// Ask the co-pilot to enter a mode, optionally for the top `count`
    /// consolidated candidates.
    SwitchMode { mode: Mode, count: Option<usize> },
    /// `/suggest` lists the suggestion chips; `/suggest n` sends the nth one.
    Suggest(Option<usize>),
    Help,
    Quit,
    /// A slash command that could not be understood.
    Unknown(String),
}

static COMMAND: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^/(?P<cmd>[a-zA-Z_-]+)(?:\s+(?P<arg>.*))?$").expect("command pattern is valid")
});

/// Parses terminal lines into [`Input`].
pub struct InputParser;

impl InputParser {
    pub fn parse(line: &str) -> Input {
        let trimmed = line.trim();
        if !trimmed.starts_with('/') {
            return Input::Text(line.to_string());
        }

        let Some(caps) = COMMAND.captures(trimmed) else {
            return Input::Unknown(trimmed.to_string());
        };
        let cmd = caps["cmd"].to_lowercase();
        let arg = caps.name("arg").map(|m| m.as_str().trim()).unwrap_or("");

        parse_command(&cmd, arg).unwrap_or_else(|| Input::Unknown(trimmed.to_string()))
    }
}

fn parse_command(cmd: &str, arg: &str) -> Option<Input> {
    let action = |a| Some(Input::Action(a));
    match cmd {
        "quit" | "exit" => Some(Input::Quit),
        "help" => Some(Input::Help),
        "send" => action(PanelAction::SendDraft),
        "start" => action(PanelAction::StartSearch),
        "add" => action(PanelAction::AddRule),
        "cancel" => action(PanelAction::Cancel),
        "channel" => action(PanelAction::SelectChannel(arg.parse().ok()?)),
        "source" => action(PanelAction::ToggleSource(arg.parse().ok()?)),
        "edit" if !arg.is_empty() => action(PanelAction::EditDraft(arg.to_string())),
        "toggle" => action(PanelAction::ToggleRule(parse_rule_ref(arg)?)),
        "delete" => action(PanelAction::DeleteRule(parse_rule_ref(arg)?)),
        "mode" => parse_mode_switch(arg),
        "suggest" if arg.is_empty() => Some(Input::Suggest(None)),
        "suggest" => Some(Input::Suggest(Some(arg.parse().ok()?))),
        _ => None,
    }
}

fn parse_rule_ref(arg: &str) -> Option<RuleRef> {
    if let Ok(position) = arg.parse::<usize>() {
        return Some(RuleRef::Position(position));
    }
    Uuid::parse_str(arg).ok().map(RuleRef::Id)
}

/// `/mode <tag> [count]`
fn parse_mode_switch(arg: &str) -> Option<Input> {
    let mut parts = arg.split_whitespace();
    let mode = parts.next()?.parse().ok()?;
    let count = match parts.next() {
        Some(n) => Some(n.parse().ok()?),
        None => None,
    };
    Some(Input::SwitchMode { mode, count })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn affirmative_is_case_insensitive_substring() {
        assert_eq!(Intent::classify("YES"), Intent::Affirmative);
        assert_eq!(Intent::classify("please Proceed now"), Intent::Affirmative);
        assert_eq!(Intent::classify("ok, send it"), Intent::Affirmative);
        assert_eq!(Intent::classify("Confirmed"), Intent::Affirmative);
    }

    #[test]
    fn negative_detection() {
        assert_eq!(Intent::classify("No"), Intent::Negative);
        assert_eq!(Intent::classify("cancel that"), Intent::Negative);
        assert_eq!(Intent::classify("maybe later"), Intent::Other);
    }

    #[test]
    fn affirmative_wins_ties() {
        assert_eq!(Intent::classify("no wait, yes"), Intent::Affirmative);
    }

    #[test]
    fn plain_text_passes_through_untrimmed() {
        assert_eq!(
            InputParser::parse("  hello there "),
            Input::Text("  hello there ".into())
        );
    }

    #[test]
    fn parses_panel_commands() {
        assert_eq!(
            InputParser::parse("/channel email"),
            Input::Action(PanelAction::SelectChannel(OutreachChannel::Email))
        );
        assert_eq!(
            InputParser::parse("/source talentMatch"),
            Input::Action(PanelAction::ToggleSource(SourceKey::TalentMatch))
        );
        assert_eq!(
            InputParser::parse("/toggle 2"),
            Input::Action(PanelAction::ToggleRule(RuleRef::Position(2)))
        );
        assert_eq!(
            InputParser::parse("/edit Hi Arjun, quick note"),
            Input::Action(PanelAction::EditDraft("Hi Arjun, quick note".into()))
        );
        assert_eq!(InputParser::parse("/START"), Input::Action(PanelAction::StartSearch));
        assert_eq!(InputParser::parse("/quit"), Input::Quit);
    }

    #[test]
    fn parses_mode_switch() {
        assert_eq!(
            InputParser::parse("/mode outreach 2"),
            Input::SwitchMode {
                mode: Mode::Outreach,
                count: Some(2)
            }
        );
        assert_eq!(
            InputParser::parse("/mode search"),
            Input::SwitchMode {
                mode: Mode::Search,
                count: None
            }
        );
    }

    #[test]
    fn parses_suggestion_pick() {
        assert_eq!(InputParser::parse("/suggest"), Input::Suggest(None));
        assert_eq!(InputParser::parse("/suggest 2"), Input::Suggest(Some(2)));
        assert!(matches!(InputParser::parse("/suggest two"), Input::Unknown(_)));
    }

    #[test]
    fn bad_commands_are_unknown() {
        assert!(matches!(InputParser::parse("/channel fax"), Input::Unknown(_)));
        assert!(matches!(InputParser::parse("/mode interview"), Input::Unknown(_)));
        assert!(matches!(InputParser::parse("/edit"), Input::Unknown(_)));
        assert!(matches!(InputParser::parse("/frobnicate"), Input::Unknown(_)));
        assert!(matches!(InputParser::parse("/"), Input::Unknown(_)));
    }
}
