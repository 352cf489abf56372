//! Candidates, the source pools they come from, and the jobs they apply to.

use serde::{Deserialize, Serialize};

use crate::error::FlowError;

/// Which sourcing pool a candidate was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SourceKey {
    /// Internal database matches.
    TalentMatch,
    /// Job board applicants.
    Syndication,
    /// LinkedIn passive sourcing.
    AutoSourcing,
}

impl SourceKey {
    /// All sources in canonical display order.
    pub const ALL: [SourceKey; 3] = [Self::TalentMatch, Self::Syndication, Self::AutoSourcing];

    /// Wire key, e.g. `"talentMatch"`.
    pub fn key(&self) -> &'static str {
        match self {
            Self::TalentMatch => "talentMatch",
            Self::Syndication => "syndication",
            Self::AutoSourcing => "autoSourcing",
        }
    }

    /// Human-readable tab label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::TalentMatch => "Talent Match",
            Self::Syndication => "Syndication",
            Self::AutoSourcing => "Auto Sourcing",
        }
    }
}

impl std::fmt::Display for SourceKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

impl std::str::FromStr for SourceKey {
    type Err = FlowError;

    /// Accepts the wire key or the label, ignoring case and spaces.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
            .collect::<String>()
            .to_lowercase();
        Self::ALL
            .into_iter()
            .find(|source| source.key().to_lowercase() == normalized)
            .ok_or_else(|| FlowError::UnknownSource(s.to_string()))
    }
}

/// A sourced candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub id: String,
    pub name: String,
    pub current_role: String,
    pub experience: String,
    /// Static, pre-assigned match score (0-100).
    pub match_score: u8,
    pub skills: Vec<String>,
    /// Where the profile came from, e.g. "Naukri" or "LinkedIn".
    pub source: String,
    pub last_active: String,
    pub status: String,
}

impl Candidate {
    /// Minimal candidate with just an id and a name.
    pub fn named(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            current_role: String::new(),
            experience: String::new(),
            match_score: 0,
            skills: Vec::new(),
            source: String::new(),
            last_active: String::new(),
            status: String::new(),
        }
    }

    /// First whitespace-separated token of the name.
    pub fn first_name(&self) -> &str {
        self.name.split_whitespace().next().unwrap_or(&self.name)
    }
}

/// An open requisition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: String,
    pub title: String,
    pub department: String,
    pub location: String,
    #[serde(rename = "type")]
    pub employment_type: String,
    pub experience: String,
    pub salary: String,
    pub description: String,
    pub skills: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_key_parses_key_and_label() {
        assert_eq!("talentMatch".parse::<SourceKey>().unwrap(), SourceKey::TalentMatch);
        assert_eq!("Auto Sourcing".parse::<SourceKey>().unwrap(), SourceKey::AutoSourcing);
        assert_eq!("auto_sourcing".parse::<SourceKey>().unwrap(), SourceKey::AutoSourcing);
        assert_eq!("SYNDICATION".parse::<SourceKey>().unwrap(), SourceKey::Syndication);
        assert!("consolidated".parse::<SourceKey>().is_err());
    }

    #[test]
    fn display_matches_serde() {
        for source in SourceKey::ALL {
            let json = serde_json::to_string(&source).unwrap();
            assert_eq!(json, format!("\"{source}\""));
        }
    }

    #[test]
    fn first_name_takes_leading_token() {
        let c = Candidate::named("tm-001", "Arjun Krishnamurthy");
        assert_eq!(c.first_name(), "Arjun");
        let mononym = Candidate::named("x", "Prince");
        assert_eq!(mononym.first_name(), "Prince");
    }
}
