//! Automation rules authored from the chat panel.
//!
//! Rules are descriptive labels only. Nothing evaluates them against
//! candidates; they exist so recruiters can record and toggle intent.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::FlowError;

/// Which pipeline stage a rule book belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleScope {
    Sourcing,
    Screening,
}

impl std::fmt::Display for RuleScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sourcing => write!(f, "sourcing"),
            Self::Screening => write!(f, "screening"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    pub id: Uuid,
    pub label: String,
    pub active: bool,
}

impl Rule {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            label: label.into(),
            active: true,
        }
    }

    fn paused(mut self) -> Self {
        self.active = false;
        self
    }
}

/// Insertion-ordered list of rules for one scope.
#[derive(Debug, Clone, Serialize)]
pub struct RuleBook {
    scope: RuleScope,
    rules: Vec<Rule>,
}

impl RuleBook {
    pub fn empty(scope: RuleScope) -> Self {
        Self {
            scope,
            rules: Vec::new(),
        }
    }

    /// Rule book pre-seeded with the default rules for `scope`.
    pub fn seeded(scope: RuleScope) -> Self {
        let rules = match scope {
            RuleScope::Sourcing => vec![
                Rule::new("When a candidate hasn't replied in 3 days, send a WhatsApp follow-up"),
                Rule::new("When an email is unopened after 5 days, re-send it via LinkedIn InMail"),
                Rule::new("When a candidate is not actively looking, hold outreach for 2 weeks")
                    .paused(),
            ],
            RuleScope::Screening => vec![
                Rule::new("When match score is above 85, trigger an AutoAI call"),
                Rule::new("When a candidate shows interest, schedule a ScreenAI call within 24 hours"),
            ],
        };
        Self { scope, rules }
    }

    pub fn scope(&self) -> RuleScope {
        self.scope
    }

    /// Append a new active rule and return it.
    pub fn add(&mut self, label: impl Into<String>) -> &Rule {
        self.rules.push(Rule::new(label));
        let idx = self.rules.len() - 1;
        &self.rules[idx]
    }

    /// Flip a rule's active flag. Returns the new state.
    pub fn toggle(&mut self, id: Uuid) -> Result<bool, FlowError> {
        let rule = self
            .rules
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(FlowError::RuleNotFound { id })?;
        rule.active = !rule.active;
        Ok(rule.active)
    }

    /// Remove the rule with `id` and return it.
    pub fn delete(&mut self, id: Uuid) -> Result<Rule, FlowError> {
        let idx = self
            .rules
            .iter()
            .position(|r| r.id == id)
            .ok_or(FlowError::RuleNotFound { id })?;
        Ok(self.rules.remove(idx))
    }

    pub fn get(&self, id: Uuid) -> Option<&Rule> {
        self.rules.iter().find(|r| r.id == id)
    }

    /// Id of the rule at a 1-based display position.
    pub fn id_at(&self, position: usize) -> Option<Uuid> {
        position
            .checked_sub(1)
            .and_then(|i| self.rules.get(i))
            .map(|r| r.id)
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_keeps_id_and_label() {
        let mut book = RuleBook::seeded(RuleScope::Sourcing);
        let before = book.rules()[0].clone();

        assert!(!book.toggle(before.id).unwrap());
        let after = book.get(before.id).unwrap();
        assert_eq!(after.id, before.id);
        assert_eq!(after.label, before.label);
        assert!(!after.active);

        assert!(book.toggle(before.id).unwrap());
    }

    #[test]
    fn delete_removes_exactly_one() {
        let mut book = RuleBook::seeded(RuleScope::Screening);
        let len = book.len();
        let target = book.rules()[1].id;

        let removed = book.delete(target).unwrap();
        assert_eq!(removed.id, target);
        assert_eq!(book.len(), len - 1);
        assert!(book.get(target).is_none());
        assert!(book.delete(target).is_err());
    }

    #[test]
    fn add_appends_in_insertion_order() {
        let mut book = RuleBook::empty(RuleScope::Sourcing);
        book.add("first");
        let id = book.add("second").id;
        assert_eq!(book.rules()[1].label, "second");
        assert_eq!(book.id_at(2), Some(id));
        assert_eq!(book.id_at(0), None);
        assert_eq!(book.id_at(3), None);
    }

    #[test]
    fn unknown_rule_is_an_error() {
        let mut book = RuleBook::empty(RuleScope::Sourcing);
        assert!(matches!(
            book.toggle(Uuid::new_v4()),
            Err(FlowError::RuleNotFound { .. })
        ));
    }
}
