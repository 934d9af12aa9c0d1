//! In-memory rule book

use dashmap::DashMap;
use risk_engine::{Rule, RuleCondition, RuleDraft, RuleField};
use std::path::Path;
use tracing::info;
use uuid::Uuid;

use crate::errors::{MonitorError, MonitorResult};

/// Concurrent store of detection rules
pub struct RuleBook {
    rules: DashMap<Uuid, Rule>,
}

impl RuleBook {
    pub fn new() -> Self {
        Self {
            rules: DashMap::new(),
        }
    }

    /// Build a rule book from drafts, rejecting the first invalid one
    pub fn from_drafts(drafts: impl IntoIterator<Item = RuleDraft>) -> MonitorResult<Self> {
        let book = Self::new();
        for draft in drafts {
            book.create(draft)?;
        }
        Ok(book)
    }

    pub fn create(&self, draft: RuleDraft) -> MonitorResult<Rule> {
        let rule = draft.into_rule()?;

        info!(
            "Rule created: {} ({} {} {}, enabled: {})",
            rule.name, rule.field, rule.condition, rule.value, rule.is_enabled
        );
        self.rules.insert(rule.id, rule.clone());
        Ok(rule)
    }

    /// Replace a rule's definition; enablement only changes when the draft carries it
    pub fn update(&self, id: Uuid, draft: RuleDraft) -> MonitorResult<Rule> {
        draft.validate()?;

        let mut entry = self
            .rules
            .get_mut(&id)
            .ok_or_else(|| MonitorError::not_found("Rule", id))?;
        let rule = entry.value_mut();

        rule.field = RuleField::parse(&draft.field);
        rule.condition = RuleCondition::parse(&draft.condition);
        rule.name = draft.name;
        rule.value = draft.value;
        if let Some(is_enabled) = draft.is_enabled {
            rule.is_enabled = is_enabled;
        }

        info!("Rule updated: {} (enabled: {})", rule.name, rule.is_enabled);
        Ok(rule.clone())
    }

    pub fn delete(&self, id: Uuid) -> MonitorResult<Rule> {
        let (_, rule) = self
            .rules
            .remove(&id)
            .ok_or_else(|| MonitorError::not_found("Rule", id))?;

        info!("Rule deleted: {}", rule.name);
        Ok(rule)
    }

    /// Flip enablement, returning the new state
    pub fn toggle(&self, id: Uuid) -> MonitorResult<bool> {
        let mut entry = self
            .rules
            .get_mut(&id)
            .ok_or_else(|| MonitorError::not_found("Rule", id))?;
        let rule = entry.value_mut();
        rule.is_enabled = !rule.is_enabled;

        info!("Rule toggled: {} (enabled: {})", rule.name, rule.is_enabled);
        Ok(rule.is_enabled)
    }

    pub fn get(&self, id: Uuid) -> Option<Rule> {
        self.rules.get(&id).map(|entry| entry.value().clone())
    }

    /// All rules, newest first
    pub fn list(&self) -> Vec<Rule> {
        let mut rules: Vec<Rule> = self.rules.iter().map(|entry| entry.value().clone()).collect();
        rules.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.name.cmp(&b.name)));
        rules
    }

    /// Snapshot of the rules the scorer should see
    pub fn enabled(&self) -> Vec<Rule> {
        self.rules
            .iter()
            .filter(|entry| entry.is_enabled)
            .map(|entry| entry.value().clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Read a JSON array of rule drafts
    pub fn load_drafts(path: impl AsRef<Path>) -> MonitorResult<Vec<RuleDraft>> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Seed rules for a fresh installation
    pub fn default_drafts() -> Vec<RuleDraft> {
        vec![
            RuleDraft {
                name: "High Amount Transaction".to_string(),
                field: "Amount".to_string(),
                condition: "GreaterThan".to_string(),
                value: "200000".to_string(),
                is_enabled: Some(true),
            },
            RuleDraft {
                name: "New Device + Large Transfer".to_string(),
                field: "Device".to_string(),
                condition: "Equals".to_string(),
                value: "NewDevice".to_string(),
                is_enabled: Some(false),
            },
        ]
    }
}

impl Default for RuleBook {
    fn default() -> Self {
        Self::new()
    }
}
