//! Ordered routing rule storage.
//!
//! Rules are kept in insertion order and that order is their priority.
//! There is no priority field; the admin collaborator reorders explicitly
//! with [`RuleStore::move_to`].

use super::condition::{evaluate, Condition, Operator};
use super::error::RuleError;
use crate::locale::LocalizedText;
use crate::store::RequestType;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// What a matching rule does.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleAction {
    /// Partner or internal user id that receives the request
    pub assign_to: String,
}

/// A routing rule: all conditions AND-ed together, one assignee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutingRule {
    pub id: String,
    #[serde(default)]
    pub name: LocalizedText,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default)]
    pub conditions: Vec<Condition>,
    pub action: RuleAction,
}

fn default_active() -> bool {
    true
}

impl RoutingRule {
    /// Create an active rule.
    pub fn new(
        id: impl Into<String>,
        name: LocalizedText,
        conditions: Vec<Condition>,
        assign_to: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name,
            active: true,
            conditions,
            action: RuleAction {
                assign_to: assign_to.into(),
            },
        }
    }

    /// True when every condition holds. A rule with no conditions is a catch-all.
    pub fn matches(&self, request: &Value) -> bool {
        self.conditions.iter().all(|c| evaluate(request, c))
    }

    /// True when the rule pins `type == LEAD`.
    ///
    /// Leads are routed by their explicit partner/manager ids and never
    /// reach the rule engine, so such rules can never fire.
    pub fn targets_leads(&self) -> bool {
        self.conditions.iter().any(|c| {
            c.field == "type"
                && c.operator == Operator::Equals
                && c.value.as_str() == Some(RequestType::Lead.as_str())
        })
    }
}

/// Read access to the ordered active rule set, as consumed by the dispatcher.
pub trait RuleSource: Send + Sync {
    /// Active rules in priority order.
    fn active_rules(&self) -> Result<Vec<RoutingRule>, RuleError>;
}

/// In-memory ordered rule store.
#[derive(Debug, Default)]
pub struct RuleStore {
    rules: RwLock<Vec<RoutingRule>>,
}

impl RuleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from an ordered list, rejecting duplicate ids.
    pub fn with_rules(rules: Vec<RoutingRule>) -> Result<Self, RuleError> {
        let store = Self::new();
        for rule in rules {
            store.add(rule)?;
        }
        Ok(store)
    }

    fn read(&self) -> RwLockReadGuard<'_, Vec<RoutingRule>> {
        self.rules.read().unwrap_or_else(|poisoned| {
            tracing::warn!("Rule store lock poisoned, recovering");
            poisoned.into_inner()
        })
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<RoutingRule>> {
        self.rules.write().unwrap_or_else(|poisoned| {
            tracing::warn!("Rule store lock poisoned, recovering");
            poisoned.into_inner()
        })
    }

    /// All rules, active or not, in store order.
    pub fn list(&self) -> Vec<RoutingRule> {
        self.read().clone()
    }

    /// Active rules in store order.
    pub fn list_active(&self) -> Vec<RoutingRule> {
        self.read().iter().filter(|r| r.active).cloned().collect()
    }

    pub fn get(&self, id: &str) -> Option<RoutingRule> {
        self.read().iter().find(|r| r.id == id).cloned()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Append a rule at the lowest priority.
    pub fn add(&self, rule: RoutingRule) -> Result<(), RuleError> {
        let mut rules = self.write();
        if rules.iter().any(|r| r.id == rule.id) {
            return Err(RuleError::DuplicateRule(rule.id));
        }
        if rule.targets_leads() {
            tracing::warn!(
                rule_id = %rule.id,
                "Rule targets LEAD requests; leads are routed by partner/manager id and this rule will never fire"
            );
        }
        rules.push(rule);
        Ok(())
    }

    /// Replace a rule's content in place. Position is preserved.
    ///
    /// The stored id is kept even if `rule.id` differs.
    pub fn update(&self, id: &str, mut rule: RoutingRule) -> Result<RoutingRule, RuleError> {
        let mut rules = self.write();
        let slot = rules
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| RuleError::RuleNotFound(id.to_string()))?;
        rule.id = slot.id.clone();
        *slot = rule.clone();
        Ok(rule)
    }

    pub fn remove(&self, id: &str) -> Result<RoutingRule, RuleError> {
        let mut rules = self.write();
        let index = rules
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| RuleError::RuleNotFound(id.to_string()))?;
        Ok(rules.remove(index))
    }

    /// Move a rule to `index`, shifting the others.
    pub fn move_to(&self, id: &str, index: usize) -> Result<(), RuleError> {
        let mut rules = self.write();
        let len = rules.len();
        let from = rules
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| RuleError::RuleNotFound(id.to_string()))?;
        if index >= len {
            return Err(RuleError::IndexOutOfRange { index, len });
        }
        let rule = rules.remove(from);
        rules.insert(index, rule);
        Ok(())
    }
}

impl RuleSource for RuleStore {
    fn active_rules(&self) -> Result<Vec<RoutingRule>, RuleError> {
        Ok(self.list_active())
    }
}
