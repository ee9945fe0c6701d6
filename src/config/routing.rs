//! Routing configuration

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::config::error::ConfigError;
use crate::locale::LocalizedText;
use crate::routing::{Condition, FallbackAssignees, Operator, RoutingRule};

/// Routing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutingConfig {
    /// Default owner of partner applications
    pub partner_relations: String,
    /// Default owner of listings, inquiries and contact messages
    pub customer_relations: String,
    /// Seed rules in priority order
    pub rules: Vec<RoutingRule>,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        let fallbacks = FallbackAssignees::default();
        Self {
            partner_relations: fallbacks.partner_relations,
            customer_relations: fallbacks.customer_relations,
            rules: default_rules(),
        }
    }
}

impl RoutingConfig {
    pub fn fallbacks(&self) -> FallbackAssignees {
        FallbackAssignees {
            partner_relations: self.partner_relations.clone(),
            customer_relations: self.customer_relations.clone(),
        }
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("routing.partner_relations", &self.partner_relations),
            ("routing.customer_relations", &self.customer_relations),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::Validation {
                    field: field.to_string(),
                    message: "fallback assignee cannot be empty".to_string(),
                });
            }
        }

        let mut seen = HashSet::new();
        for (i, rule) in self.rules.iter().enumerate() {
            if rule.id.trim().is_empty() {
                return Err(ConfigError::Validation {
                    field: format!("routing.rules[{}].id", i),
                    message: "rule id cannot be empty".to_string(),
                });
            }
            if rule.action.assign_to.trim().is_empty() {
                return Err(ConfigError::Validation {
                    field: format!("routing.rules[{}].action.assignTo", i),
                    message: "assignee cannot be empty".to_string(),
                });
            }
            if !seen.insert(rule.id.as_str()) {
                return Err(ConfigError::DuplicateId {
                    section: "routing.rules".to_string(),
                    id: rule.id.clone(),
                });
            }
        }
        Ok(())
    }
}

/// Marketplace seed rules.
///
/// The finishing and decoration rules target leads and therefore never
/// fire; leads route by their payload.
pub fn default_rules() -> Vec<RoutingRule> {
    vec![
        RoutingRule::new(
            "high-value-listings",
            LocalizedText::new("High value listings", "العقارات مرتفعة القيمة"),
            vec![
                Condition::new("type", Operator::Equals, "PROPERTY_LISTING_REQUEST"),
                Condition::new(
                    "payload.propertyDetails.price",
                    Operator::GreaterThan,
                    5_000_000,
                ),
            ],
            "listings-manager-1",
        ),
        RoutingRule::new(
            "developer-applications",
            LocalizedText::new("Developer applications", "طلبات انضمام المطورين"),
            vec![
                Condition::new("type", Operator::Equals, "PARTNER_APPLICATION"),
                Condition::new("payload.partnerType", Operator::Equals, "developer"),
            ],
            "partner-relations-manager-1",
        ),
        RoutingRule::new(
            "finishing-leads",
            LocalizedText::new("Finishing leads", "طلبات التشطيب"),
            vec![
                Condition::new("type", Operator::Equals, "LEAD"),
                Condition::new("payload.serviceType", Operator::Equals, "finishing"),
            ],
            "service-manager-1",
        ),
        RoutingRule::new(
            "decoration-leads",
            LocalizedText::new("Decoration leads", "طلبات الديكور"),
            vec![
                Condition::new("type", Operator::Equals, "LEAD"),
                Condition::new("payload.serviceType", Operator::Equals, "decoration"),
            ],
            "service-manager-1",
        ),
    ]
}
