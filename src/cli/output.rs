//! Output formatting helpers for CLI commands

use crate::routing::{RoutingDecision, RoutingRule};
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Cell, ContentArrangement, Table};
use serde_json::json;

/// Format rules as a table, numbered by priority
pub fn format_rules_table(rules: &[RoutingRule]) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["#", "ID", "Name", "Conditions", "Assign To", "Status"]);

    for (i, rule) in rules.iter().enumerate() {
        let conditions = if rule.conditions.is_empty() {
            "(always)".to_string()
        } else {
            rule.conditions
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("\nAND ")
        };
        let status = match (rule.active, rule.targets_leads()) {
            (false, _) => "Inactive".red().to_string(),
            (true, true) => "Inert (lead)".yellow().to_string(),
            (true, false) => "Active".green().to_string(),
        };

        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(&rule.id),
            Cell::new(&rule.name.en),
            Cell::new(conditions),
            Cell::new(&rule.action.assign_to),
            Cell::new(status),
        ]);
    }

    table.to_string()
}

/// Format rules as JSON
pub fn format_rules_json(rules: &[RoutingRule]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&json!({ "rules": rules }))
}

/// One-line description of a routing decision
pub fn format_decision(decision: &RoutingDecision) -> String {
    match decision {
        RoutingDecision::Rule { rule_id, assign_to } => format!(
            "{} {} (rule {})",
            "→".green(),
            assign_to.bold(),
            rule_id
        ),
        RoutingDecision::Fallback { assign_to } => format!(
            "{} {} (fallback, no rule matched)",
            "→".yellow(),
            assign_to.bold()
        ),
        RoutingDecision::Direct { assign_to } => format!(
            "{} {} (lead, routed by payload)",
            "→".cyan(),
            assign_to.bold()
        ),
    }
}
