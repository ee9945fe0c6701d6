//! Rules command implementation

use crate::cli::output::{format_decision, format_rules_json, format_rules_table};
use crate::cli::{load_config, RulesCheckArgs, RulesListArgs};
use crate::notify::LogSink;
use crate::routing::Dispatcher;
use crate::store::{RequestStore, RequesterInfo};
use serde_json::Value;
use std::sync::Arc;

/// Handle `triage rules list`
pub fn handle_rules_list(args: &RulesListArgs) -> Result<String, Box<dyn std::error::Error>> {
    let config = load_config(&args.config)?;
    let store = config.rule_store()?;
    let rules = if args.active {
        store.list_active()
    } else {
        store.list()
    };

    if args.json {
        Ok(format_rules_json(&rules)?)
    } else {
        Ok(format_rules_table(&rules))
    }
}

/// Handle `triage rules check`
///
/// Evaluates the configured rules against the given request without
/// persisting anything or sending notifications.
pub fn handle_rules_check(args: &RulesCheckArgs) -> Result<String, Box<dyn std::error::Error>> {
    let config = load_config(&args.config)?;
    let payload: Value = serde_json::from_str(&args.payload)
        .map_err(|e| format!("Invalid --payload JSON: {}", e))?;

    let store = Arc::new(RequestStore::new(
        Arc::new(config.directory()),
        Arc::new(LogSink),
    ));
    let dispatcher = Dispatcher::new(
        Arc::new(config.rule_store()?),
        config.routing.fallbacks(),
        store,
    );

    let decision = dispatcher.preview(
        args.request_type,
        RequesterInfo::new(args.name.clone(), args.phone.clone()),
        payload,
    )?;

    if args.json {
        Ok(serde_json::to_string_pretty(&decision)?)
    } else {
        Ok(format_decision(&decision))
    }
}
