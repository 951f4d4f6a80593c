//! Rule compilation from configuration.
//!
//! Each configured `source -> destination` entry yields two rules: one for
//! `source` itself and one for everything below it (`source/{path}`), so
//! sub-paths follow their parent. Categories are compiled in a fixed order
//! (forwards, proxies, permanent redirects, temporary redirects) and entries
//! within a category in ascending key order. With first-match evaluation
//! that order is observable, so it must not depend on map iteration luck.

use std::collections::BTreeMap;

use crate::config::schema::RewriteConfig;
use crate::rules::rule::{Action, CompiledRule, RedirectKind};
use crate::rules::RuleSet;

/// Compile configuration into an ordered rule set.
pub fn compile(config: &RewriteConfig) -> RuleSet {
    let mut rules = Vec::with_capacity(2 * config.entry_count());

    for (action, entries) in categories(config) {
        compile_category(&mut rules, action, entries);
        tracing::debug!(
            action = %action,
            entries = entries.len(),
            "Compiled rewrite category"
        );
    }

    RuleSet::new(rules)
}

fn categories(config: &RewriteConfig) -> [(Action, &BTreeMap<String, String>); 4] {
    [
        (Action::Forward, &config.forwards),
        (Action::Proxy, &config.proxies),
        (
            Action::Redirect(RedirectKind::Permanent),
            &config.permanent_redirects,
        ),
        (
            Action::Redirect(RedirectKind::Temporary),
            &config.temporary_redirects,
        ),
    ]
}

fn compile_category(
    rules: &mut Vec<CompiledRule>,
    action: Action,
    entries: &BTreeMap<String, String>,
) {
    for (source, destination) in entries {
        rules.push(CompiledRule::exact(source, action, destination));
        rules.push(CompiledRule::wildcard(source, action, destination));
    }
}
