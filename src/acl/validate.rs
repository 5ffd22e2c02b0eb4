//! Advisory ACL validation

use super::rules::RuleSet;
use crate::topic;

/// Check a rule set for risky grants.
///
/// Produces one warning per client with no rules, per `#` rule with write
/// access, and per `+` rule with write access, in client then rule order.
/// Never fails.
pub fn validate_rules(rule_set: &RuleSet) -> Vec<String> {
    let mut warnings = Vec::new();

    for (client, rules) in rule_set.iter() {
        if rules.is_empty() {
            warnings.push(format!("Client '{}' has no ACL rules", client));
            continue;
        }

        for rule in rules {
            if !rule.access().can_write() {
                continue;
            }

            if topic::is_match_all(rule.topic()) {
                warnings.push(format!(
                    "Client '{}' has write access to all topics (#) - security risk",
                    client
                ));
            }

            if topic::has_single_level_wildcard(rule.topic()) {
                warnings.push(format!(
                    "Client '{}' has write access to wildcard topic '{}'",
                    client,
                    rule.topic()
                ));
            }
        }
    }

    warnings
}
