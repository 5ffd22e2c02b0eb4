//! Heuristic security review of an ACL

use indexmap::{IndexMap, IndexSet};
use serde::Serialize;

use crate::acl::RuleSet;
use crate::topic;

const ISSUE_PENALTY: u64 = 20;
const WARNING_PENALTY: u64 = 5;
const MAX_SCORE: u64 = 100;
const LARGE_ACL_RULES: usize = 100;

pub const RECOMMEND_RESTRICT_WILDCARDS: &str =
    "Review and restrict overly permissive wildcard permissions";
pub const RECOMMEND_LEAST_PRIVILEGE: &str =
    "Consider implementing least-privilege access controls";
pub const RECOMMEND_GROUP_CLIENTS: &str =
    "Large ACL files can be difficult to maintain - consider grouping similar clients";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Medium,
    High,
}

/// A single issue or warning
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SecurityFinding {
    pub level: Severity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    pub issue: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SecurityAnalysis {
    /// High severity findings
    pub issues: Vec<SecurityFinding>,
    /// Medium severity findings
    pub warnings: Vec<SecurityFinding>,
    pub recommendations: Vec<String>,
    /// 0 to 100, higher is better
    pub security_score: u32,
}

/// `100 - 20 per issue - 5 per warning`, floored at zero
pub fn security_score(issues: usize, warnings: usize) -> u32 {
    let penalty = ISSUE_PENALTY
        .saturating_mul(issues as u64)
        .saturating_add(WARNING_PENALTY.saturating_mul(warnings as u64));
    MAX_SCORE.saturating_sub(penalty) as u32
}

pub fn security_analysis(rule_set: &RuleSet) -> SecurityAnalysis {
    let mut issues = Vec::new();
    let mut warnings = Vec::new();

    for rule in rule_set.rules() {
        let access = rule.access();
        if !access.can_write() {
            continue;
        }

        if topic::is_match_all(rule.topic()) {
            issues.push(SecurityFinding {
                level: Severity::High,
                client: Some(rule.client().to_string()),
                topic: None,
                issue: "Write access to all topics (#)".to_string(),
                description: format!(
                    "Client '{}' has {} access to all topics",
                    rule.client(),
                    access
                ),
            });
        }

        if topic::has_single_level_wildcard(rule.topic()) {
            warnings.push(SecurityFinding {
                level: Severity::Medium,
                client: Some(rule.client().to_string()),
                topic: None,
                issue: "Write access to wildcard topics".to_string(),
                description: format!(
                    "Client '{}' has {} access to '{}'",
                    rule.client(),
                    access,
                    rule.topic()
                ),
            });
        }
    }

    // Grouped by literal topic string, independent of the wildcard checks
    let mut writers: IndexMap<&str, IndexSet<&str>> = IndexMap::new();
    for rule in rule_set.rules().filter(|r| r.access().can_write()) {
        writers.entry(rule.topic()).or_default().insert(rule.client());
    }

    for (name, clients) in writers.iter().filter(|(_, c)| c.len() > 1) {
        let listed: Vec<&str> = clients.iter().copied().collect();
        warnings.push(SecurityFinding {
            level: Severity::Medium,
            client: None,
            topic: Some(name.to_string()),
            issue: "Multiple writers to same topic".to_string(),
            description: format!(
                "Multiple clients can write to '{}': {}",
                name,
                listed.join(", ")
            ),
        });
    }

    let mut recommendations = Vec::new();
    if issues.iter().any(|i| i.level == Severity::High) {
        recommendations.push(RECOMMEND_RESTRICT_WILDCARDS.to_string());
    }
    if !warnings.is_empty() {
        recommendations.push(RECOMMEND_LEAST_PRIVILEGE.to_string());
    }
    if rule_set.rule_count() > LARGE_ACL_RULES {
        recommendations.push(RECOMMEND_GROUP_CLIENTS.to_string());
    }

    SecurityAnalysis {
        security_score: security_score(issues.len(), warnings.len()),
        issues,
        warnings,
        recommendations,
    }
}
