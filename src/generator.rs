//! ACL text generation
//!
//! Emits a [`RuleSet`] as Mosquitto ACL text that [`AclParser`] reads back to
//! the same rules. Access tokens are always written out, so a topic that
//! happens to start with `read ` is never mistaken for one.
//!
//! [`AclParser`]: crate::acl::AclParser

use std::fmt::Write;

use thiserror::Error;
use tracing::debug;

use crate::acl::{Access, Rule, RuleSet};
use crate::config::GeneratorConfig;

/// Reasons a rule set cannot be written as ACL text
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GenerateError {
    #[error("Rule for client '{rule_client}' listed under client '{client}'")]
    ClientMismatch { client: String, rule_client: String },

    #[error("Client name must not be empty")]
    EmptyClientName,

    #[error("Client name '{name}' contains line breaks or surrounding whitespace")]
    InvalidClientName { name: String },

    #[error("Client '{client}' has a rule with an empty topic")]
    EmptyTopic { client: String },

    #[error("Client '{client}' has topic '{topic}' with line breaks or surrounding whitespace")]
    InvalidTopic { client: String, topic: String },
}

/// A value survives a write and re-parse only if it is one trimmed line
fn is_single_trimmed_line(value: &str) -> bool {
    !value.contains(['\n', '\r']) && value.trim() == value
}

/// Check that every client and rule can be written and read back unchanged
pub fn validate_generation_input(rule_set: &RuleSet) -> Result<(), GenerateError> {
    for (client, rules) in rule_set.iter() {
        if client.is_empty() {
            return Err(GenerateError::EmptyClientName);
        }
        if !is_single_trimmed_line(client) {
            return Err(GenerateError::InvalidClientName {
                name: client.to_string(),
            });
        }

        for rule in rules {
            if rule.client() != client {
                return Err(GenerateError::ClientMismatch {
                    client: client.to_string(),
                    rule_client: rule.client().to_string(),
                });
            }
            if rule.topic().is_empty() {
                return Err(GenerateError::EmptyTopic {
                    client: client.to_string(),
                });
            }
            if !is_single_trimmed_line(rule.topic()) {
                return Err(GenerateError::InvalidTopic {
                    client: client.to_string(),
                    topic: rule.topic().to_string(),
                });
            }
        }
    }

    Ok(())
}

/// ACL text generator
#[derive(Debug, Clone, Default)]
pub struct AclGenerator {
    config: GeneratorConfig,
}

impl AclGenerator {
    pub fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }

    /// The configured filter, unless unset or empty
    fn access_filter(&self) -> Option<&[Access]> {
        self.config
            .access_filter
            .as_deref()
            .filter(|allowed| !allowed.is_empty())
    }

    fn keeps(&self, access: Access) -> bool {
        self.access_filter()
            .map_or(true, |allowed| allowed.contains(&access))
    }

    /// Generate ACL text for a rule set
    pub fn generate(&self, rule_set: &RuleSet) -> Result<String, GenerateError> {
        validate_generation_input(rule_set)?;

        let mut clients: Vec<(&str, &[Rule])> = rule_set.iter().collect();
        if self.config.sort_clients {
            clients.sort_by(|a, b| a.0.cmp(b.0));
        }

        let kept: Vec<(&str, Vec<&Rule>)> = clients
            .into_iter()
            .map(|(name, rules)| {
                let rules = rules.iter().filter(|r| self.keeps(r.access())).collect();
                (name, rules)
            })
            .collect();

        let rule_total: usize = kept.iter().map(|(_, rules)| rules.len()).sum();
        let mut out = String::new();

        // Writing into a String cannot fail
        if self.config.include_comments {
            let _ = writeln!(out, "# Mosquitto ACL file");
            let _ = writeln!(out, "# Clients: {}, rules: {}", kept.len(), rule_total);
            if let Some(filter) = self.access_filter() {
                let names: Vec<&str> = filter.iter().map(Access::as_str).collect();
                let _ = writeln!(out, "# Access filter: {}", names.join(", "));
            }
            out.push('\n');
        }

        for (index, (name, rules)) in kept.iter().enumerate() {
            if index > 0 {
                out.push('\n');
            }
            if self.config.include_comments {
                let _ = writeln!(out, "# Client: {} ({} rules)", name, rules.len());
            }
            let _ = writeln!(out, "user {}", name);
            for rule in rules {
                let _ = writeln!(out, "topic {} {}", rule.access(), rule.topic());
            }
        }

        debug!(
            clients = kept.len(),
            rules = rule_total,
            bytes = out.len(),
            "Generated ACL text"
        );

        Ok(out)
    }
}
