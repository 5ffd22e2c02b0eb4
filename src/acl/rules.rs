//! ACL rule types

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::error::ParseError;
use crate::topic;

/// Permission granted by a `topic` line
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Access {
    Read,
    Write,
    /// Granted when a `topic` line omits the access token
    #[default]
    ReadWrite,
}

impl Access {
    /// All access values in declaration order
    pub const ALL: [Access; 3] = [Access::Read, Access::Write, Access::ReadWrite];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Write => "write",
            Self::ReadWrite => "readwrite",
        }
    }

    /// `read` or `readwrite`
    pub fn can_read(&self) -> bool {
        matches!(self, Self::Read | Self::ReadWrite)
    }

    /// `write` or `readwrite`
    pub fn can_write(&self) -> bool {
        matches!(self, Self::Write | Self::ReadWrite)
    }
}

impl fmt::Display for Access {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Access {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "read" => Ok(Self::Read),
            "write" => Ok(Self::Write),
            "readwrite" => Ok(Self::ReadWrite),
            other => Err(ParseError::InvalidAccessToken {
                token: other.to_string(),
            }),
        }
    }
}

/// A single permission: one client, one access level, one topic
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rule {
    client: String,
    access: Access,
    topic: String,
}

impl Rule {
    pub fn new(client: impl Into<String>, access: Access, topic: impl Into<String>) -> Self {
        Self {
            client: client.into(),
            access,
            topic: topic.into(),
        }
    }

    /// Build a rule from a raw access token
    pub fn from_tokens(
        client: impl Into<String>,
        access: &str,
        topic: impl Into<String>,
    ) -> Result<Self, ParseError> {
        Ok(Self::new(client, access.parse()?, topic))
    }

    pub fn client(&self) -> &str {
        &self.client
    }

    pub fn access(&self) -> Access {
        self.access
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn is_wildcard(&self) -> bool {
        topic::is_wildcard(&self.topic)
    }
}

/// Parsed ACL document: client name to rules, both in declaration order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleSet {
    clients: IndexMap<String, Vec<Rule>>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a client. Redeclaring an existing client keeps its rules.
    pub fn declare_client(&mut self, name: &str) {
        if !self.clients.contains_key(name) {
            self.clients.insert(name.to_string(), Vec::new());
        }
    }

    /// Append a rule to its client's sequence, declaring the client if needed
    pub fn push(&mut self, rule: Rule) {
        match self.clients.get_mut(rule.client()) {
            Some(rules) => rules.push(rule),
            None => {
                self.clients.insert(rule.client.clone(), vec![rule]);
            }
        }
    }

    /// Rules for a client, if declared
    pub fn get(&self, client: &str) -> Option<&[Rule]> {
        self.clients.get(client).map(Vec::as_slice)
    }

    pub fn contains_client(&self, client: &str) -> bool {
        self.clients.contains_key(client)
    }

    /// Clients with their rules, in declaration order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Rule])> {
        self.clients
            .iter()
            .map(|(name, rules)| (name.as_str(), rules.as_slice()))
    }

    /// Client names in declaration order
    pub fn client_names(&self) -> impl Iterator<Item = &str> {
        self.clients.keys().map(String::as_str)
    }

    /// Every rule, client by client
    pub fn rules(&self) -> impl Iterator<Item = &Rule> {
        self.clients.values().flatten()
    }

    pub fn client_count(&self) -> usize {
        self.clients.len()
    }

    pub fn rule_count(&self) -> usize {
        self.clients.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}

impl FromIterator<Rule> for RuleSet {
    fn from_iter<I: IntoIterator<Item = Rule>>(iter: I) -> Self {
        let mut set = Self::new();
        for rule in iter {
            set.push(rule);
        }
        set
    }
}
