//! Topic hierarchy tree and client-topic access matrix

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::{Serialize, Serializer};

use crate::acl::{Access, RuleSet};
use crate::topic;

/// Trie of exact topics, one level per `/` segment.
///
/// Serializes as nested objects, `a/b` becoming `{"a": {"b": {}}}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TopicTree {
    children: BTreeMap<String, TopicTree>,
}

impl TopicTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a topic, merging with any shared prefix
    pub fn insert(&mut self, path: &str) {
        let mut node = self;
        for level in topic::levels(path) {
            node = node.children.entry(level.to_string()).or_default();
        }
    }

    /// Child node for one level
    pub fn get(&self, level: &str) -> Option<&TopicTree> {
        self.children.get(level)
    }

    /// Follow a full topic path
    pub fn find(&self, path: &str) -> Option<&TopicTree> {
        topic::levels(path).try_fold(self, |node, level| node.get(level))
    }

    /// Child levels in ascending order
    pub fn levels(&self) -> impl Iterator<Item = &str> {
        self.children.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }
}

/// Build the hierarchy from exact topics only; wildcard topics are skipped
pub fn build_hierarchy(rule_set: &RuleSet) -> TopicTree {
    let mut tree = TopicTree::new();
    for rule in rule_set.rules().filter(|r| !r.is_wildcard()) {
        tree.insert(rule.topic());
    }
    tree
}

/// One matrix cell: the client's access on the topic, or none
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatrixCell {
    Granted(Access),
    None,
}

impl MatrixCell {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Granted(access) => access.as_str(),
            Self::None => "none",
        }
    }
}

impl Serialize for MatrixCell {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Clients as rows, topics as columns, both sorted ascending
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AccessMatrix {
    pub clients: Vec<String>,
    pub topics: Vec<String>,
    pub matrix: Vec<Vec<MatrixCell>>,
}

impl AccessMatrix {
    /// Cell lookup by name
    pub fn cell(&self, client: &str, topic: &str) -> Option<MatrixCell> {
        let row = self.clients.iter().position(|c| c == client)?;
        let col = self.topics.iter().position(|t| t == topic)?;
        Some(self.matrix[row][col])
    }
}

/// Build the access matrix.
///
/// When a client has several rules on one topic, the last one wins.
pub fn build_matrix(rule_set: &RuleSet) -> AccessMatrix {
    let topics: Vec<String> = rule_set
        .rules()
        .map(|r| r.topic())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect();

    let mut clients: Vec<String> = rule_set.client_names().map(str::to_string).collect();
    clients.sort();

    let matrix: Vec<Vec<MatrixCell>> = clients
        .iter()
        .map(|client| {
            let granted: HashMap<&str, Access> = rule_set
                .get(client)
                .unwrap_or_default()
                .iter()
                .map(|r| (r.topic(), r.access()))
                .collect();

            topics
                .iter()
                .map(|t| {
                    granted
                        .get(t.as_str())
                        .map_or(MatrixCell::None, |a| MatrixCell::Granted(*a))
                })
                .collect::<Vec<_>>()
        })
        .collect();

    AccessMatrix {
        clients,
        topics,
        matrix,
    }
}
