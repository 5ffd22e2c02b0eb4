//! Client-topic relationship graph and topic overlaps

use indexmap::{IndexMap, IndexSet};
use serde::Serialize;

use crate::acl::{Access, RuleSet};
use crate::topic;

const CLIENT_NODE_PREFIX: &str = "client_";
const TOPIC_NODE_PREFIX: &str = "topic_";

/// Graph node, tagged by `type`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GraphNode {
    Client {
        id: String,
        label: String,
        /// Number of rules the client holds
        size: usize,
    },
    Topic {
        id: String,
        label: String,
        is_wildcard: bool,
    },
}

impl GraphNode {
    pub fn id(&self) -> &str {
        match self {
            Self::Client { id, .. } | Self::Topic { id, .. } => id,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::Client { label, .. } | Self::Topic { label, .. } => label,
        }
    }
}

/// One edge per rule, client to topic
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphEdge {
    pub source: String,
    pub target: String,
    pub access: Access,
    pub label: Access,
}

/// Bipartite client-topic graph
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RelationshipGraph {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

/// A topic reachable by more than one client
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopicOverlap {
    pub topic: String,
    /// Distinct clients, first-seen order
    pub clients: Vec<String>,
    pub client_count: usize,
    pub is_wildcard: bool,
}

pub fn client_node_id(client: &str) -> String {
    format!("{}{}", CLIENT_NODE_PREFIX, client)
}

pub fn topic_node_id(topic: &str) -> String {
    format!("{}{}", TOPIC_NODE_PREFIX, topic)
}

/// Build the relationship graph.
///
/// Client nodes come first, then topic nodes in first-encountered order.
/// Parallel edges are kept: two rules on the same topic give two edges.
pub fn relationships(rule_set: &RuleSet) -> RelationshipGraph {
    let mut graph = RelationshipGraph::default();

    for (client, rules) in rule_set.iter() {
        graph.nodes.push(GraphNode::Client {
            id: client_node_id(client),
            label: client.to_string(),
            size: rules.len(),
        });
    }

    let mut seen: IndexSet<&str> = IndexSet::new();
    for rule in rule_set.rules() {
        let target = topic_node_id(rule.topic());

        if seen.insert(rule.topic()) {
            graph.nodes.push(GraphNode::Topic {
                id: target.clone(),
                label: rule.topic().to_string(),
                is_wildcard: rule.is_wildcard(),
            });
        }

        graph.edges.push(GraphEdge {
            source: client_node_id(rule.client()),
            target,
            access: rule.access(),
            label: rule.access(),
        });
    }

    graph
}

/// Topics shared by more than one distinct client, most shared first.
///
/// Ties keep first-encountered topic order.
pub fn overlaps(rule_set: &RuleSet) -> Vec<TopicOverlap> {
    let mut by_topic: IndexMap<&str, IndexSet<&str>> = IndexMap::new();
    for rule in rule_set.rules() {
        by_topic.entry(rule.topic()).or_default().insert(rule.client());
    }

    let mut shared: Vec<TopicOverlap> = by_topic
        .into_iter()
        .filter(|(_, clients)| clients.len() > 1)
        .map(|(name, clients)| TopicOverlap {
            topic: name.to_string(),
            client_count: clients.len(),
            clients: clients.into_iter().map(str::to_string).collect(),
            is_wildcard: topic::is_wildcard(name),
        })
        .collect();

    // sort_by is stable
    shared.sort_by(|a, b| b.client_count.cmp(&a.client_count));
    shared
}
