//! Per-client and per-topic summaries

use indexmap::{IndexMap, IndexSet};
use serde::Serialize;

use crate::acl::{Access, RuleSet};
use crate::topic;

/// A topic and the access granted on it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopicAccess {
    pub topic: String,
    pub access: Access,
}

/// A client and the access it holds
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClientAccess {
    pub client: String,
    pub access: Access,
}

/// Rule counts for one client
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClientSummary {
    pub name: String,
    pub total_rules: usize,
    /// Rules granting `read` or `readwrite`
    pub read_permissions: usize,
    /// Rules granting `write` or `readwrite`
    pub write_permissions: usize,
    pub wildcard_topics: usize,
    pub exact_topics: usize,
    /// The client's rules in declaration order
    pub topics: Vec<TopicAccess>,
}

/// Who holds access to one topic string
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopicSummary {
    pub topic: String,
    /// Distinct clients with any rule on the topic
    pub client_count: usize,
    pub is_wildcard: bool,
    /// One entry per read-capable rule, so a client may repeat
    pub read_clients: Vec<String>,
    /// One entry per write-capable rule, so a client may repeat
    pub write_clients: Vec<String>,
    pub all_clients: Vec<ClientAccess>,
}

/// Summaries sorted by client name
pub fn client_summary(rule_set: &RuleSet) -> Vec<ClientSummary> {
    let mut clients: Vec<ClientSummary> = rule_set
        .iter()
        .map(|(name, rules)| {
            let wildcard_topics = rules.iter().filter(|r| r.is_wildcard()).count();

            ClientSummary {
                name: name.to_string(),
                total_rules: rules.len(),
                read_permissions: rules.iter().filter(|r| r.access().can_read()).count(),
                write_permissions: rules.iter().filter(|r| r.access().can_write()).count(),
                wildcard_topics,
                exact_topics: rules.len() - wildcard_topics,
                topics: rules
                    .iter()
                    .map(|r| TopicAccess {
                        topic: r.topic().to_string(),
                        access: r.access(),
                    })
                    .collect(),
            }
        })
        .collect();

    clients.sort_by(|a, b| a.name.cmp(&b.name));
    clients
}

/// Summaries sorted by topic string
pub fn topic_summary(rule_set: &RuleSet) -> Vec<TopicSummary> {
    let mut by_topic: IndexMap<&str, Vec<ClientAccess>> = IndexMap::new();

    for rule in rule_set.rules() {
        by_topic.entry(rule.topic()).or_default().push(ClientAccess {
            client: rule.client().to_string(),
            access: rule.access(),
        });
    }

    let mut topics: Vec<TopicSummary> = by_topic
        .into_iter()
        .map(|(name, all_clients)| {
            let client_count = all_clients
                .iter()
                .map(|c| c.client.as_str())
                .collect::<IndexSet<_>>()
                .len();
            let holders = |pred: fn(&Access) -> bool| {
                all_clients
                    .iter()
                    .filter(|c| pred(&c.access))
                    .map(|c| c.client.clone())
                    .collect::<Vec<_>>()
            };

            TopicSummary {
                topic: name.to_string(),
                client_count,
                is_wildcard: topic::is_wildcard(name),
                read_clients: holders(Access::can_read),
                write_clients: holders(Access::can_write),
                all_clients,
            }
        })
        .collect();

    topics.sort_by(|a, b| a.topic.cmp(&b.topic));
    topics
}
