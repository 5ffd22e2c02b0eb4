//! Aggregate ACL statistics

use indexmap::IndexMap;
use serde::Serialize;

use crate::acl::{Access, RuleSet};
use crate::topic::TopicKind;

const MOST_COMMON_LIMIT: usize = 5;

/// Occurrence count for one topic string
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopicCount {
    pub topic: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Statistics {
    pub total_clients: usize,
    pub total_rules: usize,
    /// Rounded to two decimals, 0 when there are no clients
    pub avg_rules_per_client: f64,
    /// Rules per access value, keys in first-seen order
    pub access_distribution: IndexMap<Access, usize>,
    /// Rules per topic kind, keys in first-seen order
    pub topic_distribution: IndexMap<TopicKind, usize>,
    pub most_common_topics: Vec<TopicCount>,
}

/// Two decimals, exact halves to even
fn round2(value: f64) -> f64 {
    let scaled = value * 100.0;
    let rounded = if scaled.fract().abs() == 0.5 {
        scaled.round_ties_even()
    } else {
        scaled.round()
    };
    rounded / 100.0
}

pub fn statistics(rule_set: &RuleSet) -> Statistics {
    let total_clients = rule_set.client_count();
    let total_rules = rule_set.rule_count();

    let mut access_distribution = IndexMap::new();
    let mut topic_distribution = IndexMap::new();
    let mut occurrences: IndexMap<&str, usize> = IndexMap::new();

    for rule in rule_set.rules() {
        *access_distribution.entry(rule.access()).or_insert(0) += 1;
        *topic_distribution.entry(TopicKind::of(rule.topic())).or_insert(0) += 1;
        *occurrences.entry(rule.topic()).or_insert(0) += 1;
    }

    let mut ranked: Vec<(&str, usize)> = occurrences.into_iter().collect();
    // Stable, so equal counts keep first-seen order
    ranked.sort_by(|a, b| b.1.cmp(&a.1));

    let avg_rules_per_client = if total_clients > 0 {
        round2(total_rules as f64 / total_clients as f64)
    } else {
        0.0
    };

    Statistics {
        total_clients,
        total_rules,
        avg_rules_per_client,
        access_distribution,
        topic_distribution,
        most_common_topics: ranked
            .into_iter()
            .take(MOST_COMMON_LIMIT)
            .map(|(topic, count)| TopicCount {
                topic: topic.to_string(),
                count,
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::acl::parse_str;

    #[test]
    fn test_empty() {
        let stats = statistics(&RuleSet::new());
        assert_eq!(stats.total_clients, 0);
        assert_eq!(stats.total_rules, 0);
        assert_eq!(stats.avg_rules_per_client, 0.0);
        assert!(stats.access_distribution.is_empty());
        assert!(stats.most_common_topics.is_empty());
    }

    #[test]
    fn test_counts_and_average() {
        let set = parse_str(
            "user a\ntopic read x/+\ntopic write y\ntopic y\nuser b\ntopic read y\nuser c\n",
        )
        .unwrap();
        let stats = statistics(&set);

        assert_eq!(stats.total_clients, 3);
        assert_eq!(stats.total_rules, 4);
        assert_eq!(stats.avg_rules_per_client, 1.33);

        let access: Vec<_> = stats.access_distribution.iter().map(|(a, n)| (*a, *n)).collect();
        assert_eq!(
            access,
            vec![(Access::Read, 2), (Access::Write, 1), (Access::ReadWrite, 1)]
        );
        assert_eq!(stats.topic_distribution[&TopicKind::Wildcard], 1);
        assert_eq!(stats.topic_distribution[&TopicKind::Exact], 3);
    }

    #[test]
    fn test_average_halves_round_to_even() {
        let mut content = String::from("user c0\ntopic read t\n");
        for i in 1..8 {
            content.push_str(&format!("user c{}\n", i));
        }
        let stats = statistics(&parse_str(&content).unwrap());
        assert_eq!(stats.total_clients, 8);
        assert_eq!(stats.avg_rules_per_client, 0.12);

        let mut content = String::new();
        for i in 0..8 {
            content.push_str(&format!("user c{}\n", i));
            if i < 5 {
                content.push_str("topic read t\n");
            }
        }
        assert_eq!(statistics(&parse_str(&content).unwrap()).avg_rules_per_client, 0.62);

        assert_eq!(round2(0.375), 0.38);
        assert_eq!(round2(2.0 / 3.0), 0.67);
    }

    #[test]
    fn test_most_common_ties_keep_first_seen() {
        let set = parse_str(
            "user a\ntopic read f\ntopic read e\ntopic read d\n\
             topic read c\ntopic read b\ntopic read a\ntopic read c\n",
        )
        .unwrap();
        let stats = statistics(&set);

        let ranked: Vec<_> = stats
            .most_common_topics
            .iter()
            .map(|t| (t.topic.as_str(), t.count))
            .collect();
        assert_eq!(ranked, vec![("c", 2), ("f", 1), ("e", 1), ("d", 1), ("b", 1)]);
    }

    #[test]
    fn test_json_shape() {
        let set = parse_str("user a\ntopic write t/#\ntopic read t\n").unwrap();
        let value = serde_json::to_value(statistics(&set)).unwrap();

        assert_eq!(
            value,
            serde_json::json!({
                "total_clients": 1,
                "total_rules": 2,
                "avg_rules_per_client": 2.0,
                "access_distribution": {"write": 1, "read": 1},
                "topic_distribution": {"wildcard": 1, "exact": 1},
                "most_common_topics": [
                    {"topic": "t/#", "count": 1},
                    {"topic": "t", "count": 1}
                ]
            })
        );
    }
}
