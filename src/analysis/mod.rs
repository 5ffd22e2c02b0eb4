//! ACL analysis engine
//!
//! Derives audit and visualization views from a parsed [`RuleSet`]. Every view
//! is a pure function of the rule set. The hierarchy and matrix views are
//! built at most once per analyzer and shared afterwards.

mod graph;
mod hierarchy;
mod security;
mod stats;
mod summary;

pub use graph::{
    client_node_id, overlaps, relationships, topic_node_id, GraphEdge, GraphNode,
    RelationshipGraph, TopicOverlap,
};
pub use hierarchy::{build_hierarchy, build_matrix, AccessMatrix, MatrixCell, TopicTree};
pub use security::{
    security_analysis, security_score, SecurityAnalysis, SecurityFinding, Severity,
    RECOMMEND_GROUP_CLIENTS, RECOMMEND_LEAST_PRIVILEGE, RECOMMEND_RESTRICT_WILDCARDS,
};
pub use stats::{statistics, Statistics, TopicCount};
pub use summary::{
    client_summary, topic_summary, ClientAccess, ClientSummary, TopicAccess, TopicSummary,
};

use std::sync::Arc;

use once_cell::sync::OnceCell;
use serde::Serialize;
use tracing::debug;

use crate::acl::{validate_rules, RuleSet};

/// All eight views, keyed as the visualization front end expects
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewBundle {
    pub clients: Vec<ClientSummary>,
    pub topics: Vec<TopicSummary>,
    pub relationships: RelationshipGraph,
    pub overlaps: Vec<TopicOverlap>,
    pub hierarchy: TopicTree,
    pub matrix: AccessMatrix,
    pub security_analysis: SecurityAnalysis,
    pub statistics: Statistics,
}

/// Analyzer over one immutable rule set
#[derive(Debug)]
pub struct AclAnalyzer {
    rule_set: Arc<RuleSet>,
    hierarchy: OnceCell<TopicTree>,
    matrix: OnceCell<AccessMatrix>,
}

impl AclAnalyzer {
    pub fn new(rule_set: impl Into<Arc<RuleSet>>) -> Self {
        Self {
            rule_set: rule_set.into(),
            hierarchy: OnceCell::new(),
            matrix: OnceCell::new(),
        }
    }

    pub fn rule_set(&self) -> &RuleSet {
        &self.rule_set
    }

    pub fn client_summary(&self) -> Vec<ClientSummary> {
        client_summary(&self.rule_set)
    }

    pub fn topic_summary(&self) -> Vec<TopicSummary> {
        topic_summary(&self.rule_set)
    }

    pub fn relationships(&self) -> RelationshipGraph {
        relationships(&self.rule_set)
    }

    pub fn overlaps(&self) -> Vec<TopicOverlap> {
        overlaps(&self.rule_set)
    }

    /// Topic hierarchy, built on first use
    pub fn hierarchy(&self) -> &TopicTree {
        self.hierarchy.get_or_init(|| {
            debug!("Building topic hierarchy");
            build_hierarchy(&self.rule_set)
        })
    }

    /// Client-topic matrix, built on first use
    pub fn matrix(&self) -> &AccessMatrix {
        self.matrix.get_or_init(|| {
            debug!("Building client-topic matrix");
            build_matrix(&self.rule_set)
        })
    }

    pub fn security_analysis(&self) -> SecurityAnalysis {
        security_analysis(&self.rule_set)
    }

    pub fn statistics(&self) -> Statistics {
        statistics(&self.rule_set)
    }

    /// Advisory warnings from the standalone validator
    pub fn validate(&self) -> Vec<String> {
        validate_rules(&self.rule_set)
    }

    pub fn bundle(&self) -> ViewBundle {
        let bundle = ViewBundle {
            clients: self.client_summary(),
            topics: self.topic_summary(),
            relationships: self.relationships(),
            overlaps: self.overlaps(),
            hierarchy: self.hierarchy().clone(),
            matrix: self.matrix().clone(),
            security_analysis: self.security_analysis(),
            statistics: self.statistics(),
        };

        debug!(
            clients = bundle.statistics.total_clients,
            rules = bundle.statistics.total_rules,
            score = bundle.security_analysis.security_score,
            "Generated visualization data"
        );

        bundle
    }
}

impl From<RuleSet> for AclAnalyzer {
    fn from(rule_set: RuleSet) -> Self {
        Self::new(rule_set)
    }
}
