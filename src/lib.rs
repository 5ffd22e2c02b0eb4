//! Mosquitto ACL Visualizer
//!
//! Parses Mosquitto ACL files and derives views for auditing them:
//!
//! - **Parsing**: `user` / `topic` lines into an ordered rule set
//! - **Summaries**: per-client and per-topic permission rollups
//! - **Graph**: client-topic relationships and shared topics
//! - **Hierarchy**: topic tree and client-topic access matrix
//! - **Security**: heuristic findings and a 0-100 score
//! - **Generation**: rule sets back to ACL text
//!
//! # Architecture
//!
//! [`acl::AclParser`] produces a [`RuleSet`]. An [`AclAnalyzer`] wraps one rule
//! set and computes views on demand. [`AclVisualizerService`] keeps one
//! analyzer per uploaded file and exposes upload, view, generate and export
//! operations for a hosting layer.
//!
//! # Example
//!
//! ```
//! use mosquitto_acl_visualizer::{acl, AclAnalyzer};
//!
//! let rules = acl::parse_str(
//!     "user sensor1\n\
//!      topic read sensors/+/data\n\
//!      user admin\n\
//!      topic readwrite #\n",
//! )
//! .unwrap();
//!
//! let analyzer = AclAnalyzer::new(rules);
//! let security = analyzer.security_analysis();
//! assert_eq!(security.issues.len(), 1);
//! assert_eq!(security.security_score, 80);
//! ```
//!
//! # Example Configuration
//!
//! ```json
//! {
//!   "upload": { "max-file-size": 16777216, "allowed-extensions": [".acl"] },
//!   "generator": { "sort-clients": true, "include-comments": true }
//! }
//! ```

pub mod acl;
pub mod analysis;
pub mod config;
pub mod generator;
pub mod service;
pub mod store;
pub mod topic;

// Re-export main types
pub use acl::{Access, ParseError, Rule, RuleSet};
pub use analysis::{AclAnalyzer, ViewBundle};
pub use config::VisualizerConfig;
pub use generator::{AclGenerator, GenerateError};
pub use service::{AclVisualizerService, ServiceError};
pub use store::SessionStore;
