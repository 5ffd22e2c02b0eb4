//! Access Control List (ACL) module
//!
//! Parses Mosquitto ACL text into a [`RuleSet`] and flags risky grants.

mod error;
mod parser;
mod rules;
mod validate;

pub use error::ParseError;
pub use parser::{parse_file, parse_str, AclParser};
pub use rules::{Access, Rule, RuleSet};
pub use validate::validate_rules;
