//! Mosquitto ACL text parsing
//!
//! The format is line oriented. Each line is trimmed, then classified:
//!
//! ```text
//! # comment
//! user <client name>
//! topic [read|write|readwrite] <topic>
//! ```
//!
//! A `topic` line without an access token grants `readwrite`. Parsing stops at
//! the first line that fits none of these forms.

use std::path::Path;

use tracing::{debug, warn};

use super::error::ParseError;
use super::rules::{Access, Rule, RuleSet};

const USER_KEYWORD: &str = "user";
const TOPIC_KEYWORD: &str = "topic";
const COMMENT_PREFIX: char = '#';

/// One recognised line of ACL text
#[derive(Debug, Clone, PartialEq, Eq)]
enum Line<'a> {
    Skip,
    User(&'a str),
    Topic { access: Access, topic: &'a str },
    Invalid,
}

/// Split off the first whitespace-delimited word.
///
/// Returns `None` when the input holds a single word. The remainder has its
/// leading whitespace removed.
fn split_word(text: &str) -> Option<(&str, &str)> {
    let end = text.find(char::is_whitespace)?;
    Some((&text[..end], text[end..].trim_start()))
}

fn classify(line: &str) -> Line<'_> {
    if line.is_empty() || line.starts_with(COMMENT_PREFIX) {
        return Line::Skip;
    }

    let Some((keyword, rest)) = split_word(line) else {
        return Line::Invalid;
    };

    match keyword {
        USER_KEYWORD => Line::User(rest.trim()),
        TOPIC_KEYWORD => {
            // The access token only counts when a topic follows it;
            // `topic read` alone names a topic called "read".
            let explicit = split_word(rest)
                .and_then(|(token, topic)| token.parse::<Access>().ok().map(|a| (a, topic)));

            match explicit {
                Some((access, topic)) => Line::Topic {
                    access,
                    topic: topic.trim(),
                },
                None => Line::Topic {
                    access: Access::default(),
                    topic: rest.trim(),
                },
            }
        }
        _ => Line::Invalid,
    }
}

/// Stateful ACL parser
///
/// Tracks the client named by the most recent `user` line and the current
/// 1-based line number.
#[derive(Debug, Default)]
pub struct AclParser {
    current_client: Option<String>,
    line_number: usize,
}

impl AclParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a sequence of lines into a rule set
    pub fn parse_lines<I, S>(&mut self, lines: I) -> Result<RuleSet, ParseError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut rule_set = RuleSet::new();
        self.current_client = None;
        self.line_number = 0;

        for raw in lines {
            self.line_number += 1;
            let line = raw.as_ref().trim();

            match classify(line) {
                Line::Skip => {}
                Line::User(name) => {
                    rule_set.declare_client(name);
                    self.current_client = Some(name.to_string());
                }
                Line::Topic { access, topic } => {
                    let Some(client) = self.current_client.as_deref() else {
                        warn!(line = self.line_number, "Topic rule without user context");
                        return Err(ParseError::TopicWithoutUser {
                            line: self.line_number,
                            text: line.to_string(),
                        });
                    };
                    rule_set.push(Rule::new(client, access, topic));
                }
                Line::Invalid => {
                    warn!(line = self.line_number, "Invalid ACL syntax");
                    return Err(ParseError::InvalidSyntax {
                        line: self.line_number,
                        text: line.to_string(),
                    });
                }
            }
        }

        debug!(
            lines = self.line_number,
            clients = rule_set.client_count(),
            rules = rule_set.rule_count(),
            "Parsed ACL"
        );

        Ok(rule_set)
    }

    /// Parse ACL content held in a string
    pub fn parse_str(&mut self, content: &str) -> Result<RuleSet, ParseError> {
        self.parse_lines(content.lines())
    }

    /// Parse raw bytes, which must be UTF-8
    ///
    /// `origin` names the source in decode errors.
    pub fn parse_bytes(&mut self, origin: &str, bytes: &[u8]) -> Result<RuleSet, ParseError> {
        let content = std::str::from_utf8(bytes).map_err(|e| ParseError::Decode {
            path: origin.to_string(),
            reason: e.to_string(),
        })?;
        self.parse_str(content)
    }

    /// Read and parse an ACL file
    pub fn parse_file(&mut self, path: impl AsRef<Path>) -> Result<RuleSet, ParseError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ParseError::FileNotFound {
                path: path.to_path_buf(),
            },
            _ => ParseError::Io {
                path: path.to_path_buf(),
                source: e,
            },
        })?;
        self.parse_bytes(&path.display().to_string(), &bytes)
    }
}

/// Parse ACL content held in a string
pub fn parse_str(content: &str) -> Result<RuleSet, ParseError> {
    AclParser::new().parse_str(content)
}

/// Read and parse an ACL file
pub fn parse_file(path: impl AsRef<Path>) -> Result<RuleSet, ParseError> {
    AclParser::new().parse_file(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn pairs(set: &RuleSet, client: &str) -> Vec<(String, Access)> {
        set.get(client)
            .unwrap()
            .iter()
            .map(|r| (r.topic().to_string(), r.access()))
            .collect()
    }

    #[test]
    fn test_parse_well_formed_acl() {
        let content = r#"
# Sample ACL file
user device001
topic read sensors/temperature/+
topic write actuators/device001/+

user device002
topic read sensors/humidity/+
topic readwrite actuators/device002/+

user admin
topic readwrite #
"#;

        let set = parse_str(content).unwrap();
        assert_eq!(set.client_count(), 3);
        assert_eq!(
            set.client_names().collect::<Vec<_>>(),
            vec!["device001", "device002", "admin"]
        );

        assert_eq!(
            pairs(&set, "device001"),
            vec![
                ("sensors/temperature/+".to_string(), Access::Read),
                ("actuators/device001/+".to_string(), Access::Write),
            ]
        );
        assert_eq!(pairs(&set, "admin"), vec![("#".to_string(), Access::ReadWrite)]);
        assert!(set.rules().all(|r| set.get(r.client()).is_some()));
    }

    #[test]
    fn test_comments_and_blank_lines() {
        let content = "\n# This is a comment\n   # indented comment\n\nuser testuser\n\
                       # between\ntopic read test/topic\n\n\t\n";
        let set = parse_str(content).unwrap();
        assert_eq!(set.client_count(), 1);
        assert_eq!(pairs(&set, "testuser"), vec![("test/topic".to_string(), Access::Read)]);
    }

    #[test]
    fn test_default_access() {
        let set = parse_str("user testuser\ntopic default/topic\n").unwrap();
        assert_eq!(pairs(&set, "testuser"), vec![("default/topic".to_string(), Access::ReadWrite)]);
    }

    #[test]
    fn test_access_token_needs_topic() {
        // A lone token after `topic` is the topic itself
        let set = parse_str("user u\ntopic read\ntopic readonly/x\n").unwrap();
        assert_eq!(
            pairs(&set, "u"),
            vec![
                ("read".to_string(), Access::ReadWrite),
                ("readonly/x".to_string(), Access::ReadWrite),
            ]
        );
    }

    #[test]
    fn test_whitespace_runs() {
        let set = parse_str("  user \t spaced name  \r\ntopic   write \t a/b c  \r\n").unwrap();
        assert_eq!(pairs(&set, "spaced name"), vec![("a/b c".to_string(), Access::Write)]);
    }

    #[test]
    fn test_topic_without_user() {
        let content = "\ntopic read orphan/topic\nuser testuser\ntopic read valid/topic\n";
        let err = parse_str(content).unwrap_err();
        match err {
            ParseError::TopicWithoutUser { line, ref text } => {
                assert_eq!(line, 2);
                assert_eq!(text, "topic read orphan/topic");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(err.to_string().contains("Topic rule without user context"));
    }

    #[test]
    fn test_invalid_syntax() {
        let content = "\nuser testuser\ninvalid line syntax\ntopic read valid/topic\n";
        let err = parse_str(content).unwrap_err();
        assert!(matches!(err, ParseError::InvalidSyntax { line: 3, .. }));
        assert!(err.to_string().contains("invalid line syntax"));
    }

    #[test]
    fn test_keywords_need_an_argument() {
        for content in ["user", "topic", "user   ", "users bob", "topicx a/b", "User bob"] {
            let err = parse_str(content).unwrap_err();
            assert!(
                matches!(err, ParseError::InvalidSyntax { line: 1, .. }),
                "{content:?} gave {err}"
            );
        }
    }

    #[test]
    fn test_redeclared_user_appends() {
        let set = parse_str("user a\ntopic read t1\nuser b\nuser a\ntopic write t2\n").unwrap();
        assert_eq!(set.client_count(), 2);
        assert_eq!(
            pairs(&set, "a"),
            vec![("t1".to_string(), Access::Read), ("t2".to_string(), Access::Write)]
        );
        assert!(set.get("b").unwrap().is_empty());
    }

    #[test]
    fn test_empty_input() {
        assert!(parse_str("").unwrap().is_empty());
        assert!(parse_str("# only comments\n\n   \n").unwrap().is_empty());
    }

    #[test]
    fn test_unicode_verbatim() {
        let set = parse_str("user Gerät-ü\ntopic read häuser/küche/温度\n").unwrap();
        assert_eq!(
            pairs(&set, "Gerät-ü"),
            vec![("häuser/küche/温度".to_string(), Access::Read)]
        );
    }

    #[test]
    fn test_parser_resets_between_runs() {
        let mut parser = AclParser::new();
        parser.parse_str("user a\n").unwrap();
        assert!(matches!(
            parser.parse_str("topic t\n"),
            Err(ParseError::TopicWithoutUser { line: 1, .. })
        ));
    }

    #[test]
    fn test_parse_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "user testuser").unwrap();
        writeln!(file, "topic read test/topic").unwrap();

        let set = parse_file(file.path()).unwrap();
        assert_eq!(set.rule_count(), 1);
    }

    #[test]
    fn test_file_not_found() {
        let err = parse_file("/nonexistent/file.acl").unwrap_err();
        assert!(matches!(err, ParseError::FileNotFound { .. }));
        assert!(err.to_string().contains("ACL file not found"));
    }

    #[test]
    fn test_decode_error() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"user a\ntopic \xff\xfe\n").unwrap();

        let err = parse_file(file.path()).unwrap_err();
        assert!(matches!(err, ParseError::Decode { .. }));
        assert!(err.to_string().starts_with("Unable to decode file"));
    }
}
