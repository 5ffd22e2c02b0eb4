//! ACL visualizer service
//!
//! Upload, analysis lookup, generation and export over a [`SessionStore`],
//! without any transport attached. A hosting layer maps [`ServiceError`] to
//! its own status codes using [`ServiceError::is_client_error`].

use crate::acl::{Access, AclParser, ParseError, RuleSet};
use crate::analysis::{AclAnalyzer, ClientSummary, SecurityAnalysis, TopicSummary, ViewBundle};
use crate::config::{GeneratorConfig, VisualizerConfig};
use crate::generator::{AclGenerator, GenerateError};
use crate::store::SessionStore;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

const UPLOAD_MESSAGE: &str = "File uploaded and parsed successfully";

/// Failures surfaced to callers of the service
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("No file selected")]
    NoFile,

    #[error("Invalid file type: {filename}. Allowed extensions: {allowed}")]
    InvalidFileType { filename: String, allowed: String },

    #[error("File too large: {size} bytes exceeds the {limit} byte limit")]
    FileTooLarge { size: usize, limit: usize },

    #[error("No ACL data found for session '{session_id}'. Please upload a file first.")]
    NoData { session_id: String },

    #[error("ACL parsing error: {0}")]
    Parse(#[from] ParseError),

    #[error("Generation error: {0}")]
    Generate(#[from] GenerateError),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl ServiceError {
    /// Whether the caller caused the failure
    pub fn is_client_error(&self) -> bool {
        !matches!(self, Self::Serialize(_))
    }
}

/// Counts reported after a successful upload
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadStats {
    pub total_clients: usize,
    pub total_rules: usize,
    /// Client names in declaration order
    pub clients: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadSummary {
    pub message: String,
    pub session_id: String,
    pub summary: UploadStats,
}

/// Per-request overrides of the configured generator settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorOptions {
    pub sort_clients: Option<bool>,
    pub include_comments: Option<bool>,
    pub access_filter: Option<Vec<Access>>,
}

impl GeneratorOptions {
    fn apply(&self, base: &GeneratorConfig) -> GeneratorConfig {
        GeneratorConfig {
            sort_clients: self.sort_clients.unwrap_or(base.sort_clients),
            include_comments: self.include_comments.unwrap_or(base.include_comments),
            access_filter: self
                .access_filter
                .clone()
                .or_else(|| base.access_filter.clone())
                .filter(|filter| !filter.is_empty()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub client_rules: RuleSet,
    #[serde(default)]
    pub options: GeneratorOptions,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Json,
    Acl,
}

/// A downloadable document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Export {
    pub filename: String,
    pub content_type: &'static str,
    pub body: String,
}

/// Strip directories and replace anything outside `[A-Za-z0-9._-]`
pub fn sanitize_filename(filename: &str) -> String {
    let base = filename.rsplit(['/', '\\']).next().unwrap_or_default();
    base.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

fn file_stem(session_id: &str) -> &str {
    match session_id.rfind('.') {
        Some(idx) if idx > 0 => &session_id[..idx],
        _ => session_id,
    }
}

/// ACL Visualizer Service
pub struct AclVisualizerService {
    /// Configuration
    config: Arc<RwLock<VisualizerConfig>>,
    /// Parsed uploads keyed by session id
    sessions: SessionStore,
}

impl AclVisualizerService {
    /// Create a service with default configuration
    pub fn new() -> Self {
        Self::with_config(VisualizerConfig::default())
    }

    pub fn with_config(config: VisualizerConfig) -> Self {
        Self {
            config: Arc::new(RwLock::new(config)),
            sessions: SessionStore::new(),
        }
    }

    /// Replace the configuration. Stored sessions are kept.
    pub fn reconfigure(&self, config: VisualizerConfig) {
        info!(
            max_file_size = config.upload.max_file_size,
            extensions = ?config.upload.allowed_extensions,
            "Applying configuration"
        );
        *self.config.write() = config;
    }

    pub fn config(&self) -> VisualizerConfig {
        self.config.read().clone()
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Parse an uploaded ACL file and store it under its sanitized name
    pub fn upload(&self, filename: &str, content: &[u8]) -> Result<UploadSummary, ServiceError> {
        let session_id = sanitize_filename(filename);
        if session_id.is_empty() {
            return Err(ServiceError::NoFile);
        }

        {
            let config = self.config.read();
            if !config.upload.allows(&session_id) {
                warn!(filename = %filename, "Rejected upload with invalid file type");
                return Err(ServiceError::InvalidFileType {
                    filename: filename.to_string(),
                    allowed: config.upload.allowed_extensions.join(", "),
                });
            }
            if content.len() > config.upload.max_file_size {
                warn!(
                    filename = %filename,
                    size = content.len(),
                    limit = config.upload.max_file_size,
                    "Rejected oversized upload"
                );
                return Err(ServiceError::FileTooLarge {
                    size: content.len(),
                    limit: config.upload.max_file_size,
                });
            }
        }

        let rule_set = AclParser::new().parse_bytes(&session_id, content)?;
        let summary = UploadStats {
            total_clients: rule_set.client_count(),
            total_rules: rule_set.rule_count(),
            clients: rule_set.client_names().map(str::to_string).collect(),
        };

        let replaced = self
            .sessions
            .insert(session_id.clone(), AclAnalyzer::new(rule_set));

        info!(
            session_id = %session_id,
            clients = summary.total_clients,
            rules = summary.total_rules,
            replaced,
            "ACL uploaded"
        );

        Ok(UploadSummary {
            message: UPLOAD_MESSAGE.to_string(),
            session_id,
            summary,
        })
    }

    fn analyzer(&self, session_id: &str) -> Result<Arc<AclAnalyzer>, ServiceError> {
        self.sessions.get(session_id).ok_or_else(|| {
            debug!(session_id = %session_id, "Unknown session");
            ServiceError::NoData {
                session_id: session_id.to_string(),
            }
        })
    }

    /// All eight views for a session
    pub fn visualize(&self, session_id: &str) -> Result<ViewBundle, ServiceError> {
        Ok(self.analyzer(session_id)?.bundle())
    }

    pub fn clients(&self, session_id: &str) -> Result<Vec<ClientSummary>, ServiceError> {
        Ok(self.analyzer(session_id)?.client_summary())
    }

    pub fn topics(&self, session_id: &str) -> Result<Vec<TopicSummary>, ServiceError> {
        Ok(self.analyzer(session_id)?.topic_summary())
    }

    pub fn security_analysis(&self, session_id: &str) -> Result<SecurityAnalysis, ServiceError> {
        Ok(self.analyzer(session_id)?.security_analysis())
    }

    /// Generate ACL text from submitted rules
    pub fn generate(&self, request: &GenerateRequest) -> Result<Export, ServiceError> {
        let config = request.options.apply(&self.config.read().generator);
        let body = AclGenerator::new(config).generate(&request.client_rules)?;

        info!(
            clients = request.client_rules.client_count(),
            rules = request.client_rules.rule_count(),
            "Generated ACL file"
        );

        Ok(Export {
            filename: "generated.acl".to_string(),
            content_type: "text/plain",
            body,
        })
    }

    /// Export a stored session as JSON rules or ACL text
    pub fn export(&self, session_id: &str, format: ExportFormat) -> Result<Export, ServiceError> {
        let analyzer = self.analyzer(session_id)?;
        let stem = file_stem(session_id);

        let export = match format {
            ExportFormat::Json => Export {
                filename: format!("acl_export_{}.json", stem),
                content_type: "application/json",
                body: serde_json::to_string_pretty(analyzer.rule_set())?,
            },
            ExportFormat::Acl => {
                let generator = AclGenerator::new(GeneratorConfig {
                    sort_clients: true,
                    include_comments: true,
                    access_filter: None,
                });
                Export {
                    filename: format!("exported_{}.acl", stem),
                    content_type: "text/plain",
                    body: generator.generate(analyzer.rule_set())?,
                }
            }
        };

        debug!(
            session_id = %session_id,
            format = ?format,
            bytes = export.body.len(),
            "Exported session"
        );
        Ok(export)
    }
}

impl Default for AclVisualizerService {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::acl::{parse_str, Rule};

    const SAMPLE: &str = "user sensor1\ntopic read sensors/+/data\nuser admin\ntopic readwrite #\n";

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("broker.acl"), "broker.acl");
        assert_eq!(sanitize_filename("../etc/my broker.acl"), "my_broker.acl");
        assert_eq!(sanitize_filename("C:\\acl\\prod-1.acl"), "prod-1.acl");
        assert_eq!(sanitize_filename("dir/"), "");
    }

    #[test]
    fn test_upload_summary() {
        let service = AclVisualizerService::new();
        let summary = service.upload("test.acl", SAMPLE.as_bytes()).unwrap();

        assert_eq!(summary.message, "File uploaded and parsed successfully");
        assert_eq!(summary.session_id, "test.acl");
        assert_eq!(summary.summary.total_clients, 2);
        assert_eq!(summary.summary.total_rules, 2);
        assert_eq!(summary.summary.clients, vec!["sensor1", "admin"]);
    }

    #[test]
    fn test_upload_rejections() {
        let service = AclVisualizerService::new();

        assert!(matches!(service.upload("", b"user a\n"), Err(ServiceError::NoFile)));
        assert!(matches!(
            service.upload("rules.txt", b"user a\n"),
            Err(ServiceError::InvalidFileType { .. })
        ));
        assert!(matches!(
            service.upload("RULES.ACL", b"user a\n"),
            Err(ServiceError::InvalidFileType { .. })
        ));
        assert!(matches!(
            service.upload("bad.acl", b"topic read orphan\n"),
            Err(ServiceError::Parse(ParseError::TopicWithoutUser { line: 1, .. }))
        ));
        assert!(matches!(
            service.upload("bin.acl", &[0xff, 0xfe]),
            Err(ServiceError::Parse(ParseError::Decode { .. }))
        ));
        assert!(service.sessions().is_empty());
    }

    #[test]
    fn test_upload_size_limit() {
        let mut config = VisualizerConfig::default();
        config.upload.max_file_size = 8;
        let service = AclVisualizerService::with_config(config);

        assert!(service.upload("ok.acl", b"user a\n").is_ok());
        assert!(matches!(
            service.upload("big.acl", b"user abcdefgh\n"),
            Err(ServiceError::FileTooLarge { size: 14, limit: 8 })
        ));
    }

    #[test]
    fn test_unknown_session() {
        let service = AclVisualizerService::new();
        let err = service.visualize("missing.acl").unwrap_err();

        assert!(matches!(err, ServiceError::NoData { .. }));
        assert!(err.is_client_error());
        assert!(service.clients("missing.acl").is_err());
        assert!(service.export("missing.acl", ExportFormat::Json).is_err());
    }

    #[test]
    fn test_views_for_session() {
        let service = AclVisualizerService::new();
        service.upload("s.acl", SAMPLE.as_bytes()).unwrap();

        let clients = service.clients("s.acl").unwrap();
        assert_eq!(clients[0].name, "admin");

        let topics = service.topics("s.acl").unwrap();
        assert_eq!(topics.len(), 2);

        let analysis = service.security_analysis("s.acl").unwrap();
        assert_eq!(analysis.issues.len(), 1);
        assert_eq!(service.visualize("s.acl").unwrap().security_analysis, analysis);
    }

    #[test]
    fn test_reupload_replaces_session() {
        let service = AclVisualizerService::new();
        service.upload("s.acl", SAMPLE.as_bytes()).unwrap();
        service.upload("s.acl", b"user only\n").unwrap();

        assert_eq!(service.sessions().len(), 1);
        let bundle = service.visualize("s.acl").unwrap();
        assert_eq!(bundle.statistics.total_clients, 1);
    }

    #[test]
    fn test_generate_with_overrides() {
        let service = AclVisualizerService::new();
        let request: GenerateRequest = serde_json::from_value(serde_json::json!({
            "client_rules": {
                "b": [{"client": "b", "access": "write", "topic": "x"}],
                "a": [{"client": "a", "access": "read", "topic": "y"}]
            },
            "options": {"include_comments": false, "access_filter": ["write"]}
        }))
        .unwrap();

        let export = service.generate(&request).unwrap();
        assert_eq!(export.content_type, "text/plain");
        // Sorting comes from the configured default
        assert_eq!(export.body, "user a\n\nuser b\ntopic write x\n");
    }

    #[test]
    fn test_generate_empty_access_filter() {
        let service = AclVisualizerService::new();
        let request: GenerateRequest = serde_json::from_value(serde_json::json!({
            "client_rules": {"a": [{"client": "a", "access": "read", "topic": "t"}]},
            "options": {"include_comments": false, "access_filter": []}
        }))
        .unwrap();

        let export = service.generate(&request).unwrap();
        assert_eq!(export.body, "user a\ntopic read t\n");

        // An empty configured filter is also no filter
        let mut config = VisualizerConfig::default();
        config.generator.include_comments = false;
        config.generator.access_filter = Some(Vec::new());
        service.reconfigure(config);

        let request = GenerateRequest {
            client_rules: request.client_rules,
            options: GeneratorOptions::default(),
        };
        assert_eq!(service.generate(&request).unwrap().body, "user a\ntopic read t\n");
    }

    #[test]
    fn test_generate_validation_error() {
        let service = AclVisualizerService::new();
        let mut rules = RuleSet::new();
        rules.push(Rule::new("a", Access::Read, " padded"));

        let err = service
            .generate(&GenerateRequest {
                client_rules: rules,
                options: GeneratorOptions::default(),
            })
            .unwrap_err();
        assert!(matches!(err, ServiceError::Generate(GenerateError::InvalidTopic { .. })));
        assert!(err.to_string().starts_with("Generation error: "));
    }

    #[test]
    fn test_export_formats() {
        let service = AclVisualizerService::new();
        service.upload("prod.acl", SAMPLE.as_bytes()).unwrap();

        let json = service.export("prod.acl", ExportFormat::Json).unwrap();
        assert_eq!(json.filename, "acl_export_prod.json");
        assert_eq!(json.content_type, "application/json");
        let value: serde_json::Value = serde_json::from_str(&json.body).unwrap();
        assert_eq!(
            value["admin"],
            serde_json::json!([{"client": "admin", "access": "readwrite", "topic": "#"}])
        );

        let acl = service.export("prod.acl", ExportFormat::Acl).unwrap();
        assert_eq!(acl.filename, "exported_prod.acl");
        assert!(acl.body.starts_with("# "));
        assert_eq!(parse_str(&acl.body).unwrap().rule_count(), 2);
    }

    #[test]
    fn test_reconfigure() {
        let service = AclVisualizerService::new();
        let mut config = VisualizerConfig::default();
        config.upload.allowed_extensions = vec![".txt".to_string()];
        service.reconfigure(config);

        assert!(service.upload("a.txt", b"user a\n").is_ok());
        assert!(service.upload("a.acl", b"user a\n").is_err());
    }
}
