//! Configuration types for the ACL visualizer
//!
//! JSON-serializable settings for upload acceptance and ACL text generation.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::acl::Access;

/// ACL Visualizer Configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case", default)]
pub struct VisualizerConfig {
    /// Upload acceptance rules
    pub upload: UploadConfig,

    /// Defaults for ACL text generation
    pub generator: GeneratorConfig,
}

impl VisualizerConfig {
    /// Load configuration from a JSON file
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

// ============================================================================
// Upload Configuration
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct UploadConfig {
    /// Largest accepted upload in bytes
    pub max_file_size: usize,

    /// Accepted filename extensions, leading dot included
    pub allowed_extensions: Vec<String>,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_file_size: default_max_file_size(),
            allowed_extensions: default_allowed_extensions(),
        }
    }
}

impl UploadConfig {
    /// Whether a filename ends with an allowed extension, case sensitive
    pub fn allows(&self, filename: &str) -> bool {
        self.allowed_extensions
            .iter()
            .any(|ext| filename.ends_with(ext.as_str()))
    }
}

// ============================================================================
// Generator Configuration
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct GeneratorConfig {
    /// Emit clients in ascending name order instead of input order
    pub sort_clients: bool,

    /// Emit a header and one comment per client block
    pub include_comments: bool,

    /// Only emit rules with these access values (None = all)
    pub access_filter: Option<Vec<Access>>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            sort_clients: true,
            include_comments: true,
            access_filter: None,
        }
    }
}

// ============================================================================
// Default value functions
// ============================================================================

fn default_max_file_size() -> usize {
    16 * 1024 * 1024 // 16MB
}

fn default_allowed_extensions() -> Vec<String> {
    vec![".acl".to_string()]
}
