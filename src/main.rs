//! Mosquitto ACL Visualizer CLI
//!
//! Parses, audits, visualizes and regenerates Mosquitto ACL files.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use mosquitto_acl_visualizer::acl::{self, Access, RuleSet};
use mosquitto_acl_visualizer::config::VisualizerConfig;
use mosquitto_acl_visualizer::service::{AclVisualizerService, ExportFormat};
use mosquitto_acl_visualizer::{AclAnalyzer, AclGenerator};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

/// Mosquitto ACL analysis and generation
#[derive(Parser, Debug)]
#[command(name = "acl-visualizer")]
#[command(version)]
#[command(about = "Audit and visualize Mosquitto ACL files", long_about = None)]
struct Args {
    /// Configuration file path (JSON)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn", global = true)]
    log_level: String,

    /// Enable JSON log format
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print each client with its rules, then validation warnings
    Parse { file: PathBuf },

    /// Print validation warnings
    Validate { file: PathBuf },

    /// Emit all analysis views as JSON
    Visualize {
        file: PathBuf,
        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Single-line JSON
        #[arg(long)]
        compact: bool,
    },

    /// Generate ACL text from a JSON rule set
    Generate {
        rules: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Keep input client order
        #[arg(long)]
        no_sort: bool,
        /// Omit header and per-client comments
        #[arg(long)]
        no_comments: bool,
        /// Only emit rules with this access (repeatable)
        #[arg(long = "access", value_enum)]
        access: Vec<AccessArg>,
    },

    /// Export an ACL file as JSON rules or normalized ACL text
    Export {
        file: PathBuf,
        #[arg(short, long, value_enum)]
        format: FormatArg,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum AccessArg {
    Read,
    Write,
    Readwrite,
}

impl From<AccessArg> for Access {
    fn from(arg: AccessArg) -> Self {
        match arg {
            AccessArg::Read => Access::Read,
            AccessArg::Write => Access::Write,
            AccessArg::Readwrite => Access::ReadWrite,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum FormatArg {
    Json,
    Acl,
}

impl From<FormatArg> for ExportFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Json => ExportFormat::Json,
            FormatArg::Acl => ExportFormat::Acl,
        }
    }
}

fn write_output(output: Option<&Path>, content: &str) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!(path = %path.display(), bytes = content.len(), "Wrote output");
        }
        None => print!("{}", content),
    }
    Ok(())
}

fn print_warnings(warnings: &[String]) {
    if warnings.is_empty() {
        println!("No warnings");
        return;
    }
    println!("Warnings:");
    for warning in warnings {
        println!("  - {}", warning);
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    if args.json_logs {
        fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .init();
    } else {
        fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .init();
    }

    // Load configuration
    let config = if let Some(config_path) = &args.config {
        info!(path = %config_path.display(), "Loading configuration from file");
        VisualizerConfig::from_file(config_path)
            .with_context(|| format!("Invalid configuration {}", config_path.display()))?
    } else {
        VisualizerConfig::default()
    };

    match args.command {
        Command::Parse { file } => {
            let rules = acl::parse_file(&file)?;
            for (client, client_rules) in rules.iter() {
                println!("{} ({} rules)", client, client_rules.len());
                for rule in client_rules {
                    println!("  {} {}", rule.access(), rule.topic());
                }
            }
            print_warnings(&acl::validate_rules(&rules));
        }

        Command::Validate { file } => {
            let rules = acl::parse_file(&file)?;
            let warnings = acl::validate_rules(&rules);
            if !warnings.is_empty() {
                warn!(count = warnings.len(), "ACL has warnings");
            }
            print_warnings(&warnings);
        }

        Command::Visualize {
            file,
            output,
            compact,
        } => {
            let analyzer = AclAnalyzer::new(acl::parse_file(&file)?);
            let bundle = analyzer.bundle();

            info!(
                clients = bundle.statistics.total_clients,
                rules = bundle.statistics.total_rules,
                security_score = bundle.security_analysis.security_score,
                "Visualization data generated"
            );

            let mut json = if compact {
                serde_json::to_string(&bundle)?
            } else {
                serde_json::to_string_pretty(&bundle)?
            };
            json.push('\n');
            write_output(output.as_deref(), &json)?;
        }

        Command::Generate {
            rules,
            output,
            no_sort,
            no_comments,
            access,
        } => {
            let content = std::fs::read_to_string(&rules)
                .with_context(|| format!("Failed to read {}", rules.display()))?;
            let rule_set: RuleSet = serde_json::from_str(&content)
                .with_context(|| format!("Invalid rule set JSON in {}", rules.display()))?;

            let mut generator_config = config.generator;
            if no_sort {
                generator_config.sort_clients = false;
            }
            if no_comments {
                generator_config.include_comments = false;
            }
            if !access.is_empty() {
                let filter = access.into_iter().map(Access::from).collect();
                generator_config.access_filter = Some(filter);
            }

            let text = AclGenerator::new(generator_config).generate(&rule_set)?;
            write_output(output.as_deref(), &text)?;
        }

        Command::Export {
            file,
            format,
            output,
        } => {
            let bytes = std::fs::read(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let filename = file
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();

            let service = AclVisualizerService::with_config(config);
            let summary = service.upload(&filename, &bytes)?;
            let export = service.export(&summary.session_id, format.into())?;

            info!(filename = %export.filename, content_type = export.content_type, "Exported");
            write_output(output.as_deref(), &export.body)?;
        }
    }

    Ok(())
}
