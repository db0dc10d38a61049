//
//  config.rs
//  Graft
//
//  Created by hak (tharun)
//

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level Graft configuration (`graft.toml`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraftConfig {
    #[serde(default)]
    pub export: ExportConfig,
    #[serde(default)]
    pub host: HostConfig,
    #[serde(default)]
    pub backup: BackupConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Where exports, backups, and migration ledgers land.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Export directory, relative to the config file's directory.
    #[serde(default = "default_export_dir")]
    pub dir: String,
    /// Ledger directory for migration status files.
    #[serde(default = "default_status_dir")]
    pub status_dir: String,
}

/// Host namespace and type-name conventions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostConfig {
    /// Identifier prefixes treated as built-in (engine) content.
    #[serde(default = "default_builtin_prefixes")]
    pub builtin_prefixes: Vec<String>,
    /// Identifier prefixes that only exist as host reflection data.
    #[serde(default = "default_native_prefixes")]
    pub native_prefixes: Vec<String>,
    /// Call owners dropped from call counts unless engine types are requested.
    #[serde(default = "default_engine_call_prefixes")]
    pub engine_call_prefixes: Vec<String>,
    /// Prefix tried for instance-type names during parent resolution.
    #[serde(default = "default_instance_prefix")]
    pub instance_prefix: String,
    /// Prefix tried for object-type names during parent resolution.
    #[serde(default = "default_object_prefix")]
    pub object_prefix: String,
}

/// Behavior around pre-mutation backups.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BackupConfig {
    #[serde(default)]
    pub on_write_failure: BackupFailurePolicy,
}

/// What a mutation does when its backup cannot be written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackupFailurePolicy {
    /// Log a warning, report an empty backup path, and mutate anyway.
    #[default]
    Proceed,
    /// Fail the command before any mutation.
    Abort,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directive, overridden by `RUST_LOG`.
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

fn default_export_dir() -> String {
    "Saved/Graft/Exports".to_string()
}

fn default_status_dir() -> String {
    "Saved/Graft/Migrations".to_string()
}

fn default_builtin_prefixes() -> Vec<String> {
    vec!["/Script/".to_string(), "/Engine/".to_string()]
}

fn default_native_prefixes() -> Vec<String> {
    vec!["/Script/".to_string()]
}

pub(crate) fn default_engine_call_prefixes() -> Vec<String> {
    vec!["/Script/Engine".to_string()]
}

fn default_instance_prefix() -> String {
    "A".to_string()
}

fn default_object_prefix() -> String {
    "U".to_string()
}

fn default_log_filter() -> String {
    "graft=info".to_string()
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            dir: default_export_dir(),
            status_dir: default_status_dir(),
        }
    }
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            builtin_prefixes: default_builtin_prefixes(),
            native_prefixes: default_native_prefixes(),
            engine_call_prefixes: default_engine_call_prefixes(),
            instance_prefix: default_instance_prefix(),
            object_prefix: default_object_prefix(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}

impl GraftConfig {
    /// Load config from a TOML file, falling back to defaults.
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(contents) => toml::from_str(&contents).unwrap_or_default(),
            Err(_) => Self::default(),
        }
    }

    /// Resolve the export directory relative to the config file's parent directory.
    pub fn resolve_export_dir(&self, config_path: &Path) -> PathBuf {
        Self::base_dir(config_path).join(&self.export.dir)
    }

    /// Resolve the migration ledger directory relative to the config file's parent directory.
    pub fn resolve_status_dir(&self, config_path: &Path) -> PathBuf {
        Self::base_dir(config_path).join(&self.export.status_dir)
    }

    fn base_dir(config_path: &Path) -> &Path {
        config_path.parent().unwrap_or(config_path)
    }
}
