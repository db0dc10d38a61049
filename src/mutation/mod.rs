//! Guarded mutations: call redirection, graph deletion, reparenting.
//!
//! Each mutation writes its backup before touching the host, then marks
//! the subject modified once it is done.

pub mod delete;
pub mod redirect;
pub mod reparent;

pub use delete::{delete_function, DeleteOutcome, DeletedGraphBackup};
pub use redirect::{redirect_calls, CallChange, RedirectOutcome, RedirectPlan, RedirectRequest, RedirectStatus};
pub use reparent::{reparent, resolve_parent_type, ReparentBackup, ReparentOutcome};

use serde::Serialize;
use std::path::PathBuf;

use crate::backup::{Artifact, Backup, ExportStore};
use crate::config::BackupFailurePolicy;
use crate::error::Result;

/// Whether to back up before mutating, and what a failed backup means.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackupOptions {
    pub enabled: bool,
    pub on_failure: BackupFailurePolicy,
}

impl BackupOptions {
    pub fn enabled(on_failure: BackupFailurePolicy) -> Self {
        Self {
            enabled: true,
            on_failure,
        }
    }

    pub fn disabled() -> Self {
        Self {
            enabled: false,
            on_failure: BackupFailurePolicy::Proceed,
        }
    }
}

/// What happened to a mutation's backup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackupRecord {
    Skipped,
    Written(PathBuf),
    /// Write failed and the policy said to proceed.
    Failed,
}

impl BackupRecord {
    /// Path as reported to callers: absent when skipped, empty when failed.
    pub fn reported_path(&self) -> Option<String> {
        match self {
            BackupRecord::Skipped => None,
            BackupRecord::Written(path) => Some(path.display().to_string()),
            BackupRecord::Failed => Some(String::new()),
        }
    }
}

pub(crate) fn take_backup<T: Serialize>(
    store: &ExportStore,
    artifact: Artifact,
    file_subject: &str,
    backup: Backup<T>,
    options: BackupOptions,
) -> Result<BackupRecord> {
    if !options.enabled {
        return Ok(BackupRecord::Skipped);
    }
    Ok(
        match store.write_backup(artifact, file_subject, &backup, options.on_failure)? {
            Some(path) => BackupRecord::Written(path),
            None => BackupRecord::Failed,
        },
    )
}
