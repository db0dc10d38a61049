//! Timestamped JSON artifacts: exports and pre-mutation backups.
//!
//! Every artifact lands in one directory as
//! `<operation>_<subject>_<YYYYMMDD_HHMMSS>.json`.

use chrono::{DateTime, Local};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::config::BackupFailurePolicy;
use crate::error::{GraftError, Result};

/// Kind of artifact, which decides the file name prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Artifact {
    Export,
    RedirectBackup,
    DeleteBackup,
    ReparentBackup,
}

impl Artifact {
    pub fn prefix(&self) -> &'static str {
        match self {
            Artifact::Export => "export",
            Artifact::RedirectBackup => "backup",
            Artifact::DeleteBackup => "backup_func",
            Artifact::ReparentBackup => "backup_reparent",
        }
    }
}

/// Backup wrapper: when and for which subject it was taken, plus the payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Backup<T> {
    pub subject_path: String,
    pub backup_time: String,
    #[serde(flatten)]
    pub payload: T,
}

impl<T> Backup<T> {
    pub fn new(subject_path: &str, payload: T) -> Self {
        Self {
            subject_path: subject_path.to_string(),
            backup_time: Local::now().to_rfc3339(),
            payload,
        }
    }
}

/// Directory-backed artifact store.
#[derive(Debug, Clone)]
pub struct ExportStore {
    dir: PathBuf,
}

impl ExportStore {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn file_name(artifact: Artifact, subject: &str, at: DateTime<Local>) -> String {
        format!(
            "{}_{}_{}.json",
            artifact.prefix(),
            subject,
            at.format("%Y%m%d_%H%M%S")
        )
    }

    /// Pretty-print `doc` into a fresh timestamped file.
    pub fn write<T: Serialize>(&self, artifact: Artifact, subject: &str, doc: &T) -> Result<PathBuf> {
        let path = self
            .dir
            .join(Self::file_name(artifact, subject, Local::now()));
        let json = serde_json::to_string_pretty(doc)?;

        fs::create_dir_all(&self.dir).map_err(|source| GraftError::WriteFailure {
            path: self.dir.clone(),
            source,
        })?;
        fs::write(&path, json).map_err(|source| GraftError::WriteFailure {
            path: path.clone(),
            source,
        })?;

        debug!(path = %path.display(), "wrote {}", artifact.prefix());
        Ok(path)
    }

    /// Write a backup, applying the failure policy.
    ///
    /// Under `Proceed` a failed write is logged and `Ok(None)` returned so
    /// the caller can report an empty backup path and keep going.
    pub fn write_backup<T: Serialize>(
        &self,
        artifact: Artifact,
        subject: &str,
        backup: &Backup<T>,
        policy: BackupFailurePolicy,
    ) -> Result<Option<PathBuf>> {
        match self.write(artifact, subject, backup) {
            Ok(path) => Ok(Some(path)),
            Err(e) if policy == BackupFailurePolicy::Proceed => {
                warn!(subject, error = %e, "backup write failed, proceeding without backup");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Most recently modified artifact of this kind for a subject.
    pub fn latest(&self, artifact: Artifact, subject: &str) -> Option<PathBuf> {
        let stem = format!("{}_{}_", artifact.prefix(), subject);
        let entries = fs::read_dir(&self.dir).ok()?;

        entries
            .filter_map(|entry| entry.ok())
            .filter(|entry| {
                let name = entry.file_name().to_string_lossy().to_string();
                name.starts_with(&stem) && name.ends_with(".json")
            })
            .filter_map(|entry| {
                let modified = entry.metadata().ok()?.modified().ok()?;
                Some((modified, entry.path()))
            })
            .max_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)))
            .map(|(_, path)| path)
    }

    pub fn load<T: DeserializeOwned>(&self, path: &Path) -> Result<T> {
        let contents = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn test_file_name_format() {
        let at = Local.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap();
        assert_eq!(
            ExportStore::file_name(Artifact::Export, "BP_Door", at),
            "export_BP_Door_20240309_070501.json"
        );
        assert_eq!(
            ExportStore::file_name(Artifact::DeleteBackup, "BP_Door_Open", at),
            "backup_func_BP_Door_Open_20240309_070501.json"
        );
    }

    #[test]
    fn test_write_creates_directory() {
        let dir = tempdir().unwrap();
        let store = ExportStore::new(dir.path().join("nested/exports"));

        let path = store
            .write(Artifact::Export, "BP_Door", &json!({"ok": true}))
            .unwrap();

        assert!(path.exists());
        let loaded: serde_json::Value = store.load(&path).unwrap();
        assert_eq!(loaded["ok"], true);
        assert_eq!(store.latest(Artifact::Export, "BP_Door"), Some(path));
        assert!(store.latest(Artifact::RedirectBackup, "BP_Door").is_none());
    }

    #[test]
    fn test_backup_policy_on_failure() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "not a directory").unwrap();
        let store = ExportStore::new(blocker.join("exports"));
        let backup = Backup::new("/Game/BP_Door", json!({"original_state": []}));

        let proceed = store
            .write_backup(Artifact::RedirectBackup, "BP_Door", &backup, BackupFailurePolicy::Proceed)
            .unwrap();
        assert!(proceed.is_none());

        let abort = store.write_backup(
            Artifact::RedirectBackup,
            "BP_Door",
            &backup,
            BackupFailurePolicy::Abort,
        );
        assert!(matches!(abort, Err(GraftError::WriteFailure { .. })));
    }
}
