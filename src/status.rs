//! Per-subject migration ledger.
//!
//! Tracks the six steps of a subject's migration in
//! `<status_dir>/<SubjectName>_status.json`.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{GraftError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MigrationStep {
    Analysis,
    Context,
    Codemap,
    Generation,
    Validation,
    Integration,
}

impl MigrationStep {
    pub const ALL: [MigrationStep; 6] = [
        MigrationStep::Analysis,
        MigrationStep::Context,
        MigrationStep::Codemap,
        MigrationStep::Generation,
        MigrationStep::Validation,
        MigrationStep::Integration,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MigrationStep::Analysis => "analysis",
            MigrationStep::Context => "context",
            MigrationStep::Codemap => "codemap",
            MigrationStep::Generation => "generation",
            MigrationStep::Validation => "validation",
            MigrationStep::Integration => "integration",
        }
    }
}

impl fmt::Display for MigrationStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MigrationStep {
    type Err = GraftError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|step| step.as_str() == s)
            .ok_or_else(|| GraftError::InvalidInput(format!("Unknown migration step: {}", s)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Pending,
    InProgress,
    Completed,
    Failed,
}

impl FromStr for StepStatus {
    type Err = GraftError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "pending" => Ok(StepStatus::Pending),
            "in_progress" => Ok(StepStatus::InProgress),
            "completed" => Ok(StepStatus::Completed),
            "failed" => Ok(StepStatus::Failed),
            other => Err(GraftError::InvalidInput(format!("Unknown step status: {}", other))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepRecord {
    pub status: StepStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Local>>,
}

/// Migration progress for one subject.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MigrationStatus {
    pub subject: String,
    pub subject_name: String,
    pub started: DateTime<Local>,
    pub status: StepStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<DateTime<Local>>,
    /// Keyed by step name.
    pub steps: BTreeMap<String, StepRecord>,
    #[serde(default)]
    pub outputs: BTreeMap<String, String>,
    #[serde(default)]
    pub issues: Vec<String>,
}

impl MigrationStatus {
    /// Fresh ledger with every step pending.
    pub fn new(subject_path: &str, subject_name: &str) -> Self {
        let steps = MigrationStep::ALL
            .iter()
            .map(|step| {
                (
                    step.to_string(),
                    StepRecord {
                        status: StepStatus::Pending,
                        timestamp: None,
                    },
                )
            })
            .collect();

        Self {
            subject: subject_path.to_string(),
            subject_name: subject_name.to_string(),
            started: Local::now(),
            status: StepStatus::InProgress,
            completed: None,
            steps,
            outputs: BTreeMap::new(),
            issues: Vec::new(),
        }
    }

    /// Record a step transition and recompute the overall status.
    pub fn update_step(&mut self, step: MigrationStep, status: StepStatus, output: Option<&str>, issues: &[String]) {
        let now = Local::now();
        self.steps.insert(
            step.to_string(),
            StepRecord {
                status,
                timestamp: Some(now),
            },
        );
        if let Some(output) = output {
            self.outputs.insert(step.to_string(), output.to_string());
        }
        self.issues.extend_from_slice(issues);

        if self.steps.values().all(|s| s.status == StepStatus::Completed) {
            self.status = StepStatus::Completed;
            self.completed = Some(now);
        } else if self.steps.values().any(|s| s.status == StepStatus::Failed) {
            self.status = StepStatus::Failed;
            self.completed = None;
        } else {
            self.status = StepStatus::InProgress;
            self.completed = None;
        }
    }

    pub fn step(&self, step: MigrationStep) -> Option<&StepRecord> {
        self.steps.get(step.as_str())
    }
}

/// Directory of `<name>_status.json` ledgers.
#[derive(Debug, Clone)]
pub struct StatusStore {
    dir: PathBuf,
}

impl StatusStore {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, subject_name: &str) -> PathBuf {
        self.dir.join(format!("{}_status.json", subject_name))
    }

    pub fn load(&self, subject_name: &str) -> Result<Option<MigrationStatus>> {
        let path = self.path_for(subject_name);
        if !path.exists() {
            return Ok(None);
        }
        let contents = fs::read_to_string(&path)?;
        Ok(Some(serde_json::from_str(&contents)?))
    }

    pub fn save(&self, status: &MigrationStatus) -> Result<PathBuf> {
        let path = self.path_for(&status.subject_name);
        let json = serde_json::to_string_pretty(status)?;
        write_file(&self.dir, &path, &json)?;
        Ok(path)
    }
}

fn write_file(dir: &Path, path: &Path, contents: &str) -> Result<()> {
    fs::create_dir_all(dir).map_err(|source| GraftError::WriteFailure {
        path: dir.to_path_buf(),
        source,
    })?;
    fs::write(path, contents).map_err(|source| GraftError::WriteFailure {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_new_status_all_pending() {
        let status = MigrationStatus::new("/Game/Blueprints/BP_Door", "BP_Door");

        assert_eq!(status.subject_name, "BP_Door");
        assert_eq!(status.status, StepStatus::InProgress);
        assert_eq!(status.steps.len(), 6);
        assert!(status.steps.values().all(|s| s.status == StepStatus::Pending));
    }

    #[test]
    fn test_overall_status_follows_steps() {
        let mut status = MigrationStatus::new("/Game/BP_Door", "BP_Door");

        status.update_step(
            MigrationStep::Analysis,
            StepStatus::Failed,
            None,
            &["missing export".to_string()],
        );
        assert_eq!(status.status, StepStatus::Failed);
        assert_eq!(status.issues.len(), 1);

        for step in MigrationStep::ALL {
            status.update_step(step, StepStatus::Completed, Some("out.json"), &[]);
        }
        assert_eq!(status.status, StepStatus::Completed);
        assert!(status.completed.is_some());
        assert_eq!(status.outputs.get("codemap").map(String::as_str), Some("out.json"));
    }

    #[test]
    fn test_store_round_trip() {
        let dir = tempdir().unwrap();
        let store = StatusStore::new(dir.path().join("Migrations"));

        assert!(store.load("BP_Door").unwrap().is_none());

        let mut status = MigrationStatus::new("/Game/BP_Door", "BP_Door");
        status.update_step(MigrationStep::Context, StepStatus::InProgress, None, &[]);
        let path = store.save(&status).unwrap();
        assert!(path.ends_with("BP_Door_status.json"));

        let loaded = store.load("BP_Door").unwrap().unwrap();
        assert_eq!(
            loaded.step(MigrationStep::Context).unwrap().status,
            StepStatus::InProgress
        );
    }

    #[test]
    fn test_parse_step_names() {
        assert_eq!("codemap".parse::<MigrationStep>().unwrap(), MigrationStep::Codemap);
        assert!("deploy".parse::<MigrationStep>().is_err());
        assert_eq!("in_progress".parse::<StepStatus>().unwrap(), StepStatus::InProgress);
    }
}
