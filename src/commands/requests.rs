//
//  requests.rs
//  Graft
//
//  Created by hak (tharun)
//

use rmcp::schemars;
use serde::Deserialize;

use crate::error::{GraftError, Result};
use crate::status::{MigrationStep, StepStatus};

/// Request-level checks run before the host is touched.
pub trait Validate {
    fn validate(&self) -> Result<()>;
}

fn require(param: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        Err(GraftError::missing(param))
    } else {
        Ok(())
    }
}

fn default_true() -> bool {
    true
}

fn default_scope() -> String {
    "project".to_string()
}

#[derive(Debug, Clone, Deserialize, schemars::JsonSchema)]
pub struct ExportGraphRequest {
    #[schemars(description = "Subject path (e.g. \"/Game/Blueprints/BP_Player\") or bare subject name")]
    pub subject_path: String,

    #[schemars(description = "Only export graphs whose name contains this text")]
    #[serde(default)]
    pub graph_name: Option<String>,

    #[schemars(description = "Include component templates (default: true)")]
    #[serde(default = "default_true")]
    pub include_components: bool,

    #[schemars(description = "Include pin default values (default: false)")]
    #[serde(default)]
    pub include_defaults: bool,
}

impl Validate for ExportGraphRequest {
    fn validate(&self) -> Result<()> {
        require("subject_path", &self.subject_path)
    }
}

#[derive(Debug, Clone, Deserialize, schemars::JsonSchema)]
pub struct GetDependenciesRequest {
    #[schemars(description = "Subject path or bare subject name")]
    pub subject_path: String,

    #[schemars(description = "Keep built-in engine dependencies and calls (default: false)")]
    #[serde(default)]
    pub include_engine_types: bool,

    #[schemars(description = "Accepted for compatibility; the host index is already transitive (default: true)")]
    #[serde(default = "default_true")]
    pub recursive: bool,
}

impl Validate for GetDependenciesRequest {
    fn validate(&self) -> Result<()> {
        require("subject_path", &self.subject_path)
    }
}

#[derive(Debug, Clone, Deserialize, schemars::JsonSchema)]
pub struct FindReferencesRequest {
    #[schemars(description = "Asset or subject identifier to find referencers of")]
    pub target_path: String,

    #[schemars(description = "Also list call sites of this function inside referencing subjects")]
    #[serde(default)]
    pub target_function: Option<String>,

    #[schemars(description = "Search scope (default: \"project\")")]
    #[serde(default = "default_scope")]
    pub search_scope: String,

    #[schemars(description = "Include soft references (default: true)")]
    #[serde(default = "default_true")]
    pub include_soft_references: bool,
}

impl Validate for FindReferencesRequest {
    fn validate(&self) -> Result<()> {
        require("target_path", &self.target_path)
    }
}

#[derive(Debug, Clone, Deserialize, schemars::JsonSchema)]
pub struct RedirectCallsRequest {
    #[schemars(description = "Subject whose call nodes are redirected")]
    pub source_subject: String,

    #[schemars(description = "Function name the call nodes currently invoke")]
    pub source_function: String,

    #[schemars(description = "Type that owns the new function")]
    pub target_class: String,

    #[schemars(description = "New function name")]
    pub target_function: String,

    #[schemars(description = "Only report what would change (default: true)")]
    #[serde(default = "default_true")]
    pub dry_run: bool,

    #[schemars(description = "Write a backup before mutating (default: true)")]
    #[serde(default = "default_true")]
    pub backup: bool,
}

impl Validate for RedirectCallsRequest {
    fn validate(&self) -> Result<()> {
        require("source_subject", &self.source_subject)?;
        require("source_function", &self.source_function)?;
        require("target_class", &self.target_class)?;
        require("target_function", &self.target_function)
    }
}

#[derive(Debug, Clone, Deserialize, schemars::JsonSchema)]
pub struct DeleteFunctionRequest {
    #[schemars(description = "Subject path or bare subject name")]
    pub subject_path: String,

    #[schemars(description = "Name of the graph to remove")]
    pub function_name: String,

    #[schemars(description = "Write a backup before mutating (default: true)")]
    #[serde(default = "default_true")]
    pub backup: bool,
}

impl Validate for DeleteFunctionRequest {
    fn validate(&self) -> Result<()> {
        require("subject_path", &self.subject_path)?;
        require("function_name", &self.function_name)
    }
}

#[derive(Debug, Clone, Deserialize, schemars::JsonSchema)]
pub struct ReparentRequest {
    #[schemars(description = "Subject path or bare subject name")]
    pub subject_path: String,

    #[schemars(description = "New parent type name or path")]
    pub new_parent_class: String,

    #[schemars(description = "Write a backup before mutating (default: true)")]
    #[serde(default = "default_true")]
    pub backup: bool,
}

impl Validate for ReparentRequest {
    fn validate(&self) -> Result<()> {
        require("subject_path", &self.subject_path)?;
        require("new_parent_class", &self.new_parent_class)
    }
}

#[derive(Debug, Clone, Deserialize, schemars::JsonSchema)]
pub struct GetFunctionsRequest {
    #[schemars(description = "Subject path or bare subject name")]
    pub subject_path: String,

    #[schemars(description = "Also list functions inherited from the parent chain (default: false)")]
    #[serde(default)]
    pub include_inherited: bool,
}

impl Validate for GetFunctionsRequest {
    fn validate(&self) -> Result<()> {
        require("subject_path", &self.subject_path)
    }
}

#[derive(Debug, Clone, Deserialize, schemars::JsonSchema)]
pub struct VerifyReferencesRequest {
    #[schemars(description = "Subject that owns the function")]
    pub subject_path: String,

    #[schemars(description = "Function that is about to be deleted")]
    pub function_name: String,
}

impl Validate for VerifyReferencesRequest {
    fn validate(&self) -> Result<()> {
        require("subject_path", &self.subject_path)?;
        require("function_name", &self.function_name)
    }
}

#[derive(Debug, Clone, Deserialize, schemars::JsonSchema)]
pub struct MigrationStatusRequest {
    #[schemars(description = "Subject being migrated")]
    pub subject_path: String,

    #[schemars(
        description = "Step to update: analysis, context, codemap, generation, validation, integration. Omit to read the ledger."
    )]
    #[serde(default)]
    pub step: Option<String>,

    #[schemars(description = "New step status: pending, in_progress, completed, failed")]
    #[serde(default)]
    pub status: Option<String>,

    #[schemars(description = "Output artifact path produced by the step")]
    #[serde(default)]
    pub output: Option<String>,

    #[schemars(description = "Issues found during the step")]
    #[serde(default)]
    pub issues: Vec<String>,
}

impl Validate for MigrationStatusRequest {
    fn validate(&self) -> Result<()> {
        require("subject_path", &self.subject_path)?;
        if self.step.is_some() && self.status.is_none() {
            return Err(GraftError::missing("status"));
        }
        if let Some(step) = &self.step {
            step.parse::<MigrationStep>()?;
        }
        if let Some(status) = &self.status {
            status.parse::<StepStatus>()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults_applied() {
        let req: RedirectCallsRequest = serde_json::from_value(json!({
            "source_subject": "/Game/BP_A",
            "source_function": "Old",
            "target_class": "Lib",
            "target_function": "New"
        }))
        .unwrap();

        assert!(req.dry_run);
        assert!(req.backup);
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_empty_field_rejected() {
        let req: DeleteFunctionRequest = serde_json::from_value(json!({
            "subject_path": "/Game/BP_A",
            "function_name": "  "
        }))
        .unwrap();

        let err = req.validate().unwrap_err();
        assert_eq!(err.to_string(), "Missing 'function_name' parameter");
    }

    #[test]
    fn test_status_update_needs_status() {
        let req: MigrationStatusRequest = serde_json::from_value(json!({
            "subject_path": "/Game/BP_A",
            "step": "analysis"
        }))
        .unwrap();

        assert!(req.validate().is_err());
    }

    #[test]
    fn test_unknown_step_or_status_rejected() {
        let req: MigrationStatusRequest = serde_json::from_value(json!({
            "subject_path": "/Game/BP_A",
            "step": "deploy",
            "status": "completed"
        }))
        .unwrap();
        assert_eq!(req.validate().unwrap_err().to_string(), "Unknown migration step: deploy");

        let req: MigrationStatusRequest = serde_json::from_value(json!({
            "subject_path": "/Game/BP_A",
            "step": "analysis",
            "status": "done"
        }))
        .unwrap();
        assert_eq!(req.validate().unwrap_err().to_string(), "Unknown step status: done");
    }
}
