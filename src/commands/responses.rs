//! Response bodies. The registry adds `success` around each of these.

use serde::Serialize;

use crate::analysis::{FunctionListing, Referencer};
use crate::mutation::CallChange;
use crate::status::MigrationStatus;

#[derive(Debug, Clone, Serialize)]
pub struct ExportGraphResponse {
    pub file_path: String,
    pub subject_name: String,
    pub graph_count: usize,
    pub node_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunctionCallCount {
    pub function: String,
    pub call_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct DependenciesResponse {
    pub subject_path: String,
    pub assets: Vec<String>,
    pub sub_subjects: Vec<String>,
    pub native_types: Vec<String>,
    pub function_calls: Vec<FunctionCallCount>,
    pub total_dependencies: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReferencesResponse {
    pub target_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_function: Option<String>,
    pub referencer_count: usize,
    pub referencers: Vec<Referencer>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RedirectResponse {
    pub source_subject: String,
    pub dry_run: bool,
    pub nodes_found: usize,
    pub changes: Vec<CallChange>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nodes_redirected: Option<usize>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub nodes_failed: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup_path: Option<String>,
    pub requires_compile: bool,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeleteFunctionResponse {
    pub subject_path: String,
    pub function_name: String,
    pub nodes_removed: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup_path: Option<String>,
    pub requires_compile: bool,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReparentResponse {
    pub subject_path: String,
    pub old_parent_class: String,
    pub new_parent_class: String,
    pub new_parent_class_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup_path: Option<String>,
    pub requires_compile: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct FunctionsResponse {
    #[serde(flatten)]
    pub listing: FunctionListing,
    pub function_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct MigrationStatusResponse {
    pub status_path: String,
    #[serde(flatten)]
    pub ledger: MigrationStatus,
}
