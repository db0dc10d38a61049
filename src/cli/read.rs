//! Read operations: export, deps, refs, functions, verify, show
//!
//! None of these modify the project snapshot. Export still writes its
//! document to the export directory.

use anyhow::Result;
use serde_json::{json, Value};

use super::Session;
use crate::backup::{Artifact, ExportStore};
use crate::commands::{
    handlers, ExportGraphRequest, FindReferencesRequest, GetDependenciesRequest,
    GetFunctionsRequest, VerifyReferencesRequest,
};

pub fn export(
    session: &mut Session,
    subject_path: String,
    graph_name: Option<String>,
    include_components: bool,
    include_defaults: bool,
) -> Result<Value> {
    session.run(
        ExportGraphRequest {
            subject_path,
            graph_name,
            include_components,
            include_defaults,
        },
        handlers::export_graph,
    )
}

pub fn deps(session: &mut Session, subject_path: String, include_engine_types: bool) -> Result<Value> {
    session.run(
        GetDependenciesRequest {
            subject_path,
            include_engine_types,
            recursive: true,
        },
        handlers::get_dependencies,
    )
}

pub fn refs(session: &mut Session, target_path: String, target_function: Option<String>) -> Result<Value> {
    session.run(
        FindReferencesRequest {
            target_path,
            target_function,
            search_scope: "project".to_string(),
            include_soft_references: true,
        },
        handlers::find_references,
    )
}

pub fn functions(session: &mut Session, subject_path: String, include_inherited: bool) -> Result<Value> {
    session.run(
        GetFunctionsRequest {
            subject_path,
            include_inherited,
        },
        handlers::get_functions,
    )
}

pub fn verify(session: &mut Session, subject_path: String, function_name: String) -> Result<Value> {
    session.run(
        VerifyReferencesRequest {
            subject_path,
            function_name,
        },
        handlers::verify_no_external_references,
    )
}

/// Load the newest artifact of a kind for a subject.
pub fn show(store: &ExportStore, subject: &str, artifact: Artifact) -> Result<Value> {
    let Some(path) = store.latest(artifact, subject) else {
        return Ok(json!({
            "success": false,
            "error": format!("No {} found for {} in {}", artifact.prefix(), subject, store.dir().display()),
        }));
    };

    let document: Value = store.load(&path)?;
    Ok(json!({
        "success": true,
        "file_path": path.display().to_string(),
        "document": document,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_show_latest_export() {
        let dir = tempdir().unwrap();
        let store = ExportStore::new(dir.path());

        let missing = show(&store, "BP_Door", Artifact::Export).unwrap();
        assert_eq!(missing["success"], false);

        store
            .write(Artifact::Export, "BP_Door", &json!({"subject_name": "BP_Door"}))
            .unwrap();
        let found = show(&store, "BP_Door", Artifact::Export).unwrap();
        assert_eq!(found["success"], true);
        assert_eq!(found["document"]["subject_name"], "BP_Door");

        let other_kind = show(&store, "BP_Door", Artifact::ReparentBackup).unwrap();
        assert_eq!(other_kind["success"], false);
    }
}
