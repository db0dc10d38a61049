//
//  delete.rs
//  Graft
//
//  Created by hak (tharun)
//

use serde::{Deserialize, Serialize};
use tracing::info;

use super::{take_backup, BackupOptions, BackupRecord};
use crate::backup::{Artifact, Backup, ExportStore};
use crate::error::{GraftError, Result};
use crate::host::{resolve_subject, Host};
use crate::serializer::{serialize_graph, GraphDocument};

/// Delete payload stored in the backup file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeletedGraphBackup {
    pub function_name: String,
    pub graph_data: GraphDocument,
}

#[derive(Debug, Clone)]
pub struct DeleteOutcome {
    pub subject_path: String,
    pub function_name: String,
    pub nodes_removed: usize,
    pub backup: BackupRecord,
}

/// Remove a named graph from a subject, backing up its full document first.
pub fn delete_function(
    host: &mut dyn Host,
    store: &ExportStore,
    subject_path: &str,
    function_name: &str,
    backup: BackupOptions,
) -> Result<DeleteOutcome> {
    let subject = resolve_subject(&*host, subject_path)?;
    let graph = subject
        .deletable_graph(function_name)
        .ok_or_else(|| GraftError::not_found("Function graph", function_name))?;
    let nodes_removed = graph.node_count();

    let record = take_backup(
        store,
        Artifact::DeleteBackup,
        &format!("{}_{}", subject.name, function_name),
        Backup::new(
            &subject.path,
            DeletedGraphBackup {
                function_name: function_name.to_string(),
                graph_data: serialize_graph(Some(graph), true),
            },
        ),
        backup,
    )?;

    host.remove_graph(&subject.path, function_name)?;
    host.mark_modified(&subject.path)?;

    info!(subject = %subject.path, function = function_name, nodes_removed, "deleted graph");
    Ok(DeleteOutcome {
        subject_path: subject.path,
        function_name: function_name.to_string(),
        nodes_removed,
        backup: record,
    })
}
