//
//  redirect.rs
//  Graft
//
//  Created by hak (tharun)
//

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::{take_backup, BackupOptions, BackupRecord};
use crate::backup::{Artifact, Backup, ExportStore};
use crate::error::{GraftError, Result};
use crate::host::{resolve_subject, Host};
use crate::model::{Callable, NodeId, Subject, TypeRef};

/// One call node that would be (or was) redirected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallChange {
    pub graph: String,
    pub node_id: NodeId,
    pub original_function: String,
    pub new_function: String,
    pub pos_x: i32,
    pub pos_y: i32,
}

/// Redirect payload stored in the backup file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedirectBackup {
    pub original_state: Vec<CallChange>,
}

#[derive(Debug, Clone, Copy)]
pub struct RedirectRequest<'a> {
    pub source_subject: &'a str,
    pub source_function: &'a str,
    pub target_class: &'a str,
    pub target_function: &'a str,
    pub dry_run: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedirectStatus {
    NoMatches,
    Preview,
    Applied {
        redirected: usize,
        failed: Vec<NodeId>,
        backup: BackupRecord,
    },
}

#[derive(Debug, Clone)]
pub struct RedirectOutcome {
    pub subject_path: String,
    pub changes: Vec<CallChange>,
    pub status: RedirectStatus,
}

impl RedirectOutcome {
    pub fn message(&self) -> String {
        match &self.status {
            RedirectStatus::NoMatches => "No matching function calls found to redirect".to_string(),
            RedirectStatus::Preview => format!(
                "Dry run: Found {} function calls to redirect",
                self.changes.len()
            ),
            RedirectStatus::Applied { redirected, .. } => {
                format!("Successfully redirected {} function calls", redirected)
            }
        }
    }

    pub fn requires_compile(&self) -> bool {
        matches!(self.status, RedirectStatus::Applied { .. })
    }

    pub fn redirected(&self) -> Option<usize> {
        match &self.status {
            RedirectStatus::Applied { redirected, .. } => Some(*redirected),
            _ => None,
        }
    }
}

/// Matching call sites, found but not yet rewritten.
#[derive(Debug, Clone)]
pub struct RedirectPlan {
    subject_path: String,
    subject_name: String,
    target_class: String,
    target_function: String,
    changes: Vec<CallChange>,
}

impl RedirectPlan {
    /// Collect every call to `source_function` across all graphs.
    pub fn discover(subject: &Subject, source_function: &str, target_class: &str, target_function: &str) -> Self {
        let new_function = format!("{}::{}", target_class, target_function);
        let changes = subject
            .calls_to(source_function)
            .filter_map(|site| {
                Some(CallChange {
                    graph: site.graph.name.clone(),
                    node_id: site.node.id,
                    original_function: site.node.call_key()?,
                    new_function: new_function.clone(),
                    pos_x: site.node.position.x,
                    pos_y: site.node.position.y,
                })
            })
            .collect();

        Self {
            subject_path: subject.path.clone(),
            subject_name: subject.name.clone(),
            target_class: target_class.to_string(),
            target_function: target_function.to_string(),
            changes,
        }
    }

    pub fn changes(&self) -> &[CallChange] {
        &self.changes
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn no_matches(self) -> RedirectOutcome {
        self.finish(RedirectStatus::NoMatches)
    }

    pub fn preview(self) -> RedirectOutcome {
        self.finish(RedirectStatus::Preview)
    }

    /// Resolve the target, back up the change list, then rewrite each node.
    ///
    /// Target resolution failures abort before any mutation. A node the
    /// host refuses to rewrite is logged and skipped; the rest still apply.
    pub fn apply(mut self, host: &mut dyn Host, store: &ExportStore, backup: BackupOptions) -> Result<RedirectOutcome> {
        let owner = resolve_type(&*host, &self.target_class)
            .ok_or_else(|| GraftError::not_found("Target class", self.target_class.as_str()))?;
        let target = host
            .find_function(&owner, &self.target_function)
            .ok_or_else(|| GraftError::not_found("Target function", self.target_function.as_str()))?;

        // Report the resolved owner name even when the target was given as a path
        let new_function = target.to_string();
        for change in &mut self.changes {
            change.new_function = new_function.clone();
        }

        let record = take_backup(
            store,
            Artifact::RedirectBackup,
            &self.subject_name,
            Backup::new(
                &self.subject_path,
                RedirectBackup {
                    original_state: self.changes.clone(),
                },
            ),
            backup,
        )?;

        let (redirected, failed) = self.rewrite(host, &target);
        host.mark_modified(&self.subject_path)?;

        info!(
            subject = %self.subject_path,
            target = %target,
            redirected,
            failed = failed.len(),
            "redirected function calls"
        );
        Ok(self.finish(RedirectStatus::Applied {
            redirected,
            failed,
            backup: record,
        }))
    }

    fn rewrite(&self, host: &mut dyn Host, target: &Callable) -> (usize, Vec<NodeId>) {
        let mut redirected = 0;
        let mut failed = Vec::new();
        for change in &self.changes {
            match host.set_call_target(&self.subject_path, change.node_id, target) {
                Ok(()) => redirected += 1,
                Err(e) => {
                    warn!(node = %change.node_id, graph = %change.graph, error = %e, "call rewrite failed");
                    failed.push(change.node_id);
                }
            }
        }
        (redirected, failed)
    }

    fn finish(self, status: RedirectStatus) -> RedirectOutcome {
        RedirectOutcome {
            subject_path: self.subject_path,
            changes: self.changes,
            status,
        }
    }
}

fn resolve_type(host: &dyn Host, name: &str) -> Option<TypeRef> {
    host.find_type(name).or_else(|| host.load_type(name))
}

/// Discover, then stop at the preview or apply depending on `dry_run`.
pub fn redirect_calls(
    host: &mut dyn Host,
    store: &ExportStore,
    request: &RedirectRequest<'_>,
    backup: BackupOptions,
) -> Result<RedirectOutcome> {
    let subject = resolve_subject(&*host, request.source_subject)?;
    let plan = RedirectPlan::discover(
        &subject,
        request.source_function,
        request.target_class,
        request.target_function,
    );

    if plan.is_empty() {
        return Ok(plan.no_matches());
    }
    if request.dry_run {
        return Ok(plan.preview());
    }
    plan.apply(host, store, backup)
}
