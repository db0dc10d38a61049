//! Write operations: redirect, delete, reparent, status
//!
//! Mutations save the project snapshot when they change a subject.

use anyhow::Result;
use serde_json::Value;

use super::Session;
use crate::commands::{
    handlers, DeleteFunctionRequest, MigrationStatusRequest, RedirectCallsRequest, ReparentRequest,
};

pub fn redirect(
    session: &mut Session,
    source_subject: String,
    source_function: String,
    target_class: String,
    target_function: String,
    dry_run: bool,
    backup: bool,
) -> Result<Value> {
    session.run(
        RedirectCallsRequest {
            source_subject,
            source_function,
            target_class,
            target_function,
            dry_run,
            backup,
        },
        handlers::redirect_calls,
    )
}

pub fn delete(session: &mut Session, subject_path: String, function_name: String, backup: bool) -> Result<Value> {
    session.run(
        DeleteFunctionRequest {
            subject_path,
            function_name,
            backup,
        },
        handlers::delete_function,
    )
}

pub fn reparent(session: &mut Session, subject_path: String, new_parent_class: String, backup: bool) -> Result<Value> {
    session.run(
        ReparentRequest {
            subject_path,
            new_parent_class,
            backup,
        },
        handlers::reparent,
    )
}

pub fn status(
    session: &mut Session,
    subject_path: String,
    step: Option<String>,
    status: Option<String>,
    output: Option<String>,
    issues: Vec<String>,
) -> Result<Value> {
    session.run(
        MigrationStatusRequest {
            subject_path,
            step,
            status,
            output,
            issues,
        },
        handlers::migration_status,
    )
}
