//
//  handlers.rs
//  Graft
//
//  Created by hak (tharun)
//

use tracing::info;

use super::requests::*;
use super::responses::*;
use super::Context;
use crate::analysis::{self, ExternalReferenceReport, ReferenceQuery};
use crate::backup::Artifact;
use crate::error::Result;
use crate::host::resolve_subject;
use crate::mutation::{self, RedirectRequest};
use crate::serializer::export_subject;
use crate::status::{MigrationStatus, MigrationStep, StepStatus};

// ─── Read ───────────────────────────────────────────────────────

pub fn export_graph(ctx: &mut Context<'_>, req: ExportGraphRequest) -> Result<ExportGraphResponse> {
    let subject = resolve_subject(&*ctx.host, &req.subject_path)?;
    let doc = export_subject(
        &subject,
        req.graph_name.as_deref(),
        req.include_components,
        req.include_defaults,
    );
    let path = ctx.store.write(Artifact::Export, &subject.name, &doc)?;

    info!(subject = %subject.path, path = %path.display(), graphs = doc.graphs.len(), "exported subject");
    Ok(ExportGraphResponse {
        file_path: path.display().to_string(),
        subject_name: subject.name,
        graph_count: doc.graphs.len(),
        node_count: doc.node_count(),
    })
}

pub fn get_dependencies(ctx: &mut Context<'_>, req: GetDependenciesRequest) -> Result<DependenciesResponse> {
    let set = analysis::analyze_dependencies(
        &*ctx.host,
        &req.subject_path,
        req.include_engine_types,
        req.recursive,
    )?;
    let total_dependencies = set.len();

    Ok(DependenciesResponse {
        subject_path: req.subject_path,
        assets: set.assets.into_iter().collect(),
        sub_subjects: set.sub_subjects.into_iter().collect(),
        native_types: set.native_types.into_iter().collect(),
        function_calls: set
            .function_calls
            .into_iter()
            .map(|(function, call_count)| FunctionCallCount {
                function,
                call_count,
            })
            .collect(),
        total_dependencies,
    })
}

pub fn find_references(ctx: &mut Context<'_>, req: FindReferencesRequest) -> Result<ReferencesResponse> {
    let query = ReferenceQuery {
        target_function: req.target_function.as_deref(),
        search_scope: Some(req.search_scope.as_str()),
        include_soft_references: req.include_soft_references,
    };
    let referencers = analysis::find_references(&*ctx.host, &req.target_path, &query);

    Ok(ReferencesResponse {
        target_path: req.target_path.clone(),
        target_function: req.target_function.clone(),
        referencer_count: referencers.len(),
        referencers,
    })
}

pub fn get_functions(ctx: &mut Context<'_>, req: GetFunctionsRequest) -> Result<FunctionsResponse> {
    let listing = analysis::list_functions(&*ctx.host, &req.subject_path, req.include_inherited)?;
    Ok(FunctionsResponse {
        function_count: listing.functions.len(),
        listing,
    })
}

pub fn verify_no_external_references(
    ctx: &mut Context<'_>,
    req: VerifyReferencesRequest,
) -> Result<ExternalReferenceReport> {
    analysis::verify_no_external_references(&*ctx.host, &req.subject_path, &req.function_name)
}

// ─── Mutate ─────────────────────────────────────────────────────

pub fn redirect_calls(ctx: &mut Context<'_>, req: RedirectCallsRequest) -> Result<RedirectResponse> {
    let backup = ctx.backup_options(req.backup);
    let outcome = mutation::redirect_calls(
        &mut *ctx.host,
        ctx.store,
        &RedirectRequest {
            source_subject: &req.source_subject,
            source_function: &req.source_function,
            target_class: &req.target_class,
            target_function: &req.target_function,
            dry_run: req.dry_run,
        },
        backup,
    )?;

    let (backup_path, nodes_failed) = match &outcome.status {
        mutation::RedirectStatus::Applied { backup, failed, .. } => (
            backup.reported_path(),
            failed.iter().map(|id| id.to_string()).collect(),
        ),
        _ => (None, Vec::new()),
    };

    Ok(RedirectResponse {
        source_subject: outcome.subject_path.clone(),
        dry_run: req.dry_run,
        nodes_found: outcome.changes.len(),
        nodes_redirected: outcome.redirected(),
        nodes_failed,
        backup_path,
        requires_compile: outcome.requires_compile(),
        message: outcome.message(),
        changes: outcome.changes,
    })
}

pub fn delete_function(ctx: &mut Context<'_>, req: DeleteFunctionRequest) -> Result<DeleteFunctionResponse> {
    let backup = ctx.backup_options(req.backup);
    let outcome = mutation::delete_function(
        &mut *ctx.host,
        ctx.store,
        &req.subject_path,
        &req.function_name,
        backup,
    )?;

    Ok(DeleteFunctionResponse {
        message: format!(
            "Deleted function '{}' ({} nodes)",
            outcome.function_name, outcome.nodes_removed
        ),
        subject_path: outcome.subject_path,
        function_name: outcome.function_name,
        nodes_removed: outcome.nodes_removed,
        backup_path: outcome.backup.reported_path(),
        requires_compile: true,
    })
}

pub fn reparent(ctx: &mut Context<'_>, req: ReparentRequest) -> Result<ReparentResponse> {
    let backup = ctx.backup_options(req.backup);
    let outcome = mutation::reparent(
        &mut *ctx.host,
        ctx.store,
        &req.subject_path,
        &req.new_parent_class,
        &ctx.config.host,
        backup,
    )?;

    Ok(ReparentResponse {
        old_parent_class: outcome.old_parent_name().to_string(),
        message: format!(
            "Reparented from {} to {}",
            outcome.old_parent_name(),
            outcome.new_parent.name
        ),
        warning: (!outcome.compatible)
            .then(|| "Reparenting to potentially incompatible class".to_string()),
        backup_path: outcome.backup.reported_path(),
        new_parent_class: outcome.new_parent.name,
        new_parent_class_path: outcome.new_parent.path,
        subject_path: outcome.subject_path,
        requires_compile: true,
    })
}

// ─── Ledger ─────────────────────────────────────────────────────

/// Read the ledger, or update one step when `step` is given. Creates the
/// ledger on first use.
pub fn migration_status(ctx: &mut Context<'_>, req: MigrationStatusRequest) -> Result<MigrationStatusResponse> {
    let subject = resolve_subject(&*ctx.host, &req.subject_path)?;
    let mut ledger = ctx
        .status
        .load(&subject.name)?
        .unwrap_or_else(|| MigrationStatus::new(&subject.path, &subject.name));

    if let (Some(step), Some(status)) = (req.step.as_deref(), req.status.as_deref()) {
        let step: MigrationStep = step.parse()?;
        let status: StepStatus = status.parse()?;
        ledger.update_step(step, status, req.output.as_deref(), &req.issues);
        info!(subject = %subject.path, %step, ?status, "updated migration step");
    }

    let path = ctx.status.save(&ledger)?;
    Ok(MigrationStatusResponse {
        status_path: path.display().to_string(),
        ledger,
    })
}
