//
//  tools.rs
//  Graft
//
//  Created by hak (tharun)
//

use rmcp::{
    handler::server::wrapper::Parameters,
    model::*,
    tool, tool_router,
};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tracing::{error, info};

use super::GraftMcp;
use crate::backup::ExportStore;
use crate::commands::{handlers, run_typed, Context, Operation, Validate};
use crate::commands::{
    DeleteFunctionRequest, ExportGraphRequest, FindReferencesRequest, GetDependenciesRequest,
    GetFunctionsRequest, MigrationStatusRequest, RedirectCallsRequest, ReparentRequest,
    VerifyReferencesRequest,
};
use crate::config::GraftConfig;
use crate::host::MemoryHost;
use crate::status::StatusStore;

#[tool_router]
impl GraftMcp {
    pub fn new(
        host: MemoryHost,
        snapshot: Option<PathBuf>,
        store: ExportStore,
        status: StatusStore,
        config: GraftConfig,
    ) -> Self {
        Self {
            tool_router: Self::tool_router(),
            host: Arc::new(Mutex::new(host)),
            snapshot,
            store: Arc::new(store),
            status: Arc::new(status),
            config: Arc::new(config),
        }
    }

    fn err(msg: impl Into<String>) -> ErrorData {
        ErrorData {
            code: ErrorCode::INTERNAL_ERROR,
            message: std::borrow::Cow::from(msg.into()),
            data: None,
        }
    }

    /// Run one command against the shared host and return its envelope.
    ///
    /// Persists the snapshot when the command modified any subject.
    fn envelope<Req, Resp>(&self, req: Req, op: Operation<Req, Resp>) -> Result<serde_json::Value, ErrorData>
    where
        Req: Validate,
        Resp: Serialize,
    {
        let mut host = self
            .host
            .lock()
            .map_err(|_| Self::err("host state lock poisoned"))?;

        let body = {
            let mut ctx = Context::new(&mut *host, &self.store, &self.status, &self.config);
            run_typed(&mut ctx, req, op)
        };

        let modified = host.take_modified();
        if let (Some(path), false) = (&self.snapshot, modified.is_empty()) {
            match host.save(path) {
                Ok(()) => info!(subjects = ?modified, "persisted project snapshot"),
                Err(e) => {
                    error!(error = %e, "failed to persist project snapshot");
                    return Err(Self::err(format!("Failed to persist snapshot: {}", e)));
                }
            }
        }

        Ok(body)
    }

    fn call<Req, Resp>(&self, req: Req, op: Operation<Req, Resp>) -> Result<CallToolResult, ErrorData>
    where
        Req: Validate,
        Resp: Serialize,
    {
        let body = self.envelope(req, op)?;
        let output = serde_json::to_string_pretty(&body)
            .map_err(|e| Self::err(format!("JSON encode error: {}", e)))?;
        Ok(CallToolResult::success(vec![Content::text(output)]))
    }

    #[tool(description = "Export a subject's graphs (nodes, pins, connections), variables, and components to a timestamped JSON file. Returns the file path and graph/node counts.")]
    async fn export_graph(
        &self,
        Parameters(req): Parameters<ExportGraphRequest>,
    ) -> Result<CallToolResult, ErrorData> {
        self.call(req, handlers::export_graph)
    }

    #[tool(description = "Classify everything a subject depends on into assets, sub-subjects, and native types, and count its function calls by Owner::Function.")]
    async fn get_dependencies(
        &self,
        Parameters(req): Parameters<GetDependenciesRequest>,
    ) -> Result<CallToolResult, ErrorData> {
        self.call(req, handlers::get_dependencies)
    }

    #[tool(description = "List direct referencers of an asset. With target_function, also lists each call site of that function inside referencing subjects.")]
    async fn find_references(
        &self,
        Parameters(req): Parameters<FindReferencesRequest>,
    ) -> Result<CallToolResult, ErrorData> {
        self.call(req, handlers::find_references)
    }

    #[tool(description = "Rebind every call to source_function in a subject to target_class::target_function. dry_run=true (default) only reports the change list.")]
    async fn redirect_calls(
        &self,
        Parameters(req): Parameters<RedirectCallsRequest>,
    ) -> Result<CallToolResult, ErrorData> {
        self.call(req, handlers::redirect_calls)
    }

    #[tool(description = "Delete a function graph from a subject. The full graph is backed up first unless backup=false.")]
    async fn delete_function(
        &self,
        Parameters(req): Parameters<DeleteFunctionRequest>,
    ) -> Result<CallToolResult, ErrorData> {
        self.call(req, handlers::delete_function)
    }

    #[tool(description = "Change a subject's parent type. Tries the exact name, a load by name, then the instance and object prefixed names. Warns on incompatible parents.")]
    async fn reparent(
        &self,
        Parameters(req): Parameters<ReparentRequest>,
    ) -> Result<CallToolResult, ErrorData> {
        self.call(req, handlers::reparent)
    }

    #[tool(description = "List a subject's function graphs, event entry points, event graphs, and macros, with node counts and override flags.")]
    async fn get_functions(
        &self,
        Parameters(req): Parameters<GetFunctionsRequest>,
    ) -> Result<CallToolResult, ErrorData> {
        self.call(req, handlers::get_functions)
    }

    #[tool(description = "Check whether any other subject still calls a function. Run before delete_function.")]
    async fn verify_no_external_references(
        &self,
        Parameters(req): Parameters<VerifyReferencesRequest>,
    ) -> Result<CallToolResult, ErrorData> {
        self.call(req, handlers::verify_no_external_references)
    }

    #[tool(description = "Read a subject's migration ledger, or update one step (analysis, context, codemap, generation, validation, integration).")]
    async fn migration_status(
        &self,
        Parameters(req): Parameters<MigrationStatusRequest>,
    ) -> Result<CallToolResult, ErrorData> {
        self.call(req, handlers::migration_status)
    }
}
