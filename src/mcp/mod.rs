//
//  mod.rs
//  Graft
//
//  Created by hak (tharun)
//

pub mod tools;

use rmcp::{
    handler::server::router::tool::ToolRouter,
    model::*,
    tool_handler, ServerHandler, ServiceExt,
};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use crate::backup::ExportStore;
use crate::config::GraftConfig;
use crate::host::MemoryHost;
use crate::status::StatusStore;

#[derive(Clone)]
pub struct GraftMcp {
    pub(crate) tool_router: ToolRouter<GraftMcp>,
    pub(crate) host: Arc<Mutex<MemoryHost>>,
    /// Snapshot file rewritten after every mutating call.
    pub(crate) snapshot: Option<PathBuf>,
    pub(crate) store: Arc<ExportStore>,
    pub(crate) status: Arc<StatusStore>,
    pub(crate) config: Arc<GraftConfig>,
}

impl std::fmt::Debug for GraftMcp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraftMcp")
            .field("snapshot", &self.snapshot)
            .field("exports", &self.store.dir())
            .finish()
    }
}

#[tool_handler]
impl ServerHandler for GraftMcp {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .build(),
            server_info: Implementation {
                name: "graft".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                title: None,
                description: None,
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Graft: migration tooling for node-graph assets. \
                 \n\n'export_graph' writes a subject's graphs to JSON. \
                 \n'get_dependencies' and 'find_references' show what a subject uses and who uses it. \
                 \n'get_functions' lists functions, events, and macros. \
                 \n'redirect_calls' rebinds call nodes (dry_run=true by default; run it first). \
                 \n'verify_no_external_references' before 'delete_function'. \
                 \n'reparent' changes the parent type. Mutations write a backup first. \
                 \n'migration_status' tracks per-subject migration steps.".into()
            ),
        }
    }
}

/// Run the MCP server on stdio.
pub async fn run(service: GraftMcp) -> anyhow::Result<()> {
    let server = service.serve(rmcp::transport::stdio()).await?;
    server.waiting().await?;
    Ok(())
}
