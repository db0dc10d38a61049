//! Request/response command surface.
//!
//! Every operation takes one JSON document and returns one. The
//! registry turns any error into `{"success": false, "error": ...}`; a
//! successful body gets `"success": true` merged in.

pub mod handlers;
pub mod requests;
pub mod responses;

pub use requests::*;
pub use responses::*;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::backup::ExportStore;
use crate::config::GraftConfig;
use crate::error::{GraftError, Result};
use crate::host::Host;
use crate::mutation::BackupOptions;
use crate::status::StatusStore;

/// Everything an operation may touch, handed in per call.
pub struct Context<'a> {
    pub host: &'a mut dyn Host,
    pub store: &'a ExportStore,
    pub status: &'a StatusStore,
    pub config: &'a GraftConfig,
}

impl<'a> Context<'a> {
    pub fn new(
        host: &'a mut dyn Host,
        store: &'a ExportStore,
        status: &'a StatusStore,
        config: &'a GraftConfig,
    ) -> Self {
        Self {
            host,
            store,
            status,
            config,
        }
    }

    pub fn backup_options(&self, enabled: bool) -> BackupOptions {
        BackupOptions {
            enabled,
            on_failure: self.config.backup.on_write_failure,
        }
    }
}

/// A named operation over untyped JSON parameters.
pub trait Command: Send + Sync {
    fn name(&self) -> &'static str;
    fn description(&self) -> &'static str;
    fn execute(&self, ctx: &mut Context<'_>, params: Value) -> Result<Value>;
}

pub type Operation<Req, Resp> = fn(&mut Context<'_>, Req) -> Result<Resp>;

/// Adapts a typed handler: parse, validate, run, serialize.
struct TypedCommand<Req, Resp> {
    name: &'static str,
    description: &'static str,
    op: Operation<Req, Resp>,
}

impl<Req, Resp> Command for TypedCommand<Req, Resp>
where
    Req: DeserializeOwned + Validate,
    Resp: Serialize,
{
    fn name(&self) -> &'static str {
        self.name
    }

    fn description(&self) -> &'static str {
        self.description
    }

    fn execute(&self, ctx: &mut Context<'_>, params: Value) -> Result<Value> {
        let req: Req = serde_json::from_value(params)
            .map_err(|e| GraftError::InvalidInput(format!("Invalid parameters: {}", e)))?;
        req.validate()?;
        let resp = (self.op)(ctx, req)?;
        Ok(serde_json::to_value(resp)?)
    }
}

/// Explicitly constructed set of commands, looked up by name.
#[derive(Default)]
pub struct CommandRegistry {
    commands: Vec<Box<dyn Command>>,
}

impl CommandRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every migration command.
    pub fn with_builtin_commands() -> Self {
        let mut registry = Self::new();
        registry.register(
            "export_graph",
            "Write a subject's graphs to a timestamped JSON export",
            handlers::export_graph,
        );
        registry.register(
            "get_dependencies",
            "Classify a subject's dependencies and count its function calls",
            handlers::get_dependencies,
        );
        registry.register(
            "find_references",
            "List direct referencers of an asset, with call sites of a function",
            handlers::find_references,
        );
        registry.register(
            "redirect_calls",
            "Rebind call nodes from one function to another (dry run by default)",
            handlers::redirect_calls,
        );
        registry.register(
            "delete_function",
            "Remove a function graph from a subject after backing it up",
            handlers::delete_function,
        );
        registry.register(
            "reparent",
            "Change a subject's parent type",
            handlers::reparent,
        );
        registry.register(
            "get_functions",
            "List a subject's functions, events, and macros",
            handlers::get_functions,
        );
        registry.register(
            "verify_no_external_references",
            "Check that no other subject still calls a function before deleting it",
            handlers::verify_no_external_references,
        );
        registry.register(
            "migration_status",
            "Read or update a subject's migration ledger",
            handlers::migration_status,
        );
        registry
    }

    /// Register a typed handler. Returns false if the name was already taken.
    pub fn register<Req, Resp>(
        &mut self,
        name: &'static str,
        description: &'static str,
        op: Operation<Req, Resp>,
    ) -> bool
    where
        Req: DeserializeOwned + Validate + 'static,
        Resp: Serialize + 'static,
    {
        self.register_command(Box::new(TypedCommand {
            name,
            description,
            op,
        }))
    }

    pub fn register_command(&mut self, command: Box<dyn Command>) -> bool {
        if self.get(command.name()).is_some() {
            return false;
        }
        self.commands.push(command);
        true
    }

    pub fn unregister(&mut self, name: &str) -> bool {
        let before = self.commands.len();
        self.commands.retain(|c| c.name() != name);
        self.commands.len() != before
    }

    pub fn get(&self, name: &str) -> Option<&dyn Command> {
        self.commands
            .iter()
            .find(|c| c.name() == name)
            .map(|c| c.as_ref())
    }

    /// Names in registration order.
    pub fn names(&self) -> Vec<&'static str> {
        self.commands.iter().map(|c| c.name()).collect()
    }

    pub fn dispatch(&self, ctx: &mut Context<'_>, name: &str, params: Value) -> Result<Value> {
        let command = self
            .get(name)
            .ok_or_else(|| GraftError::UnknownCommand(name.to_string()))?;
        debug!(command = name, "dispatching");
        command.execute(ctx, params)
    }

    /// Run a command from raw JSON text and wrap the result in the envelope.
    pub fn execute(&self, ctx: &mut Context<'_>, name: &str, params: &str) -> Value {
        let params = if params.trim().is_empty() {
            Ok(json!({}))
        } else {
            serde_json::from_str::<Value>(params)
                .map_err(|e| GraftError::InvalidInput(format!("Invalid JSON parameters: {}", e)))
        };
        envelope(params.and_then(|p| self.dispatch(ctx, name, p)))
    }
}

/// `{success: true, ...body}` or `{success: false, error}`.
pub fn envelope(outcome: Result<Value>) -> Value {
    match outcome {
        Ok(Value::Object(mut body)) => {
            body.insert("success".to_string(), Value::Bool(true));
            Value::Object(body)
        }
        Ok(other) => json!({ "success": true, "result": other }),
        Err(e) => {
            warn!(error = %e, "command failed");
            json!({ "success": false, "error": e.to_string() })
        }
    }
}

/// Run a typed handler outside the registry, still producing the envelope.
pub fn run_typed<Req, Resp>(ctx: &mut Context<'_>, req: Req, op: Operation<Req, Resp>) -> Value
where
    Req: Validate,
    Resp: Serialize,
{
    envelope(
        req.validate()
            .and_then(|_| op(ctx, req))
            .and_then(|resp| Ok(serde_json::to_value(resp)?)),
    )
}
