//! CLI module for Graft.
//!
//! Commands:
//! - Read: export, deps, refs, functions, verify, show
//! - Write: redirect, delete, reparent, status
//! - System: call, list, serve

pub mod read;
pub mod write;

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::backup::{Artifact, ExportStore};
use crate::commands::{run_typed, CommandRegistry, Context, Operation, Validate};
use crate::config::GraftConfig;
use crate::host::MemoryHost;
use crate::mcp::{self, GraftMcp};
use crate::status::StatusStore;

#[derive(Parser)]
#[command(name = "graft")]
#[command(about = "Graft - Migration tooling for node-graph assets", long_about = None)]
pub struct Cli {
    /// Project snapshot to operate on
    #[arg(short, long, default_value = "graft.project.json")]
    pub project: PathBuf,

    /// Config file (missing file means defaults)
    #[arg(short, long, default_value = "graft.toml")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    // ─── Read (6 commands) ────────────────────────────────────────
    /// Export a subject's graphs to a timestamped JSON file
    Export {
        /// Subject path or bare name
        subject: String,

        /// Only graphs whose name contains this text
        #[arg(short, long)]
        graph: Option<String>,

        /// Leave component templates out
        #[arg(long)]
        no_components: bool,

        /// Include pin default values
        #[arg(long)]
        defaults: bool,
    },

    /// Classify a subject's dependencies and count its calls
    Deps {
        subject: String,

        /// Keep built-in engine dependencies
        #[arg(short, long)]
        engine: bool,
    },

    /// List referencers of an asset
    Refs {
        target: String,

        /// Also list call sites of this function
        #[arg(short, long)]
        function: Option<String>,
    },

    /// List a subject's functions, events, and macros
    Functions {
        subject: String,

        /// Walk the parent chain for inherited functions
        #[arg(short, long)]
        inherited: bool,
    },

    /// Check that no other subject still calls a function
    Verify {
        subject: String,
        function: String,
    },

    /// Print the latest export or backup written for a subject
    Show {
        /// Subject name as used in artifact file names
        subject: String,

        #[arg(short, long, value_enum, default_value = "export")]
        kind: ShowKind,
    },

    // ─── Write (4 commands) ───────────────────────────────────────
    /// Rebind calls from one function to another (dry run unless --apply)
    Redirect {
        subject: String,
        function: String,
        target_class: String,
        target_function: String,

        /// Apply the change instead of previewing it
        #[arg(long)]
        apply: bool,

        #[arg(long)]
        no_backup: bool,
    },

    /// Delete a function graph
    Delete {
        subject: String,
        function: String,

        #[arg(long)]
        no_backup: bool,
    },

    /// Change a subject's parent type
    Reparent {
        subject: String,
        new_parent: String,

        #[arg(long)]
        no_backup: bool,
    },

    /// Read or update a subject's migration ledger
    Status {
        subject: String,

        /// analysis, context, codemap, generation, validation, integration
        #[arg(short, long)]
        step: Option<String>,

        /// pending, in_progress, completed, failed
        #[arg(long)]
        status: Option<String>,

        /// Output file produced by the step
        #[arg(short, long)]
        output: Option<String>,

        /// Issue to record (repeatable)
        #[arg(long = "issue")]
        issues: Vec<String>,
    },

    // ─── System ───────────────────────────────────────────────────
    /// Run any registered command with JSON parameters
    Call {
        command: String,

        /// JSON object of parameters
        #[arg(default_value = "{}")]
        params: String,
    },

    /// List registered commands
    List,

    /// Serve every command as an MCP tool over stdio
    Serve,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum ShowKind {
    Export,
    Redirect,
    Delete,
    Reparent,
}

impl From<ShowKind> for Artifact {
    fn from(kind: ShowKind) -> Self {
        match kind {
            ShowKind::Export => Artifact::Export,
            ShowKind::Redirect => Artifact::RedirectBackup,
            ShowKind::Delete => Artifact::DeleteBackup,
            ShowKind::Reparent => Artifact::ReparentBackup,
        }
    }
}

/// Loaded project state for one invocation.
pub struct Session {
    pub config: GraftConfig,
    pub host: MemoryHost,
    pub project: PathBuf,
    pub store: ExportStore,
    pub status: StatusStore,
}

impl Session {
    pub fn open(project: &Path, config_path: &Path, config: GraftConfig) -> Result<Self> {
        let mut host = MemoryHost::load(project)
            .with_context(|| format!("Failed to load project snapshot {}", project.display()))?;
        host.apply_config(&config.host);

        Ok(Self {
            store: ExportStore::new(config.resolve_export_dir(config_path)),
            status: StatusStore::new(config.resolve_status_dir(config_path)),
            host,
            project: project.to_path_buf(),
            config,
        })
    }

    /// Run a typed operation and persist the snapshot if it changed anything.
    pub fn run<Req, Resp>(&mut self, req: Req, op: Operation<Req, Resp>) -> Result<Value>
    where
        Req: Validate,
        Resp: Serialize,
    {
        let body = {
            let mut ctx = Context::new(&mut self.host, &self.store, &self.status, &self.config);
            run_typed(&mut ctx, req, op)
        };
        self.persist()?;
        Ok(body)
    }

    /// Run a registered command by name from raw JSON parameters.
    pub fn call(&mut self, registry: &CommandRegistry, name: &str, params: &str) -> Result<Value> {
        let body = {
            let mut ctx = Context::new(&mut self.host, &self.store, &self.status, &self.config);
            registry.execute(&mut ctx, name, params)
        };
        self.persist()?;
        Ok(body)
    }

    fn persist(&mut self) -> Result<()> {
        let modified = self.host.take_modified();
        if modified.is_empty() {
            return Ok(());
        }
        self.host.save(&self.project)?;
        info!(subjects = ?modified, path = %self.project.display(), "saved project snapshot");
        Ok(())
    }
}

/// Execute one CLI invocation. Returns the envelope to print, or `None`
/// for commands that produce no envelope.
pub async fn run(cli: Cli, config: GraftConfig) -> Result<Option<Value>> {
    match cli.command {
        Commands::Show { subject, kind } => {
            let store = ExportStore::new(config.resolve_export_dir(&cli.config));
            read::show(&store, &subject, kind.into()).map(Some)
        }

        Commands::List => {
            let registry = CommandRegistry::with_builtin_commands();
            for name in registry.names() {
                if let Some(command) = registry.get(name) {
                    println!("{:<32} {}", name, command.description());
                }
            }
            Ok(None)
        }

        Commands::Serve => {
            let session = Session::open(&cli.project, &cli.config, config)?;
            info!(project = %session.project.display(), "starting MCP server on stdio");
            let service = GraftMcp::new(
                session.host,
                Some(session.project),
                session.store,
                session.status,
                session.config,
            );
            mcp::run(service).await?;
            Ok(None)
        }

        command => {
            let mut session = Session::open(&cli.project, &cli.config, config)?;
            dispatch(&mut session, command).map(Some)
        }
    }
}

fn dispatch(session: &mut Session, command: Commands) -> Result<Value> {
    match command {
        Commands::Export {
            subject,
            graph,
            no_components,
            defaults,
        } => read::export(session, subject, graph, !no_components, defaults),
        Commands::Deps { subject, engine } => read::deps(session, subject, engine),
        Commands::Refs { target, function } => read::refs(session, target, function),
        Commands::Functions { subject, inherited } => read::functions(session, subject, inherited),
        Commands::Verify { subject, function } => read::verify(session, subject, function),

        Commands::Redirect {
            subject,
            function,
            target_class,
            target_function,
            apply,
            no_backup,
        } => write::redirect(
            session,
            subject,
            function,
            target_class,
            target_function,
            !apply,
            !no_backup,
        ),
        Commands::Delete {
            subject,
            function,
            no_backup,
        } => write::delete(session, subject, function, !no_backup),
        Commands::Reparent {
            subject,
            new_parent,
            no_backup,
        } => write::reparent(session, subject, new_parent, !no_backup),
        Commands::Status {
            subject,
            step,
            status,
            output,
            issues,
        } => write::status(session, subject, step, status, output, issues),

        Commands::Call { command, params } => {
            let registry = CommandRegistry::with_builtin_commands();
            session.call(&registry, &command, &params)
        }

        Commands::Show { .. } | Commands::List | Commands::Serve => {
            anyhow::bail!("command does not run against a session")
        }
    }
}
