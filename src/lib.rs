//! # Graft
//!
//! Migration tooling for node-graph assets.
//!
//! Graft reads a subject's graphs through a [`Host`], exports them as
//! deterministic JSON, analyzes what they depend on and who depends on
//! them, and applies backed-up structural edits: call redirection,
//! function deletion, and reparenting.
//!
//! ## Key Features
//!
//! - **Deterministic export**: Same subject always serializes to the same document
//! - **Dry run first**: Redirects report their change list before touching anything
//! - **Backups**: Every mutation writes the pre-change state to a timestamped file
//! - **One envelope**: Every command answers `{"success": ..., "error": ...}`
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use graft::{CommandRegistry, Context, ExportStore, GraftConfig, MemoryHost, StatusStore};
//! use std::path::Path;
//!
//! let config = GraftConfig::load(Path::new("graft.toml"));
//! let mut host = MemoryHost::load(Path::new("graft.project.json")).unwrap();
//! let store = ExportStore::new("Saved/Graft/Exports");
//! let status = StatusStore::new("Saved/Graft/Migrations");
//!
//! let mut ctx = Context::new(&mut host, &store, &status, &config);
//! let registry = CommandRegistry::with_builtin_commands();
//!
//! // Preview a redirect; nothing is modified while dry_run is true
//! let preview = registry.execute(
//!     &mut ctx,
//!     "redirect_calls",
//!     r#"{"source_subject": "/Game/BP_Player", "source_function": "OldFunc",
//!         "target_class": "NewLibrary", "target_function": "NewFunc"}"#,
//! );
//! println!("{}", preview);
//! ```

pub mod analysis;
pub mod backup;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod host;
pub mod mcp;
pub mod model;
pub mod mutation;
pub mod serializer;
pub mod status;

// Re-exports for convenience
pub use backup::ExportStore;
pub use commands::{CommandRegistry, Context};
pub use config::GraftConfig;
pub use error::{GraftError, Result};
pub use host::{Host, MemoryHost};
pub use status::StatusStore;
