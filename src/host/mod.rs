//! Host capability boundary.
//!
//! Analysis and mutation code never reaches into host internals. They
//! read subjects as owned projections and write back only through the
//! mutation methods on [`Host`].

pub mod memory;

pub use memory::{AssetEntry, DependencyEdge, MemoryHost, Namespaces, TypeInfo};

use serde::{Deserialize, Serialize};

use crate::error::{GraftError, Result};
use crate::model::{Callable, NodeId, Subject, TypeRef};

/// How the host's asset registry classifies an identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssetClass {
    /// A graph-holding subject asset.
    Subject,
    /// Any other registered asset, by class name.
    Other(String),
}

pub trait Host {
    // ─── Lookup ─────────────────────────────────────────────────

    /// Load a subject by exact path.
    fn load_subject(&self, path: &str) -> Option<Subject>;

    /// Paths of subjects whose name matches `name`.
    fn find_subjects(&self, name: &str) -> Vec<String>;

    /// Registry entry for an identifier; `None` when unresolvable.
    fn asset_class(&self, id: &str) -> Option<AssetClass>;

    /// Identifier lies under the host's built-in namespace.
    fn is_builtin(&self, id: &str) -> bool;

    /// Identifier only exists as host reflection data.
    fn is_native_type(&self, id: &str) -> bool;

    /// Call owner belongs to the engine's own function libraries.
    fn is_engine_call_owner(&self, owner_path: &str) -> bool;

    // ─── Dependency index ───────────────────────────────────────

    /// Everything `id` depends on, including indirect dependencies.
    fn dependencies(&self, id: &str) -> Vec<String>;

    /// Direct referencers of `id`, in index order.
    fn referencers(&self, id: &str) -> Vec<String>;

    // ─── Types ──────────────────────────────────────────────────

    /// Exact-name type lookup.
    fn find_type(&self, name: &str) -> Option<TypeRef>;

    /// Load a type by path, or by the trailing name of a path.
    fn load_type(&self, name_or_path: &str) -> Option<TypeRef>;

    fn super_type(&self, ty: &TypeRef) -> Option<TypeRef>;

    fn is_child_of(&self, ty: &TypeRef, ancestor: &TypeRef) -> bool;

    /// Function declared on `ty` or one of its ancestors.
    fn find_function(&self, ty: &TypeRef, name: &str) -> Option<Callable>;

    /// Functions declared directly on `ty`.
    fn declared_functions(&self, ty: &TypeRef) -> Vec<String>;

    // ─── Mutation ───────────────────────────────────────────────

    /// Rebind a call node to `target`.
    fn set_call_target(&mut self, subject: &str, node: NodeId, target: &Callable) -> Result<()>;

    /// Remove the first graph named `graph_name`. Returns its node count.
    fn remove_graph(&mut self, subject: &str, graph_name: &str) -> Result<usize>;

    fn set_parent(&mut self, subject: &str, parent: &TypeRef) -> Result<()>;

    /// Re-derive every node's pins after a structural change.
    fn refresh_all_nodes(&mut self, subject: &str) -> Result<()>;

    fn mark_modified(&mut self, subject: &str) -> Result<()>;
}

/// Load a subject by exact path, falling back to discovery by name.
pub fn resolve_subject(host: &dyn Host, path: &str) -> Result<Subject> {
    if let Some(subject) = host.load_subject(path) {
        return Ok(subject);
    }

    let name = path.rsplit(['/', '.']).next().unwrap_or(path);
    host.find_subjects(name)
        .first()
        .and_then(|found| host.load_subject(found))
        .ok_or_else(|| GraftError::not_found("Blueprint", path))
}
