//
//  memory.rs
//  Graft
//
//  Created by hak (tharun)
//

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::Dfs;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::Path;
use tracing::{debug, info};

use super::{AssetClass, Host};
use crate::config::{default_engine_call_prefixes, HostConfig};
use crate::error::{GraftError, Result};
use crate::model::*;

/// A host type with its declared functions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeInfo {
    pub name: String,
    pub path: String,
    /// Path of the super type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub super_type: Option<String>,
    #[serde(default)]
    pub functions: Vec<String>,
}

impl TypeInfo {
    pub fn new(name: &str, path: &str) -> Self {
        Self {
            name: name.to_string(),
            path: path.to_string(),
            super_type: None,
            functions: Vec::new(),
        }
    }

    pub fn extends(mut self, super_path: &str) -> Self {
        self.super_type = Some(super_path.to_string());
        self
    }

    pub fn with_functions(mut self, functions: &[&str]) -> Self {
        self.functions = functions.iter().map(|f| f.to_string()).collect();
        self
    }

    fn type_ref(&self) -> TypeRef {
        TypeRef::new(&self.name, &self.path)
    }
}

/// A non-subject asset in the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetEntry {
    pub path: String,
    pub class: String,
}

/// `from` depends on `to`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyEdge {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Namespaces {
    #[serde(default)]
    pub builtin: Vec<String>,
    #[serde(default)]
    pub native: Vec<String>,
    #[serde(default = "default_engine_call_prefixes")]
    pub engine_calls: Vec<String>,
}

impl Default for Namespaces {
    fn default() -> Self {
        let config = HostConfig::default();
        Self {
            builtin: config.builtin_prefixes,
            native: config.native_prefixes,
            engine_calls: config.engine_call_prefixes,
        }
    }
}

/// Host backed by a JSON project snapshot.
///
/// Holds subjects, the type table, the asset registry, and the dependency
/// edge list. Tracks which subjects were modified or refreshed since load.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemoryHost {
    #[serde(default)]
    subjects: Vec<Subject>,
    #[serde(default)]
    types: Vec<TypeInfo>,
    #[serde(default)]
    assets: Vec<AssetEntry>,
    #[serde(default)]
    dependencies: Vec<DependencyEdge>,
    #[serde(default)]
    namespaces: Namespaces,
    #[serde(skip)]
    modified: BTreeSet<String>,
    #[serde(skip)]
    refreshed: BTreeSet<String>,
    #[serde(skip)]
    failing_nodes: HashSet<NodeId>,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a project snapshot from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let host: MemoryHost = serde_json::from_str(&contents)?;
        for subject in &host.subjects {
            Self::check_subject(subject)?;
        }
        info!(
            path = %path.display(),
            subjects = host.subjects.len(),
            types = host.types.len(),
            "loaded project snapshot"
        );
        Ok(host)
    }

    /// Write the snapshot back to disk.
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).map_err(|source| GraftError::WriteFailure {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "saved project snapshot");
        Ok(())
    }

    pub fn apply_config(&mut self, config: &HostConfig) {
        self.namespaces = Namespaces {
            builtin: config.builtin_prefixes.clone(),
            native: config.native_prefixes.clone(),
            engine_calls: config.engine_call_prefixes.clone(),
        };
    }

    // ─── Population ─────────────────────────────────────────────

    /// Add a subject. Node ids must be unique within it.
    pub fn add_subject(&mut self, subject: Subject) -> Result<()> {
        Self::check_subject(&subject)?;
        if self.subjects.iter().any(|s| s.path == subject.path) {
            return Err(GraftError::InvalidInput(format!(
                "Subject already exists: {}",
                subject.path
            )));
        }
        self.subjects.push(subject);
        Ok(())
    }

    pub fn add_type(&mut self, info: TypeInfo) {
        self.types.push(info);
    }

    pub fn add_asset(&mut self, path: &str, class: &str) {
        self.assets.push(AssetEntry {
            path: path.to_string(),
            class: class.to_string(),
        });
    }

    pub fn add_dependency(&mut self, from: &str, to: &str) {
        self.dependencies.push(DependencyEdge {
            from: from.to_string(),
            to: to.to_string(),
        });
    }

    /// Make `set_call_target` fail for this node.
    pub fn fail_rewrite(&mut self, node: NodeId) {
        self.failing_nodes.insert(node);
    }

    // ─── Inspection ─────────────────────────────────────────────

    pub fn subject(&self, path: &str) -> Option<&Subject> {
        self.subjects.iter().find(|s| s.path == path)
    }

    pub fn subjects(&self) -> &[Subject] {
        &self.subjects
    }

    pub fn is_modified(&self, path: &str) -> bool {
        self.modified.contains(path)
    }

    pub fn has_modifications(&self) -> bool {
        !self.modified.is_empty()
    }

    /// Drain the modified set, returning what was in it.
    pub fn take_modified(&mut self) -> Vec<String> {
        std::mem::take(&mut self.modified).into_iter().collect()
    }

    pub fn was_refreshed(&self, path: &str) -> bool {
        self.refreshed.contains(path)
    }

    fn check_subject(subject: &Subject) -> Result<()> {
        match subject.duplicate_node_ids().first() {
            Some(dup) => Err(GraftError::InvalidInput(format!(
                "Duplicate node id {} in {}",
                dup, subject.path
            ))),
            None => Ok(()),
        }
    }

    fn subject_mut(&mut self, path: &str) -> Result<&mut Subject> {
        self.subjects
            .iter_mut()
            .find(|s| s.path == path)
            .ok_or_else(|| GraftError::not_found("Blueprint", path))
    }

    fn type_info(&self, path: &str) -> Option<&TypeInfo> {
        self.types.iter().find(|t| t.path == path)
    }

    /// `ty` followed by each of its super types.
    fn lineage(&self, ty: &TypeRef) -> Vec<&TypeInfo> {
        let mut chain = Vec::new();
        let mut current = self.type_info(&ty.path);
        while let Some(info) = current {
            if chain.iter().any(|seen: &&TypeInfo| seen.path == info.path) {
                break;
            }
            chain.push(info);
            current = info.super_type.as_deref().and_then(|p| self.type_info(p));
        }
        chain
    }

    fn dependency_index(&self) -> (DiGraph<&str, ()>, HashMap<&str, NodeIndex>) {
        let mut graph = DiGraph::new();
        let mut index: HashMap<&str, NodeIndex> = HashMap::new();
        for edge in &self.dependencies {
            let from = *index
                .entry(edge.from.as_str())
                .or_insert_with(|| graph.add_node(edge.from.as_str()));
            let to = *index
                .entry(edge.to.as_str())
                .or_insert_with(|| graph.add_node(edge.to.as_str()));
            graph.add_edge(from, to, ());
        }
        (graph, index)
    }
}

impl Host for MemoryHost {
    fn load_subject(&self, path: &str) -> Option<Subject> {
        self.subject(path).cloned()
    }

    fn find_subjects(&self, name: &str) -> Vec<String> {
        self.subjects
            .iter()
            .filter(|s| s.name == name)
            .map(|s| s.path.clone())
            .collect()
    }

    fn asset_class(&self, id: &str) -> Option<AssetClass> {
        if self.subject(id).is_some() {
            return Some(AssetClass::Subject);
        }
        self.assets
            .iter()
            .find(|a| a.path == id)
            .map(|a| AssetClass::Other(a.class.clone()))
    }

    fn is_builtin(&self, id: &str) -> bool {
        self.namespaces.builtin.iter().any(|p| id.starts_with(p.as_str()))
    }

    fn is_native_type(&self, id: &str) -> bool {
        self.namespaces.native.iter().any(|p| id.starts_with(p.as_str()))
    }

    fn is_engine_call_owner(&self, owner_path: &str) -> bool {
        self.namespaces.engine_calls.iter().any(|p| owner_path.starts_with(p.as_str()))
    }

    fn dependencies(&self, id: &str) -> Vec<String> {
        let (graph, index) = self.dependency_index();
        let Some(&start) = index.get(id) else {
            return Vec::new();
        };

        let mut found = Vec::new();
        let mut dfs = Dfs::new(&graph, start);
        while let Some(nx) = dfs.next(&graph) {
            if nx != start {
                found.push(graph[nx].to_string());
            }
        }
        found
    }

    fn referencers(&self, id: &str) -> Vec<String> {
        let mut found: Vec<String> = Vec::new();
        for edge in self.dependencies.iter().filter(|e| e.to == id) {
            if !found.contains(&edge.from) {
                found.push(edge.from.clone());
            }
        }
        found
    }

    fn find_type(&self, name: &str) -> Option<TypeRef> {
        self.types
            .iter()
            .find(|t| t.name == name)
            .map(TypeInfo::type_ref)
    }

    fn load_type(&self, name_or_path: &str) -> Option<TypeRef> {
        self.types
            .iter()
            .find(|t| t.path == name_or_path)
            .or_else(|| {
                self.types
                    .iter()
                    .find(|t| t.path.rsplit(['/', '.']).next() == Some(name_or_path))
            })
            .map(TypeInfo::type_ref)
    }

    fn super_type(&self, ty: &TypeRef) -> Option<TypeRef> {
        self.type_info(&ty.path)
            .and_then(|info| info.super_type.as_deref())
            .and_then(|p| self.type_info(p))
            .map(TypeInfo::type_ref)
    }

    fn is_child_of(&self, ty: &TypeRef, ancestor: &TypeRef) -> bool {
        self.lineage(ty).iter().any(|info| info.path == ancestor.path)
    }

    fn find_function(&self, ty: &TypeRef, name: &str) -> Option<Callable> {
        self.lineage(ty)
            .into_iter()
            .find(|info| info.functions.iter().any(|f| f == name))
            .map(|info| Callable {
                owner: info.type_ref(),
                name: name.to_string(),
            })
    }

    fn declared_functions(&self, ty: &TypeRef) -> Vec<String> {
        self.type_info(&ty.path)
            .map(|info| info.functions.clone())
            .unwrap_or_default()
    }

    fn set_call_target(&mut self, subject: &str, node: NodeId, target: &Callable) -> Result<()> {
        if self.failing_nodes.contains(&node) {
            return Err(GraftError::Host(format!("rewrite rejected for node {}", node)));
        }

        let found = self
            .subject_mut(subject)?
            .find_node_mut(node)
            .ok_or_else(|| GraftError::not_found("Node", node.to_string()))?;

        match &mut found.kind {
            NodeKind::CallFunction {
                function_name,
                owning_type,
                owning_type_path,
                ..
            } => {
                *function_name = Some(target.name.clone());
                *owning_type = Some(target.owner.name.clone());
                *owning_type_path = Some(target.owner.path.clone());
                found.title = target.name.clone();
                Ok(())
            }
            _ => Err(GraftError::Host(format!("node {} is not a call node", node))),
        }
    }

    fn remove_graph(&mut self, subject: &str, graph_name: &str) -> Result<usize> {
        let subject = self.subject_mut(subject)?;
        for list in [
            &mut subject.event_graphs,
            &mut subject.function_graphs,
            &mut subject.macro_graphs,
        ] {
            if let Some(pos) = list.iter().position(|g| g.name == graph_name) {
                let removed = list.remove(pos);
                return Ok(removed.node_count());
            }
        }
        Err(GraftError::not_found("Function graph", graph_name))
    }

    fn set_parent(&mut self, subject: &str, parent: &TypeRef) -> Result<()> {
        self.subject_mut(subject)?.parent = Some(parent.clone());
        Ok(())
    }

    fn refresh_all_nodes(&mut self, subject: &str) -> Result<()> {
        self.subject_mut(subject)?;
        self.refreshed.insert(subject.to_string());
        Ok(())
    }

    fn mark_modified(&mut self, subject: &str) -> Result<()> {
        self.subject_mut(subject)?;
        self.modified.insert(subject.to_string());
        Ok(())
    }
}
