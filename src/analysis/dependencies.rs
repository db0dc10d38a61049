//
//  dependencies.rs
//  Graft
//
//  Created by hak (tharun)
//

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

use crate::error::Result;
use crate::host::{resolve_subject, AssetClass, Host};

/// Classified dependencies of one subject. Sets are disjoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DependencySet {
    pub assets: BTreeSet<String>,
    pub sub_subjects: BTreeSet<String>,
    pub native_types: BTreeSet<String>,
    /// `Owner::Function` to call-node count.
    pub function_calls: BTreeMap<String, usize>,
}

impl DependencySet {
    pub fn len(&self) -> usize {
        self.assets.len() + self.sub_subjects.len() + self.native_types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0 && self.function_calls.is_empty()
    }
}

/// Classify everything a subject depends on and count its function calls.
///
/// `recursive` is accepted for callers but the closure always comes from
/// the host index, which already reports indirect dependencies.
pub fn analyze_dependencies(
    host: &dyn Host,
    subject_path: &str,
    include_engine_types: bool,
    recursive: bool,
) -> Result<DependencySet> {
    let subject = resolve_subject(host, subject_path)?;
    let mut set = DependencySet::default();

    for id in host.dependencies(&subject.path) {
        if !include_engine_types && host.is_builtin(&id) {
            continue;
        }

        if host.is_native_type(&id) {
            set.native_types.insert(id);
        } else if host.asset_class(&id) == Some(AssetClass::Subject) {
            set.sub_subjects.insert(id);
        } else {
            set.assets.insert(id);
        }
    }

    for site in subject.call_sites() {
        let engine_owner = site
            .node
            .call_owner_path()
            .map_or(false, |path| host.is_engine_call_owner(path));
        if !include_engine_types && engine_owner {
            continue;
        }
        if let Some(key) = site.node.call_key() {
            *set.function_calls.entry(key).or_insert(0) += 1;
        }
    }

    debug!(
        subject = %subject.path,
        recursive,
        dependencies = set.len(),
        calls = set.function_calls.len(),
        "analyzed dependencies"
    );
    Ok(set)
}
