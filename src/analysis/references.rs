//
//  references.rs
//  Graft
//
//  Created by hak (tharun)
//

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::host::{resolve_subject, Host};
use crate::model::NodeId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReferencerKind {
    Subject,
    Asset,
}

/// One call site of the target function inside a referencing subject.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceLocation {
    pub graph: String,
    pub node_id: NodeId,
    pub node_title: String,
    pub pos_x: i32,
    pub pos_y: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Referencer {
    pub referencer_path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub referencer_name: Option<String>,
    #[serde(rename = "type")]
    pub kind: ReferencerKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_locations: Option<Vec<ReferenceLocation>>,
}

/// Query knobs for `find_references`.
#[derive(Debug, Clone, Default)]
pub struct ReferenceQuery<'a> {
    pub target_function: Option<&'a str>,
    pub search_scope: Option<&'a str>,
    pub include_soft_references: bool,
}

/// Direct referencers of `target`, outside the built-in namespace.
///
/// With a target function, loadable referencers also list every call
/// node in them whose function name matches.
pub fn find_references(host: &dyn Host, target: &str, query: &ReferenceQuery<'_>) -> Vec<Referencer> {
    let lookup = resolve_subject(host, target)
        .map(|s| s.path)
        .unwrap_or_else(|_| target.to_string());

    let referencers: Vec<Referencer> = host
        .referencers(&lookup)
        .into_iter()
        .filter(|id| !host.is_builtin(id))
        .map(|id| match host.load_subject(&id) {
            Some(subject) => {
                let reference_locations = query.target_function.map(|function| {
                    subject
                        .calls_to(function)
                        .map(|site| ReferenceLocation {
                            graph: site.graph.name.clone(),
                            node_id: site.node.id,
                            node_title: site.node.title.clone(),
                            pos_x: site.node.position.x,
                            pos_y: site.node.position.y,
                        })
                        .collect()
                });
                Referencer {
                    referencer_path: id,
                    referencer_name: Some(subject.name),
                    kind: ReferencerKind::Subject,
                    reference_locations,
                }
            }
            None => Referencer {
                referencer_path: id,
                referencer_name: None,
                kind: ReferencerKind::Asset,
                reference_locations: None,
            },
        })
        .collect();

    debug!(
        target = %lookup,
        scope = query.search_scope.unwrap_or("project"),
        soft = query.include_soft_references,
        count = referencers.len(),
        "found referencers"
    );
    referencers
}

/// A call into a subject's function from some other subject.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemainingReference {
    pub subject_path: String,
    pub graph: String,
    pub node_id: NodeId,
    pub node_title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalReferenceReport {
    pub subject_path: String,
    pub function_name: String,
    pub safe_to_delete: bool,
    pub remaining_refs_count: usize,
    pub remaining_refs: Vec<RemainingReference>,
}

/// Check that no other subject still calls `function_name` on this subject.
pub fn verify_no_external_references(
    host: &dyn Host,
    subject_path: &str,
    function_name: &str,
) -> Result<ExternalReferenceReport> {
    let subject = resolve_subject(host, subject_path)?;
    let query = ReferenceQuery {
        target_function: Some(function_name),
        ..ReferenceQuery::default()
    };

    let remaining_refs: Vec<RemainingReference> = find_references(host, &subject.path, &query)
        .into_iter()
        .filter(|r| r.kind == ReferencerKind::Subject && r.referencer_path != subject.path)
        .flat_map(|r| {
            let path = r.referencer_path;
            r.reference_locations
                .unwrap_or_default()
                .into_iter()
                .map(move |loc| RemainingReference {
                    subject_path: path.clone(),
                    graph: loc.graph,
                    node_id: loc.node_id,
                    node_title: loc.node_title,
                })
        })
        .collect();

    Ok(ExternalReferenceReport {
        subject_path: subject.path,
        function_name: function_name.to_string(),
        safe_to_delete: remaining_refs.is_empty(),
        remaining_refs_count: remaining_refs.len(),
        remaining_refs,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::MemoryHost;
    use crate::model::*;

    fn host() -> (MemoryHost, NodeId) {
        let door = TypeRef::new("BP_Door_C", "/Game/BP_Door.BP_Door_C");
        let call = Node::new(NodeKind::call(&door, "Open"), "Open").at(40, 80);
        let call_id = call.id;
        let caller = Subject::new("/Game/BP_Switch", "BP_Switch").with_graph(
            Graph::new("EventGraph", GraphKind::EventGraph)
                .with_node(call)
                .with_node(Node::new(NodeKind::call(&door, "Close"), "Close")),
        );

        let mut host = MemoryHost::new();
        host.add_subject(Subject::new("/Game/BP_Door", "BP_Door"))
            .unwrap();
        host.add_subject(caller).unwrap();
        host.add_dependency("/Game/BP_Switch", "/Game/BP_Door");
        host.add_dependency("/Game/Maps/Level1", "/Game/BP_Door");
        host.add_dependency("/Engine/Tools/Inspector", "/Game/BP_Door");
        host.add_dependency("/Script/MyGame", "/Game/BP_Door");
        (host, call_id)
    }

    #[test]
    fn test_subject_and_asset_referencers() {
        let (host, _) = host();
        let refs = find_references(&host, "/Game/BP_Door", &ReferenceQuery::default());

        assert_eq!(refs.len(), 2);
        assert_eq!(refs[0].kind, ReferencerKind::Subject);
        assert_eq!(refs[0].referencer_name.as_deref(), Some("BP_Switch"));
        assert!(refs[0].reference_locations.is_none());
        assert_eq!(refs[1].kind, ReferencerKind::Asset);
        assert_eq!(refs[1].referencer_path, "/Game/Maps/Level1");
    }

    #[test]
    fn test_script_and_engine_referencers_skipped() {
        let (host, _) = host();
        let refs = find_references(&host, "/Game/BP_Door", &ReferenceQuery::default());

        assert!(refs
            .iter()
            .all(|r| !r.referencer_path.starts_with("/Script/") && !r.referencer_path.starts_with("/Engine/")));
    }

    #[test]
    fn test_locations_for_target_function() {
        let (host, call_id) = host();
        let query = ReferenceQuery {
            target_function: Some("Open"),
            ..ReferenceQuery::default()
        };
        let refs = find_references(&host, "BP_Door", &query);

        let locations = refs[0].reference_locations.as_ref().unwrap();
        assert_eq!(locations.len(), 1);
        assert_eq!(locations[0].node_id, call_id);
        assert_eq!((locations[0].pos_x, locations[0].pos_y), (40, 80));
    }

    #[test]
    fn test_verify_external_references() {
        let (host, _) = host();

        let report = verify_no_external_references(&host, "/Game/BP_Door", "Open").unwrap();
        assert!(!report.safe_to_delete);
        assert_eq!(report.remaining_refs_count, 1);
        assert_eq!(report.remaining_refs[0].subject_path, "/Game/BP_Switch");

        let report = verify_no_external_references(&host, "/Game/BP_Door", "Lock").unwrap();
        assert!(report.safe_to_delete);
    }
}
