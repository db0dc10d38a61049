//
//  functions.rs
//  Graft
//
//  Created by hak (tharun)
//

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::host::{resolve_subject, Host};
use crate::model::{NodeKind, Subject};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FunctionType {
    Function,
    Event,
    EventGraph,
    Macro,
    Inherited,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionInfo {
    pub name: String,
    pub graph_name: String,
    pub node_count: usize,
    pub is_event: bool,
    pub is_override: bool,
    #[serde(rename = "type")]
    pub kind: FunctionType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_class: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionListing {
    pub subject_path: String,
    pub subject_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_class: Option<String>,
    pub functions: Vec<FunctionInfo>,
}

/// List a subject's function graphs, event entry points, event graphs,
/// and macros. With `include_inherited`, functions declared up the
/// parent chain that the subject does not define follow at the end.
pub fn list_functions(host: &dyn Host, subject_path: &str, include_inherited: bool) -> Result<FunctionListing> {
    let subject = resolve_subject(host, subject_path)?;
    let mut functions = Vec::new();

    for graph in &subject.function_graphs {
        // Only graphs with an entry node can override a parent function
        let has_entry = graph.nodes.iter().any(|n| matches!(n.kind, NodeKind::FunctionEntry));
        let is_override = has_entry
            && subject
                .parent
                .as_ref()
                .map_or(false, |parent| host.find_function(parent, &graph.name).is_some());
        functions.push(FunctionInfo {
            name: graph.name.clone(),
            graph_name: graph.name.clone(),
            node_count: graph.node_count(),
            is_event: false,
            is_override,
            kind: FunctionType::Function,
            event_class: None,
        });
    }

    for graph in &subject.event_graphs {
        for node in &graph.nodes {
            if let NodeKind::Event {
                event_name,
                event_class,
            } = &node.kind
            {
                functions.push(FunctionInfo {
                    name: event_name.clone(),
                    graph_name: graph.name.clone(),
                    node_count: graph.node_count(),
                    is_event: true,
                    is_override: false,
                    kind: FunctionType::Event,
                    event_class: event_class.clone(),
                });
            }
        }
        functions.push(FunctionInfo {
            name: graph.name.clone(),
            graph_name: graph.name.clone(),
            node_count: graph.node_count(),
            is_event: false,
            is_override: false,
            kind: FunctionType::EventGraph,
            event_class: None,
        });
    }

    for graph in &subject.macro_graphs {
        functions.push(FunctionInfo {
            name: graph.name.clone(),
            graph_name: graph.name.clone(),
            node_count: graph.node_count(),
            is_event: false,
            is_override: false,
            kind: FunctionType::Macro,
            event_class: None,
        });
    }

    if include_inherited {
        functions.extend(inherited_functions(host, &subject, &functions));
    }

    Ok(FunctionListing {
        subject_path: subject.path.clone(),
        subject_name: subject.name.clone(),
        parent_class: subject.parent.as_ref().map(|p| p.name.clone()),
        functions,
    })
}

fn inherited_functions(host: &dyn Host, subject: &Subject, own: &[FunctionInfo]) -> Vec<FunctionInfo> {
    let mut inherited: Vec<FunctionInfo> = Vec::new();
    let mut current = subject.parent.clone();

    while let Some(ty) = current {
        for name in host.declared_functions(&ty) {
            let known = own.iter().any(|f| f.name == name) || inherited.iter().any(|f| f.name == name);
            if !known {
                inherited.push(FunctionInfo {
                    name,
                    graph_name: String::new(),
                    node_count: 0,
                    is_event: false,
                    is_override: false,
                    kind: FunctionType::Inherited,
                    event_class: Some(ty.name.clone()),
                });
            }
        }
        current = host.super_type(&ty);
    }
    inherited
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{MemoryHost, TypeInfo};
    use crate::model::*;

    fn host() -> MemoryHost {
        let actor = TypeRef::new("Actor", "/Script/Engine.Actor");
        let subject = Subject::new("/Game/BP_Door", "BP_Door")
            .with_parent(actor)
            .with_graph(
                Graph::new("EventGraph", GraphKind::EventGraph)
                    .with_node(Node::new(
                        NodeKind::Event {
                            event_name: "ReceiveBeginPlay".to_string(),
                            event_class: Some("Actor".to_string()),
                        },
                        "Event BeginPlay",
                    ))
                    .with_node(Node::new(
                        NodeKind::Event {
                            event_name: "ReceiveTick".to_string(),
                            event_class: Some("Actor".to_string()),
                        },
                        "Event Tick",
                    ))
                    .with_node(Node::new(NodeKind::Other, "Branch")),
            )
            .with_graph(
                Graph::new("Open", GraphKind::Function)
                    .with_node(Node::new(NodeKind::FunctionEntry, "Open")),
            )
            .with_graph(
                Graph::new("UserConstructionScript", GraphKind::Function)
                    .with_node(Node::new(NodeKind::FunctionEntry, "Construction")),
            )
            .with_graph(Graph::new("ForEachDoor", GraphKind::Macro));

        let mut host = MemoryHost::new();
        host.add_type(TypeInfo::new("Object", "/Script/CoreUObject.Object").with_functions(&["GetName"]));
        host.add_type(
            TypeInfo::new("Actor", "/Script/Engine.Actor")
                .extends("/Script/CoreUObject.Object")
                .with_functions(&["UserConstructionScript", "ReceiveTick", "K2_DestroyActor"]),
        );
        host.add_subject(subject).unwrap();
        host
    }

    #[test]
    fn test_lists_all_graph_kinds() {
        let listing = list_functions(&host(), "/Game/BP_Door", false).unwrap();
        let kinds: Vec<_> = listing.functions.iter().map(|f| (f.name.as_str(), f.kind)).collect();

        assert_eq!(
            kinds,
            vec![
                ("Open", FunctionType::Function),
                ("UserConstructionScript", FunctionType::Function),
                ("ReceiveBeginPlay", FunctionType::Event),
                ("ReceiveTick", FunctionType::Event),
                ("EventGraph", FunctionType::EventGraph),
                ("ForEachDoor", FunctionType::Macro),
            ]
        );
        assert_eq!(listing.parent_class.as_deref(), Some("Actor"));
        assert_eq!(listing.functions[4].node_count, 3);
    }

    #[test]
    fn test_event_entries_report_graph_node_count() {
        let listing = list_functions(&host(), "/Game/BP_Door", false).unwrap();

        let begin_play = &listing.functions[2];
        assert!(begin_play.is_event);
        assert_eq!(begin_play.node_count, 3);
        assert_eq!(begin_play.event_class.as_deref(), Some("Actor"));
    }

    #[test]
    fn test_event_graph_entry_is_not_an_event() {
        let mut host = MemoryHost::new();
        host.add_subject(
            Subject::new("/Game/BP_Lamp", "BP_Lamp").with_graph(
                Graph::new("OnToggle", GraphKind::Event).with_node(Node::new(
                    NodeKind::Event {
                        event_name: "OnToggle".to_string(),
                        event_class: None,
                    },
                    "OnToggle",
                )),
            ),
        )
        .unwrap();

        let listing = list_functions(&host, "BP_Lamp", false).unwrap();
        let graph_entry = listing
            .functions
            .iter()
            .find(|f| f.kind == FunctionType::EventGraph)
            .unwrap();
        assert!(!graph_entry.is_event);
    }

    #[test]
    fn test_override_requires_entry_node() {
        let actor = TypeRef::new("Actor", "/Script/Engine.Actor");
        let mut host = MemoryHost::new();
        host.add_type(TypeInfo::new("Actor", "/Script/Engine.Actor").with_functions(&["ReceiveTick"]));
        host.add_subject(
            Subject::new("/Game/BP_Fan", "BP_Fan")
                .with_parent(actor)
                .with_graph(
                    Graph::new("ReceiveTick", GraphKind::Function)
                        .with_node(Node::new(NodeKind::Other, "Spin")),
                ),
        )
        .unwrap();

        let listing = list_functions(&host, "BP_Fan", false).unwrap();
        assert_eq!(listing.functions[0].name, "ReceiveTick");
        assert!(!listing.functions[0].is_override);
    }

    #[test]
    fn test_override_detected_from_parent() {
        let listing = list_functions(&host(), "/Game/BP_Door", false).unwrap();
        assert!(!listing.functions[0].is_override);
        assert!(listing.functions[1].is_override);
    }

    #[test]
    fn test_inherited_functions_appended() {
        let listing = list_functions(&host(), "BP_Door", true).unwrap();
        let inherited: Vec<_> = listing
            .functions
            .iter()
            .filter(|f| f.kind == FunctionType::Inherited)
            .map(|f| f.name.as_str())
            .collect();

        assert_eq!(inherited, vec!["K2_DestroyActor", "GetName"]);
    }
}
