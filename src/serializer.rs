//! Deterministic graph serialization.
//!
//! `serialize_graph` walks nodes in stored order and pins in declared
//! order, so the same graph always yields byte-identical JSON.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::*;

/// Toggles for graph serialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SerializeOptions {
    /// Emit pin default value/object/text fields.
    pub include_defaults: bool,
    /// Emit pin connection lists.
    pub include_connections: bool,
}

impl Default for SerializeOptions {
    fn default() -> Self {
        Self {
            include_defaults: false,
            include_connections: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphDocument {
    pub name: String,
    pub class: String,
    pub node_count: usize,
    pub nodes: Vec<NodeDocument>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeDocument {
    pub node_id: NodeId,
    #[serde(flatten)]
    pub kind: NodeKind,
    pub title: String,
    pub pos_x: i32,
    pub pos_y: i32,
    pub comment: String,
    pub comment_bubble_visible: bool,
    pub input_pins: Vec<PinDocument>,
    pub output_pins: Vec<PinDocument>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PinDocument {
    pub name: String,
    pub direction: PinDirection,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subcategory: Option<String>,
    pub is_array: bool,
    pub is_reference: bool,
    pub is_const: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_object: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connections: Option<Vec<Connection>>,
}

/// Full subject export written by `export_graph`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportDocument {
    pub subject_name: String,
    pub subject_path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_class: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_class_path: Option<String>,
    pub graphs: Vec<GraphDocument>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub components: Option<Vec<Component>>,
    pub variables: Vec<Variable>,
}

impl ExportDocument {
    pub fn node_count(&self) -> usize {
        self.graphs.iter().map(|g| g.node_count).sum()
    }
}

/// Serialize a graph with connections; `None` yields the empty document.
pub fn serialize_graph(graph: Option<&Graph>, include_defaults: bool) -> GraphDocument {
    serialize_graph_with(
        graph,
        SerializeOptions {
            include_defaults,
            include_connections: true,
        },
    )
}

pub fn serialize_graph_with(graph: Option<&Graph>, options: SerializeOptions) -> GraphDocument {
    let Some(graph) = graph else {
        return GraphDocument::default();
    };

    GraphDocument {
        name: graph.name.clone(),
        class: graph.kind.to_string(),
        node_count: graph.nodes.len(),
        nodes: graph
            .nodes
            .iter()
            .map(|node| serialize_node(node, options))
            .collect(),
    }
}

fn serialize_node(node: &Node, options: SerializeOptions) -> NodeDocument {
    NodeDocument {
        node_id: node.id,
        kind: node.kind.clone(),
        title: node.title.clone(),
        pos_x: node.position.x,
        pos_y: node.position.y,
        comment: node.comment.clone(),
        comment_bubble_visible: node.comment_visible,
        input_pins: node
            .input_pins()
            .map(|pin| serialize_pin(pin, options))
            .collect(),
        output_pins: node
            .output_pins()
            .map(|pin| serialize_pin(pin, options))
            .collect(),
    }
}

fn serialize_pin(pin: &Pin, options: SerializeOptions) -> PinDocument {
    let defaults = |value: &Option<String>| {
        if options.include_defaults {
            value.clone()
        } else {
            None
        }
    };

    PinDocument {
        name: pin.name.clone(),
        direction: pin.direction,
        category: pin.category.clone(),
        subcategory: pin.subcategory.clone(),
        is_array: pin.is_array,
        is_reference: pin.is_reference,
        is_const: pin.is_const,
        default_value: defaults(&pin.default_value),
        default_object: defaults(&pin.default_object),
        default_text: defaults(&pin.default_text),
        connections: if options.include_connections && !pin.links.is_empty() {
            Some(pin.links.clone())
        } else {
            None
        },
    }
}

/// Rebuild a graph from its document. Pins come back inputs first, then outputs.
pub fn deserialize_graph(doc: &GraphDocument) -> Result<Graph> {
    let kind: GraphKind = doc.class.parse()?;
    let nodes = doc
        .nodes
        .iter()
        .map(|node| Node {
            id: node.node_id,
            kind: node.kind.clone(),
            title: node.title.clone(),
            position: Position {
                x: node.pos_x,
                y: node.pos_y,
            },
            comment: node.comment.clone(),
            comment_visible: node.comment_bubble_visible,
            pins: node
                .input_pins
                .iter()
                .chain(node.output_pins.iter())
                .map(deserialize_pin)
                .collect(),
        })
        .collect();

    Ok(Graph {
        name: doc.name.clone(),
        kind,
        nodes,
    })
}

fn deserialize_pin(pin: &PinDocument) -> Pin {
    Pin {
        name: pin.name.clone(),
        direction: pin.direction,
        category: pin.category.clone(),
        subcategory: pin.subcategory.clone(),
        is_array: pin.is_array,
        is_reference: pin.is_reference,
        is_const: pin.is_const,
        default_value: pin.default_value.clone(),
        default_object: pin.default_object.clone(),
        default_text: pin.default_text.clone(),
        links: pin.connections.clone().unwrap_or_default(),
    }
}

/// Build the export document for a subject.
///
/// `graph_filter` keeps graphs whose name contains it as a substring.
pub fn export_subject(
    subject: &Subject,
    graph_filter: Option<&str>,
    include_components: bool,
    include_defaults: bool,
) -> ExportDocument {
    let graphs = subject
        .all_graphs()
        .filter(|g| graph_filter.map_or(true, |f| f.is_empty() || g.name.contains(f)))
        .map(|g| serialize_graph(Some(g), include_defaults))
        .collect();

    ExportDocument {
        subject_name: subject.name.clone(),
        subject_path: subject.path.clone(),
        parent_class: subject.parent.as_ref().map(|p| p.name.clone()),
        parent_class_path: subject.parent.as_ref().map(|p| p.path.clone()),
        graphs,
        components: include_components.then(|| subject.components.clone()),
        variables: subject.variables.clone(),
    }
}
