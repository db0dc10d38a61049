//
//  types.rs
//  Graft
//
//  Created by hak (tharun)
//

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::GraftError;

/// Globally unique node identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub Uuid);

impl NodeId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which of a subject's graph lists a graph belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GraphKind {
    Function,
    Event,
    Macro,
    EventGraph,
}

impl fmt::Display for GraphKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            GraphKind::Function => "Function",
            GraphKind::Event => "Event",
            GraphKind::Macro => "Macro",
            GraphKind::EventGraph => "EventGraph",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for GraphKind {
    type Err = GraftError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Function" => Ok(GraphKind::Function),
            "Event" => Ok(GraphKind::Event),
            "Macro" => Ok(GraphKind::Macro),
            "EventGraph" => Ok(GraphKind::EventGraph),
            other => Err(GraftError::InvalidInput(format!(
                "Unknown graph class: {}",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PinDirection {
    Input,
    Output,
}

/// Node kind and its kind-specific fields.
///
/// Serialized internally tagged on `node_type`, so the kind fields sit
/// flat next to the common node fields in exported documents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "node_type")]
pub enum NodeKind {
    CallFunction {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        function_name: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        owning_type: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        owning_type_path: Option<String>,
        #[serde(default)]
        is_pure: bool,
    },
    Event {
        event_name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        event_class: Option<String>,
    },
    VariableGet {
        variable_name: String,
    },
    VariableSet {
        variable_name: String,
    },
    InputAction {
        action_name: String,
    },
    #[serde(rename = "Self")]
    SelfRef,
    FunctionEntry,
    FunctionResult,
    MacroInstance {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        macro_name: Option<String>,
    },
    Other,
}

impl NodeKind {
    /// A call node bound to `owner::function`.
    pub fn call(owner: &TypeRef, function: &str) -> Self {
        NodeKind::CallFunction {
            function_name: Some(function.to_string()),
            owning_type: Some(owner.name.clone()),
            owning_type_path: Some(owner.path.clone()),
            is_pure: false,
        }
    }

    /// Called function name, if this is a resolved call node.
    pub fn function_name(&self) -> Option<&str> {
        match self {
            NodeKind::CallFunction { function_name, .. } => function_name.as_deref(),
            _ => None,
        }
    }
}

/// Reference to a type known to the host.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeRef {
    pub name: String,
    pub path: String,
}

impl TypeRef {
    pub fn new(name: &str, path: &str) -> Self {
        Self {
            name: name.to_string(),
            path: path.to_string(),
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// A function on a host type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Callable {
    pub owner: TypeRef,
    pub name: String,
}

impl fmt::Display for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.owner.name, self.name)
    }
}

/// Grid position of a node inside its graph.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

/// One end of a pin link: the peer node and the peer pin's name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Connection {
    pub node_id: NodeId,
    pub pin_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pin {
    pub name: String,
    pub direction: PinDirection,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subcategory: Option<String>,
    #[serde(default)]
    pub is_array: bool,
    #[serde(default)]
    pub is_reference: bool,
    #[serde(default)]
    pub is_const: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_object: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_text: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<Connection>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    #[serde(flatten)]
    pub kind: NodeKind,
    pub title: String,
    #[serde(default)]
    pub position: Position,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub comment_visible: bool,
    #[serde(default)]
    pub pins: Vec<Pin>,
}

/// An ordered node list of one kind, owned by exactly one subject.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Graph {
    pub name: String,
    pub kind: GraphKind,
    #[serde(default)]
    pub nodes: Vec<Node>,
}

/// Member variable declared on a subject.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variable {
    pub name: String,
    #[serde(rename = "type")]
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtype: Option<String>,
    #[serde(default)]
    pub is_exposed: bool,
}

/// Component template attached to a subject.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Component {
    pub name: String,
    #[serde(rename = "class")]
    pub class_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
}

/// A host asset holding graphs, with an optional parent type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subject {
    pub path: String,
    pub name: String,
    #[serde(default)]
    pub parent: Option<TypeRef>,
    #[serde(default)]
    pub event_graphs: Vec<Graph>,
    #[serde(default)]
    pub function_graphs: Vec<Graph>,
    #[serde(default)]
    pub macro_graphs: Vec<Graph>,
    #[serde(default)]
    pub variables: Vec<Variable>,
    #[serde(default)]
    pub components: Vec<Component>,
}
