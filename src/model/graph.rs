//
//  graph.rs
//  Graft
//
//  Created by hak (tharun)
//

use std::collections::HashSet;

use super::types::*;

/// A link endpoint that has no matching back-link on its peer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DanglingLink {
    pub node_id: NodeId,
    pub pin_name: String,
    pub peer: Connection,
}

impl Pin {
    pub fn input(name: &str, category: &str) -> Self {
        Self::new(name, PinDirection::Input, category)
    }

    pub fn output(name: &str, category: &str) -> Self {
        Self::new(name, PinDirection::Output, category)
    }

    fn new(name: &str, direction: PinDirection, category: &str) -> Self {
        Self {
            name: name.to_string(),
            direction,
            category: category.to_string(),
            subcategory: None,
            is_array: false,
            is_reference: false,
            is_const: false,
            default_value: None,
            default_object: None,
            default_text: None,
            links: Vec::new(),
        }
    }

    pub fn with_subcategory(mut self, subcategory: &str) -> Self {
        self.subcategory = Some(subcategory.to_string());
        self
    }

    pub fn with_default(mut self, value: &str) -> Self {
        self.default_value = Some(value.to_string());
        self
    }

    pub fn with_default_object(mut self, object: &str) -> Self {
        self.default_object = Some(object.to_string());
        self
    }

    pub fn with_default_text(mut self, text: &str) -> Self {
        self.default_text = Some(text.to_string());
        self
    }
}

impl Node {
    /// New node with a fresh identifier at the origin.
    pub fn new(kind: NodeKind, title: &str) -> Self {
        Self {
            id: NodeId::new(),
            kind,
            title: title.to_string(),
            position: Position::default(),
            comment: String::new(),
            comment_visible: false,
            pins: Vec::new(),
        }
    }

    pub fn at(mut self, x: i32, y: i32) -> Self {
        self.position = Position { x, y };
        self
    }

    pub fn with_comment(mut self, comment: &str, visible: bool) -> Self {
        self.comment = comment.to_string();
        self.comment_visible = visible;
        self
    }

    pub fn with_pin(mut self, pin: Pin) -> Self {
        self.pins.push(pin);
        self
    }

    pub fn pin(&self, name: &str) -> Option<&Pin> {
        self.pins.iter().find(|p| p.name == name)
    }

    pub fn pin_mut(&mut self, name: &str) -> Option<&mut Pin> {
        self.pins.iter_mut().find(|p| p.name == name)
    }

    pub fn input_pins(&self) -> impl Iterator<Item = &Pin> {
        self.pins.iter().filter(|p| p.direction == PinDirection::Input)
    }

    pub fn output_pins(&self) -> impl Iterator<Item = &Pin> {
        self.pins.iter().filter(|p| p.direction == PinDirection::Output)
    }

    /// `Owner::Function` for call nodes; `Unknown` stands in for a missing owner.
    pub fn call_key(&self) -> Option<String> {
        match &self.kind {
            NodeKind::CallFunction {
                function_name: Some(function),
                owning_type,
                ..
            } => Some(format!(
                "{}::{}",
                owning_type.as_deref().unwrap_or("Unknown"),
                function
            )),
            _ => None,
        }
    }

    /// Owning type path of a call node.
    pub fn call_owner_path(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::CallFunction {
                owning_type_path, ..
            } => owning_type_path.as_deref(),
            _ => None,
        }
    }
}

impl Graph {
    pub fn new(name: &str, kind: GraphKind) -> Self {
        Self {
            name: name.to_string(),
            kind,
            nodes: Vec::new(),
        }
    }

    pub fn with_node(mut self, node: Node) -> Self {
        self.nodes.push(node);
        self
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.iter_mut().find(|n| n.id == id)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Link `from.from_pin` to `to.to_pin`, recording the link on both ends.
    ///
    /// Returns false (and changes nothing) when either endpoint is missing.
    pub fn connect(&mut self, from: NodeId, from_pin: &str, to: NodeId, to_pin: &str) -> bool {
        let both_exist = self.node(from).and_then(|n| n.pin(from_pin)).is_some()
            && self.node(to).and_then(|n| n.pin(to_pin)).is_some();
        if !both_exist {
            return false;
        }

        if let Some(pin) = self.node_mut(from).and_then(|n| n.pin_mut(from_pin)) {
            pin.links.push(Connection {
                node_id: to,
                pin_name: to_pin.to_string(),
            });
        }
        if let Some(pin) = self.node_mut(to).and_then(|n| n.pin_mut(to_pin)) {
            pin.links.push(Connection {
                node_id: from,
                pin_name: from_pin.to_string(),
            });
        }
        true
    }

    /// Links whose peer does not link back. Reported, never repaired.
    pub fn dangling_links(&self) -> Vec<DanglingLink> {
        let mut dangling = Vec::new();
        for node in &self.nodes {
            for pin in &node.pins {
                for link in &pin.links {
                    let linked_back = self
                        .node(link.node_id)
                        .and_then(|peer| peer.pin(&link.pin_name))
                        .map(|peer_pin| {
                            peer_pin
                                .links
                                .iter()
                                .any(|l| l.node_id == node.id && l.pin_name == pin.name)
                        })
                        .unwrap_or(false);
                    if !linked_back {
                        dangling.push(DanglingLink {
                            node_id: node.id,
                            pin_name: pin.name.clone(),
                            peer: link.clone(),
                        });
                    }
                }
            }
        }
        dangling
    }
}

impl Subject {
    pub fn new(path: &str, name: &str) -> Self {
        Self {
            path: path.to_string(),
            name: name.to_string(),
            parent: None,
            event_graphs: Vec::new(),
            function_graphs: Vec::new(),
            macro_graphs: Vec::new(),
            variables: Vec::new(),
            components: Vec::new(),
        }
    }

    pub fn with_parent(mut self, parent: TypeRef) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Add a graph to the list matching its kind.
    pub fn with_graph(mut self, graph: Graph) -> Self {
        match graph.kind {
            GraphKind::Function => self.function_graphs.push(graph),
            GraphKind::Macro => self.macro_graphs.push(graph),
            GraphKind::Event | GraphKind::EventGraph => self.event_graphs.push(graph),
        }
        self
    }

    pub fn with_variable(mut self, variable: Variable) -> Self {
        self.variables.push(variable);
        self
    }

    pub fn with_component(mut self, component: Component) -> Self {
        self.components.push(component);
        self
    }

    /// Every graph: event graphs, then function graphs, then macro graphs.
    pub fn all_graphs(&self) -> impl Iterator<Item = &Graph> {
        self.event_graphs
            .iter()
            .chain(self.function_graphs.iter())
            .chain(self.macro_graphs.iter())
    }

    pub fn all_graphs_mut(&mut self) -> impl Iterator<Item = &mut Graph> {
        self.event_graphs
            .iter_mut()
            .chain(self.function_graphs.iter_mut())
            .chain(self.macro_graphs.iter_mut())
    }

    pub fn node_count(&self) -> usize {
        self.all_graphs().map(Graph::node_count).sum()
    }

    /// Node ids that appear more than once across the subject.
    pub fn duplicate_node_ids(&self) -> Vec<NodeId> {
        let mut seen = HashSet::new();
        let mut duplicates = Vec::new();
        for node in self.all_graphs().flat_map(|g| g.nodes.iter()) {
            if !seen.insert(node.id) && !duplicates.contains(&node.id) {
                duplicates.push(node.id);
            }
        }
        duplicates
    }
}
