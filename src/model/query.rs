//
//  query.rs
//  Graft
//
//  Created by hak (tharun)
//

use super::types::*;

/// A call node together with the graph that holds it.
#[derive(Debug, Clone, Copy)]
pub struct CallSite<'a> {
    pub graph: &'a Graph,
    pub node: &'a Node,
}

impl<'a> CallSite<'a> {
    pub fn function_name(&self) -> Option<&'a str> {
        self.node.kind.function_name()
    }
}

impl Subject {
    /// Every resolved call node, in graph then node order.
    pub fn call_sites(&self) -> impl Iterator<Item = CallSite<'_>> {
        self.all_graphs().flat_map(|graph| {
            graph
                .nodes
                .iter()
                .filter(|node| node.kind.function_name().is_some())
                .map(move |node| CallSite { graph, node })
        })
    }

    /// Call nodes whose called function name equals `function_name`.
    pub fn calls_to<'a>(&'a self, function_name: &'a str) -> impl Iterator<Item = CallSite<'a>> {
        self.call_sites()
            .filter(move |site| site.function_name() == Some(function_name))
    }

    pub fn graph(&self, name: &str) -> Option<&Graph> {
        self.all_graphs().find(|g| g.name == name)
    }

    /// Graph lookup for deletion: all graphs first, then function graphs.
    pub fn deletable_graph(&self, name: &str) -> Option<&Graph> {
        self.graph(name)
            .or_else(|| self.function_graphs.iter().find(|g| g.name == name))
    }

    pub fn find_node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.all_graphs_mut().find_map(|graph| graph.node_mut(id))
    }
}
