use super::{Graph, NodeId, SlotInput};
use crate::error::GraphError;
use crate::registry::Registry;
use crate::serialize::{StructuredBlock, StructuredInput};
use std::sync::Arc;

/// A trait for workspace formats that can be loaded into a [`Graph`].
///
/// The editor's own save format is not owned by this crate. Implementing this
/// trait on it is the extension point for loading saved workspaces.
pub trait IntoGraph {
    /// Consumes the workspace and builds a graph whose types come from `registry`.
    fn into_graph(self, registry: Arc<Registry>) -> Result<Graph, GraphError>;
}

/// Rebuilds a graph from its structured form. Ids, field values and slot shapes
/// are restored as they were. Revisit stubs carry no content and are skipped.
impl IntoGraph for Vec<StructuredBlock> {
    fn into_graph(self, registry: Arc<Registry>) -> Result<Graph, GraphError> {
        self.as_slice().into_graph(registry)
    }
}

impl IntoGraph for &[StructuredBlock] {
    fn into_graph(self, registry: Arc<Registry>) -> Result<Graph, GraphError> {
        let mut graph = Graph::new(registry);
        for block in self {
            build(&mut graph, block)?;
        }
        Ok(graph)
    }
}

fn build(graph: &mut Graph, block: &StructuredBlock) -> Result<Option<NodeId>, GraphError> {
    if block.revisited {
        return Ok(None);
    }
    let id = graph.create_node_with_id(
        NodeId::new(block.id.clone()),
        &block.block_type,
        block.fields.iter().map(|(k, v)| (k.clone(), v.clone())),
    )?;

    for (slot, input) in &block.inputs {
        match input {
            None => {}
            Some(StructuredInput::Single(child)) => {
                if let Some(child) = build(graph, child)? {
                    graph.bind_slot(&id, slot, SlotInput::Single(child))?;
                }
            }
            Some(StructuredInput::Chain(members)) => {
                let mut chain = Vec::with_capacity(members.len());
                for member in members {
                    if let Some(member) = build(graph, member)? {
                        chain.push(member);
                    }
                }
                if !chain.is_empty() {
                    graph.bind_slot(&id, slot, SlotInput::Chain(chain))?;
                }
            }
        }
    }
    Ok(Some(id))
}
