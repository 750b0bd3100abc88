//! A plain nested form of the graph for external text-generation services.
//!
//! This is a side channel, never an input to code emission. It keeps every field
//! value and slot shape, so a graph can be rebuilt from it with
//! [`IntoGraph`](crate::graph::IntoGraph).

use crate::graph::{FieldValue, Graph, NodeId, SlotBinding};
use ahash::AHashSet;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::warn;

mod prompt;
mod summary;

pub use prompt::{RefinementPrompt, build_refinement_prompt};
pub use summary::to_summary;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuredBlock {
    pub id: String,
    #[serde(rename = "type")]
    pub block_type: String,
    #[serde(default)]
    pub fields: BTreeMap<String, FieldValue>,
    /// Every declared slot. `None` is an empty slot.
    #[serde(default)]
    pub inputs: BTreeMap<String, Option<StructuredInput>>,
    /// Id of the following member when this block sits in a chain.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
    /// Stub for a node that was already emitted elsewhere in the tree.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub revisited: bool,
}

impl StructuredBlock {
    fn stub(id: &NodeId, block_type: &str) -> Self {
        Self {
            id: id.to_string(),
            block_type: block_type.to_string(),
            fields: BTreeMap::new(),
            inputs: BTreeMap::new(),
            next: None,
            revisited: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StructuredInput {
    Chain(Vec<StructuredBlock>),
    Single(Box<StructuredBlock>),
}

/// Converts every root, in top-level order.
pub fn to_structured(graph: &Graph) -> Vec<StructuredBlock> {
    let mut visited = AHashSet::new();
    graph
        .top_level_nodes()
        .iter()
        .filter_map(|root| convert(graph, root, &mut visited))
        .collect()
}

pub fn to_json(blocks: &[StructuredBlock]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(blocks)
}

pub fn from_json(source: &str) -> Result<Vec<StructuredBlock>, serde_json::Error> {
    serde_json::from_str(source)
}

fn convert(graph: &Graph, id: &NodeId, visited: &mut AHashSet<NodeId>) -> Option<StructuredBlock> {
    let node = graph.node(id)?;
    if !visited.insert(id.clone()) {
        warn!(node = %id, "node reached twice during serialization, emitting a stub");
        return Some(StructuredBlock::stub(id, node.type_id()));
    }

    let fields = node
        .fields()
        .map(|(name, value)| (name.to_string(), value.clone()))
        .collect();

    let mut slot_names: Vec<String> = graph
        .registry()
        .get_type(node.type_id())
        .map(|t| t.slots.iter().map(|s| s.name.clone()).collect())
        .unwrap_or_default();
    for (name, _) in node.slots() {
        if !slot_names.iter().any(|n| n == name) {
            slot_names.push(name.to_string());
        }
    }

    let mut inputs = BTreeMap::new();
    for name in slot_names {
        let input = match node.slot(&name) {
            None => None,
            Some(SlotBinding::Single(child)) => {
                convert(graph, child, visited).map(|b| StructuredInput::Single(Box::new(b)))
            }
            Some(SlotBinding::Chain(head)) => {
                Some(StructuredInput::Chain(convert_chain(graph, head, visited)))
            }
        };
        inputs.insert(name, input);
    }

    Some(StructuredBlock {
        id: id.to_string(),
        block_type: node.type_id().to_string(),
        fields,
        inputs,
        next: None,
        revisited: false,
    })
}

fn convert_chain(
    graph: &Graph,
    head: &NodeId,
    visited: &mut AHashSet<NodeId>,
) -> Vec<StructuredBlock> {
    let mut members = Vec::new();
    let mut current = Some(head.clone());
    while let Some(id) = current {
        let Some(mut block) = convert(graph, &id, visited) else {
            break;
        };
        if block.revisited {
            members.push(block);
            break;
        }
        current = graph.node(&id).and_then(|n| n.next().cloned());
        block.next = current.as_ref().map(|n| n.to_string());
        members.push(block);
    }
    members
}
