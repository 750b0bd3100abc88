//! The in-memory block graph edited by the visual editor.
//!
//! Nodes live in an arena keyed by [`NodeId`]. Ownership runs strictly top-down
//! through slot bindings; the parent relation is a side map used only for
//! ancestry queries. Statement chains are stored as `next` links starting at the
//! head bound to the slot.
//!
//! Mutation performs only the checks that are cheap at bind time (slot arity,
//! value-producing-ness, ancestry). Everything else is validated when code is
//! emitted.

use crate::error::GraphError;
use crate::registry::{NodeType, Registry, SlotArity};
use ahash::{AHashMap, AHashSet};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

mod import;
mod value;

pub use import::IntoGraph;
pub use value::FieldValue;

/// Stable identifier of a node, used for error reporting and highlighting.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for NodeId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// What a slot currently holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotBinding {
    Single(NodeId),
    /// The head of a chain linked through `next`.
    Chain(NodeId),
}

/// The shape handed to [`Graph::bind_slot`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotInput {
    Single(NodeId),
    Chain(Vec<NodeId>),
}

impl SlotInput {
    fn describe(&self) -> &'static str {
        match self {
            SlotInput::Single(_) => "a single node",
            SlotInput::Chain(_) => "a list of nodes",
        }
    }

    fn ids(&self) -> &[NodeId] {
        match self {
            SlotInput::Single(id) => std::slice::from_ref(id),
            SlotInput::Chain(ids) => ids,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    id: NodeId,
    type_id: String,
    fields: BTreeMap<String, FieldValue>,
    slots: BTreeMap<String, SlotBinding>,
    next: Option<NodeId>,
}

impl Node {
    pub fn id(&self) -> &NodeId {
        &self.id
    }

    pub fn type_id(&self) -> &str {
        &self.type_id
    }

    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn slot(&self, name: &str) -> Option<&SlotBinding> {
        self.slots.get(name)
    }

    pub fn slots(&self) -> impl Iterator<Item = (&str, &SlotBinding)> {
        self.slots.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// The following member when this node sits in a statement chain.
    pub fn next(&self) -> Option<&NodeId> {
        self.next.as_ref()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ParentLink {
    owner: NodeId,
    slot: String,
}

/// The result of walking a chain: its members in order, and the first id that
/// was reached twice if the chain loops.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainWalk {
    pub members: Vec<NodeId>,
    pub revisited: Option<NodeId>,
}

#[derive(Debug, Clone)]
pub struct Graph {
    registry: Arc<Registry>,
    nodes: AHashMap<NodeId, Node>,
    roots: Vec<NodeId>,
    parents: AHashMap<NodeId, ParentLink>,
    next_id: u64,
    revision: u64,
}

impl Graph {
    pub fn new(registry: Arc<Registry>) -> Self {
        Self {
            registry,
            nodes: AHashMap::new(),
            roots: Vec::new(),
            parents: AHashMap::new(),
            next_id: 0,
            revision: 0,
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn registry_handle(&self) -> Arc<Registry> {
        Arc::clone(&self.registry)
    }

    /// Monotonic counter bumped by every mutation.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    // --- Creation ---

    /// Creates a root node with every field set to its declared default.
    pub fn create_node(&mut self, type_id: &str) -> Result<NodeId, GraphError> {
        self.create_node_with_fields(type_id, std::iter::empty::<(String, FieldValue)>())
    }

    pub fn create_node_with_fields<I, K, V>(
        &mut self,
        type_id: &str,
        fields: I,
    ) -> Result<NodeId, GraphError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<FieldValue>,
    {
        let id = loop {
            self.next_id += 1;
            let candidate = NodeId(format!("blk-{}", self.next_id));
            if !self.nodes.contains_key(&candidate) {
                break candidate;
            }
        };
        self.create_node_with_id(id, type_id, fields)
    }

    /// Creates a root node under an id chosen by the caller, e.g. the editor.
    pub fn create_node_with_id<I, K, V>(
        &mut self,
        id: NodeId,
        type_id: &str,
        fields: I,
    ) -> Result<NodeId, GraphError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<FieldValue>,
    {
        if self.nodes.contains_key(&id) {
            return Err(GraphError::DuplicateNodeId(id));
        }
        let node_type = self.registry.get_type(type_id)?;

        let mut values: BTreeMap<String, FieldValue> = node_type
            .fields
            .iter()
            .map(|f| (f.name.clone(), f.default.clone()))
            .collect();
        for (name, value) in fields {
            let name = name.into();
            if node_type.field(&name).is_none() {
                return Err(GraphError::UnknownField {
                    type_id: type_id.to_string(),
                    field: name,
                });
            }
            values.insert(name, value.into());
        }

        self.nodes.insert(
            id.clone(),
            Node {
                id: id.clone(),
                type_id: type_id.to_string(),
                fields: values,
                slots: BTreeMap::new(),
                next: None,
            },
        );
        self.roots.push(id.clone());
        self.revision += 1;
        Ok(id)
    }

    // --- Queries ---

    pub fn node(&self, id: &NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    fn require(&self, id: &NodeId) -> Result<&Node, GraphError> {
        self.nodes
            .get(id)
            .ok_or_else(|| GraphError::NodeNotFound(id.clone()))
    }

    fn require_mut(&mut self, id: &NodeId) -> Result<&mut Node, GraphError> {
        self.nodes
            .get_mut(id)
            .ok_or_else(|| GraphError::NodeNotFound(id.clone()))
    }

    /// The registered type of a node.
    pub fn node_type(&self, id: &NodeId) -> Result<&NodeType, GraphError> {
        let node = self.require(id)?;
        self.registry.get_type(&node.type_id)
    }

    /// Roots in arrangement order.
    pub fn top_level_nodes(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn is_root(&self, id: &NodeId) -> bool {
        self.roots.contains(id)
    }

    /// The node owning the slot this node is bound into.
    pub fn parent(&self, id: &NodeId) -> Option<&NodeId> {
        self.parents.get(id).map(|link| &link.owner)
    }

    /// The owning node and the slot name this node is bound into.
    pub fn parent_slot(&self, id: &NodeId) -> Option<(&NodeId, &str)> {
        self.parents
            .get(id)
            .map(|link| (&link.owner, link.slot.as_str()))
    }

    /// True if any ancestor of `id` has type `type_id`.
    pub fn ancestors_of_type(&self, id: &NodeId, type_id: &str) -> bool {
        self.ancestors(id).iter().any(|ancestor| {
            self.nodes
                .get(ancestor)
                .is_some_and(|node| node.type_id == type_id)
        })
    }

    /// Ancestors from the direct parent upwards.
    pub fn ancestors(&self, id: &NodeId) -> Vec<NodeId> {
        let mut seen = AHashSet::new();
        let mut out = Vec::new();
        let mut current = self.parent(id);
        while let Some(parent) = current {
            if !seen.insert(parent.clone()) {
                break;
            }
            out.push(parent.clone());
            current = self.parent(parent);
        }
        out
    }

    /// Walks a chain from `head` along `next` links, stopping at the first revisit.
    pub fn walk_chain(&self, head: &NodeId) -> ChainWalk {
        let mut seen = AHashSet::new();
        let mut members = Vec::new();
        let mut current = Some(head.clone());
        while let Some(id) = current {
            if !seen.insert(id.clone()) {
                return ChainWalk {
                    members,
                    revisited: Some(id),
                };
            }
            current = self.nodes.get(&id).and_then(|n| n.next.clone());
            members.push(id);
        }
        ChainWalk {
            members,
            revisited: None,
        }
    }

    /// Direct children in slot declaration order, chains in chain order.
    pub fn children(&self, id: &NodeId) -> Vec<NodeId> {
        let Some(node) = self.nodes.get(id) else {
            return Vec::new();
        };
        let mut out = Vec::new();
        for slot_name in self.slot_order(node) {
            match node.slots.get(&slot_name) {
                Some(SlotBinding::Single(child)) => out.push(child.clone()),
                Some(SlotBinding::Chain(head)) => out.extend(self.walk_chain(head).members),
                None => {}
            }
        }
        out
    }

    /// Slot names of a node in the order its type declares them, followed by
    /// any bound slot the type no longer declares.
    fn slot_order(&self, node: &Node) -> Vec<String> {
        let mut names: Vec<String> = match self.registry.get_type(&node.type_id) {
            Ok(node_type) => node_type.slots.iter().map(|s| s.name.clone()).collect(),
            Err(_) => Vec::new(),
        };
        for name in node.slots.keys() {
            if !names.contains(name) {
                names.push(name.clone());
            }
        }
        names
    }

    // --- Mutation ---

    pub fn set_field(
        &mut self,
        id: &NodeId,
        name: &str,
        value: impl Into<FieldValue>,
    ) -> Result<(), GraphError> {
        let node_type = self.node_type(id)?;
        if node_type.field(name).is_none() {
            return Err(GraphError::UnknownField {
                type_id: node_type.id.clone(),
                field: name.to_string(),
            });
        }
        let node = self.require_mut(id)?;
        node.fields.insert(name.to_string(), value.into());
        self.revision += 1;
        Ok(())
    }

    /// Binds a child or a chain of children into a slot.
    ///
    /// The given nodes are detached from wherever they were. Nodes previously
    /// bound to the slot and not part of the new binding return to the top level.
    pub fn bind_slot(
        &mut self,
        parent: &NodeId,
        slot: &str,
        input: SlotInput,
    ) -> Result<(), GraphError> {
        let parent_type = self.node_type(parent)?;
        let slot_spec = parent_type
            .slot(slot)
            .ok_or_else(|| GraphError::UnknownSlot {
                type_id: parent_type.id.clone(),
                slot: slot.to_string(),
            })?;
        let arity = slot_spec.arity;

        let matches_arity = matches!(
            (&input, arity),
            (SlotInput::Single(_), SlotArity::SingleExpression)
                | (SlotInput::Chain(_), SlotArity::StatementChain)
        );
        if !matches_arity {
            return Err(GraphError::InvalidSlotArity {
                node_id: parent.clone(),
                slot: slot.to_string(),
                expected: arity.describe(),
                found: input.describe(),
            });
        }

        let parent_ancestry = self.ancestors(parent);
        let mut seen = AHashSet::new();
        for child in input.ids() {
            let child_type = self.node_type(child)?;
            if !seen.insert(child.clone()) {
                return Err(GraphError::DuplicateNodeId(child.clone()));
            }
            if child == parent || parent_ancestry.contains(child) {
                return Err(GraphError::WouldCreateCycle {
                    node_id: parent.clone(),
                    child_id: child.clone(),
                });
            }
            let mismatch = match arity {
                SlotArity::SingleExpression if !child_type.produces_value => {
                    Some("is a statement and does not produce a value")
                }
                SlotArity::StatementChain if child_type.produces_value => {
                    Some("is an expression and cannot be chained as a statement")
                }
                _ => None,
            };
            if let Some(message) = mismatch {
                return Err(GraphError::TypeMismatchInSlot {
                    node_id: parent.clone(),
                    slot: slot.to_string(),
                    child_id: child.clone(),
                    child_type: child_type.id.clone(),
                    message,
                });
            }
        }

        for child in input.ids() {
            self.detach(child);
        }
        self.release_slot(parent, slot);

        let link = ParentLink {
            owner: parent.clone(),
            slot: slot.to_string(),
        };
        let binding = match &input {
            SlotInput::Single(child) => SlotBinding::Single(child.clone()),
            SlotInput::Chain(children) => {
                let Some(head) = children.first() else {
                    self.revision += 1;
                    return Ok(());
                };
                for pair in children.windows(2) {
                    if let Some(node) = self.nodes.get_mut(&pair[0]) {
                        node.next = Some(pair[1].clone());
                    }
                }
                SlotBinding::Chain(head.clone())
            }
        };
        for child in input.ids() {
            self.parents.insert(child.clone(), link.clone());
        }
        if let Some(node) = self.nodes.get_mut(parent) {
            node.slots.insert(slot.to_string(), binding);
        }
        self.revision += 1;
        Ok(())
    }

    /// Empties a slot. Its former contents return to the top level.
    pub fn unbind_slot(&mut self, parent: &NodeId, slot: &str) -> Result<Vec<NodeId>, GraphError> {
        self.require(parent)?;
        let released = self.release_slot(parent, slot);
        self.revision += 1;
        Ok(released)
    }

    /// Points a chain member at a new successor, or ends the chain there.
    ///
    /// This is the raw link edit the editor uses while splicing; it does not
    /// check for cycles. The new successor is moved out of wherever it was and
    /// the old successor is spliced in after it. Ending a chain returns the
    /// cut-off members to the top level.
    ///
    /// Linking back to a node at or before `id` in the same chain, or to one
    /// of its ancestors, only rewrites the link and leaves a cycle behind.
    pub fn set_next(&mut self, id: &NodeId, next: Option<NodeId>) -> Result<(), GraphError> {
        let link = self
            .parents
            .get(id)
            .cloned()
            .ok_or_else(|| GraphError::NotInChain(id.clone()))?;
        let owner_type = self.node_type(&link.owner)?;
        if owner_type
            .slot(&link.slot)
            .is_none_or(|s| s.arity != SlotArity::StatementChain)
        {
            return Err(GraphError::NotInChain(id.clone()));
        }

        let Some(next_id) = next else {
            let kept = self.chain_prefix(&link, id);
            let cut = self.require_mut(id)?.next.take();
            if let Some(head) = cut {
                let walk = self.walk_chain(&head);
                for member in walk.members.into_iter().take_while(|m| !kept.contains(m)) {
                    if let Some(node) = self.nodes.get_mut(&member) {
                        node.next = None;
                    }
                    self.parents.remove(&member);
                    if !self.roots.contains(&member) {
                        self.roots.push(member);
                    }
                }
            }
            self.revision += 1;
            return Ok(());
        };
        let next_type = self.node_type(&next_id)?;
        if next_type.produces_value {
            return Err(GraphError::TypeMismatchInSlot {
                node_id: link.owner.clone(),
                slot: link.slot.clone(),
                child_id: next_id.clone(),
                child_type: next_type.id.clone(),
                message: "is an expression and cannot be chained as a statement",
            });
        }

        if self.links_backwards(id, &link, &next_id) {
            self.require_mut(id)?.next = Some(next_id);
            self.revision += 1;
            return Ok(());
        }

        self.detach(&next_id);
        let successor = self.require_mut(id)?.next.replace(next_id.clone());
        if let Some(node) = self.nodes.get_mut(&next_id) {
            node.next = successor;
        }
        self.parents.insert(next_id, link);
        self.revision += 1;
        Ok(())
    }

    /// Whether linking `id` to `target` would point back into its own chain
    /// prefix or at a node that contains it.
    fn links_backwards(&self, id: &NodeId, link: &ParentLink, target: &NodeId) -> bool {
        target == id
            || self.ancestors(id).contains(target)
            || self.chain_prefix(link, id).contains(target)
    }

    /// Chain members from the head of `id`'s chain up to and including `id`.
    fn chain_prefix(&self, link: &ParentLink, id: &NodeId) -> Vec<NodeId> {
        let Some(SlotBinding::Chain(head)) = self
            .nodes
            .get(&link.owner)
            .and_then(|owner| owner.slots.get(&link.slot))
        else {
            return vec![id.clone()];
        };
        let mut prefix = Vec::new();
        for member in self.walk_chain(head).members {
            let done = &member == id;
            prefix.push(member);
            if done {
                break;
            }
        }
        prefix
    }

    /// Removes a node and its whole slot subtree. Returns every removed id.
    ///
    /// A chain member is spliced out so its successors stay in place.
    pub fn remove_node(&mut self, id: &NodeId) -> Result<Vec<NodeId>, GraphError> {
        self.require(id)?;
        self.detach(id);

        let mut removed = Vec::new();
        let mut pending = vec![id.clone()];
        let mut seen = AHashSet::new();
        while let Some(current) = pending.pop() {
            if !seen.insert(current.clone()) {
                continue;
            }
            pending.extend(self.children(&current));
            if self.nodes.remove(&current).is_some() {
                removed.push(current.clone());
            }
            self.parents.remove(&current);
            self.roots.retain(|root| root != &current);
        }
        self.revision += 1;
        Ok(removed)
    }

    /// Moves a root to a new position in the top-level order.
    pub fn move_root(&mut self, id: &NodeId, index: usize) -> Result<(), GraphError> {
        let position = self
            .roots
            .iter()
            .position(|root| root == id)
            .ok_or_else(|| GraphError::NodeNotFound(id.clone()))?;
        let root = self.roots.remove(position);
        let index = index.min(self.roots.len());
        self.roots.insert(index, root);
        self.revision += 1;
        Ok(())
    }

    /// Takes a node out of its current position without touching its subtree.
    fn detach(&mut self, id: &NodeId) {
        if let Some(position) = self.roots.iter().position(|root| root == id) {
            self.roots.remove(position);
            return;
        }
        let Some(link) = self.parents.remove(id) else {
            return;
        };
        let successor = self.nodes.get_mut(id).and_then(|n| n.next.take());

        let binding = self
            .nodes
            .get(&link.owner)
            .and_then(|owner| owner.slots.get(&link.slot))
            .cloned();
        match binding {
            Some(SlotBinding::Single(child)) if &child == id => {
                if let Some(owner) = self.nodes.get_mut(&link.owner) {
                    owner.slots.remove(&link.slot);
                }
            }
            Some(SlotBinding::Chain(head)) if &head == id => {
                if let Some(owner) = self.nodes.get_mut(&link.owner) {
                    match successor {
                        Some(next) => {
                            owner.slots.insert(link.slot.clone(), SlotBinding::Chain(next));
                        }
                        None => {
                            owner.slots.remove(&link.slot);
                        }
                    }
                }
            }
            Some(SlotBinding::Chain(head)) => {
                let walk = self.walk_chain(&head);
                let predecessor = walk.members.iter().find(|member| {
                    self.nodes
                        .get(*member)
                        .is_some_and(|n| n.next.as_ref() == Some(id))
                });
                if let Some(predecessor) = predecessor.cloned() {
                    if let Some(node) = self.nodes.get_mut(&predecessor) {
                        node.next = successor;
                    }
                }
            }
            _ => {}
        }
    }

    /// Clears a slot binding and returns its former members to the top level.
    fn release_slot(&mut self, parent: &NodeId, slot: &str) -> Vec<NodeId> {
        let binding = self
            .nodes
            .get_mut(parent)
            .and_then(|node| node.slots.remove(slot));
        let released = match binding {
            Some(SlotBinding::Single(child)) => vec![child],
            Some(SlotBinding::Chain(head)) => self.walk_chain(&head).members,
            None => Vec::new(),
        };
        for id in &released {
            if let Some(node) = self.nodes.get_mut(id) {
                node.next = None;
            }
            self.parents.remove(id);
            if !self.roots.contains(id) {
                self.roots.push(id.clone());
            }
        }
        released
    }
}
