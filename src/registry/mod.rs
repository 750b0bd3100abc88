//! The catalog of block types a graph may contain.
//!
//! A [`Registry`] is built once at startup and shared by reference with every
//! [`Graph`](crate::graph::Graph) and [`Emitter`](crate::emitter::Emitter) that uses it.
//! Independent registries can coexist, which keeps tests isolated from each other.

use crate::error::GraphError;
use ahash::AHashMap;

mod catalog;
pub mod types;

pub use catalog::{MAX_IF_ARMS, register_default_catalog};
pub use types::*;

/// Precedence tiers. Lower binds tighter.
pub mod tier {
    use super::Tier;

    pub const ATOMIC: Tier = 0;
    pub const UNARY: Tier = 1;
    pub const MULTIPLICATIVE: Tier = 2;
    pub const ADDITIVE: Tier = 3;
    pub const RELATIONAL: Tier = 4;
    pub const AND: Tier = 5;
    pub const OR: Tier = 6;
    pub const ASSIGNMENT: Tier = 7;
    /// Used by contexts that accept any expression without wrapping.
    pub const NONE: Tier = 99;
}

#[derive(Debug, Clone, Default)]
pub struct Registry {
    types: AHashMap<String, NodeType>,
    order: Vec<String>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry populated with every built-in block type.
    pub fn with_default_catalog() -> Self {
        let mut registry = Self::new();
        register_default_catalog(&mut registry);
        registry
    }

    /// Adds a type, replacing any previous definition with the same id.
    pub fn register_type(&mut self, node_type: NodeType) {
        if !self.types.contains_key(&node_type.id) {
            self.order.push(node_type.id.clone());
        }
        self.types.insert(node_type.id.clone(), node_type);
    }

    pub fn get_type(&self, id: &str) -> Result<&NodeType, GraphError> {
        self.types
            .get(id)
            .ok_or_else(|| GraphError::UnknownNodeType(id.to_string()))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.types.contains_key(id)
    }

    /// Type ids in first-registration order.
    pub fn type_ids(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn types(&self) -> impl Iterator<Item = &NodeType> {
        self.order.iter().filter_map(|id| self.types.get(id))
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}
