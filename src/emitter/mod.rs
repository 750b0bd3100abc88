//! Turns a block graph into Solana program source text.
//!
//! Each block type is rendered by a [`BlockRenderer`] looked up by type id.
//! Renderers recurse through a [`RenderContext`], which validates fields and
//! slots as it goes and tracks precedence for value-producing blocks.

use crate::config::EmitterConfig;
use crate::error::EmitError;
use crate::graph::{Graph, Node, NodeId};
use crate::registry::{Registry, Tier, tier};
use ahash::AHashMap;
use std::sync::Arc;
use tracing::debug;

mod context;
pub mod precedence;
mod renderers;

pub use context::{RenderContext, is_valid_identifier};

use renderers::{create_renderer_by_name, register_default_renderers};

/// A fragment of emitted source code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub code: String,
    /// Set for value-producing blocks only.
    pub tier: Option<Tier>,
}

impl Rendered {
    pub fn statement(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            tier: None,
        }
    }

    pub fn value(code: impl Into<String>, tier: Tier) -> Self {
        Self {
            code: code.into(),
            tier: Some(tier),
        }
    }
}

/// Defines the contract for rendering one block type.
pub trait BlockRenderer: Send + Sync {
    fn node_type(&self) -> &str;
    fn render(&self, node: &Node, cx: &mut RenderContext<'_>) -> Result<Rendered, EmitError>;
}

pub struct Emitter {
    registry: Arc<Registry>,
    renderers: AHashMap<String, Box<dyn BlockRenderer>>,
    config: EmitterConfig,
}

pub struct EmitterBuilder {
    registry: Arc<Registry>,
    renderers: AHashMap<String, Box<dyn BlockRenderer>>,
    config: EmitterConfig,
}

impl EmitterBuilder {
    pub fn new(registry: Arc<Registry>) -> Self {
        let mut renderers: AHashMap<String, Box<dyn BlockRenderer>> = AHashMap::new();
        register_default_renderers(&mut renderers);
        Self {
            registry,
            renderers,
            config: EmitterConfig::default(),
        }
    }

    pub fn with_config(mut self, config: EmitterConfig) -> Self {
        self.config = config;
        self
    }

    /// Renders `user_type` with the built-in renderer of `builtin_type`.
    pub fn with_renderer_alias(mut self, user_type: &str, builtin_type: &str) -> Self {
        if let Some(renderer) = create_renderer_by_name(builtin_type) {
            self.renderers.insert(user_type.to_string(), renderer);
        }
        self
    }

    pub fn with_custom_renderer(mut self, renderer: Box<dyn BlockRenderer>) -> Self {
        self.renderers
            .insert(renderer.node_type().to_string(), renderer);
        self
    }

    pub fn build(self) -> Emitter {
        Emitter {
            registry: self.registry,
            renderers: self.renderers,
            config: self.config,
        }
    }
}

impl Emitter {
    pub fn builder(registry: Arc<Registry>) -> EmitterBuilder {
        EmitterBuilder::new(registry)
    }

    /// An emitter with every built-in renderer and default settings.
    pub fn new(registry: Arc<Registry>) -> Self {
        EmitterBuilder::new(registry).build()
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn config(&self) -> &EmitterConfig {
        &self.config
    }

    pub fn has_renderer(&self, type_id: &str) -> bool {
        self.renderers.contains_key(type_id)
    }

    pub(crate) fn renderer(&self, type_id: &str) -> Option<&dyn BlockRenderer> {
        self.renderers.get(type_id).map(|r| r.as_ref())
    }

    /// Renders one node and everything below it.
    pub fn emit(&self, graph: &Graph, id: &NodeId) -> Result<Rendered, EmitError> {
        let node = graph
            .node(id)
            .ok_or_else(|| EmitError::DanglingReference(id.clone()))?;
        RenderContext::new(self, graph).emit_node(node)
    }

    /// Renders a top-level node as it appears in the document.
    ///
    /// A value-producing root becomes an expression statement.
    pub fn emit_root(&self, graph: &Graph, id: &NodeId) -> Result<String, EmitError> {
        let rendered = self.emit(graph, id)?;
        debug!(node = %id, bytes = rendered.code.len(), "rendered root");
        match rendered.tier {
            Some(_) => Ok(format!(
                "{};\n",
                precedence::wrap(rendered, tier::NONE)
            )),
            None => Ok(rendered.code),
        }
    }

    /// Renders every root in top-level order in a single synchronous pass.
    pub fn emit_document(&self, graph: &Graph) -> Result<String, EmitError> {
        let mut fragments = Vec::with_capacity(graph.top_level_nodes().len());
        for root in graph.top_level_nodes() {
            fragments.push(self.emit_root(graph, root)?);
        }
        Ok(assemble_document(fragments))
    }
}

/// Joins root fragments into the final document text.
pub fn assemble_document<I>(fragments: I) -> String
where
    I: IntoIterator<Item = String>,
{
    let joined: String = fragments.into_iter().collect();
    let trimmed = joined.trim_end();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("{trimmed}\n")
    }
}
