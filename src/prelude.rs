//! Prelude module for convenient imports
//!
//! This module re-exports the most commonly used types and traits from the
//! snapchain_codegen crate.
//!
//! # Example
//!
//! ```rust,no_run
//! use snapchain_codegen::prelude::*;
//! use std::sync::Arc;
//!
//! # fn run_example() -> Result<()> {
//! let workspace = std::fs::read_to_string("path/to/workspace.json")?;
//! let registry = Arc::new(Registry::with_default_catalog());
//! let graph = from_json(&workspace)?.into_graph(Arc::clone(&registry))?;
//!
//! let emitter = Emitter::new(registry);
//! println!("{}", emitter.emit_document(&graph)?);
//! # Ok(())
//! # }
//! ```

// Registry and graph
pub use crate::graph::{FieldValue, Graph, IntoGraph, Node, NodeId, SlotBinding, SlotInput};
pub use crate::registry::{NodeType, Registry};

// Emission and scheduling
pub use crate::emitter::{BlockRenderer, Emitter, RenderContext, Rendered};
pub use crate::scheduler::{Debouncer, GenerationReport, Scheduler};

// Serialization and refinement
pub use crate::refine::{RefinementClient, Refiner, extract_code};
pub use crate::serialize::{StructuredBlock, from_json, to_json, to_structured, to_summary};

// Session and configuration
pub use crate::config::{CodegenConfig, EmitterConfig, RefinementConfig, SchedulerConfig};
pub use crate::session::{CodeSource, CodeState, LiveSession};

// Error types
pub use crate::error::{ConfigError, EmitError, GraphError, RefinementError};

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
