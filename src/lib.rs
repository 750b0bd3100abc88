//! # Snapchain Codegen - Block Graph to Solana Source Generator
//!
//! **Snapchain Codegen** turns the block graph built in a visual smart-contract
//! editor into Solana program source text. It validates the graph while it
//! emits, parenthesizes expressions by precedence, and generates large graphs
//! in batches that yield to the async runtime.
//!
//! ## Core Workflow
//!
//! 1.  **Build a Registry**: `Registry::with_default_catalog()` declares every block type. Share it with `Arc`.
//! 2.  **Edit a Graph**: create nodes, bind them into slots, edit fields. Or load a saved workspace with `IntoGraph`.
//! 3.  **Emit**: `Emitter::builder(registry)` creates the renderer table. Extend it with custom renderers if needed.
//! 4.  **Generate**: a `Scheduler` produces the whole document, batch by batch.
//! 5.  **Refine** (optional): send the structured graph and the code to a hosted model with a `Refiner`.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use snapchain_codegen::prelude::*;
//! use std::sync::Arc;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<()> {
//!     let registry = Arc::new(Registry::with_default_catalog());
//!     let mut graph = Graph::new(Arc::clone(&registry));
//!
//!     // struct Counter { pub count: u64 }
//!     let counter = graph.create_node_with_fields("rust_struct", [("name", "Counter")])?;
//!     let count = graph.create_node_with_fields(
//!         "struct_field",
//!         [("name", "count"), ("type", "u64")],
//!     )?;
//!     graph.bind_slot(&counter, "fields", SlotInput::Chain(vec![count]))?;
//!
//!     let emitter = Arc::new(Emitter::new(registry));
//!     let scheduler = Scheduler::new(emitter, SchedulerConfig::default());
//!     let code = scheduler.generate(&graph).await?;
//!     println!("{code}");
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod emitter;
pub mod error;
pub mod graph;
pub mod prelude;
pub mod refine;
pub mod registry;
pub mod scheduler;
pub mod serialize;
pub mod session;
