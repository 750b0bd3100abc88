//! Batched, cooperatively yielding document generation.
//!
//! The scheduler walks every node reachable from the roots, processes the work
//! queue in fixed-size batches and yields to the runtime between batches, so a
//! large graph does not hold the executor for one long pass.

use crate::config::SchedulerConfig;
use crate::emitter::{Emitter, assemble_document};
use crate::error::EmitError;
use crate::graph::{Graph, NodeId};
use ahash::AHashSet;
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::{debug, info, warn};

mod debounce;

pub use debounce::Debouncer;

/// What a generation run did, for diagnostics and tests.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GenerationReport {
    pub nodes_visited: usize,
    pub batches: usize,
    pub roots_rendered: usize,
    pub used_fallback: bool,
}

pub struct Scheduler {
    emitter: Arc<Emitter>,
    config: SchedulerConfig,
}

impl Scheduler {
    pub fn new(emitter: Arc<Emitter>, config: SchedulerConfig) -> Self {
        Self { emitter, config }
    }

    pub fn emitter(&self) -> &Emitter {
        &self.emitter
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Every node reachable from the roots, breadth first, roots first.
    pub fn work_queue(graph: &Graph) -> Vec<NodeId> {
        let mut seen = AHashSet::new();
        let mut queue: VecDeque<NodeId> = VecDeque::new();
        for root in graph.top_level_nodes() {
            if seen.insert(root.clone()) {
                queue.push_back(root.clone());
            }
        }

        let mut order = Vec::with_capacity(graph.len());
        while let Some(id) = queue.pop_front() {
            for child in graph.children(&id) {
                if seen.insert(child.clone()) {
                    queue.push_back(child);
                }
            }
            order.push(id);
        }
        order
    }

    pub async fn generate(&self, graph: &Graph) -> Result<String, EmitError> {
        self.generate_with_report(graph).await.map(|(code, _)| code)
    }

    /// Generates the document. Any emission error aborts the run and discards
    /// everything rendered so far.
    pub async fn generate_with_report(
        &self,
        graph: &Graph,
    ) -> Result<(String, GenerationReport), EmitError> {
        let queue = Self::work_queue(graph);
        let batch_size = self.config.batch_size.max(1);
        let delay = self.config.batch_delay();
        let mut report = GenerationReport {
            nodes_visited: queue.len(),
            ..GenerationReport::default()
        };

        let roots: AHashSet<&NodeId> = graph.top_level_nodes().iter().collect();
        let mut fragments = Vec::new();
        let batch_count = queue.len().div_ceil(batch_size);
        for (index, batch) in queue.chunks(batch_size).enumerate() {
            for id in batch {
                // Non-roots are covered by their root's recursive emission.
                if roots.contains(id) {
                    fragments.push(self.emitter.emit_root(graph, id)?);
                    report.roots_rendered += 1;
                }
            }
            report.batches += 1;
            debug!(
                batch = index + 1,
                of = batch_count,
                nodes = batch.len(),
                "processed batch"
            );

            if index + 1 < batch_count {
                tokio::task::yield_now().await;
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
            }
        }

        let mut code = assemble_document(fragments);
        if code.is_empty() {
            warn!(
                nodes = report.nodes_visited,
                "batched generation produced no output, falling back to a full pass"
            );
            code = self.emitter.emit_document(graph)?;
            report.used_fallback = true;
        }

        info!(
            revision = graph.revision(),
            roots = report.roots_rendered,
            batches = report.batches,
            bytes = code.len(),
            "generated document"
        );
        Ok((code, report))
    }
}
