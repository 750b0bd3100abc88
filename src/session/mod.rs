//! An editing session: the graph under edit, debounced regeneration and the
//! code currently on display.
//!
//! Generation always runs on a clone of the graph taken under the lock, so
//! edits made while a generation is in flight never affect its output.

use crate::error::{EmitError, GraphError, RefinementError};
use crate::graph::Graph;
use crate::refine::{RefinementClient, Refiner};
use crate::scheduler::{Debouncer, Scheduler};
use crate::serialize::to_structured;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

mod display;

pub use display::{CodeSource, CodeState, ErrorBanner, ErrorCategory};

pub struct LiveSession {
    graph: Arc<Mutex<Graph>>,
    revisions: watch::Sender<u64>,
    state: Arc<watch::Sender<CodeState>>,
    scheduler: Arc<Scheduler>,
    debouncer: Debouncer,
}

impl LiveSession {
    pub fn new(graph: Graph, scheduler: Arc<Scheduler>, debounce: Duration) -> Self {
        let (revisions, _) = watch::channel(graph.revision());
        let (state, _) = watch::channel(CodeState::new());
        Self {
            graph: Arc::new(Mutex::new(graph)),
            revisions,
            state: Arc::new(state),
            scheduler,
            debouncer: Debouncer::new(debounce),
        }
    }

    /// Applies an edit and notifies the generator if the graph changed.
    pub async fn edit<F, T>(&self, edit: F) -> Result<T, GraphError>
    where
        F: FnOnce(&mut Graph) -> Result<T, GraphError>,
    {
        let mut graph = self.graph.lock().await;
        let before = graph.revision();
        let outcome = edit(&mut graph);
        let after = graph.revision();
        if after != before {
            self.revisions.send_replace(after);
        }
        outcome
    }

    /// A copy of the graph as it is now.
    pub async fn snapshot(&self) -> Graph {
        self.graph.lock().await.clone()
    }

    pub fn state(&self) -> CodeState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<CodeState> {
        self.state.subscribe()
    }

    pub fn revisions(&self) -> watch::Receiver<u64> {
        self.revisions.subscribe()
    }

    /// Generates code for the current graph and publishes the outcome.
    pub async fn generate_now(&self) -> Result<String, EmitError> {
        run_generation(&self.graph, &self.scheduler, &self.state).await
    }

    /// Starts the background task that regenerates once edits settle.
    ///
    /// The task ends when the session is dropped.
    pub fn spawn_generator(&self) -> JoinHandle<()> {
        let graph = Arc::clone(&self.graph);
        let scheduler = Arc::clone(&self.scheduler);
        let state = Arc::clone(&self.state);
        let debouncer = self.debouncer;
        let mut changes = self.revisions.subscribe();

        tokio::spawn(async move {
            while let Some(revision) = debouncer.settled(&mut changes).await {
                debug!(revision, "edits settled");
                let _ = run_generation(&graph, &scheduler, &state).await;
            }
            debug!("session closed, generator stopping");
        })
    }

    /// Asks the refinement collaborator to rewrite the current code and
    /// publishes the outcome.
    pub async fn refine<C: RefinementClient>(
        &self,
        refiner: &Refiner<C>,
        instruction: &str,
    ) -> Result<String, RefinementError> {
        let snapshot = self.snapshot().await;
        let blocks = to_structured(&snapshot);
        let current = self.state().code().to_string();

        let result = refiner
            .refine(&blocks, Some(current.as_str()), instruction)
            .await;
        if let Err(error) = &result {
            warn!(error = %error, "refinement failed");
        }
        let revision = snapshot.revision();
        self.state.send_modify(|state| {
            state.apply_refinement(revision, result.clone());
        });
        result
    }
}

async fn run_generation(
    graph: &Mutex<Graph>,
    scheduler: &Scheduler,
    state: &watch::Sender<CodeState>,
) -> Result<String, EmitError> {
    let snapshot = graph.lock().await.clone();
    let revision = snapshot.revision();
    let result = scheduler.generate(&snapshot).await;
    match &result {
        Ok(code) => info!(revision, bytes = code.len(), "published generated code"),
        Err(error) => warn!(revision, node = %error.node_id(), error = %error, "generation failed"),
    }
    state.send_modify(|current| {
        current.apply_generation(revision, result.clone());
    });
    result
}
