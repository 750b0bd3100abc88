use std::time::Duration;
use tokio::sync::watch;

/// Coalesces bursts of change notifications into one trailing trigger.
#[derive(Debug, Clone, Copy)]
pub struct Debouncer {
    window: Duration,
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        Self { window }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Waits for the next change, then for `window` to pass with no further
    /// change, and returns the latest value.
    ///
    /// Returns `None` once the sender is gone and nothing is pending.
    pub async fn settled<T: Clone>(&self, changes: &mut watch::Receiver<T>) -> Option<T> {
        changes.changed().await.ok()?;
        loop {
            tokio::select! {
                changed = changes.changed() => {
                    if changed.is_err() {
                        return Some(changes.borrow_and_update().clone());
                    }
                }
                _ = tokio::time::sleep(self.window) => {
                    return Some(changes.borrow_and_update().clone());
                }
            }
        }
    }
}
