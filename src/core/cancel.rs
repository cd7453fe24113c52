//! Cooperative cancellation for batch processing.
//!
//! A single [`CancelToken`] is created by the binary, wired to Ctrl-C, and
//! cloned into every per-source task and engine invocation. Cancellation is
//! observed at iteration boundaries and inside the expansion call; nothing
//! is interrupted mid-write, so already-written snapshots stay intact.

use std::sync::Arc;

use tokio::sync::watch;

/// Cloneable cancellation signal backed by a watch channel.
///
/// All clones observe the same flag; once cancelled, a token never resets.
#[derive(Debug, Clone)]
pub struct CancelToken {
    tx: Arc<watch::Sender<bool>>,
    rx: watch::Receiver<bool>,
}

impl CancelToken {
    /// Creates a fresh, uncancelled token.
    pub fn new() -> Self {
        let (tx, rx) = watch::channel(false);
        Self { tx: Arc::new(tx), rx }
    }

    /// Signals cancellation to every clone of this token.
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    /// Returns true once [`cancel`](Self::cancel) has been called.
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves when the token is cancelled. Intended for `tokio::select!`
    /// against in-flight work such as an engine child process.
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        // wait_for only errors if every sender is dropped; each clone holds
        // one, so an uncancelled token outliving its siblings stays pending.
        if rx.wait_for(|cancelled| *cancelled).await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}
