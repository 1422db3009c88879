//! Background builders: each one scans the file once on its own thread and
//! delivers a single result over a channel. Cancellation is cooperative via
//! a shared flag checked at every line-scan iteration.

mod counter;
mod line_index;
mod search;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::Arc;
use std::thread;

use tracing::{debug, warn};

pub use counter::count_lines;
pub use line_index::{build_line_index, SparseLineIndex};
pub use search::{build_search_index, SearchIndex, SEARCH_CAP};

/// Shared cancellation flag polled by builders at every line-scan iteration
#[derive(Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(false)))
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Handle to a running builder. Exactly one result arrives on the channel if
/// the scan completes; a cancelled or failed builder sends nothing. Dropping
/// the handle requests cancellation.
pub struct BuilderHandle<T> {
    rx: Receiver<T>,
    cancel: CancelFlag,
    name: &'static str,
}

impl<T: Send + 'static> BuilderHandle<T> {
    /// Spawn `scan` on its own thread with a fresh cancellation flag. The
    /// scan reports `Ok(None)` when it observed the flag and stopped early.
    pub fn spawn<F>(name: &'static str, scan: F) -> Self
    where
        F: FnOnce(&CancelFlag) -> std::io::Result<Option<T>> + Send + 'static,
    {
        let cancel = CancelFlag::new();
        let (tx, rx) = mpsc::channel();
        let flag = cancel.clone();
        thread::spawn(move || match scan(&flag) {
            Ok(Some(result)) => {
                // The receiver may be gone if the session already moved on
                let _ = tx.send(result);
            }
            Ok(None) => debug!(builder = name, "builder cancelled"),
            Err(err) => warn!(builder = name, %err, "builder failed"),
        });
        Self { rx, cancel, name }
    }

    /// Non-blocking poll; yields the result at most once
    pub fn try_take(&self) -> Option<T> {
        match self.rx.try_recv() {
            Ok(result) => {
                debug!(builder = self.name, "builder result received");
                Some(result)
            }
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }

    /// Block until the builder delivers or exits. `None` means it was
    /// cancelled or failed.
    pub fn wait(&self) -> Option<T> {
        self.rx.recv().ok()
    }

    /// Request cooperative cancellation; the builder exits at its next
    /// line-scan checkpoint without delivering
    #[allow(dead_code)]
    pub fn request_cancel(&self) {
        self.cancel.cancel();
    }
}

impl<T> Drop for BuilderHandle<T> {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_builder_delivers_once() {
        let handle = BuilderHandle::spawn("test", |_cancel| Ok(Some(42u64)));
        assert_eq!(handle.wait(), Some(42));
        assert_eq!(handle.try_take(), None);
    }

    #[test]
    fn test_cancelled_builder_delivers_nothing() {
        let handle = BuilderHandle::spawn("test", |cancel: &CancelFlag| {
            loop {
                if cancel.is_cancelled() {
                    return Ok(None::<u64>);
                }
                thread::sleep(Duration::from_millis(1));
            }
        });
        handle.request_cancel();
        assert_eq!(handle.wait(), None);
    }

    #[test]
    fn test_failed_builder_delivers_nothing() {
        let handle = BuilderHandle::spawn("test", |_cancel| {
            Err::<Option<u64>, _>(std::io::Error::new(std::io::ErrorKind::Other, "boom"))
        });
        assert_eq!(handle.wait(), None);
    }

    #[test]
    fn test_try_take_on_pending_builder() {
        let (release_tx, release_rx) = mpsc::channel::<()>();
        let handle = BuilderHandle::spawn("test", move |_cancel| {
            release_rx.recv().ok();
            Ok(Some(1u64))
        });
        assert_eq!(handle.try_take(), None);
        release_tx.send(()).unwrap();
        assert_eq!(handle.wait(), Some(1));
    }
}
