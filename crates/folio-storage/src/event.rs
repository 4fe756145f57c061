//! Storage event types for change notification.
//!
//! Provides types for subscribing to content changes through the
//! [`Storage::watch`](crate::Storage::watch) method.

use std::path::PathBuf;
use std::sync::mpsc;

/// Content under one version changed.
///
/// Events are coalesced per version: a burst of edits inside the debounce
/// window arrives as a single event listing every touched path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StorageEvent {
    /// Version whose cached corpus is now stale.
    pub version: String,
    /// Touched paths relative to the version root, sorted and deduplicated.
    pub paths: Vec<PathBuf>,
}

/// Receiver for storage events.
///
/// Wraps a [`std::sync::mpsc::Receiver`] for synchronous event delivery.
/// Can be iterated with [`iter()`](Self::iter) or polled with
/// [`recv()`](Self::recv)/[`try_recv()`](Self::try_recv).
pub struct StorageEventReceiver {
    rx: mpsc::Receiver<StorageEvent>,
}

impl StorageEventReceiver {
    /// Create a new receiver from a channel receiver.
    ///
    /// Backends in other crates build their channel and wrap the receiving
    /// end with this.
    #[must_use]
    pub fn new(rx: mpsc::Receiver<StorageEvent>) -> Self {
        Self { rx }
    }

    /// Wait for the next event (blocking).
    ///
    /// Returns `None` when the sender is dropped.
    #[must_use]
    pub fn recv(&self) -> Option<StorageEvent> {
        self.rx.recv().ok()
    }

    /// Try to receive an event without blocking.
    ///
    /// Returns `None` if no event is available or the sender is dropped.
    #[must_use]
    pub fn try_recv(&self) -> Option<StorageEvent> {
        self.rx.try_recv().ok()
    }

    /// Returns an iterator over events.
    ///
    /// Blocks until an event is available. Stops when the sender is dropped.
    pub fn iter(&self) -> impl Iterator<Item = StorageEvent> + '_ {
        self.rx.iter()
    }

    /// Create a no-op receiver that never yields events.
    pub(crate) fn no_op() -> Self {
        let (_tx, rx) = mpsc::channel();
        Self { rx }
    }
}

/// Handle to stop watching for changes.
///
/// Dropping the handle stops watching. Shutdown is signalled by dropping the
/// internal channel sender.
pub struct WatchHandle {
    _shutdown: Option<mpsc::Sender<()>>,
}

impl WatchHandle {
    /// Create a new watch handle with a shutdown signal sender.
    ///
    /// When the handle is dropped, the sender is dropped, causing the
    /// backend's receiver to report disconnection.
    #[must_use]
    pub fn new(shutdown: mpsc::Sender<()>) -> Self {
        Self {
            _shutdown: Some(shutdown),
        }
    }

    /// Stop watching immediately (consumes the handle).
    pub fn stop(mut self) {
        self._shutdown.take();
    }

    /// Create a no-op handle that does nothing on drop.
    pub(crate) fn no_op() -> Self {
        Self { _shutdown: None }
    }
}
