//! Listener registries
//!
//! Callbacks are stored behind `Arc` so a registry can hand out a snapshot
//! and invoke it without holding its lock. Listeners may therefore add or
//! remove listeners (on the same registry or elsewhere) while being called.

use core::fmt;
use core::sync::atomic::{AtomicU64, Ordering};
use parking_lot::RwLock;
use std::sync::Arc;

static NEXT_LISTENER: AtomicU64 = AtomicU64::new(1);

/// Handle returned when registering a listener, used to remove it again
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

impl ListenerId {
    /// Allocate a process-wide unique listener id
    pub fn next() -> Self {
        Self(NEXT_LISTENER.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Debug for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ListenerId({})", self.0)
    }
}

/// A set of callbacks of type `F` (usually `dyn Fn(..) + Send + Sync`)
pub struct Listeners<F: ?Sized> {
    entries: RwLock<Vec<(ListenerId, Arc<F>)>>,
}

impl<F: ?Sized> Listeners<F> {
    /// Create an empty registry
    pub const fn new() -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
        }
    }

    /// Register a listener
    pub fn add(&self, listener: Arc<F>) -> ListenerId {
        let id = ListenerId::next();
        self.add_with_id(id, listener);
        id
    }

    /// Register a listener under an existing id.
    ///
    /// Used when one logical listener is spread across several registries.
    pub fn add_with_id(&self, id: ListenerId, listener: Arc<F>) {
        self.entries.write().push((id, listener));
    }

    /// Remove a listener. Returns `false` if it wasn't registered.
    pub fn remove(&self, id: ListenerId) -> bool {
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|(entry, _)| *entry != id);
        entries.len() != before
    }

    /// Copy of the currently registered listeners
    pub fn snapshot(&self) -> Vec<Arc<F>> {
        self.entries.read().iter().map(|(_, l)| l.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }
}

impl<F: ?Sized> Default for Listeners<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: ?Sized> fmt::Debug for Listeners<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listeners").field("len", &self.len()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::sync::atomic::AtomicUsize;

    type Callback = dyn Fn() + Send + Sync;

    #[test]
    fn test_add_remove() {
        let listeners: Listeners<Callback> = Listeners::new();
        let a = listeners.add(Arc::new(|| {}));
        let b = listeners.add(Arc::new(|| {}));
        assert_ne!(a, b);
        assert_eq!(listeners.len(), 2);

        assert!(listeners.remove(a));
        assert!(!listeners.remove(a));
        assert_eq!(listeners.len(), 1);
    }

    #[test]
    fn test_reentrant_removal() {
        let listeners: Arc<Listeners<Callback>> = Arc::new(Listeners::new());
        let calls = Arc::new(AtomicUsize::new(0));

        let registry = listeners.clone();
        let counter = calls.clone();
        listeners.add(Arc::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            registry.clear();
        }));
        let counter = calls.clone();
        listeners.add(Arc::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        for listener in listeners.snapshot() {
            listener();
        }

        // the snapshot still reached the second listener
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(listeners.is_empty());
    }
}
