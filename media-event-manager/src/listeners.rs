//! Copy-on-write listener collection
//!
//! Registration may happen on any thread, including from inside a listener
//! while the dispatch worker is iterating. Iteration works on an `Arc`
//! snapshot; mutation clones the vector only while such a snapshot is alive.

use std::sync::Arc;

use parking_lot::RwLock;

/// Ordered, copy-on-write collection of listeners
pub struct Listeners<L: ?Sized> {
    inner: RwLock<Arc<Vec<Arc<L>>>>,
}

impl<L: ?Sized> Default for Listeners<L> {
    fn default() -> Self {
        Self::new()
    }
}

impl<L: ?Sized> Listeners<L> {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Arc::new(Vec::new())),
        }
    }

    /// Append a listener; it will be notified before every earlier one
    pub fn add(&self, listener: Arc<L>) {
        let mut guard = self.inner.write();
        Arc::make_mut(&mut guard).push(listener);
    }

    /// Remove the earliest registration of `listener`
    ///
    /// Returns `false` when it was not registered.
    pub fn remove(&self, listener: &Arc<L>) -> bool {
        let mut guard = self.inner.write();
        let Some(index) = guard.iter().position(|l| same_listener(l, listener)) else {
            return false;
        };
        Arc::make_mut(&mut guard).remove(index);
        true
    }

    pub fn contains(&self, listener: &Arc<L>) -> bool {
        self.inner.read().iter().any(|l| same_listener(l, listener))
    }

    /// Registration-ordered view that is unaffected by later changes
    pub fn snapshot(&self) -> Arc<Vec<Arc<L>>> {
        Arc::clone(&self.inner.read())
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    pub fn clear(&self) {
        *self.inner.write() = Arc::new(Vec::new());
    }
}

// Compare data pointers only; vtable pointers of the same trait object may
// differ between codegen units.
fn same_listener<L: ?Sized>(a: &Arc<L>, b: &Arc<L>) -> bool {
    std::ptr::eq(Arc::as_ptr(a) as *const (), Arc::as_ptr(b) as *const ())
}

#[cfg(test)]
mod tests {
    use super::*;

    trait Named: Send + Sync {
        fn name(&self) -> &str;
    }

    struct Tag(&'static str);

    impl Named for Tag {
        fn name(&self) -> &str {
            self.0
        }
    }

    fn names(snapshot: &[Arc<dyn Named>]) -> Vec<&str> {
        snapshot.iter().map(|l| l.name()).collect()
    }

    #[test]
    fn test_snapshot_is_isolated_from_mutation() {
        let listeners: Listeners<dyn Named> = Listeners::new();
        let a: Arc<dyn Named> = Arc::new(Tag("a"));
        let b: Arc<dyn Named> = Arc::new(Tag("b"));
        listeners.add(a.clone());
        listeners.add(b.clone());

        let snapshot = listeners.snapshot();
        assert!(listeners.remove(&a));
        listeners.add(Arc::new(Tag("c")));

        assert_eq!(names(&snapshot), vec!["a", "b"]);
        assert_eq!(names(&listeners.snapshot()), vec!["b", "c"]);
    }

    #[test]
    fn test_remove_unknown_listener() {
        let listeners: Listeners<dyn Named> = Listeners::new();
        let a: Arc<dyn Named> = Arc::new(Tag("a"));
        assert!(!listeners.remove(&a));
        assert!(listeners.is_empty());
    }

    #[test]
    fn test_remove_matches_identity_not_value() {
        let listeners: Listeners<dyn Named> = Listeners::new();
        let first: Arc<dyn Named> = Arc::new(Tag("same"));
        let second: Arc<dyn Named> = Arc::new(Tag("same"));
        listeners.add(first.clone());
        listeners.add(second.clone());

        assert!(listeners.remove(&second));
        assert!(listeners.contains(&first));
        assert!(!listeners.contains(&second));
        assert_eq!(listeners.len(), 1);
    }
}
