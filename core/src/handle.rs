//! Shared ownership of the live index.
//!
//! The handle holds an `Arc<InvertedIndex>` behind a read-write lock. The
//! write lock is only ever taken to swap that pointer, so building a new
//! index never blocks lookups, and a lookup keeps the snapshot it started
//! with even if a replacement lands mid-query.

use crate::index::InvertedIndex;
use parking_lot::RwLock;
use std::ops::Deref;
use std::sync::Arc;

/// An installed index together with its generation number.
#[derive(Debug, Clone)]
pub struct Snapshot {
    index: Arc<InvertedIndex>,
    generation: u64,
}

impl Snapshot {
    pub fn generation(&self) -> u64 { self.generation }
}

impl Deref for Snapshot {
    type Target = InvertedIndex;

    fn deref(&self) -> &InvertedIndex { &self.index }
}

/// Cloneable handle to the index currently used for lookups.
#[derive(Debug, Clone)]
pub struct IndexHandle {
    current: Arc<RwLock<Snapshot>>,
}

impl Default for IndexHandle {
    fn default() -> Self { Self::new(InvertedIndex::new()) }
}

impl IndexHandle {
    /// Wrap `index` as generation 0.
    pub fn new(index: InvertedIndex) -> Self {
        let snapshot = Snapshot { index: Arc::new(index), generation: 0 };
        Self { current: Arc::new(RwLock::new(snapshot)) }
    }

    /// Install `index`, returning its generation.
    pub fn replace(&self, index: InvertedIndex) -> u64 {
        let index = Arc::new(index);
        let (generation, previous) = {
            let mut guard = self.current.write();
            let generation = guard.generation + 1;
            let previous = std::mem::replace(&mut *guard, Snapshot { index, generation });
            (generation, previous)
        };
        // The old index may be large; release it outside the lock.
        drop(previous);
        tracing::info!(generation, "index replaced");
        generation
    }

    /// Run `f` against the index that is current right now.
    pub fn read<F, T>(&self, f: F) -> T
    where
        F: FnOnce(&InvertedIndex) -> T,
    {
        let snapshot = self.snapshot();
        f(&snapshot.index)
    }

    pub fn snapshot(&self) -> Snapshot { self.current.read().clone() }

    pub fn generation(&self) -> u64 { self.current.read().generation }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ranking::lookup;

    #[test]
    fn starts_empty() {
        let handle = IndexHandle::default();
        assert_eq!(handle.generation(), 0);
        assert_eq!(handle.read(|idx| idx.document_count()), 0);
    }

    #[test]
    fn replace_bumps_generation() {
        let handle = IndexHandle::default();
        assert_eq!(handle.replace(InvertedIndex::build(["a"])), 1);
        assert_eq!(handle.replace(InvertedIndex::build(["a", "b"])), 2);
        assert_eq!(handle.read(|idx| idx.document_count()), 2);
    }

    #[test]
    fn snapshot_survives_replace() {
        let handle = IndexHandle::new(InvertedIndex::build(["old words"]));
        let before = handle.snapshot();
        handle.replace(InvertedIndex::build(["new words", "more new words"]));

        assert_eq!(before.generation(), 0);
        assert_eq!(lookup(&before, "old").hits.len(), 1);
        assert!(lookup(&before, "new").hits.is_empty());
        assert_eq!(handle.read(|idx| lookup(idx, "new").hits.len()), 2);
    }

    #[test]
    fn clones_share_state() {
        let a = IndexHandle::default();
        let b = a.clone();
        a.replace(InvertedIndex::build(["shared"]));
        assert_eq!(b.generation(), 1);
        assert_eq!(b.read(|idx| idx.document(0).map(str::to_owned)), Some("shared".to_owned()));
    }
}
