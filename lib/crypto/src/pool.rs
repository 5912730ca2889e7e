//! A content-addressed pool deduplicating immutable byte buffers under
//! reference counting.
//!
//! A [`Buffer`] is an immutable blob identified inside a [`Pool`] by the
//! Keccak-256 hash of its contents. Creating a buffer through a pool
//! returns the existing allocation when the same bytes were pooled
//! before; cloning a handle bumps the reference count and dropping one
//! releases it. When the last external handle to a pooled buffer goes
//! away, the pool's index entry is removed and the storage freed.
//!
//! The pool index is guarded by a single reader/writer lock: lookups take
//! the read lock, insertion and release-to-last-reference take the write
//! lock. The index holds buffers through shared ownership, while buffers
//! point back at their pool only weakly, so dropping a pool never leaks
//! through a cycle.

use std::{
    collections::HashMap,
    sync::{Arc, Weak},
};

use parking_lot::RwLock;

use crate::{
    hash::{BuildHasher, Hasher},
    keccak::KeccakBuilder,
};

/// Content key of a pooled buffer.
type ContentHash = [u8; 32];

/// Owned storage of one buffer.
struct BufferStorage {
    data: Box<[u8]>,
    content_hash: ContentHash,
}

/// Shared state of one pool: the content-hash index.
struct PoolIndex {
    buffers: RwLock<HashMap<ContentHash, Arc<BufferStorage>>>,
}

/// A deduplicating pool of immutable byte buffers.
pub struct Pool {
    index: Arc<PoolIndex>,
}

impl Pool {
    /// Creates an empty pool.
    #[must_use]
    pub fn new() -> Self {
        Self {
            index: Arc::new(PoolIndex {
                buffers: RwLock::new(HashMap::new()),
            }),
        }
    }

    /// Number of distinct buffers currently held by the pool.
    #[must_use]
    pub fn len(&self) -> usize {
        self.index.buffers.read().len()
    }

    /// Whether the pool currently holds no buffers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for Pool {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Pool {
    fn drop(&mut self) {
        // Every remaining index entry must be held by the pool alone.
        if cfg!(debug_assertions) {
            for storage in self.index.buffers.read().values() {
                debug_assert_eq!(
                    Arc::strong_count(storage),
                    1,
                    "pool dropped while external buffer references remain",
                );
            }
        }
    }
}

/// A reference-counted handle to an immutable byte buffer, optionally
/// deduplicated through a [`Pool`].
///
/// Cloning increments the reference count; dropping decrements it and
/// frees the storage (and the pool index entry) at the last external
/// reference.
pub struct Buffer {
    storage: Option<Arc<BufferStorage>>,
    pool: Option<Weak<PoolIndex>>,
}

impl Buffer {
    /// Copies `bytes` into a new buffer.
    ///
    /// With a pool, the bytes are first looked up by content hash under
    /// the read lock; a hit shares the existing storage. On a miss the new
    /// allocation is inserted under the write lock, re-checking the index
    /// so a concurrent insert of the same contents has exactly one
    /// winner; the loser's allocation is dropped and the winner shared.
    #[must_use]
    pub fn new(pool: Option<&Pool>, bytes: &[u8]) -> Self {
        let Some(pool) = pool else {
            let storage = Arc::new(BufferStorage {
                data: bytes.into(),
                content_hash: [0u8; 32],
            });
            return Self { storage: Some(storage), pool: None };
        };

        let content_hash = content_hash(bytes);

        if let Some(existing) = pool.index.buffers.read().get(&content_hash) {
            return Self {
                storage: Some(Arc::clone(existing)),
                pool: Some(Arc::downgrade(&pool.index)),
            };
        }

        let candidate = Arc::new(BufferStorage {
            data: bytes.into(),
            content_hash,
        });

        let mut buffers = pool.index.buffers.write();
        let winner = buffers
            .entry(content_hash)
            .or_insert_with(|| Arc::clone(&candidate));
        let storage = Arc::clone(winner);
        drop(buffers);

        Self {
            storage: Some(storage),
            pool: Some(Arc::downgrade(&pool.index)),
        }
    }

    /// The buffer's contents.
    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.storage.as_ref().expect("storage present until drop").data
    }

    /// The buffer's length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data().len()
    }

    /// Whether the buffer is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data().is_empty()
    }

    /// The current reference count, counting the pool's own reference.
    #[must_use]
    pub fn ref_count(&self) -> usize {
        Arc::strong_count(
            self.storage.as_ref().expect("storage present until drop"),
        )
    }

    /// Whether two handles share the same storage.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        match (&self.storage, &other.storage) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl Clone for Buffer {
    fn clone(&self) -> Self {
        Self {
            storage: self.storage.clone(),
            pool: self.pool.clone(),
        }
    }
}

impl Drop for Buffer {
    fn drop(&mut self) {
        let Some(pool) = self.pool.as_ref().and_then(Weak::upgrade) else {
            // Unpooled, or the pool is already gone: dropping the Arc is
            // the whole release.
            return;
        };

        let content_hash = self
            .storage
            .as_ref()
            .expect("storage present until drop")
            .content_hash;

        let mut buffers = pool.buffers.write();
        // Release our reference while holding the write lock, then drop
        // the index entry if the pool's reference is the only one left.
        self.storage = None;
        if let Some(storage) = buffers.get(&content_hash) {
            if Arc::strong_count(storage) == 1 {
                buffers.remove(&content_hash);
            }
        }
    }
}

/// Keccak-256 content key of a byte string.
fn content_hash(bytes: &[u8]) -> ContentHash {
    let mut hasher = KeccakBuilder.build_hasher();
    hasher.update(bytes);
    hasher.finalize()
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, thread};

    use super::*;

    #[test]
    fn unpooled_buffers_are_independent() {
        let a = Buffer::new(None, b"hello");
        let b = Buffer::new(None, b"hello");
        assert_eq!(a.data(), b"hello");
        assert_eq!(a.len(), 5);
        assert!(!a.ptr_eq(&b));

        let c = a.clone();
        assert!(a.ptr_eq(&c));
        assert_eq!(a.ref_count(), 2);
        drop(c);
        assert_eq!(a.ref_count(), 1);
    }

    #[test]
    fn pooled_buffers_deduplicate() {
        let pool = Pool::new();
        let b1 = Buffer::new(Some(&pool), b"hello");
        let b2 = Buffer::new(Some(&pool), b"hello");

        // Same storage, counted once in the pool.
        assert!(b1.ptr_eq(&b2));
        assert_eq!(pool.len(), 1);
        // One pool reference plus two external holders.
        assert_eq!(b1.ref_count(), 3);

        // Distinct contents get distinct entries.
        let other = Buffer::new(Some(&pool), b"world");
        assert!(!other.ptr_eq(&b1));
        assert_eq!(pool.len(), 2);
    }

    #[test]
    fn releasing_external_references_empties_the_pool() {
        let pool = Pool::new();
        let b1 = Buffer::new(Some(&pool), b"hello");
        let b2 = Buffer::new(Some(&pool), b"hello");

        drop(b1);
        assert_eq!(pool.len(), 1);
        assert_eq!(b2.ref_count(), 2);

        // Dropping the last external handle removes the index entry.
        drop(b2);
        assert!(pool.is_empty());

        // Re-inserting after removal allocates fresh storage.
        let again = Buffer::new(Some(&pool), b"hello");
        assert_eq!(pool.len(), 1);
        assert_eq!(again.ref_count(), 2);
    }

    #[test]
    fn distinct_pools_do_not_share_storage() {
        let pool_a = Pool::new();
        let pool_b = Pool::new();
        let a = Buffer::new(Some(&pool_a), b"shared-bytes");
        let b = Buffer::new(Some(&pool_b), b"shared-bytes");

        assert!(!a.ptr_eq(&b));
        assert_eq!(pool_a.len(), 1);
        assert_eq!(pool_b.len(), 1);
        assert_eq!(a.ref_count(), 2);
    }

    #[test]
    fn concurrent_inserts_share_one_entry() {
        let pool = Arc::new(Pool::new());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let pool = Arc::clone(&pool);
                thread::spawn(move || {
                    let buffers: Vec<_> = (0..100)
                        .map(|_| Buffer::new(Some(&pool), b"contended"))
                        .collect();
                    buffers.into_iter().next().expect("one buffer")
                })
            })
            .collect();
        let survivors: Vec<Buffer> = handles
            .into_iter()
            .map(|handle| handle.join().expect("no panics in workers"))
            .collect();

        // Every thread ended up sharing a single pool entry.
        assert_eq!(pool.len(), 1);
        assert_eq!(survivors[0].ref_count(), 1 + survivors.len());
        for survivor in &survivors[1..] {
            assert!(survivor.ptr_eq(&survivors[0]));
        }

        // All handles gone; the pool must be empty again.
        drop(survivors);
        assert!(pool.is_empty());
    }
}
