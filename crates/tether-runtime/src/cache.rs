//! Address-keyed object cache.
//!
//! Maps a native address to the single wrapper representing it. Entries hold
//! `Weak` references: the cache never keeps a wrapper alive, the wrapper's
//! holders do.
//!
//! The lookup index lives on the heap and is authoritative. Each entry also
//! owns a table node carved out of the runtime's storage arena, holding the
//! key; nodes account for the table's native footprint and are never read on
//! the lookup path. When the storage arena is full, further nodes come from
//! overflow blocks the cache creates with the same geometry and owns until it
//! is dropped, so the number of live entries is not capped by the storage
//! arena's size.
//!
//! The table never shrinks. Nodes of removed entries go on a free list and
//! are reused by later inserts.

use std::rc::{Rc, Weak};

use indexmap::IndexMap;
use tracing::debug;

use tether_arena::{ArenaConfig, ArenaError, ArenaId, Arenas, NativeRef, OwnedArena};
use tether_core::NativeAddr;

/// Size of one table node in the storage arena: the key plus reserved space.
pub const NODE_BYTES: u32 = 16;

const NODE_ALIGN: u32 = 8;

struct Entry<T> {
    wrapper: Weak<T>,
    node: NativeRef,
}

/// Counters describing the cache table.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Entries currently present.
    pub live: usize,
    /// Nodes ever carved from the storage arena.
    pub nodes_allocated: u64,
    /// Inserts served from the node free list.
    pub nodes_recycled: u64,
    /// Arenas holding nodes: the storage arena plus overflow blocks.
    pub storage_blocks: usize,
}

/// Native address → wrapper table.
///
/// # Panics
///
/// [`ObjectCache::add`] on a present key and [`ObjectCache::remove`] on an
/// absent key both panic: either means a wrapper's lifecycle already went
/// wrong somewhere else, and carrying on could hand out a dangling wrapper.
pub struct ObjectCache<T> {
    entries: IndexMap<NativeAddr, Entry<T>>,
    storage: ArenaId,
    block_config: ArenaConfig,
    current: ArenaId,
    overflow: Vec<OwnedArena>,
    free_nodes: Vec<NativeRef>,
    nodes_allocated: u64,
    nodes_recycled: u64,
}

impl<T> ObjectCache<T> {
    /// Create an empty cache whose nodes come from `storage`, growing into
    /// overflow blocks shaped by `block_config` once it is full.
    pub fn new(storage: ArenaId, block_config: ArenaConfig) -> Self {
        Self {
            entries: IndexMap::new(),
            storage,
            block_config,
            current: storage,
            overflow: Vec::new(),
            free_nodes: Vec::new(),
            nodes_allocated: 0,
            nodes_recycled: 0,
        }
    }

    /// Insert `key → wrapper`.
    ///
    /// # Panics
    ///
    /// Panics if `key` is already present, if the storage arena was freed,
    /// or if no overflow block can be created.
    pub fn add(&mut self, key: NativeAddr, wrapper: &Rc<T>, arenas: &Arenas) {
        assert!(
            !self.entries.contains_key(&key),
            "object cache: duplicate add for live key {key}"
        );

        let node = match self.free_nodes.pop() {
            Some(node) => {
                self.nodes_recycled += 1;
                node
            }
            None => {
                let node = self.alloc_node(arenas);
                self.nodes_allocated += 1;
                node
            }
        };
        arenas
            .write(&node, |bytes| {
                bytes[..8].copy_from_slice(&key.get().to_le_bytes());
                bytes[8..].fill(0);
            })
            .unwrap_or_else(|e| panic!("object cache: storage arena unavailable: {e}"));

        self.entries.insert(
            key,
            Entry {
                wrapper: Rc::downgrade(wrapper),
                node,
            },
        );
    }

    fn alloc_node(&mut self, arenas: &Arenas) -> NativeRef {
        match arenas.alloc(self.current, NODE_BYTES, NODE_ALIGN) {
            Ok(node) => node,
            Err(ArenaError::CapacityExceeded { .. }) => {
                let block = arenas
                    .create_owned(&self.block_config)
                    .unwrap_or_else(|e| panic!("object cache: storage allocation failed: {e}"));
                let node = block
                    .alloc(NODE_BYTES, NODE_ALIGN)
                    .unwrap_or_else(|e| panic!("object cache: storage allocation failed: {e}"));
                debug!(block = %block.id(), live = self.entries.len(), "cache storage grown");
                self.current = block.id();
                self.overflow.push(block);
                node
            }
            Err(e) => panic!("object cache: storage allocation failed: {e}"),
        }
    }

    /// Remove the entry for `key`, returning the reference it held.
    ///
    /// # Panics
    ///
    /// Panics if `key` is not present.
    pub fn remove(&mut self, key: NativeAddr) -> Weak<T> {
        let entry = self
            .entries
            .swap_remove(&key)
            .unwrap_or_else(|| panic!("object cache: remove of absent key {key}"));
        self.free_nodes.push(entry.node);
        entry.wrapper
    }

    /// The live wrapper for `key`, as a new strong reference.
    pub fn get(&self, key: NativeAddr) -> Option<Rc<T>> {
        self.entries.get(&key)?.wrapper.upgrade()
    }

    /// Whether an entry exists for `key`.
    pub fn contains(&self, key: NativeAddr) -> bool {
        self.entries.contains_key(&key)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The arena holding this table's nodes.
    pub fn storage(&self) -> ArenaId {
        self.storage
    }

    /// Table counters.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            live: self.entries.len(),
            nodes_allocated: self.nodes_allocated,
            nodes_recycled: self.nodes_recycled,
            storage_blocks: 1 + self.overflow.len(),
        }
    }
}

#[cfg(test)]
impl<T> ObjectCache<T> {
    fn stored_key(&self, key: NativeAddr, arenas: &Arenas) -> Option<NativeAddr> {
        let node = self.entries.get(&key)?.node;
        arenas
            .read(&node, |b| NativeAddr(u64::from_le_bytes(b[..8].try_into().unwrap())))
            .ok()
    }
}
