//! Arena handles and native object references.
//!
//! An [`ArenaId`] names the registry that issued it, plus a slot index and a
//! generation counter. A
//! [`NativeRef`] locates one allocation inside an arena and remembers the
//! arena generation it was made in, so resolving it after the arena is freed
//! fails cleanly instead of reading reclaimed memory.

use std::fmt;

use tether_core::NativeAddr;

/// Handle to an arena.
///
/// `slot` is packed into the upper 32 bits of `packed` and the generation
/// into the lower 32. `registry` is the issuing registry's process-unique id.
/// Only the allocator mints these.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ArenaId {
    registry: u32,
    packed: u64,
}

impl ArenaId {
    pub(crate) fn new(registry: u32, slot: u32, generation: u32) -> Self {
        Self {
            registry,
            packed: (u64::from(slot) << 32) | u64::from(generation),
        }
    }

    /// Id of the registry that issued this handle.
    pub fn registry(self) -> u32 {
        self.registry
    }

    /// The slot this arena occupies in its registry.
    pub fn slot(self) -> u32 {
        (self.packed >> 32) as u32
    }

    /// The generation of the slot when this arena was created.
    pub fn generation(self) -> u32 {
        self.packed as u32
    }
}

impl fmt::Display for ArenaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "arena(reg={}, slot={}, gen={})",
            self.registry,
            self.slot(),
            self.generation()
        )
    }
}

/// A checked reference to one native object inside an arena.
///
/// Only the allocator creates these. Resolving one goes through the arena
/// registry, which compares generations before touching memory.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[must_use]
pub struct NativeRef {
    pub(crate) arena: ArenaId,
    pub(crate) segment: u16,
    pub(crate) offset: u32,
    pub(crate) len: u32,
    pub(crate) addr: NativeAddr,
}

impl NativeRef {
    /// The arena that owns this object.
    pub fn arena(&self) -> ArenaId {
        self.arena
    }

    /// The object's native address, its identity key.
    pub fn addr(&self) -> NativeAddr {
        self.addr
    }

    /// Size of the object in bytes.
    pub fn len(&self) -> u32 {
        self.len
    }

    /// Always false: the allocator rejects zero-sized objects.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl fmt::Display for NativeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{} ({} bytes)", self.addr, self.arena, self.len)
    }
}
