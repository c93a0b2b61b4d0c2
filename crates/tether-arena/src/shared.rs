//! Shared registry handle and exclusive arena ownership.
//!
//! [`Arenas`] is the allocator context passed to everything that touches
//! native memory. [`OwnedArena`] is the one owner of an arena: dropping it
//! is the only thing that frees the arena.
//!
//! The registry sits behind a `RefCell`, so the closures given to
//! [`Arenas::read`] and [`Arenas::write`] must not call back into the same
//! `Arenas`.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use tracing::warn;

use crate::config::ArenaConfig;
use crate::error::ArenaError;
use crate::handle::{ArenaId, NativeRef};
use crate::registry::{ArenaRegistry, ArenaUsage, RegistryStats};

/// Cheaply clonable handle to a shared [`ArenaRegistry`].
#[derive(Clone, Default)]
pub struct Arenas {
    registry: Rc<RefCell<ArenaRegistry>>,
}

impl Arenas {
    /// Create a handle to a new, empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an arena that stays alive until explicitly freed.
    pub fn create(&self, config: &ArenaConfig) -> Result<ArenaId, ArenaError> {
        self.registry.borrow_mut().create(config)
    }

    /// Create an arena freed when the returned owner is dropped.
    pub fn create_owned(&self, config: &ArenaConfig) -> Result<OwnedArena, ArenaError> {
        let id = self.create(config)?;
        Ok(OwnedArena {
            id,
            arenas: self.clone(),
        })
    }

    /// Free an arena created with [`Arenas::create`].
    pub fn free(&self, id: ArenaId) -> Result<ArenaUsage, ArenaError> {
        self.registry.borrow_mut().free(id)
    }

    /// Allocate a `len`-byte object aligned to `align` inside `id`.
    pub fn alloc(&self, id: ArenaId, len: u32, align: u32) -> Result<NativeRef, ArenaError> {
        self.registry.borrow_mut().alloc(id, len, align)
    }

    /// Run `f` over the object's bytes, if its arena is still alive.
    pub fn read<R>(&self, native: &NativeRef, f: impl FnOnce(&[u8]) -> R) -> Result<R, ArenaError> {
        let registry = self.registry.borrow();
        registry.read(native).map(f)
    }

    /// Run `f` over the object's bytes mutably, if its arena is still alive.
    pub fn write<R>(
        &self,
        native: &NativeRef,
        f: impl FnOnce(&mut [u8]) -> R,
    ) -> Result<R, ArenaError> {
        let mut registry = self.registry.borrow_mut();
        registry.write(native).map(f)
    }

    /// Whether `id` still names a live arena.
    pub fn is_live(&self, id: ArenaId) -> bool {
        self.registry.borrow().is_live(id)
    }

    /// Current usage of a live arena.
    pub fn usage(&self, id: ArenaId) -> Result<ArenaUsage, ArenaError> {
        self.registry.borrow().usage(id)
    }

    /// Registry-wide counters.
    pub fn stats(&self) -> RegistryStats {
        self.registry.borrow().stats()
    }

    /// Whether two handles share one registry.
    pub fn same_registry(&self, other: &Arenas) -> bool {
        Rc::ptr_eq(&self.registry, &other.registry)
    }
}

impl fmt::Debug for Arenas {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Arenas")
            .field("stats", &self.stats())
            .finish()
    }
}

/// Exclusive owner of one arena.
///
/// Not `Clone`: exactly one owner exists per arena, and dropping it frees the
/// arena along with every object allocated in it.
pub struct OwnedArena {
    id: ArenaId,
    arenas: Arenas,
}

impl OwnedArena {
    /// The owned arena's handle.
    pub fn id(&self) -> ArenaId {
        self.id
    }

    /// Allocate a `len`-byte object aligned to `align` inside this arena.
    pub fn alloc(&self, len: u32, align: u32) -> Result<NativeRef, ArenaError> {
        self.arenas.alloc(self.id, len, align)
    }

    /// Current usage of this arena.
    pub fn usage(&self) -> Result<ArenaUsage, ArenaError> {
        self.arenas.usage(self.id)
    }
}

impl fmt::Debug for OwnedArena {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OwnedArena").field("id", &self.id).finish()
    }
}

impl Drop for OwnedArena {
    fn drop(&mut self) {
        if let Err(e) = self.arenas.free(self.id) {
            // Only reachable if someone freed the arena behind the owner's back.
            warn!(id = %self.id, error = %e, "owned arena was already freed");
        }
    }
}
