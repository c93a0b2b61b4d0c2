//! Host-visible wrapper handles.
//!
//! A [`Wrapper`] is a reference-counted handle: cloning it is an incref,
//! dropping it a decref. When the last handle goes, the wrapper first removes
//! its own cache entry and only then releases what it holds (its parent, then
//! its owned arena, in field order). So no lookup can observe a wrapper that
//! is being torn down, and an owned arena outlives every wrapper pointing
//! into it.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use tether_arena::{ArenaId, NativeRef, OwnedArena};
use tether_core::{NativeAddr, WrapperKind};

use crate::error::WrapError;
use crate::runtime::Runtime;
use crate::types::TypeHandle;

/// What a new wrapper holds on to.
///
/// Built by the caller of [`Runtime::get_or_create`] only on a cache miss.
#[derive(Debug)]
pub struct Binding {
    pub(crate) target: Option<NativeRef>,
    pub(crate) parent: Option<Wrapper>,
    pub(crate) arena: Option<OwnedArena>,
}

impl Binding {
    /// A native object this runtime does not allocate; only its address is
    /// known.
    pub fn foreign() -> Self {
        Self {
            target: None,
            parent: None,
            arena: None,
        }
    }

    /// An object inside memory kept alive by `parent`.
    pub fn borrowed(target: NativeRef, parent: Wrapper) -> Self {
        Self {
            target: Some(target),
            parent: Some(parent),
            arena: None,
        }
    }

    /// An arena-backed object with no owning wrapper. Access fails cleanly
    /// once the arena is freed.
    pub fn unparented(target: NativeRef) -> Self {
        Self {
            target: Some(target),
            parent: None,
            arena: None,
        }
    }

    /// A wrapper that exclusively owns `arena`, optionally pointing at an
    /// object inside it.
    pub fn owning(target: Option<NativeRef>, arena: OwnedArena) -> Self {
        Self {
            target,
            parent: None,
            arena: Some(arena),
        }
    }
}

pub(crate) struct WrapperInner {
    pub(crate) ty: TypeHandle,
    pub(crate) identity: Option<NativeAddr>,
    pub(crate) cache_key: Cell<Option<NativeAddr>>,
    pub(crate) target: Option<NativeRef>,
    pub(crate) parent: Option<Wrapper>,
    pub(crate) arena: Option<OwnedArena>,
    pub(crate) runtime: Runtime,
}

impl Drop for WrapperInner {
    fn drop(&mut self) {
        if let Some(key) = self.cache_key.take() {
            self.runtime.release(key);
        }
    }
}

/// A reference-counted handle to the single wrapper of a native object.
#[derive(Clone)]
pub struct Wrapper {
    inner: Rc<WrapperInner>,
}

impl Wrapper {
    pub(crate) fn from_inner(inner: Rc<WrapperInner>) -> Self {
        Self { inner }
    }

    pub(crate) fn inner(&self) -> &Rc<WrapperInner> {
        &self.inner
    }

    /// The wrapper's kind.
    pub fn kind(&self) -> WrapperKind {
        self.inner.ty.kind()
    }

    /// The registered type this wrapper is an instance of.
    pub fn type_handle(&self) -> TypeHandle {
        self.inner.ty
    }

    /// Native identity of the wrapped object. `None` for arena holders.
    pub fn addr(&self) -> Option<NativeAddr> {
        self.inner.identity
    }

    /// Whether the wrapper is currently registered in its runtime's cache.
    pub fn is_cached(&self) -> bool {
        self.inner.cache_key.get().is_some()
    }

    /// The arena-backed object this wrapper points at, if any.
    pub fn target(&self) -> Option<NativeRef> {
        self.inner.target
    }

    /// The wrapper keeping this one's memory alive, if any.
    pub fn parent(&self) -> Option<&Wrapper> {
        self.inner.parent.as_ref()
    }

    /// The arena this wrapper exclusively owns, if any.
    pub fn arena_id(&self) -> Option<ArenaId> {
        self.inner.arena.as_ref().map(OwnedArena::id)
    }

    /// The arena whose lifetime this wrapper's memory depends on.
    pub fn backing_arena(&self) -> Option<ArenaId> {
        self.arena_id()
            .or_else(|| self.inner.target.map(|t| t.arena()))
    }

    /// Number of live handles to this wrapper.
    pub fn ref_count(&self) -> usize {
        Rc::strong_count(&self.inner)
    }

    /// The runtime that created this wrapper.
    pub fn runtime(&self) -> &Runtime {
        &self.inner.runtime
    }

    /// Whether two handles refer to the same wrapper instance.
    pub fn ptr_eq(a: &Wrapper, b: &Wrapper) -> bool {
        Rc::ptr_eq(&a.inner, &b.inner)
    }

    /// Allocate an object inside the arena this wrapper owns.
    pub fn alloc(&self, len: u32, align: u32) -> Result<NativeRef, WrapError> {
        let arena = self
            .inner
            .arena
            .as_ref()
            .ok_or(WrapError::NoArena { kind: self.kind() })?;
        Ok(arena.alloc(len, align)?)
    }

    /// Run `f` over the wrapped object's bytes.
    ///
    /// Fails with [`ArenaError::StaleArena`](tether_arena::ArenaError) if the
    /// backing arena has been freed.
    pub fn read<R>(&self, f: impl FnOnce(&[u8]) -> R) -> Result<R, WrapError> {
        let target = self.require_target()?;
        Ok(self.inner.runtime.arenas().read(&target, f)?)
    }

    /// Run `f` over the wrapped object's bytes mutably.
    pub fn write<R>(&self, f: impl FnOnce(&mut [u8]) -> R) -> Result<R, WrapError> {
        let target = self.require_target()?;
        Ok(self.inner.runtime.arenas().write(&target, f)?)
    }

    fn require_target(&self) -> Result<NativeRef, WrapError> {
        self.inner
            .target
            .ok_or(WrapError::NoTarget { kind: self.kind() })
    }
}

impl fmt::Debug for Wrapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Wrapper")
            .field("kind", &self.kind())
            .field("addr", &self.addr())
            .field("cached", &self.is_cached())
            .field("refs", &self.ref_count())
            .finish()
    }
}
