//! Runtime state and lifecycle.
//!
//! A [`Runtime`] exists only between a successful [`Runtime::on_load`] and
//! the matching [`Runtime::on_unload`]. Loading validates the config, creates
//! the cache's storage arena and registers wrapper types; if any step fails,
//! everything allocated so far is released and no runtime is produced.
//! Unloading drops the cache and frees its storage arena, along with any
//! overflow blocks the cache grew into, in one step.
//!
//! ```text
//!  (no runtime) ──on_load──► Active ──on_unload──► TornDown
//! ```
//!
//! All state is single-threaded. Internal `RefCell` borrows are never held
//! across a user closure or a wrapper drop, so wrappers may be created and
//! released from inside [`Runtime::get_or_create`] builders.

use std::cell::{Cell, Ref, RefCell};
use std::fmt;
use std::rc::Rc;

use tracing::{debug, info, trace, warn};

use tether_arena::{ArenaId, Arenas, NativeRef, OwnedArena};
use tether_core::{NativeAddr, WrapperKind};

use crate::cache::{CacheStats, ObjectCache};
use crate::config::RuntimeConfig;
use crate::error::{LoadError, WrapError};
use crate::types::{self, TypeHandle, TypeRegistry};
use crate::wrapper::{Binding, Wrapper, WrapperInner};

/// Lifecycle phase of a loaded runtime.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Loaded; cache and types are usable.
    Active,
    /// Unloaded; the cache and its storage are gone.
    TornDown,
}

/// Process-wide state owned by a loaded runtime.
pub struct ActiveState {
    cache: ObjectCache<WrapperInner>,
    types: TypeRegistry,
    storage: OwnedArena,
}

impl ActiveState {
    /// Registered wrapper types.
    pub fn types(&self) -> &TypeRegistry {
        &self.types
    }

    /// Object cache counters.
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Number of cached wrappers.
    pub fn cached(&self) -> usize {
        self.cache.len()
    }

    /// Whether an entry exists for `addr`.
    pub fn is_cached(&self, addr: NativeAddr) -> bool {
        self.cache.contains(addr)
    }

    /// The arena holding the cache's table nodes.
    pub fn storage_arena(&self) -> ArenaId {
        self.storage.id()
    }
}

impl fmt::Debug for ActiveState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActiveState")
            .field("cached", &self.cache.len())
            .field("types", &self.types)
            .field("storage", &self.storage.id())
            .finish()
    }
}

struct RuntimeInner {
    arenas: Arenas,
    config: RuntimeConfig,
    state: RefCell<Option<ActiveState>>,
    orphaned: Cell<u64>,
}

/// Handle to a loaded runtime. Cloning shares the same state.
#[derive(Clone)]
pub struct Runtime {
    inner: Rc<RuntimeInner>,
}

impl Runtime {
    /// Name of the backend this runtime implements.
    pub const BACKEND: &'static str = "tether";

    /// Load a runtime over a fresh arena registry.
    pub fn on_load(config: RuntimeConfig) -> Result<Self, LoadError> {
        Self::on_load_in(Arenas::new(), config)
    }

    /// Load a runtime whose arenas live in `arenas`.
    ///
    /// On error, every arena created during the attempt has been freed.
    pub fn on_load_in(arenas: Arenas, config: RuntimeConfig) -> Result<Self, LoadError> {
        config.validate()?;

        let storage = arenas
            .create_owned(&config.storage)
            .map_err(LoadError::Storage)?;

        let mut types = TypeRegistry::new(config.module_name.clone());
        // `storage` drops on the error path, freeing the arena.
        types::register_all(&mut types, &config.kinds)?;

        info!(
            module = %config.module_name,
            types = types.len(),
            storage = %storage.id(),
            "runtime loaded"
        );

        let state = ActiveState {
            cache: ObjectCache::new(storage.id(), config.storage.clone()),
            types,
            storage,
        };
        Ok(Self {
            inner: Rc::new(RuntimeInner {
                arenas,
                config,
                state: RefCell::new(Some(state)),
                orphaned: Cell::new(0),
            }),
        })
    }

    /// Tear the runtime down: drop the cache and free its storage.
    ///
    /// Wrappers still alive afterwards keep working as handles but are no
    /// longer reachable by lookup; their later release skips the cache.
    ///
    /// # Panics
    ///
    /// Panics if the runtime was already torn down.
    pub fn on_unload(&self) {
        let state = self
            .inner
            .state
            .borrow_mut()
            .take()
            .unwrap_or_else(|| panic!("runtime: on_unload of a torn-down runtime"));
        let live = state.cache.len();
        let storage = state.storage.id();
        drop(state);
        info!(live, storage = %storage, "runtime unloaded");
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> Phase {
        if self.inner.state.borrow().is_some() {
            Phase::Active
        } else {
            Phase::TornDown
        }
    }

    /// Whether the runtime is loaded.
    pub fn is_active(&self) -> bool {
        self.phase() == Phase::Active
    }

    /// Borrow the active state.
    ///
    /// Do not hold the returned guard across other runtime calls.
    ///
    /// # Panics
    ///
    /// Panics after teardown.
    pub fn state(&self) -> Ref<'_, ActiveState> {
        Ref::map(self.inner.state.borrow(), |state| {
            state
                .as_ref()
                .unwrap_or_else(|| panic!("runtime: used after teardown"))
        })
    }

    /// The arena registry backing this runtime.
    pub fn arenas(&self) -> &Arenas {
        &self.inner.arenas
    }

    /// The config this runtime was loaded with.
    pub fn config(&self) -> &RuntimeConfig {
        &self.inner.config
    }

    /// Wrappers released after teardown, which therefore skipped the cache.
    pub fn orphaned(&self) -> u64 {
        self.inner.orphaned.get()
    }

    /// Whether two handles refer to the same runtime.
    pub fn ptr_eq(a: &Runtime, b: &Runtime) -> bool {
        Rc::ptr_eq(&a.inner, &b.inner)
    }

    /// The handle for a registered kind.
    pub fn type_handle(&self, kind: WrapperKind) -> Result<TypeHandle, WrapError> {
        self.with_state(|s| s.types.handle(kind))
            .ok_or(WrapError::UnregisteredType { kind })
    }

    /// The cached wrapper for `addr`, as a new handle.
    ///
    /// # Panics
    ///
    /// Panics after teardown.
    pub fn cache_get(&self, addr: NativeAddr) -> Option<Wrapper> {
        let hit = self.with_state(|s| s.cache.get(addr)).map(Wrapper::from_inner);
        if hit.is_some() {
            trace!(%addr, "cache hit");
        }
        hit
    }

    /// Register `wrapper` as the representative of `addr`.
    ///
    /// # Panics
    ///
    /// Panics if `addr` is already cached, if `wrapper` is already registered
    /// under some address, if it belongs to another runtime, or after
    /// teardown.
    pub fn cache_add(&self, addr: NativeAddr, wrapper: &Wrapper) {
        let inner = wrapper.inner();
        assert!(
            Runtime::ptr_eq(self, &inner.runtime),
            "runtime: wrapper belongs to another runtime"
        );
        if let Some(existing) = inner.cache_key.get() {
            panic!("runtime: wrapper already cached under {existing}");
        }
        self.with_state_mut(|s| s.cache.add(addr, inner, &self.inner.arenas));
        inner.cache_key.set(Some(addr));
        trace!(%addr, kind = %wrapper.kind(), "cache add");
    }

    /// Remove the entry for `addr`. The wrapper itself stays alive for as
    /// long as it has handles.
    ///
    /// # Panics
    ///
    /// Panics if `addr` is not cached, or after teardown.
    pub fn cache_remove(&self, addr: NativeAddr) {
        let weak = self.with_state_mut(|s| s.cache.remove(addr));
        if let Some(inner) = weak.upgrade() {
            inner.cache_key.set(None);
        }
        trace!(%addr, "cache remove");
    }

    /// The single wrapper for `addr`, creating it on a miss.
    ///
    /// `build` runs only on a miss and may itself create or release other
    /// wrappers. If it ends up creating the wrapper for `addr`, that one is
    /// returned and the built binding is dropped.
    pub fn get_or_create<F>(
        &self,
        addr: NativeAddr,
        kind: WrapperKind,
        build: F,
    ) -> Result<Wrapper, WrapError>
    where
        F: FnOnce() -> Result<Binding, WrapError>,
    {
        if let Some(existing) = self.cache_get(addr) {
            debug_assert_eq!(existing.kind(), kind, "address {addr} cached as another kind");
            return Ok(existing);
        }

        let ty = self.type_handle(kind)?;
        let binding = build()?;
        if let Some(existing) = self.cache_get(addr) {
            return Ok(existing);
        }

        let wrapper = Wrapper::from_inner(Rc::new(WrapperInner {
            ty,
            identity: Some(addr),
            cache_key: Cell::new(None),
            target: binding.target,
            parent: binding.parent,
            arena: binding.arena,
            runtime: self.clone(),
        }));
        self.cache_add(addr, &wrapper);
        debug!(%addr, %kind, "wrapper created");
        Ok(wrapper)
    }

    /// The wrapper for an object allocated in an arena.
    ///
    /// `parent`, when given, must keep `target`'s arena alive, and the new
    /// wrapper holds a reference to it.
    pub fn wrap(
        &self,
        target: NativeRef,
        kind: WrapperKind,
        parent: Option<&Wrapper>,
    ) -> Result<Wrapper, WrapError> {
        self.inner.arenas.usage(target.arena())?;
        let binding = match parent {
            Some(parent) if parent.backing_arena() != Some(target.arena()) => {
                return Err(WrapError::ForeignArena { kind });
            }
            Some(parent) => Binding::borrowed(target, parent.clone()),
            None => Binding::unparented(target),
        };
        self.get_or_create(target.addr(), kind, || Ok(binding))
    }

    /// The wrapper for a native object known only by address.
    pub fn wrap_addr(&self, addr: NativeAddr, kind: WrapperKind) -> Result<Wrapper, WrapError> {
        self.get_or_create(addr, kind, || Ok(Binding::foreign()))
    }

    /// A fresh wrapper owning a new, empty arena. Arena holders are not
    /// cached: each call yields a distinct instance.
    pub fn new_arena_handle(&self) -> Result<Wrapper, WrapError> {
        let ty = self.type_handle(WrapperKind::Arena)?;
        let arena = self.inner.arenas.create_owned(&self.inner.config.object_arena)?;
        debug!(arena = %arena.id(), "arena handle created");
        Ok(Wrapper::from_inner(Rc::new(WrapperInner {
            ty,
            identity: None,
            cache_key: Cell::new(None),
            target: None,
            parent: None,
            arena: Some(arena),
            runtime: self.clone(),
        })))
    }

    /// Construct a wrapper the way a host constructor call would.
    ///
    /// Factory-only kinds are refused before anything is allocated. Pools and
    /// messages get their own arena holding a root object.
    pub fn construct(&self, kind: WrapperKind) -> Result<Wrapper, WrapError> {
        if kind.is_factory_only() {
            return Err(WrapError::Forbidden {
                type_name: kind.class_name(),
            });
        }
        if kind == WrapperKind::Arena {
            return self.new_arena_handle();
        }

        self.type_handle(kind)?;
        let arena = self.inner.arenas.create_owned(&self.inner.config.object_arena)?;
        let root = arena.alloc(RuntimeConfig::ROOT_OBJECT_BYTES, 8)?;
        self.get_or_create(root.addr(), kind, move || Ok(Binding::owning(Some(root), arena)))
    }

    pub(crate) fn release(&self, key: NativeAddr) {
        let mut state = self.inner.state.borrow_mut();
        match state.as_mut() {
            Some(active) => {
                active.cache.remove(key);
                trace!(addr = %key, "wrapper released");
            }
            None => {
                self.inner.orphaned.set(self.inner.orphaned.get() + 1);
                warn!(addr = %key, "wrapper released after runtime teardown");
            }
        }
    }

    fn with_state<R>(&self, f: impl FnOnce(&ActiveState) -> R) -> R {
        let state = self.inner.state.borrow();
        let active = state
            .as_ref()
            .unwrap_or_else(|| panic!("runtime: used after teardown"));
        f(active)
    }

    fn with_state_mut<R>(&self, f: impl FnOnce(&mut ActiveState) -> R) -> R {
        let mut state = self.inner.state.borrow_mut();
        let active = state
            .as_mut()
            .unwrap_or_else(|| panic!("runtime: used after teardown"));
        f(active)
    }
}

impl fmt::Debug for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("module", &self.inner.config.module_name)
            .field("phase", &self.phase())
            .finish()
    }
}
