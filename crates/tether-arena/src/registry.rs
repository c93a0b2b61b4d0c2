//! The arena registry: create, allocate into, resolve, and free arenas.

use std::sync::atomic::{AtomicU32, Ordering};

use tracing::debug;

use tether_core::NativeAddr;

use crate::config::ArenaConfig;
use crate::error::ArenaError;
use crate::handle::{ArenaId, NativeRef};
use crate::segment::SegmentList;
use crate::slot::SlotTable;

/// First address handed to an arena. Low addresses stay free for foreign
/// native objects that callers key by their own addresses.
const BASE_ADDRESS: u64 = 0x1_0000_0000;

/// Arena address ranges are page aligned and separated by one unused page.
const PAGE_SIZE: u64 = 4096;

/// Source of process-unique registry ids. 0 is never issued.
static NEXT_REGISTRY_ID: AtomicU32 = AtomicU32::new(1);

struct Arena {
    segments: SegmentList,
    base: NativeAddr,
    objects: u32,
}

/// Usage figures for one arena.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ArenaUsage {
    /// Number of objects allocated.
    pub objects: u32,
    /// Bytes handed out, including alignment padding.
    pub bytes_used: usize,
    /// Bytes reserved by the arena's segments.
    pub bytes_reserved: usize,
}

/// Registry-wide counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RegistryStats {
    /// Arenas currently alive.
    pub live: usize,
    /// Arenas ever created.
    pub created: u64,
    /// Arenas freed.
    pub freed: u64,
}

/// Owner of every live arena.
///
/// Arenas are addressed by [`ArenaId`]. Each one reserves a disjoint range of
/// native addresses that is never handed out again, so an address identifies
/// at most one object over the registry's whole lifetime.
///
/// Every registry has a process-unique id stamped into the handles it
/// issues; handles and references from another registry are rejected with
/// [`ArenaError::ForeignRegistry`].
pub struct ArenaRegistry {
    id: u32,
    arenas: SlotTable<Arena>,
    next_base: u64,
    created: u64,
    freed: u64,
}

impl ArenaRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        let id = NEXT_REGISTRY_ID.fetch_add(1, Ordering::Relaxed);
        assert!(id != 0, "arena registry ids exhausted");
        Self {
            id,
            arenas: SlotTable::new(id),
            next_base: BASE_ADDRESS,
            created: 0,
            freed: 0,
        }
    }

    /// Create a fresh, empty arena.
    pub fn create(&mut self, config: &ArenaConfig) -> Result<ArenaId, ArenaError> {
        config.validate()?;
        let reserved = config.capacity_bytes().div_ceil(PAGE_SIZE) * PAGE_SIZE + PAGE_SIZE;
        let base = self.next_base;
        self.next_base = base
            .checked_add(reserved)
            .ok_or(ArenaError::AddressSpaceExhausted)?;

        let id = self.arenas.insert(Arena {
            segments: SegmentList::new(config.segment_size, config.max_segments),
            base: NativeAddr(base),
            objects: 0,
        });
        self.created += 1;
        debug!(%id, base = %NativeAddr(base), "arena created");
        Ok(id)
    }

    /// Free an arena, invalidating every object it allocated.
    ///
    /// Returns the arena's final usage, or [`ArenaError::StaleArena`] if it
    /// was already freed.
    pub fn free(&mut self, id: ArenaId) -> Result<ArenaUsage, ArenaError> {
        self.check_issued(id)?;
        let arena = self
            .arenas
            .remove(id)
            .ok_or(ArenaError::StaleArena { arena: id })?;
        self.freed += 1;
        let usage = usage_of(&arena);
        debug!(%id, objects = usage.objects, bytes = usage.bytes_used, "arena freed");
        Ok(usage)
    }

    /// Allocate a `len`-byte object aligned to `align` inside `id`.
    pub fn alloc(&mut self, id: ArenaId, len: u32, align: u32) -> Result<NativeRef, ArenaError> {
        if len == 0 {
            return Err(ArenaError::ZeroSized);
        }
        self.check_issued(id)?;
        let arena = self
            .arenas
            .get_mut(id)
            .ok_or(ArenaError::StaleArena { arena: id })?;
        let segment_size = arena.segments.segment_size();
        if !align.is_power_of_two() || align > ArenaConfig::MAX_ALIGN.min(segment_size) {
            return Err(ArenaError::InvalidAlignment { align });
        }

        let (segment, offset) = arena.segments.alloc(len, align)?;
        let within = u64::from(segment) * u64::from(segment_size) + u64::from(offset);
        let addr = arena
            .base
            .checked_add(within)
            .ok_or(ArenaError::AddressSpaceExhausted)?;
        arena.objects += 1;
        Ok(NativeRef {
            arena: id,
            segment,
            offset,
            len,
            addr,
        })
    }

    /// Resolve an object to its bytes.
    pub fn read(&self, native: &NativeRef) -> Result<&[u8], ArenaError> {
        let arena = self.resolve(native)?;
        Ok(arena
            .segments
            .slice(native.segment, native.offset, native.len))
    }

    /// Resolve an object to its bytes for writing.
    pub fn write(&mut self, native: &NativeRef) -> Result<&mut [u8], ArenaError> {
        self.resolve(native)?;
        let arena = self
            .arenas
            .get_mut(native.arena)
            .ok_or(ArenaError::StaleArena {
                arena: native.arena,
            })?;
        Ok(arena
            .segments
            .slice_mut(native.segment, native.offset, native.len))
    }

    /// This registry's process-unique id.
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Whether `id` still names a live arena.
    pub fn is_live(&self, id: ArenaId) -> bool {
        self.arenas.get(id).is_some()
    }

    /// Current usage of a live arena.
    pub fn usage(&self, id: ArenaId) -> Result<ArenaUsage, ArenaError> {
        self.check_issued(id)?;
        self.arenas
            .get(id)
            .map(usage_of)
            .ok_or(ArenaError::StaleArena { arena: id })
    }

    /// Registry-wide counters.
    pub fn stats(&self) -> RegistryStats {
        RegistryStats {
            live: self.arenas.live(),
            created: self.created,
            freed: self.freed,
        }
    }
}

impl ArenaRegistry {
    fn check_issued(&self, id: ArenaId) -> Result<(), ArenaError> {
        if self.arenas.issued(id) {
            Ok(())
        } else {
            Err(ArenaError::ForeignRegistry { arena: id })
        }
    }

    /// Find the live arena behind `native` and check that the reference
    /// lies inside it, at the address the allocator gave it.
    fn resolve(&self, native: &NativeRef) -> Result<&Arena, ArenaError> {
        self.check_issued(native.arena)?;
        let arena = self.arenas.get(native.arena).ok_or(ArenaError::StaleArena {
            arena: native.arena,
        })?;
        let within = u64::from(native.segment) * u64::from(arena.segments.segment_size())
            + u64::from(native.offset);
        let placed = arena.base.checked_add(within) == Some(native.addr);
        if !placed || !arena.segments.covers(native.segment, native.offset, native.len) {
            return Err(ArenaError::ForeignRegistry {
                arena: native.arena,
            });
        }
        Ok(arena)
    }
}

impl Default for ArenaRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn usage_of(arena: &Arena) -> ArenaUsage {
    ArenaUsage {
        objects: arena.objects,
        bytes_used: arena.segments.total_used(),
        bytes_reserved: arena.segments.memory_bytes(),
    }
}
