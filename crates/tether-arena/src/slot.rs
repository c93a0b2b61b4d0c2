//! Slot+generation table backing the arena registry.
//!
//! Freed arenas leave their slot with a bumped generation, so an
//! [`ArenaId`] minted before the free no longer matches and resolves to
//! `None` instead of aliasing whatever arena reuses the slot. Ids minted by a
//! different table never resolve here, whatever their slot and generation.

use crate::handle::ArenaId;

struct Slot<T> {
    generation: u32,
    data: Option<T>,
}

/// Maps [`ArenaId`]s to owned values, reusing slots through a free list.
pub(crate) struct SlotTable<T> {
    registry: u32,
    slots: Vec<Slot<T>>,
    free_list: Vec<u32>,
    live: usize,
}

impl<T> SlotTable<T> {
    pub(crate) const fn new(registry: u32) -> Self {
        Self {
            registry,
            slots: Vec::new(),
            free_list: Vec::new(),
            live: 0,
        }
    }

    pub(crate) fn insert(&mut self, value: T) -> ArenaId {
        self.live += 1;
        if let Some(slot_idx) = self.free_list.pop() {
            let slot = &mut self.slots[slot_idx as usize];
            slot.data = Some(value);
            ArenaId::new(self.registry, slot_idx, slot.generation)
        } else {
            let slot_idx = self.slots.len() as u32;
            self.slots.push(Slot {
                generation: 0,
                data: Some(value),
            });
            ArenaId::new(self.registry, slot_idx, 0)
        }
    }

    /// Whether `id` was minted by this table.
    pub(crate) fn issued(&self, id: ArenaId) -> bool {
        id.registry() == self.registry
    }

    pub(crate) fn get(&self, id: ArenaId) -> Option<&T> {
        if !self.issued(id) {
            return None;
        }
        let slot = self.slots.get(id.slot() as usize)?;
        if slot.generation != id.generation() {
            return None;
        }
        slot.data.as_ref()
    }

    pub(crate) fn get_mut(&mut self, id: ArenaId) -> Option<&mut T> {
        if !self.issued(id) {
            return None;
        }
        let slot = self.slots.get_mut(id.slot() as usize)?;
        if slot.generation != id.generation() {
            return None;
        }
        slot.data.as_mut()
    }

    /// Take the value out and retire its generation.
    ///
    /// A slot whose generation wraps back to 0 is never recycled, otherwise a
    /// handle from the slot's first epoch would resolve again.
    pub(crate) fn remove(&mut self, id: ArenaId) -> Option<T> {
        if !self.issued(id) {
            return None;
        }
        let slot_idx = id.slot();
        let slot = self.slots.get_mut(slot_idx as usize)?;
        if slot.generation != id.generation() {
            return None;
        }
        let value = slot.data.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        if slot.generation != 0 {
            self.free_list.push(slot_idx);
        }
        self.live -= 1;
        Some(value)
    }

    pub(crate) fn live(&self) -> usize {
        self.live
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_get_round_trip() {
        let mut table = SlotTable::new(1);
        let id = table.insert("a");
        assert_eq!(table.get(id), Some(&"a"));
        assert_eq!(table.live(), 1);
    }

    #[test]
    fn removed_id_is_stale() {
        let mut table = SlotTable::new(1);
        let id = table.insert(1u8);
        assert_eq!(table.remove(id), Some(1));
        assert_eq!(table.get(id), None);
        assert_eq!(table.get_mut(id), None);
        assert_eq!(table.remove(id), None);
        assert_eq!(table.live(), 0);
    }

    #[test]
    fn reused_slot_gets_new_generation() {
        let mut table = SlotTable::new(1);
        let first = table.insert(1u8);
        table.remove(first);
        let second = table.insert(2u8);
        assert_eq!(first.slot(), second.slot());
        assert_eq!(second.generation(), first.generation() + 1);
        assert_eq!(table.get(first), None);
        assert_eq!(table.get(second), Some(&2));
    }

    #[test]
    fn unknown_slot_returns_none() {
        let table: SlotTable<u8> = SlotTable::new(1);
        assert_eq!(table.get(ArenaId::new(1, 999, 0)), None);
    }

    #[test]
    fn id_from_another_table_never_resolves() {
        let mut ours = SlotTable::new(1);
        let mut theirs = SlotTable::new(2);
        let mine = ours.insert(1u8);
        let foreign = theirs.insert(2u8);
        assert_eq!((mine.slot(), mine.generation()), (foreign.slot(), foreign.generation()));
        assert!(!ours.issued(foreign));
        assert_eq!(ours.get(foreign), None);
        assert_eq!(ours.get_mut(foreign), None);
        assert_eq!(ours.remove(foreign), None);
        assert_eq!(ours.live(), 1);
    }

    #[test]
    fn generation_exhaustion_retires_slot() {
        let mut table = SlotTable::new(1);
        let id = table.insert(1u8);
        table.remove(id);
        table.slots[0].generation = u32::MAX;

        let last = table.insert(2u8);
        assert_eq!(last.generation(), u32::MAX);
        table.remove(last);
        assert_eq!(table.slots[0].generation, 0);
        assert!(
            !table.free_list.contains(&0),
            "slot with wrapped generation must be retired"
        );
        assert_eq!(table.get(ArenaId::new(1, 0, 0)), None);

        let fresh = table.insert(3u8);
        assert_ne!(fresh.slot(), 0, "retired slot must not be reused");
    }
}
