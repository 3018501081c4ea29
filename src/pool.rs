//! Interning pool for property overrides.
//!
//! Structurally equal [`PropertiesOverride`] records share one slot. Each
//! slot is reference counted; the record is dropped the moment its count
//! reaches zero and the slot's generation is bumped, so a handle that
//! outlived its record is recognised instead of silently reading whatever
//! record reuses the slot.
//!
//! [`PropertyHandle`] is neither `Copy` nor `Clone`: every
//! handle value stands for exactly one reference. Duplicate one with
//! [`PropertyPool::acquire`] and give it back with
//! [`PropertyPool::release`].

use std::collections::HashMap;

use crate::errors::RenderError;
use crate::log::{trace, warn};
use crate::properties::{Attribute, PropertiesOverride};

/// One counted reference to an interned override record.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct PropertyHandle {
    index: u32,
    generation: u32,
}

impl PropertyHandle {
    /// Slot index, for diagnostics
    pub fn index(&self) -> u32 {
        self.index
    }
}

#[derive(Debug, Default)]
struct Slot {
    record: Option<PropertiesOverride>,
    ref_count: u32,
    generation: u32,
}

/// Value-keyed table of shared override records.
#[derive(Debug, Default)]
pub struct PropertyPool {
    slots: Vec<Slot>,
    lookup: HashMap<PropertiesOverride, u32>,
    free: Vec<u32>,
}

impl PropertyPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live records
    pub fn len(&self) -> usize {
        self.lookup.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lookup.is_empty()
    }

    fn slot(&self, handle: &PropertyHandle) -> Option<&Slot> {
        self.slots
            .get(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation && slot.record.is_some())
    }

    /// Find `record` by value, inserting it when absent, and take one
    /// reference to it.
    pub fn intern(&mut self, record: PropertiesOverride) -> PropertyHandle {
        if let Some(&index) = self.lookup.get(&record) {
            let slot = &mut self.slots[index as usize];
            slot.ref_count += 1;
            trace!(index, ref_count = slot.ref_count, "reusing interned properties");
            return PropertyHandle {
                index,
                generation: slot.generation,
            };
        }

        let index = match self.free.pop() {
            Some(index) => index,
            None => {
                self.slots.push(Slot::default());
                (self.slots.len() - 1) as u32
            }
        };
        let slot = &mut self.slots[index as usize];
        slot.record = Some(record.clone());
        slot.ref_count = 1;
        self.lookup.insert(record, index);
        trace!(index, generation = slot.generation, "interned new properties");
        PropertyHandle {
            index,
            generation: slot.generation,
        }
    }

    /// Take another reference to the record behind `handle`.
    pub fn acquire(&mut self, handle: &PropertyHandle) -> Result<PropertyHandle, RenderError> {
        if self.slot(handle).is_none() {
            return Err(RenderError::StaleProperties { index: handle.index });
        }
        let slot = &mut self.slots[handle.index as usize];
        slot.ref_count += 1;
        Ok(PropertyHandle {
            index: handle.index,
            generation: handle.generation,
        })
    }

    /// Give one reference back; the record is erased when none remain.
    pub fn release(&mut self, handle: PropertyHandle) {
        if self.slot(&handle).is_none() {
            warn!(index = handle.index, "release of stale property handle ignored");
            return;
        }
        let slot = &mut self.slots[handle.index as usize];
        slot.ref_count -= 1;
        if slot.ref_count > 0 {
            return;
        }
        if let Some(record) = slot.record.take() {
            self.lookup.remove(&record);
        }
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(handle.index);
        trace!(index = handle.index, "released last reference, record erased");
    }

    /// The record behind `handle`, or `None` once it has been released.
    pub fn get(&self, handle: &PropertyHandle) -> Option<&PropertiesOverride> {
        self.slot(handle).and_then(|slot| slot.record.as_ref())
    }

    /// Like [`get`](Self::get) but reports a stale handle as an error.
    pub fn resolve(&self, handle: &PropertyHandle) -> Result<&PropertiesOverride, RenderError> {
        self.get(handle)
            .ok_or(RenderError::StaleProperties { index: handle.index })
    }

    /// Current reference count of the record behind `handle` (0 if stale)
    pub fn ref_count(&self, handle: &PropertyHandle) -> u32 {
        self.slot(handle).map_or(0, |slot| slot.ref_count)
    }

    /// Copy-on-write edit: copy the record behind `base` (or start empty),
    /// change one attribute, give `base` back and intern the result.
    ///
    /// The pooled record itself is never mutated. A stale `base` counts as
    /// an empty record.
    pub fn with_override(
        &mut self,
        base: Option<PropertyHandle>,
        attribute: Attribute,
    ) -> PropertyHandle {
        let mut record = PropertiesOverride::default();
        if let Some(base) = base {
            match self.get(&base) {
                Some(existing) => record = existing.clone(),
                None => {
                    warn!(index = base.index, "overriding stale property handle");
                }
            }
            self.release(base);
        }
        record.set(attribute);
        self.intern(record)
    }
}
