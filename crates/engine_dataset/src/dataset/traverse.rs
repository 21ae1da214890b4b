//! Read-only traversal of the dataset.
//!
//! Traversals borrow the dataset immutably, so visitors cannot change
//! structure while a walk is in progress. Long walks that must be spread
//! over several calls use a [`ComponentCursor`].

use std::ops::ControlFlow;

use engine_component::{ComponentTypeId, Entity};
use serde::{Deserialize, Serialize};

use super::{EntityComponentDataset, entity_at};
use crate::column::ComponentRef;
use crate::error::{DatasetError, Result};

/// Saved position of an incremental walk over one slot.
///
/// Entities are visited in strictly increasing index order, so a cursor is
/// just the slot plus the next index to examine. Slots are only stable until
/// the next type-table remap; a cursor saved across a remap must be rebuilt
/// with the type's new slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentCursor {
    slot: usize,
    next_entity: usize,
    finished: bool,
}

impl ComponentCursor {
    /// Start a walk over `slot` from the lowest entity index.
    #[must_use]
    pub fn new(slot: usize) -> Self {
        Self {
            slot,
            next_entity: 0,
            finished: false,
        }
    }

    /// Resume a walk over `slot` just after `last_entity`.
    #[must_use]
    pub fn resume(slot: usize, last_entity: Entity) -> Self {
        Self {
            slot,
            next_entity: last_entity.index() + 1,
            finished: false,
        }
    }

    /// The slot being walked.
    #[must_use]
    pub fn slot(&self) -> usize {
        self.slot
    }

    /// Next entity index to examine.
    #[must_use]
    pub fn next_entity(&self) -> usize {
        self.next_entity
    }

    /// Returns `true` once the walk has passed the last live entity.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

impl EntityComponentDataset {
    /// Visit every entity holding at least `types`.
    ///
    /// The visitor receives the instances in `types` order and the entity,
    /// and may stop the walk by returning [`ControlFlow::Break`].
    ///
    /// # Errors
    ///
    /// [`DatasetError::ComponentTypeNotFound`] if a type is not registered.
    pub fn traverse_entities<F>(&self, types: &[ComponentTypeId], visitor: F) -> Result<ControlFlow<()>>
    where
        F: FnMut(&[ComponentRef], Entity) -> ControlFlow<()>,
    {
        let slots = self.resolve_slots(types)?;
        Ok(self.traverse_matching(&slots, false, visitor))
    }

    /// Visit every entity holding exactly `types` and nothing else.
    ///
    /// # Errors
    ///
    /// [`DatasetError::ComponentTypeNotFound`] if a type is not registered.
    pub fn traverse_entities_exact<F>(&self, types: &[ComponentTypeId], visitor: F) -> Result<ControlFlow<()>>
    where
        F: FnMut(&[ComponentRef], Entity) -> ControlFlow<()>,
    {
        let slots = self.resolve_slots(types)?;
        Ok(self.traverse_matching(&slots, true, visitor))
    }

    fn traverse_matching<F>(&self, slots: &[usize], exact: bool, mut visitor: F) -> ControlFlow<()>
    where
        F: FnMut(&[ComponentRef], Entity) -> ControlFlow<()>,
    {
        let slot_count = self.table.len();
        let mut arguments = Vec::with_capacity(slots.len());
        for index in self.entity_occupancy.ones() {
            let row_start = index * slot_count;
            if !slots.iter().all(|slot| self.occupancy.get(row_start + slot)) {
                continue;
            }
            if exact && self.occupancy.count_ones_in(row_start, row_start + slot_count) != slots.len() {
                continue;
            }
            arguments.clear();
            arguments.extend(slots.iter().filter_map(|slot| self.columns.get(*slot, index).cloned()));
            visitor(&arguments, entity_at(index))?;
        }
        ControlFlow::Continue(())
    }

    /// Visit, in increasing index order, every entity holding a component at
    /// `slot`.
    ///
    /// # Errors
    ///
    /// [`DatasetError::SlotOutOfRange`].
    pub fn traverse_components_by_index<F>(&self, slot: usize, mut visitor: F) -> Result<ControlFlow<()>>
    where
        F: FnMut(Entity, &ComponentRef) -> ControlFlow<()>,
    {
        self.type_at(slot)?;
        for index in self.entity_occupancy.ones() {
            if let Some(instance) = self.columns.get(slot, index) {
                if visitor(entity_at(index), instance).is_break() {
                    return Ok(ControlFlow::Break(()));
                }
            }
        }
        Ok(ControlFlow::Continue(()))
    }

    /// Continue the walk saved in `cursor`, visiting at most `budget`
    /// holders of its slot. Returns how many were visited; the cursor is left
    /// just after the last entity examined.
    ///
    /// # Errors
    ///
    /// [`DatasetError::SlotOutOfRange`] if the cursor's slot no longer exists.
    pub fn traverse_components_from<F>(
        &self,
        cursor: &mut ComponentCursor,
        budget: usize,
        mut visitor: F,
    ) -> Result<usize>
    where
        F: FnMut(Entity, &ComponentRef),
    {
        if cursor.slot >= self.table.len() {
            return Err(DatasetError::SlotOutOfRange {
                slot: cursor.slot,
                slot_count: self.table.len(),
            });
        }
        let mut visited = 0;
        while visited < budget {
            let Some(index) = self.entity_occupancy.next_set_bit(cursor.next_entity) else {
                cursor.finished = true;
                break;
            };
            cursor.next_entity = index + 1;
            if let Some(instance) = self.columns.get(cursor.slot, index) {
                visitor(entity_at(index), instance);
                visited += 1;
            }
        }
        Ok(visited)
    }
}
