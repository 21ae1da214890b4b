//! Runtime reconfiguration of the component type table.

use engine_component::ComponentType;
use tracing::{info, warn};

use super::{EntityComponentDataset, entity_at};
use crate::bitset::BitSet;
use crate::error::{DatasetError, Result};
use crate::type_table::ComponentTypeTable;

impl EntityComponentDataset {
    /// Replace the component type table with `types`, in slot order.
    ///
    /// Types present in both tables keep every instance, reachable through
    /// their new slot. Added types start empty. Removed types must have no
    /// live instance. Observers are rebuilt against the new table and keep
    /// their ids.
    ///
    /// Every check runs before anything changes, so a rejected call leaves
    /// the dataset untouched. The new table, columns and occupancy bitset
    /// are then swapped in together.
    ///
    /// # Errors
    ///
    /// [`DatasetError::DuplicateComponentType`] for a malformed list,
    /// [`DatasetError::ComponentTypesInUse`] naming removed types that still
    /// have instances, and [`DatasetError::ComponentTypeNotFound`] if a
    /// connected observer requires a removed type.
    pub fn set_component_type_map(
        &mut self,
        types: impl IntoIterator<Item = ComponentType>,
    ) -> Result<()> {
        let next = ComponentTypeTable::new(types)?;
        let diff = self.table.diff(&next);
        if diff.is_identity() {
            return Ok(());
        }

        let in_use: Vec<String> = diff
            .removed
            .iter()
            .filter(|(slot, _)| self.slot_in_use(*slot))
            .map(|(_, ty)| ty.name().to_owned())
            .collect();
        if !in_use.is_empty() {
            warn!(types = ?in_use, "refusing to remove component types with live instances");
            return Err(DatasetError::ComponentTypesInUse(in_use));
        }

        let bindings = self
            .observers
            .iter()
            .map(|(id, observer)| observer.bind(&next).map(|binding| (*id, binding)))
            .collect::<Result<Vec<_>>>()?;

        let slot_count = next.len();
        let occupancy = self.migrate_occupancy(&diff.remap, slot_count);
        let columns = std::mem::take(&mut self.columns).migrate(&diff.remap, slot_count);
        let mut observers_by_slot = vec![Vec::new(); slot_count];
        for (id, binding) in bindings {
            for &slot in binding.slots() {
                observers_by_slot[slot].push(id);
            }
            if let Some(observer) = self.observers.get_mut(&id) {
                observer.set_binding(binding);
            }
        }

        self.table = next;
        self.columns = columns;
        self.occupancy = occupancy;
        self.observers_by_slot = observers_by_slot;

        info!(
            added = diff.added.len(),
            removed = diff.removed.len(),
            slot_count,
            "component type map updated"
        );
        Ok(())
    }

    /// Returns `true` if any live entity has the occupancy bit for `slot`.
    fn slot_in_use(&self, slot: usize) -> bool {
        let slot_count = self.table.len();
        self.entity_occupancy
            .ones()
            .any(|index| self.occupancy.get(index * slot_count + slot))
    }

    /// Occupancy rebuilt for a table of `slot_count` slots.
    fn migrate_occupancy(&self, remap: &[Option<usize>], slot_count: usize) -> BitSet {
        let old_count = self.table.len();
        let mut next = BitSet::with_capacity(self.entity_occupancy.capacity() * slot_count);
        if old_count == 0 {
            return next;
        }
        for bit in self.occupancy.ones() {
            let (entity, slot) = (bit / old_count, bit % old_count);
            if let Some(Some(new_slot)) = remap.get(slot) {
                next.insert(entity * slot_count + new_slot);
            }
        }
        next
    }
}
