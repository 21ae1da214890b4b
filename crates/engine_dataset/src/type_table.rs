//! Ordered component type table.
//!
//! A [`ComponentTypeTable`] assigns each registered [`ComponentType`] a
//! contiguous slot in `0..len()`. Slots are only meaningful for the table
//! that produced them; [`ComponentTypeTable::diff`] computes how slots move
//! when one table replaces another.

use std::collections::HashMap;

use engine_component::{ComponentType, ComponentTypeId};

use crate::error::{DatasetError, Result};

/// Ordered, duplicate-free list of component types with slot lookup.
#[derive(Debug, Clone, Default)]
pub struct ComponentTypeTable {
    types: Vec<ComponentType>,
    slots: HashMap<ComponentTypeId, usize>,
}

impl ComponentTypeTable {
    /// Build a table from types in slot order.
    ///
    /// # Errors
    ///
    /// [`DatasetError::DuplicateComponentType`] if a type appears twice.
    pub fn new(types: impl IntoIterator<Item = ComponentType>) -> Result<Self> {
        let types: Vec<ComponentType> = types.into_iter().collect();
        let mut slots = HashMap::with_capacity(types.len());
        for (slot, ty) in types.iter().enumerate() {
            if slots.insert(ty.id(), slot).is_some() {
                return Err(DatasetError::DuplicateComponentType(ty.name().to_owned()));
            }
        }
        Ok(Self { types, slots })
    }

    /// Number of slots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Returns `true` if the table has no types.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Slot assigned to `id`, if registered.
    #[must_use]
    pub fn slot_of(&self, id: ComponentTypeId) -> Option<usize> {
        self.slots.get(&id).copied()
    }

    /// Slot assigned to `id`.
    ///
    /// # Errors
    ///
    /// [`DatasetError::ComponentTypeNotFound`] if `id` is not registered.
    pub fn require_slot(&self, id: ComponentTypeId) -> Result<usize> {
        self.slot_of(id)
            .ok_or_else(|| DatasetError::ComponentTypeNotFound(id.to_string()))
    }

    /// Slot assigned to `ty`, reporting the type by name when absent.
    ///
    /// # Errors
    ///
    /// [`DatasetError::ComponentTypeNotFound`] if `ty` is not registered.
    pub fn require_type(&self, ty: &ComponentType) -> Result<usize> {
        self.slot_of(ty.id())
            .ok_or_else(|| DatasetError::ComponentTypeNotFound(ty.name().to_owned()))
    }

    /// Returns `true` if `id` is registered.
    #[must_use]
    pub fn contains(&self, id: ComponentTypeId) -> bool {
        self.slots.contains_key(&id)
    }

    /// Descriptor stored at `slot`.
    #[must_use]
    pub fn get(&self, slot: usize) -> Option<&ComponentType> {
        self.types.get(slot)
    }

    /// Iterate descriptors in slot order.
    pub fn iter(&self) -> std::slice::Iter<'_, ComponentType> {
        self.types.iter()
    }

    /// Compare this table against `next`, which is about to replace it.
    #[must_use]
    pub fn diff(&self, next: &ComponentTypeTable) -> TableDiff {
        let remap: Vec<Option<usize>> = self.types.iter().map(|ty| next.slot_of(ty.id())).collect();
        let removed = self
            .types
            .iter()
            .enumerate()
            .filter(|(slot, _)| remap[*slot].is_none())
            .map(|(slot, ty)| (slot, ty.clone()))
            .collect();
        let added = next
            .types
            .iter()
            .filter(|ty| !self.contains(ty.id()))
            .cloned()
            .collect();
        TableDiff {
            added,
            removed,
            remap,
        }
    }
}

impl<'a> IntoIterator for &'a ComponentTypeTable {
    type Item = &'a ComponentType;
    type IntoIter = std::slice::Iter<'a, ComponentType>;

    fn into_iter(self) -> Self::IntoIter {
        self.types.iter()
    }
}

/// Result of [`ComponentTypeTable::diff`].
#[derive(Debug, Clone, Default)]
pub struct TableDiff {
    /// Types present only in the new table.
    pub added: Vec<ComponentType>,
    /// Types present only in the old table, with their old slot.
    pub removed: Vec<(usize, ComponentType)>,
    /// Old slot to new slot, `None` for removed types.
    pub remap: Vec<Option<usize>>,
}

impl TableDiff {
    /// Returns `true` if no type is added or removed and no slot moves.
    #[must_use]
    pub fn is_identity(&self) -> bool {
        self.added.is_empty()
            && self.removed.is_empty()
            && self
                .remap
                .iter()
                .enumerate()
                .all(|(old, new)| *new == Some(old))
    }
}
