//! Reactive multi-type queries.
//!
//! An [`Observer`] watches for entities whose component set is a superset of
//! a fixed, ordered list of types. It is *complete* for an entity when the
//! last required component is attached, and *broken* just before any one of
//! them is detached. Both callbacks receive the matched instances in the
//! observer's declared type order plus the entity.
//!
//! Type lists are resolved to slots by [`Observer::build`]. The dataset calls
//! it on connection and again after every type-table remap, so an observer's
//! [`ObserverId`] and callbacks survive schema changes while its mask tracks
//! the current slots.

use std::collections::HashMap;
use std::rc::Rc;

use engine_component::{ComponentType, Entity};
use serde::{Deserialize, Serialize};

use crate::bitset::BitSet;
use crate::column::{ColumnStore, ComponentRef};
use crate::dataset::EntityComponentDataset;
use crate::error::{DatasetError, Result};
use crate::type_table::ComponentTypeTable;

/// Handle of an observer connected to a dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObserverId(pub u64);

impl std::fmt::Display for ObserverId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Observer({})", self.0)
    }
}

/// Match callback: instances in declared order, then the entity.
pub type ObserverCallback = Rc<dyn Fn(&mut EntityComponentDataset, &[ComponentRef], Entity)>;

/// Slot-level view of an observer against one type table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObserverBinding {
    mask: BitSet,
    slots: Vec<usize>,
    positions: HashMap<usize, usize>,
}

impl ObserverBinding {
    /// Bit per required slot.
    #[must_use]
    pub fn mask(&self) -> &BitSet {
        &self.mask
    }

    /// Required slots, in declared type order.
    #[must_use]
    pub fn slots(&self) -> &[usize] {
        &self.slots
    }

    /// Position of `slot` in the declared type order.
    #[must_use]
    pub fn position_of(&self, slot: usize) -> Option<usize> {
        self.positions.get(&slot).copied()
    }
}

/// A declarative multi-type reactive query.
pub struct Observer {
    types: Vec<ComponentType>,
    on_complete: ObserverCallback,
    on_broken: ObserverCallback,
    binding: ObserverBinding,
}

impl Observer {
    /// Declare an observer over `types`.
    ///
    /// The observer is unbound until [`Observer::build`] runs, which the
    /// dataset does when the observer is added.
    ///
    /// # Errors
    ///
    /// [`DatasetError::EmptyObserver`] if `types` is empty, and
    /// [`DatasetError::DuplicateComponentType`] if a type repeats.
    pub fn new<C, B>(
        types: impl IntoIterator<Item = ComponentType>,
        on_complete: C,
        on_broken: B,
    ) -> Result<Self>
    where
        C: Fn(&mut EntityComponentDataset, &[ComponentRef], Entity) + 'static,
        B: Fn(&mut EntityComponentDataset, &[ComponentRef], Entity) + 'static,
    {
        let types: Vec<ComponentType> = types.into_iter().collect();
        if types.is_empty() {
            return Err(DatasetError::EmptyObserver);
        }
        for (i, ty) in types.iter().enumerate() {
            if types[..i].contains(ty) {
                return Err(DatasetError::DuplicateComponentType(ty.name().to_owned()));
            }
        }
        Ok(Self {
            types,
            on_complete: Rc::new(on_complete),
            on_broken: Rc::new(on_broken),
            binding: ObserverBinding::default(),
        })
    }

    /// Resolve the declared types against `table`.
    ///
    /// Safe to call repeatedly. On failure the previous binding is kept.
    ///
    /// # Errors
    ///
    /// [`DatasetError::ComponentTypeNotFound`] if a declared type is not in
    /// `table`.
    pub fn build(&mut self, table: &ComponentTypeTable) -> Result<()> {
        self.binding = self.bind(table)?;
        Ok(())
    }

    /// Compute the binding against `table` without applying it.
    pub(crate) fn bind(&self, table: &ComponentTypeTable) -> Result<ObserverBinding> {
        let mut binding = ObserverBinding {
            mask: BitSet::with_capacity(table.len()),
            slots: Vec::with_capacity(self.types.len()),
            positions: HashMap::with_capacity(self.types.len()),
        };
        for (position, ty) in self.types.iter().enumerate() {
            let slot = table.require_type(ty)?;
            binding.mask.insert(slot);
            binding.slots.push(slot);
            binding.positions.insert(slot, position);
        }
        Ok(binding)
    }

    pub(crate) fn set_binding(&mut self, binding: ObserverBinding) {
        self.binding = binding;
    }

    /// Declared types, in callback argument order.
    #[must_use]
    pub fn types(&self) -> &[ComponentType] {
        &self.types
    }

    /// Current slot binding.
    #[must_use]
    pub fn binding(&self) -> &ObserverBinding {
        &self.binding
    }

    /// Returns `true` once [`Observer::build`] has succeeded.
    #[must_use]
    pub fn is_built(&self) -> bool {
        self.binding.slots.len() == self.types.len()
    }

    pub(crate) fn on_complete(&self) -> ObserverCallback {
        Rc::clone(&self.on_complete)
    }

    pub(crate) fn on_broken(&self) -> ObserverCallback {
        Rc::clone(&self.on_broken)
    }

    /// Returns `true` if every required slot is set in the occupancy row
    /// starting at `row_start`.
    pub(crate) fn matches_row(&self, occupancy: &BitSet, row_start: usize) -> bool {
        self.binding
            .mask
            .ones()
            .all(|slot| occupancy.get(row_start + slot))
    }

    /// Instances of `entity` in declared order, or `None` if one is missing.
    pub(crate) fn arguments(&self, columns: &ColumnStore, entity: Entity) -> Option<Vec<ComponentRef>> {
        let mut arguments: Vec<Option<ComponentRef>> = vec![None; self.types.len()];
        for slot in self.binding.mask.ones() {
            let position = self.binding.position_of(slot)?;
            arguments[position] = Some(Rc::clone(columns.get(slot, entity.index())?));
        }
        arguments.into_iter().collect()
    }
}

impl std::fmt::Debug for Observer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observer")
            .field("types", &self.types)
            .field("binding", &self.binding)
            .finish_non_exhaustive()
    }
}
