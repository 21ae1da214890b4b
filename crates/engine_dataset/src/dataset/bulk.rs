//! Whole-dataset operations.
//!
//! None of these are transactional: a failure partway leaves what was
//! already applied in place.

use engine_component::ComponentTypeId;
use tracing::{debug, warn};

use super::{EntityComponentDataset, entity_at};
use crate::error::Result;

impl EntityComponentDataset {
    /// Remove every entity through [`remove_entity`](Self::remove_entity),
    /// so all teardown notifications fire.
    ///
    /// Entities created by callbacks during the clear are removed as well.
    ///
    /// # Errors
    ///
    /// The first error raised by an entity removal.
    pub fn clear(&mut self) -> Result<()> {
        let mut removed = 0usize;
        while let Some(index) = self.entity_occupancy.next_set_bit(0) {
            self.remove_entity(entity_at(index))?;
            removed += 1;
        }
        debug!(removed, "dataset cleared");
        Ok(())
    }

    /// Wipe every component, entity and listener without notifying anyone.
    ///
    /// Observers and hooks stay connected but are not told that their
    /// matches are gone; keeping them consistent is the caller's job.
    pub fn drop_data(&mut self) {
        warn!(
            entities = self.entity_count,
            observers = self.observers.len(),
            "dropping dataset contents without notifications"
        );
        self.columns.clear_all();
        self.occupancy.reset();
        self.entity_occupancy.reset();
        self.events.clear();
        self.entity_count = 0;
    }

    /// Import the entities of `source` together with their components of
    /// `types`.
    ///
    /// Entity indices are preserved: indices missing here are created with
    /// [`create_entity_specific`](Self::create_entity_specific). Components
    /// are shared, not cloned, and any component already present here for
    /// a copied type is detached first. `source` is not modified.
    ///
    /// # Errors
    ///
    /// [`DatasetError::ComponentTypeNotFound`](crate::DatasetError::ComponentTypeNotFound)
    /// if a type is missing from either table, before anything is copied;
    /// afterwards the first error raised by a structural change.
    pub fn masked_copy(&mut self, source: &EntityComponentDataset, types: &[ComponentTypeId]) -> Result<()> {
        let slot_pairs = types
            .iter()
            .map(|id| -> Result<(usize, usize)> {
                Ok((source.table.require_slot(*id)?, self.table.require_slot(*id)?))
            })
            .collect::<Result<Vec<_>>>()?;

        let mut entities = 0usize;
        let mut components = 0usize;
        for entity in source.entities() {
            if !self.entity_exists(entity) {
                self.create_entity_specific(entity)?;
            }
            entities += 1;
            for &(source_slot, slot) in &slot_pairs {
                let Some(instance) = source.get_component_by_index(entity, source_slot) else {
                    continue;
                };
                if self.has_component_by_index(entity, slot) {
                    self.remove_component_from_entity_by_index(entity, slot)?;
                }
                self.add_component_to_entity_by_index(entity, slot, instance)?;
                components += 1;
            }
        }
        debug!(entities, components, types = types.len(), "masked copy complete");
        Ok(())
    }
}
