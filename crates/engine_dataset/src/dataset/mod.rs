//! The entity/component dataset.
//!
//! [`EntityComponentDataset`] associates component instances with entity
//! indices. Storage is columnar: one sparse [`Column`](crate::column::Column)
//! per slot of the current [`ComponentTypeTable`], indexed by entity. A
//! flattened occupancy bitset, addressed as `entity * slot_count + slot`, is
//! the single source of truth for which `(entity, slot)` pairs are filled.
//!
//! ## Structural changes
//!
//! Every attach, detach, creation and removal notifies synchronously, in
//! this order:
//!
//! | change | notifications |
//! |--------|---------------|
//! | attach | component-added hooks, observers completed by the change, `component-added` entity event |
//! | detach | observers broken by the change (row still intact), then storage cleared, component-removed hooks, `component-removed` entity event |
//! | create | entity-created hooks |
//! | remove | detach of every component in slot order, `entity-removed` entity event, listener purge, entity-removed hooks |
//!
//! Callbacks receive `&mut EntityComponentDataset` and may change structure
//! themselves; nested changes run immediately. Every dispatch iterates a
//! snapshot of its handler list and re-checks state before each call.

mod bulk;
mod remap;
mod traverse;

use std::collections::BTreeMap;
use std::rc::Rc;

use engine_component::{Component, ComponentType, ComponentTypeId, Entity};
use tracing::{debug, trace};

use crate::bitset::BitSet;
use crate::column::{ColumnStore, ComponentRef};
use crate::config::DatasetConfig;
use crate::error::{DatasetError, Result};
use crate::events::{EntityEvent, EntityEventBus, EntityEventListener, event_names};
use crate::hooks::{ComponentChange, HookId, Hooks};
use crate::observer::{Observer, ObserverCallback, ObserverId};
use crate::type_table::ComponentTypeTable;

pub use traverse::ComponentCursor;

/// Dynamic-schema, bit-indexed entity/component store.
pub struct EntityComponentDataset {
    config: DatasetConfig,
    table: ComponentTypeTable,
    columns: ColumnStore,
    /// Bit `entity * slot_count + slot` is set iff the pair holds a component.
    occupancy: BitSet,
    /// Bit `entity` is set iff the entity is alive.
    entity_occupancy: BitSet,
    entity_count: usize,
    observers: BTreeMap<ObserverId, Observer>,
    observers_by_slot: Vec<Vec<ObserverId>>,
    next_observer_id: u64,
    events: EntityEventBus,
    hooks: Hooks,
}

/// Entity bits are only ever set below `max_entities`, which fits in `u32`.
fn entity_at(index: usize) -> Entity {
    Entity::from_raw(index as u32)
}

impl EntityComponentDataset {
    /// Create a dataset tracking `types`, in slot order.
    ///
    /// # Errors
    ///
    /// [`DatasetError::DuplicateComponentType`] if a type repeats.
    pub fn new(types: impl IntoIterator<Item = ComponentType>) -> Result<Self> {
        Self::with_config(types, DatasetConfig::default())
    }

    /// Create a dataset with explicit configuration.
    ///
    /// # Errors
    ///
    /// [`DatasetError::DuplicateComponentType`] if a type repeats.
    pub fn with_config(
        types: impl IntoIterator<Item = ComponentType>,
        config: DatasetConfig,
    ) -> Result<Self> {
        let table = ComponentTypeTable::new(types)?;
        let slot_count = table.len();
        let rows = config.initial_entity_capacity;
        Ok(Self {
            columns: ColumnStore::new(slot_count),
            occupancy: BitSet::with_capacity(rows * slot_count),
            entity_occupancy: BitSet::with_capacity(rows),
            entity_count: 0,
            observers: BTreeMap::new(),
            observers_by_slot: vec![Vec::new(); slot_count],
            next_observer_id: 0,
            events: EntityEventBus::default(),
            hooks: Hooks::default(),
            table,
            config,
        })
    }

    /// The configuration this dataset was built with.
    #[must_use]
    pub fn config(&self) -> &DatasetConfig {
        &self.config
    }

    /// The current component type table.
    #[must_use]
    pub fn component_type_map(&self) -> &ComponentTypeTable {
        &self.table
    }

    /// Number of slots in the current type table.
    #[must_use]
    pub fn component_type_count(&self) -> usize {
        self.table.len()
    }

    /// Current slot of a component type.
    #[must_use]
    pub fn slot_of(&self, id: ComponentTypeId) -> Option<usize> {
        self.table.slot_of(id)
    }

    /// Number of live entities.
    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.entity_count
    }

    /// Returns `true` if `entity` is alive.
    #[must_use]
    pub fn entity_exists(&self, entity: Entity) -> bool {
        self.entity_occupancy.get(entity.index())
    }

    /// Live entities in increasing index order.
    pub fn entities(&self) -> impl Iterator<Item = Entity> + '_ {
        self.entity_occupancy.ones().map(entity_at)
    }

    // -- Entity lifecycle --

    /// Create an entity at the lowest free index.
    ///
    /// # Errors
    ///
    /// [`DatasetError::EntityIndexOutOfRange`] if every index below
    /// `max_entities` is taken.
    pub fn create_entity(&mut self) -> Result<Entity> {
        let index = self.entity_occupancy.next_clear_bit(0);
        let limit = self.config.max_entities;
        let raw = u32::try_from(index)
            .ok()
            .filter(|raw| *raw < limit)
            .ok_or(DatasetError::EntityIndexOutOfRange { index, limit })?;
        let entity = Entity::from_raw(raw);
        self.occupy(entity);
        Ok(entity)
    }

    /// Create an entity at a caller-chosen index.
    ///
    /// # Errors
    ///
    /// [`DatasetError::EntityIndexOutOfRange`] past `max_entities`, and
    /// [`DatasetError::EntityAlreadyExists`] if the index is taken.
    pub fn create_entity_specific(&mut self, entity: Entity) -> Result<()> {
        self.check_entity_index(entity)?;
        if self.entity_exists(entity) {
            return Err(DatasetError::EntityAlreadyExists(entity));
        }
        self.occupy(entity);
        Ok(())
    }

    fn occupy(&mut self, entity: Entity) {
        self.entity_occupancy.insert(entity.index());
        self.entity_count += 1;
        trace!(entity = entity.id(), "entity created");
        for hook in Hooks::snapshot(&self.hooks.entity_created) {
            hook(self, entity);
        }
    }

    /// Remove an entity and every component attached to it.
    ///
    /// Components are detached one by one in slot order through
    /// [`remove_component_from_entity_by_index`](Self::remove_component_from_entity_by_index),
    /// so observers and listeners see each detach. The entity's listeners then
    /// receive `entity-removed` and are purged. The index becomes reusable.
    ///
    /// # Errors
    ///
    /// [`DatasetError::EntityNotAlive`] if the entity does not exist.
    pub fn remove_entity(&mut self, entity: Entity) -> Result<()> {
        self.require_alive(entity)?;

        self.detach_all(entity)?;
        if !self.entity_exists(entity) {
            return Ok(());
        }

        self.dispatch_event(entity, event_names::ENTITY_REMOVED, &EntityEvent::EntityRemoved);
        if !self.entity_exists(entity) {
            return Ok(());
        }
        // Listeners may have attached components while handling the event.
        self.detach_all(entity)?;
        if !self.entity_exists(entity) {
            return Ok(());
        }

        self.events.purge(entity);
        self.entity_occupancy.clear(entity.index());
        self.entity_count -= 1;
        trace!(entity = entity.id(), "entity removed");
        for hook in Hooks::snapshot(&self.hooks.entity_removed) {
            hook(self, entity);
        }
        Ok(())
    }

    /// Detach every component of `entity`, each type at most once per call.
    /// Types are tracked by id, so a callback that remaps the table mid-way
    /// does not cause a held type to be skipped.
    fn detach_all(&mut self, entity: Entity) -> Result<()> {
        let mut detached: Vec<ComponentTypeId> = Vec::new();
        while self.entity_exists(entity) {
            let Some((slot, id)) = self.next_held_type(entity, &detached) else {
                break;
            };
            detached.push(id);
            self.remove_component_from_entity_by_index(entity, slot)?;
        }
        Ok(())
    }

    /// Lowest occupied slot of `entity` whose type is not in `skip`.
    fn next_held_type(&self, entity: Entity, skip: &[ComponentTypeId]) -> Option<(usize, ComponentTypeId)> {
        let mut from = 0;
        while let Some(slot) = self.next_occupied_slot(entity, from) {
            from = slot + 1;
            let id = self.table.get(slot)?.id();
            if !skip.contains(&id) {
                return Some((slot, id));
            }
        }
        None
    }

    // -- Components --

    /// Attach `instance` to `entity` at `slot`.
    ///
    /// Observers registered on the type whose whole mask is now satisfied by
    /// the entity's row are completed. If a component-added hook remaps the
    /// table, observers are looked up at the type's new slot.
    ///
    /// # Errors
    ///
    /// [`DatasetError::EntityNotAlive`], [`DatasetError::SlotOutOfRange`], or
    /// [`DatasetError::ComponentAlreadyPresent`] if the slot is filled.
    pub fn add_component_to_entity_by_index(
        &mut self,
        entity: Entity,
        slot: usize,
        instance: ComponentRef,
    ) -> Result<()> {
        self.require_alive(entity)?;
        let component_type = self.type_at(slot)?;
        let bit = self.bit(entity, slot);
        if self.occupancy.get(bit) {
            return Err(DatasetError::ComponentAlreadyPresent { entity, slot });
        }

        self.occupancy.insert(bit);
        self.columns.insert(slot, entity.index(), Rc::clone(&instance));
        trace!(entity = entity.id(), slot, component = component_type.name(), "component added");

        let change = ComponentChange {
            entity,
            slot,
            component_type: component_type.id(),
            instance: Rc::clone(&instance),
        };
        for hook in Hooks::snapshot(&self.hooks.component_added) {
            hook(self, &change);
        }

        if let Some(slot) = self.table.slot_of(change.component_type) {
            self.notify_observers(entity, slot, true);
        }

        self.dispatch_event(
            entity,
            event_names::COMPONENT_ADDED,
            &EntityEvent::ComponentAdded {
                component_type,
                instance,
            },
        );
        Ok(())
    }

    /// Detach the component at `(entity, slot)`.
    ///
    /// Observers whose match is about to break are notified first, while the
    /// instance is still stored. Returns the detached instance, or `None` if
    /// the slot was empty.
    ///
    /// The instance is still in place while broken callbacks run, so a
    /// callback that detaches this same component (directly or by removing
    /// the entity) is notified again and must guard against recursion.
    ///
    /// # Errors
    ///
    /// [`DatasetError::EntityNotAlive`] or [`DatasetError::SlotOutOfRange`].
    pub fn remove_component_from_entity_by_index(
        &mut self,
        entity: Entity,
        slot: usize,
    ) -> Result<Option<ComponentRef>> {
        self.require_alive(entity)?;
        let id = self.type_at(slot)?.id();
        if !self.occupancy.get(self.bit(entity, slot)) {
            return Ok(None);
        }

        self.notify_observers(entity, slot, false);

        // A broken callback may already have detached it, or moved its slot.
        let Some(slot) = self.table.slot_of(id) else {
            return Ok(None);
        };
        let Ok(component_type) = self.type_at(slot) else {
            return Ok(None);
        };
        let bit = self.bit(entity, slot);
        if !self.occupancy.get(bit) {
            return Ok(None);
        }
        let Some(instance) = self.columns.remove(slot, entity.index()) else {
            return Ok(None);
        };
        self.occupancy.clear(bit);
        trace!(entity = entity.id(), slot, component = component_type.name(), "component removed");

        let change = ComponentChange {
            entity,
            slot,
            component_type: component_type.id(),
            instance: Rc::clone(&instance),
        };
        for hook in Hooks::snapshot(&self.hooks.component_removed) {
            hook(self, &change);
        }

        self.dispatch_event(
            entity,
            event_names::COMPONENT_REMOVED,
            &EntityEvent::ComponentRemoved {
                component_type,
                instance: Rc::clone(&instance),
            },
        );
        Ok(Some(instance))
    }

    /// Instance stored at `(entity, slot)`.
    #[must_use]
    pub fn get_component_by_index(&self, entity: Entity, slot: usize) -> Option<ComponentRef> {
        self.columns.get(slot, entity.index()).cloned()
    }

    /// Returns `true` if `(entity, slot)` holds a component.
    #[must_use]
    pub fn has_component_by_index(&self, entity: Entity, slot: usize) -> bool {
        slot < self.table.len() && self.occupancy.get(self.bit(entity, slot))
    }

    /// Instances of `types` held by `entity`, positionally; `None` where the
    /// entity lacks a type.
    ///
    /// # Errors
    ///
    /// [`DatasetError::EntityNotFound`] or
    /// [`DatasetError::ComponentTypeNotFound`].
    pub fn get_components(
        &self,
        entity: Entity,
        types: &[ComponentTypeId],
    ) -> Result<Vec<Option<ComponentRef>>> {
        self.require_exists(entity)?;
        let wanted = self.resolve_slots(types)?;
        let mut found = vec![None; wanted.len()];
        let mut from = 0;
        while let Some(slot) = self.next_occupied_slot(entity, from) {
            for (position, _) in wanted.iter().enumerate().filter(|(_, s)| **s == slot) {
                found[position] = self.columns.get(slot, entity.index()).cloned();
            }
            from = slot + 1;
        }
        Ok(found)
    }

    /// Every instance held by `entity`, in slot order.
    ///
    /// # Errors
    ///
    /// [`DatasetError::EntityNotFound`].
    pub fn get_all_components(&self, entity: Entity) -> Result<Vec<ComponentRef>> {
        self.require_exists(entity)?;
        let mut found = Vec::new();
        let mut from = 0;
        while let Some(slot) = self.next_occupied_slot(entity, from) {
            found.extend(self.columns.get(slot, entity.index()).cloned());
            from = slot + 1;
        }
        Ok(found)
    }

    /// First entity, by index, holding a component of type `id`.
    #[must_use]
    pub fn get_any_component(&self, id: ComponentTypeId) -> Option<(Entity, ComponentRef)> {
        let slot = self.table.slot_of(id)?;
        self.entities().find_map(|entity| {
            self.columns
                .get(slot, entity.index())
                .map(|instance| (entity, Rc::clone(instance)))
        })
    }

    /// Number of instances stored at `slot`.
    #[must_use]
    pub fn component_count_by_index(&self, slot: usize) -> usize {
        self.columns.column(slot).map_or(0, |column| column.len())
    }

    /// Attach a typed component, returning a handle to the stored instance.
    ///
    /// # Errors
    ///
    /// As [`add_component_to_entity_by_index`](Self::add_component_to_entity_by_index),
    /// plus [`DatasetError::ComponentTypeNotFound`] if `T` is not registered.
    pub fn add_component<T: Component>(&mut self, entity: Entity, value: T) -> Result<Rc<T>> {
        let slot = self.table.require_type(&T::component_type())?;
        let instance = Rc::new(value);
        self.add_component_to_entity_by_index(entity, slot, instance.clone())?;
        Ok(instance)
    }

    /// The `T` attached to `entity`.
    #[must_use]
    pub fn get_component<T: Component>(&self, entity: Entity) -> Option<Rc<T>> {
        let slot = self.table.slot_of(T::component_type_id())?;
        self.get_component_by_index(entity, slot)?.downcast::<T>().ok()
    }

    /// Returns `true` if `entity` holds a `T`.
    #[must_use]
    pub fn has_component<T: Component>(&self, entity: Entity) -> bool {
        self.table
            .slot_of(T::component_type_id())
            .is_some_and(|slot| self.has_component_by_index(entity, slot))
    }

    /// Detach the `T` attached to `entity`.
    ///
    /// # Errors
    ///
    /// As [`remove_component_from_entity_by_index`](Self::remove_component_from_entity_by_index),
    /// plus [`DatasetError::ComponentTypeNotFound`] if `T` is not registered.
    pub fn remove_component<T: Component>(&mut self, entity: Entity) -> Result<Option<Rc<T>>> {
        let slot = self.table.require_type(&T::component_type())?;
        Ok(self
            .remove_component_from_entity_by_index(entity, slot)?
            .and_then(|instance| instance.downcast::<T>().ok()))
    }

    // -- Observers --

    /// Connect `observer`, building it against the current type table.
    ///
    /// With `process_existing`, the observer is completed for every entity
    /// matching at connect time, in increasing index order, before this
    /// returns. Entities that only start matching during that walk are
    /// completed by the change that made them match, not by the walk.
    ///
    /// # Errors
    ///
    /// [`DatasetError::ComponentTypeNotFound`] if a required type is not
    /// registered.
    pub fn add_observer(&mut self, mut observer: Observer, process_existing: bool) -> Result<ObserverId> {
        observer.build(&self.table)?;
        let existing = if process_existing {
            self.matching_entities(&observer)
        } else {
            Vec::new()
        };

        let id = ObserverId(self.next_observer_id);
        self.next_observer_id += 1;
        for &slot in observer.binding().slots() {
            self.observers_by_slot[slot].push(id);
        }
        debug!(observer = %id, types = observer.types().len(), existing = existing.len(), "observer connected");
        self.observers.insert(id, observer);

        for entity in existing {
            let call = self
                .observers
                .get(&id)
                .and_then(|observer| self.match_call(observer, entity, true));
            if let Some((callback, arguments)) = call {
                callback(self, &arguments, entity);
            }
        }
        Ok(id)
    }

    /// Disconnect an observer and hand it back.
    ///
    /// With `notify_broken`, the observer's broken callback runs for every
    /// entity it matched when it was deregistered.
    ///
    /// # Errors
    ///
    /// [`DatasetError::ObserverNotFound`].
    pub fn remove_observer(&mut self, id: ObserverId, notify_broken: bool) -> Result<Observer> {
        let observer = self
            .observers
            .remove(&id)
            .ok_or(DatasetError::ObserverNotFound(id))?;
        for list in &mut self.observers_by_slot {
            list.retain(|registered| *registered != id);
        }
        debug!(observer = %id, "observer disconnected");

        if notify_broken {
            for entity in self.matching_entities(&observer) {
                if let Some((callback, arguments)) = self.match_call(&observer, entity, false) {
                    callback(self, &arguments, entity);
                }
            }
        }
        Ok(observer)
    }

    /// A connected observer.
    #[must_use]
    pub fn observer(&self, id: ObserverId) -> Option<&Observer> {
        self.observers.get(&id)
    }

    /// Number of connected observers.
    #[must_use]
    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    fn notify_observers(&mut self, entity: Entity, slot: usize, complete: bool) {
        let Some(ids) = self.observers_by_slot.get(slot).cloned() else {
            return;
        };
        for id in ids {
            let call = self
                .observers
                .get(&id)
                .and_then(|observer| self.match_call(observer, entity, complete));
            if let Some((callback, arguments)) = call {
                callback(self, &arguments, entity);
            }
        }
    }

    /// Live entities whose rows satisfy `observer`'s mask, in index order.
    fn matching_entities(&self, observer: &Observer) -> Vec<Entity> {
        self.entities()
            .filter(|entity| observer.matches_row(&self.occupancy, self.row_start(*entity)))
            .collect()
    }

    /// Callback and arguments for `observer` if `entity` currently matches it.
    fn match_call(
        &self,
        observer: &Observer,
        entity: Entity,
        complete: bool,
    ) -> Option<(ObserverCallback, Vec<ComponentRef>)> {
        if !self.entity_exists(entity) || !observer.matches_row(&self.occupancy, self.row_start(entity)) {
            return None;
        }
        let arguments = observer.arguments(&self.columns, entity)?;
        let callback = if complete {
            observer.on_complete()
        } else {
            observer.on_broken()
        };
        Some((callback, arguments))
    }

    // -- Entity events --

    /// Register `listener` for `name` events on `entity`. Returns `false` if
    /// that exact listener was already registered.
    ///
    /// # Errors
    ///
    /// [`DatasetError::EntityNotFound`].
    pub fn add_entity_event_listener(
        &mut self,
        entity: Entity,
        name: &str,
        listener: EntityEventListener,
    ) -> Result<bool> {
        self.require_exists(entity)?;
        Ok(self.events.add(entity, name, listener))
    }

    /// Deregister `listener`. Returns `false` if it was not registered.
    pub fn remove_entity_event_listener(
        &mut self,
        entity: Entity,
        name: &str,
        listener: &EntityEventListener,
    ) -> bool {
        self.events.remove(entity, name, listener)
    }

    /// Number of listeners registered for `name` on `entity`.
    #[must_use]
    pub fn entity_event_listener_count(&self, entity: Entity, name: &str) -> usize {
        self.events.count(entity, name)
    }

    /// Deliver `event` to the listeners registered for `name` on `entity`.
    ///
    /// # Errors
    ///
    /// [`DatasetError::EntityNotFound`].
    pub fn send_event(&mut self, entity: Entity, name: &str, event: &EntityEvent) -> Result<()> {
        self.require_exists(entity)?;
        self.dispatch_event(entity, name, event);
        Ok(())
    }

    fn dispatch_event(&mut self, entity: Entity, name: &str, event: &EntityEvent) {
        for listener in self.events.snapshot(entity, name) {
            listener(self, entity, event);
        }
    }

    // -- Hooks --

    /// Run `hook` after every entity creation.
    pub fn on_entity_created<F>(&mut self, hook: F) -> HookId
    where
        F: Fn(&mut EntityComponentDataset, Entity) + 'static,
    {
        let id = self.hooks.next_id();
        self.hooks.entity_created.push((id, Rc::new(hook)));
        id
    }

    /// Run `hook` after every entity removal.
    pub fn on_entity_removed<F>(&mut self, hook: F) -> HookId
    where
        F: Fn(&mut EntityComponentDataset, Entity) + 'static,
    {
        let id = self.hooks.next_id();
        self.hooks.entity_removed.push((id, Rc::new(hook)));
        id
    }

    /// Run `hook` after every component attach.
    pub fn on_component_added<F>(&mut self, hook: F) -> HookId
    where
        F: Fn(&mut EntityComponentDataset, &ComponentChange) + 'static,
    {
        let id = self.hooks.next_id();
        self.hooks.component_added.push((id, Rc::new(hook)));
        id
    }

    /// Run `hook` after every component detach.
    pub fn on_component_removed<F>(&mut self, hook: F) -> HookId
    where
        F: Fn(&mut EntityComponentDataset, &ComponentChange) + 'static,
    {
        let id = self.hooks.next_id();
        self.hooks.component_removed.push((id, Rc::new(hook)));
        id
    }

    /// Uninstall a hook. Returns `false` if `id` is unknown.
    pub fn remove_hook(&mut self, id: HookId) -> bool {
        self.hooks.remove(id)
    }

    // -- Addressing helpers --

    fn row_start(&self, entity: Entity) -> usize {
        entity.index() * self.table.len()
    }

    fn bit(&self, entity: Entity, slot: usize) -> usize {
        self.row_start(entity) + slot
    }

    /// Lowest occupied slot `>= from` in `entity`'s row.
    fn next_occupied_slot(&self, entity: Entity, from: usize) -> Option<usize> {
        let slot_count = self.table.len();
        if from >= slot_count {
            return None;
        }
        let row_start = self.row_start(entity);
        let bit = self.occupancy.next_set_bit(row_start + from)?;
        (bit < row_start + slot_count).then(|| bit - row_start)
    }

    fn type_at(&self, slot: usize) -> Result<ComponentType> {
        self.table
            .get(slot)
            .cloned()
            .ok_or(DatasetError::SlotOutOfRange {
                slot,
                slot_count: self.table.len(),
            })
    }

    fn resolve_slots(&self, types: &[ComponentTypeId]) -> Result<Vec<usize>> {
        types.iter().map(|id| self.table.require_slot(*id)).collect()
    }

    fn check_entity_index(&self, entity: Entity) -> Result<()> {
        if entity.id() >= self.config.max_entities {
            return Err(DatasetError::EntityIndexOutOfRange {
                index: entity.index(),
                limit: self.config.max_entities,
            });
        }
        Ok(())
    }

    fn require_alive(&self, entity: Entity) -> Result<()> {
        self.check_entity_index(entity)?;
        if !self.entity_exists(entity) {
            return Err(DatasetError::EntityNotAlive(entity));
        }
        Ok(())
    }

    fn require_exists(&self, entity: Entity) -> Result<()> {
        self.check_entity_index(entity)?;
        if !self.entity_exists(entity) {
            return Err(DatasetError::EntityNotFound(entity));
        }
        Ok(())
    }
}

impl std::fmt::Debug for EntityComponentDataset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityComponentDataset")
            .field("slot_count", &self.table.len())
            .field("entity_count", &self.entity_count)
            .field("observers", &self.observers.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests;
