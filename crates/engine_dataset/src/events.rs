//! Per-entity named event listeners.
//!
//! Listeners are registered per `(entity, event name)` and receive the
//! dataset mutably, so a handler may change structure (add or remove
//! components, entities, or listeners) while it runs. Dispatch iterates a
//! snapshot of the listener list taken when the event is sent:
//!
//! - a listener removed mid-dispatch still runs in that dispatch if it was in
//!   the snapshot, and never afterwards;
//! - a listener added mid-dispatch first runs on the next send.
//!
//! The dataset sends the structural events named in [`event_names`]; any
//! other name is free for ad-hoc use with [`EntityEvent::Custom`].

use std::any::Any;
use std::collections::HashMap;
use std::rc::Rc;

use engine_component::{ComponentType, Entity};

use crate::column::ComponentRef;
use crate::dataset::EntityComponentDataset;

/// Names of the events the dataset sends on structural change.
pub mod event_names {
    /// Sent after a component was attached.
    pub const COMPONENT_ADDED: &str = "component-added";
    /// Sent after a component was detached.
    pub const COMPONENT_REMOVED: &str = "component-removed";
    /// Sent while an entity is being removed, after its components are gone.
    pub const ENTITY_REMOVED: &str = "entity-removed";
}

/// Payload delivered to entity event listeners.
#[derive(Clone)]
pub enum EntityEvent {
    /// A component was attached to the entity.
    ComponentAdded {
        /// Type of the attached component.
        component_type: ComponentType,
        /// The attached instance.
        instance: ComponentRef,
    },
    /// A component was detached from the entity.
    ComponentRemoved {
        /// Type of the detached component.
        component_type: ComponentType,
        /// The detached instance.
        instance: ComponentRef,
    },
    /// The entity is being removed.
    EntityRemoved,
    /// Caller-defined payload.
    Custom(Rc<dyn Any>),
}

impl EntityEvent {
    /// Wrap a caller-defined value.
    #[must_use]
    pub fn custom<T: Any>(value: T) -> Self {
        Self::Custom(Rc::new(value))
    }

    /// The caller-defined value, if this is a [`EntityEvent::Custom`] holding
    /// a `T`.
    #[must_use]
    pub fn downcast_custom<T: Any>(&self) -> Option<&T> {
        match self {
            Self::Custom(value) => value.downcast_ref(),
            _ => None,
        }
    }
}

impl std::fmt::Debug for EntityEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ComponentAdded { component_type, .. } => f
                .debug_struct("ComponentAdded")
                .field("component_type", component_type)
                .finish_non_exhaustive(),
            Self::ComponentRemoved { component_type, .. } => f
                .debug_struct("ComponentRemoved")
                .field("component_type", component_type)
                .finish_non_exhaustive(),
            Self::EntityRemoved => f.write_str("EntityRemoved"),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// A registered listener. Identity is the `Rc` allocation, so registering
/// the same handle twice under one name is a no-op.
pub type EntityEventListener = Rc<dyn Fn(&mut EntityComponentDataset, Entity, &EntityEvent)>;

/// Wrap a closure as an [`EntityEventListener`].
pub fn listener<F>(f: F) -> EntityEventListener
where
    F: Fn(&mut EntityComponentDataset, Entity, &EntityEvent) + 'static,
{
    Rc::new(f)
}

/// Listener registry keyed by entity, then event name.
#[derive(Default)]
pub(crate) struct EntityEventBus {
    listeners: HashMap<Entity, HashMap<String, Vec<EntityEventListener>>>,
}

impl EntityEventBus {
    /// Register `listener`. Returns `false` if it was already registered.
    pub(crate) fn add(&mut self, entity: Entity, name: &str, listener: EntityEventListener) -> bool {
        let list = self
            .listeners
            .entry(entity)
            .or_default()
            .entry(name.to_owned())
            .or_default();
        if list.iter().any(|l| Rc::ptr_eq(l, &listener)) {
            return false;
        }
        list.push(listener);
        true
    }

    /// Deregister `listener`. Returns `false` if it was not registered.
    pub(crate) fn remove(&mut self, entity: Entity, name: &str, listener: &EntityEventListener) -> bool {
        let Some(by_name) = self.listeners.get_mut(&entity) else {
            return false;
        };
        let Some(list) = by_name.get_mut(name) else {
            return false;
        };
        let Some(position) = list.iter().position(|l| Rc::ptr_eq(l, listener)) else {
            return false;
        };
        list.remove(position);
        if list.is_empty() {
            by_name.remove(name);
            if by_name.is_empty() {
                self.listeners.remove(&entity);
            }
        }
        true
    }

    /// Copy of the listeners currently registered for `(entity, name)`.
    pub(crate) fn snapshot(&self, entity: Entity, name: &str) -> Vec<EntityEventListener> {
        self.listeners
            .get(&entity)
            .and_then(|by_name| by_name.get(name))
            .cloned()
            .unwrap_or_default()
    }

    /// Number of listeners registered for `(entity, name)`.
    pub(crate) fn count(&self, entity: Entity, name: &str) -> usize {
        self.listeners
            .get(&entity)
            .and_then(|by_name| by_name.get(name))
            .map_or(0, Vec::len)
    }

    /// Drop every registration for `entity`.
    pub(crate) fn purge(&mut self, entity: Entity) {
        self.listeners.remove(&entity);
    }

    /// Drop every registration.
    pub(crate) fn clear(&mut self) {
        self.listeners.clear();
    }
}
