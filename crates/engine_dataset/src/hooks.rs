//! Dataset-level structural notifications.
//!
//! Hooks observe every entity or every component change in the dataset, as
//! opposed to entity event listeners which are scoped to one entity. Like
//! listeners they receive the dataset mutably and are dispatched from a
//! snapshot.

use std::rc::Rc;

use engine_component::{ComponentTypeId, Entity};
use serde::{Deserialize, Serialize};

use crate::column::ComponentRef;
use crate::dataset::EntityComponentDataset;

/// Handle returned when a hook is installed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HookId(pub u64);

/// Details of an attach or detach, passed to component hooks.
#[derive(Clone)]
pub struct ComponentChange {
    /// The entity whose row changed.
    pub entity: Entity,
    /// Slot of the component type at the time of the change.
    pub slot: usize,
    /// Stable id of the component type.
    pub component_type: ComponentTypeId,
    /// The attached or detached instance.
    pub instance: ComponentRef,
}

impl std::fmt::Debug for ComponentChange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentChange")
            .field("entity", &self.entity)
            .field("slot", &self.slot)
            .field("component_type", &self.component_type)
            .finish_non_exhaustive()
    }
}

/// Called when an entity is created or removed.
pub type EntityHook = Rc<dyn Fn(&mut EntityComponentDataset, Entity)>;

/// Called when a component is attached or detached.
pub type ComponentHook = Rc<dyn Fn(&mut EntityComponentDataset, &ComponentChange)>;

#[derive(Default)]
pub(crate) struct Hooks {
    next_id: u64,
    pub(crate) entity_created: Vec<(HookId, EntityHook)>,
    pub(crate) entity_removed: Vec<(HookId, EntityHook)>,
    pub(crate) component_added: Vec<(HookId, ComponentHook)>,
    pub(crate) component_removed: Vec<(HookId, ComponentHook)>,
}

impl Hooks {
    pub(crate) fn next_id(&mut self) -> HookId {
        let id = HookId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Uninstall `id` from whichever list holds it.
    pub(crate) fn remove(&mut self, id: HookId) -> bool {
        fn take<H>(list: &mut Vec<(HookId, H)>, id: HookId) -> bool {
            match list.iter().position(|(hook_id, _)| *hook_id == id) {
                Some(position) => {
                    list.remove(position);
                    true
                }
                None => false,
            }
        }
        take(&mut self.entity_created, id)
            || take(&mut self.entity_removed, id)
            || take(&mut self.component_added, id)
            || take(&mut self.component_removed, id)
    }

    pub(crate) fn snapshot<H: Clone>(list: &[(HookId, H)]) -> Vec<H> {
        list.iter().map(|(_, hook)| hook.clone()).collect()
    }
}
