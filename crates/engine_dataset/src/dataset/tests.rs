use std::cell::{Cell, RefCell};
use std::rc::Rc;

use engine_component::{Component, ComponentType, ComponentTypeId, Entity};

use super::*;
use crate::error::ErrorKind;
use crate::events::{EntityEvent, EntityEventListener, event_names, listener};

fn types(names: &[&'static str]) -> Vec<ComponentType> {
    names.iter().map(|n| ComponentType::named(*n)).collect()
}

fn id(name: &str) -> ComponentTypeId {
    ComponentTypeId::from_name(name)
}

fn instance(tag: &'static str) -> ComponentRef {
    Rc::new(tag)
}

fn tag(instance: &ComponentRef) -> &'static str {
    instance.downcast_ref::<&'static str>().copied().unwrap_or("?")
}

fn dataset(names: &[&'static str]) -> EntityComponentDataset {
    EntityComponentDataset::new(types(names)).unwrap()
}

/// Records `(label, tags..., entity)` for every observer callback.
fn recording_observer(
    names: &[&'static str],
    log: &Rc<RefCell<Vec<String>>>,
) -> Observer {
    let on_complete = {
        let log = log.clone();
        move |_: &mut EntityComponentDataset, args: &[ComponentRef], e: Entity| {
            let tags: Vec<_> = args.iter().map(tag).collect();
            log.borrow_mut().push(format!("complete {} {}", tags.join(","), e.id()));
        }
    };
    let on_broken = {
        let log = log.clone();
        move |ds: &mut EntityComponentDataset, args: &[ComponentRef], e: Entity| {
            let tags: Vec<_> = args.iter().map(tag).collect();
            let still_stored = ds.get_all_components(e).map_or(0, |c| c.len());
            log.borrow_mut()
                .push(format!("broken {} {} stored={}", tags.join(","), e.id(), still_stored));
        }
    };
    Observer::new(types(names), on_complete, on_broken).unwrap()
}

// -- Entity lifecycle --

#[test]
fn test_create_entity_starts_empty() {
    let mut ds = dataset(&["A"]);
    let e = ds.create_entity().unwrap();
    assert!(ds.entity_exists(e));
    assert!(ds.get_all_components(e).unwrap().is_empty());
    assert_eq!(ds.entity_count(), 1);
}

#[test]
fn test_removed_index_is_reused() {
    let mut ds = dataset(&["A"]);
    let e0 = ds.create_entity().unwrap();
    let e1 = ds.create_entity().unwrap();
    ds.remove_entity(e0).unwrap();
    assert_eq!(ds.create_entity().unwrap(), e0);
    assert_eq!(ds.create_entity().unwrap(), Entity(2));
    assert!(ds.entity_exists(e1));
}

#[test]
fn test_create_entity_specific() {
    let mut ds = dataset(&["A"]);
    ds.create_entity_specific(Entity(5)).unwrap();
    assert!(ds.entity_exists(Entity(5)));
    assert!(!ds.entity_exists(Entity(4)));
    assert_eq!(ds.create_entity().unwrap(), Entity(0));

    let err = ds.create_entity_specific(Entity(5)).unwrap_err();
    assert_eq!(err, DatasetError::EntityAlreadyExists(Entity(5)));
    assert_eq!(err.kind(), ErrorKind::State);
}

#[test]
fn test_entity_limit_is_index_error() {
    let config = DatasetConfig::new().with_max_entities(2);
    let mut ds = EntityComponentDataset::with_config(types(&["A"]), config).unwrap();
    ds.create_entity().unwrap();
    ds.create_entity().unwrap();
    let err = ds.create_entity().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Index);
    assert_eq!(
        ds.create_entity_specific(Entity(9)).unwrap_err().kind(),
        ErrorKind::Index
    );
}

#[test]
fn test_double_removal_is_state_error() {
    let mut ds = dataset(&["A"]);
    let e = ds.create_entity().unwrap();
    ds.remove_entity(e).unwrap();
    let err = ds.remove_entity(e).unwrap_err();
    assert_eq!(err, DatasetError::EntityNotAlive(e));
    assert_eq!(err.kind(), ErrorKind::State);
}

#[test]
fn test_entities_iterate_in_index_order() {
    let mut ds = dataset(&[]);
    ds.create_entity_specific(Entity(70)).unwrap();
    ds.create_entity_specific(Entity(3)).unwrap();
    ds.create_entity_specific(Entity(64)).unwrap();
    assert_eq!(
        ds.entities().collect::<Vec<_>>(),
        vec![Entity(3), Entity(64), Entity(70)]
    );
}

// -- Components --

#[test]
fn test_add_then_get_returns_same_instance() {
    let mut ds = dataset(&["A", "B"]);
    let e = ds.create_entity().unwrap();
    assert!(ds.get_component_by_index(e, 1).is_none());
    assert!(!ds.has_component_by_index(e, 1));

    let b = instance("b");
    ds.add_component_to_entity_by_index(e, 1, b.clone()).unwrap();
    assert!(Rc::ptr_eq(&ds.get_component_by_index(e, 1).unwrap(), &b));
    assert!(ds.has_component_by_index(e, 1));
    assert_eq!(ds.component_count_by_index(1), 1);
}

#[test]
fn test_attach_detach_restores_occupancy() {
    let mut ds = dataset(&["A", "B"]);
    let e = ds.create_entity().unwrap();
    ds.add_component_to_entity_by_index(e, 0, instance("a")).unwrap();
    let before = ds.occupancy.clone();

    let b = instance("b");
    ds.add_component_to_entity_by_index(e, 1, b.clone()).unwrap();
    let removed = ds.remove_component_from_entity_by_index(e, 1).unwrap().unwrap();

    assert!(Rc::ptr_eq(&removed, &b));
    assert_eq!(ds.occupancy, before);
    assert!(ds.columns.get(1, e.index()).is_none());
    assert_eq!(ds.component_count_by_index(1), 0);
}

#[test]
fn test_detach_empty_slot_is_noop() {
    let mut ds = dataset(&["A"]);
    let e = ds.create_entity().unwrap();
    assert!(ds.remove_component_from_entity_by_index(e, 0).unwrap().is_none());
}

#[test]
fn test_component_errors() {
    let mut ds = dataset(&["A"]);
    let e = ds.create_entity().unwrap();

    let err = ds.add_component_to_entity_by_index(e, 1, instance("x")).unwrap_err();
    assert_eq!(
        err,
        DatasetError::SlotOutOfRange {
            slot: 1,
            slot_count: 1
        }
    );
    assert_eq!(err.kind(), ErrorKind::Index);

    let err = ds
        .add_component_to_entity_by_index(Entity(9), 0, instance("x"))
        .unwrap_err();
    assert_eq!(err, DatasetError::EntityNotAlive(Entity(9)));

    ds.add_component_to_entity_by_index(e, 0, instance("a")).unwrap();
    let err = ds.add_component_to_entity_by_index(e, 0, instance("a2")).unwrap_err();
    assert_eq!(err, DatasetError::ComponentAlreadyPresent { entity: e, slot: 0 });
    assert_eq!(tag(&ds.get_component_by_index(e, 0).unwrap()), "a");
}

#[test]
fn test_get_components_positional() {
    let mut ds = dataset(&["A", "B", "C"]);
    let e = ds.create_entity().unwrap();
    ds.add_component_to_entity_by_index(e, 0, instance("a")).unwrap();
    ds.add_component_to_entity_by_index(e, 2, instance("c")).unwrap();

    let found = ds.get_components(e, &[id("C"), id("B"), id("A")]).unwrap();
    let tags: Vec<_> = found.iter().map(|f| f.as_ref().map(tag)).collect();
    assert_eq!(tags, vec![Some("c"), None, Some("a")]);

    let all: Vec<_> = ds.get_all_components(e).unwrap().iter().map(tag).collect();
    assert_eq!(all, vec!["a", "c"]);

    assert_eq!(
        ds.get_components(Entity(4), &[id("A")]).unwrap_err().kind(),
        ErrorKind::NotFound
    );
    assert_eq!(
        ds.get_components(e, &[id("Z")]).unwrap_err().kind(),
        ErrorKind::NotFound
    );
}

#[test]
fn test_get_any_component() {
    let mut ds = dataset(&["A", "B"]);
    ds.create_entity().unwrap();
    let e1 = ds.create_entity().unwrap();
    let e2 = ds.create_entity().unwrap();
    ds.add_component_to_entity_by_index(e2, 1, instance("late")).unwrap();
    ds.add_component_to_entity_by_index(e1, 1, instance("early")).unwrap();

    let (entity, found) = ds.get_any_component(id("B")).unwrap();
    assert_eq!(entity, e1);
    assert_eq!(tag(&found), "early");
    assert!(ds.get_any_component(id("A")).is_none());
}

#[derive(Debug)]
struct Health {
    current: Cell<i32>,
}

impl Component for Health {
    fn type_name() -> &'static str {
        "Health"
    }
}

#[derive(Debug)]
struct Shield;

impl Component for Shield {
    fn type_name() -> &'static str {
        "Shield"
    }
}

#[test]
fn test_typed_access() {
    let mut ds = EntityComponentDataset::new([Health::component_type()]).unwrap();
    let e = ds.create_entity().unwrap();
    let stored = ds.add_component(e, Health { current: Cell::new(10) }).unwrap();
    assert!(ds.has_component::<Health>(e));

    ds.get_component::<Health>(e).unwrap().current.set(4);
    assert_eq!(stored.current.get(), 4);

    let removed = ds.remove_component::<Health>(e).unwrap().unwrap();
    assert!(Rc::ptr_eq(&removed, &stored));
    assert!(!ds.has_component::<Health>(e));

    assert!(!ds.has_component::<Shield>(e));
    let err = ds.add_component(e, Shield).unwrap_err();
    assert_eq!(err, DatasetError::ComponentTypeNotFound("Shield".into()));
}

// -- Entity removal --

#[test]
fn test_remove_entity_detaches_everything_once() {
    let mut ds = dataset(&["A", "B", "C"]);
    let e = ds.create_entity().unwrap();
    let other = ds.create_entity().unwrap();
    ds.add_component_to_entity_by_index(e, 0, instance("a")).unwrap();
    ds.add_component_to_entity_by_index(e, 2, instance("c")).unwrap();
    ds.add_component_to_entity_by_index(other, 0, instance("o")).unwrap();

    let removed_slots = Rc::new(RefCell::new(Vec::new()));
    let slots_log = removed_slots.clone();
    ds.on_component_removed(move |_, change| slots_log.borrow_mut().push(change.slot));
    let removed_entities = Rc::new(Cell::new(0));
    let entity_log = removed_entities.clone();
    ds.on_entity_removed(move |_, _| entity_log.set(entity_log.get() + 1));

    ds.remove_entity(e).unwrap();

    assert_eq!(*removed_slots.borrow(), vec![0, 2]);
    assert_eq!(removed_entities.get(), 1);
    assert!(!ds.entity_exists(e));
    for slot in 0..3 {
        assert!(!ds.occupancy.get(e.index() * 3 + slot));
    }
    assert!(ds.has_component_by_index(other, 0));
    assert_eq!(ds.entity_count(), 1);
}

#[test]
fn test_entity_removed_event_precedes_purge() {
    let mut ds = dataset(&["A"]);
    let e = ds.create_entity().unwrap();
    let late_calls = Rc::new(Cell::new(0));
    let seen: Rc<RefCell<Vec<String>>> = Rc::new(RefCell::new(Vec::new()));

    let late = {
        let late_calls = late_calls.clone();
        listener(move |_, _, _| late_calls.set(late_calls.get() + 1))
    };
    let on_removed = {
        let seen = seen.clone();
        let late = late.clone();
        listener(move |ds, e, event| {
            seen.borrow_mut()
                .push(format!("{event:?} alive={}", ds.entity_exists(e)));
            ds.add_entity_event_listener(e, event_names::ENTITY_REMOVED, late.clone())
                .unwrap();
        })
    };
    ds.add_entity_event_listener(e, event_names::ENTITY_REMOVED, on_removed)
        .unwrap();

    ds.remove_entity(e).unwrap();

    assert_eq!(*seen.borrow(), vec!["EntityRemoved alive=true".to_string()]);
    assert_eq!(late_calls.get(), 0);
    assert_eq!(ds.entity_event_listener_count(e, event_names::ENTITY_REMOVED), 0);

    // A new entity at the same index starts without listeners.
    assert_eq!(ds.create_entity().unwrap(), e);
    assert_eq!(ds.entity_event_listener_count(e, event_names::ENTITY_REMOVED), 0);
}

#[test]
fn test_broken_callback_may_detach_other_components() {
    let mut ds = dataset(&["A", "B"]);
    let e = ds.create_entity().unwrap();
    ds.add_component_to_entity_by_index(e, 0, instance("a")).unwrap();
    ds.add_component_to_entity_by_index(e, 1, instance("b")).unwrap();

    // Losing B also strips A.
    let observer = Observer::new(
        types(&["B"]),
        |_, _, _| {},
        |ds, _, e| {
            ds.remove_component_from_entity_by_index(e, 0).unwrap();
        },
    )
    .unwrap();
    ds.add_observer(observer, false).unwrap();
    let removed = Rc::new(RefCell::new(Vec::new()));
    let log = removed.clone();
    ds.on_component_removed(move |_, change| log.borrow_mut().push(change.slot));

    ds.remove_component_from_entity_by_index(e, 1).unwrap();

    assert!(ds.entity_exists(e));
    assert!(ds.get_all_components(e).unwrap().is_empty());
    // The nested detach completes first.
    assert_eq!(*removed.borrow(), vec![0, 1]);
}

// -- Observers --

#[test]
fn test_observer_processes_existing_supersets_only() {
    let mut ds = dataset(&["A", "B", "C"]);
    let full = ds.create_entity().unwrap();
    let partial = ds.create_entity().unwrap();
    let extra = ds.create_entity().unwrap();
    ds.add_component_to_entity_by_index(full, 0, instance("a0")).unwrap();
    ds.add_component_to_entity_by_index(full, 1, instance("b0")).unwrap();
    ds.add_component_to_entity_by_index(partial, 1, instance("b1")).unwrap();
    ds.add_component_to_entity_by_index(extra, 0, instance("a2")).unwrap();
    ds.add_component_to_entity_by_index(extra, 1, instance("b2")).unwrap();
    ds.add_component_to_entity_by_index(extra, 2, instance("c2")).unwrap();

    let log = Rc::new(RefCell::new(Vec::new()));
    ds.add_observer(recording_observer(&["B", "A"], &log), true)
        .unwrap();

    assert_eq!(
        *log.borrow(),
        vec!["complete b0,a0 0".to_string(), "complete b2,a2 2".to_string()]
    );
}

#[test]
fn test_observer_without_processing_existing_stays_silent() {
    let mut ds = dataset(&["A"]);
    let e = ds.create_entity().unwrap();
    ds.add_component_to_entity_by_index(e, 0, instance("a")).unwrap();
    let log = Rc::new(RefCell::new(Vec::new()));
    ds.add_observer(recording_observer(&["A"], &log), false)
        .unwrap();
    assert!(log.borrow().is_empty());
}

#[test]
fn test_observer_completes_on_last_required_component() {
    let mut ds = dataset(&["A", "B", "C"]);
    let log = Rc::new(RefCell::new(Vec::new()));
    ds.add_observer(recording_observer(&["A", "B"], &log), false)
        .unwrap();
    let e = ds.create_entity().unwrap();

    ds.add_component_to_entity_by_index(e, 0, instance("a")).unwrap();
    assert!(log.borrow().is_empty());
    ds.add_component_to_entity_by_index(e, 2, instance("c")).unwrap();
    assert!(log.borrow().is_empty());
    ds.add_component_to_entity_by_index(e, 1, instance("b")).unwrap();
    assert_eq!(*log.borrow(), vec!["complete a,b 0".to_string()]);
}

#[test]
fn test_broken_fires_before_storage_is_cleared() {
    let mut ds = dataset(&["A", "B"]);
    let e = ds.create_entity().unwrap();
    ds.add_component_to_entity_by_index(e, 0, instance("a")).unwrap();
    ds.add_component_to_entity_by_index(e, 1, instance("b")).unwrap();
    let log = Rc::new(RefCell::new(Vec::new()));
    ds.add_observer(recording_observer(&["A", "B"], &log), false)
        .unwrap();

    ds.remove_component_from_entity_by_index(e, 1).unwrap();
    assert_eq!(*log.borrow(), vec!["broken a,b 0 stored=2".to_string()]);

    // Already broken; losing A does not fire again.
    ds.remove_component_from_entity_by_index(e, 0).unwrap();
    assert_eq!(log.borrow().len(), 1);
}

#[test]
fn test_remove_entity_breaks_observer_once() {
    let mut ds = dataset(&["A", "B"]);
    let log = Rc::new(RefCell::new(Vec::new()));
    ds.add_observer(recording_observer(&["A", "B"], &log), false)
        .unwrap();
    let e = ds.create_entity().unwrap();
    ds.add_component_to_entity_by_index(e, 0, instance("a")).unwrap();
    ds.add_component_to_entity_by_index(e, 1, instance("b")).unwrap();

    ds.remove_entity(e).unwrap();
    assert_eq!(
        *log.borrow(),
        vec![
            "complete a,b 0".to_string(),
            "broken a,b 0 stored=2".to_string()
        ]
    );
}

#[test]
fn test_remove_observer_optionally_notifies_broken() {
    let mut ds = dataset(&["A"]);
    let e = ds.create_entity().unwrap();
    ds.add_component_to_entity_by_index(e, 0, instance("a")).unwrap();

    let log = Rc::new(RefCell::new(Vec::new()));
    let quiet = ds.add_observer(recording_observer(&["A"], &log), false).unwrap();
    let loud = ds.add_observer(recording_observer(&["A"], &log), false).unwrap();

    ds.remove_observer(quiet, false).unwrap();
    assert!(log.borrow().is_empty());
    let observer = ds.remove_observer(loud, true).unwrap();
    assert_eq!(*log.borrow(), vec!["broken a 0 stored=1".to_string()]);
    assert_eq!(observer.types(), &[ComponentType::named("A")]);
    assert_eq!(ds.observer_count(), 0);

    let err = ds.remove_observer(loud, false).unwrap_err();
    assert_eq!(err, DatasetError::ObserverNotFound(loud));

    // Disconnected observers no longer react.
    ds.remove_component_from_entity_by_index(e, 0).unwrap();
    assert_eq!(log.borrow().len(), 1);
}

#[test]
fn test_observer_unknown_type_fails_to_connect() {
    let mut ds = dataset(&["A"]);
    let log = Rc::new(RefCell::new(Vec::new()));
    let err = ds
        .add_observer(recording_observer(&["A", "Q"], &log), true)
        .unwrap_err();
    assert_eq!(err, DatasetError::ComponentTypeNotFound("Q".into()));
    assert_eq!(ds.observer_count(), 0);
}

#[test]
fn test_observer_callback_may_attach_components() {
    let mut ds = dataset(&["A", "Marker"]);
    let observer = Observer::new(
        types(&["A"]),
        |ds, _, e| {
            ds.add_component_to_entity_by_index(e, 1, Rc::new("marked")).unwrap();
        },
        |ds, _, e| {
            ds.remove_component_from_entity_by_index(e, 1).unwrap();
        },
    )
    .unwrap();
    ds.add_observer(observer, false).unwrap();

    let e = ds.create_entity().unwrap();
    ds.add_component_to_entity_by_index(e, 0, instance("a")).unwrap();
    assert!(ds.has_component_by_index(e, 1));

    ds.remove_component_from_entity_by_index(e, 0).unwrap();
    assert!(!ds.has_component_by_index(e, 1));
    assert!(ds.get_all_components(e).unwrap().is_empty());
}

#[test]
fn test_process_existing_completes_each_entity_once() {
    let mut ds = dataset(&["A"]);
    let e0 = ds.create_entity().unwrap();
    ds.create_entity().unwrap();
    ds.add_component_to_entity_by_index(e0, 0, instance("a0")).unwrap();

    let completed: Rc<RefCell<Vec<u32>>> = Rc::new(RefCell::new(Vec::new()));
    let on_complete = {
        let completed = completed.clone();
        move |ds: &mut EntityComponentDataset, _: &[ComponentRef], e: Entity| {
            completed.borrow_mut().push(e.id());
            if e == Entity(0) {
                ds.add_component_to_entity_by_index(Entity(1), 0, instance("a1")).unwrap();
            }
        }
    };
    let observer = Observer::new(types(&["A"]), on_complete, |_, _, _| {}).unwrap();
    ds.add_observer(observer, true).unwrap();

    // Entity 1 is completed by the attach, not again by the walk.
    assert_eq!(*completed.borrow(), vec![0, 1]);
}

#[test]
fn test_remove_observer_breaks_only_entities_matched_at_removal() {
    let mut ds = dataset(&["A"]);
    let e0 = ds.create_entity().unwrap();
    ds.create_entity().unwrap();
    ds.add_component_to_entity_by_index(e0, 0, instance("a0")).unwrap();

    let broken: Rc<RefCell<Vec<u32>>> = Rc::new(RefCell::new(Vec::new()));
    let on_broken = {
        let broken = broken.clone();
        move |ds: &mut EntityComponentDataset, _: &[ComponentRef], e: Entity| {
            broken.borrow_mut().push(e.id());
            if e == Entity(0) {
                ds.add_component_to_entity_by_index(Entity(1), 0, instance("a1")).unwrap();
            }
        }
    };
    let observer = Observer::new(types(&["A"]), |_, _, _| {}, on_broken).unwrap();
    let oid = ds.add_observer(observer, false).unwrap();

    ds.remove_observer(oid, true).unwrap();
    assert_eq!(*broken.borrow(), vec![0]);
}

#[test]
fn test_broken_callback_remap_detaches_requested_type() {
    let mut ds = dataset(&["A", "B"]);
    let e = ds.create_entity().unwrap();
    ds.add_component_to_entity_by_index(e, 0, instance("a")).unwrap();
    ds.add_component_to_entity_by_index(e, 1, instance("b")).unwrap();

    let observer = Observer::new(
        types(&["B"]),
        |_, _, _| {},
        |ds: &mut EntityComponentDataset, _: &[ComponentRef], _: Entity| {
            ds.set_component_type_map(types(&["B", "A"])).unwrap();
        },
    )
    .unwrap();
    ds.add_observer(observer, false).unwrap();

    let removed = ds.remove_component_from_entity_by_index(e, 1).unwrap();
    assert_eq!(removed.as_ref().map(tag), Some("b"));
    assert_eq!(ds.slot_of(id("B")), Some(0));
    assert!(!ds.has_component_by_index(e, 0));
    assert_eq!(tag(&ds.get_component_by_index(e, 1).unwrap()), "a");
}

#[test]
fn test_add_hook_remap_still_completes_observer() {
    let mut ds = dataset(&["A", "B"]);
    let log = Rc::new(RefCell::new(Vec::new()));
    ds.add_observer(recording_observer(&["B"], &log), false).unwrap();
    ds.on_component_added(|ds, change| {
        if change.component_type == id("B") && ds.slot_of(id("B")) == Some(1) {
            ds.set_component_type_map(types(&["B", "A"])).unwrap();
        }
    });

    let e = ds.create_entity().unwrap();
    ds.add_component_to_entity_by_index(e, 1, instance("b")).unwrap();

    assert_eq!(ds.slot_of(id("B")), Some(0));
    assert_eq!(*log.borrow(), vec!["complete b 0".to_string()]);
}

#[test]
fn test_remove_entity_survives_remap_mid_removal() {
    let mut ds = dataset(&["A", "B", "C"]);
    let e = ds.create_entity().unwrap();
    for slot in 0..3 {
        ds.add_component_to_entity_by_index(e, slot, instance("x")).unwrap();
    }
    ds.on_component_removed(|ds, change| {
        if change.component_type == id("A") {
            ds.set_component_type_map(types(&["C", "B", "A"])).unwrap();
        }
    });

    ds.remove_entity(e).unwrap();
    assert!(!ds.entity_exists(e));
    for name in ["A", "B", "C"] {
        assert_eq!(ds.component_count_by_index(ds.slot_of(id(name)).unwrap()), 0);
    }
}

// -- Entity events --

#[test]
fn test_listener_requires_live_entity() {
    let mut ds = dataset(&["A"]);
    let err = ds
        .add_entity_event_listener(Entity(3), "hit", listener(|_, _, _| {}))
        .unwrap_err();
    assert_eq!(err, DatasetError::EntityNotFound(Entity(3)));
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[test]
fn test_component_events_carry_type_and_instance() {
    let mut ds = dataset(&["A"]);
    let e = ds.create_entity().unwrap();
    let seen = Rc::new(RefCell::new(Vec::new()));
    for name in [event_names::COMPONENT_ADDED, event_names::COMPONENT_REMOVED] {
        let seen = seen.clone();
        ds.add_entity_event_listener(
            e,
            name,
            listener(move |_, _, event| match event {
                EntityEvent::ComponentAdded {
                    component_type,
                    instance,
                } => seen
                    .borrow_mut()
                    .push(format!("+{component_type} {}", tag(instance))),
                EntityEvent::ComponentRemoved {
                    component_type,
                    instance,
                } => seen
                    .borrow_mut()
                    .push(format!("-{component_type} {}", tag(instance))),
                _ => {}
            }),
        )
        .unwrap();
    }

    ds.add_component_to_entity_by_index(e, 0, instance("a")).unwrap();
    ds.remove_component_from_entity_by_index(e, 0).unwrap();
    assert_eq!(*seen.borrow(), vec!["+A a".to_string(), "-A a".to_string()]);
}

#[test]
fn test_duplicate_listener_is_noop() {
    let mut ds = dataset(&["A"]);
    let e = ds.create_entity().unwrap();
    let calls = Rc::new(Cell::new(0));
    let l = {
        let calls = calls.clone();
        listener(move |_, _, _| calls.set(calls.get() + 1))
    };
    assert!(ds.add_entity_event_listener(e, "ping", l.clone()).unwrap());
    assert!(!ds.add_entity_event_listener(e, "ping", l.clone()).unwrap());

    ds.send_event(e, "ping", &EntityEvent::custom(())).unwrap();
    assert_eq!(calls.get(), 1);
    assert!(ds.remove_entity_event_listener(e, "ping", &l));
    assert!(!ds.remove_entity_event_listener(e, "ping", &l));
}

#[test]
fn test_self_removing_listener_runs_once() {
    let mut ds = dataset(&["A"]);
    let e = ds.create_entity().unwrap();
    let calls = Rc::new(Cell::new(0));
    let me: Rc<RefCell<Option<EntityEventListener>>> = Rc::new(RefCell::new(None));
    let l = {
        let calls = calls.clone();
        let me = me.clone();
        listener(move |ds, e, _| {
            calls.set(calls.get() + 1);
            let handle = me.borrow().clone();
            if let Some(handle) = handle {
                ds.remove_entity_event_listener(e, "ping", &handle);
            }
        })
    };
    *me.borrow_mut() = Some(l.clone());
    let other_calls = Rc::new(Cell::new(0));
    let other = {
        let other_calls = other_calls.clone();
        listener(move |_, _, _| other_calls.set(other_calls.get() + 1))
    };
    ds.add_entity_event_listener(e, "ping", l).unwrap();
    ds.add_entity_event_listener(e, "ping", other).unwrap();

    ds.send_event(e, "ping", &EntityEvent::custom(1)).unwrap();
    ds.send_event(e, "ping", &EntityEvent::custom(2)).unwrap();

    assert_eq!(calls.get(), 1);
    assert_eq!(other_calls.get(), 2);
    // Break the listener <-> cell cycle.
    me.borrow_mut().take();
}

#[test]
fn test_listener_added_during_dispatch_runs_next_time() {
    let mut ds = dataset(&["A"]);
    let e = ds.create_entity().unwrap();
    let late_calls = Rc::new(Cell::new(0));
    let late = {
        let late_calls = late_calls.clone();
        listener(move |_, _, _| late_calls.set(late_calls.get() + 1))
    };
    let adder = listener(move |ds, e, _| {
        ds.add_entity_event_listener(e, "ping", late.clone()).unwrap();
    });
    ds.add_entity_event_listener(e, "ping", adder).unwrap();

    ds.send_event(e, "ping", &EntityEvent::custom(())).unwrap();
    assert_eq!(late_calls.get(), 0);
    ds.send_event(e, "ping", &EntityEvent::custom(())).unwrap();
    assert_eq!(late_calls.get(), 1);
}

#[test]
fn test_listener_removing_another_mid_dispatch() {
    let mut ds = dataset(&["A"]);
    let e = ds.create_entity().unwrap();
    let victim_calls = Rc::new(Cell::new(0));
    let victim = {
        let victim_calls = victim_calls.clone();
        listener(move |_, _, _| victim_calls.set(victim_calls.get() + 1))
    };
    let remover = {
        let victim = victim.clone();
        listener(move |ds, e, _| {
            ds.remove_entity_event_listener(e, "ping", &victim);
        })
    };
    ds.add_entity_event_listener(e, "ping", remover).unwrap();
    ds.add_entity_event_listener(e, "ping", victim).unwrap();

    // The victim was in the snapshot, so it runs once, then never again.
    ds.send_event(e, "ping", &EntityEvent::custom(())).unwrap();
    ds.send_event(e, "ping", &EntityEvent::custom(())).unwrap();
    assert_eq!(victim_calls.get(), 1);
}

#[test]
fn test_custom_event_payload() {
    let mut ds = dataset(&[]);
    let e = ds.create_entity().unwrap();
    let total = Rc::new(Cell::new(0));
    let sum = total.clone();
    ds.add_entity_event_listener(
        e,
        "damage",
        listener(move |_, _, event| {
            if let Some(amount) = event.downcast_custom::<i32>() {
                sum.set(sum.get() + amount);
            }
        }),
    )
    .unwrap();
    ds.send_event(e, "damage", &EntityEvent::custom(7)).unwrap();
    ds.send_event(e, "damage", &EntityEvent::custom(5)).unwrap();
    ds.send_event(e, "heal", &EntityEvent::custom(100)).unwrap();
    assert_eq!(total.get(), 12);

    assert!(ds.send_event(Entity(9), "damage", &EntityEvent::custom(1)).is_err());
}

// -- Hooks --

#[test]
fn test_hooks_fire_and_can_be_removed() {
    let mut ds = dataset(&["A"]);
    let log = Rc::new(RefCell::new(Vec::new()));
    let created = {
        let log = log.clone();
        ds.on_entity_created(move |_, e| log.borrow_mut().push(format!("created {}", e.id())))
    };
    {
        let log = log.clone();
        ds.on_component_added(move |_, change| {
            log.borrow_mut()
                .push(format!("added {} {}", change.entity.id(), change.slot));
        });
    }

    let e = ds.create_entity().unwrap();
    ds.add_component_to_entity_by_index(e, 0, instance("a")).unwrap();
    assert!(ds.remove_hook(created));
    assert!(!ds.remove_hook(created));
    ds.create_entity().unwrap();

    assert_eq!(
        *log.borrow(),
        vec!["created 0".to_string(), "added 0 0".to_string()]
    );
}

#[test]
fn test_creation_hook_may_attach_components() {
    let mut ds = dataset(&["Tag"]);
    ds.on_entity_created(|ds, e| {
        ds.add_component_to_entity_by_index(e, 0, Rc::new("auto")).unwrap();
    });
    let e = ds.create_entity().unwrap();
    assert!(ds.has_component_by_index(e, 0));
}
