//! # engine_dataset
//!
//! Dynamic-schema entity/component storage with reactive observers and
//! per-entity event listeners.
//!
//! This crate provides:
//!
//! - [`EntityComponentDataset`]: the store itself. Entities are dense `u32`
//!   indices, component types are mapped to slots by a runtime
//!   [`ComponentTypeTable`] that can be replaced while data is live.
//! - [`Observer`]: a pair of callbacks fired when an entity starts or stops
//!   holding a whole set of component types.
//! - [`EntityEvent`] listeners: named, per-entity handlers for structural
//!   and custom events.
//! - [`BitSet`] and [`ColumnStore`]: the occupancy and storage primitives.
//!
//! Everything is single-threaded. Callbacks receive the dataset mutably and
//! run synchronously inside the operation that triggered them.

pub mod bitset;
pub mod column;
pub mod config;
pub mod dataset;
pub mod error;
pub mod events;
pub mod hooks;
pub mod observer;
pub mod type_table;

pub use bitset::{BitSet, Ones};
pub use column::{Column, ColumnStore, ComponentRef};
pub use config::DatasetConfig;
pub use dataset::{ComponentCursor, EntityComponentDataset};
pub use error::{DatasetError, ErrorKind, Result};
pub use events::{EntityEvent, EntityEventListener, event_names, listener};
pub use hooks::{ComponentChange, ComponentHook, EntityHook, HookId};
pub use observer::{Observer, ObserverBinding, ObserverCallback, ObserverId};
pub use type_table::{ComponentTypeTable, TableDiff};
