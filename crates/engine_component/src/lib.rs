//! # engine_component
//!
//! The vocabulary shared by the dataset and everything that feeds it.
//!
//! This crate provides:
//!
//! - [`Entity`]: lightweight `u32` row handle with no payload of its own.
//! - [`ComponentTypeId`]: stable, name-derived identity of a component type.
//! - [`ComponentType`]: runtime descriptor registered in a type table.
//! - [`Component`] trait: implemented by Rust types that can be stored.

pub mod component;
pub mod entity;

pub use component::{Component, ComponentType, ComponentTypeId};
pub use entity::Entity;
