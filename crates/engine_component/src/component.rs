//! Component type identity and the [`Component`] trait.
//!
//! A dataset tracks component *types*, not Rust types. Each type is described
//! by a [`ComponentType`]: a name plus a [`ComponentTypeId`] derived from that
//! name. Types defined only at runtime (loaded from data, say) and Rust types
//! implementing [`Component`] resolve to the same descriptor when they share a
//! name.
//!
//! ## Type identity
//!
//! [`ComponentTypeId`] is the FNV-1a 64-bit hash of the UTF-8 name. It is
//! computed once when a descriptor is created; tables compare ids, never
//! strings.

use std::borrow::Cow;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// Stable identifier for a component type, derived from its name with the
/// FNV-1a 64-bit hash.
///
/// Unlike a slot index, the id survives any reconfiguration of a type table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct ComponentTypeId(pub u64);

impl ComponentTypeId {
    /// FNV-1a 64-bit offset basis.
    const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;

    /// FNV-1a 64-bit prime.
    const FNV_PRIME: u64 = 0x0100_0000_01b3;

    /// Compute the id for a component type name.
    ///
    /// ```text
    /// hash = 0xcbf29ce484222325
    /// for each byte in name.as_bytes():
    ///     hash = (hash XOR byte) * 0x00000100000001b3
    /// ```
    #[must_use]
    pub const fn from_name(name: &str) -> Self {
        let bytes = name.as_bytes();
        let mut hash = Self::FNV_OFFSET_BASIS;
        let mut i = 0;
        while i < bytes.len() {
            hash ^= bytes[i] as u64;
            hash = hash.wrapping_mul(Self::FNV_PRIME);
            i += 1;
        }
        Self(hash)
    }

    /// Compute the id for a Rust component type `T`.
    #[must_use]
    pub fn of<T: Component>() -> Self {
        Self::from_name(T::type_name())
    }
}

impl std::fmt::Display for ComponentTypeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// Runtime descriptor of a component type, as registered in a type table.
///
/// Two descriptors are equal when their ids are equal; the name is carried
/// for diagnostics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentType {
    id: ComponentTypeId,
    name: Cow<'static, str>,
}

impl ComponentType {
    /// Create a descriptor for a type known only by name.
    #[must_use]
    pub fn named(name: impl Into<Cow<'static, str>>) -> Self {
        let name = name.into();
        Self {
            id: ComponentTypeId::from_name(&name),
            name,
        }
    }

    /// Create the descriptor for a Rust component type `T`.
    #[must_use]
    pub fn of<T: Component>() -> Self {
        Self::named(T::type_name())
    }

    /// The stable type id.
    #[must_use]
    pub fn id(&self) -> ComponentTypeId {
        self.id
    }

    /// The human-readable type name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl PartialEq for ComponentType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ComponentType {}

impl Hash for ComponentType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl std::fmt::Display for ComponentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}

/// A Rust type that can be stored in a dataset.
///
/// Instances are stored behind `Rc<dyn Any>`, so the only requirement beyond
/// `'static` is a name. Mutable state inside a component uses interior
/// mutability (`Cell`, `RefCell`).
///
/// # Examples
///
/// ```rust
/// use engine_component::{Component, ComponentTypeId};
///
/// struct Health {
///     current: std::cell::Cell<f32>,
/// }
///
/// impl Component for Health {
///     fn type_name() -> &'static str { "Health" }
/// }
///
/// assert_eq!(Health::component_type_id(), ComponentTypeId::from_name("Health"));
/// ```
pub trait Component: 'static {
    /// A human-readable, stable name for this component type.
    fn type_name() -> &'static str;

    /// Returns the [`ComponentTypeId`] for this component.
    fn component_type_id() -> ComponentTypeId {
        ComponentTypeId::from_name(Self::type_name())
    }

    /// Returns the [`ComponentType`] descriptor for this component.
    fn component_type() -> ComponentType {
        ComponentType::named(Self::type_name())
    }
}
