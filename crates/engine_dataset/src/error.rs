//! Dataset error types.

use engine_component::Entity;

use crate::observer::ObserverId;

/// Coarse classification of a [`DatasetError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A malformed or out-of-range entity index or slot.
    Index,
    /// A referenced entity, component type or observer is absent.
    NotFound,
    /// A precondition on the dataset's current state was violated.
    State,
}

/// Errors raised by dataset operations.
///
/// Failures are reported synchronously and never rolled back: a bulk
/// operation that fails partway leaves whatever it already applied.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DatasetError {
    /// Entity index at or past the configured entity limit.
    #[error("entity index {index} out of range (limit {limit})")]
    EntityIndexOutOfRange {
        /// The offending index.
        index: usize,
        /// Exclusive upper bound on entity indices.
        limit: u32,
    },

    /// Slot index at or past the current slot count.
    #[error("slot {slot} out of range (slot count {slot_count})")]
    SlotOutOfRange {
        /// The offending slot.
        slot: usize,
        /// Number of slots in the current type table.
        slot_count: usize,
    },

    /// The entity does not exist.
    #[error("{0} does not exist")]
    EntityNotFound(Entity),

    /// The component type is not part of the current type table.
    #[error("component type '{0}' is not registered")]
    ComponentTypeNotFound(String),

    /// No observer is registered under this id.
    #[error("observer {0} is not registered")]
    ObserverNotFound(ObserverId),

    /// The entity index is already occupied.
    #[error("{0} already exists")]
    EntityAlreadyExists(Entity),

    /// A mutation targeted an entity that is not alive.
    #[error("{0} is not alive")]
    EntityNotAlive(Entity),

    /// The (entity, slot) pair already holds a component.
    #[error("{entity} already holds a component in slot {slot}")]
    ComponentAlreadyPresent {
        /// The entity.
        entity: Entity,
        /// The occupied slot.
        slot: usize,
    },

    /// A type table was built with the same type twice.
    #[error("component type '{0}' is listed more than once")]
    DuplicateComponentType(String),

    /// A remap tried to drop types that still have live instances.
    #[error("cannot remove component types with live instances: {}", .0.join(", "))]
    ComponentTypesInUse(Vec<String>),

    /// An observer was declared without any component type.
    #[error("observer must require at least one component type")]
    EmptyObserver,
}

impl DatasetError {
    /// Classify this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::EntityIndexOutOfRange { .. } | Self::SlotOutOfRange { .. } => ErrorKind::Index,
            Self::EntityNotFound(_)
            | Self::ComponentTypeNotFound(_)
            | Self::ObserverNotFound(_) => ErrorKind::NotFound,
            Self::EntityAlreadyExists(_)
            | Self::EntityNotAlive(_)
            | Self::ComponentAlreadyPresent { .. }
            | Self::DuplicateComponentType(_)
            | Self::ComponentTypesInUse(_)
            | Self::EmptyObserver => ErrorKind::State,
        }
    }
}

/// Convenience alias for dataset results.
pub type Result<T, E = DatasetError> = std::result::Result<T, E>;
