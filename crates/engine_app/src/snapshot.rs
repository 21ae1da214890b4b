//! Incremental position snapshots.
//!
//! A [`SnapshotWriter`] walks the `Position` column a budgeted number of
//! entities per call and appends one MessagePack record per entity. Records
//! carry the gap to the previous entity index rather than the index itself,
//! so dense ranges encode as runs of small integers.
//!
//! The walk survives schema changes: if the `Position` slot moves between
//! calls, the cursor is rebuilt from the last entity written.

// The reader half is only exercised by tests inside this binary.
#![allow(dead_code)]

use engine_component::{Component, Entity};
use engine_dataset::{ComponentCursor, DatasetError, EntityComponentDataset};
use glam::Vec3;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::components::Position;

/// Errors raised while writing or reading a snapshot.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    /// Failed to encode a record to MessagePack.
    #[error("failed to encode snapshot record: {0}")]
    Encode(#[from] rmp_serde::encode::Error),

    /// Failed to decode a record from MessagePack.
    #[error("failed to decode snapshot record: {0}")]
    Decode(#[from] rmp_serde::decode::Error),

    /// The snapshotted type is not registered in the dataset.
    #[error("component type {0} is not registered")]
    MissingType(&'static str),

    /// A record's delta carries the entity index past `u32::MAX`.
    #[error("snapshot record delta {delta} overflows entity index {index}")]
    IndexOverflow { index: u32, delta: u32 },

    /// The dataset rejected the traversal.
    #[error(transparent)]
    Dataset(#[from] DatasetError),
}

/// One encoded entity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
struct PositionRecord {
    /// Index distance from the previous record (or from zero).
    delta: u32,
    position: Vec3,
}

/// Budgeted writer of delta-encoded position records.
#[derive(Debug, Default)]
pub struct SnapshotWriter {
    cursor: Option<ComponentCursor>,
    last_written: Option<Entity>,
    buffer: Vec<u8>,
    records: usize,
}

impl SnapshotWriter {
    /// Create a writer positioned before the first entity.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Visit up to `budget` more holders of the `Position` slot. Returns how
    /// many records were encoded; holders whose instance is not a `Position`
    /// are skipped.
    ///
    /// # Errors
    ///
    /// [`SnapshotError::MissingType`] if `Position` is not registered, or an
    /// encoding failure.
    pub fn step(&mut self, dataset: &EntityComponentDataset, budget: usize) -> Result<usize, SnapshotError> {
        let slot = dataset
            .slot_of(Position::component_type_id())
            .ok_or(SnapshotError::MissingType(Position::type_name()))?;

        let mut cursor = match (self.cursor, self.last_written) {
            (Some(cursor), _) if cursor.slot() == slot => cursor,
            (_, Some(last)) => ComponentCursor::resume(slot, last),
            (_, None) => ComponentCursor::new(slot),
        };

        let mut failure = None;
        let mut encoded = 0;
        let buffer = &mut self.buffer;
        let last_written = &mut self.last_written;
        let visited = dataset.traverse_components_from(&mut cursor, budget, |entity, instance| {
            if failure.is_some() {
                return;
            }
            let Some(position) = instance.downcast_ref::<Position>() else {
                return;
            };
            let record = PositionRecord {
                delta: entity.id() - last_written.map_or(0, |last| last.id()),
                position: position.get(),
            };
            match rmp_serde::encode::write(&mut *buffer, &record) {
                Ok(()) => {
                    *last_written = Some(entity);
                    encoded += 1;
                }
                Err(err) => failure = Some(err),
            }
        })?;
        self.cursor = Some(cursor);
        if let Some(err) = failure {
            return Err(err.into());
        }

        self.records += encoded;
        trace!(visited, encoded, total = self.records, "snapshot step");
        Ok(encoded)
    }

    /// Returns `true` once every holder has been written.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.cursor.is_some_and(|cursor| cursor.is_finished())
    }

    /// Number of records written so far.
    #[must_use]
    pub fn records(&self) -> usize {
        self.records
    }

    /// The encoded records.
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.buffer
    }

    /// Hand back the encoded records and start a fresh snapshot.
    pub fn finish(&mut self) -> Vec<u8> {
        let bytes = std::mem::take(&mut self.buffer);
        *self = Self::default();
        bytes
    }
}

/// Decode the records produced by a [`SnapshotWriter`].
///
/// # Errors
///
/// Returns [`SnapshotError::Decode`] on malformed input, or
/// [`SnapshotError::IndexOverflow`] if the deltas run past `u32::MAX`.
pub fn decode(bytes: &[u8]) -> Result<Vec<(Entity, Vec3)>, SnapshotError> {
    let mut remaining = bytes;
    let mut entries = Vec::new();
    let mut index = 0u32;
    while !remaining.is_empty() {
        let record: PositionRecord = rmp_serde::from_read(&mut remaining)?;
        index = index
            .checked_add(record.delta)
            .ok_or(SnapshotError::IndexOverflow {
                index,
                delta: record.delta,
            })?;
        entries.push((Entity(index), record.position));
    }
    Ok(entries)
}
