//! Per-slot component columns.
//!
//! A [`Column`] is a sparse array indexed directly by entity index; a
//! [`ColumnStore`] holds one column per slot of the current type table.
//! Presence in a column mirrors the dataset's occupancy bit for the same
//! `(entity, slot)` pair.

use std::any::Any;
use std::rc::Rc;

/// Shared handle to a stored component instance.
///
/// The same instance may be observed through several handles (observer
/// arguments, event payloads, a masked copy in another dataset); identity is
/// `Rc::ptr_eq`.
pub type ComponentRef = Rc<dyn Any>;

/// Sparse array of component instances for a single slot.
#[derive(Default)]
pub struct Column {
    cells: Vec<Option<ComponentRef>>,
    len: usize,
}

impl Column {
    /// Create an empty column.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored instances.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Instance stored for `entity`.
    #[must_use]
    pub fn get(&self, entity: usize) -> Option<&ComponentRef> {
        self.cells.get(entity).and_then(Option::as_ref)
    }

    /// Store `instance` for `entity`, returning what was there before.
    pub fn insert(&mut self, entity: usize, instance: ComponentRef) -> Option<ComponentRef> {
        if entity >= self.cells.len() {
            self.cells.resize_with(entity + 1, || None);
        }
        let previous = self.cells[entity].replace(instance);
        if previous.is_none() {
            self.len += 1;
        }
        previous
    }

    /// Take the instance stored for `entity`.
    pub fn remove(&mut self, entity: usize) -> Option<ComponentRef> {
        let previous = self.cells.get_mut(entity).and_then(Option::take);
        if previous.is_some() {
            self.len -= 1;
        }
        previous
    }

    /// Drop every instance.
    pub fn clear(&mut self) {
        self.cells.clear();
        self.len = 0;
    }
}

impl std::fmt::Debug for Column {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Column")
            .field("len", &self.len)
            .field("span", &self.cells.len())
            .finish()
    }
}

/// One [`Column`] per slot.
#[derive(Debug, Default)]
pub struct ColumnStore {
    columns: Vec<Column>,
}

impl ColumnStore {
    /// Create `slot_count` empty columns.
    #[must_use]
    pub fn new(slot_count: usize) -> Self {
        Self {
            columns: (0..slot_count).map(|_| Column::new()).collect(),
        }
    }

    /// Number of columns.
    #[must_use]
    pub fn slot_count(&self) -> usize {
        self.columns.len()
    }

    /// Column for `slot`.
    #[must_use]
    pub fn column(&self, slot: usize) -> Option<&Column> {
        self.columns.get(slot)
    }

    /// Instance stored at `(entity, slot)`.
    #[must_use]
    pub fn get(&self, slot: usize, entity: usize) -> Option<&ComponentRef> {
        self.columns.get(slot)?.get(entity)
    }

    /// Store `instance` at `(entity, slot)`. `slot` must be in range.
    pub fn insert(&mut self, slot: usize, entity: usize, instance: ComponentRef) -> Option<ComponentRef> {
        self.columns[slot].insert(entity, instance)
    }

    /// Take the instance stored at `(entity, slot)`.
    pub fn remove(&mut self, slot: usize, entity: usize) -> Option<ComponentRef> {
        self.columns.get_mut(slot)?.remove(entity)
    }

    /// Move columns into a layout of `slot_count` slots.
    ///
    /// `remap[old]` names the new slot of each old column; columns mapped to
    /// `None` are dropped and new slots nothing maps to start empty.
    #[must_use]
    pub fn migrate(self, remap: &[Option<usize>], slot_count: usize) -> ColumnStore {
        let mut next = ColumnStore::new(slot_count);
        for (old, column) in self.columns.into_iter().enumerate() {
            if let Some(Some(new)) = remap.get(old) {
                next.columns[*new] = column;
            }
        }
        next
    }

    /// Drop every instance in every column, keeping the layout.
    pub fn clear_all(&mut self) {
        self.columns.iter_mut().for_each(Column::clear);
    }
}
