//! Thin glue for wiring one [`Asa`] per table column into an Associative
//! Graph Data Structure.
//!
//! This is deliberately minimal: the ASA core does not know rows exist, and
//! nothing here walks the tree or the queue directly. [`Column`] just
//! remembers, for each row, the key it holds and the handle `Asa::insert`
//! returned for it, so a row's value can be looked up or replaced by going
//! straight through that handle rather than re-searching the tree.

use std::collections::HashMap;

use crate::engine::Asa;
use crate::error::{Error, Result};
use crate::value_node::ValueNodeHandle;

/// Identifies a row in the table this column belongs to.
pub type RowId = u64;

/// One column of a table: an [`Asa`] plus the row → (key, value-node) map
/// that lets a row's value be replaced or dropped without the caller
/// re-supplying the old key.
pub struct Column<K> {
    asa: Asa<K>,
    rows: HashMap<RowId, (K, ValueNodeHandle<K>)>,
}

impl<K> Column<K>
where
    K: Ord + Clone,
{
    pub fn new() -> Self {
        Self {
            asa: Asa::new(),
            rows: HashMap::new(),
        }
    }

    pub fn asa(&self) -> &Asa<K> {
        &self.asa
    }

    /// Attach `value` to `row`, inserting it into the underlying [`Asa`].
    /// If the row already held a value, that occurrence is dropped first.
    pub fn set(&mut self, row: RowId, value: K) {
        if let Some((old_key, _)) = self.rows.remove(&row) {
            self.asa.delete(&old_key);
        }
        let handle = self.asa.insert(value.clone());
        self.rows.insert(row, (value, handle));
    }

    /// The key currently attached to `row`, if any.
    pub fn value(&self, row: RowId) -> Option<&K> {
        self.rows.get(&row).map(|(key, _)| key)
    }

    /// The handle backing `row`'s current value, if any.
    pub fn handle(&self, row: RowId) -> Option<ValueNodeHandle<K>> {
        self.rows.get(&row).map(|(_, handle)| *handle)
    }

    /// Remove `row`'s value from the column.
    pub fn remove(&mut self, row: RowId) -> Result<()> {
        let (key, _) = self.rows.remove(&row).ok_or(Error::RowNotFound(row))?;
        self.asa.delete(&key);
        Ok(())
    }
}

impl<K> Default for Column<K>
where
    K: Ord + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}
