use indexmap::{IndexMap, IndexSet};

use crate::core::CategoryDataset;
use crate::error::{PlotError, PlotResult};

/// Stock [`CategoryDataset`] keeping row and column keys in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DefaultCategoryDataset {
    row_keys: IndexSet<String>,
    column_keys: IndexSet<String>,
    values: IndexMap<(usize, usize), f64>,
}

impl DefaultCategoryDataset {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces the value at (`row_key`, `column_key`).
    pub fn set_value(
        &mut self,
        value: f64,
        row_key: impl Into<String>,
        column_key: impl Into<String>,
    ) -> PlotResult<()> {
        if value.is_infinite() {
            return Err(PlotError::InvalidData(
                "category value must not be infinite".to_owned(),
            ));
        }
        let (row, _) = self.row_keys.insert_full(row_key.into());
        let (column, _) = self.column_keys.insert_full(column_key.into());
        self.values.insert((row, column), value);
        Ok(())
    }

    #[must_use]
    pub fn with_value(mut self, value: f64, row_key: &str, column_key: &str) -> Self {
        if self.set_value(value, row_key, column_key).is_err() {
            tracing::warn!(row_key, column_key, "ignoring non-finite category value");
        }
        self
    }

    /// Removes the cell value; keys stay registered.
    pub fn remove_value(&mut self, row_key: &str, column_key: &str) -> Option<f64> {
        let row = self.row_keys.get_index_of(row_key)?;
        let column = self.column_keys.get_index_of(column_key)?;
        self.values.shift_remove(&(row, column))
    }

    pub fn clear(&mut self) {
        self.row_keys.clear();
        self.column_keys.clear();
        self.values.clear();
    }
}

impl CategoryDataset for DefaultCategoryDataset {
    fn row_count(&self) -> usize {
        self.row_keys.len()
    }

    fn column_count(&self) -> usize {
        self.column_keys.len()
    }

    fn row_key(&self, row: usize) -> &str {
        self.row_keys.get_index(row).map_or("", String::as_str)
    }

    fn column_key(&self, column: usize) -> &str {
        self.column_keys.get_index(column).map_or("", String::as_str)
    }

    fn value(&self, row: usize, column: usize) -> Option<f64> {
        self.values
            .get(&(row, column))
            .copied()
            .filter(|value| !value.is_nan())
    }

    fn row_index(&self, key: &str) -> Option<usize> {
        self.row_keys.get_index_of(key)
    }

    fn column_index(&self, key: &str) -> Option<usize> {
        self.column_keys.get_index_of(key)
    }
}
