//! Dataset query contracts consumed by the plot core.
//!
//! The plot never owns data; it only reads through these traits.

use crate::core::{DomainOrder, ValueRange};

/// Continuous (x, y) data organised in series.
pub trait XyDataset {
    fn series_count(&self) -> usize;
    fn series_key(&self, series: usize) -> &str;
    fn item_count(&self, series: usize) -> usize;
    fn x_value(&self, series: usize, item: usize) -> f64;
    /// Missing values are reported as `NaN`.
    fn y_value(&self, series: usize, item: usize) -> f64;

    fn domain_order(&self) -> DomainOrder {
        DomainOrder::None
    }
}

/// Table of values keyed by row (series) and column (category).
pub trait CategoryDataset {
    fn row_count(&self) -> usize;
    fn column_count(&self) -> usize;
    fn row_key(&self, row: usize) -> &str;
    fn column_key(&self, column: usize) -> &str;
    fn value(&self, row: usize, column: usize) -> Option<f64>;

    fn row_index(&self, key: &str) -> Option<usize> {
        (0..self.row_count()).find(|row| self.row_key(*row) == key)
    }

    fn column_index(&self, key: &str) -> Option<usize> {
        (0..self.column_count()).find(|column| self.column_key(*column) == key)
    }
}

#[must_use]
pub fn is_empty_xy(dataset: &dyn XyDataset) -> bool {
    (0..dataset.series_count()).all(|series| dataset.item_count(series) == 0)
}

#[must_use]
pub fn is_empty_category(dataset: &dyn CategoryDataset) -> bool {
    dataset.row_count() == 0 || dataset.column_count() == 0
}

/// Union of all finite x values.
#[must_use]
pub fn find_domain_bounds(dataset: &dyn XyDataset) -> Option<ValueRange> {
    let mut result = None;
    for series in 0..dataset.series_count() {
        for item in 0..dataset.item_count(series) {
            result = ValueRange::expand_to_include(result, dataset.x_value(series, item));
        }
    }
    result
}

/// Union of all finite y values.
#[must_use]
pub fn find_range_bounds(dataset: &dyn XyDataset) -> Option<ValueRange> {
    let mut result = None;
    for series in 0..dataset.series_count() {
        for item in 0..dataset.item_count(series) {
            result = ValueRange::expand_to_include(result, dataset.y_value(series, item));
        }
    }
    result
}

/// Union of all present, finite cell values.
#[must_use]
pub fn find_category_range_bounds(dataset: &dyn CategoryDataset) -> Option<ValueRange> {
    let mut result = None;
    for row in 0..dataset.row_count() {
        for column in 0..dataset.column_count() {
            if let Some(value) = dataset.value(row, column) {
                result = ValueRange::expand_to_include(result, value);
            }
        }
    }
    result
}

/// Padded item index window of one series against visible domain bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemWindow {
    pub first: usize,
    pub last: usize,
    /// Whether an item lies inside the bounds, or two neighbouring items
    /// straddle them so the segment between them crosses the visible span.
    pub has_visible_items: bool,
}

/// Locates the items whose x value falls in `[lower, upper]`, padded by one
/// item on each side so segments crossing the bounds are still drawn.
///
/// Returns `None` for an empty series.
#[must_use]
pub fn visible_item_window(
    dataset: &dyn XyDataset,
    series: usize,
    lower: f64,
    upper: f64,
) -> Option<ItemWindow> {
    let count = dataset.item_count(series);
    if count == 0 {
        return None;
    }
    let x = |item: usize| dataset.x_value(series, item);
    let straddles = |item: usize| {
        let (a, b) = (x(item), x(item + 1));
        a.min(b) < lower && a.max(b) > upper
    };

    let (start, end) = match dataset.domain_order() {
        DomainOrder::Ascending => (
            partition_items(count, |item| x(item) < lower),
            partition_items(count, |item| x(item) <= upper),
        ),
        DomainOrder::Descending => (
            partition_items(count, |item| x(item) > upper),
            partition_items(count, |item| x(item) >= lower),
        ),
        DomainOrder::None => {
            let inside = |item: usize| {
                let value = x(item);
                value >= lower && value <= upper
            };
            match (
                (0..count).find(|item| inside(*item)),
                (0..count).rev().find(|item| inside(*item)),
            ) {
                (Some(first), Some(last)) => (first, last + 1),
                _ => {
                    return Some(ItemWindow {
                        first: 0,
                        last: count - 1,
                        has_visible_items: (0..count - 1).any(straddles),
                    });
                }
            }
        }
    };

    // an empty window between two items means their segment spans the bounds
    let crossing = start == end && start > 0 && start < count && straddles(start - 1);
    Some(ItemWindow {
        first: start.saturating_sub(1),
        last: end.min(count - 1),
        has_visible_items: start < end || crossing,
    })
}

/// First item index for which `predicate` is false, assuming it holds for a prefix.
fn partition_items(count: usize, predicate: impl Fn(usize) -> bool) -> usize {
    let mut low = 0;
    let mut high = count;
    while low < high {
        let mid = low + (high - low) / 2;
        if predicate(mid) {
            low = mid + 1;
        } else {
            high = mid;
        }
    }
    low
}
