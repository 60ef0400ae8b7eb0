use chrono::{DateTime, Utc};
use ordered_float::OrderedFloat;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::{DataPoint, DomainOrder, XyDataset};
use crate::error::{PlotError, PlotResult};

/// Named sequence of (x, y) points.
///
/// Points are kept sorted by x when `auto_sort` is enabled (the default),
/// which lets the plot window visible items with a binary search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct XySeries {
    key: String,
    points: Vec<DataPoint>,
    auto_sort: bool,
}

impl XySeries {
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            points: Vec::new(),
            auto_sort: true,
        }
    }

    /// Builds a sorted series from arbitrary points.
    #[must_use]
    pub fn from_points(key: impl Into<String>, mut points: Vec<DataPoint>) -> Self {
        points.sort_by_key(|point| OrderedFloat(point.x));
        Self {
            key: key.into(),
            points,
            auto_sort: true,
        }
    }

    /// Builds a series that preserves insertion order.
    #[must_use]
    pub fn unsorted(key: impl Into<String>, points: Vec<DataPoint>) -> Self {
        Self {
            key: key.into(),
            points,
            auto_sort: false,
        }
    }

    /// Builds a time series; x values are UTC epoch milliseconds.
    pub fn from_time_values(
        key: impl Into<String>,
        values: &[(DateTime<Utc>, Decimal)],
    ) -> PlotResult<Self> {
        let points = values
            .iter()
            .map(|(time, value)| DataPoint::from_decimal_time(*time, *value))
            .collect::<PlotResult<Vec<_>>>()?;
        Ok(Self::from_points(key, points))
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    #[must_use]
    pub fn points(&self) -> &[DataPoint] {
        &self.points
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    #[must_use]
    pub fn is_sorted(&self) -> bool {
        self.auto_sort
    }

    pub fn add(&mut self, x: f64, y: f64) -> PlotResult<()> {
        if !x.is_finite() {
            return Err(PlotError::InvalidData("x value must be finite".to_owned()));
        }
        let point = DataPoint::new(x, y);
        if self.auto_sort {
            let position = self.points.partition_point(|existing| existing.x <= x);
            self.points.insert(position, point);
        } else {
            self.points.push(point);
        }
        Ok(())
    }

    pub fn remove(&mut self, item: usize) -> Option<DataPoint> {
        (item < self.points.len()).then(|| self.points.remove(item))
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }
}

/// Stock [`XyDataset`] made of independent [`XySeries`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct XySeriesCollection {
    series: Vec<XySeries>,
}

impl XySeriesCollection {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`XySeriesCollection::add_series`] that replaces a clashing key.
    #[must_use]
    pub fn with_series(mut self, series: XySeries) -> Self {
        if let Some(existing) = self.series.iter_mut().find(|s| s.key == series.key) {
            *existing = series;
        } else {
            self.series.push(series);
        }
        self
    }

    pub fn add_series(&mut self, series: XySeries) -> PlotResult<()> {
        if self.series.iter().any(|existing| existing.key == series.key) {
            return Err(PlotError::InvalidData(format!(
                "series key `{}` is already present",
                series.key
            )));
        }
        self.series.push(series);
        Ok(())
    }

    pub fn remove_series(&mut self, index: usize) -> Option<XySeries> {
        (index < self.series.len()).then(|| self.series.remove(index))
    }

    #[must_use]
    pub fn series(&self, index: usize) -> Option<&XySeries> {
        self.series.get(index)
    }

    #[must_use]
    pub fn series_mut(&mut self, index: usize) -> Option<&mut XySeries> {
        self.series.get_mut(index)
    }

    pub fn clear(&mut self) {
        self.series.clear();
    }
}

impl XyDataset for XySeriesCollection {
    fn series_count(&self) -> usize {
        self.series.len()
    }

    fn series_key(&self, series: usize) -> &str {
        self.series.get(series).map_or("", |s| s.key.as_str())
    }

    fn item_count(&self, series: usize) -> usize {
        self.series.get(series).map_or(0, XySeries::len)
    }

    fn x_value(&self, series: usize, item: usize) -> f64 {
        self.series
            .get(series)
            .and_then(|s| s.points.get(item))
            .map_or(f64::NAN, |point| point.x)
    }

    fn y_value(&self, series: usize, item: usize) -> f64 {
        self.series
            .get(series)
            .and_then(|s| s.points.get(item))
            .map_or(f64::NAN, |point| point.y)
    }

    fn domain_order(&self) -> DomainOrder {
        if self.series.iter().all(XySeries::is_sorted) {
            DomainOrder::Ascending
        } else {
            DomainOrder::None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sorted_series_inserts_in_order() {
        let mut series = XySeries::new("a");
        series.add(3.0, 30.0).expect("add");
        series.add(1.0, 10.0).expect("add");
        series.add(2.0, 20.0).expect("add");
        let xs: Vec<f64> = series.points().iter().map(|p| p.x).collect();
        assert_eq!(xs, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn collection_rejects_duplicate_keys() {
        let mut collection = XySeriesCollection::new();
        collection.add_series(XySeries::new("a")).expect("first");
        assert!(collection.add_series(XySeries::new("a")).is_err());
    }

    #[test]
    fn unsorted_series_disables_domain_order() {
        let collection = XySeriesCollection::new().with_series(XySeries::unsorted(
            "a",
            vec![DataPoint::new(2.0, 1.0), DataPoint::new(1.0, 1.0)],
        ));
        assert_eq!(collection.domain_order(), DomainOrder::None);
        assert_eq!(collection.x_value(0, 0), 2.0);
    }
}
