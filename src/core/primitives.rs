use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use crate::error::{PlotError, PlotResult};

pub fn decimal_to_f64(value: Decimal, field_name: &str) -> PlotResult<f64> {
    value
        .to_f64()
        .ok_or_else(|| PlotError::InvalidData(format!("{field_name} cannot be represented as f64")))
}

#[must_use]
pub fn datetime_to_unix_millis(time: DateTime<Utc>) -> f64 {
    time.timestamp_millis() as f64
}

/// Rejects non-finite numeric arguments with a named error.
pub(crate) fn ensure_finite(value: f64, name: &str) -> PlotResult<f64> {
    if !value.is_finite() {
        return Err(PlotError::InvalidArgument(format!("{name} must be finite")));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn datetime_maps_to_epoch_millis() {
        let time = Utc.with_ymd_and_hms(1970, 1, 1, 0, 0, 2).single().expect("valid time");
        assert_eq!(datetime_to_unix_millis(time), 2_000.0);
    }

    #[test]
    fn ensure_finite_rejects_nan() {
        assert!(ensure_finite(f64::NAN, "offset").is_err());
        assert_eq!(ensure_finite(1.5, "offset").expect("finite"), 1.5);
    }
}
