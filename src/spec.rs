//! Cost specifications.
//!
//! A resource accrues cost according to a [`CostSpec`]: a charge `amount`
//! in some currency `unit`, applied every `interval` simulation seconds.
//! A specification is only valid once all three fields are set; partial
//! specifications are never acted upon.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{CostError, CostResult};
use crate::model::FieldValue;
use crate::types::SimTime;

/// Canonical name of the charge amount field.
pub const FIELD_AMOUNT: &str = "amount";
/// Canonical name of the currency unit field.
pub const FIELD_UNIT: &str = "unit";
/// Canonical name of the charge interval field.
pub const FIELD_INTERVAL: &str = "interval";

/// A complete cost specification for a priced resource.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CostSpec {
    /// Charge applied at every interval; must be non-negative
    pub amount: f64,
    /// Currency unit of the charge; must be non-empty
    pub unit: String,
    /// Seconds between charges; must be positive
    pub interval: SimTime,
}

impl CostSpec {
    /// Creates a validated cost specification.
    pub fn new(amount: f64, unit: impl Into<String>, interval: SimTime) -> CostResult<Self> {
        let spec = Self {
            amount,
            unit: unit.into(),
            interval,
        };
        spec.validate()?;
        Ok(spec)
    }

    /// Validates all three fields.
    pub fn validate(&self) -> CostResult<()> {
        if !self.amount.is_finite() || self.amount < 0.0 {
            return Err(CostError::InvalidInput(format!(
                "cost amount must be a non-negative number, got {}",
                self.amount
            )));
        }
        if self.unit.is_empty() {
            return Err(CostError::InvalidInput(
                "cost unit must be non-empty".to_string(),
            ));
        }
        if !self.interval.is_finite() || self.interval <= 0.0 {
            return Err(CostError::InvalidInput(format!(
                "cost interval must be positive, got {}",
                self.interval
            )));
        }
        Ok(())
    }

    /// Extracts a complete specification from a resource's field map.
    ///
    /// Returns a `Configuration` error if a field is absent or has the wrong
    /// type, and an `InvalidInput` error if a present field fails validation.
    pub fn from_fields(fields: &HashMap<String, FieldValue>) -> CostResult<Self> {
        let amount = fields
            .get(FIELD_AMOUNT)
            .and_then(FieldValue::as_number)
            .ok_or_else(|| missing(FIELD_AMOUNT))?;
        let unit = fields
            .get(FIELD_UNIT)
            .and_then(FieldValue::as_text)
            .ok_or_else(|| missing(FIELD_UNIT))?;
        let interval = fields
            .get(FIELD_INTERVAL)
            .and_then(FieldValue::as_number)
            .ok_or_else(|| missing(FIELD_INTERVAL))?;

        Self::new(amount, unit, interval)
    }
}

fn missing(field: &str) -> CostError {
    CostError::Configuration(format!(
        "cost specification is missing field '{field}' or it has the wrong type"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(entries: &[(&str, FieldValue)]) -> HashMap<String, FieldValue> {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_valid_spec() {
        let spec = CostSpec::new(5.0, "USD", 10.0).unwrap();
        assert_eq!(spec.amount, 5.0);
        assert_eq!(spec.unit, "USD");
        assert_eq!(spec.interval, 10.0);
    }

    #[test]
    fn test_rejects_negative_amount() {
        assert!(matches!(
            CostSpec::new(-1.0, "USD", 10.0),
            Err(CostError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_rejects_non_positive_interval() {
        assert!(CostSpec::new(1.0, "USD", 0.0).is_err());
        assert!(CostSpec::new(1.0, "USD", -5.0).is_err());
    }

    #[test]
    fn test_rejects_empty_unit() {
        assert!(CostSpec::new(1.0, "", 10.0).is_err());
    }

    #[test]
    fn test_from_fields_complete() {
        let f = fields(&[
            (FIELD_AMOUNT, FieldValue::Number(5.0)),
            (FIELD_UNIT, FieldValue::Text("USD".to_string())),
            (FIELD_INTERVAL, FieldValue::Number(10.0)),
        ]);
        let spec = CostSpec::from_fields(&f).unwrap();
        assert_eq!(spec, CostSpec::new(5.0, "USD", 10.0).unwrap());
    }

    #[test]
    fn test_from_fields_missing() {
        let f = fields(&[
            (FIELD_AMOUNT, FieldValue::Number(5.0)),
            (FIELD_UNIT, FieldValue::Text("USD".to_string())),
        ]);
        assert!(matches!(
            CostSpec::from_fields(&f),
            Err(CostError::Configuration(_))
        ));
    }

    #[test]
    fn test_from_fields_wrong_type() {
        let f = fields(&[
            (FIELD_AMOUNT, FieldValue::Text("five".to_string())),
            (FIELD_UNIT, FieldValue::Text("USD".to_string())),
            (FIELD_INTERVAL, FieldValue::Number(10.0)),
        ]);
        assert!(matches!(
            CostSpec::from_fields(&f),
            Err(CostError::Configuration(_))
        ));
    }
}
