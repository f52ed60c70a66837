//! Payload validation against an endpoint's ordered field list.

use serde_json::{Map, Value};

use crate::error::{PredictError, ServiceError};

/// What to do when a payload omits a schema field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingFields {
    /// Exact-name match: every field present, nothing else allowed.
    Reject,
    /// Absent fields become `0` and unknown keys are ignored.
    FillZero,
}

#[derive(Debug, Clone, Copy)]
pub struct Schema {
    pub fields: &'static [&'static str],
    pub missing: MissingFields,
}

impl Schema {
    pub const fn strict(fields: &'static [&'static str]) -> Self {
        Self {
            fields,
            missing: MissingFields::Reject,
        }
    }

    pub const fn fill_zero(fields: &'static [&'static str]) -> Self {
        Self {
            fields,
            missing: MissingFields::FillZero,
        }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Checks `payload` and returns its values in schema order.
    pub fn validate(&self, payload: &Value) -> Result<OrderedRecord, ServiceError> {
        let Value::Object(map) = payload else {
            return Err(ServiceError::InvalidInput(format!(
                "expected a JSON object, got {}",
                json_kind(payload)
            )));
        };

        if self.missing == MissingFields::Reject {
            self.reject_unknown(map)?;
        }

        let mut values = Vec::with_capacity(self.fields.len());
        for &field in self.fields {
            match map.get(field) {
                Some(value) => values.push((field, value.clone())),
                None if self.missing == MissingFields::FillZero => {
                    values.push((field, Value::from(0)))
                }
                None => {
                    return Err(ServiceError::InvalidInput(format!(
                        "missing field '{field}'"
                    )));
                }
            }
        }

        Ok(OrderedRecord { values })
    }

    fn reject_unknown(&self, map: &Map<String, Value>) -> Result<(), ServiceError> {
        if let Some(unknown) = map.keys().find(|key| !self.fields.contains(&key.as_str())) {
            return Err(ServiceError::InvalidInput(format!(
                "unexpected field '{unknown}'"
            )));
        }
        Ok(())
    }
}

/// A validated payload, keyed and ordered exactly like its schema.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderedRecord {
    values: Vec<(&'static str, Value)>,
}

impl OrderedRecord {
    pub fn fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.values.iter().map(|(field, _)| *field)
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.values
            .iter()
            .find(|(name, _)| *name == field)
            .map(|(_, value)| value)
    }

    /// Coerces every value to `f64`. Numbers pass through, booleans become
    /// 0/1 and numeric strings are parsed.
    pub fn to_features(&self) -> Result<Vec<f64>, PredictError> {
        self.values
            .iter()
            .map(|(field, value)| coerce(field, value))
            .collect()
    }
}

fn coerce(field: &str, value: &Value) -> Result<f64, PredictError> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    parsed
        .filter(|v| v.is_finite())
        .ok_or_else(|| PredictError::NotNumeric {
            field: field.to_string(),
            value: value.to_string(),
        })
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    const FIELDS: &[&str] = &["Age", "BMI", "Glucose"];

    #[test]
    fn orders_values_by_schema() {
        let record = Schema::strict(FIELDS)
            .validate(&json!({"Glucose": 120, "Age": 33, "BMI": 28.1}))
            .unwrap();

        assert_eq!(record.fields().collect::<Vec<_>>(), FIELDS);
        assert_eq!(record.to_features().unwrap(), vec![33.0, 28.1, 120.0]);
    }

    #[test]
    fn rejects_non_objects() {
        let schema = Schema::strict(FIELDS);
        for payload in [json!([33, 28.1, 120]), json!(12), json!(null), json!("Age")] {
            assert!(matches!(
                schema.validate(&payload),
                Err(ServiceError::InvalidInput(_))
            ));
        }
    }

    #[test]
    fn strict_rejects_missing_field() {
        let err = Schema::strict(FIELDS)
            .validate(&json!({"Age": 33, "BMI": 28.1}))
            .unwrap_err();
        assert!(err.to_string().contains("Glucose"));
    }

    #[test]
    fn strict_rejects_renamed_field_with_same_count() {
        let err = Schema::strict(FIELDS)
            .validate(&json!({"Age": 33, "BMI": 28.1, "Insulin": 80}))
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));
    }

    #[test]
    fn fill_zero_substitutes_missing_and_ignores_extra() {
        let record = Schema::fill_zero(FIELDS)
            .validate(&json!({"BMI": 22.5, "Occupation": "pilot"}))
            .unwrap();

        assert_eq!(record.to_features().unwrap(), vec![0.0, 22.5, 0.0]);
        assert_eq!(record.get("Age"), Some(&json!(0)));
    }

    #[test]
    fn coercion_accepts_strings_and_bools() {
        let record = Schema::strict(FIELDS)
            .validate(&json!({"Age": "41", "BMI": true, "Glucose": " 99.5 "}))
            .unwrap();
        assert_eq!(record.to_features().unwrap(), vec![41.0, 1.0, 99.5]);
    }

    #[test]
    fn coercion_failure_names_field() {
        let record = Schema::strict(FIELDS)
            .validate(&json!({"Age": "forty", "BMI": 20, "Glucose": 90}))
            .unwrap();

        match record.to_features() {
            Err(PredictError::NotNumeric { field, .. }) => assert_eq!(field, "Age"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn coercion_rejects_null_and_nan_strings() {
        let record = Schema::strict(FIELDS)
            .validate(&json!({"Age": null, "BMI": 20, "Glucose": 90}))
            .unwrap();
        assert!(record.to_features().is_err());

        let record = Schema::strict(FIELDS)
            .validate(&json!({"Age": 30, "BMI": "NaN", "Glucose": 90}))
            .unwrap();
        assert!(record.to_features().is_err());
    }
}
