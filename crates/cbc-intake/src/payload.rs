//! Submission payload

use serde::Serialize;
use serde_json::{Map, Value};

use crate::rules::RuleSet;
use crate::validator::parse_number;
use crate::values::FormValues;

/// JSON document sent to the screening endpoint.
///
/// Number fields become JSON numbers (`null` when left empty), every other
/// field is sent as the raw text.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SubmissionPayload(Map<String, Value>);

impl SubmissionPayload {
    pub fn build(values: &FormValues, rules: &RuleSet) -> Self {
        let map = values
            .iter()
            .map(|(name, raw)| {
                let numeric = rules.get(name).is_some_and(|r| r.field_type.is_numeric());
                let value = if numeric {
                    parse_number(raw)
                        .and_then(serde_json::Number::from_f64)
                        .map_or(Value::Null, Value::Number)
                } else {
                    Value::String(raw.to_string())
                };
                (name.to_string(), value)
            })
            .collect();
        Self(map)
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
