//! Raw form input

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Field name to raw string input, as typed by the user. Iteration and
/// serialization are ordered by field name, not by entry order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormValues(BTreeMap<String, String>);

impl FormValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field, returning the previous value.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.0.insert(name.into(), value.into())
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.0.remove(name)
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True when the field holds something other than whitespace.
    pub fn is_filled(&self, name: &str) -> bool {
        self.get(name).is_some_and(|v| !v.trim().is_empty())
    }

    /// Copy over every non-empty value from `other`.
    pub fn merge_filled(&mut self, other: &FormValues) {
        for (name, value) in other.iter() {
            if !value.is_empty() {
                self.set(name, value);
            }
        }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FormValues {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_filled_skips_empty() {
        let mut values: FormValues = [("name", "Asha"), ("age", "31")].into_iter().collect();
        let saved: FormValues = [("name", ""), ("age", "32"), ("sex", "female")].into_iter().collect();

        values.merge_filled(&saved);

        assert_eq!(values.get("name"), Some("Asha"));
        assert_eq!(values.get("age"), Some("32"));
        assert_eq!(values.get("sex"), Some("female"));
    }

    #[test]
    fn test_is_filled_ignores_whitespace() {
        let mut values = FormValues::new();
        values.set("caste", "   ");
        assert!(!values.is_filled("caste"));
        assert!(!values.is_filled("missing"));
        values.set("caste", "OBC");
        assert!(values.is_filled("caste"));
    }

    #[test]
    fn test_iteration_ordered_by_name() {
        let mut values = FormValues::new();
        values.set("religion", "Hindu");
        values.set("age", "29");
        values.set("mcv", "68");

        let names: Vec<_> = values.iter().map(|(k, _)| k).collect();
        assert_eq!(names, ["age", "mcv", "religion"]);
        assert_eq!(serde_json::to_string(&values).unwrap(), r#"{"age":"29","mcv":"68","religion":"Hindu"}"#);
    }
}
