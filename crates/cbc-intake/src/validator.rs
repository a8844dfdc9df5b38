//! Field validation
//!
//! Checks run per field in a fixed order and stop at the first failure:
//!
//! 1. empty and required
//! 2. empty and optional (passes, nothing else is checked)
//! 3. pattern
//! 4. numeric bounds
//! 5. minimum length
//! 6. numeric parseability for number fields
//!
//! Validation is pure: rendering the outcome is the job of a
//! [`crate::Presenter`].

use regex::Regex;
use serde::Serialize;
use std::collections::HashMap;
use thiserror::Error;

use crate::error::{IntakeError, Result};
use crate::rules::{FieldRule, RuleSet};
use crate::values::FormValues;

/// Message for number fields holding something that is not a number.
pub const INVALID_NUMBER_MESSAGE: &str = "Please enter a valid number";

/// Outcome of checking one field.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ValidationResult {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ValidationResult {
    pub fn valid() -> Self {
        Self { valid: true, message: None }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self { valid: false, message: Some(message.into()) }
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }
}

/// A failed field, as surfaced inline next to the input.
#[derive(Error, Clone, Debug, PartialEq)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

/// Outcome of checking every ruled field.
#[derive(Clone, Debug, Serialize)]
pub struct ValidationReport {
    pub all_valid: bool,
    /// Results in rule order.
    pub per_field: Vec<(String, ValidationResult)>,
}

impl ValidationReport {
    pub fn get(&self, name: &str) -> Option<&ValidationResult> {
        self.per_field.iter().find(|(n, _)| n == name).map(|(_, r)| r)
    }

    /// First failing field in form order, the one that receives focus.
    pub fn first_invalid(&self) -> Option<&str> {
        self.per_field
            .iter()
            .find(|(_, r)| !r.valid)
            .map(|(n, _)| n.as_str())
    }

    pub fn errors(&self) -> Vec<ValidationError> {
        self.per_field
            .iter()
            .filter_map(|(field, r)| {
                r.message.as_ref().filter(|_| !r.valid).map(|message| ValidationError {
                    field: field.clone(),
                    message: message.clone(),
                })
            })
            .collect()
    }
}

struct CompiledRule {
    rule: FieldRule,
    pattern: Option<Regex>,
}

/// Evaluates a rule table against form values.
pub struct Validator {
    rules: RuleSet,
    compiled: Vec<CompiledRule>,
    index: HashMap<String, usize>,
}

impl Validator {
    /// Build a validator, compiling every pattern up front.
    pub fn new(rules: RuleSet) -> Result<Self> {
        let mut compiled = Vec::with_capacity(rules.len());
        let mut index = HashMap::with_capacity(rules.len());

        for rule in rules.rules() {
            if index.insert(rule.name.clone(), compiled.len()).is_some() {
                return Err(IntakeError::DuplicateRule(rule.name.clone()));
            }
            if let (Some(min), Some(max)) = (rule.min, rule.max) {
                if min > max {
                    return Err(IntakeError::InvalidBounds(rule.name.clone()));
                }
            }
            let pattern = rule
                .pattern
                .as_deref()
                .map(Regex::new)
                .transpose()
                .map_err(|source| IntakeError::InvalidPattern {
                    field: rule.name.clone(),
                    source,
                })?;
            compiled.push(CompiledRule { rule: rule.clone(), pattern });
        }

        tracing::debug!(rules = compiled.len(), "validator ready");
        Ok(Self { rules, compiled, index })
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn rule(&self, name: &str) -> Option<&FieldRule> {
        self.index.get(name).map(|&i| &self.compiled[i].rule)
    }

    /// Check one field. Fields without a rule are always valid.
    pub fn validate_field(&self, name: &str, value: &str) -> ValidationResult {
        match self.index.get(name) {
            Some(&i) => check(&self.compiled[i], value),
            None => ValidationResult::valid(),
        }
    }

    pub fn validate_all(&self, values: &FormValues) -> ValidationReport {
        self.validate_all_with(|name| values.get(name))
    }

    /// Check every ruled field, reading values through `lookup`. A field the
    /// lookup does not know is treated as empty.
    pub fn validate_all_with<'v, F>(&self, lookup: F) -> ValidationReport
    where
        F: Fn(&str) -> Option<&'v str>,
    {
        let per_field: Vec<_> = self
            .compiled
            .iter()
            .map(|c| {
                let value = lookup(&c.rule.name).unwrap_or("");
                (c.rule.name.clone(), check(c, value))
            })
            .collect();
        let all_valid = per_field.iter().all(|(_, r)| r.valid);

        ValidationReport { all_valid, per_field }
    }

    /// Share of required fields that hold a value, in percent.
    pub fn progress(&self, values: &FormValues) -> f64 {
        let required: Vec<_> = self.compiled.iter().filter(|c| c.rule.required).collect();
        if required.is_empty() {
            return 100.0;
        }
        let filled = required.iter().filter(|c| values.is_filled(&c.rule.name)).count();
        filled as f64 / required.len() as f64 * 100.0
    }
}

fn check(compiled: &CompiledRule, raw: &str) -> ValidationResult {
    let rule = &compiled.rule;
    let value = raw.trim();

    if value.is_empty() {
        if rule.required {
            return fail(rule, format!("{} is required", rule.display_label()));
        }
        return ValidationResult::valid();
    }

    if let Some(pattern) = &compiled.pattern {
        if !pattern.is_match(value) {
            return fail(rule, rule.message.clone());
        }
    }

    if rule.has_bounds() {
        let in_range = parse_number(value).is_some_and(|n| {
            rule.min.map_or(true, |min| n >= min) && rule.max.map_or(true, |max| n <= max)
        });
        if !in_range {
            return fail(rule, rule.message.clone());
        }
    }

    if let Some(min_length) = rule.min_length {
        if value.chars().count() < min_length {
            return fail(rule, rule.message.clone());
        }
    }

    if rule.field_type.is_numeric() && parse_number(value).is_none() {
        return fail(rule, INVALID_NUMBER_MESSAGE.to_string());
    }

    ValidationResult::valid()
}

fn fail(rule: &FieldRule, message: String) -> ValidationResult {
    tracing::debug!(field = %rule.name, %message, "field rejected");
    ValidationResult::invalid(message)
}

/// Parse a finite floating point number from trimmed input.
pub fn parse_number(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{FieldType, RequirementProfile};

    fn cbc() -> Validator {
        Validator::new(RuleSet::cbc(RequirementProfile::CorePanel)).unwrap()
    }

    fn complete_form() -> FormValues {
        [
            ("name", "Asha Devi"),
            ("whatsapp", "9876543210"),
            ("email", "asha@example.in"),
            ("age", "29"),
            ("sex", "female"),
            ("address", "12 MG Road, Pune"),
            ("caste", "General"),
            ("religion", "Hindu"),
            ("hb", "11.2"),
            ("rbc", "5.6"),
            ("mcv", "68"),
            ("mch", "20.1"),
            ("mchc", "29.5"),
            ("rdwcv", "14.8"),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_required_fields_report_label() {
        let v = cbc();
        for rule in v.rules().rules().iter().filter(|r| r.required) {
            let result = v.validate_field(&rule.name, "   ");
            assert!(!result.valid, "{}", rule.name);
            assert_eq!(
                result.message.as_deref(),
                Some(format!("{} is required", rule.display_label()).as_str())
            );
        }
    }

    #[test]
    fn test_optional_empty_skips_checks() {
        let v = cbc();
        assert!(v.validate_field("wbc", "").valid);
        assert!(v.validate_field("fatigue", "").valid);
    }

    #[test]
    fn test_age_bounds() {
        let v = cbc();
        assert!(!v.validate_field("age", "0").valid);
        assert!(v.validate_field("age", "1").valid);
        assert!(v.validate_field("age", "120").valid);
        assert!(!v.validate_field("age", "121").valid);
        let result = v.validate_field("age", "thirty");
        assert_eq!(result.message.as_deref(), Some("Age must be between 1 and 120 years"));
    }

    #[test]
    fn test_whatsapp_pattern() {
        let v = cbc();
        let result = v.validate_field("whatsapp", "12345");
        assert_eq!(result.message.as_deref(), Some("WhatsApp number must be exactly 10 digits"));
        assert!(v.validate_field("whatsapp", "9876543210").valid);
        assert!(!v.validate_field("whatsapp", "98765 43210").valid);
    }

    #[test]
    fn test_email_pattern() {
        let v = cbc();
        assert!(!v.validate_field("email", "a@b").valid);
        assert!(v.validate_field("email", "a@b.co").valid);
        assert!(v.validate_field("email", "A@B.CO").valid);
        assert!(!v.validate_field("email", "a b@c.org").valid);
    }

    #[test]
    fn test_name_pattern() {
        let v = cbc();
        assert!(!v.validate_field("name", "A").valid);
        assert!(!v.validate_field("name", "R2D2").valid);
        assert!(v.validate_field("name", "  Ravi Kumar  ").valid);
    }

    #[test]
    fn test_min_length_uses_trimmed_chars() {
        let v = cbc();
        assert!(!v.validate_field("address", "  short   ").valid);
        assert!(v.validate_field("address", "Flat 4, Lane 2").valid);
        assert!(v.validate_field("caste", "SC").valid);
        assert!(!v.validate_field("religion", "J").valid);
    }

    #[test]
    fn test_numeric_fields_reject_text() {
        let v = cbc();
        let result = v.validate_field("hb", "12g");
        assert_eq!(result.message.as_deref(), Some(INVALID_NUMBER_MESSAGE));
        assert!(!v.validate_field("platelet", "lots").valid);
        assert!(!v.validate_field("mcv", "NaN").valid);
        assert!(v.validate_field("mcv", "78.5").valid);
    }

    #[test]
    fn test_unknown_field_is_valid() {
        assert!(cbc().validate_field("favouriteColour", "").valid);
    }

    #[test]
    fn test_validate_all_reports_first_invalid_in_form_order() {
        let v = cbc();
        let mut values = complete_form();
        assert!(v.validate_all(&values).all_valid);

        values.set("rbc", "");
        values.set("email", "nope");
        let report = v.validate_all(&values);
        assert!(!report.all_valid);
        assert_eq!(report.first_invalid(), Some("email"));
        assert_eq!(report.errors().len(), 2);
        assert!(report.get("name").unwrap().valid);
    }

    #[test]
    fn test_validate_all_with_lookup() {
        let v = cbc();
        let values = complete_form();
        let report = v.validate_all_with(|name| if name == "sex" { None } else { values.get(name) });
        assert_eq!(report.first_invalid(), Some("sex"));
        assert_eq!(report.get("sex").unwrap().message.as_deref(), Some("Sex is required"));
    }

    #[test]
    fn test_full_panel_requires_differential() {
        let v = Validator::new(RuleSet::cbc(RequirementProfile::FullPanel)).unwrap();
        let report = v.validate_all(&complete_form());
        assert!(!report.all_valid);
        assert_eq!(report.first_invalid(), Some("hct"));
    }

    #[test]
    fn test_progress() {
        let v = cbc();
        assert_eq!(v.progress(&FormValues::new()), 0.0);
        assert_eq!(v.progress(&complete_form()), 100.0);

        let mut half = FormValues::new();
        for name in ["name", "whatsapp", "email", "age", "sex", "address", "caste"] {
            half.set(name, "x");
        }
        assert!((v.progress(&half) - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_invalid_pattern_rejected() {
        let rules = RuleSet::new(vec![FieldRule::new("code", FieldType::ShortText).pattern("([a-z")]);
        assert!(matches!(Validator::new(rules), Err(IntakeError::InvalidPattern { .. })));
    }

    #[test]
    fn test_duplicate_rule_rejected() {
        let rules = RuleSet::new(vec![
            FieldRule::new("age", FieldType::Number),
            FieldRule::new("age", FieldType::Number),
        ]);
        assert!(matches!(Validator::new(rules), Err(IntakeError::DuplicateRule(_))));
    }
}
