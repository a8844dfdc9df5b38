//! Declarative field rules
//!
//! The rule table is the single source of truth for how each field of the
//! intake form is checked. It is built once (either the built-in CBC table or
//! a TOML file) and handed to [`crate::Validator`], which never mutates it.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{IntakeError, Result};

// =============================================================================
// Core Types
// =============================================================================

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    #[default]
    ShortText,
    LongText,
    Email,
    Phone,
    Number,
    Dropdown,
}

impl FieldType {
    /// Numeric fields are re-checked for parseability and sent as JSON numbers.
    pub fn is_numeric(&self) -> bool {
        matches!(self, FieldType::Number)
    }
}

/// Constraint for a single form field.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FieldRule {
    pub name: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub field_type: FieldType,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub pattern: Option<String>,
    #[serde(default)]
    pub min: Option<f64>,
    #[serde(default)]
    pub max: Option<f64>,
    #[serde(default)]
    pub min_length: Option<usize>,
    #[serde(default)]
    pub message: String,
}

impl FieldRule {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            label: None,
            field_type,
            required: false,
            pattern: None,
            min: None,
            max: None,
            min_length: None,
            message: String::new(),
        }
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    pub fn range(mut self, min: f64, max: f64) -> Self {
        self.min = Some(min);
        self.max = Some(max);
        self
    }

    pub fn min_length(mut self, len: usize) -> Self {
        self.min_length = Some(len);
        self
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Display label, falling back to the field name.
    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.name)
    }

    pub fn has_bounds(&self) -> bool {
        self.min.is_some() || self.max.is_some()
    }
}

/// Which clinical fields must be filled in.
///
/// The core panel (Hb, RBC, MCV, MCH, MCHC, RDW-CV) is always required. The
/// full panel also requires the remaining CBC parameters and the differential
/// count.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RequirementProfile {
    #[default]
    CorePanel,
    FullPanel,
}

impl fmt::Display for RequirementProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequirementProfile::CorePanel => write!(f, "core-panel"),
            RequirementProfile::FullPanel => write!(f, "full-panel"),
        }
    }
}

impl FromStr for RequirementProfile {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "core-panel" | "core" => Ok(RequirementProfile::CorePanel),
            "full-panel" | "full" => Ok(RequirementProfile::FullPanel),
            other => Err(format!("unknown requirement profile: {}", other)),
        }
    }
}

/// Ordered rule table. Order is form order.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RuleSet {
    #[serde(rename = "field", default)]
    rules: Vec<FieldRule>,
}

/// Core CBC parameters, required under every profile.
const CORE_PANEL: &[(&str, &str, &str)] = &[
    ("hb", "Hemoglobin (Hb)", "Hemoglobin value is required"),
    ("rbc", "RBC Count", "RBC count is required"),
    ("mcv", "MCV", "MCV value is required"),
    ("mch", "MCH", "MCH value is required"),
    ("mchc", "MCHC", "MCHC value is required"),
    ("rdwcv", "RDW-CV", "RDW-CV value is required"),
];

/// Remaining CBC parameters and the differential count.
const EXTENDED_PANEL: &[(&str, &str, &str)] = &[
    ("hct", "Hematocrit (HCT)", "Hematocrit value is required"),
    ("wbc", "WBC Count", "WBC count is required"),
    ("platelet", "Platelet Count", "Platelet count is required"),
    ("rdwsd", "RDW-SD", "RDW-SD value is required"),
    ("mpv", "MPV", "MPV value is required"),
    ("pdw", "PDW", "PDW value is required"),
    ("plcr", "P-LCR", "P-LCR value is required"),
    ("pct", "PCT", "PCT value is required"),
    ("plcc", "P-LCC", "P-LCC value is required"),
    ("neutrophils", "Neutrophils (%)", "Neutrophils percentage is required"),
    ("eosinophils", "Eosinophils (%)", "Eosinophils percentage is required"),
    ("basophils", "Basophils (%)", "Basophils percentage is required"),
    ("lymphocytes", "Lymphocytes (%)", "Lymphocytes percentage is required"),
    ("monocytes", "Monocytes (%)", "Monocytes percentage is required"),
];

const MEDICAL_HISTORY: &[(&str, &str)] = &[
    ("bloodWithin3Months", "Blood transfusion within 3 months"),
    ("bloodMoreThan2Times", "Blood transfusion more than 2 times"),
    ("fatigue", "Frequent fatigue"),
    ("breathless", "Breathlessness"),
    ("illFrequently", "Frequently ill"),
    ("familyHistory", "Family history of thalassemia"),
];

impl RuleSet {
    pub fn new(rules: Vec<FieldRule>) -> Self {
        Self { rules }
    }

    /// The built-in CBC / Thalassemia screening form.
    pub fn cbc(profile: RequirementProfile) -> Self {
        let mut rules = vec![
            FieldRule::new("name", FieldType::ShortText)
                .label("Full Name")
                .required()
                .pattern(r"^[A-Za-z\s]{2,50}$")
                .message("Name must contain 2-50 letters and spaces only"),
            FieldRule::new("whatsapp", FieldType::Phone)
                .label("WhatsApp Number")
                .required()
                .pattern(r"^\d{10}$")
                .message("WhatsApp number must be exactly 10 digits"),
            FieldRule::new("email", FieldType::Email)
                .label("Email Address")
                .required()
                .pattern(r"(?i)^[^\s@]+@[^\s@]+\.[a-z]{2,}$")
                .message("Please enter a valid email address"),
            FieldRule::new("age", FieldType::Number)
                .label("Age")
                .required()
                .range(1.0, 120.0)
                .message("Age must be between 1 and 120 years"),
            FieldRule::new("sex", FieldType::Dropdown)
                .label("Sex")
                .required()
                .message("Please select sex"),
            FieldRule::new("address", FieldType::LongText)
                .label("Address")
                .required()
                .min_length(10)
                .message("Address must be at least 10 characters long"),
            FieldRule::new("caste", FieldType::ShortText)
                .label("Caste")
                .required()
                .min_length(2)
                .message("Caste must be at least 2 characters long"),
            FieldRule::new("religion", FieldType::ShortText)
                .label("Religion")
                .required()
                .min_length(2)
                .message("Religion must be at least 2 characters long"),
        ];

        rules.extend(
            MEDICAL_HISTORY
                .iter()
                .map(|(name, label)| FieldRule::new(*name, FieldType::Dropdown).label(*label)),
        );

        rules.extend(CORE_PANEL.iter().map(|(name, label, message)| {
            FieldRule::new(*name, FieldType::Number)
                .label(*label)
                .required()
                .message(*message)
        }));

        rules.extend(EXTENDED_PANEL.iter().map(|(name, label, message)| {
            let rule = FieldRule::new(*name, FieldType::Number)
                .label(*label)
                .message(*message);
            match profile {
                RequirementProfile::FullPanel => rule.required(),
                RequirementProfile::CorePanel => rule,
            }
        }));

        Self { rules }
    }

    /// Parse a rule table from TOML (`[[field]]` tables).
    ///
    /// `field_type` alone decides whether a field is checked as a number and
    /// sent as a JSON number. It defaults to `short_text`, so a clinical field
    /// such as `hb` needs `field_type = "number"` to get either treatment.
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| IntakeError::Rules(e.to_string()))
    }

    pub fn load(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn rules(&self) -> &[FieldRule] {
        &self.rules
    }

    pub fn get(&self, name: &str) -> Option<&FieldRule> {
        self.rules.iter().find(|r| r.name == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(|r| r.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cbc_profiles_differ_only_in_extended_panel() {
        let core = RuleSet::cbc(RequirementProfile::CorePanel);
        let full = RuleSet::cbc(RequirementProfile::FullPanel);
        assert_eq!(core.len(), full.len());

        for (a, b) in core.rules().iter().zip(full.rules()) {
            assert_eq!(a.name, b.name);
            let extended = EXTENDED_PANEL.iter().any(|(n, _, _)| *n == a.name);
            if extended {
                assert!(!a.required && b.required, "{}", a.name);
            } else {
                assert_eq!(a.required, b.required, "{}", a.name);
            }
        }
    }

    #[test]
    fn test_core_panel_always_required() {
        let rules = RuleSet::cbc(RequirementProfile::CorePanel);
        for name in ["hb", "rbc", "mcv", "mch", "mchc", "rdwcv"] {
            let rule = rules.get(name).unwrap();
            assert!(rule.required);
            assert!(rule.field_type.is_numeric());
        }
        assert!(!rules.get("fatigue").unwrap().required);
    }

    #[test]
    fn test_rules_from_toml() {
        let rules = RuleSet::from_toml(
            r#"
            [[field]]
            name = "age"
            field_type = "number"
            required = true
            min = 1
            max = 120
            message = "Age must be between 1 and 120 years"

            [[field]]
            name = "notes"
            field_type = "long_text"
            "#,
        )
        .unwrap();

        assert_eq!(rules.len(), 2);
        let age = rules.get("age").unwrap();
        assert_eq!(age.min, Some(1.0));
        assert_eq!(age.display_label(), "age");
        assert!(!rules.get("notes").unwrap().required);
    }

    #[test]
    fn test_toml_field_type_decides_numeric_handling() {
        use crate::payload::SubmissionPayload;
        use crate::validator::Validator;
        use crate::values::FormValues;

        let untyped = RuleSet::from_toml("[[field]]\nname = \"hb\"\nrequired = true\n").unwrap();
        assert_eq!(untyped.get("hb").unwrap().field_type, FieldType::ShortText);
        assert!(Validator::new(untyped.clone()).unwrap().validate_field("hb", "abc").valid);
        let values: FormValues = [("hb", "11.2")].into_iter().collect();
        assert_eq!(SubmissionPayload::build(&values, &untyped).get("hb"), Some(&serde_json::json!("11.2")));

        let typed =
            RuleSet::from_toml("[[field]]\nname = \"hb\"\nfield_type = \"number\"\nrequired = true\n").unwrap();
        assert!(!Validator::new(typed.clone()).unwrap().validate_field("hb", "abc").valid);
        assert_eq!(SubmissionPayload::build(&values, &typed).get("hb"), Some(&serde_json::json!(11.2)));
    }

    #[test]
    fn test_demo_rules_parse() {
        let rules = RuleSet::from_toml(include_str!("../../../demos/rules.toml")).unwrap();
        assert_eq!(rules.names().collect::<Vec<_>>(), ["name", "whatsapp", "age", "hb", "rbc", "mcv", "mch"]);
        assert_eq!(rules.get("whatsapp").unwrap().field_type, FieldType::Phone);
        assert!(rules.get("mch").unwrap().field_type.is_numeric());
    }

    #[test]
    fn test_profile_from_str() {
        assert_eq!("full".parse::<RequirementProfile>().unwrap(), RequirementProfile::FullPanel);
        assert_eq!(RequirementProfile::CorePanel.to_string(), "core-panel");
        assert!("strict".parse::<RequirementProfile>().is_err());
    }
}
