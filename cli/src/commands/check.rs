//! Validate a whole form file

use super::{read_values, Context};
use crate::output::OutputFormat;
use cbc_intake::{screen, CbcPanel, ValidationReport};
use serde::Serialize;
use std::path::PathBuf;
use tabled::Tabled;

#[derive(Debug, Serialize, Tabled)]
pub struct FieldRow {
    pub field: String,
    pub status: String,
    pub message: String,
}

pub fn rows(report: &ValidationReport) -> Vec<FieldRow> {
    report
        .per_field
        .iter()
        .map(|(field, result)| FieldRow {
            field: field.clone(),
            status: if result.valid { "ok" } else { "invalid" }.to_string(),
            message: result.message.clone().unwrap_or_default(),
        })
        .collect()
}

pub async fn handle(file: PathBuf, ctx: &Context, format: OutputFormat) -> anyhow::Result<()> {
    let validator = ctx.validator()?;
    let values = read_values(&file)?;
    let report = validator.validate_all(&values);

    match format {
        OutputFormat::Table => {
            format.print_rows(&rows(&report));
            println!("Progress: {:.0}% of required fields filled", validator.progress(&values));
            if let Some(panel) = CbcPanel::from_values(&values) {
                let screening = screen(panel);
                println!(
                    "Preview: {} (Mentzer index {:.2})",
                    screening.prediction, screening.indices.mentzer
                );
            }
        }
        _ => format.print(&report),
    }

    if !report.all_valid {
        anyhow::bail!(
            "{} field(s) invalid, first: {}",
            report.errors().len(),
            report.first_invalid().unwrap_or_default()
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cbc_intake::{FormValues, RequirementProfile, RuleSet, Validator};

    #[test]
    fn test_rows_follow_rule_order() {
        let validator = Validator::new(RuleSet::cbc(RequirementProfile::CorePanel)).unwrap();
        let mut values = FormValues::new();
        values.set("age", "200");

        let rows = rows(&validator.validate_all(&values));
        assert_eq!(rows[0].field, "name");
        assert_eq!(rows[0].message, "Full Name is required");
        let age = rows.iter().find(|r| r.field == "age").unwrap();
        assert_eq!(age.status, "invalid");
        assert_eq!(age.message, "Age must be between 1 and 120 years");
        let fatigue = rows.iter().find(|r| r.field == "fatigue").unwrap();
        assert_eq!(fatigue.status, "ok");
    }
}
