//! Rule table listing

use super::Context;
use crate::output::OutputFormat;
use cbc_intake::FieldRule;
use serde::Serialize;
use tabled::Tabled;

#[derive(Debug, Serialize, Tabled)]
pub struct RuleRow {
    pub field: String,
    pub label: String,
    pub required: bool,
    pub check: String,
    pub message: String,
}

fn describe(rule: &FieldRule) -> String {
    let mut checks = Vec::new();
    if let Some(pattern) = &rule.pattern {
        checks.push(format!("matches {}", pattern));
    }
    match (rule.min, rule.max) {
        (Some(min), Some(max)) => checks.push(format!("{} to {}", min, max)),
        (Some(min), None) => checks.push(format!(">= {}", min)),
        (None, Some(max)) => checks.push(format!("<= {}", max)),
        (None, None) => {}
    }
    if let Some(len) = rule.min_length {
        checks.push(format!("at least {} chars", len));
    }
    if rule.field_type.is_numeric() && !rule.has_bounds() {
        checks.push("number".to_string());
    }
    checks.join(", ")
}

pub async fn handle(ctx: &Context, format: OutputFormat) -> anyhow::Result<()> {
    let rules = ctx.rules()?;
    match format {
        OutputFormat::Table => {
            let rows: Vec<_> = rules
                .rules()
                .iter()
                .map(|r| RuleRow {
                    field: r.name.clone(),
                    label: r.display_label().to_string(),
                    required: r.required,
                    check: describe(r),
                    message: r.message.clone(),
                })
                .collect();
            format.print_rows(&rows);
        }
        _ => format.print(&rules),
    }
    Ok(())
}
