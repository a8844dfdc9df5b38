//! Single-field check, as done when a field loses focus

use super::Context;
use crate::output::OutputFormat;
use colored::Colorize;

pub async fn handle(field: String, value: String, ctx: &Context, format: OutputFormat) -> anyhow::Result<()> {
    let validator = ctx.validator()?;
    if validator.rule(&field).is_none() {
        tracing::warn!(field = %field, "no rule for field, accepted as-is");
    }

    let result = validator.validate_field(&field, &value);
    match format {
        OutputFormat::Table => match &result.message {
            Some(message) if !result.valid => println!("{} {}: {}", "✗".red(), field, message),
            _ => println!("{} {}", "✓".green(), field),
        },
        _ => format.print(&result),
    }

    if !result.valid {
        anyhow::bail!("{} is invalid", field);
    }
    Ok(())
}
