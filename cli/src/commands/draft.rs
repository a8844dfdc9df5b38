//! Draft commands

use super::Context;
use crate::{output::OutputFormat, DraftCommands};
use cbc_intake::{DraftStore, DRAFT_KEY};
use serde::Serialize;
use tabled::Tabled;

#[derive(Debug, Serialize, Tabled)]
struct DraftRow {
    field: String,
    value: String,
}

pub async fn handle(action: DraftCommands, ctx: &Context, format: OutputFormat) -> anyhow::Result<()> {
    let store = ctx.drafts();
    match action {
        DraftCommands::Show => match store.load(DRAFT_KEY)? {
            Some(draft) => match format {
                OutputFormat::Table => {
                    println!("Draft saved at {}", draft.saved_at.format("%Y-%m-%d %H:%M:%S UTC"));
                    let rows: Vec<_> = draft
                        .values
                        .iter()
                        .map(|(field, value)| DraftRow { field: field.to_string(), value: value.to_string() })
                        .collect();
                    format.print_rows(&rows);
                }
                _ => format.print(&draft),
            },
            None => println!("No saved draft in {}", store.dir().display()),
        },
        DraftCommands::Clear => {
            store.clear(DRAFT_KEY)?;
            println!("Draft cleared");
        }
    }
    Ok(())
}
