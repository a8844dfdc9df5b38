//! Offline CBC indices

use crate::output::OutputFormat;
use cbc_intake::{screen, CbcPanel};
use colored::Colorize;

pub async fn handle(panel: CbcPanel, format: OutputFormat) -> anyhow::Result<()> {
    let screening = screen(panel);
    match format {
        OutputFormat::Table => {
            let idx = &screening.indices;
            println!("Mentzer index:     {:.2}", idx.mentzer);
            println!("Shine & Lal index: {:.2}", idx.shine_lal);
            println!("Srivastava index:  {:.2}", idx.srivastava);
            println!("Green & King:      {:.2}", idx.green_king);
            let prediction = if screening.prediction.contains("Likely") {
                screening.prediction.yellow().bold()
            } else {
                screening.prediction.green().bold()
            };
            println!("Prediction:        {}", prediction);
        }
        _ => format.print(&screening),
    }
    Ok(())
}
