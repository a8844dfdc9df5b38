//! Terminal rendering of the intake form

use cbc_intake::{DisplayStyle, Presenter, ResultView};
use colored::{ColoredString, Colorize};
use std::path::PathBuf;

pub struct TerminalPresenter {
    /// Where a server-rendered page goes; stdout when unset.
    html_out: Option<PathBuf>,
    loading: bool,
}

impl TerminalPresenter {
    pub fn new(html_out: Option<PathBuf>) -> Self {
        Self { html_out, loading: false }
    }
}

fn styled(text: &str, style: DisplayStyle) -> ColoredString {
    match style {
        DisplayStyle::Success => text.green(),
        DisplayStyle::Warning => text.yellow(),
    }
}

impl Presenter for TerminalPresenter {
    fn show_field_error(&mut self, field: &str, message: &str) {
        eprintln!("  {} {}: {}", "✗".red(), field.bold(), message.red());
    }

    fn clear_field_error(&mut self, _field: &str) {}

    fn focus_field(&mut self, field: &str) {
        eprintln!("  {} first field to fix: {}", "→".cyan(), field.bold());
    }

    fn set_loading(&mut self, loading: bool) {
        if loading && !self.loading {
            eprintln!("{}", "Sending...".dimmed());
        }
        self.loading = loading;
    }

    fn show_submission_error(&mut self, message: &str) {
        eprintln!("{} {}", "Submission failed:".red().bold(), message);
    }

    fn clear_submission_error(&mut self) {}

    fn replace_document(&mut self, html: &str) {
        match &self.html_out {
            Some(path) => match std::fs::write(path, html) {
                Ok(()) => println!("{} {}", "Result page saved to".green(), path.display()),
                Err(e) => {
                    tracing::error!(path = %path.display(), error = %e, "failed to write result page");
                    println!("{}", html);
                }
            },
            None => println!("{}", html),
        }
    }

    fn show_result(&mut self, view: &ResultView) {
        println!("{}", "Submission Successful!".green().bold());
        if let Some(prediction) = &view.prediction {
            println!("Prediction Result: {}", styled(&prediction.text, prediction.style).bold());
        }
        if let Some(probability) = &view.probability {
            println!("Analysis Details: {}", probability);
        }
        for status in [&view.email, &view.data_saved] {
            println!("{}: {}", status.label, styled(&status.text, status.style));
        }
        println!();
        println!("Next Steps:");
        println!("  - Check your email for detailed results");
        println!("  - Consult with a healthcare professional for detailed analysis");
    }

    fn reset(&mut self) {
        self.loading = false;
    }
}
