//! Submit the form to the screening service

use super::{read_values, Context};
use crate::presenter::TerminalPresenter;
use cbc_intake::{FormSession, Presenter, SubmissionOutcome};
use std::path::PathBuf;

pub async fn handle(file: Option<PathBuf>, html_out: Option<PathBuf>, ctx: &Context) -> anyhow::Result<()> {
    let presenter = TerminalPresenter::new(html_out);
    let mut session = ctx.session(presenter)?;

    match file {
        Some(path) => {
            for (name, value) in read_values(&path)?.iter() {
                session.input(name, value);
            }
        }
        None => {
            session = session.with_drafts(ctx.drafts());
            if session.values().is_empty() {
                anyhow::bail!("No saved draft to submit; run `fill` or pass --file");
            }
        }
    }

    run(&mut session).await
}

/// Drive one submit attempt and map its outcome to the exit status.
pub async fn run<P: Presenter>(session: &mut FormSession<P>) -> anyhow::Result<()> {
    match session.submit().await {
        SubmissionOutcome::Page(_) | SubmissionOutcome::Result(_) => Ok(()),
        SubmissionOutcome::Failed(e) => Err(e.into()),
    }
}
