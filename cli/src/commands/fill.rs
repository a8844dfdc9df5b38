//! Interactive form filling
//!
//! Walks the rule table in form order. Each answer is stored and autosaved,
//! then checked as if the field had lost focus; a rejected answer is asked
//! again. Ending input early keeps the draft for later.

use super::{submit, Context};
use crate::presenter::TerminalPresenter;
use cbc_intake::{FieldRule, FormSession, Presenter};
use colored::Colorize;
use std::io::{self, BufRead, Write};

enum Answer {
    Value(String),
    Eof,
}

fn prompt(rule: &FieldRule, current: Option<&str>, input: &mut impl BufRead) -> io::Result<Answer> {
    let marker = if rule.required { "*" } else { "" };
    match current.filter(|c| !c.is_empty()) {
        Some(current) => print!("{}{} [{}]: ", rule.display_label(), marker, current.dimmed()),
        None => print!("{}{}: ", rule.display_label(), marker),
    }
    io::stdout().flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(Answer::Eof);
    }
    let line = line.trim_end_matches(['\r', '\n']);
    Ok(Answer::Value(match (line.is_empty(), current) {
        (true, Some(current)) => current.to_string(),
        _ => line.to_string(),
    }))
}

/// Ask for every field until it passes. Returns false if input ran out.
pub fn collect<P: Presenter>(session: &mut FormSession<P>, input: &mut impl BufRead) -> io::Result<bool> {
    let rules: Vec<FieldRule> = session.validator().rules().rules().to_vec();
    for rule in &rules {
        loop {
            let current = session.values().get(&rule.name).map(String::from);
            match prompt(rule, current.as_deref(), input)? {
                Answer::Eof => return Ok(false),
                Answer::Value(value) => {
                    session.input(&rule.name, &value);
                    if session.blur(&rule.name).valid {
                        break;
                    }
                }
            }
        }
    }
    Ok(true)
}

pub async fn handle(ctx: &Context) -> anyhow::Result<()> {
    let mut session = ctx.session(TerminalPresenter::new(None))?.with_drafts(ctx.drafts());
    if !session.values().is_empty() {
        println!("{}", "Restored saved draft, press Enter to keep a value.".dimmed());
    }

    let stdin = io::stdin();
    let mut input = stdin.lock();
    if !collect(&mut session, &mut input)? {
        println!();
        println!("Draft saved ({:.0}% of required fields filled).", session.progress());
        return Ok(());
    }

    print!("Submit now? [y/N]: ");
    io::stdout().flush()?;
    let mut answer = String::new();
    input.read_line(&mut answer)?;
    drop(input);

    if answer.trim().eq_ignore_ascii_case("y") {
        submit::run(&mut session).await
    } else {
        println!("Draft saved. Run `cbc-intake submit` when ready.");
        Ok(())
    }
}
