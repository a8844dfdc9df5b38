//! Presentation adapter
//!
//! The form state machine talks to whatever is showing the form through
//! [`Presenter`]. Nothing here decides validity; it only renders what the
//! validator and the submission pipeline produced.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::submission::SubmissionResult;

pub const SUBMIT_LABEL: &str = "Analyze CBC Parameters";
pub const SENDING_LABEL: &str = "Sending...";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayStyle {
    Success,
    Warning,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PredictionBlock {
    pub text: String,
    pub style: DisplayStyle,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StatusIndicator {
    pub label: String,
    pub text: String,
    pub style: DisplayStyle,
}

/// Inline rendering of a JSON screening result.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ResultView {
    pub prediction: Option<PredictionBlock>,
    pub probability: Option<String>,
    pub email: StatusIndicator,
    pub data_saved: StatusIndicator,
}

impl ResultView {
    pub fn from_result(result: &SubmissionResult) -> Self {
        let prediction = result
            .prediction
            .as_deref()
            .filter(|p| !p.is_empty())
            .map(|p| PredictionBlock {
                text: p.to_string(),
                style: if p.contains("Likely") { DisplayStyle::Warning } else { DisplayStyle::Success },
            });

        Self {
            prediction,
            probability: result.probability.clone().filter(|p| !p.is_empty()),
            email: indicator("Email", result.email_sent.unwrap_or(false), "Sent"),
            data_saved: indicator("Data Saved", result.sheets_saved.unwrap_or(false), "Success"),
        }
    }
}

fn indicator(label: &str, ok: bool, ok_text: &str) -> StatusIndicator {
    StatusIndicator {
        label: label.to_string(),
        text: if ok { ok_text.to_string() } else { "Failed".to_string() },
        style: if ok { DisplayStyle::Success } else { DisplayStyle::Warning },
    }
}

/// Rendering surface for the intake form.
pub trait Presenter: Send {
    fn show_field_error(&mut self, field: &str, message: &str);

    fn clear_field_error(&mut self, field: &str);

    fn focus_field(&mut self, field: &str);

    /// Disable (or re-enable) the submit control and swap its label.
    fn set_loading(&mut self, loading: bool);

    fn show_submission_error(&mut self, message: &str);

    fn clear_submission_error(&mut self);

    /// Replace everything on screen with a page returned by the server.
    fn replace_document(&mut self, html: &str);

    /// Hide the form and show the screening result in its place.
    fn show_result(&mut self, view: &ResultView);

    /// Show the empty form again.
    fn reset(&mut self);
}

/// Presenter that keeps the rendered state in memory.
#[derive(Debug, Clone)]
pub struct RecordingPresenter {
    pub field_errors: BTreeMap<String, String>,
    pub focused: Option<String>,
    pub submit_enabled: bool,
    pub submit_label: String,
    pub form_visible: bool,
    pub submission_error: Option<String>,
    pub document: Option<String>,
    pub result: Option<ResultView>,
    /// Every loading toggle, in order.
    pub loading_history: Vec<bool>,
}

impl Default for RecordingPresenter {
    fn default() -> Self {
        Self {
            field_errors: BTreeMap::new(),
            focused: None,
            submit_enabled: true,
            submit_label: SUBMIT_LABEL.to_string(),
            form_visible: true,
            submission_error: None,
            document: None,
            result: None,
            loading_history: Vec::new(),
        }
    }
}

impl RecordingPresenter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Presenter for RecordingPresenter {
    fn show_field_error(&mut self, field: &str, message: &str) {
        self.field_errors.insert(field.to_string(), message.to_string());
    }

    fn clear_field_error(&mut self, field: &str) {
        self.field_errors.remove(field);
    }

    fn focus_field(&mut self, field: &str) {
        self.focused = Some(field.to_string());
    }

    fn set_loading(&mut self, loading: bool) {
        self.submit_enabled = !loading;
        self.submit_label = if loading { SENDING_LABEL } else { SUBMIT_LABEL }.to_string();
        self.loading_history.push(loading);
    }

    fn show_submission_error(&mut self, message: &str) {
        self.submission_error = Some(message.to_string());
    }

    fn clear_submission_error(&mut self) {
        self.submission_error = None;
    }

    fn replace_document(&mut self, html: &str) {
        self.form_visible = false;
        self.document = Some(html.to_string());
    }

    fn show_result(&mut self, view: &ResultView) {
        self.form_visible = false;
        self.result = Some(view.clone());
    }

    fn reset(&mut self) {
        *self = Self::default();
    }
}
