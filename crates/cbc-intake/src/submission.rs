//! Submission pipeline
//!
//! A [`FormSession`] owns the values of one intake form and drives it through
//! `Idle → Validating → Submitting → Success | Failed`. Exactly one request is
//! made per accepted submit; nothing is retried.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

use crate::draft::{Draft, DraftStore, DRAFT_KEY};
use crate::payload::SubmissionPayload;
use crate::presenter::{Presenter, ResultView};
use crate::transport::{RawResponse, Transport, TransportError};
use crate::validator::{ValidationError, ValidationResult, Validator};
use crate::values::FormValues;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub enum SubmissionState {
    #[default]
    Idle,
    Validating,
    Submitting,
    Success,
    Failed,
}

impl SubmissionState {
    /// Whether a new submit may start from here.
    pub fn accepts_submit(&self) -> bool {
        matches!(self, SubmissionState::Idle | SubmissionState::Failed)
    }
}

impl fmt::Display for SubmissionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SubmissionState::Idle => "idle",
            SubmissionState::Validating => "validating",
            SubmissionState::Submitting => "submitting",
            SubmissionState::Success => "success",
            SubmissionState::Failed => "failed",
        };
        write!(f, "{}", s)
    }
}

/// JSON result returned by the screening service.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SubmissionResult {
    #[serde(default)]
    pub prediction: Option<String>,
    #[serde(default)]
    pub probability: Option<String>,
    #[serde(default)]
    pub email_sent: Option<bool>,
    #[serde(default)]
    pub sheets_saved: Option<bool>,
}

/// Why a submit attempt ended without success. The message is what the user
/// sees.
#[derive(Error, Debug)]
pub enum SubmitError {
    #[error("Please correct the highlighted fields")]
    Validation {
        first_invalid: String,
        errors: Vec<ValidationError>,
    },

    #[error("Form cannot be submitted while {0}")]
    NotIdle(SubmissionState),

    #[error("Network error. Please check your internet connection and try again.")]
    Network(String),

    #[error("Server error. Please try again later.")]
    Server { status: u16 },

    #[error("Too many requests. Please wait a moment and try again.")]
    RateLimited,

    #[error("{0}")]
    Unknown(String),
}

impl SubmitError {
    /// Classify a non-success HTTP status.
    pub fn from_status(status: u16) -> Self {
        match status {
            429 => SubmitError::RateLimited,
            500..=599 => SubmitError::Server { status },
            _ => SubmitError::Unknown(format!("Server error: {}", status)),
        }
    }
}

impl From<TransportError> for SubmitError {
    fn from(e: TransportError) -> Self {
        match e {
            TransportError::Timeout | TransportError::Connection(_) => SubmitError::Network(e.to_string()),
            TransportError::Client(msg) => SubmitError::Unknown(msg),
        }
    }
}

/// Terminal result of one submit attempt.
#[derive(Debug)]
pub enum SubmissionOutcome {
    /// The server answered with a full page that replaced the form.
    Page(String),
    /// The server answered with structured data rendered inline.
    Result(SubmissionResult),
    Failed(SubmitError),
}

impl SubmissionOutcome {
    pub fn is_success(&self) -> bool {
        !matches!(self, SubmissionOutcome::Failed(_))
    }
}

enum Accepted {
    Page(String),
    Result(SubmissionResult),
}

/// One intake form: values, validation and the submit state machine.
pub struct FormSession<P: Presenter> {
    validator: Validator,
    values: FormValues,
    state: SubmissionState,
    transport: Arc<dyn Transport>,
    presenter: P,
    drafts: Option<Arc<dyn DraftStore>>,
}

impl<P: Presenter> FormSession<P> {
    pub fn new(validator: Validator, transport: Arc<dyn Transport>, presenter: P) -> Self {
        Self {
            validator,
            values: FormValues::new(),
            state: SubmissionState::Idle,
            transport,
            presenter,
            drafts: None,
        }
    }

    /// Autosave into `store`, restoring whatever draft it already holds.
    pub fn with_drafts(mut self, store: Arc<dyn DraftStore>) -> Self {
        match store.load(DRAFT_KEY) {
            Ok(Some(draft)) => {
                tracing::info!(saved_at = %draft.saved_at, fields = draft.values.len(), "restoring draft");
                self.values.merge_filled(&draft.values);
            }
            Ok(None) => {}
            Err(e) => tracing::warn!(error = %e, "failed to load draft"),
        }
        self.drafts = Some(store);
        self
    }

    pub fn state(&self) -> SubmissionState {
        self.state
    }

    pub fn values(&self) -> &FormValues {
        &self.values
    }

    pub fn validator(&self) -> &Validator {
        &self.validator
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    pub fn presenter_mut(&mut self) -> &mut P {
        &mut self.presenter
    }

    pub fn progress(&self) -> f64 {
        self.validator.progress(&self.values)
    }

    /// User typed into a field: store it, drop its stale error, autosave.
    pub fn input(&mut self, name: &str, value: &str) {
        self.values.set(name, value);
        self.presenter.clear_field_error(name);
        self.save_draft();
    }

    /// User left a field: check it and render the verdict.
    pub fn blur(&mut self, name: &str) -> ValidationResult {
        let value = self.values.get(name).unwrap_or("");
        let result = self.validator.validate_field(name, value);
        match &result.message {
            Some(message) if !result.valid => self.presenter.show_field_error(name, message),
            _ => self.presenter.clear_field_error(name),
        }
        result
    }

    /// Validate everything and, if clean, send the form once.
    pub async fn submit(&mut self) -> SubmissionOutcome {
        if !self.state.accepts_submit() {
            tracing::warn!(state = %self.state, "submit ignored");
            return SubmissionOutcome::Failed(SubmitError::NotIdle(self.state));
        }

        self.state = SubmissionState::Validating;
        self.presenter.clear_submission_error();
        for name in self.validator.rules().names() {
            self.presenter.clear_field_error(name);
        }

        let report = self.validator.validate_all(&self.values);
        if !report.all_valid {
            let errors = report.errors();
            for error in &errors {
                self.presenter.show_field_error(&error.field, &error.message);
            }
            let first_invalid = report.first_invalid().unwrap_or_default().to_string();
            self.presenter.focus_field(&first_invalid);
            self.state = SubmissionState::Idle;
            tracing::info!(invalid = errors.len(), first = %first_invalid, "validation failed");
            return SubmissionOutcome::Failed(SubmitError::Validation { first_invalid, errors });
        }

        self.state = SubmissionState::Submitting;
        self.presenter.set_loading(true);

        let payload = SubmissionPayload::build(&self.values, self.validator.rules());
        let accepted = match self.transport.send(&payload).await {
            Ok(resp) => accept(resp),
            Err(e) => Err(SubmitError::from(e)),
        };

        match accepted {
            Ok(Accepted::Page(html)) => {
                self.state = SubmissionState::Success;
                self.presenter.set_loading(false);
                self.presenter.replace_document(&html);
                self.clear_draft();
                tracing::info!("submission accepted, page replaced");
                SubmissionOutcome::Page(html)
            }
            Ok(Accepted::Result(result)) => {
                self.state = SubmissionState::Success;
                self.presenter.set_loading(false);
                self.presenter.show_result(&ResultView::from_result(&result));
                self.clear_draft();
                tracing::info!(prediction = ?result.prediction, "submission accepted");
                SubmissionOutcome::Result(result)
            }
            Err(e) => {
                self.state = SubmissionState::Failed;
                tracing::error!(error = ?e, "submission failed");
                self.presenter.show_submission_error(&e.to_string());
                self.presenter.set_loading(false);
                SubmissionOutcome::Failed(e)
            }
        }
    }

    /// Back to an empty form in `Idle`.
    pub fn reset(&mut self) {
        self.values.clear();
        self.state = SubmissionState::Idle;
        self.presenter.reset();
        self.clear_draft();
    }

    fn save_draft(&self) {
        if let Some(store) = &self.drafts {
            if let Err(e) = store.save(DRAFT_KEY, &Draft::new(self.values.clone())) {
                tracing::warn!(error = %e, "failed to save draft");
            }
        }
    }

    fn clear_draft(&self) {
        if let Some(store) = &self.drafts {
            if let Err(e) = store.clear(DRAFT_KEY) {
                tracing::warn!(error = %e, "failed to clear draft");
            }
        }
    }
}

fn accept(resp: RawResponse) -> Result<Accepted, SubmitError> {
    if !resp.is_success() {
        return Err(SubmitError::from_status(resp.status));
    }
    if resp.is_html() {
        return Ok(Accepted::Page(resp.body));
    }
    serde_json::from_str(&resp.body)
        .map(Accepted::Result)
        .map_err(|e| SubmitError::Unknown(format!("Invalid response from server: {}", e)))
}
