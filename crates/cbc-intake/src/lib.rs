//! CBC / Thalassemia Screening Intake
//!
//! Client side of the thalassemia screening form: declarative field rules,
//! validation on blur and on submit, autosaved drafts and a single-shot
//! submission to the screening service.
//!
//! ## Features
//! - Rule table with a configurable requirement profile
//! - Pure validation, rendered through a [`Presenter`]
//! - `Idle → Validating → Submitting → Success | Failed` submission pipeline
//! - Draft autosave and restore
//! - Offline CBC discriminant indices

pub mod draft;
pub mod error;
pub mod payload;
pub mod presenter;
pub mod rules;
pub mod screening;
pub mod submission;
pub mod transport;
pub mod validator;
pub mod values;

pub use draft::{Draft, DraftStore, FileDraftStore, InMemoryDraftStore, DRAFT_KEY};
pub use error::{IntakeError, Result};
pub use payload::SubmissionPayload;
pub use presenter::{DisplayStyle, Presenter, RecordingPresenter, ResultView};
pub use rules::{FieldRule, FieldType, RequirementProfile, RuleSet};
pub use screening::{screen, CbcIndices, CbcPanel, Prediction, Screening};
pub use submission::{FormSession, SubmissionOutcome, SubmissionResult, SubmissionState, SubmitError};
pub use transport::{HttpTransport, RawResponse, Transport, TransportError};
pub use validator::{ValidationError, ValidationReport, ValidationResult, Validator};
pub use values::FormValues;
