use serde::Serialize;

use crate::session::AutosaveSnapshot;
use crate::transport::SubmissionReceipt;
use crate::validation::FieldError;

/// A key press with its modifier state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyChord {
    pub key: char,
    pub ctrl: bool,
    pub meta: bool,
}

impl KeyChord {
    pub fn plain(key: char) -> Self {
        Self {
            key,
            ctrl: false,
            meta: false,
        }
    }

    pub fn ctrl(key: char) -> Self {
        Self {
            ctrl: true,
            ..Self::plain(key)
        }
    }

    /// Cmd on macOS.
    pub fn meta(key: char) -> Self {
        Self {
            meta: true,
            ..Self::plain(key)
        }
    }

    /// Ctrl or Cmd held with `key`.
    pub fn is_command(
        &self,
        key: char,
    ) -> bool {
        (self.ctrl || self.meta) && self.key.eq_ignore_ascii_case(&key)
    }
}

/// Everything the hosting page can report to the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormEvent {
    /// The field's value was edited.
    Input(String),
    /// The field's value was committed.
    Change(String),
    /// The field lost focus.
    Blur(String),
    Submit,
    Clear,
    Print,
    NewReport,
    RestoreSnapshot,
    AutosaveTick,
    VisibilityHidden,
    Key(KeyChord),
}

/// Result of [`FormController::dispatch`](super::FormController::dispatch).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventOutcome {
    Handled,
    /// The event did not apply in the current state.
    Ignored,
    /// A shortcut was consumed; the platform's own handling must not run.
    DefaultPrevented,
    /// Validation failed and nothing was submitted.
    Invalid(Vec<FieldError>),
    /// The report is submitting. The host hands the payload to the
    /// transport and reports back through `finish_submit`.
    SubmissionStarted(AutosaveSnapshot),
}

/// First half of a submit attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitStart {
    Invalid(Vec<FieldError>),
    Started(AutosaveSnapshot),
}

/// Outcome of a complete submit attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum SubmitOutcome {
    Invalid(Vec<FieldError>),
    Submitted(SubmissionReceipt),
}
