//! In-memory session state: the autosave snapshot and the submission state.
//!
//! Nothing here outlives the process. At most one snapshot is kept and each
//! capture replaces it wholesale.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::{FieldValue, SubmissionState};
use crate::surface::FormSurface;

/// What caused a snapshot to be taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AutosaveTrigger {
    Interval,
    VisibilityHidden,
    Manual,
}

impl fmt::Display for AutosaveTrigger {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(match self {
            Self::Interval => "interval",
            Self::VisibilityHidden => "visibility-hidden",
            Self::Manual => "manual",
        })
    }
}

/// Flat copy of every field value in form-data form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutosaveSnapshot {
    pub values: BTreeMap<String, String>,
}

impl AutosaveSnapshot {
    /// Reads every field from the surface. Unchecked checkboxes are left
    /// out, checked ones are recorded as `"on"`.
    pub fn capture<S: FormSurface + ?Sized>(surface: &S) -> Self {
        let values = surface
            .fields()
            .into_iter()
            .filter_map(|spec| {
                let value = surface.value(&spec.id)?.to_form_data()?;
                Some((spec.id, value))
            })
            .collect();

        Self { values }
    }

    pub fn get(
        &self,
        field_id: &str,
    ) -> Option<&str> {
        self.values.get(field_id).map(String::as_str)
    }

    /// Returns `true` when any recorded value is non-blank.
    pub fn has_data(&self) -> bool {
        self.values.values().any(|value| !value.trim().is_empty())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Writes the recorded values back. Fields absent from the snapshot are
    /// left untouched; entries for fields the surface no longer has are
    /// skipped.
    pub fn apply<S: FormSurface + ?Sized>(
        &self,
        surface: &mut S,
    ) -> usize {
        let mut applied = 0;
        for (field_id, value) in &self.values {
            let Some(spec) = surface.field(field_id) else {
                debug!(field = %field_id, "snapshot entry has no matching field");
                continue;
            };
            let value = if spec.kind.is_checkbox() {
                FieldValue::Checkbox(value == "on")
            } else {
                FieldValue::Text(value.clone())
            };
            surface.set_value(field_id, value);
            applied += 1;
        }
        applied
    }
}

/// Session data owned by one form controller.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    snapshot: Option<AutosaveSnapshot>,
    submission: SubmissionState,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the held snapshot with the current surface contents.
    pub fn capture<S: FormSurface + ?Sized>(
        &mut self,
        surface: &S,
        trigger: AutosaveTrigger,
    ) -> &AutosaveSnapshot {
        let snapshot = AutosaveSnapshot::capture(surface);
        debug!(%trigger, fields = snapshot.len(), "autosave snapshot captured");
        self.snapshot.insert(snapshot)
    }

    /// Writes the held snapshot back into the surface.
    ///
    /// Returns `false` when nothing has been captured yet.
    pub fn restore<S: FormSurface + ?Sized>(
        &self,
        surface: &mut S,
    ) -> bool {
        match &self.snapshot {
            Some(snapshot) => {
                let applied = snapshot.apply(surface);
                debug!(applied, "autosave snapshot restored");
                true
            }
            None => false,
        }
    }

    pub fn snapshot(&self) -> Option<&AutosaveSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn submission(&self) -> SubmissionState {
        self.submission
    }

    pub(crate) fn set_submission(
        &mut self,
        state: SubmissionState,
    ) {
        self.submission = state;
    }
}
