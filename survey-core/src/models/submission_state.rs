use std::fmt;

use serde::{Deserialize, Serialize};

/// Where the report is in its submit lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SubmissionState {
    #[default]
    Editing,
    Submitting,
    Submitted,
}

impl SubmissionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Editing => "editing",
            Self::Submitting => "submitting",
            Self::Submitted => "submitted",
        }
    }
}

impl fmt::Display for SubmissionState {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
