use serde::{Deserialize, Serialize};

/// Completion status of a form section, derived from its required fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SectionCompletionState {
    #[default]
    Empty,
    Partial,
    Complete,
}

impl SectionCompletionState {
    /// Derives the state from the number of filled required fields.
    ///
    /// A section without required fields is never complete.
    pub fn from_counts(
        filled: usize,
        total: usize,
    ) -> Self {
        if total > 0 && filled == total {
            Self::Complete
        } else if filled > 0 {
            Self::Partial
        } else {
            Self::Empty
        }
    }

    /// CSS-style class name a page would apply, `None` for [`Self::Empty`].
    pub fn as_class(&self) -> Option<&'static str> {
        match self {
            Self::Empty => None,
            Self::Partial => Some("incomplete"),
            Self::Complete => Some("completed"),
        }
    }
}
