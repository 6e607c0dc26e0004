pub mod field_ids;

mod field;
mod section_state;
mod submission_state;

pub use field::{FieldKind, FieldSpec, FieldValue};
pub use section_state::SectionCompletionState;
pub use submission_state::SubmissionState;
