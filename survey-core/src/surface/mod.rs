//! The form surface the controller reads from and writes to.
//!
//! The hosting page owns every field. The controller only holds the surface
//! and reacts to it; it never creates or removes fields.

pub mod memory;

pub use memory::MemorySurface;

use crate::models::{FieldSpec, FieldValue, SectionCompletionState};

/// Operations the controller needs from whatever renders the form.
///
/// Implementations are expected to ignore ids they do not know.
pub trait FormSurface {
    // Layout
    fn fields(&self) -> Vec<FieldSpec>;
    fn sections(&self) -> Vec<String>;

    fn field(
        &self,
        id: &str,
    ) -> Option<FieldSpec> {
        self.fields().into_iter().find(|spec| spec.id == id)
    }

    // Values
    fn value(
        &self,
        id: &str,
    ) -> Option<FieldValue>;
    fn set_value(
        &mut self,
        id: &str,
        value: FieldValue,
    );

    /// Text content of a field, `""` when the field is unknown or a checkbox.
    fn text(
        &self,
        id: &str,
    ) -> String {
        self.value(id)
            .map(|value| value.as_text().to_string())
            .unwrap_or_default()
    }

    // Error annotation and visual flags
    fn error(
        &self,
        id: &str,
    ) -> Option<String>;

    /// Flags the field invalid and attaches `message` next to it, replacing
    /// any message already attached.
    fn set_error(
        &mut self,
        id: &str,
        message: &str,
    );

    /// Removes the invalid flag and any attached message.
    fn clear_error(
        &mut self,
        id: &str,
    );

    fn set_calculated(
        &mut self,
        id: &str,
        calculated: bool,
    );

    fn set_section_state(
        &mut self,
        section: &str,
        state: SectionCompletionState,
    );

    // Navigation
    fn focus(
        &mut self,
        id: &str,
    );
    fn scroll_into_view(
        &mut self,
        id: &str,
    );
    fn scroll_to_top(&mut self);

    // Page-level presentation
    fn form_visible(&self) -> bool;
    fn set_form_visible(
        &mut self,
        visible: bool,
    );
    fn set_success_visible(
        &mut self,
        visible: bool,
    );
    fn set_submit_control(
        &mut self,
        busy: bool,
        label: &str,
    );
    fn set_print_mode(
        &mut self,
        enabled: bool,
    );
    fn show_notice(
        &mut self,
        message: &str,
    );

    /// Drains the notices shown since the last call. Surfaces that display
    /// notices on their own have nothing to hand back.
    fn take_notices(&mut self) -> Vec<String> {
        Vec::new()
    }
}
