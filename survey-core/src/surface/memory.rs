use std::fmt;

use tracing::warn;

use super::FormSurface;
use crate::models::{FieldSpec, FieldValue, SectionCompletionState};

#[derive(Debug, Clone)]
struct FieldSlot {
    spec: FieldSpec,
    value: FieldValue,
    error: Option<String>,
    calculated: bool,
}

/// A complete [`FormSurface`] held in memory.
///
/// Besides backing the terminal front-end, it records every presentation
/// side effect so callers can inspect what a page would show.
#[derive(Debug, Clone)]
pub struct MemorySurface {
    slots: Vec<FieldSlot>,
    sections: Vec<(String, SectionCompletionState)>,
    pub focused: Option<String>,
    pub scrolled_to: Option<String>,
    pub scrolled_to_top: bool,
    pub form_visible: bool,
    pub success_visible: bool,
    pub submit_busy: bool,
    pub submit_label: String,
    pub print_mode: bool,
    /// Every print-mode switch, oldest first.
    pub print_mode_history: Vec<bool>,
    pub notices: Vec<String>,
}

impl MemorySurface {
    /// Builds a surface from field declarations in document order.
    ///
    /// Sections are collected in order of first appearance.
    pub fn new(fields: Vec<FieldSpec>) -> Self {
        let mut sections: Vec<(String, SectionCompletionState)> = Vec::new();
        for section in fields.iter().filter_map(|spec| spec.section.as_ref()) {
            if !sections.iter().any(|(name, _)| name == section) {
                sections.push((section.clone(), SectionCompletionState::Empty));
            }
        }

        let slots = fields
            .into_iter()
            .map(|spec| FieldSlot {
                value: FieldValue::empty_for(spec.kind),
                spec,
                error: None,
                calculated: false,
            })
            .collect();

        Self {
            slots,
            sections,
            focused: None,
            scrolled_to: None,
            scrolled_to_top: false,
            form_visible: true,
            success_visible: false,
            submit_busy: false,
            submit_label: String::new(),
            print_mode: false,
            print_mode_history: Vec::new(),
            notices: Vec::new(),
        }
    }

    /// Adds a section that has no fields of its own.
    pub fn with_section(
        mut self,
        section: impl Into<String>,
    ) -> Self {
        let section = section.into();
        if !self.sections.iter().any(|(name, _)| *name == section) {
            self.sections.push((section, SectionCompletionState::Empty));
        }
        self
    }

    /// Last state applied to `section`.
    pub fn section_state(
        &self,
        section: &str,
    ) -> Option<SectionCompletionState> {
        self.sections
            .iter()
            .find(|(name, _)| name == section)
            .map(|(_, state)| *state)
    }

    pub fn is_calculated(
        &self,
        id: &str,
    ) -> bool {
        self.slot(id).is_some_and(|slot| slot.calculated)
    }

    /// Ids of every field currently flagged invalid, in document order.
    pub fn invalid_fields(&self) -> Vec<&str> {
        self.slots
            .iter()
            .filter(|slot| slot.error.is_some())
            .map(|slot| slot.spec.id.as_str())
            .collect()
    }

    fn slot(
        &self,
        id: &str,
    ) -> Option<&FieldSlot> {
        self.slots.iter().find(|slot| slot.spec.id == id)
    }

    fn slot_mut(
        &mut self,
        id: &str,
    ) -> Option<&mut FieldSlot> {
        let slot = self.slots.iter_mut().find(|slot| slot.spec.id == id);
        if slot.is_none() {
            warn!(field = id, "unknown field on memory surface");
        }
        slot
    }
}

impl FormSurface for MemorySurface {
    fn fields(&self) -> Vec<FieldSpec> {
        self.slots.iter().map(|slot| slot.spec.clone()).collect()
    }

    fn sections(&self) -> Vec<String> {
        self.sections.iter().map(|(name, _)| name.clone()).collect()
    }

    fn field(
        &self,
        id: &str,
    ) -> Option<FieldSpec> {
        self.slot(id).map(|slot| slot.spec.clone())
    }

    fn value(
        &self,
        id: &str,
    ) -> Option<FieldValue> {
        self.slot(id).map(|slot| slot.value.clone())
    }

    fn set_value(
        &mut self,
        id: &str,
        value: FieldValue,
    ) {
        if let Some(slot) = self.slot_mut(id) {
            // A checkbox only ever holds a checked state.
            slot.value = match (slot.spec.kind.is_checkbox(), value) {
                (true, FieldValue::Text(text)) => FieldValue::Checkbox(text == "on"),
                (false, FieldValue::Checkbox(checked)) => {
                    FieldValue::Text(if checked { "on".to_string() } else { String::new() })
                }
                (_, value) => value,
            };
        }
    }

    fn error(
        &self,
        id: &str,
    ) -> Option<String> {
        self.slot(id).and_then(|slot| slot.error.clone())
    }

    fn set_error(
        &mut self,
        id: &str,
        message: &str,
    ) {
        if let Some(slot) = self.slot_mut(id) {
            slot.error = Some(message.to_string());
        }
    }

    fn clear_error(
        &mut self,
        id: &str,
    ) {
        if let Some(slot) = self.slot_mut(id) {
            slot.error = None;
        }
    }

    fn set_calculated(
        &mut self,
        id: &str,
        calculated: bool,
    ) {
        if let Some(slot) = self.slot_mut(id) {
            slot.calculated = calculated;
        }
    }

    fn set_section_state(
        &mut self,
        section: &str,
        state: SectionCompletionState,
    ) {
        match self.sections.iter_mut().find(|(name, _)| name == section) {
            Some((_, current)) => *current = state,
            None => warn!(section, "unknown section on memory surface"),
        }
    }

    fn focus(
        &mut self,
        id: &str,
    ) {
        self.focused = Some(id.to_string());
    }

    fn scroll_into_view(
        &mut self,
        id: &str,
    ) {
        self.scrolled_to = Some(id.to_string());
        self.scrolled_to_top = false;
    }

    fn scroll_to_top(&mut self) {
        self.scrolled_to = None;
        self.scrolled_to_top = true;
    }

    fn form_visible(&self) -> bool {
        self.form_visible
    }

    fn set_form_visible(
        &mut self,
        visible: bool,
    ) {
        self.form_visible = visible;
    }

    fn set_success_visible(
        &mut self,
        visible: bool,
    ) {
        self.success_visible = visible;
    }

    fn set_submit_control(
        &mut self,
        busy: bool,
        label: &str,
    ) {
        self.submit_busy = busy;
        self.submit_label = label.to_string();
    }

    fn set_print_mode(
        &mut self,
        enabled: bool,
    ) {
        self.print_mode = enabled;
        self.print_mode_history.push(enabled);
    }

    fn show_notice(
        &mut self,
        message: &str,
    ) {
        self.notices.push(message.to_string());
    }

    fn take_notices(&mut self) -> Vec<String> {
        std::mem::take(&mut self.notices)
    }
}

impl fmt::Display for MemorySurface {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let mut current_section: Option<&str> = None;
        for slot in &self.slots {
            let section = slot.spec.section.as_deref();
            if section != current_section {
                if let Some(name) = section {
                    let state = self.section_state(name).unwrap_or_default();
                    writeln!(f, "[{name}] {state:?}")?;
                }
                current_section = section;
            }

            let marker = if slot.spec.required { "*" } else { " " };
            let value = match &slot.value {
                FieldValue::Text(text) => text.clone(),
                FieldValue::Checkbox(checked) => (if *checked { "[x]" } else { "[ ]" }).to_string(),
            };
            write!(f, "  {marker} {:<24} {value}", slot.spec.id)?;
            if slot.calculated {
                write!(f, "  (calculated)")?;
            }
            if let Some(error) = &slot.error {
                write!(f, "  ! {error}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
