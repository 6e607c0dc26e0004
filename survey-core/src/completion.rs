//! Section completion tracking.
//!
//! Each section's state is derived from scratch on every call; nothing is
//! carried over from the previous evaluation.

use tracing::debug;

use crate::models::SectionCompletionState;
use crate::surface::FormSurface;

/// Counts `(filled, total)` required fields in `section`.
pub fn count_required<S: FormSurface + ?Sized>(
    surface: &S,
    section: &str,
) -> (usize, usize) {
    surface
        .fields()
        .iter()
        .filter(|spec| spec.required && spec.section.as_deref() == Some(section))
        .fold((0, 0), |(filled, total), spec| {
            let is_filled = surface
                .value(&spec.id)
                .is_some_and(|value| value.is_filled());
            (filled + usize::from(is_filled), total + 1)
        })
}

/// Recomputes and applies the state of every section.
pub fn recompute_section_states<S: FormSurface + ?Sized>(
    surface: &mut S,
) -> Vec<(String, SectionCompletionState)> {
    let states: Vec<(String, SectionCompletionState)> = surface
        .sections()
        .into_iter()
        .map(|section| {
            let (filled, total) = count_required(&*surface, &section);
            let state = SectionCompletionState::from_counts(filled, total);
            (section, state)
        })
        .collect();

    for (section, state) in &states {
        surface.set_section_state(section, *state);
    }

    debug!(?states, "section states recomputed");
    states
}

/// Puts every section back to [`SectionCompletionState::Empty`].
pub fn clear_section_states<S: FormSurface + ?Sized>(surface: &mut S) {
    for section in surface.sections() {
        surface.set_section_state(&section, SectionCompletionState::Empty);
    }
}
