//! The form controller: event dispatch, validation annotation, derived
//! values, section feedback and the submit/clear/print/new-report lifecycle.
//!
//! # Lifecycle
//!
//! ```text
//! Editing --submit, valid----> Submitting --transport ok-----> Submitted
//! Editing --submit, invalid--> Editing       (first invalid field focused)
//! Submitting --transport err-> Editing
//! Submitted --new report-----> Editing       (form reset)
//! Editing --clear, confirmed-> Editing       (form reset)
//! ```
//!
//! Submission is split in two so a host can keep delivering events while the
//! transport runs: [`FormController::begin_submit`] validates and hands back
//! the report, [`FormController::finish_submit`] applies the transport's
//! answer. [`FormController::submit`] does both in one call.

mod events;

pub use events::{EventOutcome, FormEvent, KeyChord, SubmitOutcome, SubmitStart};

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::calculations::{NetClaim, net_claim_from_inputs};
use crate::completion::{clear_section_states, recompute_section_states};
use crate::models::{FieldValue, SectionCompletionState, SubmissionState, field_ids};
use crate::platform::{Clock, ConfirmPrompt, PrintService};
use crate::session::{AutosaveSnapshot, AutosaveTrigger, SessionState};
use crate::surface::FormSurface;
use crate::transport::{SubmissionReceipt, SubmissionTransport, TransportError};
use crate::validation::{self, FieldError, ValidationError};

pub const CLEAR_CONFIRMATION: &str =
    "Are you sure you want to clear all form data? This action cannot be undone.";
pub const UNSAVED_CHANGES_WARNING: &str =
    "You have unsaved changes. Are you sure you want to leave?";

#[derive(Debug, Error)]
pub enum ControllerError {
    #[error("report is {0}; submit is only possible while editing")]
    NotEditing(SubmissionState),

    #[error("no submission in flight (report is {0})")]
    NotSubmitting(SubmissionState),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Tunables for the controller and its host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerConfig {
    /// How often the host should fire [`FormEvent::AutosaveTick`].
    pub autosave_interval: Duration,
    /// Resting label of the submit control.
    pub submit_label: String,
    /// Label shown while the report is submitting.
    pub submitting_label: String,
    /// Notice shown after a manual save.
    pub saved_notice: String,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            autosave_interval: Duration::from_secs(30),
            submit_label: "Submit Report".to_string(),
            submitting_label: "Submitting...".to_string(),
            saved_notice: "Form saved".to_string(),
        }
    }
}

/// Host services handed to the controller.
pub struct ControllerServices {
    pub clock: Box<dyn Clock>,
    pub prompt: Box<dyn ConfirmPrompt>,
    pub printer: Box<dyn PrintService>,
    pub transport: Arc<dyn SubmissionTransport>,
}

pub struct FormController<S: FormSurface> {
    surface: S,
    session: SessionState,
    config: ControllerConfig,
    clock: Box<dyn Clock>,
    prompt: Box<dyn ConfirmPrompt>,
    printer: Box<dyn PrintService>,
    transport: Arc<dyn SubmissionTransport>,
}

impl<S: FormSurface> FormController<S> {
    /// Takes over `surface`, seeds the default dates and evaluates the
    /// section states once.
    pub fn new(
        surface: S,
        services: ControllerServices,
        config: ControllerConfig,
    ) -> Self {
        let mut controller = Self {
            surface,
            session: SessionState::new(),
            config,
            clock: services.clock,
            prompt: services.prompt,
            printer: services.printer,
            transport: services.transport,
        };

        controller.seed_default_dates();
        let label = controller.config.submit_label.clone();
        controller.surface.set_submit_control(false, &label);
        controller.recompute_sections();

        info!("Insurance survey report form initialized");
        controller
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn state(&self) -> SubmissionState {
        self.session.submission()
    }

    /// Transport used for submissions, for hosts that drive
    /// [`Self::begin_submit`] / [`Self::finish_submit`] themselves.
    pub fn transport(&self) -> Arc<dyn SubmissionTransport> {
        Arc::clone(&self.transport)
    }

    /// Notices shown since the last call, for hosts that render them.
    pub fn take_notices(&mut self) -> Vec<String> {
        self.surface.take_notices()
    }

    /// Releases the surface.
    pub fn into_surface(self) -> S {
        self.surface
    }

    // ─── dispatch ───────────────────────────────────────────────────────────

    /// Routes one event to its handlers.
    pub fn dispatch(
        &mut self,
        event: FormEvent,
    ) -> EventOutcome {
        debug!(?event, state = %self.state(), "dispatching form event");
        match event {
            FormEvent::Input(field) => self.on_input(&field),
            FormEvent::Change(field) => self.on_change(&field),
            FormEvent::Blur(field) => self.on_blur(&field),
            FormEvent::Submit => match self.begin_submit() {
                Ok(SubmitStart::Started(report)) => EventOutcome::SubmissionStarted(report),
                Ok(SubmitStart::Invalid(errors)) => EventOutcome::Invalid(errors),
                Err(_) => EventOutcome::Ignored,
            },
            FormEvent::Clear => handled_if(self.clear()),
            FormEvent::Print => {
                self.print();
                EventOutcome::Handled
            }
            FormEvent::NewReport => handled_if(self.new_report()),
            FormEvent::RestoreSnapshot => handled_if(self.restore_snapshot()),
            FormEvent::AutosaveTick => {
                self.capture_snapshot(AutosaveTrigger::Interval);
                EventOutcome::Handled
            }
            FormEvent::VisibilityHidden => {
                self.capture_snapshot(AutosaveTrigger::VisibilityHidden);
                EventOutcome::Handled
            }
            FormEvent::Key(chord) => {
                if self.handle_key(chord) {
                    EventOutcome::DefaultPrevented
                } else {
                    EventOutcome::Ignored
                }
            }
        }
    }

    /// Writes `value` into a field the way a user edit would, firing the
    /// input and change handlers.
    pub fn edit(
        &mut self,
        field: &str,
        value: impl Into<FieldValue>,
    ) -> EventOutcome {
        match self.surface.field(field) {
            None => {
                warn!(field, "edit of unknown field ignored");
                return EventOutcome::Ignored;
            }
            Some(spec) if spec.readonly => {
                warn!(field, "edit of read-only field ignored");
                return EventOutcome::Ignored;
            }
            Some(_) => {}
        }
        self.surface.set_value(field, value.into());
        self.on_input(field);
        self.on_change(field)
    }

    fn on_input(
        &mut self,
        field: &str,
    ) -> EventOutcome {
        let Some(spec) = self.surface.field(field) else {
            warn!(field, "input on unknown field ignored");
            return EventOutcome::Ignored;
        };
        if spec.readonly {
            warn!(field, "input on read-only field ignored");
            return EventOutcome::Ignored;
        }

        if spec.required {
            self.surface.clear_error(field);
        }
        if field_ids::NET_CLAIM_SOURCES.contains(&field) {
            self.recompute_net_claim();
        }
        self.recompute_sections();
        EventOutcome::Handled
    }

    fn on_change(
        &mut self,
        _field: &str,
    ) -> EventOutcome {
        self.recompute_sections();
        EventOutcome::Handled
    }

    fn on_blur(
        &mut self,
        field: &str,
    ) -> EventOutcome {
        match self.surface.field(field) {
            Some(spec) if spec.required => {
                // The annotation is the outcome; the error is already on the surface.
                let _ = self.validate_field(field);
                EventOutcome::Handled
            }
            Some(_) => EventOutcome::Ignored,
            None => {
                warn!(field, "blur on unknown field ignored");
                EventOutcome::Ignored
            }
        }
    }

    // ─── validation ─────────────────────────────────────────────────────────

    /// Runs the per-field rules on one field and annotates the result.
    pub fn validate_field(
        &mut self,
        field: &str,
    ) -> Result<(), ValidationError> {
        let Some(spec) = self.surface.field(field) else {
            warn!(field, "validation of unknown field skipped");
            return Ok(());
        };
        let value = self
            .surface
            .value(field)
            .unwrap_or_else(|| FieldValue::empty_for(spec.kind));

        self.surface.clear_error(field);
        let result = validation::validate_field(&spec, &value, self.clock.today());
        if let Err(error) = result {
            debug!(field, %error, "field invalid");
            self.surface.set_error(field, &error.to_string());
        }
        result
    }

    /// Validates the whole form, annotating every failing field.
    pub fn validate_form(&mut self) -> bool {
        self.validate_form_report().is_empty()
    }

    /// Like [`Self::validate_form`] but hands back the failures.
    pub fn validate_form_report(&mut self) -> Vec<FieldError> {
        self.clear_all_errors();

        let errors = validation::validate_form(&self.surface, self.clock.today());
        for failure in &errors {
            self.surface
                .set_error(&failure.field_id, &failure.error.to_string());
        }
        errors
    }

    fn clear_all_errors(&mut self) {
        for spec in self.surface.fields() {
            self.surface.clear_error(&spec.id);
        }
    }

    /// First field flagged invalid, in document order.
    fn first_invalid_field(&self) -> Option<String> {
        self.surface
            .fields()
            .into_iter()
            .map(|spec| spec.id)
            .find(|id| self.surface.error(id).is_some())
    }

    // ─── derived values ─────────────────────────────────────────────────────

    /// Recomputes the net claim amount and writes it to its field.
    pub fn recompute_net_claim(&mut self) -> NetClaim {
        let claim = net_claim_from_inputs(
            &self.surface.text(field_ids::ESTIMATED_REPAIR_COST),
            &self.surface.text(field_ids::REPLACEMENT_COST),
            &self.surface.text(field_ids::DEPRECIATION),
        );

        self.surface
            .set_value(field_ids::NET_CLAIM_AMOUNT, FieldValue::Text(claim.display()));
        self.surface
            .set_calculated(field_ids::NET_CLAIM_AMOUNT, claim.is_positive());

        debug!(%claim, base = %claim.base, "net claim recomputed");
        claim
    }

    /// Recomputes and applies every section's completion state.
    pub fn recompute_sections(&mut self) -> Vec<(String, SectionCompletionState)> {
        recompute_section_states(&mut self.surface)
    }

    // ─── submission ─────────────────────────────────────────────────────────

    /// Validates the form and, if it passes, moves to `Submitting` and
    /// returns the report to send.
    ///
    /// An invalid form stays in `Editing`; the first invalid field is
    /// scrolled into view and focused.
    pub fn begin_submit(&mut self) -> Result<SubmitStart, ControllerError> {
        let state = self.state();
        if state != SubmissionState::Editing {
            warn!(%state, "submit ignored");
            return Err(ControllerError::NotEditing(state));
        }

        let errors = self.validate_form_report();
        if !errors.is_empty() {
            if let Some(field) = self.first_invalid_field() {
                self.surface.scroll_into_view(&field);
                self.surface.focus(&field);
            }
            info!(failures = errors.len(), "submit blocked by validation");
            return Ok(SubmitStart::Invalid(errors));
        }

        self.session.set_submission(SubmissionState::Submitting);
        let label = self.config.submitting_label.clone();
        self.surface.set_submit_control(true, &label);

        let report = AutosaveSnapshot::capture(&self.surface);
        info!(fields = report.len(), "submitting report");
        Ok(SubmitStart::Started(report))
    }

    /// Applies the transport's answer to an in-flight submission.
    ///
    /// On success the form is hidden and the acknowledgement shown; on
    /// failure the report returns to `Editing` with its data intact.
    pub fn finish_submit(
        &mut self,
        result: Result<SubmissionReceipt, TransportError>,
    ) -> Result<SubmissionReceipt, ControllerError> {
        let state = self.state();
        if state != SubmissionState::Submitting {
            warn!(%state, "submission result arrived with nothing in flight");
            return Err(ControllerError::NotSubmitting(state));
        }

        let label = self.config.submit_label.clone();
        self.surface.set_submit_control(false, &label);

        match result {
            Ok(receipt) => {
                self.surface.set_form_visible(false);
                self.surface.set_success_visible(true);
                self.surface.scroll_to_top();
                self.session.set_submission(SubmissionState::Submitted);
                info!(fields = receipt.field_count, "report submitted");
                Ok(receipt)
            }
            Err(error) => {
                self.session.set_submission(SubmissionState::Editing);
                warn!(%error, "submission failed; back to editing");
                Err(error.into())
            }
        }
    }

    /// Validates, sends the report through the transport and applies the
    /// result.
    pub async fn submit(&mut self) -> Result<SubmitOutcome, ControllerError> {
        let report = match self.begin_submit()? {
            SubmitStart::Invalid(errors) => return Ok(SubmitOutcome::Invalid(errors)),
            SubmitStart::Started(report) => report,
        };

        let transport = self.transport();
        let result = transport.submit(&report).await;
        self.finish_submit(result).map(SubmitOutcome::Submitted)
    }

    // ─── clear / new report / print ─────────────────────────────────────────

    /// Asks for confirmation, then wipes the form.
    ///
    /// Returns `true` when the form was cleared.
    pub fn clear(&mut self) -> bool {
        let state = self.state();
        if state != SubmissionState::Editing {
            warn!(%state, "clear ignored");
            return false;
        }
        if !self.prompt.confirm(CLEAR_CONFIRMATION) {
            info!("clear declined");
            return false;
        }

        self.reset_form();
        self.focus_first_field();
        info!("form cleared");
        true
    }

    /// Starts a fresh report after a successful submission.
    pub fn new_report(&mut self) -> bool {
        let state = self.state();
        if state != SubmissionState::Submitted {
            warn!(%state, "new report ignored");
            return false;
        }

        self.surface.set_success_visible(false);
        self.surface.set_form_visible(true);
        self.reset_form();
        self.focus_first_field();
        self.session.set_submission(SubmissionState::Editing);
        info!("new report started");
        true
    }

    /// Prints the page in print presentation mode.
    pub fn print(&mut self) {
        self.surface.set_print_mode(true);
        self.printer.print();
        self.surface.set_print_mode(false);
        debug!("print requested");
    }

    fn reset_form(&mut self) {
        for spec in self.surface.fields() {
            self.surface.set_value(&spec.id, FieldValue::empty_for(spec.kind));
            self.surface.clear_error(&spec.id);
        }
        self.surface
            .set_calculated(field_ids::NET_CLAIM_AMOUNT, false);
        clear_section_states(&mut self.surface);
        self.seed_default_dates();
    }

    fn focus_first_field(&mut self) {
        if let Some(spec) = self.surface.fields().into_iter().next() {
            self.surface.focus(&spec.id);
        }
    }

    /// Fills the survey and report dates with today's date where empty.
    pub fn seed_default_dates(&mut self) {
        let today = self.clock.today().format("%Y-%m-%d").to_string();
        for field in field_ids::DEFAULT_DATED {
            let filled = self
                .surface
                .value(field)
                .is_some_and(|value| value.is_filled());
            if !filled && self.surface.field(field).is_some() {
                self.surface.set_value(field, FieldValue::Text(today.clone()));
            }
        }
    }

    // ─── autosave ───────────────────────────────────────────────────────────

    /// Replaces the held snapshot with the current field values.
    pub fn capture_snapshot(
        &mut self,
        trigger: AutosaveTrigger,
    ) -> &AutosaveSnapshot {
        self.session.capture(&self.surface, trigger)
    }

    /// Writes the held snapshot back and recomputes everything derived from
    /// it. Returns `false` when nothing has been captured.
    pub fn restore_snapshot(&mut self) -> bool {
        if !self.session.restore(&mut self.surface) {
            debug!("no snapshot to restore");
            return false;
        }
        self.recompute_net_claim();
        self.recompute_sections();
        true
    }

    // ─── shortcuts and unload guard ─────────────────────────────────────────

    /// Handles the save and print shortcuts. Returns `true` when the
    /// platform's default handling must be suppressed.
    pub fn handle_key(
        &mut self,
        chord: KeyChord,
    ) -> bool {
        if chord.is_command('s') {
            self.capture_snapshot(AutosaveTrigger::Manual);
            let notice = self.config.saved_notice.clone();
            self.surface.show_notice(&notice);
            true
        } else if chord.is_command('p') {
            self.print();
            true
        } else {
            false
        }
    }

    /// Warning to show before the page is left, if any.
    ///
    /// Only warns while the form is visible and holds some data.
    pub fn before_unload(&self) -> Option<&'static str> {
        let has_data = AutosaveSnapshot::capture(&self.surface).has_data();
        (has_data && self.surface.form_visible()).then_some(UNSAVED_CHANGES_WARNING)
    }
}

fn handled_if(done: bool) -> EventOutcome {
    if done {
        EventOutcome::Handled
    } else {
        EventOutcome::Ignored
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::models::{FieldKind, FieldSpec};
    use crate::platform::{FixedClock, RecordingPrinter, ScriptedPrompt};
    use crate::surface::MemorySurface;
    use crate::transport::SimulatedTransport;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 15).unwrap()
    }

    fn surface() -> MemorySurface {
        MemorySurface::new(vec![
            FieldSpec::new("policyNumber", FieldKind::Text).required().in_section("policy"),
            FieldSpec::new("email", FieldKind::Email).required().in_section("policy"),
            FieldSpec::new(field_ids::ESTIMATED_REPAIR_COST, FieldKind::Number).in_section("claim"),
            FieldSpec::new(field_ids::REPLACEMENT_COST, FieldKind::Number).in_section("claim"),
            FieldSpec::new(field_ids::DEPRECIATION, FieldKind::Number).in_section("claim"),
            FieldSpec::new(field_ids::NET_CLAIM_AMOUNT, FieldKind::Number)
                .readonly()
                .in_section("claim"),
            FieldSpec::new(field_ids::DATE_OF_REPORT, FieldKind::Date).in_section("claim"),
        ])
    }

    fn controller(prompt: ScriptedPrompt) -> FormController<MemorySurface> {
        FormController::new(
            surface(),
            ControllerServices {
                clock: Box::new(FixedClock(today())),
                prompt: Box::new(prompt),
                printer: Box::new(RecordingPrinter::new()),
                transport: Arc::new(SimulatedTransport::immediate()),
            },
            ControllerConfig::default(),
        )
    }

    #[test]
    fn new_seeds_dates_and_resting_label() {
        let controller = controller(ScriptedPrompt::new());

        assert_eq!(controller.surface().text(field_ids::DATE_OF_REPORT), "2025-06-15");
        assert_eq!(controller.surface().submit_label, "Submit Report");
        assert_eq!(controller.state(), SubmissionState::Editing);
    }

    #[test]
    fn input_on_source_field_recomputes_net_claim() {
        let mut controller = controller(ScriptedPrompt::new());

        controller.edit(field_ids::ESTIMATED_REPAIR_COST, "1000");
        controller.edit(field_ids::REPLACEMENT_COST, "1200");
        controller.edit(field_ids::DEPRECIATION, "200");

        assert_eq!(controller.surface().text(field_ids::NET_CLAIM_AMOUNT), "800.00");
        assert!(controller.surface().is_calculated(field_ids::NET_CLAIM_AMOUNT));
    }

    #[test]
    fn calculated_flag_drops_when_claim_reaches_zero() {
        let mut controller = controller(ScriptedPrompt::new());
        controller.edit(field_ids::ESTIMATED_REPAIR_COST, "100");

        controller.edit(field_ids::DEPRECIATION, "150");

        assert_eq!(controller.surface().text(field_ids::NET_CLAIM_AMOUNT), "0.00");
        assert!(!controller.surface().is_calculated(field_ids::NET_CLAIM_AMOUNT));
    }

    #[test]
    fn blur_annotates_and_input_clears() {
        let mut controller = controller(ScriptedPrompt::new());
        controller.edit("email", "a@b");

        controller.dispatch(FormEvent::Blur("email".into()));
        assert_eq!(
            controller.surface().error("email").as_deref(),
            Some("Please enter a valid email address.")
        );

        controller.edit("email", "a@b.com");
        assert_eq!(controller.surface().error("email"), None);
    }

    #[test]
    fn blur_on_optional_field_is_ignored() {
        let mut controller = controller(ScriptedPrompt::new());

        let outcome = controller.dispatch(FormEvent::Blur(field_ids::DEPRECIATION.into()));

        assert_eq!(outcome, EventOutcome::Ignored);
    }

    #[test]
    fn sections_follow_edits() {
        let mut controller = controller(ScriptedPrompt::new());

        controller.edit("policyNumber", "ABC123");
        assert_eq!(
            controller.surface().section_state("policy"),
            Some(SectionCompletionState::Partial)
        );

        controller.edit("email", "a@b.com");
        assert_eq!(
            controller.surface().section_state("policy"),
            Some(SectionCompletionState::Complete)
        );
    }

    #[test]
    fn declined_clear_keeps_data() {
        let mut controller = controller(ScriptedPrompt::answering(false));
        controller.edit("policyNumber", "ABC123");

        assert!(!controller.clear());
        assert_eq!(controller.surface().text("policyNumber"), "ABC123");
    }

    #[test]
    fn new_report_outside_submitted_is_ignored() {
        let mut controller = controller(ScriptedPrompt::new());

        assert_eq!(controller.dispatch(FormEvent::NewReport), EventOutcome::Ignored);
    }

    #[test]
    fn finish_without_begin_is_rejected() {
        let mut controller = controller(ScriptedPrompt::new());

        let result = controller.finish_submit(Ok(SubmissionReceipt { field_count: 0 }));

        assert!(matches!(result, Err(ControllerError::NotSubmitting(SubmissionState::Editing))));
    }

    #[test]
    fn save_shortcut_captures_and_notifies() {
        let mut controller = controller(ScriptedPrompt::new());
        controller.edit("policyNumber", "ABC123");

        let outcome = controller.dispatch(FormEvent::Key(KeyChord::ctrl('s')));

        assert_eq!(outcome, EventOutcome::DefaultPrevented);
        assert_eq!(controller.surface().notices, vec!["Form saved"]);
        assert_eq!(
            controller.session().snapshot().and_then(|s| s.get("policyNumber")),
            Some("ABC123")
        );
    }

    #[test]
    fn unrelated_key_is_ignored() {
        let mut controller = controller(ScriptedPrompt::new());

        assert_eq!(controller.dispatch(FormEvent::Key(KeyChord::ctrl('z'))), EventOutcome::Ignored);
        assert!(controller.session().snapshot().is_none());
    }

    #[test]
    fn edit_of_readonly_field_is_ignored() {
        let mut controller = controller(ScriptedPrompt::new());
        controller.edit(field_ids::ESTIMATED_REPAIR_COST, "1000");

        let outcome = controller.edit(field_ids::NET_CLAIM_AMOUNT, "999999");

        assert_eq!(outcome, EventOutcome::Ignored);
        assert_eq!(controller.surface().text(field_ids::NET_CLAIM_AMOUNT), "1000.00");
    }

    #[test]
    fn input_event_on_readonly_field_is_ignored() {
        let mut controller = controller(ScriptedPrompt::new());

        let outcome = controller.dispatch(FormEvent::Input(field_ids::NET_CLAIM_AMOUNT.into()));

        assert_eq!(outcome, EventOutcome::Ignored);
    }

    #[test]
    fn taken_notices_are_not_handed_back_twice() {
        let mut controller = controller(ScriptedPrompt::new());
        controller.dispatch(FormEvent::Key(KeyChord::ctrl('s')));

        assert_eq!(controller.take_notices(), vec!["Form saved"]);
        assert!(controller.take_notices().is_empty());
        assert!(controller.surface().notices.is_empty());
    }

    #[test]
    fn edit_of_unknown_field_is_ignored() {
        let mut controller = controller(ScriptedPrompt::new());

        assert_eq!(controller.edit("nope", "x"), EventOutcome::Ignored);
    }
}
