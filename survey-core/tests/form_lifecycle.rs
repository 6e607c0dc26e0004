//! End-to-end behaviour of the form controller against an in-memory surface.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use survey_core::platform::{FixedClock, RecordingPrinter, ScriptedPrompt};
use survey_core::{
    AutosaveSnapshot, ControllerConfig, ControllerError, ControllerServices, EventOutcome,
    FieldKind, FieldSpec, FieldValue, FormController, FormEvent, FormSurface, KeyChord,
    MemorySurface, SectionCompletionState, SimulatedTransport, SubmissionReceipt,
    SubmissionState, SubmissionTransport, SubmitOutcome, TransportError, ValidationError,
    field_ids,
};

const TODAY: &str = "2025-06-15";

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 15).unwrap()
}

fn survey_form() -> MemorySurface {
    MemorySurface::new(vec![
        // policy
        FieldSpec::new("policyNumber", FieldKind::Text).required().in_section("policy"),
        FieldSpec::new("insuredName", FieldKind::Text).required().in_section("policy"),
        FieldSpec::new("insuredEmail", FieldKind::Email).required().in_section("policy"),
        FieldSpec::new("insuredPhone", FieldKind::Tel).in_section("policy"),
        // incident
        FieldSpec::new(field_ids::DATE_OF_INCIDENT, FieldKind::Date)
            .required()
            .in_section("incident"),
        FieldSpec::new(field_ids::DATE_OF_SURVEY, FieldKind::Date)
            .required()
            .in_section("incident"),
        FieldSpec::new(field_ids::SURVEY_DATE, FieldKind::Date).in_section("incident"),
        // assessment
        FieldSpec::new(field_ids::ESTIMATED_REPAIR_COST, FieldKind::Number)
            .in_section("assessment"),
        FieldSpec::new(field_ids::REPLACEMENT_COST, FieldKind::Number).in_section("assessment"),
        FieldSpec::new(field_ids::DEPRECIATION, FieldKind::Number).in_section("assessment"),
        FieldSpec::new(field_ids::NET_CLAIM_AMOUNT, FieldKind::Number)
            .readonly()
            .in_section("assessment"),
        // declaration
        FieldSpec::new(field_ids::DATE_OF_REPORT, FieldKind::Date)
            .required()
            .in_section("declaration"),
        FieldSpec::new("declarationAccepted", FieldKind::Checkbox)
            .required()
            .in_section("declaration"),
    ])
}

struct Harness {
    controller: FormController<MemorySurface>,
    prompt: ScriptedPrompt,
    printer: RecordingPrinter,
}

fn harness_with(transport: Arc<dyn SubmissionTransport>) -> Harness {
    let prompt = ScriptedPrompt::new();
    let printer = RecordingPrinter::new();
    let controller = FormController::new(
        survey_form(),
        ControllerServices {
            clock: Box::new(FixedClock(today())),
            prompt: Box::new(prompt.clone()),
            printer: Box::new(printer.clone()),
            transport,
        },
        ControllerConfig::default(),
    );

    Harness {
        controller,
        prompt,
        printer,
    }
}

fn harness() -> Harness {
    harness_with(Arc::new(SimulatedTransport::immediate()))
}

fn fill_valid(controller: &mut FormController<MemorySurface>) {
    controller.edit("policyNumber", "POL-001");
    controller.edit("insuredName", "Jordan Lee");
    controller.edit("insuredEmail", "jordan@example.com");
    controller.edit(field_ids::DATE_OF_INCIDENT, "2025-06-01");
    controller.edit("declarationAccepted", true);
}

struct FailingTransport;

#[async_trait]
impl SubmissionTransport for FailingTransport {
    async fn submit(
        &self,
        _report: &AutosaveSnapshot,
    ) -> Result<SubmissionReceipt, TransportError> {
        Err(TransportError::Unavailable("offline".into()))
    }
}

// =========================================================================
// validation
// =========================================================================

#[test]
fn required_empty_field_reports_only_required_error() {
    let mut h = harness();

    let result = h.controller.validate_field("insuredEmail");

    assert_eq!(result, Err(ValidationError::RequiredFieldEmpty));
    assert_eq!(
        h.controller.surface().error("insuredEmail").as_deref(),
        Some("This field is required.")
    );
}

#[test]
fn incident_tomorrow_fails_today_passes() {
    let mut h = harness();

    h.controller.edit(field_ids::DATE_OF_INCIDENT, "2025-06-16");
    assert_eq!(
        h.controller.validate_field(field_ids::DATE_OF_INCIDENT),
        Err(ValidationError::FutureIncidentDate)
    );

    h.controller.edit(field_ids::DATE_OF_INCIDENT, TODAY);
    assert_eq!(h.controller.validate_field(field_ids::DATE_OF_INCIDENT), Ok(()));
    assert_eq!(h.controller.surface().error(field_ids::DATE_OF_INCIDENT), None);
}

#[test]
fn future_survey_date_is_never_flagged() {
    let mut h = harness();
    fill_valid(&mut h.controller);

    h.controller.edit(field_ids::DATE_OF_SURVEY, "2026-01-01");
    h.controller.edit(field_ids::SURVEY_DATE, "2026-01-01");

    assert!(h.controller.validate_form());
}

#[test]
fn survey_before_incident_invalidates_form() {
    let mut h = harness();
    fill_valid(&mut h.controller);
    h.controller.edit(field_ids::DATE_OF_INCIDENT, "2025-06-05");
    h.controller.edit(field_ids::DATE_OF_SURVEY, "2025-06-03");

    let errors = h.controller.validate_form_report();

    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].field_id, field_ids::DATE_OF_SURVEY);
    assert_eq!(errors[0].error, ValidationError::SurveyBeforeIncident);
    assert_eq!(
        h.controller.surface().error(field_ids::DATE_OF_SURVEY).as_deref(),
        Some("Survey date cannot be before incident date.")
    );
    assert!(!h.controller.validate_form());
}

#[test]
fn cross_field_failure_surfaces_alongside_field_failures() {
    let mut h = harness();
    h.controller.edit(field_ids::DATE_OF_INCIDENT, "2025-06-05");
    h.controller.edit(field_ids::DATE_OF_SURVEY, "2025-06-03");

    h.controller.validate_form();

    let invalid = h.controller.surface().invalid_fields();
    assert!(invalid.contains(&"policyNumber"));
    assert!(invalid.contains(&field_ids::DATE_OF_SURVEY));
}

#[test]
fn whole_form_validation_clears_stale_errors() {
    let mut h = harness();
    h.controller.validate_form();
    assert!(!h.controller.surface().invalid_fields().is_empty());

    fill_valid(&mut h.controller);

    assert!(h.controller.validate_form());
    assert!(h.controller.surface().invalid_fields().is_empty());
}

// =========================================================================
// derived value
// =========================================================================

#[test]
fn net_claim_tracks_every_source_edit() {
    let mut h = harness();

    h.controller.edit(field_ids::ESTIMATED_REPAIR_COST, "1000");
    assert_eq!(h.controller.surface().text(field_ids::NET_CLAIM_AMOUNT), "1000.00");

    h.controller.edit(field_ids::REPLACEMENT_COST, "1200");
    h.controller.edit(field_ids::DEPRECIATION, "200");
    assert_eq!(h.controller.surface().text(field_ids::NET_CLAIM_AMOUNT), "800.00");

    let again = h.controller.recompute_net_claim();
    assert_eq!(again.display(), "800.00");
}

// =========================================================================
// completion
// =========================================================================

#[test]
fn section_states_progress_with_required_fields() {
    let mut h = harness();
    let state = |h: &Harness| h.controller.surface().section_state("policy");

    assert_eq!(state(&h), Some(SectionCompletionState::Empty));

    h.controller.edit("policyNumber", "POL-001");
    h.controller.edit("insuredName", "Jordan Lee");
    assert_eq!(state(&h), Some(SectionCompletionState::Partial));

    h.controller.edit("insuredEmail", "jordan@example.com");
    assert_eq!(state(&h), Some(SectionCompletionState::Complete));
}

#[test]
fn section_without_required_fields_is_never_complete() {
    let mut h = harness();

    h.controller.edit(field_ids::ESTIMATED_REPAIR_COST, "1000");

    assert_eq!(
        h.controller.surface().section_state("assessment"),
        Some(SectionCompletionState::Empty)
    );
}

#[test]
fn seeded_dates_count_towards_completion_at_start() {
    let h = harness();

    // dateOfSurvey is seeded, dateOfIncident is not.
    assert_eq!(
        h.controller.surface().section_state("incident"),
        Some(SectionCompletionState::Partial)
    );
}

// =========================================================================
// clear and new report
// =========================================================================

#[test]
fn confirmed_clear_resets_everything() {
    let mut h = harness();
    fill_valid(&mut h.controller);
    h.controller.edit(field_ids::ESTIMATED_REPAIR_COST, "500");
    h.controller.edit(field_ids::DATE_OF_SURVEY, "2025-06-10");
    h.controller.edit("insuredPhone", "123");
    h.controller.validate_form();
    h.prompt.push(true);

    assert!(h.controller.clear());

    let surface = h.controller.surface();
    assert_eq!(surface.text("policyNumber"), "");
    assert_eq!(surface.value("declarationAccepted"), Some(FieldValue::Checkbox(false)));
    assert_eq!(surface.text(field_ids::NET_CLAIM_AMOUNT), "");
    assert!(!surface.is_calculated(field_ids::NET_CLAIM_AMOUNT));
    assert!(surface.invalid_fields().is_empty());
    for section in surface.sections() {
        assert_eq!(surface.section_state(&section), Some(SectionCompletionState::Empty));
    }
    for field in field_ids::DEFAULT_DATED {
        assert_eq!(surface.text(field), TODAY, "{field}");
    }
    assert_eq!(surface.focused.as_deref(), Some("policyNumber"));
    assert_eq!(h.prompt.asked().len(), 1);
}

#[test]
fn declined_clear_changes_nothing() {
    let mut h = harness();
    fill_valid(&mut h.controller);
    h.prompt.push(false);

    assert_eq!(h.controller.dispatch(FormEvent::Clear), EventOutcome::Ignored);
    assert_eq!(h.controller.surface().text("policyNumber"), "POL-001");
    assert_eq!(h.controller.state(), SubmissionState::Editing);
}

#[tokio::test]
async fn new_report_returns_to_a_fresh_form() {
    let mut h = harness();
    fill_valid(&mut h.controller);
    h.controller.submit().await.unwrap();

    assert_eq!(h.controller.dispatch(FormEvent::NewReport), EventOutcome::Handled);

    let surface = h.controller.surface();
    assert_eq!(h.controller.state(), SubmissionState::Editing);
    assert!(surface.form_visible);
    assert!(!surface.success_visible);
    assert_eq!(surface.text("policyNumber"), "");
    assert_eq!(surface.text(field_ids::DATE_OF_REPORT), TODAY);
    assert!(h.prompt.asked().is_empty());
}

// =========================================================================
// submission
// =========================================================================

#[tokio::test]
async fn invalid_submit_focuses_first_invalid_field() {
    let mut h = harness();
    h.controller.edit("policyNumber", "POL-001");

    let outcome = h.controller.submit().await.unwrap();

    assert!(matches!(outcome, SubmitOutcome::Invalid(ref errors) if !errors.is_empty()));
    assert_eq!(h.controller.state(), SubmissionState::Editing);
    let surface = h.controller.surface();
    assert_eq!(surface.focused.as_deref(), Some("insuredName"));
    assert_eq!(surface.scrolled_to.as_deref(), Some("insuredName"));
    assert!(surface.form_visible);
}

#[tokio::test]
async fn valid_submit_hides_form_and_shows_success() {
    let mut h = harness();
    fill_valid(&mut h.controller);

    let outcome = h.controller.submit().await.unwrap();

    assert!(matches!(outcome, SubmitOutcome::Submitted(_)));
    assert_eq!(h.controller.state(), SubmissionState::Submitted);
    let surface = h.controller.surface();
    assert!(!surface.form_visible);
    assert!(surface.success_visible);
    assert!(!surface.submit_busy);
    assert_eq!(surface.submit_label, "Submit Report");
    assert!(surface.scrolled_to_top);
}

#[test]
fn begin_submit_marks_control_busy_until_finished() {
    let mut h = harness();
    fill_valid(&mut h.controller);

    let outcome = h.controller.dispatch(FormEvent::Submit);

    assert!(matches!(outcome, EventOutcome::SubmissionStarted(ref report)
        if report.get("policyNumber") == Some("POL-001")));
    assert_eq!(h.controller.state(), SubmissionState::Submitting);
    assert!(h.controller.surface().submit_busy);
    assert_eq!(h.controller.surface().submit_label, "Submitting...");

    // Events keep flowing while the transport runs.
    h.controller.edit("insuredName", "Jordan A. Lee");
    assert_eq!(h.controller.dispatch(FormEvent::Submit), EventOutcome::Ignored);
    assert_eq!(h.controller.dispatch(FormEvent::Clear), EventOutcome::Ignored);

    let receipt = h
        .controller
        .finish_submit(Ok(SubmissionReceipt { field_count: 12 }))
        .unwrap();
    assert_eq!(receipt.field_count, 12);
    assert_eq!(h.controller.state(), SubmissionState::Submitted);
    assert_eq!(h.controller.surface().text("insuredName"), "Jordan A. Lee");
}

#[tokio::test]
async fn failed_transport_returns_to_editing() {
    let mut h = harness_with(Arc::new(FailingTransport));
    fill_valid(&mut h.controller);

    let result = h.controller.submit().await;

    assert!(matches!(
        result,
        Err(ControllerError::Transport(TransportError::Unavailable(_)))
    ));
    assert_eq!(h.controller.state(), SubmissionState::Editing);
    let surface = h.controller.surface();
    assert!(surface.form_visible);
    assert!(!surface.submit_busy);
    assert_eq!(surface.text("policyNumber"), "POL-001");
}

#[tokio::test]
async fn submit_after_submitted_is_rejected() {
    let mut h = harness();
    fill_valid(&mut h.controller);
    h.controller.submit().await.unwrap();

    let result = h.controller.submit().await;

    assert!(matches!(
        result,
        Err(ControllerError::NotEditing(SubmissionState::Submitted))
    ));
}

#[tokio::test(start_paused = true)]
async fn simulated_delay_is_respected() {
    let mut h = harness_with(Arc::new(SimulatedTransport::default()));
    fill_valid(&mut h.controller);
    let started = tokio::time::Instant::now();

    h.controller.submit().await.unwrap();

    assert!(started.elapsed() >= SimulatedTransport::DEFAULT_DELAY);
}

// =========================================================================
// autosave, shortcuts, unload guard, print
// =========================================================================

#[test]
fn snapshot_restore_brings_back_values_and_recomputes() {
    let mut h = harness();
    h.controller.edit("policyNumber", "ABC123");
    h.controller.edit(field_ids::ESTIMATED_REPAIR_COST, "900");
    h.controller.edit("declarationAccepted", true);
    h.controller.dispatch(FormEvent::AutosaveTick);

    h.prompt.push(true);
    h.controller.clear();
    assert_eq!(h.controller.surface().text("policyNumber"), "");

    assert_eq!(h.controller.dispatch(FormEvent::RestoreSnapshot), EventOutcome::Handled);

    let surface = h.controller.surface();
    assert_eq!(surface.text("policyNumber"), "ABC123");
    assert_eq!(surface.value("declarationAccepted"), Some(FieldValue::Checkbox(true)));
    assert_eq!(surface.text(field_ids::NET_CLAIM_AMOUNT), "900.00");
    assert!(surface.is_calculated(field_ids::NET_CLAIM_AMOUNT));
    assert_eq!(
        surface.section_state("policy"),
        Some(SectionCompletionState::Partial)
    );
}

#[test]
fn restore_without_snapshot_is_ignored() {
    let mut h = harness();

    assert_eq!(h.controller.dispatch(FormEvent::RestoreSnapshot), EventOutcome::Ignored);
}

#[test]
fn restore_keeps_user_set_dates() {
    let mut h = harness();
    h.controller.edit(field_ids::DATE_OF_REPORT, "2025-05-30");
    h.controller.dispatch(FormEvent::VisibilityHidden);
    h.controller.edit(field_ids::DATE_OF_REPORT, "");

    h.controller.restore_snapshot();
    h.controller.seed_default_dates();

    assert_eq!(h.controller.surface().text(field_ids::DATE_OF_REPORT), "2025-05-30");
}

#[test]
fn print_shortcut_prints_in_print_mode_and_reverts() {
    let mut h = harness();

    let outcome = h.controller.dispatch(FormEvent::Key(KeyChord::meta('p')));

    assert_eq!(outcome, EventOutcome::DefaultPrevented);
    assert_eq!(h.printer.count(), 1);
    assert_eq!(h.controller.surface().print_mode_history, vec![true, false]);
    assert!(!h.controller.surface().print_mode);
}

#[tokio::test]
async fn unload_guard_warns_until_form_is_hidden() {
    let mut h = harness();
    assert!(h.controller.before_unload().is_some()); // seeded dates count as data

    fill_valid(&mut h.controller);
    assert_eq!(
        h.controller.before_unload(),
        Some("You have unsaved changes. Are you sure you want to leave?")
    );

    h.controller.submit().await.unwrap();
    assert_eq!(h.controller.before_unload(), None);
}
