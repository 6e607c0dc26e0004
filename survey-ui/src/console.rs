//! Terminal host for the survey report controller.
//!
//! Reads one command per line, forwards it to the controller as the matching
//! form event, and keeps the autosave timer and any in-flight submission
//! running in the same `select!` loop, so the form stays editable while a
//! report is on its way.

use std::{future::Future, io::Write, pin::Pin, sync::Arc, time::Duration};

use anyhow::Result;
use survey_core::{
    AutosaveSnapshot, ControllerServices, EventOutcome, FieldValue, FormController, FormEvent,
    FormSurface, KeyChord, MemorySurface, SimulatedTransport, SubmissionReceipt,
    SubmissionState, TransportError,
    controller::CLEAR_CONFIRMATION,
    field_ids,
    platform::{Clock, RecordingPrinter, ScriptedPrompt, SystemClock},
};
use tokio::{
    io::{AsyncBufRead, AsyncBufReadExt},
    time::{self, Instant, MissedTickBehavior},
};
use tracing::{debug, info, warn};

use crate::{
    commands::{Command, HINTS},
    config::AppConfig,
    layout,
};

type PendingSubmit =
    Pin<Box<dyn Future<Output = Result<SubmissionReceipt, TransportError>> + Send>>;

/// Whether the loop keeps reading after a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// A yes/no question put to the user; the next line is its answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Question {
    Clear,
    Leave,
}

pub struct Console {
    controller: FormController<MemorySurface>,
    prompt: ScriptedPrompt,
    printer: RecordingPrinter,
    autosave_interval: Duration,
    pending: Option<PendingSubmit>,
    question: Option<Question>,
    prints_seen: usize,
}

impl Console {
    pub fn new(config: &AppConfig) -> Self {
        Self::with_clock(config, Box::new(SystemClock))
    }

    pub fn with_clock(
        config: &AppConfig,
        clock: Box<dyn Clock>,
    ) -> Self {
        let prompt = ScriptedPrompt::new();
        let printer = RecordingPrinter::new();
        let controller_config = config.controller_config();
        let autosave_interval = controller_config.autosave_interval;

        let controller = FormController::new(
            layout::survey_report_surface(),
            ControllerServices {
                clock,
                prompt: Box::new(prompt.clone()),
                printer: Box::new(printer.clone()),
                transport: Arc::new(SimulatedTransport::new(config.submit_delay())),
            },
            controller_config,
        );

        Self {
            controller,
            prompt,
            printer,
            autosave_interval,
            pending: None,
            question: None,
            prints_seen: 0,
        }
    }

    pub fn controller(&self) -> &FormController<MemorySurface> {
        &self.controller
    }

    /// True while a submission is waiting on the transport.
    pub fn is_submitting(&self) -> bool {
        self.pending.is_some()
    }

    /// Runs until `quit` is confirmed or `input` is exhausted.
    ///
    /// At end of input an in-flight submission is still awaited.
    pub async fn run<R, W>(
        &mut self,
        input: R,
        out: &mut W,
    ) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        let mut lines = input.lines();
        let mut autosave = time::interval_at(
            Instant::now() + self.autosave_interval,
            self.autosave_interval,
        );
        autosave.set_missed_tick_behavior(MissedTickBehavior::Delay);

        writeln!(out, "Insurance survey report. Type `help` for commands.")?;

        loop {
            tokio::select! {
                biased;

                result = await_pending(&mut self.pending) => {
                    self.pending = None;
                    self.settle_submission(result, out)?;
                }
                _ = autosave.tick() => {
                    debug!("autosave tick");
                    self.controller.dispatch(FormEvent::AutosaveTick);
                }
                line = lines.next_line() => {
                    let Some(line) = line? else {
                        break;
                    };
                    if self.handle_line(&line, out)? == Flow::Quit {
                        self.settle_pending(out).await?;
                        return Ok(());
                    }
                }
            }
        }

        self.settle_pending(out).await?;
        if let Some(warning) = self.controller.before_unload() {
            warn!("input closed with report data still on the form");
            writeln!(out, "{warning}")?;
        }
        Ok(())
    }

    /// Waits out an in-flight submission so the report never stays
    /// `Submitting` after the console stops.
    async fn settle_pending<W: Write>(
        &mut self,
        out: &mut W,
    ) -> Result<()> {
        if let Some(pending) = self.pending.take() {
            writeln!(out, "Waiting for the submission to finish...")?;
            let result = pending.await;
            self.settle_submission(result, out)?;
        }
        Ok(())
    }

    /// Handles one input line, including answers to an open question.
    pub fn handle_line<W: Write>(
        &mut self,
        line: &str,
        out: &mut W,
    ) -> Result<Flow> {
        if let Some(question) = self.question.take() {
            return self.answer(question, is_yes(line), out);
        }

        let command = match Command::parse(line) {
            Ok(Some(command)) => command,
            Ok(None) => return Ok(Flow::Continue),
            Err(error) => {
                writeln!(out, "{error}")?;
                return Ok(Flow::Continue);
            }
        };

        let flow = self.execute(command, out)?;
        self.flush_side_effects(out)?;
        Ok(flow)
    }

    fn execute<W: Write>(
        &mut self,
        command: Command,
        out: &mut W,
    ) -> Result<Flow> {
        match command {
            Command::Set { field, value } => self.edit(&field, FieldValue::Text(value), out)?,
            Command::Check { field, checked } => {
                self.edit(&field, FieldValue::Checkbox(checked), out)?
            }
            Command::Blur(field) => {
                self.controller.dispatch(FormEvent::Blur(field.clone()));
                match self.controller.surface().error(&field) {
                    Some(error) => writeln!(out, "{field}: {error}")?,
                    None => writeln!(out, "{field}: ok")?,
                }
            }
            Command::Submit => self.submit(out)?,
            Command::Clear => {
                let state = self.controller.state();
                if state == SubmissionState::Editing {
                    writeln!(out, "{CLEAR_CONFIRMATION} [y/N]")?;
                    self.question = Some(Question::Clear);
                } else {
                    writeln!(out, "Nothing to clear while the report is {state}.")?;
                }
            }
            Command::Print => {
                self.controller.dispatch(FormEvent::Print);
            }
            Command::NewReport => {
                if self.controller.dispatch(FormEvent::NewReport) == EventOutcome::Handled {
                    writeln!(out, "Started a new report.")?;
                } else {
                    writeln!(out, "Submit the current report first.")?;
                }
            }
            Command::Save => {
                self.controller.dispatch(FormEvent::Key(KeyChord::ctrl('s')));
            }
            Command::Restore => {
                if self.controller.dispatch(FormEvent::RestoreSnapshot) == EventOutcome::Handled {
                    writeln!(out, "Snapshot restored.")?;
                } else {
                    writeln!(out, "No snapshot to restore.")?;
                }
            }
            Command::Hide => {
                self.controller.dispatch(FormEvent::VisibilityHidden);
                writeln!(out, "Page hidden; snapshot taken.")?;
            }
            Command::Key(chord) => {
                if self.controller.dispatch(FormEvent::Key(chord)) == EventOutcome::Ignored {
                    writeln!(out, "No shortcut on that key.")?;
                }
            }
            Command::Show => self.render(out)?,
            Command::Fields => {
                for spec in self.controller.surface().fields() {
                    let marker = if spec.required { "*" } else { " " };
                    writeln!(out, "{marker} {:<24} {:?}", spec.id, spec.kind)?;
                }
            }
            Command::Export => {
                let snapshot = AutosaveSnapshot::capture(self.controller.surface());
                writeln!(out, "{}", serde_json::to_string_pretty(&snapshot)?)?;
            }
            Command::Help => {
                writeln!(out, "Commands:")?;
                for hint in HINTS {
                    writeln!(out, "{hint}")?;
                }
            }
            Command::Quit => match self.controller.before_unload() {
                Some(warning) => {
                    writeln!(out, "{warning} [y/N]")?;
                    self.question = Some(Question::Leave);
                }
                None => return Ok(Flow::Quit),
            },
        }
        Ok(Flow::Continue)
    }

    fn answer<W: Write>(
        &mut self,
        question: Question,
        yes: bool,
        out: &mut W,
    ) -> Result<Flow> {
        match question {
            Question::Clear => {
                self.prompt.push(yes);
                if self.controller.dispatch(FormEvent::Clear) == EventOutcome::Handled {
                    writeln!(out, "Form cleared.")?;
                } else {
                    writeln!(out, "Clear cancelled.")?;
                }
                Ok(Flow::Continue)
            }
            Question::Leave if yes => Ok(Flow::Quit),
            Question::Leave => Ok(Flow::Continue),
        }
    }

    fn edit<W: Write>(
        &mut self,
        field: &str,
        value: FieldValue,
        out: &mut W,
    ) -> Result<()> {
        if self.controller.edit(field, value) == EventOutcome::Ignored {
            match self.controller.surface().field(field) {
                Some(spec) if spec.readonly => {
                    writeln!(out, "{field} is calculated and cannot be edited.")?
                }
                _ => writeln!(out, "No field named '{field}'; type `fields` for a list.")?,
            }
            return Ok(());
        }
        if field_ids::NET_CLAIM_SOURCES.contains(&field) {
            let claim = self.controller.surface().text(field_ids::NET_CLAIM_AMOUNT);
            writeln!(out, "Net claim amount: {claim}")?;
        }
        Ok(())
    }

    fn submit<W: Write>(
        &mut self,
        out: &mut W,
    ) -> Result<()> {
        match self.controller.dispatch(FormEvent::Submit) {
            EventOutcome::SubmissionStarted(report) => {
                let transport = self.controller.transport();
                self.pending = Some(Box::pin(async move { transport.submit(&report).await }));
                writeln!(out, "{}", self.controller.surface().submit_label)?;
            }
            EventOutcome::Invalid(errors) => {
                writeln!(out, "The report has {} problem(s):", errors.len())?;
                for failure in &errors {
                    writeln!(out, "  {}: {}", failure.field_id, failure.error)?;
                }
                if let Some(field) = &self.controller.surface().focused {
                    writeln!(out, "Cursor moved to {field}.")?;
                }
            }
            _ => {
                let state = self.controller.state();
                writeln!(out, "Cannot submit while the report is {state}.")?;
            }
        }
        Ok(())
    }

    fn settle_submission<W: Write>(
        &mut self,
        result: Result<SubmissionReceipt, TransportError>,
        out: &mut W,
    ) -> Result<()> {
        match self.controller.finish_submit(result) {
            Ok(receipt) => {
                info!(fields = receipt.field_count, "console submission acknowledged");
                writeln!(
                    out,
                    "Report submitted successfully. Type `new` to start another report."
                )?;
            }
            Err(error) => writeln!(out, "Submission failed: {error}")?,
        }
        Ok(())
    }

    /// Shows print previews and notices raised since the last command.
    fn flush_side_effects<W: Write>(
        &mut self,
        out: &mut W,
    ) -> Result<()> {
        let printed = self.printer.count();
        if printed > self.prints_seen {
            self.prints_seen = printed;
            writeln!(out, "----- print -----")?;
            write!(out, "{}", self.controller.surface())?;
            writeln!(out, "-----------------")?;
        }

        for notice in self.controller.take_notices() {
            writeln!(out, "{notice}")?;
        }
        Ok(())
    }

    fn render<W: Write>(
        &self,
        out: &mut W,
    ) -> Result<()> {
        let surface = self.controller.surface();
        if surface.form_visible {
            write!(out, "{surface}")?;
        }
        if surface.success_visible {
            writeln!(out, "Report submitted successfully.")?;
        }
        writeln!(out, "State: {}", self.controller.state())?;
        Ok(())
    }
}

/// Resolves with the in-flight submission, or never when there is none.
async fn await_pending(
    pending: &mut Option<PendingSubmit>,
) -> Result<SubmissionReceipt, TransportError> {
    match pending {
        Some(submission) => submission.await,
        None => std::future::pending().await,
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
