//! Host services the controller consumes besides the form surface.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{Local, NaiveDate};

/// Source of the current local date.
pub trait Clock {
    fn today(&self) -> NaiveDate;
}

/// Reads the wall clock in the local time zone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// A clock pinned to one date.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

/// Blocking yes/no question put to the user before a destructive action.
pub trait ConfirmPrompt {
    fn confirm(
        &mut self,
        message: &str,
    ) -> bool;
}

/// Answers prompts from a queue filled by the host.
///
/// Clones share the queue, so the host can keep one handle and give the
/// other to the controller. An empty queue answers "no".
#[derive(Debug, Clone, Default)]
pub struct ScriptedPrompt {
    answers: Arc<Mutex<VecDeque<bool>>>,
    asked: Arc<Mutex<Vec<String>>>,
}

impl ScriptedPrompt {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn answering(answer: bool) -> Self {
        let prompt = Self::new();
        prompt.push(answer);
        prompt
    }

    pub fn push(
        &self,
        answer: bool,
    ) {
        if let Ok(mut answers) = self.answers.lock() {
            answers.push_back(answer);
        }
    }

    /// Every message asked so far.
    pub fn asked(&self) -> Vec<String> {
        self.asked
            .lock()
            .map(|asked| asked.clone())
            .unwrap_or_default()
    }
}

impl ConfirmPrompt for ScriptedPrompt {
    fn confirm(
        &mut self,
        message: &str,
    ) -> bool {
        if let Ok(mut asked) = self.asked.lock() {
            asked.push(message.to_string());
        }
        self.answers
            .lock()
            .ok()
            .and_then(|mut answers| answers.pop_front())
            .unwrap_or(false)
    }
}

/// Triggers the platform's print rendering.
pub trait PrintService {
    fn print(&mut self);
}

/// Counts print requests. Clones share the counter.
#[derive(Debug, Clone, Default)]
pub struct RecordingPrinter {
    printed: Arc<AtomicUsize>,
}

impl RecordingPrinter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> usize {
        self.printed.load(Ordering::SeqCst)
    }
}

impl PrintService for RecordingPrinter {
    fn print(&mut self) {
        self.printed.fetch_add(1, Ordering::SeqCst);
    }
}
