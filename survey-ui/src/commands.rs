//! Console command parsing.

use std::fmt;

use survey_core::KeyChord;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("unknown command '{0}'; type `help` for a list")]
    Unknown(String),

    #[error("`{command}` needs {expected}")]
    MissingArgument {
        command: &'static str,
        expected: &'static str,
    },

    #[error("cannot read key chord '{0}'; use e.g. ctrl+s or cmd+p")]
    BadChord(String),
}

/// One line typed at the console.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Set { field: String, value: String },
    Check { field: String, checked: bool },
    Blur(String),
    Submit,
    Clear,
    Print,
    NewReport,
    Save,
    Restore,
    Hide,
    Key(KeyChord),
    Show,
    Fields,
    Export,
    Help,
    Quit,
}

impl Command {
    /// Parses a console line. Blank lines yield `Ok(None)`.
    pub fn parse(line: &str) -> Result<Option<Self>, CommandError> {
        let line = line.trim();
        let Some((word, rest)) = split_word(line) else {
            return Ok(None);
        };

        let command = match word.to_ascii_lowercase().as_str() {
            "set" => {
                let (field, value) = split_word(rest).ok_or(CommandError::MissingArgument {
                    command: "set",
                    expected: "a field id and a value",
                })?;
                Self::Set {
                    field: field.to_string(),
                    value: value.to_string(),
                }
            }
            "unset" => Self::Set {
                field: required_field("unset", rest)?,
                value: String::new(),
            },
            "check" => Self::Check {
                field: required_field("check", rest)?,
                checked: true,
            },
            "uncheck" => Self::Check {
                field: required_field("uncheck", rest)?,
                checked: false,
            },
            "blur" => Self::Blur(required_field("blur", rest)?),
            "submit" => Self::Submit,
            "clear" => Self::Clear,
            "print" => Self::Print,
            "new" => Self::NewReport,
            "save" => Self::Save,
            "restore" => Self::Restore,
            "hide" => Self::Hide,
            "key" => Self::Key(parse_chord(rest)?),
            "show" => Self::Show,
            "fields" => Self::Fields,
            "export" => Self::Export,
            "help" | "?" => Self::Help,
            "quit" | "exit" => Self::Quit,
            other => return Err(CommandError::Unknown(other.to_string())),
        };

        Ok(Some(command))
    }
}

fn split_word(input: &str) -> Option<(&str, &str)> {
    let input = input.trim_start();
    if input.is_empty() {
        return None;
    }
    match input.split_once(char::is_whitespace) {
        Some((word, rest)) => Some((word, rest.trim())),
        None => Some((input, "")),
    }
}

fn required_field(
    command: &'static str,
    rest: &str,
) -> Result<String, CommandError> {
    split_word(rest)
        .map(|(field, _)| field.to_string())
        .ok_or(CommandError::MissingArgument {
            command,
            expected: "a field id",
        })
}

/// Reads `ctrl+s`, `cmd+p`, `meta+p`.
pub fn parse_chord(input: &str) -> Result<KeyChord, CommandError> {
    let bad = || CommandError::BadChord(input.to_string());
    let (modifier, key) = input.trim().split_once('+').ok_or_else(bad)?;

    let mut chars = key.chars();
    let (Some(key), None) = (chars.next(), chars.next()) else {
        return Err(bad());
    };

    match modifier.to_ascii_lowercase().as_str() {
        "ctrl" => Ok(KeyChord::ctrl(key)),
        "cmd" | "meta" => Ok(KeyChord::meta(key)),
        _ => Err(bad()),
    }
}

/// Console command hint for the help listing.
pub struct CommandHint {
    pub usage: &'static str,
    pub action: &'static str,
}

impl CommandHint {
    pub const fn new(
        usage: &'static str,
        action: &'static str,
    ) -> Self {
        Self { usage, action }
    }
}

impl fmt::Display for CommandHint {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "  {:<24} {}", self.usage, self.action)
    }
}

pub const HINTS: &[CommandHint] = &[
    CommandHint::new("set <field> <value>", "Type a value into a field"),
    CommandHint::new("unset <field>", "Empty a field"),
    CommandHint::new("check|uncheck <field>", "Tick or untick a checkbox"),
    CommandHint::new("blur <field>", "Leave a field (runs its checks)"),
    CommandHint::new("submit", "Validate and submit the report"),
    CommandHint::new("clear", "Clear the form (asks first)"),
    CommandHint::new("print", "Print the report"),
    CommandHint::new("new", "Start a new report after submitting"),
    CommandHint::new("save | key ctrl+s", "Save a snapshot"),
    CommandHint::new("restore", "Load the last snapshot"),
    CommandHint::new("hide", "Simulate switching away from the page"),
    CommandHint::new("key <mod>+<k>", "Press a shortcut (ctrl+p prints)"),
    CommandHint::new("show | fields", "Show the form or list field ids"),
    CommandHint::new("export", "Dump the current values as JSON"),
    CommandHint::new("quit", "Leave (warns about unsaved data)"),
];
