//! CSV command file format
//!
//! A command file starts with a fixed header line followed by one record
//! per command:
//!
//! ```text
//! name,address,register,data,read length,speed mode
//! ```
//!
//! Only the name field is ever quoted: names containing `"` or `,` are
//! wrapped in double quotes with inner quotes doubled. The remaining fields
//! cannot contain either character, so they are written and read as plain
//! comma-separated text.

use crate::command::{Command, Request};
use crate::error::ValidationError;
use crate::store::CommandStore;
use std::borrow::Cow;

/// Header line written to and skipped in every command file
pub const HEADER: &str = "Command Name,Device Address (7 bits),Register Address,\"Write Data (space separated, <1023 bytes including register address)\",Read Length (<1024 bytes),Speed Mode (0-3)";

/// Speed mode used when a record has no speed mode field
pub const DEFAULT_SPEED_MODE: i64 = 1;

/// Result of loading one record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineOutcome {
    /// The command was added to the store
    Inserted(String),
    /// The record was rejected
    Rejected {
        /// 1-based line number in the file
        line: usize,
        /// Command name as far as it could be parsed
        name: String,
        /// Why the record was rejected
        reason: ValidationError,
    },
}

impl LineOutcome {
    /// True if the record was rejected
    pub fn is_rejected(&self) -> bool {
        matches!(self, LineOutcome::Rejected { .. })
    }
}

/// Quote a command name if it contains `"` or `,`
pub fn quote_name(name: &str) -> Cow<'_, str> {
    if name.contains(['"', ',']) {
        Cow::Owned(format!("\"{}\"", name.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(name)
    }
}

/// Format one command as a CSV record (without line terminator)
pub fn format_record(command: &Command) -> String {
    format!(
        "{},{},{},{},{},{}",
        quote_name(&command.name),
        command.address,
        command.register,
        command.data,
        command.read_length,
        command.speed.mode()
    )
}

/// Split a record into its unquoted name and the text after the name's comma
///
/// `None` for the rest means the line ended right after the name.
fn split_name(line: &str) -> Result<(String, Option<&str>), ValidationError> {
    let Some(quoted) = line.strip_prefix('"') else {
        return Ok(match line.split_once(',') {
            Some((name, rest)) => (name.to_string(), Some(rest)),
            None => (line.to_string(), None),
        });
    };

    let mut name = String::new();
    let mut chars = quoted.char_indices().peekable();
    while let Some((idx, c)) = chars.next() {
        if c != '"' {
            name.push(c);
            continue;
        }
        if chars.next_if(|&(_, next)| next == '"').is_some() {
            name.push('"');
            continue;
        }

        let after = &quoted[idx + 1..];
        return match after.strip_prefix(',') {
            Some(rest) => Ok((name, Some(rest))),
            None if after.is_empty() => Ok((name, None)),
            None => Err(ValidationError::MalformedName),
        };
    }

    Err(ValidationError::MalformedName)
}

/// Split the fields after the name
///
/// A trailing empty field counts as absent, so `a,b,` has two fields.
fn split_fields(rest: Option<&str>) -> Vec<&str> {
    let Some(rest) = rest else {
        return Vec::new();
    };
    let mut fields: Vec<&str> = rest.split(',').collect();
    if fields.last() == Some(&"") {
        fields.pop();
    }
    fields
}

fn required<'a>(fields: &[&'a str], idx: usize, field: &'static str) -> Result<&'a str, ValidationError> {
    fields
        .get(idx)
        .copied()
        .ok_or(ValidationError::MissingField(field))
}

fn parse_number(text: &str, field: &'static str) -> Result<i64, ValidationError> {
    text.trim()
        .parse()
        .map_err(|_| ValidationError::InvalidNumber {
            field,
            value: text.to_string(),
        })
}

/// Parse the fields of a record into a request
fn parse_request(fields: &[&str]) -> Result<Request, ValidationError> {
    let address = required(fields, 0, "device address")?;
    let register = required(fields, 1, "register address")?;
    let data = required(fields, 2, "write data")?;
    let read_length = parse_number(required(fields, 3, "read length")?, "read length")?;
    let speed_mode = match fields.get(4) {
        Some(text) => parse_number(text, "speed mode")?,
        None => DEFAULT_SPEED_MODE,
    };

    Ok(Request::new(address, register, data, read_length, speed_mode))
}

impl CommandStore {
    /// Serialize all commands, header first, one record per line
    pub fn to_csv(&self) -> String {
        let mut out = String::from(HEADER);
        for command in self.iter() {
            out.push('\n');
            out.push_str(&format_record(command));
        }
        out
    }

    /// Load records from CSV text into the store
    ///
    /// The first line is skipped as the header and blank lines are ignored.
    /// Every other line produces one [`LineOutcome`]. Rejected lines do not
    /// stop the load, and a name that is already present (including one
    /// loaded earlier from the same text) is rejected as a duplicate.
    pub fn load_csv(&mut self, text: &str) -> Vec<LineOutcome> {
        let mut outcomes = Vec::new();

        for (idx, line) in text.lines().enumerate().skip(1) {
            if line.trim().is_empty() {
                continue;
            }
            let line_no = idx + 1;

            let outcome = match self.load_record(line) {
                Ok(name) => LineOutcome::Inserted(name),
                Err((name, reason)) => {
                    log::warn!("Line {}: rejected command \"{}\": {}", line_no, name, reason);
                    LineOutcome::Rejected {
                        line: line_no,
                        name,
                        reason,
                    }
                }
            };
            outcomes.push(outcome);
        }

        outcomes
    }

    /// Build a new store from CSV text
    pub fn from_csv(text: &str) -> (Self, Vec<LineOutcome>) {
        let mut store = Self::new();
        let outcomes = store.load_csv(text);
        (store, outcomes)
    }

    fn load_record(&mut self, line: &str) -> Result<String, (String, ValidationError)> {
        let (name, rest) = split_name(line).map_err(|e| (String::new(), e))?;
        let fail = |reason| (name.clone(), reason);

        if name.is_empty() {
            return Err(fail(ValidationError::EmptyName));
        }
        if self.contains(&name) {
            return Err(fail(ValidationError::DuplicateName(name.clone())));
        }

        let fields = split_fields(rest);
        let request = parse_request(&fields).map_err(fail)?;
        let command = Command::from_request(&name, &request).map_err(fail)?;

        log::debug!("Loaded command \"{}\"", name);
        self.insert(command);
        Ok(name)
    }
}
