//! Notification text for each run verdict.
//!
//! Templates use `{name}` placeholders. Unknown placeholders are left in the
//! output verbatim so a typo in a configured template stays visible.

use std::fmt::{Display, Formatter};

use serde::Serialize;

use crate::RecordDefect;

/// Outbound notification text, built once per failure and sent once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct NotificationMessage(String);

impl NotificationMessage {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for NotificationMessage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifiers of the artifact under check, available to every template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageContext {
    /// File name: token plus extension.
    pub file: String,
    /// Full store key.
    pub key: String,
    pub date: String,
    pub bucket: String,
    pub folder: String,
}

impl MessageContext {
    /// Last non-blank `/`-separated folder segment, e.g. the instrument name.
    pub fn series(&self) -> &str {
        self.folder
            .split('/')
            .map(str::trim)
            .filter(|segment| !segment.is_empty())
            .last()
            .unwrap_or_default()
    }

    fn vars(&self) -> Vec<(&'static str, String)> {
        vec![
            ("file", self.file.clone()),
            ("key", self.key.clone()),
            ("date", self.date.clone()),
            ("bucket", self.bucket.clone()),
            ("folder", self.folder.clone()),
            ("series", self.series().to_owned()),
        ]
    }
}

/// Configurable notification templates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageTemplates {
    pub missing: String,
    pub size_mismatch: String,
    pub blank_record: String,
    pub out_of_order: String,
    pub unparsable: String,
    pub unreadable: String,
    /// Success message; no notification on pass when unset.
    pub passed: Option<String>,
}

impl Default for MessageTemplates {
    fn default() -> Self {
        Self {
            missing: String::from("Candle file {file} was not found in {bucket}/{folder} (date {date})"),
            size_mismatch: String::from(
                "Candle file {file} contains {actual} records, expected {expected}",
            ),
            blank_record: String::from(
                "Candle file {file} ({series}) has a blank timestamp in record {index}",
            ),
            out_of_order: String::from(
                "Candle file {file} is not in descending timestamp order at record {index}",
            ),
            unparsable: String::from(
                "Candle file {file} has a non-integer timestamp '{value}' in record {index}",
            ),
            unreadable: String::from("Candle file {file} could not be read as CSV: {reason}"),
            passed: None,
        }
    }
}

impl MessageTemplates {
    pub fn missing(&self, context: &MessageContext) -> NotificationMessage {
        NotificationMessage(render(&self.missing, &context.vars()))
    }

    pub fn defect(&self, context: &MessageContext, defect: &RecordDefect) -> NotificationMessage {
        let mut vars = context.vars();
        let template = match defect {
            RecordDefect::SizeMismatch { actual, expected } => {
                vars.push(("actual", actual.to_string()));
                vars.push(("expected", expected.to_string()));
                &self.size_mismatch
            }
            RecordDefect::BlankRecord { index } => {
                vars.push(("index", index.to_string()));
                &self.blank_record
            }
            RecordDefect::OutOfOrder { index } => {
                vars.push(("index", index.to_string()));
                &self.out_of_order
            }
            RecordDefect::UnparsableValue { index, raw_value } => {
                vars.push(("index", index.to_string()));
                vars.push(("value", raw_value.clone()));
                &self.unparsable
            }
        };
        NotificationMessage(render(template, &vars))
    }

    pub fn unreadable(&self, context: &MessageContext, reason: &str) -> NotificationMessage {
        let mut vars = context.vars();
        vars.push(("reason", reason.to_owned()));
        NotificationMessage(render(&self.unreadable, &vars))
    }

    pub fn passed(&self, context: &MessageContext, rows: usize) -> Option<NotificationMessage> {
        let template = self.passed.as_deref()?;
        let mut vars = context.vars();
        vars.push(("actual", rows.to_string()));
        Some(NotificationMessage(render(template, &vars)))
    }
}

/// Substitute `{name}` placeholders from `vars`.
pub fn render(template: &str, vars: &[(&str, String)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let Some(close) = after.find('}') else {
            out.push_str(&rest[open..]);
            return out;
        };

        let name = &after[..close];
        match vars.iter().find(|(var, _)| *var == name) {
            Some((_, value)) => out.push_str(value),
            None => out.push_str(&rest[open..open + close + 2]),
        }
        rest = &after[close + 1..];
    }

    out.push_str(rest);
    out
}
