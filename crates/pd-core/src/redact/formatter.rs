//! Rendering log events into redacted text lines.
//!
//! [`RedactingFormatter`] composes two steps: the event's message is passed
//! through the [`RedactionSpec`], then the [`Template`] is rendered with the
//! redacted message and the event metadata. Only the message is redacted; the
//! logger name, level and timestamp are emitted as is.

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use thiserror::Error;

use super::template::{Field, Template, TemplateError};
use super::RedactionSpec;

/// Template used when none is supplied.
pub const DEFAULT_TEMPLATE: &str =
    "[personal_data] %(name)s %(levelname)s %(asctime)-15s: %(message)s";

/// `%(asctime)s` layout, millisecond precision.
const ASCTIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S,%3f";

/// Severity of a log event, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    Debug,
    Info,
    Warning,
    Error,
    Critical,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
            Self::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Unknown log level: {0}")]
pub struct ParseLevelError(String);

impl FromStr for Level {
    type Err = ParseLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "DEBUG" => Ok(Self::Debug),
            "INFO" => Ok(Self::Info),
            "WARN" | "WARNING" => Ok(Self::Warning),
            "ERROR" => Ok(Self::Error),
            "CRITICAL" | "FATAL" => Ok(Self::Critical),
            _ => Err(ParseLevelError(s.to_string())),
        }
    }
}

/// A single log event before formatting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEvent {
    /// Name of the logger that emitted the event.
    pub name: String,
    pub level: Level,
    /// When the event occurred (UTC).
    pub timestamp: DateTime<Utc>,
    /// Raw, unredacted message.
    pub message: String,
}

impl LogEvent {
    /// Create an event stamped with the current UTC time.
    pub fn new(name: impl Into<String>, level: Level, message: impl Into<String>) -> Self {
        Self::at(name, level, Utc::now(), message)
    }

    /// Create an event with an explicit timestamp.
    pub fn at(
        name: impl Into<String>,
        level: Level,
        timestamp: DateTime<Utc>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            level,
            timestamp,
            message: message.into(),
        }
    }
}

/// Formats [`LogEvent`]s through a template, redacting sensitive message fields.
///
/// Immutable once built; a single formatter can be shared across threads.
#[derive(Debug, Clone)]
pub struct RedactingFormatter {
    spec: RedactionSpec,
    template: Template,
}

impl RedactingFormatter {
    pub fn new(spec: RedactionSpec, template: &str) -> Result<Self, TemplateError> {
        Ok(Self {
            spec,
            template: Template::parse(template)?,
        })
    }

    /// Formatter over `fields` with the default token, separator and template.
    pub fn with_defaults<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            spec: RedactionSpec::default().with_fields(fields),
            template: default_template(),
        }
    }

    pub fn spec(&self) -> &RedactionSpec {
        &self.spec
    }

    pub fn template(&self) -> &Template {
        &self.template
    }

    /// Render `event` into a single redacted line.
    pub fn format(&self, event: &LogEvent) -> String {
        let message = self.spec.apply(&event.message);
        self.template.render(|field| match field {
            Field::Name => Cow::Borrowed(event.name.as_str()),
            Field::LevelName => Cow::Borrowed(event.level.as_str()),
            Field::AscTime => Cow::Owned(event.timestamp.format(ASCTIME_FORMAT).to_string()),
            Field::Message => Cow::Borrowed(message.as_str()),
        })
    }
}

fn default_template() -> Template {
    Template::parse(DEFAULT_TEMPLATE).expect("default template is valid")
}
