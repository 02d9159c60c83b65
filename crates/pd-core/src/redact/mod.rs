//! PII redaction for `key=value` log lines.
//!
//! A log line is a sequence of segments joined by a separator, each segment a
//! `key=value` pair. Redaction rewrites the value of every segment whose key is
//! a sensitive field name, leaving order and separators untouched:
//!
//! ```text
//! name=Bob;email=bob@x.com;phone=555;   ->   name=***;email=***;phone=555;
//! ```
//!
//! Keys are matched whole, bounded by `=`. `name` never matches `username`.
//! Values are not escaped, so a value that itself contains the separator is
//! split like any other text.

pub mod formatter;
pub mod template;

use std::collections::HashSet;

pub use formatter::{Level, LogEvent, ParseLevelError, RedactingFormatter, DEFAULT_TEMPLATE};
pub use template::{Field, Template, TemplateError};

/// Fields treated as personally identifiable by default.
pub const PII_FIELDS: [&str; 5] = ["name", "email", "phone", "ssn", "password"];

/// Default replacement for sensitive values.
pub const DEFAULT_TOKEN: &str = "***";

/// Default segment separator.
pub const DEFAULT_SEPARATOR: &str = ";";

/// Replace the value of every `field=value` segment of `line` whose key is in
/// `fields` with `token`.
pub fn redact<S: AsRef<str>>(fields: &[S], token: &str, line: &str, separator: &str) -> String {
    if fields.is_empty() {
        return line.to_string();
    }
    let fields: HashSet<&str> = fields.iter().map(AsRef::as_ref).collect();
    redact_segments(|key| fields.contains(key), token, line, separator)
}

fn redact_segments<F>(is_sensitive: F, token: &str, line: &str, separator: &str) -> String
where
    F: Fn(&str) -> bool,
{
    if line.is_empty() {
        return String::new();
    }
    if separator.is_empty() {
        return redact_segment(&is_sensitive, token, line).unwrap_or_else(|| line.to_string());
    }

    let mut out = String::with_capacity(line.len());
    for (i, segment) in line.split(separator).enumerate() {
        if i > 0 {
            out.push_str(separator);
        }
        match redact_segment(&is_sensitive, token, segment) {
            Some(redacted) => out.push_str(&redacted),
            None => out.push_str(segment),
        }
    }
    out
}

/// Returns the rewritten segment, or `None` when it is left as is.
fn redact_segment<F>(is_sensitive: &F, token: &str, segment: &str) -> Option<String>
where
    F: Fn(&str) -> bool,
{
    let (key, _value) = segment.split_once('=')?;
    if !is_sensitive(key.trim_start()) {
        return None;
    }

    let mut redacted = String::with_capacity(key.len() + 1 + token.len());
    redacted.push_str(key);
    redacted.push('=');
    redacted.push_str(token);
    Some(redacted)
}

/// Which fields to hide, what to hide them with, and how segments are separated.
///
/// Built once, typically when the logger is set up, and shared read-only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedactionSpec {
    fields: HashSet<String>,
    token: String,
    separator: String,
}

impl RedactionSpec {
    pub fn new<I, S>(fields: I, token: impl Into<String>, separator: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
            token: token.into(),
            separator: separator.into(),
        }
    }

    /// Replace the sensitive field set, keeping token and separator.
    pub fn with_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = token.into();
        self
    }

    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(String::as_str)
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn separator(&self) -> &str {
        &self.separator
    }

    /// Whether values under `key` are redacted.
    pub fn is_sensitive(&self, key: &str) -> bool {
        self.fields.contains(key.trim_start())
    }

    /// Redact `line` according to this spec.
    pub fn apply(&self, line: &str) -> String {
        if self.fields.is_empty() {
            return line.to_string();
        }
        redact_segments(|key| self.fields.contains(key), &self.token, line, &self.separator)
    }
}

impl Default for RedactionSpec {
    fn default() -> Self {
        Self::new(PII_FIELDS, DEFAULT_TOKEN, DEFAULT_SEPARATOR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NO_FIELDS: [&str; 0] = [];

    #[test]
    fn test_redacts_listed_fields() {
        let line = "name=Bob;email=bob@x.com;phone=555;";
        assert_eq!(
            redact(&["name", "email"], "***", line, ";"),
            "name=***;email=***;phone=555;"
        );
    }

    #[test]
    fn test_key_must_match_whole() {
        assert_eq!(redact(&["name"], "***", "username=Bob;", ";"), "username=Bob;");
        assert_eq!(redact(&["user"], "***", "username=Bob;", ";"), "username=Bob;");
        assert_eq!(
            redact(&["name"], "***", "nickname=Bo;name=Bob;", ";"),
            "nickname=Bo;name=***;"
        );
    }

    #[test]
    fn test_absent_field_leaves_line() {
        assert_eq!(redact(&["ssn"], "***", "name=Bob;", ";"), "name=Bob;");
    }

    #[test]
    fn test_empty_fields_returns_line() {
        let line = "name=Bob;email=bob@x.com;";
        assert_eq!(redact(&NO_FIELDS, "***", line, ";"), line);
    }

    #[test]
    fn test_empty_line() {
        assert_eq!(redact(&PII_FIELDS, "***", "", ";"), "");
    }

    #[test]
    fn test_idempotent() {
        let line = "name=Bob;email=bob@x.com;phone=555-0100;ssn=123-45-6789;ip=10.0.0.1;";
        let once = redact(&PII_FIELDS, "***", line, ";");
        let twice = redact(&PII_FIELDS, "***", &once, ";");
        assert_eq!(once, twice);
        assert_eq!(once, "name=***;email=***;phone=***;ssn=***;ip=10.0.0.1;");
    }

    #[test]
    fn test_every_occurrence_redacted() {
        assert_eq!(
            redact(&["email"], "xxx", "email=a@b.c;id=1;email=d@e.f", ";"),
            "email=xxx;id=1;email=xxx"
        );
    }

    #[test]
    fn test_multichar_separator_with_spaces() {
        let line = "name=Bob; email=bob@x.com; ip=1.2.3.4; ";
        assert_eq!(
            redact(&PII_FIELDS, "***", line, "; "),
            "name=***; email=***; ip=1.2.3.4; "
        );
    }

    #[test]
    fn test_leading_whitespace_in_key_preserved() {
        assert_eq!(
            redact(&["email"], "***", "name=Bob; email=bob@x.com;", ";"),
            "name=Bob; email=***;"
        );
    }

    #[test]
    fn test_value_may_contain_equals() {
        assert_eq!(
            redact(&["password"], "***", "password=a=b=c;role=admin", ";"),
            "password=***;role=admin"
        );
    }

    #[test]
    fn test_segment_without_equals_untouched() {
        assert_eq!(
            redact(&["name"], "***", "name;name=Bob;;", ";"),
            "name;name=***;;"
        );
    }

    #[test]
    fn test_empty_value_redacted() {
        assert_eq!(redact(&["phone"], "***", "phone=;", ";"), "phone=***;");
    }

    #[test]
    fn test_empty_separator_is_single_segment() {
        assert_eq!(redact(&["name"], "***", "name=Bob;email=x", ""), "name=***");
        assert_eq!(redact(&["email"], "***", "name=Bob;email=x", ""), "name=Bob;email=x");
    }

    #[test]
    fn test_separator_inside_value_is_not_escaped() {
        // Known limitation: the tail of the value becomes its own segment.
        assert_eq!(
            redact(&["phone"], "***", "phone=555;123;ip=1", ";"),
            "phone=***;123;ip=1"
        );
    }

    #[test]
    fn test_spec_default() {
        let spec = RedactionSpec::default();
        assert_eq!(spec.token(), "***");
        assert_eq!(spec.separator(), ";");
        let mut fields: Vec<&str> = spec.fields().collect();
        fields.sort_unstable();
        assert_eq!(fields, ["email", "name", "password", "phone", "ssn"]);
    }

    #[test]
    fn test_spec_apply_matches_free_function() {
        let spec = RedactionSpec::default();
        let line = "name=Bob;email=bob@x.com;ip=1.2.3.4;last_login=2019-11-14;";
        assert_eq!(spec.apply(line), redact(&PII_FIELDS, "***", line, ";"));
    }

    #[test]
    fn test_spec_builders() {
        let spec = RedactionSpec::default()
            .with_fields(["token"])
            .with_token("[REDACTED]")
            .with_separator("|");
        assert!(spec.is_sensitive("token"));
        assert!(spec.is_sensitive(" token"));
        assert!(!spec.is_sensitive("name"));
        assert_eq!(spec.apply("name=Bob|token=abc"), "name=Bob|token=[REDACTED]");
    }
}
