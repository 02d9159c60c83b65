//! Database rows rendered as `key=value` log lines.

use std::fmt;

/// How SQL `NULL` is rendered in a log line.
pub const NULL_VALUE: &str = "NULL";

/// One row: column names paired with their values, in source column order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowRecord {
    fields: Vec<(String, Option<String>)>,
}

impl RowRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(columns: usize) -> Self {
        Self {
            fields: Vec::with_capacity(columns),
        }
    }

    /// Append the next column.
    pub fn push(&mut self, column: impl Into<String>, value: Option<String>) {
        self.fields.push((column.into(), value));
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(c, _)| c.as_str())
    }

    pub fn get(&self, column: &str) -> Option<Option<&str>> {
        self.fields
            .iter()
            .find(|(c, _)| c == column)
            .map(|(_, v)| v.as_deref())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Render as `col1=v1<sep>col2=v2<sep>`, each pair followed by `separator`.
    ///
    /// Values are written verbatim; a value containing `separator` is not escaped.
    pub fn to_log_line(&self, separator: &str) -> String {
        let mut line = String::new();
        for (column, value) in &self.fields {
            line.push_str(column);
            line.push('=');
            line.push_str(value.as_deref().unwrap_or(NULL_VALUE));
            line.push_str(separator);
        }
        line
    }
}

impl<C, V> FromIterator<(C, Option<V>)> for RowRecord
where
    C: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (C, Option<V>)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(c, v)| (c.into(), v.map(Into::into)))
                .collect(),
        }
    }
}

impl fmt::Display for RowRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_log_line(crate::redact::DEFAULT_SEPARATOR))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::redact::{redact, PII_FIELDS};

    fn sample() -> RowRecord {
        [
            ("name", Some("Marlene Wood")),
            ("email", Some("hwestiii@att.net")),
            ("phone", Some("(473) 401-4253")),
            ("ssn", Some("261-72-6780")),
            ("password", Some("K5?BMNv")),
            ("ip", Some("60ed:c396:2ff:244:bbd0:9208:26f2:93ea")),
            ("last_login", Some("2019-11-14 06:14:24")),
            ("user_agent", None),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_log_line_keeps_column_order() {
        let record = sample();
        assert_eq!(
            record.to_log_line(";"),
            "name=Marlene Wood;email=hwestiii@att.net;phone=(473) 401-4253;\
             ssn=261-72-6780;password=K5?BMNv;ip=60ed:c396:2ff:244:bbd0:9208:26f2:93ea;\
             last_login=2019-11-14 06:14:24;user_agent=NULL;"
        );
    }

    #[test]
    fn test_log_line_then_redact() {
        let line = sample().to_log_line(";");
        assert_eq!(
            redact(&PII_FIELDS, "***", &line, ";"),
            "name=***;email=***;phone=***;ssn=***;password=***;\
             ip=60ed:c396:2ff:244:bbd0:9208:26f2:93ea;last_login=2019-11-14 06:14:24;\
             user_agent=NULL;"
        );
    }

    #[test]
    fn test_empty_record() {
        let record = RowRecord::new();
        assert!(record.is_empty());
        assert_eq!(record.to_log_line(";"), "");
    }

    #[test]
    fn test_push_and_get() {
        let mut record = RowRecord::with_capacity(2);
        record.push("id", Some("7".to_string()));
        record.push("email", None);
        assert_eq!(record.len(), 2);
        assert_eq!(record.get("id"), Some(Some("7")));
        assert_eq!(record.get("email"), Some(None));
        assert_eq!(record.get("missing"), None);
        assert_eq!(record.columns().collect::<Vec<_>>(), ["id", "email"]);
        assert_eq!(record.to_string(), "id=7;email=NULL;");
    }
}
