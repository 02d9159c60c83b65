//! Core of the personal-data tools: bcrypt credential hashing and PII redaction
//! for `key=value` log lines.

pub mod logger;
pub mod password;
pub mod record;
pub mod redact;

pub use logger::{user_data_logger, InMemorySink, LogSink, NullSink, RedactingLogger, StreamSink};
pub use password::{hash_password, verify_password, Credential, PasswordError};
pub use record::RowRecord;
pub use redact::{
    redact, Level, LogEvent, RedactingFormatter, RedactionSpec, DEFAULT_SEPARATOR, DEFAULT_TOKEN,
    PII_FIELDS,
};
