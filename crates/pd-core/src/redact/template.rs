//! `%(key)s`-style message templates.
//!
//! Supported placeholders are `%(name)s`, `%(levelname)s`, `%(asctime)s` and
//! `%(message)s`. A placeholder may carry a minimum width, right-aligned by
//! default or left-aligned with `-` (`%(asctime)-15s`). `%%` is a literal `%`.
//! Templates are validated once when parsed, so rendering cannot fail.

use std::borrow::Cow;
use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

static PLACEHOLDER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"%(?:(%)|\(([^)]*)\)(-?)([0-9]*)([A-Za-z]?))").unwrap());

/// Widths beyond this are clamped.
const MAX_WIDTH: usize = 4096;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemplateError {
    #[error("Unknown template key: {0}")]
    UnknownKey(String),
    #[error("Unsupported conversion '{conversion}' for key {key}, only 's' is supported")]
    UnsupportedConversion { key: String, conversion: String },
    #[error("Stray '%' at byte {0}")]
    Malformed(usize),
}

/// Event attribute a placeholder refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Name,
    LevelName,
    AscTime,
    Message,
}

impl Field {
    fn from_key(key: &str) -> Option<Self> {
        match key {
            "name" => Some(Self::Name),
            "levelname" => Some(Self::LevelName),
            "asctime" => Some(Self::AscTime),
            "message" => Some(Self::Message),
            _ => None,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Name => "name",
            Self::LevelName => "levelname",
            Self::AscTime => "asctime",
            Self::Message => "message",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Piece {
    Literal(String),
    Placeholder {
        field: Field,
        width: usize,
        left_align: bool,
    },
}

/// A parsed template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    source: String,
    pieces: Vec<Piece>,
}

impl Template {
    pub fn parse(source: &str) -> Result<Self, TemplateError> {
        let mut pieces = Vec::new();
        let mut literal = String::new();
        let mut last = 0;

        for caps in PLACEHOLDER_RE.captures_iter(source) {
            let whole = caps.get(0).expect("group 0 always matches");
            push_literal(&mut literal, source, last, whole.start())?;
            last = whole.end();

            if caps.get(1).is_some() {
                literal.push('%');
                continue;
            }

            let key = &caps[2];
            let field =
                Field::from_key(key).ok_or_else(|| TemplateError::UnknownKey(key.to_string()))?;
            let conversion = &caps[5];
            if conversion != "s" {
                return Err(TemplateError::UnsupportedConversion {
                    key: key.to_string(),
                    conversion: conversion.to_string(),
                });
            }
            let width = match &caps[4] {
                "" => 0,
                digits => digits.parse::<usize>().map_or(MAX_WIDTH, |w| w.min(MAX_WIDTH)),
            };

            if !literal.is_empty() {
                pieces.push(Piece::Literal(std::mem::take(&mut literal)));
            }
            pieces.push(Piece::Placeholder {
                field,
                width,
                left_align: !caps[3].is_empty(),
            });
        }

        push_literal(&mut literal, source, last, source.len())?;
        if !literal.is_empty() {
            pieces.push(Piece::Literal(literal));
        }

        Ok(Self {
            source: source.to_string(),
            pieces,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Whether the template references `field` at all.
    pub fn uses(&self, field: Field) -> bool {
        self.pieces
            .iter()
            .any(|p| matches!(p, Piece::Placeholder { field: f, .. } if *f == field))
    }

    /// Render the template, asking `value` for each placeholder's text.
    pub fn render<'a, F>(&self, mut value: F) -> String
    where
        F: FnMut(Field) -> Cow<'a, str>,
    {
        let mut out = String::with_capacity(self.source.len() + 64);
        for piece in &self.pieces {
            match piece {
                Piece::Literal(text) => out.push_str(text),
                Piece::Placeholder {
                    field,
                    width,
                    left_align,
                } => {
                    let text = value(*field);
                    let pad = width.saturating_sub(text.chars().count());
                    if *left_align {
                        out.push_str(&text);
                        out.extend(std::iter::repeat(' ').take(pad));
                    } else {
                        out.extend(std::iter::repeat(' ').take(pad));
                        out.push_str(&text);
                    }
                }
            }
        }
        out
    }
}

/// Append `source[start..end]` to `literal`, refusing any unmatched `%`.
fn push_literal(
    literal: &mut String,
    source: &str,
    start: usize,
    end: usize,
) -> Result<(), TemplateError> {
    let text = &source[start..end];
    if let Some(offset) = text.find('%') {
        return Err(TemplateError::Malformed(start + offset));
    }
    literal.push_str(text);
    Ok(())
}
