//! Input validation for registry writes.
//!
//! # Invariants
//! - Names and urls never contain whitespace: commands arrive
//!   whitespace-tokenized, so such a value could never be addressed again.
//! - Length caps mirror the `VARCHAR` widths of the schema.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub const MAX_NAME_CHARS: usize = 255;
pub const MAX_URL_CHARS: usize = 1023;

/// Rejected registry input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    Empty { field: &'static str },
    ContainsWhitespace { field: &'static str, value: String },
    TooLong { field: &'static str, max_chars: usize },
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty { field } => write!(f, "{field} cannot be empty"),
            Self::ContainsWhitespace { field, value } => {
                write!(f, "{field} `{value}` cannot contain whitespace")
            }
            Self::TooLong { field, max_chars } => {
                write!(f, "{field} is longer than {max_chars} characters")
            }
        }
    }
}

impl Error for ValidationError {}

/// Trims and checks a resource or team name.
pub fn normalize_name(field: &'static str, value: &str) -> Result<String, ValidationError> {
    normalize_token(field, value, MAX_NAME_CHARS)
}

/// Trims and checks a resource url.
pub fn normalize_url(value: &str) -> Result<String, ValidationError> {
    normalize_token("url", value, MAX_URL_CHARS)
}

fn normalize_token(
    field: &'static str,
    value: &str,
    max_chars: usize,
) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Empty { field });
    }
    if trimmed.chars().any(char::is_whitespace) {
        return Err(ValidationError::ContainsWhitespace {
            field,
            value: trimmed.to_string(),
        });
    }
    if trimmed.chars().count() > max_chars {
        return Err(ValidationError::TooLong { field, max_chars });
    }
    Ok(trimmed.to_string())
}
