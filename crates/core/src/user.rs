//! User records and their field validation.

use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

use crate::limits::EMAIL_PATTERN;

/// Compiled email regex (lazy initialization).
static EMAIL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(EMAIL_PATTERN).expect("invalid email pattern"));

/// Returns true if `email` matches `localpart@domain.tld`.
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_REGEX.is_match(email)
}

/// Why a set of row values could not become a [`UserRecord`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordRejection {
    /// At least one of the four values was blank after trimming.
    EmptyRequiredField,
    /// The email did not match [`EMAIL_PATTERN`].
    InvalidEmail(String),
}

impl RecordRejection {
    /// Human readable cause, as reported in row errors.
    pub fn message(&self) -> String {
        match self {
            Self::EmptyRequiredField => "Row contains empty required fields".to_string(),
            Self::InvalidEmail(email) => format!("Invalid email format: {}", email),
        }
    }
}

/// A validated user imported from a CSV row.
///
/// Immutable once built; a later record with the same id replaces it wholesale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    id: String,
    first_name: String,
    last_name: String,
    email: String,
}

impl UserRecord {
    /// Builds a record from raw column values.
    ///
    /// Values are trimmed. Blank values are rejected before the email is checked.
    pub fn from_columns(
        id: &str,
        first_name: &str,
        last_name: &str,
        email: &str,
    ) -> Result<Self, RecordRejection> {
        let (id, first_name, last_name, email) =
            (id.trim(), first_name.trim(), last_name.trim(), email.trim());

        if id.is_empty() || first_name.is_empty() || last_name.is_empty() || email.is_empty() {
            return Err(RecordRejection::EmptyRequiredField);
        }

        if !is_valid_email(email) {
            return Err(RecordRejection::InvalidEmail(email.to_string()));
        }

        Ok(Self {
            id: id.to_string(),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            email: email.to_string(),
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    pub fn email(&self) -> &str {
        &self.email
    }
}
