// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Contact form validator.
//!
//! Rules run in a fixed order and the first failure wins:
//! - Required fields present and non-empty
//! - Email shape `local@domain.tld`
//! - Email already in canonical (trimmed, lowercase) form
//! - Email domain not on the blocklist

use crate::locale::Language;
use axum::http::StatusCode;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

/// Domains that never receive a confirmation email.
pub const BLOCKED_DOMAINS: &[&str] = &["example.com", "test.com", "localhost"];

/// Raw contact form body as posted by the portfolio frontend.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactSubmission {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
}

impl ContactSubmission {
    /// Resolved submitter language.
    pub fn language(&self) -> Language {
        Language::resolve(self.language.as_deref())
    }
}

/// A submission that passed every rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedSubmission {
    pub first_name: String,
    pub last_name: String,
    /// Canonical email; the only address downstream dispatch may use.
    pub email: String,
    pub phone_number: Option<String>,
    pub message: String,
    pub language: Language,
}

/// Validation error types.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Missing required fields")]
    MissingFields,

    #[error("Invalid email format")]
    InvalidEmailFormat,

    #[error("Email is not in canonical form")]
    InvalidEmailCharacters,

    #[error("Email domain is blocked")]
    BlockedDomain,
}

impl ValidationError {
    /// Stable machine-readable reason.
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingFields => "missing_fields",
            Self::InvalidEmailFormat => "invalid_email_format",
            Self::InvalidEmailCharacters => "invalid_email_characters",
            Self::BlockedDomain => "blocked_domain",
        }
    }

    /// HTTP status the rejection maps to.
    pub fn status(&self) -> StatusCode {
        StatusCode::BAD_REQUEST
    }

    /// Client-facing message.
    pub fn message(&self, language: Language) -> &'static str {
        match (self, language) {
            (Self::MissingFields, Language::Es) => {
                "Todos los campos requeridos deben estar completos"
            }
            (Self::MissingFields, Language::En) => "All required fields must be filled in",
            (Self::InvalidEmailFormat, Language::Es) => "El formato del email no es válido",
            (Self::InvalidEmailFormat, Language::En) => "The email format is not valid",
            (Self::InvalidEmailCharacters, Language::Es) => {
                "El email contiene caracteres no válidos"
            }
            (Self::InvalidEmailCharacters, Language::En) => {
                "The email contains invalid characters"
            }
            (Self::BlockedDomain, Language::Es) => "Dominio de email no permitido",
            (Self::BlockedDomain, Language::En) => "Email domain not allowed",
        }
    }
}

/// Result of validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationResult {
    /// Submission is well-formed
    Accepted(ValidatedSubmission),
    /// Submission broke a rule
    Rejected(ValidationError),
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationResult::Accepted(_))
    }

    pub fn error(&self) -> Option<&ValidationError> {
        match self {
            ValidationResult::Accepted(_) => None,
            ValidationResult::Rejected(e) => Some(e),
        }
    }
}

/// Validate a contact submission.
pub fn validate(submission: &ContactSubmission) -> ValidationResult {
    let (Some(first_name), Some(last_name), Some(email), Some(message)) = (
        present(&submission.first_name),
        present(&submission.last_name),
        present(&submission.email),
        present(&submission.message),
    ) else {
        debug!("Missing required field");
        return ValidationResult::Rejected(ValidationError::MissingFields);
    };

    // Surrounding whitespace is left for the canonical-form rule to report.
    if !has_email_shape(email.trim_matches(js_whitespace)) {
        debug!(email = %email, "Email shape rejected");
        return ValidationResult::Rejected(ValidationError::InvalidEmailFormat);
    }

    let sanitized = sanitize_email(email);
    if sanitized != email {
        debug!(email = %email, "Email not in canonical form");
        return ValidationResult::Rejected(ValidationError::InvalidEmailCharacters);
    }

    if let Some(domain) = email_domain(&sanitized) {
        if BLOCKED_DOMAINS.contains(&domain) {
            debug!(domain = %domain, "Blocked email domain");
            return ValidationResult::Rejected(ValidationError::BlockedDomain);
        }
    }

    ValidationResult::Accepted(ValidatedSubmission {
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
        email: sanitized,
        phone_number: present(&submission.phone_number).map(str::to_string),
        message: message.to_string(),
        language: submission.language(),
    })
}

/// Lowercased, trimmed form of an email address.
pub fn sanitize_email(email: &str) -> String {
    email.to_lowercase().trim_matches(js_whitespace).to_string()
}

/// Domain part after the last `@`.
pub fn email_domain(email: &str) -> Option<&str> {
    email.rsplit_once('@').map(|(_, domain)| domain)
}

/// Whitespace as browsers see it in `\s` and `String.prototype.trim`:
/// includes the byte order mark, excludes NEL (U+0085).
fn js_whitespace(c: char) -> bool {
    matches!(
        c,
        '\t' | '\n'
            | '\u{000B}'
            | '\u{000C}'
            | '\r'
            | ' '
            | '\u{00A0}'
            | '\u{1680}'
            | '\u{2000}'..='\u{200A}'
            | '\u{2028}'
            | '\u{2029}'
            | '\u{202F}'
            | '\u{205F}'
            | '\u{3000}'
            | '\u{FEFF}'
    )
}

fn present(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|v| !v.is_empty())
}

/// Match `^[^\s@]+@[^\s@]+\.[^\s@]+$`.
///
/// The whole string must be free of whitespace and hold exactly one `@`;
/// the part after it needs some dot with at least one character on each
/// side of it.
fn has_email_shape(email: &str) -> bool {
    if email.chars().any(js_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    domain
        .char_indices()
        .any(|(i, c)| c == '.' && i > 0 && i + 1 < domain.len())
}
