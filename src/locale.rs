// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Submitter language and the client-facing messages that depend on it.

use serde::Serialize;

/// Language of the submitter confirmation and of response messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Es,
    En,
}

impl Language {
    /// Resolve an optional locale tag. Unknown or missing tags fall back
    /// to the default language instead of failing.
    pub fn resolve(tag: Option<&str>) -> Self {
        match tag.map(|t| t.trim().to_ascii_lowercase()).as_deref() {
            Some("en") => Language::En,
            _ => Language::Es,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Language::Es => "es",
            Language::En => "en",
        }
    }

    pub fn submission_accepted(&self) -> &'static str {
        match self {
            Language::Es => "Emails enviados correctamente",
            Language::En => "Emails sent successfully",
        }
    }

    pub fn rate_limited(&self) -> &'static str {
        match self {
            Language::Es => "Demasiadas solicitudes. Intenta de nuevo en una hora.",
            Language::En => "Too many requests. Please try again in an hour.",
        }
    }

    pub fn dispatch_failed(&self) -> &'static str {
        match self {
            Language::Es => "Error interno del servidor al enviar el email",
            Language::En => "Internal server error while sending the email",
        }
    }

    pub fn malformed_body(&self) -> &'static str {
        match self {
            Language::Es => "El cuerpo de la solicitud no es válido",
            Language::En => "The request body is not valid",
        }
    }

    pub fn method_not_allowed(&self) -> &'static str {
        match self {
            Language::Es => "Método no permitido",
            Language::En => "Method not allowed",
        }
    }
}
