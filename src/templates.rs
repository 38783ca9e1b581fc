// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! HTML bodies for the two notification emails.

use crate::locale::Language;
use crate::validator::ValidatedSubmission;
use chrono::{DateTime, Datelike, FixedOffset, Timelike, Utc};

const OWNER_NAME: &str = "Dan Ferrari";

/// Buenos Aires has no daylight saving, so a fixed offset is exact.
const BUENOS_AIRES_OFFSET_SECS: i32 = -3 * 3600;

const MONTHS_ES: [&str; 12] = [
    "enero",
    "febrero",
    "marzo",
    "abril",
    "mayo",
    "junio",
    "julio",
    "agosto",
    "septiembre",
    "octubre",
    "noviembre",
    "diciembre",
];

/// Rendered subject and HTML body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailContent {
    pub subject: String,
    pub html: String,
}

/// Notification sent to the site owner.
pub fn owner_notification(submission: &ValidatedSubmission, received_at: DateTime<Utc>) -> MailContent {
    let full_name = format!(
        "{} {}",
        escape_html(&submission.first_name),
        escape_html(&submission.last_name)
    );
    let email = escape_html(&submission.email);
    let phone = submission
        .phone_number
        .as_deref()
        .map(escape_html)
        .unwrap_or_else(|| "-".to_string());
    let message = escape_html(&submission.message);
    let received = format_received_at(received_at);

    let html = format!(
        r##"<div style="font-family: 'Roboto Mono', monospace; max-width: 600px; margin: 0 auto; background-color: #f8f9fa; padding: 20px; border-radius: 10px;">
  <div style="text-align: center; margin-bottom: 30px; background-color: #1a1a1a; padding: 20px; border-radius: 8px;">
    <h1 style="color: #5ad3bd; margin-bottom: 10px;">Nuevo mensaje de contacto</h1>
    <p style="color: #ffffffea; font-size: 16px;">Portfolio - {OWNER_NAME}</p>
  </div>
  <div style="background-color: white; padding: 25px; border-radius: 8px; border-left: 4px solid #5ad3bd; margin-bottom: 20px;">
    <h2 style="color: #333; margin-bottom: 20px; border-bottom: 2px solid #5ad3bd; padding-bottom: 10px;">Información del contacto</h2>
    <div style="margin-bottom: 15px;">
      <strong style="color: #459c8c;">Nombre:</strong>
      <span style="color: #333;">{full_name}</span>
    </div>
    <div style="margin-bottom: 15px;">
      <strong style="color: #459c8c;">Email:</strong>
      <a href="mailto:{email}" style="color: #007bff; text-decoration: none;">{email}</a>
    </div>
    <div style="margin-bottom: 20px;">
      <strong style="color: #459c8c;">Teléfono:</strong>
      <span style="color: #333;">{phone}</span>
    </div>
    <div style="border-top: 1px solid #eee; padding-top: 15px;">
      <strong style="color: #459c8c; display: block; margin-bottom: 10px;">Mensaje:</strong>
      <div style="background-color: #f8f9fa; padding: 15px; border-radius: 5px; color: #333; line-height: 1.6; white-space: pre-wrap;">{message}</div>
    </div>
  </div>
  <div style="text-align: center; padding: 15px; background-color: #e9ecef; border-radius: 8px; font-size: 14px; color: #6c757d;">
    <p style="margin: 0;">Recibido el {received}</p>
  </div>
</div>"##
    );

    MailContent {
        subject: format!(
            "Nuevo mensaje de contacto - {} {}",
            submission.first_name, submission.last_name
        ),
        html,
    }
}

/// Confirmation sent to the submitter, in their language.
pub fn submitter_confirmation(submission: &ValidatedSubmission) -> MailContent {
    let first = escape_html(&submission.first_name);
    let last = escape_html(&submission.last_name);

    let copy = match submission.language {
        Language::Es => ConfirmationCopy {
            subject: "¡Gracias por contactarme! - Dan Ferrari",
            greeting: "¡Hola",
            tagline: "Gracias por contactarme",
            heading: "Tu mensaje ha sido recibido",
            salutation: "Hola",
            received: "He recibido tu mensaje y me pondré en contacto contigo lo antes posible. Generalmente respondo dentro de las próximas 24-48 horas.",
            meanwhile: "Mientras tanto, puedes revisar algunos de mis proyectos en mi portfolio o conectar conmigo en LinkedIn.",
            role: "Desarrollador Full Stack",
            footer: "Este es un email automático, por favor no respondas a este mensaje.",
        },
        Language::En => ConfirmationCopy {
            subject: "Thanks for contacting me! - Dan Ferrari",
            greeting: "Hello",
            tagline: "Thanks for reaching out",
            heading: "Your message has been received",
            salutation: "Hi",
            received: "I've received your message and will get back to you as soon as possible. I typically respond within the next 24-48 hours.",
            meanwhile: "In the meantime, feel free to check out some of my projects in my portfolio or connect with me on LinkedIn.",
            role: "Full Stack Developer",
            footer: "This is an automated email, please do not reply to this message.",
        },
    };

    let html = format!(
        r##"<div style="font-family: 'Roboto Mono', monospace; max-width: 600px; margin: 0 auto; background-color: #1a1a1a; color: #ffffffea; padding: 20px; border-radius: 10px;">
  <div style="text-align: center; margin-bottom: 30px;">
    <h1 style="color: #5ad3bd; margin-bottom: 10px;">{greeting} {first}!</h1>
    <p style="color: #ffffffea; font-size: 16px;">{tagline}</p>
  </div>
  <div style="background-color: #2d2d2d; padding: 20px; border-radius: 8px; margin-bottom: 20px;">
    <h2 style="color: #5ad3bd; margin-bottom: 15px;">{heading}</h2>
    <p style="line-height: 1.6; margin-bottom: 15px;">{salutation} <strong>{first} {last}</strong>,</p>
    <p style="line-height: 1.6; margin-bottom: 15px;">{received}</p>
    <p style="line-height: 1.6;">{meanwhile}</p>
  </div>
  <div style="text-align: center; padding: 20px; border-top: 1px solid #459c8c;">
    <p style="margin-bottom: 10px;"><strong style="color: #5ad3bd;">{OWNER_NAME}</strong><br>{role}</p>
    <p style="font-size: 14px; color: #b0b0b0;">{footer}</p>
  </div>
</div>"##,
        greeting = copy.greeting,
        tagline = copy.tagline,
        heading = copy.heading,
        salutation = copy.salutation,
        received = copy.received,
        meanwhile = copy.meanwhile,
        role = copy.role,
        footer = copy.footer,
    );

    MailContent {
        subject: copy.subject.to_string(),
        html,
    }
}

struct ConfirmationCopy {
    subject: &'static str,
    greeting: &'static str,
    tagline: &'static str,
    heading: &'static str,
    salutation: &'static str,
    received: &'static str,
    meanwhile: &'static str,
    role: &'static str,
    footer: &'static str,
}

/// `19 de octubre de 2026, 11:05` in Buenos Aires time.
fn format_received_at(at: DateTime<Utc>) -> String {
    let local = match FixedOffset::east_opt(BUENOS_AIRES_OFFSET_SECS) {
        Some(offset) => at.with_timezone(&offset),
        None => at.fixed_offset(),
    };
    format!(
        "{} de {} de {}, {:02}:{:02}",
        local.day(),
        MONTHS_ES[local.month0() as usize],
        local.year(),
        local.hour(),
        local.minute()
    )
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn submission(language: Language) -> ValidatedSubmission {
        ValidatedSubmission {
            first_name: "Jane".to_string(),
            last_name: "Smith".to_string(),
            email: "jane@company.com".to_string(),
            phone_number: Some("+54 11 5555 5555".to_string()),
            message: "Hola, me interesa tu trabajo".to_string(),
            language,
        }
    }

    #[test]
    fn test_owner_notification() {
        let at = Utc.with_ymd_and_hms(2026, 10, 19, 14, 5, 0).unwrap();
        let mail = owner_notification(&submission(Language::En), at);

        assert_eq!(mail.subject, "Nuevo mensaje de contacto - Jane Smith");
        assert!(mail.html.contains("Jane Smith"));
        assert!(mail.html.contains("mailto:jane@company.com"));
        assert!(mail.html.contains("+54 11 5555 5555"));
        assert!(mail.html.contains("Recibido el 19 de octubre de 2026, 11:05"));
    }

    #[test]
    fn test_owner_notification_without_phone() {
        let mut sub = submission(Language::Es);
        sub.phone_number = None;
        let mail = owner_notification(&sub, Utc::now());
        assert!(mail.html.contains(r#"<span style="color: #333;">-</span>"#));
    }

    #[test]
    fn test_confirmation_language() {
        let es = submitter_confirmation(&submission(Language::Es));
        assert!(es.subject.contains("Gracias por contactarme"));
        assert!(es.html.contains("¡Hola Jane!"));

        let en = submitter_confirmation(&submission(Language::En));
        assert!(en.subject.contains("Thanks for contacting me"));
        assert!(en.html.contains("Hello Jane!"));
        assert!(en.html.contains("<strong>Jane Smith</strong>"));
    }

    #[test]
    fn test_user_values_are_escaped() {
        let mut sub = submission(Language::Es);
        sub.first_name = "<script>alert(1)</script>".to_string();
        sub.message = "a & b \"quoted\"".to_string();

        let mail = owner_notification(&sub, Utc::now());
        assert!(!mail.html.contains("<script>"));
        assert!(mail.html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
        assert!(mail.html.contains("a &amp; b &quot;quoted&quot;"));
    }

    #[test]
    fn test_received_at_crosses_midnight() {
        let at = Utc.with_ymd_and_hms(2026, 1, 1, 1, 30, 0).unwrap();
        assert_eq!(format_received_at(at), "31 de diciembre de 2025, 22:30");
    }
}
