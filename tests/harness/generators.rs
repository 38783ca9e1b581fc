// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: Apache-2.0

//! Test data generators for attack simulation.

use contact_mailer::validator::ContactSubmission;
use std::net::{IpAddr, Ipv4Addr};

/// Generate a pool of client identifiers, as forwarded-for values.
pub fn generate_clients(count: usize) -> Vec<String> {
    (0..count)
        .map(|i| {
            // Use 10.x.x.x private range
            let a = ((i >> 16) & 0xFF) as u8;
            let b = ((i >> 8) & 0xFF) as u8;
            let c = (i & 0xFF) as u8;
            IpAddr::V4(Ipv4Addr::new(10, a, b, c)).to_string()
        })
        .collect()
}

/// A complete submission with the given email.
pub fn submission(index: usize, email: &str) -> ContactSubmission {
    ContactSubmission {
        first_name: Some(format!("Visitor{index}")),
        last_name: Some("Doe".to_string()),
        email: Some(email.to_string()),
        phone_number: None,
        message: Some(format!("Message number {index}")),
        language: Some(if index % 2 == 0 { "es" } else { "en" }.to_string()),
    }
}

/// Well-formed submissions from distinct real-looking senders.
pub fn generate_valid(count: usize) -> Vec<ContactSubmission> {
    (0..count)
        .map(|i| submission(i, &format!("visitor{}@company-{}.io", i, i % 7)))
        .collect()
}

/// Submissions with at least one required field missing or blank.
pub fn generate_incomplete(count: usize) -> Vec<ContactSubmission> {
    (0..count)
        .map(|i| {
            let mut s = submission(i, "visitor@company.io");
            match i % 5 {
                0 => s.first_name = None,
                1 => s.last_name = Some(String::new()),
                2 => s.email = None,
                3 => s.message = Some(String::new()),
                _ => {
                    s.first_name = None;
                    s.message = None;
                }
            }
            s
        })
        .collect()
}

/// Email values that try to append headers to the outgoing message.
pub fn generate_header_injections() -> Vec<&'static str> {
    vec![
        "victim@corp.io\r\nBcc: list@spam.io",
        "victim@corp.io\nCc: list@spam.io",
        "victim@corp.io\r\nSubject: win",
        "victim@corp.io%0d%0aBcc:list@spam.io\r\n",
        "\r\nBcc: list@spam.io",
        "victim@corp.io\r\n\r\n<html>",
    ]
}

/// Addresses whose domain is blocklisted.
pub fn generate_blocked_addresses() -> Vec<&'static str> {
    vec![
        "test@example.com",
        "spam@test.com",
        "mailer@test.com",
        "a@example.com",
        "bot@test.com",
    ]
}

/// Addresses that differ from their canonical form.
pub fn generate_non_canonical() -> Vec<&'static str> {
    vec![
        "Visitor@Company.io",
        "VISITOR@COMPANY.IO",
        " visitor@company.io",
        "visitor@company.io ",
        "  Foo@Bar.com ",
    ]
}

/// Email variations paired with the rejection code they should produce,
/// or `None` when they should be accepted.
pub fn generate_email_variations() -> Vec<(&'static str, Option<&'static str>)> {
    vec![
        // Accepted
        ("john@validcompany.com", None),
        ("first.last+tag@mail.co.uk", None),
        ("user@sub.example.com", None),
        ("a@b.c.", None),
        // Shape
        ("", Some("missing_fields")),
        ("plainaddress", Some("invalid_email_format")),
        ("@company.io", Some("invalid_email_format")),
        ("user@", Some("invalid_email_format")),
        ("user@company", Some("invalid_email_format")),
        ("user@@company.io", Some("invalid_email_format")),
        ("us er@company.io", Some("invalid_email_format")),
        ("user@.io", Some("invalid_email_format")),
        ("user@localhost", Some("invalid_email_format")),
        // Canonical form
        ("User@company.io", Some("invalid_email_characters")),
        (" user@company.io", Some("invalid_email_characters")),
        ("\u{feff}user@company.io", Some("invalid_email_characters")),
        ("user@com\u{feff}pany.io", Some("invalid_email_format")),
        // Blocklist
        ("user@example.com", Some("blocked_domain")),
        ("user@EXAMPLE.com", Some("invalid_email_characters")),
        ("user@test.com", Some("blocked_domain")),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_clients() {
        let clients = generate_clients(256);
        assert_eq!(clients.len(), 256);
        // All should be unique
        let unique: std::collections::HashSet<_> = clients.iter().collect();
        assert_eq!(unique.len(), 256);
    }

    #[test]
    fn test_generate_incomplete() {
        let forms = generate_incomplete(10);
        assert_eq!(forms.len(), 10);
        assert!(forms[0].first_name.is_none());
    }
}
