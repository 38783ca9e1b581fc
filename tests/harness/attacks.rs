// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: Apache-2.0

//! Attack simulation patterns for security testing.

use std::time::Duration;

/// Shape of the form bodies an attack posts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Payload {
    /// Well-formed submissions from real-looking addresses
    Valid,
    /// Required fields left out or blank
    MissingFields,
    /// CRLF sequences smuggled into the email field
    HeaderInjection,
    /// Addresses on blocklisted domains
    BlockedDomain,
    /// Mixed-case or padded addresses
    NonCanonical,
}

/// Attack pattern configuration.
#[derive(Debug, Clone)]
pub struct AttackConfig {
    /// Total number of submissions to send
    pub total_requests: usize,
    /// Submissions per second, in simulated time
    pub requests_per_second: f64,
    /// Number of distinct client identifiers
    pub unique_clients: usize,
    /// What each submission carries
    pub payload: Payload,
}

impl Default for AttackConfig {
    fn default() -> Self {
        Self {
            total_requests: 100,
            requests_per_second: 10.0,
            unique_clients: 1,
            payload: Payload::Valid,
        }
    }
}

/// Predefined attack patterns.
impl AttackConfig {
    /// One client hammering the form.
    pub fn single_client_flood() -> Self {
        Self {
            total_requests: 200,
            requests_per_second: 10.0,
            unique_clients: 1,
            ..Default::default()
        }
    }

    /// Many clients, ten submissions each.
    pub fn distributed_flood() -> Self {
        Self {
            total_requests: 1000,
            requests_per_second: 50.0,
            unique_clients: 100,
            ..Default::default()
        }
    }

    /// One submission per client with a CRLF-laden email.
    pub fn header_injection() -> Self {
        Self {
            total_requests: 50,
            requests_per_second: 10.0,
            unique_clients: 50,
            payload: Payload::HeaderInjection,
        }
    }

    /// Confirmation-mail spam aimed at blocklisted domains.
    pub fn blocked_domain_spam() -> Self {
        Self {
            total_requests: 50,
            requests_per_second: 10.0,
            unique_clients: 10,
            payload: Payload::BlockedDomain,
        }
    }

    /// Incomplete forms from a handful of clients.
    pub fn missing_fields_spam() -> Self {
        Self {
            total_requests: 50,
            requests_per_second: 10.0,
            unique_clients: 5,
            payload: Payload::MissingFields,
        }
    }

    /// Case and whitespace variants of real addresses.
    pub fn non_canonical_spam() -> Self {
        Self {
            total_requests: 40,
            requests_per_second: 5.0,
            unique_clients: 40,
            payload: Payload::NonCanonical,
        }
    }

    /// One submission every fifteen minutes, under the hourly quota.
    pub fn slow_drip() -> Self {
        Self {
            total_requests: 20,
            requests_per_second: 1.0 / 900.0,
            unique_clients: 1,
            ..Default::default()
        }
    }

    /// Simulated time between consecutive submissions.
    pub fn spacing(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.requests_per_second)
    }

    /// Calculate simulated duration of the attack.
    pub fn expected_duration(&self) -> Duration {
        Duration::from_secs_f64(self.total_requests as f64 / self.requests_per_second)
    }
}

/// Expected outcomes for different attack types.
pub struct AttackExpectations {
    /// Maximum number of submissions that may reach the mailer
    pub max_allowed: usize,
    /// Description of expected behavior
    pub description: &'static str,
}

impl AttackConfig {
    /// Get expected outcomes for this attack pattern, given the quota.
    pub fn expectations(&self, quota: usize) -> AttackExpectations {
        if self.payload != Payload::Valid {
            return AttackExpectations {
                max_allowed: 0,
                description: "Every submission should fail validation or the quota",
            };
        }

        let per_client = self.total_requests.div_ceil(self.unique_clients);
        let window_secs = 3600.0;
        let per_window = (window_secs * self.requests_per_second).ceil() as usize;

        if per_window <= quota {
            AttackExpectations {
                max_allowed: self.total_requests,
                description: "Paced submissions stay under the quota",
            }
        } else {
            AttackExpectations {
                max_allowed: self.unique_clients * per_client.min(quota),
                description: "Each client is capped at the hourly quota",
            }
        }
    }
}
