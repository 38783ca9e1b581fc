// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Contact Mailer
//!
//! Backend for a portfolio contact form. Each accepted submission sends
//! two emails: a notification to the site owner and a confirmation to the
//! submitter. Submissions pass through:
//!
//! - Per-client sliding window rate limiting (5 per hour default)
//! - Required field checks
//! - Email shape and canonical-form checks
//! - Email domain blocklist

pub mod clock;
pub mod config;
pub mod handlers;
pub mod limiter;
pub mod locale;
pub mod mailer;
pub mod metrics;
pub mod templates;
pub mod validator;

pub use config::Config;
pub use limiter::{AdmissionControl, RateLimitResult, SlidingWindowLimiter};
pub use mailer::{MailDispatcher, NotificationSaga};
pub use validator::{validate, ContactSubmission, ValidationError, ValidationResult};
