// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Prometheus metrics for contact submissions.

use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounterVec, Opts, Registry, TextEncoder,
};

/// Outcome label values for `contact_submissions_total`.
pub mod outcome {
    pub const ACCEPTED: &str = "accepted";
    pub const RATE_LIMITED: &str = "rate_limited";
    pub const MALFORMED: &str = "malformed";
    pub const DISPATCH_FAILED: &str = "dispatch_failed";
}

/// Service metrics and the registry that owns them.
#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    pub submissions: IntCounterVec,
    pub dispatch_failures: IntCounterVec,
    pub dispatch_duration: Histogram,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let submissions = IntCounterVec::new(
            Opts::new(
                "contact_submissions_total",
                "Contact form submissions by outcome",
            ),
            &["outcome"],
        )?;
        let dispatch_failures = IntCounterVec::new(
            Opts::new(
                "contact_dispatch_failures_total",
                "Notification dispatch failures by saga step",
            ),
            &["step"],
        )?;
        let dispatch_duration = Histogram::with_opts(
            HistogramOpts::new(
                "contact_dispatch_duration_seconds",
                "Time to verify the transport and send both notifications",
            )
            .buckets(vec![0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
        )?;

        registry.register(Box::new(submissions.clone()))?;
        registry.register(Box::new(dispatch_failures.clone()))?;
        registry.register(Box::new(dispatch_duration.clone()))?;

        Ok(Self {
            registry,
            submissions,
            dispatch_failures,
            dispatch_duration,
        })
    }

    /// Count a submission under `outcome`.
    pub fn record(&self, outcome: &str) {
        self.submissions.with_label_values(&[outcome]).inc();
    }

    /// Render all metrics in the Prometheus text format.
    pub fn render(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}
