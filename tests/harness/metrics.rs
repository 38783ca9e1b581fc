// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Metrics collection for attack simulation results.

use std::collections::HashMap;

/// Collects metrics during attack simulation.
#[derive(Debug, Default)]
pub struct AttackMetrics {
    /// Count of submissions by outcome
    outcomes: HashMap<Outcome, usize>,
    /// Count of submissions by client
    requests_per_client: HashMap<String, usize>,
    /// Emails handed to the dispatcher
    emails_sent: usize,
}

/// Possible outcomes for a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    Allowed,
    RateLimited,
    MissingFields,
    InvalidEmailFormat,
    InvalidEmailCharacters,
    BlockedDomain,
}

impl Outcome {
    /// Map a validator rejection code to an outcome.
    pub fn from_code(code: &str) -> Self {
        match code {
            "missing_fields" => Outcome::MissingFields,
            "invalid_email_format" => Outcome::InvalidEmailFormat,
            "invalid_email_characters" => Outcome::InvalidEmailCharacters,
            "blocked_domain" => Outcome::BlockedDomain,
            other => panic!("unexpected rejection code {other}"),
        }
    }

    pub fn is_validation_failure(&self) -> bool {
        !matches!(self, Outcome::Allowed | Outcome::RateLimited)
    }
}

impl AttackMetrics {
    /// Create a new metrics collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a submission outcome.
    pub fn record(&mut self, outcome: Outcome, client: &str) {
        *self.outcomes.entry(outcome).or_insert(0) += 1;
        *self.requests_per_client.entry(client.to_string()).or_insert(0) += 1;
    }

    /// Record emails that reached the dispatcher.
    pub fn record_sent(&mut self, count: usize) {
        self.emails_sent += count;
    }

    /// Get total submission count.
    pub fn total_requests(&self) -> usize {
        self.outcomes.values().sum()
    }

    /// Get count for a specific outcome.
    pub fn count(&self, outcome: Outcome) -> usize {
        self.outcomes.get(&outcome).copied().unwrap_or(0)
    }

    /// Get block rate (ratio of blocked to total).
    pub fn block_rate(&self) -> f64 {
        let total = self.total_requests();
        if total == 0 {
            return 0.0;
        }
        let allowed = self.count(Outcome::Allowed);
        (total - allowed) as f64 / total as f64
    }

    /// Get number of unique clients that submitted.
    pub fn unique_clients(&self) -> usize {
        self.requests_per_client.len()
    }

    /// Generate a summary report.
    pub fn report(&self) -> MetricsReport {
        MetricsReport {
            total_requests: self.total_requests(),
            allowed: self.count(Outcome::Allowed),
            rate_limited: self.count(Outcome::RateLimited),
            validation_failed: self
                .outcomes
                .iter()
                .filter(|(outcome, _)| outcome.is_validation_failure())
                .map(|(_, n)| n)
                .sum(),
            emails_sent: self.emails_sent,
            block_rate: self.block_rate(),
            unique_clients: self.unique_clients(),
        }
    }
}

/// Summary report of attack metrics.
#[derive(Debug, Clone)]
pub struct MetricsReport {
    pub total_requests: usize,
    pub allowed: usize,
    pub rate_limited: usize,
    pub validation_failed: usize,
    pub emails_sent: usize,
    pub block_rate: f64,
    pub unique_clients: usize,
}

impl std::fmt::Display for MetricsReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "{} submissions from {} clients: {} allowed, {} rate limited, {} invalid ({:.1}% blocked), {} emails sent",
            self.total_requests,
            self.unique_clients,
            self.allowed,
            self.rate_limited,
            self.validation_failed,
            self.block_rate * 100.0,
            self.emails_sent
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_collection() {
        let mut metrics = AttackMetrics::new();
        metrics.record(Outcome::Allowed, "10.0.0.1");
        metrics.record(Outcome::BlockedDomain, "10.0.0.1");
        metrics.record(Outcome::RateLimited, "10.0.0.2");
        metrics.record_sent(2);

        let report = metrics.report();
        assert_eq!(report.total_requests, 3);
        assert_eq!(report.allowed, 1);
        assert_eq!(report.rate_limited, 1);
        assert_eq!(report.validation_failed, 1);
        assert_eq!(report.emails_sent, 2);
        assert_eq!(report.unique_clients, 2);
    }

    #[test]
    fn test_block_rate() {
        let mut metrics = AttackMetrics::new();
        for _ in 0..3 {
            metrics.record(Outcome::Allowed, "10.0.0.1");
        }
        for _ in 0..7 {
            metrics.record(Outcome::RateLimited, "10.0.0.1");
        }

        assert!((metrics.block_rate() - 0.7).abs() < 0.01);
    }
}
