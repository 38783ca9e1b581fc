// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Sliding window log rate limiter for contact submissions.
//!
//! Each client identifier owns a log of the instants at which it was
//! admitted. On every check the log is pruned to the trailing window and
//! the attempt is admitted only while fewer than `limit` entries remain.
//! Rejected attempts are never recorded, so hammering the endpoint does
//! not extend a client's lockout.

use crate::clock::{Clock, SystemClock};
use crate::config::RateLimitConfig;
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::debug;

/// Result of a rate limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitResult {
    /// Request is allowed
    Allowed {
        /// Admissions left in the current window
        remaining: u32,
    },
    /// Request is rate limited
    Limited {
        /// Time until the oldest admission leaves the window
        retry_after: Duration,
    },
}

impl RateLimitResult {
    pub fn is_allowed(&self) -> bool {
        matches!(self, RateLimitResult::Allowed { .. })
    }
}

/// Admission control keyed by client identifier.
///
/// The HTTP layer only sees this trait, so the in-memory store can be
/// replaced by a shared one without touching handlers.
#[async_trait]
pub trait AdmissionControl: Send + Sync {
    /// Check and, when admitted, record one attempt for `identifier`.
    async fn admit(&self, identifier: &str, limit: u32, window: Duration) -> RateLimitResult;

    /// Boolean form of [`AdmissionControl::admit`].
    async fn try_admit(&self, identifier: &str, limit: u32, window: Duration) -> bool {
        self.admit(identifier, limit, window).await.is_allowed()
    }
}

/// In-memory sliding window limiter.
pub struct SlidingWindowLimiter {
    clock: Arc<dyn Clock>,
    windows: Mutex<HashMap<String, VecDeque<Instant>>>,
}

impl SlidingWindowLimiter {
    /// Create a limiter reading wall-clock time.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Create a limiter with an explicit time source.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            windows: Mutex::new(HashMap::new()),
        }
    }

    /// Check `identifier` against the configured default policy.
    pub async fn check(&self, identifier: &str, config: &RateLimitConfig) -> RateLimitResult {
        self.admit(identifier, config.max_requests, config.window())
            .await
    }

    /// Number of admissions for `identifier` still inside `window`.
    pub async fn recorded(&self, identifier: &str, window: Duration) -> usize {
        let now = self.clock.now();
        let windows = self.windows.lock().await;
        windows
            .get(identifier)
            .map(|log| log.iter().filter(|t| in_window(now, **t, window)).count())
            .unwrap_or(0)
    }

    /// Number of tracked client identifiers.
    pub async fn tracked_clients(&self) -> usize {
        self.windows.lock().await.len()
    }

    /// Drop clients whose log has nothing left inside `window`.
    pub async fn cleanup(&self, window: Duration) {
        let now = self.clock.now();
        let mut windows = self.windows.lock().await;
        let before = windows.len();
        windows.retain(|_, log| {
            prune(log, now, window);
            !log.is_empty()
        });
        let evicted = before - windows.len();
        if evicted > 0 {
            debug!(evicted, remaining = windows.len(), "Evicted idle rate limit entries");
        }
    }
}

impl Default for SlidingWindowLimiter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AdmissionControl for SlidingWindowLimiter {
    async fn admit(&self, identifier: &str, limit: u32, window: Duration) -> RateLimitResult {
        let now = self.clock.now();

        // One lock spans prune, count and append for every identifier.
        let mut windows = self.windows.lock().await;
        let log = windows.entry(identifier.to_string()).or_default();
        prune(log, now, window);

        let count = log.len();
        if count >= limit as usize {
            let retry_after = log
                .front()
                .map(|oldest| window.saturating_sub(now.saturating_duration_since(*oldest)))
                .unwrap_or(window);
            debug!(identifier, count, limit, ?retry_after, "Client over quota");
            return RateLimitResult::Limited { retry_after };
        }

        log.push_back(now);
        RateLimitResult::Allowed {
            remaining: limit - (count as u32 + 1),
        }
    }
}

fn in_window(now: Instant, at: Instant, window: Duration) -> bool {
    now.saturating_duration_since(at) < window
}

/// Remove entries that fell out of the trailing window. The log is kept
/// in admission order, so expired entries are always at the front.
fn prune(log: &mut VecDeque<Instant>, now: Instant, window: Duration) {
    while let Some(oldest) = log.front() {
        if in_window(now, *oldest, window) {
            break;
        }
        log.pop_front();
    }
}
