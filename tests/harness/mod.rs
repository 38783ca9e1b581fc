// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: Apache-2.0

//! Test harness for contact form abuse simulation.
//!
//! Attack patterns are replayed against the limiter, validator and
//! notification saga with a manual clock, so pacing is simulated rather
//! than slept.

pub mod attacks;
pub mod generators;
pub mod metrics;
