//! Shared constants for end-to-end tests
//!
//! When the fixture dataset changes, update only this file and
//! `fixtures.rs`.

#![allow(dead_code)]

// ============================================================================
// Fixture Identifiers
// ============================================================================

pub const YEAR_2000: i64 = 2000;
pub const YEAR_2024: i64 = 2024;

pub const DTPCV3: &str = "DTPCV3";
pub const MCV2: &str = "MCV2";
pub const MEASLES: &str = "MEA";

pub const PHASE_DEVELOPING: i64 = 1;
pub const PHASE_ADVANCED: i64 = 4;

pub const ITALY_ID: &str = "ITA";
pub const ITALY_NAME: &str = "Italy";
pub const FRANCE_ID: &str = "FRA";
pub const FRANCE_NAME: &str = "France";
pub const NIGERIA_ID: &str = "NGA";
pub const NIGERIA_NAME: &str = "Nigeria";

// ============================================================================
// Expected Values
// ============================================================================

/// Measles cases of 2024 over the population of 2024, per 100k.
pub const MEASLES_2024_GLOBAL_AVERAGE: f64 = 20_900.0 * 100_000.0 / 320_000_000.0;

/// Italy's MCV2 doses per 100 population, 2024 minus 2000.
pub const ITALY_MCV2_IMPROVEMENT: f64 = 30.0;

// ============================================================================
// Timeouts
// ============================================================================

/// Maximum time to wait for server to become ready
pub const SERVER_READY_TIMEOUT_MS: u64 = 5000;

/// HTTP request timeout for test client
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Interval between server readiness checks
pub const SERVER_READY_POLL_INTERVAL_MS: u64 = 50;
