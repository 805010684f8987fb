//! Shared constants for end-to-end tests
//!
//! When fixture data changes, update only this file.

#![allow(dead_code)]

// ============================================================================
// Fixture employees
// ============================================================================

pub const ANA_NAME: &str = "Ana";
pub const ANA_EMAIL: &str = "ana@x.com";
pub const ANA_WEEKEND_RATE: f64 = 100.0;
pub const ANA_HOLIDAY_RATE: f64 = 150.0;

pub const BRUNO_NAME: &str = "Bruno";
pub const BRUNO_EMAIL: &str = "bruno@x.com";

// ============================================================================
// Agent
// ============================================================================

/// Key handed to the agent when it talks to the mock LLM.
pub const TEST_LLM_KEY: &str = "sk-test-key";

pub const TEST_LLM_MODEL: &str = "gpt-test";

// ============================================================================
// Timeouts
// ============================================================================

/// Maximum time to wait for a spawned server to answer.
pub const SERVER_READY_TIMEOUT_MS: u64 = 5000;

/// Timeout for individual HTTP requests.
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Interval between readiness polls.
pub const SERVER_READY_POLL_INTERVAL_MS: u64 = 50;
