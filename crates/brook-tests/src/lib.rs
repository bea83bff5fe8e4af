//! Shared helpers for E2E and adversarial tests.

pub mod helpers;
