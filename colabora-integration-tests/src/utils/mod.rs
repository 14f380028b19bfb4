//! Utilities for tests.

pub mod metrics;
pub mod test_tools;
