//! Integration test support
//!
//! Fixtures shared by the unit tests and end-to-end router tests.

pub mod fixtures;

#[cfg(test)]
mod e2e;
