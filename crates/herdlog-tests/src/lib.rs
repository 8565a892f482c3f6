//! Integration test crate for Herdlog.
//!
//! This crate exists solely to hold cross-crate integration tests.
//! It depends on multiple herdlog crates to verify they work together.

#[cfg(test)]
mod timeline;

#[cfg(test)]
mod project;

#[cfg(test)]
mod export;
