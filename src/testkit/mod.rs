//! Shared test utilities available to both unit and integration tests.
//!
//! Enabled via `#[cfg(test)]` (unit tests) or the `testkit` feature
//! (integration tests).
//!
//! # Modules
//!
//! - [`chain`] - Chain index builders with scripted header prices.
//! - [`book`] - A scripted [`OrderValidator`](crate::book::OrderValidator)
//!   and order transaction builders.

pub mod book;
pub mod chain;
