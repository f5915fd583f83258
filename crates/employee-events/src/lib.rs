//! Employee and team performance reporting.
//!
//! Event counts live in an embedded SQLite store. [`entity`] aggregates them per
//! employee or team, [`scoring`] turns the aggregates into a recruitment risk
//! estimate and [`report`] renders both as an interactive dashboard.

pub mod config;
pub mod entity;
pub mod error;
pub mod query;
pub mod report;
pub mod scoring;
pub mod seed;
pub mod telemetry;
