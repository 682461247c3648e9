//! What-if impact calculator for New Zealand healthcare metrics.
//!
//! The [`calculator`] and [`recommendations`] modules are pure and
//! synchronous. Persistence ([`dataset`]), file ingest ([`ingest`]) and the
//! REST surface ([`server`]) sit around them.

pub mod calculator;
pub mod config;
pub mod dataset;
pub mod ingest;
pub mod output;
pub mod recommendations;
pub mod report;
pub mod scenario;
pub mod server;
