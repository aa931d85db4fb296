//! Persistence layer for evaluated signals.

pub mod postgres;

pub use postgres::{SignalDatabase, SignalSink};
