//! Indicatrix signal engine
//!
//! Polls technical indicators and market prices for a configured set of
//! trading pairs, evaluates them into buy/sell and hold/exit signals, and
//! maintains one live signal row per symbol in Postgres. An Axum HTTP
//! server exposes the signal table alongside health and metrics endpoints.

pub mod config;
pub mod core;
pub mod db;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod services;
pub mod signals;
