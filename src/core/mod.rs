//! Core application primitives (servers, orchestrators)

pub mod http;
pub mod scheduler;

pub use http::*;
pub use scheduler::*;
