//! Round-robin rotation over provider API keys.

use std::sync::atomic::{AtomicUsize, Ordering};
use thiserror::Error;

#[derive(Debug, Error)]
#[error("credential pool requires at least one API key")]
pub struct EmptyCredentialPool;

/// Shared rotation over the configured API keys.
///
/// A single atomic cursor is shared by every sweep loop, so consecutive
/// requests across the whole process spread evenly over the keys instead
/// of each loop hammering the same one.
pub struct CredentialPool {
    keys: Vec<String>,
    cursor: AtomicUsize,
}

impl CredentialPool {
    pub fn new(keys: Vec<String>) -> Result<Self, EmptyCredentialPool> {
        if keys.is_empty() {
            return Err(EmptyCredentialPool);
        }
        Ok(Self {
            keys,
            cursor: AtomicUsize::new(0),
        })
    }

    /// Next key in rotation. Wraps around indefinitely.
    pub fn next_key(&self) -> &str {
        let index = self.cursor.fetch_add(1, Ordering::Relaxed);
        &self.keys[index % self.keys.len()]
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}
