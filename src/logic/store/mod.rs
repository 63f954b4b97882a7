//! Store Module - Realtime Sensor Store Access
//!
//! The store is an external key-value service: "read all entries", "merge
//! fields into one entry". Other processes append new readings concurrently;
//! this module only ever reads entries and patches annotation fields onto
//! them.

pub mod client;
pub mod memory;
pub mod types;

pub use client::{RtdbClient, StoreConfig};
pub use memory::MemoryStore;
pub use types::{Annotation, LeakStatus, SensorEntry};

use std::collections::HashMap;

// ============================================================================
// ERROR HANDLING
// ============================================================================

/// Store access errors. All variants are transient from the monitoring
/// loop's point of view: report, wait, retry next cycle.
#[derive(Debug, Clone)]
pub enum StoreError {
    Unavailable(String),
    Server(u16),
    Parse(String),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unavailable(e) => write!(f, "Store unavailable: {}", e),
            Self::Server(code) => write!(f, "Store error: HTTP {}", code),
            Self::Parse(e) => write!(f, "Store parse error: {}", e),
        }
    }
}

impl std::error::Error for StoreError {}

// ============================================================================
// STORE INTERFACE
// ============================================================================

/// Interface to the sensor entry store.
///
/// `update` merges the annotation fields into the record at `key` without
/// touching other fields (partial update, not an overwrite).
#[allow(async_fn_in_trait)]
pub trait SensorStore {
    async fn fetch_all(&self) -> Result<HashMap<String, SensorEntry>, StoreError>;

    async fn update(&self, key: &str, annotation: &Annotation) -> Result<(), StoreError>;
}
