//! Central Configuration Constants
//!
//! Single source of truth for all configuration defaults.
//! To change the default sensor store or artifact location, only edit this file.

use std::path::PathBuf;

/// Default realtime store base URL
///
/// This is the fallback URL when no environment variable is set.
pub const DEFAULT_STORE_URL: &str = "https://smart-water-demo-default-rtdb.firebaseio.com";

/// Default collection path holding sensor entries
pub const DEFAULT_STORE_PATH: &str = "sensors_data";

/// Default poll interval between monitoring cycles (seconds)
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 3;

/// Expected baseline flow rate (liters/min) for loss estimation
pub const DEFAULT_EXPECTED_FLOW: f64 = 50.0;

/// Fallback flow rate used when a sensor entry carries no reading
pub const DEFAULT_FLOW_RATE: f64 = 50.0;

/// Default model artifact file name
pub const DEFAULT_MODEL_FILE: &str = "iso_forest.json";

/// App version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// App name
pub const APP_NAME: &str = "AquaWatch";

// ============================================
// Helper functions to read from env with fallback
// ============================================

/// Get store base URL from environment or use default
pub fn get_store_url() -> String {
    std::env::var("AQUAWATCH_STORE_URL")
        .unwrap_or_else(|_| DEFAULT_STORE_URL.to_string())
}

/// Get store collection path from environment or use default
pub fn get_store_path() -> String {
    std::env::var("AQUAWATCH_STORE_PATH")
        .unwrap_or_else(|_| DEFAULT_STORE_PATH.to_string())
}

/// Get store auth token from environment, if any
pub fn get_store_auth_token() -> Option<String> {
    std::env::var("AQUAWATCH_STORE_AUTH").ok().filter(|s| !s.is_empty())
}

/// Get poll interval from environment or use default
pub fn get_poll_interval_secs() -> u64 {
    std::env::var("AQUAWATCH_POLL_INTERVAL")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_POLL_INTERVAL_SECS)
}

/// Get expected baseline flow from environment or use default
pub fn get_expected_flow() -> f64 {
    std::env::var("AQUAWATCH_EXPECTED_FLOW")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_EXPECTED_FLOW)
}

/// Get the model artifact path from environment or the platform data dir
pub fn get_model_path() -> PathBuf {
    if let Ok(path) = std::env::var("AQUAWATCH_MODEL_PATH") {
        if !path.is_empty() {
            return PathBuf::from(path);
        }
    }

    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("aquawatch")
        .join("models")
        .join(DEFAULT_MODEL_FILE)
}
