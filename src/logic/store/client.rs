//! Realtime Store Client
//!
//! HTTP client for the sensor store's REST surface:
//! `GET <base>/<path>.json` returns the whole collection keyed by entry id
//! (a JSON `null` body means the collection is empty), and
//! `PATCH <base>/<path>/<key>.json` merges fields into one record.

use std::collections::HashMap;
use std::time::Duration;

use crate::constants;

use super::types::{Annotation, SensorEntry};
use super::{SensorStore, StoreError};

/// Store connection configuration
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub database_url: String,
    pub path: String,
    pub auth_token: Option<String>,
    pub timeout_seconds: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database_url: constants::get_store_url(),
            path: constants::get_store_path(),
            auth_token: constants::get_store_auth_token(),
            timeout_seconds: 30,
        }
    }
}

/// Realtime store client
pub struct RtdbClient {
    config: StoreConfig,
    http_client: reqwest::Client,
}

impl RtdbClient {
    /// Create new store client
    pub fn new(config: StoreConfig) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            config,
            http_client,
        }
    }

    fn collection_url(&self) -> String {
        let url = format!(
            "{}/{}.json",
            self.config.database_url.trim_end_matches('/'),
            self.config.path
        );
        self.with_auth(url)
    }

    fn entry_url(&self, key: &str) -> String {
        let url = format!(
            "{}/{}/{}.json",
            self.config.database_url.trim_end_matches('/'),
            self.config.path,
            key
        );
        self.with_auth(url)
    }

    fn with_auth(&self, url: String) -> String {
        match &self.config.auth_token {
            Some(token) => format!("{}?auth={}", url, token),
            None => url,
        }
    }
}

impl SensorStore for RtdbClient {
    async fn fetch_all(&self) -> Result<HashMap<String, SensorEntry>, StoreError> {
        let response = self
            .http_client
            .get(self.collection_url())
            .send()
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(StoreError::Server(response.status().as_u16()));
        }

        // An empty collection comes back as a literal `null`
        let entries: Option<HashMap<String, SensorEntry>> = response
            .json()
            .await
            .map_err(|e| StoreError::Parse(e.to_string()))?;

        Ok(entries.unwrap_or_default())
    }

    async fn update(&self, key: &str, annotation: &Annotation) -> Result<(), StoreError> {
        let response = self
            .http_client
            .patch(self.entry_url(key))
            .json(annotation)
            .send()
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(StoreError::Server(response.status().as_u16()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(auth: Option<&str>) -> RtdbClient {
        RtdbClient::new(StoreConfig {
            database_url: "https://db.example.com/".to_string(),
            path: "sensors_data".to_string(),
            auth_token: auth.map(String::from),
            timeout_seconds: 5,
        })
    }

    #[test]
    fn test_collection_url() {
        assert_eq!(
            client(None).collection_url(),
            "https://db.example.com/sensors_data.json"
        );
    }

    #[test]
    fn test_entry_url_with_auth() {
        assert_eq!(
            client(Some("secret")).entry_url("-NxK3"),
            "https://db.example.com/sensors_data/-NxK3.json?auth=secret"
        );
    }
}
