//! Signal catalog adapters

use async_trait::async_trait;
use georadar_core::error::{GeoradarError, Result};
use georadar_core::models::Signal;
use georadar_core::ports::SignalCatalog;
use serde_json::Value;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};
use std::time::Duration;

/// Decode a catalog document into signals.
///
/// Accepts a bare array or an object with an `events` array. Entries are
/// decoded one at a time; an entry that does not decode is logged and
/// dropped so the rest of the catalog stays usable.
pub fn decode_signals(document: Value) -> Result<Vec<Signal>> {
    let entries = match document {
        Value::Array(entries) => entries,
        Value::Object(mut map) => match map.remove("events") {
            Some(Value::Array(entries)) => entries,
            Some(_) => {
                return Err(GeoradarError::CatalogFetch {
                    reason: "'events' is not an array".to_string(),
                })
            }
            None => Vec::new(),
        },
        other => {
            return Err(GeoradarError::CatalogFetch {
                reason: format!("expected an array or object, got {}", json_type(&other)),
            })
        }
    };

    let mut signals = Vec::with_capacity(entries.len());
    for entry in entries {
        let signal_id = entry
            .get("id")
            .map(|id| id.as_str().map(str::to_string).unwrap_or_else(|| id.to_string()))
            .unwrap_or_else(|| "<missing id>".to_string());

        match serde_json::from_value::<Signal>(entry) {
            Ok(signal) => signals.push(signal),
            Err(e) => {
                let err = GeoradarError::MalformedSignal { signal_id, reason: e.to_string() };
                tracing::warn!("Skipping catalog entry: {}", err);
            }
        }
    }

    Ok(signals)
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// In-memory catalog, refreshable between polling cycles.
///
/// Uses `RwLock::unwrap()` intentionally: poisoning only follows a panic
/// while the lock is held.
#[derive(Debug, Clone, Default)]
pub struct StaticSignalCatalog {
    signals: Arc<RwLock<Vec<Signal>>>,
}

impl StaticSignalCatalog {
    pub fn new(signals: Vec<Signal>) -> Self {
        Self { signals: Arc::new(RwLock::new(signals)) }
    }

    /// Swap in a new set of signals; takes effect on the next tick
    pub fn replace(&self, signals: Vec<Signal>) {
        *self.signals.write().unwrap() = signals;
    }

    pub fn len(&self) -> usize {
        self.signals.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl SignalCatalog for StaticSignalCatalog {
    async fn list_signals(&self) -> Result<Vec<Signal>> {
        Ok(self.signals.read().unwrap().clone())
    }
}

/// Catalog read from a JSON file on every call
#[derive(Debug, Clone)]
pub struct JsonFileCatalog {
    path: PathBuf,
}

impl JsonFileCatalog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl SignalCatalog for JsonFileCatalog {
    async fn list_signals(&self) -> Result<Vec<Signal>> {
        let content = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            GeoradarError::CatalogFetch {
                reason: format!("Failed to read {}: {}", self.path.display(), e),
            }
        })?;

        let document: Value =
            serde_json::from_str(&content).map_err(|e| GeoradarError::CatalogFetch {
                reason: format!("Failed to parse {}: {}", self.path.display(), e),
            })?;

        decode_signals(document)
    }
}

/// Catalog served by the backend at `GET {base_url}/events`
pub struct HttpSignalCatalog {
    /// Base URL for the backend API (e.g., "http://localhost:3000")
    base_url: String,

    /// Per-request timeout
    timeout: Duration,

    /// HTTP client
    client: reqwest::Client,
}

impl HttpSignalCatalog {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout: Self::DEFAULT_TIMEOUT,
            client: reqwest::Client::new(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn events_url(&self) -> String {
        format!("{}/events", self.base_url)
    }
}

#[async_trait]
impl SignalCatalog for HttpSignalCatalog {
    async fn list_signals(&self) -> Result<Vec<Signal>> {
        let url = self.events_url();

        let response = self
            .client
            .get(&url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| GeoradarError::CatalogFetch {
                reason: format!("Failed to reach {}: {}", url, e),
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(GeoradarError::CatalogFetch {
                reason: format!("Catalog API error ({}): {}", status, error_text),
            });
        }

        let document: Value = response.json().await.map_err(|e| GeoradarError::CatalogFetch {
            reason: format!("Failed to parse catalog response: {}", e),
        })?;

        decode_signals(document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use georadar_core::models::Coordinate;
    use serde_json::json;

    fn event_json(id: &str) -> Value {
        json!({
            "id": id,
            "name": "Wembley Stadium Event",
            "type": "event",
            "coordinates": {"lat": 51.556, "long": -0.2795},
            "endTime": "2026-10-14T18:00:00Z",
            "message": "Event ending at Wembley Stadium soon"
        })
    }

    #[test]
    fn test_decode_wrapped_events() {
        let signals = decode_signals(json!({"events": [event_json("3")]})).unwrap();
        assert_eq!(signals.len(), 1);
        assert_eq!(signals[0].id.as_str(), "3");
    }

    #[test]
    fn test_decode_bare_array() {
        let signals = decode_signals(json!([event_json("a"), event_json("b")])).unwrap();
        assert_eq!(signals.len(), 2);
    }

    #[test]
    fn test_decode_skips_malformed_entries() {
        let broken = json!({"id": 4, "name": "No coordinates", "type": "event",
            "endTime": "2026-10-14T18:00:00Z", "message": ""});
        let signals = decode_signals(json!([event_json("ok"), broken, "garbage"])).unwrap();

        assert_eq!(signals.len(), 1);
        assert_eq!(signals[0].id.as_str(), "ok");
    }

    #[test]
    fn test_decode_missing_events_key_is_empty() {
        assert!(decode_signals(json!({"status": "ok"})).unwrap().is_empty());
    }

    #[test]
    fn test_decode_rejects_scalar_document() {
        assert!(matches!(decode_signals(json!(42)), Err(GeoradarError::CatalogFetch { .. })));
        assert!(decode_signals(json!({"events": "nope"})).is_err());
    }

    #[tokio::test]
    async fn test_static_catalog_replace() {
        let catalog = StaticSignalCatalog::default();
        assert!(catalog.is_empty());

        catalog.replace(vec![Signal::event(
            "1",
            "Granada Mall Event",
            Coordinate::new(24.81511, 46.7086),
            Utc::now(),
            "Event ending at Granada Mall soon",
        )]);

        let signals = catalog.list_signals().await.unwrap();
        assert_eq!(signals.len(), 1);
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn test_http_catalog_url() {
        let catalog = HttpSignalCatalog::new("http://localhost:3000/");
        assert_eq!(catalog.events_url(), "http://localhost:3000/events");
        assert_eq!(catalog.timeout, HttpSignalCatalog::DEFAULT_TIMEOUT);
    }

    #[tokio::test]
    async fn test_http_catalog_unreachable_is_catalog_error() {
        let catalog = HttpSignalCatalog::new("http://127.0.0.1:9")
            .with_timeout(Duration::from_millis(500));
        let result = catalog.list_signals().await;
        assert!(matches!(result, Err(GeoradarError::CatalogFetch { .. })));
    }
}
