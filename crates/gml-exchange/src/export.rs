//! Export: validate, wrap in the envelope, pick a transport

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::envelope::{is_truthy, random_suffix, Envelope, ExportPayload, DEFAULT_AUTHOR, DEFAULT_SOURCE};
use crate::registry::{AppRegistry, Environment};
use crate::store::{KeyValueStore, StoreError};

/// Request fields that count as musical content
pub const CONTENT_FIELDS: [&str; 5] = ["riffs", "triads", "quartet", "patterns", "motifs"];

/// Payloads serializing to fewer UTF-16 code units than this go inline
pub const DEFAULT_INLINE_LIMIT: usize = 2000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<String>,
}

/// Check an export request before anything is built or stored
pub fn validate_export(data: &Value) -> ValidationReport {
    let mut errors = Vec::new();

    let has_content = match data.as_object() {
        Some(request) => {
            CONTENT_FIELDS.iter().any(|field| request.get(*field).is_some_and(is_truthy))
                || request.get("content").is_some_and(is_truthy)
        }
        None => {
            errors.push("Data must be an object".to_string());
            false
        }
    };

    if !has_content {
        errors.push("Data must contain musical content".to_string());
    }

    ValidationReport {
        valid: errors.is_empty(),
        errors,
    }
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Export refused: {}", .0.errors.join("; "))]
    Validation(ValidationReport),
    #[error("Unknown app: {0}")]
    UnknownApp(String),
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

pub type Result<T> = std::result::Result<T, ExportError>;

/// How the payload reaches the target app
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum Delivery {
    /// Whole payload in `?import=`
    UrlParams { url: String },
    /// Payload in the store, key in `?importKey=`
    Storage {
        url: String,
        #[serde(rename = "storageKey")]
        storage_key: String,
    },
}

impl Delivery {
    pub fn url(&self) -> &str {
        match self {
            Self::UrlParams { url } | Self::Storage { url, .. } => url,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSettings {
    pub environment: Environment,
    pub inline_limit: usize,
    pub default_author: String,
    pub default_source: String,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            environment: Environment::Local,
            inline_limit: DEFAULT_INLINE_LIMIT,
            default_author: DEFAULT_AUTHOR.to_string(),
            default_source: DEFAULT_SOURCE.to_string(),
        }
    }
}

pub struct Exporter<'a> {
    registry: &'a AppRegistry,
    settings: ExportSettings,
}

impl<'a> Exporter<'a> {
    pub fn new(registry: &'a AppRegistry, settings: ExportSettings) -> Self {
        Self { registry, settings }
    }

    pub fn settings(&self) -> &ExportSettings {
        &self.settings
    }

    pub fn export_to_app(&self, data: &Value, target: &str, store: &mut dyn KeyValueStore) -> Result<Delivery> {
        self.export_to_app_at(data, target, store, Utc::now())
    }

    /// Export with an explicit clock. Nothing is stored and no URL is built
    /// unless the request validates and the target is known.
    pub fn export_to_app_at(
        &self,
        data: &Value,
        target: &str,
        store: &mut dyn KeyValueStore,
        now: DateTime<Utc>,
    ) -> Result<Delivery> {
        let report = validate_export(data);
        let request = match data.as_object() {
            Some(request) if report.valid => request,
            _ => return Err(ExportError::Validation(report)),
        };

        let base_url = self
            .registry
            .url_for(target, self.settings.environment)
            .ok_or_else(|| ExportError::UnknownApp(target.to_string()))?;

        let source = request
            .get("source")
            .filter(|v| is_truthy(v))
            .and_then(Value::as_str)
            .unwrap_or(self.settings.default_source.as_str());
        let envelope = Envelope::from_request(request, now, &self.settings.default_author);
        let payload = ExportPayload::new(source, target, envelope, now);
        let serialized = serde_json::to_string(&payload)?;
        // UTF-16 code units, as the receiving apps measure it
        let length = serialized.encode_utf16().count();

        if length < self.settings.inline_limit {
            debug!(target_app = target, length, "Exporting inline");
            return Ok(Delivery::UrlParams {
                url: format!("{base_url}?import={}", urlencoding::encode(&serialized)),
            });
        }

        let key = format!("gml_export_{}_{}", now.timestamp_millis(), random_suffix(6));
        store.set(&key, &serialized)?;
        debug!(target_app = target, length, key = %key, "Exporting through store");

        Ok(Delivery::Storage {
            url: format!("{base_url}?importKey={key}"),
            storage_key: key,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn fixed_now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2025-03-01T12:00:00Z").unwrap().with_timezone(&Utc)
    }

    fn inline_payload(delivery: &Delivery) -> ExportPayload {
        let Delivery::UrlParams { url } = delivery else {
            panic!("expected inline delivery, got {delivery:?}");
        };
        let (_, encoded) = url.split_once("?import=").unwrap();
        serde_json::from_str(&urlencoding::decode(encoded).unwrap()).unwrap()
    }

    #[test]
    fn test_validation() {
        assert!(validate_export(&json!({ "riffs": [1] })).valid);
        assert!(validate_export(&json!({ "motifs": ["a"] })).valid);
        assert!(validate_export(&json!({ "content": { "type": "generic" } })).valid);
        for empty in [json!(null), json!(""), json!(0), json!(false)] {
            let report = validate_export(&json!({ "content": empty }));
            assert_eq!(report.errors, vec!["Data must contain musical content"], "{empty}");
        }

        // an empty array is truthy
        assert!(validate_export(&json!({ "title": "x", "riffs": [] })).valid);

        let none = validate_export(&json!({ "title": "x", "riffs": 0 }));
        assert_eq!(none.errors, vec!["Data must contain musical content"]);

        let not_object = validate_export(&json!([1, 2]));
        assert!(!not_object.valid);
        assert_eq!(not_object.errors[0], "Data must be an object");
    }

    #[test]
    fn test_small_payload_goes_inline() {
        let registry = AppRegistry::standard();
        let exporter = Exporter::new(&registry, ExportSettings::default());
        let mut store = MemoryStore::new();

        let delivery = exporter
            .export_to_app_at(&json!({ "triads": ["C", "F", "G"] }), "TriadGen", &mut store, fixed_now())
            .unwrap();

        assert!(delivery.url().starts_with("http://localhost:3002?import="));
        assert!(store.is_empty());

        let payload = inline_payload(&delivery);
        assert_eq!(payload.target, "TriadGen");
        assert_eq!(payload.source, "mike-gen-libs");
        assert_eq!(payload.timestamp, "2025-03-01T12:00:00.000Z");
        assert!(payload.has_protocol_tag());
    }

    #[test]
    fn test_large_payload_goes_to_store() {
        let registry = AppRegistry::standard();
        let exporter = Exporter::new(&registry, ExportSettings::default());
        let mut store = MemoryStore::new();
        let riffs: Vec<u32> = (0..1000).collect();

        let delivery = exporter
            .export_to_app_at(&json!({ "riffs": riffs, "source": "RiffGen" }), "QuartetEngine", &mut store, fixed_now())
            .unwrap();

        let Delivery::Storage { url, storage_key } = &delivery else {
            panic!("expected storage delivery, got {delivery:?}");
        };
        assert!(storage_key.starts_with(&format!("gml_export_{}_", fixed_now().timestamp_millis())));
        assert_eq!(url, &format!("http://localhost:3003?importKey={storage_key}"));

        let stored: ExportPayload = serde_json::from_str(&store.get(storage_key).unwrap().unwrap()).unwrap();
        assert_eq!(stored.source, "RiffGen");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_threshold_is_exclusive() {
        let registry = AppRegistry::standard();
        let request = json!({ "riffs": [1, 2, 3] });
        let mut store = MemoryStore::new();

        let unlimited = Exporter::new(&registry, ExportSettings { inline_limit: usize::MAX, ..Default::default() });
        let delivery = unlimited.export_to_app_at(&request, "RiffGen", &mut store, fixed_now()).unwrap();
        let length = serde_json::to_string(&inline_payload(&delivery)).unwrap().encode_utf16().count();

        let at = Exporter::new(&registry, ExportSettings { inline_limit: length, ..Default::default() });
        let delivery = at.export_to_app_at(&request, "RiffGen", &mut store, fixed_now()).unwrap();
        assert!(matches!(delivery, Delivery::Storage { .. }));

        let above = Exporter::new(&registry, ExportSettings { inline_limit: length + 1, ..Default::default() });
        let delivery = above.export_to_app_at(&request, "RiffGen", &mut store, fixed_now()).unwrap();
        assert!(matches!(delivery, Delivery::UrlParams { .. }));
    }

    #[test]
    fn test_threshold_counts_utf16_units() {
        let registry = AppRegistry::standard();
        let request = json!({ "riffs": "🎸".repeat(1000) });
        let mut store = MemoryStore::new();

        let unlimited = Exporter::new(&registry, ExportSettings { inline_limit: usize::MAX, ..Default::default() });
        let delivery = unlimited.export_to_app_at(&request, "RiffGen", &mut store, fixed_now()).unwrap();
        let serialized = serde_json::to_string(&inline_payload(&delivery)).unwrap();
        let scalars = serialized.chars().count();
        assert_eq!(serialized.encode_utf16().count(), scalars + 1000);
        assert!(scalars < DEFAULT_INLINE_LIMIT);

        // fits by scalar count, not by UTF-16 length
        let between = Exporter::new(&registry, ExportSettings { inline_limit: scalars + 1, ..Default::default() });
        let delivery = between.export_to_app_at(&request, "RiffGen", &mut store, fixed_now()).unwrap();
        assert!(matches!(delivery, Delivery::Storage { .. }));

        let default = Exporter::new(&registry, ExportSettings::default());
        let delivery = default.export_to_app_at(&request, "RiffGen", &mut store, fixed_now()).unwrap();
        assert!(matches!(delivery, Delivery::Storage { .. }));
    }

    #[test]
    fn test_refused_export_touches_nothing() {
        let registry = AppRegistry::standard();
        let exporter = Exporter::new(&registry, ExportSettings { inline_limit: 0, ..Default::default() });
        let mut store = MemoryStore::new();

        let err = exporter
            .export_to_app_at(&json!({ "title": "no music" }), "RiffGen", &mut store, fixed_now())
            .unwrap_err();
        assert!(matches!(err, ExportError::Validation(ref report) if !report.valid));
        assert!(store.is_empty());

        let err = exporter.export_to_app_at(&json!({ "riffs": [1] }), "Nowhere", &mut store, fixed_now()).unwrap_err();
        assert!(matches!(err, ExportError::UnknownApp(ref name) if name == "Nowhere"));
        assert!(store.is_empty());
    }

    #[test]
    fn test_production_urls() {
        let registry = AppRegistry::standard();
        let settings = ExportSettings { environment: Environment::Production, ..Default::default() };
        let exporter = Exporter::new(&registry, settings);
        let delivery = exporter
            .export_to_app(&json!({ "quartet": { "parts": 4 } }), "QuintetComposer", &mut MemoryStore::new())
            .unwrap();
        assert!(delivery.url().starts_with("https://quintet-composer.gml-ecosystem.com?import="));
    }

    #[test]
    fn test_delivery_wire_shape() {
        let delivery = Delivery::Storage { url: "u".into(), storage_key: "k".into() };
        assert_eq!(
            serde_json::to_value(&delivery).unwrap(),
            json!({ "method": "storage", "url": "u", "storageKey": "k" })
        );
    }
}
