//! The universal envelope and the payload that carries it between apps

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const ENVELOPE_VERSION: &str = "1.0.0";
pub const SCHEMA: &str = "GML_UNIVERSAL";
pub const PAYLOAD_FORMAT: &str = "GML_UNIVERSAL_v1";
/// Marker that a payload follows this convention
pub const PROTOCOL_TAG: &str = "9x3";
/// Marker stamped into envelope metadata
pub const VERIFIED_TAG: &str = "9x3_VERIFIED";
pub const DEFAULT_AUTHOR: &str = "mike-gen-libs";
pub const DEFAULT_SOURCE: &str = "mike-gen-libs";

/// ISO-8601 with milliseconds, e.g. `2025-03-01T12:00:00.000Z`
pub fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Lowercase base-36 characters for generated ids and keys
pub(crate) fn random_suffix(len: usize) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    (0..len).map(|_| DIGITS[fastrand::usize(..DIGITS.len())] as char).collect()
}

/// JavaScript-style truthiness for request fields
pub(crate) fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn truthy_field<'a>(request: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    request.get(key).filter(|v| is_truthy(v))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    RiffCollection,
    TriadProgression,
    QuartetScore,
    Generic,
}

impl ContentType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::RiffCollection => "riff_collection",
            Self::TriadProgression => "triad_progression",
            Self::QuartetScore => "quartet_score",
            Self::Generic => "generic",
        }
    }
}

/// Envelope body, routed on `type`. Each app owns the shape of its payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Content {
    RiffCollection { riffs: Value },
    TriadProgression { triads: Value },
    QuartetScore { quartet: Value },
    Generic { data: Value },
}

impl Content {
    pub fn content_type(&self) -> ContentType {
        match self {
            Self::RiffCollection { .. } => ContentType::RiffCollection,
            Self::TriadProgression { .. } => ContentType::TriadProgression,
            Self::QuartetScore { .. } => ContentType::QuartetScore,
            Self::Generic { .. } => ContentType::Generic,
        }
    }

    /// Picks the first of `riffs`, `triads`, `quartet` that is set;
    /// anything else travels whole as generic data.
    pub fn from_request(request: &Map<String, Value>) -> Self {
        if let Some(riffs) = truthy_field(request, "riffs") {
            Self::RiffCollection { riffs: riffs.clone() }
        } else if let Some(triads) = truthy_field(request, "triads") {
            Self::TriadProgression { triads: triads.clone() }
        } else if let Some(quartet) = truthy_field(request, "quartet") {
            Self::QuartetScore { quartet: quartet.clone() }
        } else {
            Self::Generic { data: Value::Object(request.clone()) }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    #[serde(default)]
    pub created: String,
    #[serde(default)]
    pub modified: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol_tag: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub version: String,
    pub schema: String,
    pub metadata: Metadata,
    pub content: Content,
}

impl Envelope {
    /// Standardize an export request. `created`, `author` and `tags` are
    /// taken from the request when present.
    pub fn from_request(request: &Map<String, Value>, now: DateTime<Utc>, default_author: &str) -> Self {
        let now = timestamp(now);
        let string_field = |key: &str| truthy_field(request, key).and_then(Value::as_str).map(str::to_string);

        let tags = request
            .get("tags")
            .and_then(Value::as_array)
            .map(|tags| tags.iter().filter_map(Value::as_str).map(str::to_string).collect())
            .unwrap_or_default();

        Self {
            version: ENVELOPE_VERSION.to_string(),
            schema: SCHEMA.to_string(),
            metadata: Metadata {
                created: string_field("created").unwrap_or_else(|| now.clone()),
                modified: now,
                author: string_field("author").unwrap_or_else(|| default_author.to_string()),
                tags,
                protocol_tag: Some(VERIFIED_TAG.to_string()),
            },
            content: Content::from_request(request),
        }
    }

    pub fn content_type(&self) -> ContentType {
        self.content.content_type()
    }
}

/// What actually travels: the envelope plus routing fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportPayload {
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub target: String,
    #[serde(default)]
    pub format: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol_tag: Option<String>,
    pub data: Envelope,
}

impl ExportPayload {
    pub fn new(source: &str, target: &str, data: Envelope, now: DateTime<Utc>) -> Self {
        Self {
            timestamp: timestamp(now),
            source: source.to_string(),
            target: target.to_string(),
            format: PAYLOAD_FORMAT.to_string(),
            protocol_tag: Some(PROTOCOL_TAG.to_string()),
            data,
        }
    }

    pub fn has_protocol_tag(&self) -> bool {
        self.protocol_tag.as_deref() == Some(PROTOCOL_TAG)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn request(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("test request must be an object"),
        }
    }

    fn fixed_now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2025-03-01T12:00:00Z").unwrap().with_timezone(&Utc)
    }

    #[test]
    fn test_timestamp_format() {
        assert_eq!(timestamp(fixed_now()), "2025-03-01T12:00:00.000Z");
    }

    #[test]
    fn test_random_suffix() {
        let suffix = random_suffix(9);
        assert_eq!(suffix.len(), 9);
        assert!(suffix.chars().all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
    }

    #[test]
    fn test_content_routing_order() {
        let both = request(json!({ "triads": ["C"], "riffs": [1] }));
        assert_eq!(Content::from_request(&both).content_type(), ContentType::RiffCollection);

        // an empty array is still set
        let empty_riffs = request(json!({ "riffs": [], "triads": ["C"] }));
        assert_eq!(Content::from_request(&empty_riffs).content_type(), ContentType::RiffCollection);

        let triads = request(json!({ "riffs": "", "triads": ["C"] }));
        assert_eq!(Content::from_request(&triads).content_type(), ContentType::TriadProgression);

        let quartet = request(json!({ "riffs": null, "quartet": { "parts": 4 } }));
        assert_eq!(
            Content::from_request(&quartet),
            Content::QuartetScore { quartet: json!({ "parts": 4 }) }
        );

        let motifs = request(json!({ "motifs": ["a"] }));
        assert_eq!(
            Content::from_request(&motifs),
            Content::Generic { data: json!({ "motifs": ["a"] }) }
        );
    }

    #[test]
    fn test_envelope_defaults() {
        let envelope = Envelope::from_request(&request(json!({ "riffs": [1] })), fixed_now(), DEFAULT_AUTHOR);
        assert_eq!(envelope.version, "1.0.0");
        assert_eq!(envelope.schema, "GML_UNIVERSAL");
        assert_eq!(envelope.metadata.created, "2025-03-01T12:00:00.000Z");
        assert_eq!(envelope.metadata.author, "mike-gen-libs");
        assert!(envelope.metadata.tags.is_empty());
        assert_eq!(envelope.metadata.protocol_tag.as_deref(), Some("9x3_VERIFIED"));
    }

    #[test]
    fn test_envelope_takes_request_metadata() {
        let envelope = Envelope::from_request(
            &request(json!({
                "triads": ["C", "F", "G"],
                "author": "ana",
                "created": "2024-01-01T00:00:00.000Z",
                "tags": ["demo", 3, "cadence"],
            })),
            fixed_now(),
            DEFAULT_AUTHOR,
        );
        assert_eq!(envelope.metadata.author, "ana");
        assert_eq!(envelope.metadata.created, "2024-01-01T00:00:00.000Z");
        assert_eq!(envelope.metadata.modified, "2025-03-01T12:00:00.000Z");
        assert_eq!(envelope.metadata.tags, vec!["demo", "cadence"]);
    }

    #[test]
    fn test_wire_shape() {
        let envelope = Envelope::from_request(&request(json!({ "riffs": [1] })), fixed_now(), DEFAULT_AUTHOR);
        let payload = ExportPayload::new(DEFAULT_SOURCE, "TriadGen", envelope, fixed_now());
        let wire = serde_json::to_value(&payload).unwrap();

        assert_eq!(wire["format"], "GML_UNIVERSAL_v1");
        assert_eq!(wire["protocolTag"], "9x3");
        assert_eq!(wire["data"]["metadata"]["protocolTag"], "9x3_VERIFIED");
        assert_eq!(wire["data"]["content"], json!({ "type": "riff_collection", "riffs": [1] }));

        let back: ExportPayload = serde_json::from_value(wire).unwrap();
        assert_eq!(back, payload);
    }

    #[test]
    fn test_missing_protocol_tag_still_parses() {
        let payload: ExportPayload = serde_json::from_value(json!({
            "data": {
                "version": "1.0.0",
                "schema": "GML_UNIVERSAL",
                "metadata": {},
                "content": { "type": "generic", "data": {} }
            }
        }))
        .unwrap();
        assert!(!payload.has_protocol_tag());
    }
}
