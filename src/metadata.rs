//! Probe metadata records.
//!
//! A [`MetadataRecord`] is the flat field → value mapping produced by one
//! probe invocation. It is persisted verbatim in each frame folder's
//! sidecar and only ever re-parsed, never mutated in place.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::error::FramesiftError;
use crate::utilities::parse_frame_rate;

/// Probe field holding the stream's frame count.
pub const FRAME_COUNT_FIELD: &str = "nb_frames";
/// Probe field holding the stream's real base frame rate (`num/den`).
pub const FRAME_RATE_FIELD: &str = "r_frame_rate";
/// Probe field holding the duration in seconds.
pub const DURATION_FIELD: &str = "duration";
/// Probe field holding the codec name.
pub const CODEC_FIELD: &str = "codec_name";

/// Field → value metadata for one media file, as reported by the probe.
///
/// Values are kept as strings exactly as the probe printed them; typed
/// accessors parse on demand.
///
/// # Example
///
/// ```
/// use framesift::MetadataRecord;
///
/// let record = MetadataRecord::from_pairs([("nb_frames", "240"), ("r_frame_rate", "24/1")]);
/// assert_eq!(record.frame_count(), Some(240));
/// assert_eq!(record.frames_per_second(), Some(24.0));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[must_use]
pub struct MetadataRecord {
    fields: BTreeMap<String, String>,
}

impl MetadataRecord {
    /// An empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a record from `(field, value)` pairs.
    pub fn from_pairs<K, V, I>(pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        Self {
            fields: pairs
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }

    /// Build a record from a JSON object, stringifying non-string values.
    ///
    /// Nested objects and arrays are kept as their compact JSON text.
    pub fn from_json_object(object: &Map<String, Value>) -> Self {
        Self {
            fields: object
                .iter()
                .map(|(key, value)| (key.clone(), value_to_string(value)))
                .collect(),
        }
    }

    /// Parse a record from JSON text holding a single object.
    ///
    /// # Errors
    ///
    /// Returns [`FramesiftError::JsonError`] if the text is not JSON, or
    /// [`FramesiftError::InvalidMetadata`] if it is JSON but not an object.
    pub fn from_json_str(text: &str) -> Result<Self, FramesiftError> {
        let value: Value = serde_json::from_str(text)?;
        match value {
            Value::Object(object) => Ok(Self::from_json_object(&object)),
            other => Err(FramesiftError::InvalidMetadata(format!(
                "expected a JSON object, found {}",
                json_kind(&other)
            ))),
        }
    }

    /// Pretty-printed JSON object with two-space indentation.
    pub fn to_json_pretty(&self) -> String {
        let object: Map<String, Value> = self
            .fields
            .iter()
            .map(|(key, value)| (key.clone(), Value::String(value.clone())))
            .collect();
        // Serializing a map of strings cannot fail.
        serde_json::to_string_pretty(&Value::Object(object)).unwrap_or_default()
    }

    /// Raw value of `field`, if present.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    /// Whether `field` is present.
    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// Set `field` to `value`, replacing any previous value.
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(field.into(), value.into());
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the record has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterate over `(field, value)` pairs in field-name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    /// The frame count as an integer, if present and integral.
    ///
    /// Signed, since nothing stops a hand-edited sidecar from holding a
    /// negative count.
    pub fn frame_count(&self) -> Option<i64> {
        self.get(FRAME_COUNT_FIELD)?.trim().parse().ok()
    }

    /// Frames per second parsed from the `num/den` frame rate.
    pub fn frames_per_second(&self) -> Option<f64> {
        parse_frame_rate(self.get(FRAME_RATE_FIELD)?).ok()
    }

    /// Duration in seconds, if present, finite and non-negative.
    pub fn duration_seconds(&self) -> Option<f64> {
        let seconds: f64 = self.get(DURATION_FIELD)?.trim().parse().ok()?;
        (seconds.is_finite() && seconds >= 0.0).then_some(seconds)
    }

    /// Codec name, if present.
    pub fn codec(&self) -> Option<&str> {
        self.get(CODEC_FIELD)
    }
}

fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::MetadataRecord;

    #[test]
    fn numbers_are_stringified() {
        let record = MetadataRecord::from_json_str(r#"{"nb_frames": 42, "codec_name": "prores"}"#)
            .unwrap();
        assert_eq!(record.get("nb_frames"), Some("42"));
        assert_eq!(record.frame_count(), Some(42));
        assert_eq!(record.codec(), Some("prores"));
    }

    #[test]
    fn non_object_json_is_rejected() {
        assert!(MetadataRecord::from_json_str("[1, 2]").is_err());
        assert!(MetadataRecord::from_json_str("not json").is_err());
    }

    #[test]
    fn non_integral_frame_count_is_none() {
        let record = MetadataRecord::from_pairs([("nb_frames", "12.5")]);
        assert_eq!(record.frame_count(), None);
    }

    #[test]
    fn rate_and_duration_accessors() {
        let record = MetadataRecord::from_pairs([
            ("r_frame_rate", "30000/1001"),
            ("duration", "1e300"),
        ]);
        assert!((record.frames_per_second().unwrap() - 29.970_029).abs() < 1e-5);
        assert_eq!(record.duration_seconds(), Some(1e300));

        let bad = MetadataRecord::from_pairs([("r_frame_rate", "0/0"), ("duration", "-4")]);
        assert_eq!(bad.frames_per_second(), None);
        assert_eq!(bad.duration_seconds(), None);
    }

    #[test]
    fn pretty_json_round_trips() {
        let record = MetadataRecord::from_pairs([
            ("nb_frames", "300"),
            ("duration", "10.010000"),
            ("r_frame_rate", "30000/1001"),
        ]);
        let text = record.to_json_pretty();
        assert!(text.contains("\n  \"nb_frames\": \"300\""), "{text}");
        assert_eq!(MetadataRecord::from_json_str(&text).unwrap(), record);
    }
}
