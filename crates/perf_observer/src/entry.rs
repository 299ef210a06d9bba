//! Timeline entries delivered by the platform

use crate::error::MonitorResult;
use crate::kind::MetricKind;
use serde::{Deserialize, Serialize};

/// A single performance timeline entry.
///
/// Mirrors the fields a platform `PerformanceEntry` exposes, including the
/// optional fields only some entry types carry. The observer only reads it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObservedEvent {
    /// Raw entry type tag (e.g. "longtask", "paint")
    pub entry_type: String,
    /// Entry name; empty when the platform gave none
    #[serde(default)]
    pub name: String,
    /// Start time relative to the time origin, in milliseconds
    #[serde(default)]
    pub start_time: f64,
    /// Duration in milliseconds
    #[serde(default)]
    pub duration: f64,
    /// Render time (largest-contentful-paint, element)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub render_time: Option<f64>,
    /// Load time (largest-contentful-paint, element)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub load_time: Option<f64>,
    /// Shift score (layout-shift)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    /// Attribution records (longtask)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attribution: Vec<Attribution>,
}

/// Describes the container that caused a long task.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attribution {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container_src: Option<String>,
}

impl ObservedEvent {
    /// Create an entry with the given type tag and name.
    pub fn new(entry_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            entry_type: entry_type.into(),
            name: name.into(),
            ..Self::default()
        }
    }

    /// Parse an entry serialized as JSON.
    pub fn from_json(json: &str) -> MonitorResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parse a JSON array of entries.
    pub fn batch_from_json(json: &str) -> MonitorResult<Vec<Self>> {
        Ok(serde_json::from_str(json)?)
    }

    /// The entry's kind, or `None` for tags the observer does not know.
    pub fn kind(&self) -> Option<MetricKind> {
        self.entry_type.parse().ok()
    }

    pub fn with_start_time(mut self, ms: f64) -> Self {
        self.start_time = ms;
        self
    }

    pub fn with_duration(mut self, ms: f64) -> Self {
        self.duration = ms;
        self
    }

    pub fn with_render_time(mut self, ms: f64) -> Self {
        self.render_time = Some(ms);
        self
    }

    pub fn with_load_time(mut self, ms: f64) -> Self {
        self.load_time = Some(ms);
        self
    }

    pub fn with_value(mut self, value: f64) -> Self {
        self.value = Some(value);
        self
    }

    pub fn with_attribution(mut self, attribution: Attribution) -> Self {
        self.attribution.push(attribution);
        self
    }
}

impl Attribution {
    pub fn new(
        name: impl Into<String>,
        container_type: impl Into<String>,
        container_src: impl Into<String>,
    ) -> Self {
        Self {
            name: Some(name.into()),
            container_type: Some(container_type.into()),
            container_src: Some(container_src.into()),
        }
    }

    /// One-line description, with placeholders for missing fields.
    pub fn describe(&self) -> String {
        format!(
            "Name: {}, Container: {}, Source: {}",
            non_empty(&self.name).unwrap_or("Unknown"),
            non_empty(&self.container_type).unwrap_or("N/A"),
            non_empty(&self.container_src).unwrap_or("N/A"),
        )
    }
}

fn non_empty(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_coercion() {
        assert_eq!(ObservedEvent::new("longtask", "self").kind(), Some(MetricKind::LongTask));
        assert_eq!(ObservedEvent::new("mark", "app-ready").kind(), None);
    }

    #[test]
    fn test_from_json() {
        let entry = ObservedEvent::from_json(
            r#"{
                "entryType": "longtask",
                "name": "self",
                "startTime": 10.5,
                "duration": 75,
                "attribution": [
                    { "name": "foo", "containerType": "iframe", "containerSrc": "x.html" }
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(entry.kind(), Some(MetricKind::LongTask));
        assert_eq!(entry.duration, 75.0);
        assert_eq!(entry.start_time, 10.5);
        assert_eq!(entry.attribution, vec![Attribution::new("foo", "iframe", "x.html")]);
        assert_eq!(entry.render_time, None);
    }

    #[test]
    fn test_batch_from_json_defaults_missing_fields() {
        let batch = ObservedEvent::batch_from_json(
            r#"[{ "entryType": "paint", "name": "first-paint", "startTime": 120 },
                { "entryType": "layout-shift", "value": 0.3 }]"#,
        )
        .unwrap();

        assert_eq!(batch.len(), 2);
        assert_eq!(batch[0].duration, 0.0);
        assert_eq!(batch[1].name, "");
        assert_eq!(batch[1].value, Some(0.3));
    }

    #[test]
    fn test_attribution_placeholders() {
        let attribution = Attribution {
            name: Some(String::new()),
            container_type: None,
            container_src: Some("frame.html".to_string()),
        };
        assert_eq!(
            attribution.describe(),
            "Name: Unknown, Container: N/A, Source: frame.html"
        );
    }
}
