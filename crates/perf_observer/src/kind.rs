//! Observable metric kinds

use crate::error::MonitorError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A category of performance timeline entry.
///
/// Each variant maps to the entry type tag the platform reports, except
/// [`FirstPaint`](MetricKind::FirstPaint) and
/// [`FirstContentfulPaint`](MetricKind::FirstContentfulPaint), which arrive as
/// named `paint` entries and cannot be observed on their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MetricKind {
    #[serde(rename = "element")]
    Element,
    #[serde(rename = "event")]
    Event,
    #[serde(rename = "first-input")]
    FirstInput,
    #[serde(rename = "largest-contentful-paint")]
    LargestContentfulPaint,
    #[serde(rename = "layout-shift")]
    LayoutShift,
    #[serde(rename = "long-animation-frame")]
    LongAnimationFrame,
    #[serde(rename = "longtask")]
    LongTask,
    #[serde(rename = "navigation")]
    Navigation,
    #[serde(rename = "paint")]
    Paint,
    #[serde(rename = "resource")]
    Resource,
    #[serde(rename = "first-paint")]
    FirstPaint,
    #[serde(rename = "first-contentful-paint")]
    FirstContentfulPaint,
    #[serde(rename = "visibility-state")]
    VisibilityState,
}

impl MetricKind {
    /// Every kind, in watch-list order.
    pub const ALL: [MetricKind; 13] = [
        MetricKind::Element,
        MetricKind::Event,
        MetricKind::FirstInput,
        MetricKind::LargestContentfulPaint,
        MetricKind::LayoutShift,
        MetricKind::LongAnimationFrame,
        MetricKind::LongTask,
        MetricKind::Navigation,
        MetricKind::Paint,
        MetricKind::Resource,
        MetricKind::FirstPaint,
        MetricKind::FirstContentfulPaint,
        MetricKind::VisibilityState,
    ];

    /// The platform entry type tag.
    pub fn as_str(self) -> &'static str {
        match self {
            MetricKind::Element => "element",
            MetricKind::Event => "event",
            MetricKind::FirstInput => "first-input",
            MetricKind::LargestContentfulPaint => "largest-contentful-paint",
            MetricKind::LayoutShift => "layout-shift",
            MetricKind::LongAnimationFrame => "long-animation-frame",
            MetricKind::LongTask => "longtask",
            MetricKind::Navigation => "navigation",
            MetricKind::Paint => "paint",
            MetricKind::Resource => "resource",
            MetricKind::FirstPaint => "first-paint",
            MetricKind::FirstContentfulPaint => "first-contentful-paint",
            MetricKind::VisibilityState => "visibility-state",
        }
    }

    /// Whether this kind is only reachable as a named `paint` entry.
    pub fn is_paint_sub_event(self) -> bool {
        matches!(self, MetricKind::FirstPaint | MetricKind::FirstContentfulPaint)
    }

    /// Whether the platform can be asked to observe this kind directly.
    pub fn is_directly_observable(self) -> bool {
        !self.is_paint_sub_event()
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MetricKind {
    type Err = MonitorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MetricKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| MonitorError::UnknownMetric(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_tags() {
        assert_eq!("longtask".parse::<MetricKind>().unwrap(), MetricKind::LongTask);
        assert_eq!(
            "largest-contentful-paint".parse::<MetricKind>().unwrap(),
            MetricKind::LargestContentfulPaint
        );
        assert_eq!("first-paint".parse::<MetricKind>().unwrap(), MetricKind::FirstPaint);
    }

    #[test]
    fn test_parse_unknown_tag() {
        let err = "measure".parse::<MetricKind>().unwrap_err();
        assert!(matches!(err, MonitorError::UnknownMetric(ref tag) if tag == "measure"));
    }

    #[test]
    fn test_tags_match_serde() {
        for kind in MetricKind::ALL {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.as_str()));
        }
    }

    #[test]
    fn test_paint_sub_events() {
        assert!(MetricKind::FirstPaint.is_paint_sub_event());
        assert!(MetricKind::FirstContentfulPaint.is_paint_sub_event());
        assert!(!MetricKind::Paint.is_paint_sub_event());
        assert_eq!(
            MetricKind::ALL.iter().filter(|k| k.is_directly_observable()).count(),
            11
        );
    }
}
