//! Monitoring configuration

use crate::error::MonitorResult;
use crate::kind::MetricKind;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Built-in thresholds, in milliseconds (layout shift is a unitless score).
pub fn default_thresholds() -> BTreeMap<MetricKind, f64> {
    BTreeMap::from([
        (MetricKind::Resource, 300.0),
        (MetricKind::Navigation, 2000.0),
        (MetricKind::Paint, 100.0),
        (MetricKind::FirstPaint, 100.0),
        (MetricKind::FirstContentfulPaint, 150.0),
        (MetricKind::LongTask, 50.0),
        (MetricKind::FirstInput, 100.0),
        (MetricKind::LayoutShift, 0.1),
        (MetricKind::Event, 50.0),
        (MetricKind::LargestContentfulPaint, 2500.0),
        (MetricKind::Element, 10.0),
        (MetricKind::LongAnimationFrame, 10.0),
        (MetricKind::VisibilityState, 10.0),
    ])
}

/// Caller-supplied monitoring options.
///
/// Every field is optional; anything left out falls back to the built-in
/// defaults when the options are resolved into a [`MetricConfig`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitorOptions {
    /// Per-kind threshold overrides, merged over [`default_thresholds`]
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub thresholds: BTreeMap<MetricKind, f64>,
    /// Kinds to leave out of the watch-list
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub disabled_metrics: Vec<MetricKind>,
    /// Exclusive watch-list; replaces the deny-list entirely when set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled_metrics: Option<Vec<MetricKind>>,
    /// Master switch
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    /// Log entries that stay under their threshold
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_info: Option<bool>,
}

impl MonitorOptions {
    /// Create empty options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse options from a JSON document.
    pub fn from_json(json: &str) -> MonitorResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Builder method to override one threshold.
    pub fn with_threshold(mut self, kind: MetricKind, threshold: f64) -> Self {
        self.thresholds.insert(kind, threshold);
        self
    }

    /// Builder method to exclude a kind from the watch-list.
    pub fn with_disabled(mut self, kind: MetricKind) -> Self {
        self.disabled_metrics.push(kind);
        self
    }

    /// Builder method to watch exactly the given kinds.
    pub fn with_enabled_metrics(mut self, kinds: impl IntoIterator<Item = MetricKind>) -> Self {
        self.enabled_metrics = Some(kinds.into_iter().collect());
        self
    }

    /// Builder method to set the master switch.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = Some(enabled);
        self
    }

    /// Builder method to log entries that stay under their threshold.
    pub fn with_log_info(mut self, log_info: bool) -> Self {
        self.log_info = Some(log_info);
        self
    }

    /// Fill in `enabled` when the caller left it unset.
    pub(crate) fn or_enabled(mut self, enabled: bool) -> Self {
        if self.enabled.is_none() {
            self.enabled = Some(enabled);
        }
        self
    }
}

/// Resolved, immutable monitoring configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricConfig {
    enabled: bool,
    log_info: bool,
    thresholds: BTreeMap<MetricKind, f64>,
    disabled_metrics: BTreeSet<MetricKind>,
    enabled_metrics: Option<Vec<MetricKind>>,
}

impl MetricConfig {
    /// Resolve caller options against the built-in defaults.
    pub fn new(options: MonitorOptions) -> Self {
        let mut thresholds = default_thresholds();
        thresholds.extend(options.thresholds);

        Self {
            enabled: options.enabled.unwrap_or(true),
            log_info: options.log_info.unwrap_or(false),
            thresholds,
            disabled_metrics: options.disabled_metrics.into_iter().collect(),
            enabled_metrics: options.enabled_metrics,
        }
    }

    /// Master switch.
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Whether under-threshold entries are logged.
    pub fn log_info(&self) -> bool {
        self.log_info
    }

    /// The effective watch-list.
    ///
    /// An explicit allow-list is returned as given; otherwise every kind
    /// not in the deny-list, in [`MetricKind::ALL`] order.
    pub fn available_metrics(&self) -> Vec<MetricKind> {
        match &self.enabled_metrics {
            Some(kinds) => kinds.clone(),
            None => MetricKind::ALL
                .iter()
                .copied()
                .filter(|kind| !self.disabled_metrics.contains(kind))
                .collect(),
        }
    }

    /// Whether monitoring is on and `kind` is in the effective watch-list.
    pub fn is_metric_enabled(&self, kind: MetricKind) -> bool {
        self.enabled && self.in_watch_list(kind)
    }

    /// Whether a named `paint` entry (`first-paint` or
    /// `first-contentful-paint`) should be handled.
    ///
    /// An allow-list that names `paint` covers both sub-events; a deny-list
    /// has to name the sub-event itself to suppress it.
    pub fn is_paint_entry_enabled(&self, kind: MetricKind) -> bool {
        if !self.enabled || !kind.is_paint_sub_event() {
            return false;
        }
        match &self.enabled_metrics {
            Some(kinds) => kinds.contains(&kind) || kinds.contains(&MetricKind::Paint),
            None => !self.disabled_metrics.contains(&kind),
        }
    }

    /// The configured threshold for `kind`, if any.
    pub fn threshold(&self, kind: MetricKind) -> Option<f64> {
        self.thresholds.get(&kind).copied()
    }

    fn in_watch_list(&self, kind: MetricKind) -> bool {
        match &self.enabled_metrics {
            Some(kinds) => kinds.contains(&kind),
            None => !self.disabled_metrics.contains(&kind),
        }
    }
}

impl Default for MetricConfig {
    fn default() -> Self {
        Self::new(MonitorOptions::default())
    }
}
