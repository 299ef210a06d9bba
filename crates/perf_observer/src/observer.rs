//! Subscription lifecycle and batch handling

use crate::config::MetricConfig;
use crate::dispatch::dispatch;
use crate::entry::ObservedEvent;
use crate::kind::MetricKind;
use crate::sink::{LogSink, TracingSink};
use crate::source::{EventSource, Subscription};
use std::sync::Arc;

const UNSUPPORTED_MESSAGE: &str =
    "[WARNING] PerformanceObserver or Paint Timing API is not supported in this environment.";
const DISABLED_MESSAGE: &str = "[INFO] Performance metrics collection is disabled.";
const STARTED_MESSAGE: &str = "[INFO] Performance metrics collection started.";
const STOPPED_MESSAGE: &str = "[INFO] Performance metrics collection stopped.";

/// Watches an [`EventSource`] and logs entries against their thresholds.
///
/// Holds at most one subscription. Calling [`start`](Self::start) while
/// running keeps the existing subscription; [`stop`](Self::stop) is
/// idempotent. Dropping the observer drops the subscription with it.
pub struct MetricsObserver {
    config: Arc<MetricConfig>,
    source: Box<dyn EventSource>,
    sink: Arc<dyn LogSink>,
    subscription: Option<Box<dyn Subscription>>,
    subscribed_kinds: Vec<MetricKind>,
}

impl MetricsObserver {
    /// Create an observer that logs through [`TracingSink`].
    pub fn new(config: MetricConfig, source: impl EventSource + 'static) -> Self {
        Self {
            config: Arc::new(config),
            source: Box::new(source),
            sink: Arc::new(TracingSink),
            subscription: None,
            subscribed_kinds: Vec::new(),
        }
    }

    /// Builder method to log through a different sink.
    pub fn with_sink(mut self, sink: impl LogSink + 'static) -> Self {
        self.sink = Arc::new(sink);
        self
    }

    pub fn config(&self) -> &MetricConfig {
        &self.config
    }

    /// Whether a subscription is live.
    pub fn is_running(&self) -> bool {
        self.subscription.is_some()
    }

    /// Kinds passed to the source by the last successful start.
    pub fn subscribed_kinds(&self) -> &[MetricKind] {
        &self.subscribed_kinds
    }

    /// Subscribe to every kind in the watch-list.
    ///
    /// Logs one line and returns without subscribing when the source is
    /// missing or monitoring is disabled. Paint sub-events are never
    /// requested directly; they come in through `paint`.
    pub fn start(&mut self) {
        if self.subscription.is_some() {
            tracing::debug!(target: "perf_observer", "start ignored, already running");
            return;
        }

        if !self.source.is_supported() {
            self.sink.warn(UNSUPPORTED_MESSAGE);
            return;
        }

        let mut kinds: Vec<MetricKind> = Vec::new();
        for kind in self.config.available_metrics() {
            if kind.is_directly_observable() && !kinds.contains(&kind) {
                kinds.push(kind);
            }
        }

        if !self.config.enabled() || kinds.is_empty() {
            self.sink.info(DISABLED_MESSAGE);
            return;
        }

        let config = Arc::clone(&self.config);
        let sink = Arc::clone(&self.sink);
        let callback = Box::new(move |batch: &[ObservedEvent]| {
            process_batch(&config, sink.as_ref(), batch);
        });

        match self.source.subscribe(&kinds, callback) {
            Ok(subscription) => {
                tracing::debug!(target: "perf_observer", kinds = ?kinds, "subscribed");
                self.subscription = Some(subscription);
                self.subscribed_kinds = kinds;
                self.sink.info(STARTED_MESSAGE);
            }
            Err(err) => {
                tracing::debug!(target: "perf_observer", error = %err, "subscribe failed");
                self.sink.warn(&format!(
                    "[WARNING] Failed to start performance metrics collection: {}",
                    err
                ));
            }
        }
    }

    /// Disconnect from the source. Silent when not running.
    pub fn stop(&mut self) {
        if let Some(mut subscription) = self.subscription.take() {
            subscription.disconnect();
            self.subscribed_kinds.clear();
            self.sink.info(STOPPED_MESSAGE);
        }
    }
}

impl std::fmt::Debug for MetricsObserver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetricsObserver")
            .field("config", &self.config)
            .field("running", &self.is_running())
            .field("subscribed_kinds", &self.subscribed_kinds)
            .finish()
    }
}

/// Filter a delivered batch and dispatch what remains.
///
/// Entries with an unknown type, a disabled kind, or no threshold are
/// dropped without a trace. Returns the number of lines logged.
pub fn process_batch(config: &MetricConfig, sink: &dyn LogSink, batch: &[ObservedEvent]) -> usize {
    batch
        .iter()
        .filter_map(|entry| entry.kind().map(|kind| (kind, entry)))
        .filter(|(kind, _)| config.is_metric_enabled(*kind) && config.threshold(*kind).is_some())
        .filter_map(|(kind, entry)| dispatch(kind, entry, config, sink))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MonitorOptions;
    use crate::sink::RecordingSink;
    use crate::source::ManualSource;

    fn observer(options: MonitorOptions, source: &ManualSource) -> (MetricsObserver, RecordingSink) {
        let sink = RecordingSink::new();
        let observer = MetricsObserver::new(MetricConfig::new(options), source.clone())
            .with_sink(sink.clone());
        (observer, sink)
    }

    #[test]
    fn test_start_subscribes_without_paint_sub_events() {
        let source = ManualSource::new();
        let (mut observer, sink) = observer(MonitorOptions::new(), &source);

        observer.start();

        assert!(observer.is_running());
        assert_eq!(source.active_subscriptions(), 1);
        let kinds = &source.observed_kinds()[0];
        assert_eq!(kinds.len(), 11);
        assert!(kinds.contains(&MetricKind::Paint));
        assert!(!kinds.contains(&MetricKind::FirstPaint));
        assert!(!kinds.contains(&MetricKind::FirstContentfulPaint));
        assert_eq!(observer.subscribed_kinds(), kinds.as_slice());
        assert_eq!(sink.infos(), vec![STARTED_MESSAGE]);
    }

    #[test]
    fn test_start_twice_keeps_one_subscription() {
        let source = ManualSource::new();
        let (mut observer, sink) = observer(MonitorOptions::new(), &source);

        observer.start();
        observer.start();

        assert_eq!(source.active_subscriptions(), 1);
        assert_eq!(sink.len(), 1);
    }

    #[test]
    fn test_unsupported_source() {
        let source = ManualSource::unsupported();
        let (mut observer, sink) = observer(MonitorOptions::new(), &source);

        observer.start();
        observer.stop();

        assert!(!observer.is_running());
        assert_eq!(sink.warnings(), vec![UNSUPPORTED_MESSAGE]);
        assert_eq!(sink.len(), 1);
    }

    #[test]
    fn test_disabled_does_not_subscribe() {
        let source = ManualSource::new();
        let (mut observer, sink) = observer(MonitorOptions::new().with_enabled(false), &source);

        observer.start();

        assert_eq!(source.active_subscriptions(), 0);
        assert_eq!(sink.infos(), vec![DISABLED_MESSAGE]);
    }

    #[test]
    fn test_empty_watch_list_does_not_subscribe() {
        let source = ManualSource::new();
        let (mut observer, sink) = observer(
            MonitorOptions::new().with_enabled_metrics([MetricKind::FirstPaint]),
            &source,
        );

        observer.start();

        assert!(!observer.is_running());
        assert_eq!(sink.infos(), vec![DISABLED_MESSAGE]);
    }

    #[test]
    fn test_refused_subscription_warns() {
        let source = ManualSource::refusing("blocked by policy");
        let (mut observer, sink) = observer(MonitorOptions::new(), &source);

        observer.start();

        assert!(!observer.is_running());
        assert_eq!(
            sink.warnings(),
            vec!["[WARNING] Failed to start performance metrics collection: Platform error: blocked by policy"]
        );
    }

    #[test]
    fn test_stop_is_idempotent() {
        let source = ManualSource::new();
        let (mut observer, sink) = observer(MonitorOptions::new(), &source);

        observer.stop();
        assert!(sink.is_empty());

        observer.start();
        observer.stop();
        observer.stop();

        assert_eq!(source.active_subscriptions(), 0);
        assert_eq!(sink.infos(), vec![STARTED_MESSAGE, STOPPED_MESSAGE]);
        assert!(observer.subscribed_kinds().is_empty());
    }

    #[test]
    fn test_restart_after_stop() {
        let source = ManualSource::new();
        let (mut observer, _sink) = observer(MonitorOptions::new(), &source);

        observer.start();
        observer.stop();
        observer.start();

        assert!(observer.is_running());
        assert_eq!(source.active_subscriptions(), 1);
    }

    #[test]
    fn test_drop_releases_subscription() {
        let source = ManualSource::new();
        let (mut observer, _sink) = observer(MonitorOptions::new(), &source);
        observer.start();
        drop(observer);

        assert_eq!(source.active_subscriptions(), 0);
    }

    #[test]
    fn test_process_batch_filters() {
        let config = MetricConfig::new(
            MonitorOptions::new()
                .with_disabled(MetricKind::Resource)
                .with_log_info(true),
        );
        let sink = RecordingSink::new();
        let batch = vec![
            ObservedEvent::new("resource", "skip.js").with_duration(900.0),
            ObservedEvent::new("mark", "app-ready"),
            ObservedEvent::new("navigation", "https://example.com/").with_duration(2500.0),
            ObservedEvent::new("event", "click").with_duration(10.0),
        ];

        assert_eq!(process_batch(&config, &sink, &batch), 2);
        assert_eq!(
            sink.warnings(),
            vec!["[WARNING] navigation: \"https://example.com/\" exceeded the threshold: 2500.00ms (threshold: 2000ms)."]
        );
        assert_eq!(sink.infos(), vec!["[INFO] event: \"click\" completed in 10.00ms."]);
    }
}
