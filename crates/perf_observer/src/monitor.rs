//! Monitoring facade

use crate::config::{MetricConfig, MonitorOptions};
use crate::observer::MetricsObserver;
use crate::sink::LogSink;
use crate::source::EventSource;

/// Deployment environment, used only to pick the default master switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Production,
    Development,
}

impl Environment {
    /// Resolve from the build profile: builds without debug assertions are
    /// production.
    pub fn detect() -> Self {
        if cfg!(debug_assertions) {
            Environment::Development
        } else {
            Environment::Production
        }
    }

    pub fn is_production(self) -> bool {
        matches!(self, Environment::Production)
    }

    /// Monitoring is off by default in production.
    pub fn default_enabled(self) -> bool {
        !self.is_production()
    }
}

/// Single-shot performance monitoring for the lifetime of a page or host.
///
/// Keep the monitor alive for as long as entries should be logged; dropping
/// it releases the underlying subscription.
///
/// # Example
///
/// ```rust
/// use perf_observer::{ManualSource, MetricKind, Monitor, MonitorOptions, ObservedEvent};
///
/// let source = ManualSource::new();
/// let mut monitor = Monitor::new(
///     MonitorOptions::new().with_threshold(MetricKind::LongTask, 50.0),
///     source.clone(),
/// );
/// monitor.start();
///
/// source.emit(&[ObservedEvent::new("longtask", "self").with_duration(75.0)]);
/// ```
#[derive(Debug)]
pub struct Monitor {
    observer: MetricsObserver,
}

impl Monitor {
    /// Create a monitor, detecting the environment from the build profile.
    pub fn new(options: MonitorOptions, source: impl EventSource + 'static) -> Self {
        Self::with_environment(options, source, Environment::detect())
    }

    /// Create a monitor for an explicit environment.
    ///
    /// A caller-supplied `enabled` always wins over the environment default.
    pub fn with_environment(
        options: MonitorOptions,
        source: impl EventSource + 'static,
        environment: Environment,
    ) -> Self {
        let options = options.or_enabled(environment.default_enabled());
        tracing::debug!(
            target: "perf_observer",
            ?environment,
            enabled = ?options.enabled,
            "monitor configured"
        );
        let config = MetricConfig::new(options);
        Self {
            observer: MetricsObserver::new(config, source),
        }
    }

    /// Builder method to log through a different sink.
    pub fn with_sink(self, sink: impl LogSink + 'static) -> Self {
        Self {
            observer: self.observer.with_sink(sink),
        }
    }

    /// Begin monitoring.
    pub fn start(&mut self) {
        self.observer.start();
    }

    pub fn observer(&self) -> &MetricsObserver {
        &self.observer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::RecordingSink;
    use crate::source::ManualSource;

    #[test]
    fn test_environment_defaults() {
        assert!(!Environment::Production.default_enabled());
        assert!(Environment::Development.default_enabled());
        assert_eq!(Environment::detect().is_production(), !cfg!(debug_assertions));
    }

    #[test]
    fn test_production_disables_by_default() {
        let sink = RecordingSink::new();
        let source = ManualSource::new();
        let mut monitor =
            Monitor::with_environment(MonitorOptions::new(), source.clone(), Environment::Production)
                .with_sink(sink.clone());

        monitor.start();

        assert!(!monitor.observer().config().enabled());
        assert_eq!(source.active_subscriptions(), 0);
        assert_eq!(sink.infos(), vec!["[INFO] Performance metrics collection is disabled."]);
    }

    #[test]
    fn test_caller_enabled_overrides_environment() {
        let source = ManualSource::new();
        let mut monitor = Monitor::with_environment(
            MonitorOptions::new().with_enabled(true),
            source.clone(),
            Environment::Production,
        )
        .with_sink(RecordingSink::new());

        monitor.start();

        assert!(monitor.observer().is_running());
        assert_eq!(source.active_subscriptions(), 1);
    }

    #[test]
    fn test_development_enables_by_default() {
        let monitor = Monitor::with_environment(
            MonitorOptions::new(),
            ManualSource::new(),
            Environment::Development,
        );
        assert!(monitor.observer().config().enabled());
        assert!(!monitor.observer().is_running());
    }
}
