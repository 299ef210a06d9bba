//! Performance Timeline Observer
//!
//! This crate watches performance timeline entries (paint timing, resource
//! loads, long tasks, layout shifts and friends), compares each against a
//! per-kind threshold, and logs a warning for every entry over budget:
//! - [`MetricConfig`] resolves caller [`MonitorOptions`] against built-in thresholds
//! - [`MetricsObserver`] subscribes to an [`EventSource`] and dispatches entries by kind
//! - [`Monitor`] picks the default master switch from the [`Environment`]
//! - [`measure`], [`measure_future`] and [`TimedScope`] time host code
//!
//! Output goes through a [`LogSink`]; [`TracingSink`] is the default.
//!
//! # Feature Flags
//!
//! - `browser`: `PerformanceObserver` event source and console sink (wasm32 only)
//!
//! # Example
//!
//! ```rust
//! use perf_observer::{
//!     Attribution, ManualSource, MetricConfig, MetricKind, MetricsObserver, MonitorOptions,
//!     ObservedEvent, RecordingSink,
//! };
//!
//! let source = ManualSource::new();
//! let sink = RecordingSink::new();
//! let config = MetricConfig::new(MonitorOptions::new().with_threshold(MetricKind::LongTask, 50.0));
//! let mut observer = MetricsObserver::new(config, source.clone()).with_sink(sink.clone());
//!
//! observer.start();
//! source.emit(&[ObservedEvent::new("longtask", "self")
//!     .with_duration(75.0)
//!     .with_attribution(Attribution::new("foo", "iframe", "x.html"))]);
//!
//! assert_eq!(sink.warnings().len(), 1);
//! assert!(sink.warnings()[0].contains("(threshold: 50ms)"));
//! ```

mod config;
mod dispatch;
mod entry;
mod error;
mod kind;
mod monitor;
mod observer;
mod sink;
mod source;
mod timing;

#[cfg(all(feature = "browser", target_arch = "wasm32"))]
mod browser;

pub use config::{default_thresholds, MetricConfig, MonitorOptions};
pub use dispatch::{
    dispatch, evaluate, format_info, format_warning, to_fixed, EntryHandler, Measurement, Verdict,
};
pub use entry::{Attribution, ObservedEvent};
pub use error::{MonitorError, MonitorResult};
pub use kind::MetricKind;
pub use monitor::{Environment, Monitor};
pub use observer::{process_batch, MetricsObserver};
pub use sink::{LogLevel, LogLine, LogSink, RecordingSink, TracingSink};
pub use source::{BatchCallback, EventSource, ManualSource, Subscription};
pub use timing::{format_execution, measure, measure_future, now_ms, TimedKind, TimedScope};

#[cfg(all(feature = "browser", target_arch = "wasm32"))]
pub use browser::{browser_monitor, entry_from_js, BrowserSource, ConsoleSink};
