//! Per-kind value extraction and threshold logging
//!
//! Every entry that survives the observer's filter is routed by kind to one
//! [`EntryHandler`], which pulls out the value to compare. The comparison and
//! the log line format are the same for every handler.

use crate::config::MetricConfig;
use crate::entry::ObservedEvent;
use crate::kind::MetricKind;
use crate::sink::{LogLevel, LogSink};

/// How a kind's comparable value is read from an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryHandler {
    /// Named `first-paint` / `first-contentful-paint` entries, by start time
    Paint,
    /// Duration, plus attribution details
    LongTask,
    /// Render time, then load time, then start time
    LargestContentfulPaint,
    /// Shift score, falling back to duration
    LayoutShift,
    /// Time-point metrics measured by their start time
    StartTime,
    /// Everything else: the entry's duration
    Duration,
}

impl EntryHandler {
    /// The handler for `kind`.
    pub fn for_kind(kind: MetricKind) -> Self {
        match kind {
            MetricKind::Paint => EntryHandler::Paint,
            MetricKind::LongTask => EntryHandler::LongTask,
            MetricKind::LargestContentfulPaint => EntryHandler::LargestContentfulPaint,
            MetricKind::LayoutShift => EntryHandler::LayoutShift,
            MetricKind::FirstInput | MetricKind::VisibilityState => EntryHandler::StartTime,
            MetricKind::FirstPaint | MetricKind::FirstContentfulPaint => EntryHandler::StartTime,
            MetricKind::Resource
            | MetricKind::Navigation
            | MetricKind::Event
            | MetricKind::Element
            | MetricKind::LongAnimationFrame => EntryHandler::Duration,
        }
    }

    /// Extract the measurement for an entry of `kind`.
    ///
    /// Returns `None` when the handler declines the entry (a paint entry
    /// that is not a first paint, or whose sub-event is switched off).
    pub fn measure(
        self,
        kind: MetricKind,
        entry: &ObservedEvent,
        config: &MetricConfig,
    ) -> Option<Measurement> {
        let measurement = match self {
            EntryHandler::Paint => {
                let paint = entry.name.parse::<MetricKind>().ok()?;
                if !paint.is_paint_sub_event() || !config.is_paint_entry_enabled(paint) {
                    return None;
                }
                Measurement::new(paint, entry, entry.start_time)
            }
            EntryHandler::LongTask => Measurement::new(kind, entry, entry.duration)
                .with_details(attribution_details(entry)),
            EntryHandler::LargestContentfulPaint => {
                let value = [entry.render_time, entry.load_time]
                    .into_iter()
                    .flatten()
                    .find(|v| *v != 0.0)
                    .unwrap_or(entry.start_time);
                Measurement::new(kind, entry, value)
            }
            EntryHandler::LayoutShift => {
                Measurement::new(kind, entry, entry.value.unwrap_or(entry.duration))
            }
            EntryHandler::StartTime => Measurement::new(kind, entry, entry.start_time),
            EntryHandler::Duration => Measurement::new(kind, entry, entry.duration),
        };
        Some(measurement)
    }
}

/// A value pulled out of an entry, ready for the threshold check.
#[derive(Debug, Clone, PartialEq)]
pub struct Measurement {
    /// Kind whose threshold applies; also the label in the log line
    pub kind: MetricKind,
    /// Entry name, omitted from the log line when empty or equal to the kind
    pub name: String,
    /// Milliseconds compared against the threshold (unitless for layout shift)
    pub value: f64,
    /// Attribution text appended after `Details:`, empty when there is none
    pub details: String,
}

impl Measurement {
    fn new(kind: MetricKind, entry: &ObservedEvent, value: f64) -> Self {
        Self {
            kind,
            name: entry.name.clone(),
            value,
            details: String::new(),
        }
    }

    fn with_details(mut self, details: String) -> Self {
        self.details = details;
        self
    }
}

/// Outcome of comparing a measurement against its threshold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Verdict {
    /// Strictly above a configured, non-zero threshold
    Exceeded { threshold: f64 },
    /// Under threshold and informational logging is on
    Completed,
    /// Nothing to log
    Quiet,
}

/// Compare a measurement against the configured threshold.
pub fn evaluate(measurement: &Measurement, config: &MetricConfig) -> Verdict {
    // A zero threshold counts as no threshold and never warns.
    let threshold = config
        .threshold(measurement.kind)
        .filter(|threshold| *threshold != 0.0);

    match threshold {
        Some(threshold) if measurement.value > threshold => Verdict::Exceeded { threshold },
        _ if config.log_info() => Verdict::Completed,
        _ => Verdict::Quiet,
    }
}

/// Route one entry to its handler and log the result.
///
/// Returns the level of the line written, if any.
pub fn dispatch(
    kind: MetricKind,
    entry: &ObservedEvent,
    config: &MetricConfig,
    sink: &dyn LogSink,
) -> Option<LogLevel> {
    let measurement = EntryHandler::for_kind(kind).measure(kind, entry, config)?;
    let verdict = evaluate(&measurement, config);

    tracing::trace!(
        target: "perf_observer",
        kind = %measurement.kind,
        name = %measurement.name,
        value_ms = measurement.value,
        ?verdict,
        "entry evaluated"
    );

    match verdict {
        Verdict::Exceeded { threshold } => {
            sink.warn(&format_warning(&measurement, threshold));
            Some(LogLevel::Warn)
        }
        Verdict::Completed => {
            sink.info(&format_info(&measurement));
            Some(LogLevel::Info)
        }
        Verdict::Quiet => None,
    }
}

/// `[WARNING] <type>: "<name>" exceeded the threshold: <v>ms (threshold: <t>ms).`
pub fn format_warning(measurement: &Measurement, threshold: f64) -> String {
    format!(
        "[WARNING] {}{}exceeded the threshold: {}ms (threshold: {}ms).{}",
        measurement.kind,
        name_segment(measurement),
        to_fixed(measurement.value, 2),
        threshold,
        details_suffix(&measurement.details),
    )
}

/// `[INFO] <type>: "<name>" completed in <v>ms.`
pub fn format_info(measurement: &Measurement) -> String {
    format!(
        "[INFO] {}{}completed in {}ms.{}",
        measurement.kind,
        name_segment(measurement),
        to_fixed(measurement.value, 2),
        details_suffix(&measurement.details),
    )
}

/// Format `value` with `digits` decimals, rounding exact ties away from zero.
///
/// `{:.2}` rounds a value that sits exactly halfway to even, so `75.125`
/// would print as `75.12`. Timeline values are often such ties; log lines
/// print them as `75.13`.
pub fn to_fixed(value: f64, digits: usize) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if value == 0.0 {
        return format!("{:.*}", digits, 0.0);
    }

    // A binary value is exactly halfway between two `digits`-place decimals
    // iff it is an odd multiple of 2^-(digits + 1).
    let magnitude = value.abs();
    let halves = magnitude * 2f64.powi(digits as i32 + 1);
    if halves.fract() == 0.0 && halves % 2.0 == 1.0 {
        let scale = 10f64.powi(digits as i32);
        let rounded = (magnitude * scale).ceil() / scale;
        return format!("{:.*}", digits, rounded.copysign(value));
    }

    format!("{:.*}", digits, value)
}

fn name_segment(measurement: &Measurement) -> String {
    if measurement.name.is_empty() || measurement.name == measurement.kind.as_str() {
        " ".to_string()
    } else {
        format!(": \"{}\" ", measurement.name)
    }
}

fn details_suffix(details: &str) -> String {
    if details.is_empty() {
        String::new()
    } else {
        format!("\nDetails: {}", details)
    }
}

fn attribution_details(entry: &ObservedEvent) -> String {
    entry
        .attribution
        .iter()
        .map(|attribution| attribution.describe())
        .collect::<Vec<_>>()
        .join("; ")
}
