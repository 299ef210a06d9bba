//! Timing helpers for functions, futures and scopes

use crate::dispatch::to_fixed;
use crate::sink::LogSink;
use std::future::Future;

/// Milliseconds since the time origin.
///
/// In the browser this is `Performance.now()`; elsewhere it counts from the
/// first call in this process.
#[cfg(all(feature = "browser", target_arch = "wasm32"))]
pub fn now_ms() -> f64 {
    web_sys::window()
        .and_then(|window| window.performance())
        .map(|performance| performance.now())
        .unwrap_or(0.0)
}

/// Milliseconds since the time origin.
///
/// In the browser this is `Performance.now()`; elsewhere it counts from the
/// first call in this process.
#[cfg(not(all(feature = "browser", target_arch = "wasm32")))]
pub fn now_ms() -> f64 {
    use std::sync::OnceLock;
    use std::time::Instant;

    static ORIGIN: OnceLock<Instant> = OnceLock::new();
    ORIGIN.get_or_init(Instant::now).elapsed().as_secs_f64() * 1000.0
}

/// What a timed unit is called in its log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimedKind {
    Function,
    Method,
}

impl TimedKind {
    fn label(self) -> &'static str {
        match self {
            TimedKind::Function => "Function",
            TimedKind::Method => "Method",
        }
    }
}

/// `[INFO] Function <name> executed in <ms>ms`
pub fn format_execution(kind: TimedKind, name: &str, elapsed_ms: f64) -> String {
    format!(
        "[INFO] {} {} executed in {}ms",
        kind.label(),
        name,
        to_fixed(elapsed_ms, 2)
    )
}

/// Run `f` and log how long it took.
///
/// # Example
///
/// ```rust
/// use perf_observer::{measure, RecordingSink};
///
/// let sink = RecordingSink::new();
/// let sum = measure(&sink, "sum", || (1..=10).sum::<u32>());
/// assert_eq!(sum, 55);
/// assert_eq!(sink.infos().len(), 1);
/// ```
pub fn measure<T, F: FnOnce() -> T>(sink: &dyn LogSink, name: &str, f: F) -> T {
    let start = now_ms();
    let result = f();
    sink.info(&format_execution(TimedKind::Function, name, now_ms() - start));
    result
}

/// Await `future` and log how long it took to resolve.
pub async fn measure_future<F: Future>(sink: &dyn LogSink, name: &str, future: F) -> F::Output {
    let start = now_ms();
    let output = future.await;
    sink.info(&format_execution(TimedKind::Function, name, now_ms() - start));
    output
}

/// Logs the time between creation and drop.
///
/// # Example
///
/// ```rust
/// use perf_observer::{RecordingSink, TimedScope};
///
/// let sink = RecordingSink::new();
/// {
///     let _scope = TimedScope::method(&sink, "Editor::save");
///     // ... work ...
/// }
/// assert!(sink.infos()[0].starts_with("[INFO] Method Editor::save executed in"));
/// ```
pub struct TimedScope<'a> {
    sink: &'a dyn LogSink,
    kind: TimedKind,
    name: String,
    start: f64,
    done: bool,
}

impl<'a> TimedScope<'a> {
    /// Start timing a method.
    pub fn method(sink: &'a dyn LogSink, name: impl Into<String>) -> Self {
        Self::new(sink, TimedKind::Method, name)
    }

    /// Start timing a function.
    pub fn function(sink: &'a dyn LogSink, name: impl Into<String>) -> Self {
        Self::new(sink, TimedKind::Function, name)
    }

    fn new(sink: &'a dyn LogSink, kind: TimedKind, name: impl Into<String>) -> Self {
        Self {
            sink,
            kind,
            name: name.into(),
            start: now_ms(),
            done: false,
        }
    }

    #[inline]
    pub fn elapsed_ms(&self) -> f64 {
        now_ms() - self.start
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Log now and return the elapsed milliseconds.
    pub fn finish(mut self) -> f64 {
        self.log()
    }

    /// Return the elapsed milliseconds without logging.
    pub fn cancel(mut self) -> f64 {
        self.done = true;
        self.elapsed_ms()
    }

    fn log(&mut self) -> f64 {
        let elapsed = self.elapsed_ms();
        if !self.done {
            self.done = true;
            self.sink
                .info(&format_execution(self.kind, &self.name, elapsed));
        }
        elapsed
    }
}

impl Drop for TimedScope<'_> {
    fn drop(&mut self) {
        self.log();
    }
}
