//! `PerformanceObserver` integration for wasm32 browser builds

use crate::config::MonitorOptions;
use crate::entry::{Attribution, ObservedEvent};
use crate::error::{MonitorError, MonitorResult};
use crate::kind::MetricKind;
use crate::monitor::Monitor;
use crate::sink::LogSink;
use crate::source::{BatchCallback, EventSource, Subscription};
use js_sys::{Array, Object, Reflect};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{PerformanceObserver, PerformanceObserverEntryList, PerformanceObserverInit};

type ObserverClosure = Closure<dyn FnMut(PerformanceObserverEntryList, PerformanceObserver)>;

/// Event source backed by the page's `PerformanceObserver`.
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserSource;

impl EventSource for BrowserSource {
    fn is_supported(&self) -> bool {
        Reflect::has(&js_sys::global(), &JsValue::from_str("PerformanceObserver")).unwrap_or(false)
    }

    fn subscribe(
        &self,
        kinds: &[MetricKind],
        mut callback: BatchCallback,
    ) -> MonitorResult<Box<dyn Subscription>> {
        let closure: ObserverClosure = Closure::new(
            move |list: PerformanceObserverEntryList, _observer: PerformanceObserver| {
                let batch: Vec<ObservedEvent> =
                    list.get_entries().iter().map(|entry| entry_from_js(&entry)).collect();
                callback(&batch);
            },
        );

        let observer =
            PerformanceObserver::new(closure.as_ref().unchecked_ref()).map_err(platform_error)?;

        let entry_types: Array = kinds
            .iter()
            .map(|kind| JsValue::from_str(kind.as_str()))
            .collect();
        let init: PerformanceObserverInit = Object::new().unchecked_into();
        Reflect::set(&init, &JsValue::from_str("entryTypes"), &entry_types)
            .map_err(platform_error)?;
        observer.observe(&init);

        Ok(Box::new(BrowserSubscription {
            observer,
            _closure: closure,
            connected: true,
        }))
    }
}

struct BrowserSubscription {
    observer: PerformanceObserver,
    _closure: ObserverClosure,
    connected: bool,
}

impl Subscription for BrowserSubscription {
    fn disconnect(&mut self) {
        if self.connected {
            self.observer.disconnect();
            self.connected = false;
        }
    }
}

impl Drop for BrowserSubscription {
    fn drop(&mut self) {
        self.disconnect();
    }
}

/// Writes lines to the browser console.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleSink;

impl LogSink for ConsoleSink {
    fn info(&self, line: &str) {
        web_sys::console::info_1(&JsValue::from_str(line));
    }

    fn warn(&self, line: &str) {
        web_sys::console::warn_1(&JsValue::from_str(line));
    }
}

/// A monitor wired to the page's `PerformanceObserver` and console.
pub fn browser_monitor(options: MonitorOptions) -> Monitor {
    Monitor::new(options, BrowserSource).with_sink(ConsoleSink)
}

/// Read a platform entry object into an [`ObservedEvent`].
pub fn entry_from_js(entry: &JsValue) -> ObservedEvent {
    ObservedEvent {
        entry_type: read_string(entry, "entryType").unwrap_or_default(),
        name: read_string(entry, "name").unwrap_or_default(),
        start_time: read_f64(entry, "startTime").unwrap_or(0.0),
        duration: read_f64(entry, "duration").unwrap_or(0.0),
        render_time: read_f64(entry, "renderTime"),
        load_time: read_f64(entry, "loadTime"),
        value: read_f64(entry, "value"),
        attribution: read_attribution(entry),
    }
}

fn read_attribution(entry: &JsValue) -> Vec<Attribution> {
    let Ok(list) = Reflect::get(entry, &JsValue::from_str("attribution")) else {
        return Vec::new();
    };
    if !Array::is_array(&list) {
        return Vec::new();
    }

    Array::from(&list)
        .iter()
        .map(|item| Attribution {
            name: read_string(&item, "name"),
            container_type: read_string(&item, "containerType"),
            container_src: read_string(&item, "containerSrc"),
        })
        .collect()
}

fn read_f64(target: &JsValue, key: &str) -> Option<f64> {
    Reflect::get(target, &JsValue::from_str(key))
        .ok()
        .and_then(|value| value.as_f64())
}

fn read_string(target: &JsValue, key: &str) -> Option<String> {
    Reflect::get(target, &JsValue::from_str(key))
        .ok()
        .and_then(|value| value.as_string())
}

fn platform_error(err: JsValue) -> MonitorError {
    MonitorError::Platform(format!("{:?}", err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn set(target: &Object, key: &str, value: JsValue) {
        Reflect::set(target, &JsValue::from_str(key), &value).unwrap();
    }

    #[wasm_bindgen_test]
    fn test_entry_from_js() {
        let attribution = Object::new();
        set(&attribution, "name", JsValue::from_str("unknown"));
        set(&attribution, "containerType", JsValue::from_str("iframe"));

        let entry = Object::new();
        set(&entry, "entryType", JsValue::from_str("longtask"));
        set(&entry, "name", JsValue::from_str("self"));
        set(&entry, "startTime", JsValue::from_f64(12.0));
        set(&entry, "duration", JsValue::from_f64(80.0));
        set(&entry, "attribution", Array::of1(&attribution).into());

        let event = entry_from_js(&entry);
        assert_eq!(event.kind(), Some(MetricKind::LongTask));
        assert_eq!(event.duration, 80.0);
        assert_eq!(event.render_time, None);
        assert_eq!(event.attribution.len(), 1);
        assert_eq!(event.attribution[0].container_src, None);
    }

    #[wasm_bindgen_test]
    fn test_browser_source_detects_support() {
        assert!(BrowserSource.is_supported());
    }
}
