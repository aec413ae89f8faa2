//! Outbound W3C Trace Context propagation for HTTP gateways.
//!
//! When OpenTelemetry is disabled (no global propagator registered), no
//! headers are produced.

use opentelemetry::propagation::Injector;
use opentelemetry::{Context, global};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

struct HeaderInjector<'a>(&'a mut HeaderMap);

impl Injector for HeaderInjector<'_> {
    fn set(&mut self, key: &str, value: String) {
        if let Ok(name) = HeaderName::from_bytes(key.as_bytes())
            && let Ok(val) = HeaderValue::from_str(&value)
        {
            self.0.insert(name, val);
        }
    }
}

/// Add the current span's `traceparent` / `tracestate` headers to `headers`.
///
/// Existing entries with the same names are overwritten; all other headers
/// are left untouched.
pub fn inject_trace_context(headers: &mut HeaderMap) {
    let cx = Context::current();
    global::get_text_map_propagator(|propagator| {
        propagator.inject_context(&cx, &mut HeaderInjector(headers));
    });
}
