//! The call recorder.
//!
//! A `TraceContext` is created for one request and passed by reference to
//! every traced call made on its behalf. Wrapping is explicit:
//!
//!   Inputs (snapshot at entry) → reserve slot → call → snapshot output → fill slot
//!
//! The wrapped callable's return value, or its error, is handed back to the
//! caller untouched. The record is a side effect only.

use std::{
    convert::Infallible,
    fmt,
    sync::atomic::{AtomicU32, Ordering},
    time::Instant,
};

use chrono::{Duration as TimeDelta, Utc};
use indexmap::IndexMap;
use serde::Serialize;
use tracing::{debug, warn};

use explainx_contracts::{
    record::{CallCapture, CallRecord},
    report::RequestId,
    value::TraceValue,
};

use crate::buffer::TraceBuffer;

/// Static description of a traced callable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallSite {
    /// Name recorded as the record's `function`.
    pub function: &'static str,
    /// Module / file reference shown in reports.
    pub location: &'static str,
    /// Best-effort text of the definition.
    pub source: &'static str,
    /// Parameter names in declaration order.
    pub params: &'static [&'static str],
}

impl CallSite {
    pub const fn new(
        function: &'static str,
        location: &'static str,
        source: &'static str,
        params: &'static [&'static str],
    ) -> Self {
        Self { function, location, source, params }
    }
}

/// Argument snapshots for one call, keyed by parameter name.
#[derive(Debug, Clone, Default)]
pub struct Inputs(IndexMap<String, TraceValue>);

impl Inputs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot `value` under `name`.
    ///
    /// A value whose `Serialize` impl fails is recorded as a placeholder
    /// string; the call itself is unaffected.
    pub fn arg<T: Serialize + ?Sized>(mut self, name: &str, value: &T) -> Self {
        self.0.insert(name.to_string(), capture("argument", name, value));
        self
    }

    /// Snapshot a tuple of positional arguments against `params`.
    ///
    /// `args` must be a tuple with one element per parameter (`(x,)` for a
    /// single argument). Anything else is recorded whole under `"args"`.
    pub fn positional<A: Serialize>(params: &[&str], args: &A) -> Self {
        if params.is_empty() {
            return Self::new();
        }
        match capture("argument", "args", args) {
            TraceValue::List(values) if values.len() == params.len() => Self(
                params
                    .iter()
                    .map(|p| p.to_string())
                    .zip(values)
                    .collect(),
            ),
            other => {
                let mut map = IndexMap::new();
                map.insert("args".to_string(), other);
                Self(map)
            }
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_map(self) -> IndexMap<String, TraceValue> {
        self.0
    }
}

fn capture<T: Serialize + ?Sized>(what: &str, name: &str, value: &T) -> TraceValue {
    match TraceValue::try_capture(value) {
        Ok(v) => v,
        Err(e) => {
            warn!(
                kind = what,
                name = name,
                type_name = std::any::type_name::<T>(),
                error = %e,
                "value could not be captured; recording placeholder"
            );
            TraceValue::placeholder(std::any::type_name::<T>(), &e.to_string())
        }
    }
}

/// Restores the nesting depth even if the traced callable panics.
struct DepthGuard<'a>(&'a AtomicU32);

impl Drop for DepthGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Request-scoped recording context.
///
/// Construct one per request; never share one between requests. Dropping
/// the context discards anything not yet drained.
pub struct TraceContext {
    request_id: RequestId,
    buffer: TraceBuffer,
    depth: AtomicU32,
}

impl TraceContext {
    /// A context with a new request ID and an empty buffer.
    pub fn new() -> Self {
        Self::with_request_id(RequestId::new())
    }

    pub fn with_request_id(request_id: RequestId) -> Self {
        Self {
            request_id,
            buffer: TraceBuffer::new(),
            depth: AtomicU32::new(0),
        }
    }

    pub fn request_id(&self) -> &RequestId {
        &self.request_id
    }

    /// Run an infallible callable and record it.
    pub fn record<T, F>(&self, site: &CallSite, inputs: Inputs, f: F) -> T
    where
        T: Serialize,
        F: FnOnce() -> T,
    {
        match self.try_record(site, inputs, || Ok::<T, Infallible>(f())) {
            Ok(value) => value,
            Err(never) => match never {},
        }
    }

    /// Run a fallible callable and record it.
    ///
    /// On `Err` the record is tagged with the error's display text and a null
    /// output; the error itself is returned to the caller unchanged.
    pub fn try_record<T, E, F>(&self, site: &CallSite, inputs: Inputs, f: F) -> Result<T, E>
    where
        T: Serialize,
        E: fmt::Display,
        F: FnOnce() -> Result<T, E>,
    {
        let ticket = self.buffer.begin_call(site.function);
        let depth = self.depth.fetch_add(1, Ordering::SeqCst);
        let guard = DepthGuard(&self.depth);

        debug!(
            request_id = %self.request_id.0,
            function = site.function,
            depth,
            "traced call starting"
        );

        // Both the end time and the duration come from one monotonic reading,
        // so `ended_at - started_at` is exactly `duration_ms`.
        let started_at = Utc::now();
        let clock = Instant::now();
        let outcome = f();
        let elapsed = clock.elapsed();
        drop(guard);
        let duration_ms = elapsed.as_secs_f64() * 1000.0;
        let ended_at = TimeDelta::from_std(elapsed)
            .ok()
            .and_then(|delta| started_at.checked_add_signed(delta))
            .unwrap_or(started_at);

        let capture_fields = CallCapture {
            function: site.function.to_string(),
            location: site.location.to_string(),
            source_text: site.source.to_string(),
            inputs: inputs.into_map(),
            depth,
            started_at,
            ended_at,
            duration_ms,
        };

        let record = match &outcome {
            Ok(value) => CallRecord::succeeded(
                capture_fields,
                capture("return value", site.function, value),
            ),
            Err(e) => {
                debug!(
                    request_id = %self.request_id.0,
                    function = site.function,
                    error = %e,
                    "traced call failed"
                );
                CallRecord::failed(capture_fields, e.to_string())
            }
        };
        self.buffer.finish_call(ticket, record);

        outcome
    }

    /// Clear the buffer. A fresh context is already empty.
    pub fn reset(&self) {
        self.buffer.reset();
    }

    /// Take every finished record in call-start order.
    pub fn drain(&self) -> Vec<CallRecord> {
        self.buffer.drain()
    }

    /// Number of finished records not yet drained.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
}

impl Default for TraceContext {
    fn default() -> Self {
        Self::new()
    }
}

/// A callable paired with its call site; produced by [`traced_fn`].
pub struct TracedFn<F> {
    site: CallSite,
    f: F,
}

/// Wrap `f` so that every invocation through [`TracedFn::call`] is recorded.
///
/// `f` receives the context so it can make nested traced calls.
pub fn traced_fn<F>(site: CallSite, f: F) -> TracedFn<F> {
    TracedFn { site, f }
}

impl<F> TracedFn<F> {
    pub fn site(&self) -> &CallSite {
        &self.site
    }

    /// Invoke the wrapped callable with a tuple of positional `args`.
    pub fn call<A, T, E>(&self, ctx: &TraceContext, args: A) -> Result<T, E>
    where
        F: Fn(&TraceContext, A) -> Result<T, E>,
        A: Serialize,
        T: Serialize,
        E: fmt::Display,
    {
        let inputs = Inputs::positional(self.site.params, &args);
        ctx.try_record(&self.site, inputs, || (self.f)(ctx, args))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
