//! Step tracing for the parsing engines.
//!
//! An engine with a sink attached emits a `START` event before it evaluates a
//! symbol and an `END` event after, indented by call depth. Sinks follow the
//! same shape as the CLI output sinks: one buffered implementation for tests
//! and programmatic capture, and a colored stderr sink in the CLI.

use std::fmt;

use crate::errors::one_line;
use crate::value::Value;

/// One step of a parse.
#[derive(Debug, Clone, PartialEq)]
pub enum TraceEvent {
    Start {
        depth: usize,
        symbol: String,
        /// Input at the cursor when the step began.
        ahead: String,
    },
    End {
        depth: usize,
        symbol: String,
        /// The rendered value, or `None` on a soft failure.
        result: Option<String>,
        /// Input at the cursor when the step finished.
        ahead: String,
    },
}

impl TraceEvent {
    pub fn depth(&self) -> usize {
        match self {
            TraceEvent::Start { depth, .. } | TraceEvent::End { depth, .. } => *depth,
        }
    }

    pub fn is_start(&self) -> bool {
        matches!(self, TraceEvent::Start { .. })
    }
}

impl fmt::Display for TraceEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TraceEvent::Start {
                depth,
                symbol,
                ahead,
            } => write!(f, "{depth:4} {}START {symbol} << \"{ahead}\"", indent(*depth)),
            TraceEvent::End {
                depth,
                symbol,
                result,
                ahead,
            } => {
                let result = result.as_deref().unwrap_or("no match");
                write!(
                    f,
                    "{depth:4} {}END {symbol} -> {result} << \"{ahead}\"",
                    indent(*depth)
                )
            }
        }
    }
}

fn indent(depth: usize) -> String {
    "  ".repeat(depth)
}

/// Receives trace events from an engine.
pub trait TraceSink {
    fn emit(&mut self, event: &TraceEvent);
}

impl<T: TraceSink + ?Sized> TraceSink for &mut T {
    fn emit(&mut self, event: &TraceEvent) {
        (**self).emit(event);
    }
}

/// Collects trace lines into a `String`.
#[derive(Debug, Default)]
pub struct TraceBuffer {
    pub buffer: String,
    events: usize,
}

impl TraceBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_str(&self) -> &str {
        &self.buffer
    }

    /// Number of events received.
    pub fn len(&self) -> usize {
        self.events
    }

    pub fn is_empty(&self) -> bool {
        self.events == 0
    }
}

impl TraceSink for TraceBuffer {
    fn emit(&mut self, event: &TraceEvent) {
        if !self.buffer.is_empty() {
            self.buffer.push('\n');
        }
        self.buffer.push_str(&event.to_string());
        self.events += 1;
    }
}

// ============================================================================
// ENGINE SIDE
// ============================================================================

/// The optional sink held by an engine.
#[derive(Default)]
pub(crate) struct Tracer<'a> {
    sink: Option<Box<dyn TraceSink + 'a>>,
}

impl<'a> Tracer<'a> {
    pub(crate) fn attach(&mut self, sink: impl TraceSink + 'a) {
        self.sink = Some(Box::new(sink));
    }

    pub(crate) fn start(&mut self, depth: usize, symbol: impl FnOnce() -> String, ahead: &str) {
        if let Some(sink) = self.sink.as_mut() {
            sink.emit(&TraceEvent::Start {
                depth,
                symbol: symbol(),
                ahead: one_line(ahead),
            });
        }
    }

    pub(crate) fn end(
        &mut self,
        depth: usize,
        symbol: impl FnOnce() -> String,
        result: Option<&Value>,
        ahead: &str,
    ) {
        if let Some(sink) = self.sink.as_mut() {
            sink.emit(&TraceEvent::End {
                depth,
                symbol: symbol(),
                result: result.map(Value::to_string),
                ahead: one_line(ahead),
            });
        }
    }
}
