//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! probe / inspector / collector / reporter produce:
//!     → Diagnostic (group title + ordered lines + severity)
//!     → DiagnosticSink::record
//!
//! Sinks:
//!     → TracingSink (structured log events, one group at a time)
//!     → JsonSink (one JSON document per diagnostic)
//!     → MetricsSink (metrics facade, Prometheus exposition in the CLI)
//!     → MemorySink (tests, embedding hosts)
//! ```
//!
//! # Design Decisions
//! - The sink is the only shared state between concurrent operations
//! - A group is appended atomically; groups from concurrent calls may
//!   interleave with each other but never split
//! - Sinks never fail; a broken output is logged and dropped

pub mod diagnostic;
pub mod logging;
pub mod metrics;
pub mod sink;

pub use diagnostic::{Diagnostic, Severity};
pub use self::metrics::MetricsSink;
pub use sink::{DiagnosticSink, FanoutSink, JsonSink, MemorySink, TracingSink};
