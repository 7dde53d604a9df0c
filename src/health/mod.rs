//! Connectivity probing.
//!
//! # Data Flow
//! ```text
//! probe(path)
//!     → t0 = clock.now()
//!     → Transport::get(path)
//!     → elapsed = clock.now() - t0
//!     → Outcome: Success | NonOkStatus | TransportFailure
//!     → Diagnostic::Probe to the sink, ProbeResult to the caller
//! ```
//!
//! # Design Decisions
//! - Every invocation is independent; no state is shared between probes
//! - No timeout of its own; a deadline, if any, belongs to the transport
//! - Transport errors are outcomes, never propagated

pub mod probe;

pub use probe::{ConnectivityProbe, Outcome, ProbeResult};
