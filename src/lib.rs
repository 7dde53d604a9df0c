//! Page diagnostics harness library.
//!
//! Measures page-load performance, probes server health and inspects
//! endpoint responses. Every capability (clock, transport, timing, surface,
//! diagnostic sink) is injected, so hosts and tests choose the real or the
//! virtual implementation.

pub mod clock;
pub mod config;
pub mod harness;
pub mod health;
pub mod inspect;
pub mod observability;
pub mod overlay;
pub mod timing;
pub mod transport;

pub use config::schema::HarnessConfig;
pub use harness::{Capabilities, Harness};
