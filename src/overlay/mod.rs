//! Load-time overlay.
//!
//! # Data Flow
//! ```text
//! LoadReporter::report()
//!     → load time = now - navigation start
//!     → OverlayState (message, ttl, fade)
//!     → TransientOverlay::render
//!         → Surface::insert               (immediately)
//!         → Surface::fade_out             (at ttl)
//!         → Surface::remove               (at ttl + fade)
//! ```
//!
//! # Design Decisions
//! - The render task owns the state; nothing else can reach it
//! - Timers use tokio time, so paused-clock tests drive the lifecycle
//! - Overlapping reports create independent overlays

pub mod reporter;
pub mod state;
pub mod surface;
pub mod transient;

pub use reporter::{LoadReporter, PageLoadReport};
pub use state::{Lifecycle, OverlayId, OverlayPhase, OverlayState};
pub use surface::{LogSurface, MemorySurface, OverlayNode, Surface, SurfaceEvent};
pub use transient::{OverlayHandle, TransientOverlay};
