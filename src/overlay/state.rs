//! Overlay state and lifecycle.
//!
//! # State Transitions
//! ```text
//! Rendered → Fading   ttl after render
//! Fading   → Removed  ttl + fade after render
//! ```
//! Linear, no cycles, no cancellation.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::time::Instant;

/// Global counter for overlay IDs.
static OVERLAY_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique identifier of an overlay node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OverlayId(u64);

impl OverlayId {
    /// Allocate a new unique ID.
    pub fn new() -> Self {
        Self(OVERLAY_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl Default for OverlayId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for OverlayId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "overlay-{}", self.0)
    }
}

/// Lifecycle phase of an overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum OverlayPhase {
    /// Inserted and fully visible.
    Rendered,
    /// Opacity transitioning to zero.
    Fading,
    /// Detached from the surface.
    Removed,
}

/// Everything needed to show one overlay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayState {
    pub message: String,
    /// Reading of the reporting clock when the overlay was created.
    pub created_at: Instant,
    pub ttl: Duration,
    pub fade: Duration,
}

impl OverlayState {
    pub fn new(message: impl Into<String>, created_at: Instant, ttl: Duration, fade: Duration) -> Self {
        Self {
            message: message.into(),
            created_at,
            ttl,
            fade,
        }
    }
}

/// Forward-only phase tracker; each transition can fire once.
#[derive(Debug)]
pub struct Lifecycle {
    phase: OverlayPhase,
}

impl Lifecycle {
    pub fn new() -> Self {
        Self {
            phase: OverlayPhase::Rendered,
        }
    }

    /// Move to the next phase. `None` once removed.
    pub fn advance(&mut self) -> Option<OverlayPhase> {
        let next = match self.phase {
            OverlayPhase::Rendered => OverlayPhase::Fading,
            OverlayPhase::Fading => OverlayPhase::Removed,
            OverlayPhase::Removed => return None,
        };
        self.phase = next;
        Some(next)
    }
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}
