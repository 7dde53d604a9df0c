//! Self-dismissing overlay driver.

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::overlay::state::{Lifecycle, OverlayId, OverlayPhase, OverlayState};
use crate::overlay::surface::{OverlayNode, Surface};

/// Handle to a rendered overlay.
///
/// Dropping the handle does not cancel the overlay.
#[derive(Debug)]
pub struct OverlayHandle {
    id: OverlayId,
    task: JoinHandle<()>,
}

impl OverlayHandle {
    pub fn id(&self) -> OverlayId {
        self.id
    }

    pub fn is_removed(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait until the node has been removed.
    pub async fn removed(self) {
        if let Err(e) = self.task.await {
            tracing::warn!(overlay = %self.id, error = %e, "Overlay task ended abnormally");
        }
    }
}

#[derive(Clone)]
pub struct TransientOverlay {
    surface: Arc<dyn Surface>,
}

impl TransientOverlay {
    pub fn new(surface: Arc<dyn Surface>) -> Self {
        Self { surface }
    }

    /// Insert the node now and schedule its fade and removal.
    ///
    /// The schedule runs from the moment of rendering; `state.created_at`
    /// only records the reporting clock and never shifts the timers.
    pub fn render(&self, state: OverlayState) -> OverlayHandle {
        let id = OverlayId::new();
        self.surface.insert(OverlayNode {
            id,
            message: state.message.clone(),
        });

        let surface = Arc::clone(&self.surface);
        let task = tokio::spawn(async move {
            let mut lifecycle = Lifecycle::new();

            tokio::time::sleep(state.ttl).await;
            if lifecycle.advance() == Some(OverlayPhase::Fading) {
                surface.fade_out(id, state.fade);
            }

            tokio::time::sleep(state.fade).await;
            if lifecycle.advance() == Some(OverlayPhase::Removed) && !surface.remove(id) {
                tracing::warn!(overlay = %id, "Overlay was already detached");
            }
        });

        OverlayHandle { id, task }
    }
}
