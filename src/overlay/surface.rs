//! Surfaces overlays are drawn on.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use crate::overlay::state::OverlayId;

/// A fixed-position notification node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayNode {
    pub id: OverlayId,
    pub message: String,
}

/// The document an overlay is inserted into.
pub trait Surface: Send + Sync + 'static {
    fn insert(&self, node: OverlayNode);

    /// Start transitioning the node to zero opacity over `duration`.
    fn fade_out(&self, id: OverlayId, duration: Duration);

    /// Detach the node. Returns false if it was not attached.
    fn remove(&self, id: OverlayId) -> bool;
}

/// Something that happened to a surface, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceEvent {
    Inserted(OverlayId),
    FadeStarted(OverlayId),
    Removed(OverlayId),
}

#[derive(Debug, Clone)]
struct AttachedNode {
    node: OverlayNode,
    opacity: f32,
}

#[derive(Debug, Default)]
struct MemoryDocument {
    nodes: Vec<AttachedNode>,
    events: Vec<SurfaceEvent>,
}

/// In-memory document.
#[derive(Debug, Default)]
pub struct MemorySurface {
    inner: Mutex<MemoryDocument>,
}

impl MemorySurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: OverlayId) -> bool {
        self.lock().nodes.iter().any(|n| n.node.id == id)
    }

    pub fn opacity(&self, id: OverlayId) -> Option<f32> {
        self.lock().nodes.iter().find(|n| n.node.id == id).map(|n| n.opacity)
    }

    pub fn message(&self, id: OverlayId) -> Option<String> {
        self.lock()
            .nodes
            .iter()
            .find(|n| n.node.id == id)
            .map(|n| n.node.message.clone())
    }

    pub fn len(&self) -> usize {
        self.lock().nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().nodes.is_empty()
    }

    pub fn events(&self) -> Vec<SurfaceEvent> {
        self.lock().events.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryDocument> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Surface for MemorySurface {
    fn insert(&self, node: OverlayNode) {
        let mut doc = self.lock();
        doc.events.push(SurfaceEvent::Inserted(node.id));
        doc.nodes.push(AttachedNode { node, opacity: 1.0 });
    }

    fn fade_out(&self, id: OverlayId, _duration: Duration) {
        let mut guard = self.lock();
        let doc = &mut *guard;
        if let Some(attached) = doc.nodes.iter_mut().find(|n| n.node.id == id) {
            attached.opacity = 0.0;
            doc.events.push(SurfaceEvent::FadeStarted(id));
        }
    }

    fn remove(&self, id: OverlayId) -> bool {
        let mut doc = self.lock();
        let before = doc.nodes.len();
        doc.nodes.retain(|n| n.node.id != id);
        let removed = doc.nodes.len() != before;
        if removed {
            doc.events.push(SurfaceEvent::Removed(id));
        }
        removed
    }
}

/// Surface for headless hosts: overlays become log lines.
#[derive(Debug, Default)]
pub struct LogSurface {
    shown: Mutex<HashMap<OverlayId, String>>,
}

impl LogSurface {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Surface for LogSurface {
    fn insert(&self, node: OverlayNode) {
        for line in node.message.lines() {
            tracing::info!(overlay = %node.id, "{}", line);
        }
        self.shown
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(node.id, node.message);
    }

    fn fade_out(&self, id: OverlayId, duration: Duration) {
        tracing::debug!(overlay = %id, fade_ms = duration.as_millis() as u64, "Overlay fading");
    }

    fn remove(&self, id: OverlayId) -> bool {
        let removed = self
            .shown
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&id)
            .is_some();
        if removed {
            tracing::debug!(overlay = %id, "Overlay removed");
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_surface_tracks_nodes() {
        let surface = MemorySurface::new();
        let id = OverlayId::new();
        surface.insert(OverlayNode { id, message: "hello".into() });

        assert!(surface.contains(id));
        assert_eq!(surface.opacity(id), Some(1.0));

        surface.fade_out(id, Duration::from_millis(500));
        assert_eq!(surface.opacity(id), Some(0.0));

        assert!(surface.remove(id));
        assert!(!surface.remove(id));
        assert!(surface.is_empty());
        assert_eq!(
            surface.events(),
            vec![SurfaceEvent::Inserted(id), SurfaceEvent::FadeStarted(id), SurfaceEvent::Removed(id)]
        );
    }

    #[test]
    fn log_surface_removes_once() {
        let surface = LogSurface::new();
        let id = OverlayId::new();
        surface.insert(OverlayNode { id, message: "a\nb".into() });
        assert!(surface.remove(id));
        assert!(!surface.remove(id));
    }
}
