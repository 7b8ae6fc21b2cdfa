use glossa_types::{NodeId, Rect, Size};

use crate::dom::Document;

/// Geometry queries the host answers
pub trait Layout: Send + Sync {
    fn viewport(&self) -> Size;

    /// Bounding box of `node`, viewport relative
    fn rect(&self, doc: &Document, node: NodeId) -> Rect;

    /// Rendered size of `node`; used for popups that were just built
    fn measure(&self, doc: &Document, node: NodeId) -> Size {
        self.rect(doc, node).size()
    }

    /// Called when the host reports a new viewport size
    fn set_viewport(&mut self, _viewport: Size) {}
}

/// Layout backed by rects recorded on the document.
///
/// A node without a recorded rect is located at the nearest recorded
/// ancestor (a marker inside a measured paragraph), with zero size, or at the
/// origin when nothing above it is measured. Unmeasured nodes measure as
/// `fallback`, which is what a freshly built popup gets.
#[derive(Debug, Clone, Copy)]
pub struct StaticLayout {
    pub viewport: Size,
    pub fallback: Size,
}

impl StaticLayout {
    pub fn new(viewport: Size, fallback: Size) -> Self {
        Self { viewport, fallback }
    }
}

impl Default for StaticLayout {
    fn default() -> Self {
        Self::new(Size::new(1280.0, 800.0), Size::new(300.0, 160.0))
    }
}

impl Layout for StaticLayout {
    fn viewport(&self) -> Size {
        self.viewport
    }

    fn rect(&self, doc: &Document, node: NodeId) -> Rect {
        if let Some(rect) = doc.rect(node) {
            return rect;
        }
        doc.ancestors(node)
            .find_map(|n| doc.rect(n))
            .map(|r| Rect::new(r.x, r.y, 0.0, 0.0))
            .unwrap_or_else(|| Rect::new(0.0, 0.0, 0.0, 0.0))
    }

    fn measure(&self, doc: &Document, node: NodeId) -> Size {
        doc.rect(node).map(|r| r.size()).unwrap_or(self.fallback)
    }

    fn set_viewport(&mut self, viewport: Size) {
        self.viewport = viewport;
    }
}
