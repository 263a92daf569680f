use leadmap_core::traits::MapSurface;
use leadmap_core::types::{DetailContent, MarkerStyle, OverlayHandle, Position, ViewportTransition};

/// Map surface that only logs. Viewport moves are considered settled at once;
/// the caller reads `last_transition` and acknowledges it.
#[derive(Debug, Default)]
pub struct ConsoleMap {
    next: u64,
    live: usize,
    last_transition: Option<ViewportTransition>,
}

impl ConsoleMap {
    pub fn live_overlays(&self) -> usize { self.live }

    pub fn take_transition(&mut self) -> Option<ViewportTransition> { self.last_transition.take() }
}

impl MapSurface for ConsoleMap {
    fn create_overlay(&mut self, position: Position, style: &MarkerStyle) -> OverlayHandle {
        self.next += 1;
        self.live += 1;
        tracing::debug!(handle = self.next, lat = position.lat, lng = position.lng, glyph = %style.glyph, badge = ?style.badge, "overlay created");
        OverlayHandle(self.next)
    }

    fn remove_overlay(&mut self, handle: OverlayHandle) {
        self.live = self.live.saturating_sub(1);
        tracing::debug!(handle = handle.0, "overlay removed");
    }

    fn set_viewport(&mut self, center: Position, zoom: Option<u8>, transition: ViewportTransition) {
        tracing::info!(lat = center.lat, lng = center.lng, ?zoom, transition = transition.0, "viewport");
        self.last_transition = Some(transition);
    }

    fn open_detail(&mut self, handle: OverlayHandle, content: &DetailContent) {
        tracing::info!(handle = handle.0, title = %content.title, actions = content.actions.len(), "detail opened");
    }

    fn close_detail(&mut self, handle: OverlayHandle) {
        tracing::info!(handle = handle.0, "detail closed");
    }
}
