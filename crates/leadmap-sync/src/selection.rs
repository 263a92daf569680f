//! The single focused result and its detail popup.
//!
//! Focusing moves the viewport first. The popup for the new focus opens only
//! when the map acknowledges that exact viewport transition, so it never
//! anchors to a viewport that is still moving.

use leadmap_core::traits::MapSurface;
use leadmap_core::types::{OverlayHandle, Position, ResultId, ViewportTransition};
use leadmap_core::{Error, Result};

use crate::marker_registry::MarkerRegistry;
use crate::result_set::ResultSet;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FocusOptions {
    pub open_detail: bool,
    /// `None` keeps the current zoom.
    pub zoom: Option<u8>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Focus {
    pub result_id: ResultId,
    pub viewport_target: Position,
    pub popup_open: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct PendingDetail {
    result_id: ResultId,
    transition: ViewportTransition,
}

#[derive(Debug, Default)]
pub struct SelectionCoordinator {
    focus: Option<Focus>,
    open_popup: Option<OverlayHandle>,
    pending: Option<PendingDetail>,
    last_transition: u64,
}

impl SelectionCoordinator {
    pub fn new() -> Self { Self::default() }

    /// Fails with `UnknownResult` when `id` has no marker: only revealed
    /// results can be focused.
    pub fn focus<M: MapSurface + ?Sized>(
        &mut self,
        id: &ResultId,
        options: FocusOptions,
        results: &ResultSet,
        markers: &MarkerRegistry,
        map: &mut M,
    ) -> Result<ViewportTransition> {
        let result = match (results.get(id), markers.contains(id)) {
            (Some(result), true) => result,
            _ => return Err(Error::UnknownResult(id.clone())),
        };
        self.close_popup(map);
        let transition = self.mint_transition();
        map.set_viewport(result.position, options.zoom, transition);
        self.focus = Some(Focus { result_id: id.clone(), viewport_target: result.position, popup_open: false });
        self.pending = options.open_detail.then(|| PendingDetail { result_id: id.clone(), transition });
        tracing::debug!(result = %id, ?transition, open_detail = options.open_detail, "focus moved");
        Ok(transition)
    }

    /// Opens the deferred popup if `transition` is the one it waits for.
    /// Acknowledgements of superseded transitions are ignored.
    pub fn on_viewport_settled<M: MapSurface + ?Sized>(
        &mut self,
        transition: ViewportTransition,
        results: &ResultSet,
        markers: &MarkerRegistry,
        map: &mut M,
    ) -> bool {
        let pending = match self.pending.take() {
            Some(p) if p.transition == transition => p,
            other => {
                self.pending = other;
                return false;
            }
        };
        let (Some(result), Some(overlay)) = (results.get(&pending.result_id), markers.get(&pending.result_id)) else {
            return false;
        };
        let still_focused = self.focus.as_ref().is_some_and(|f| f.result_id == pending.result_id);
        if !still_focused { return false; }
        self.close_popup(map);
        map.open_detail(overlay, &result.detail());
        self.open_popup = Some(overlay);
        if let Some(focus) = &mut self.focus { focus.popup_open = true; }
        true
    }

    /// Moves the viewport without changing focus, cancelling any deferred popup.
    pub fn move_viewport<M: MapSurface + ?Sized>(&mut self, center: Position, zoom: Option<u8>, map: &mut M) -> ViewportTransition {
        self.pending = None;
        let transition = self.mint_transition();
        map.set_viewport(center, zoom, transition);
        transition
    }

    pub fn clear_focus<M: MapSurface + ?Sized>(&mut self, map: &mut M) {
        self.close_popup(map);
        self.focus = None;
        self.pending = None;
    }

    /// Drops focus whose marker no longer exists. The overlay is already gone,
    /// so its popup is forgotten rather than closed.
    pub fn retain_revealed(&mut self, markers: &MarkerRegistry) {
        let focused_lost = self.focus.as_ref().is_some_and(|f| !markers.contains(&f.result_id));
        if focused_lost {
            self.focus = None;
            self.open_popup = None;
            self.pending = None;
        }
    }

    pub fn focus_state(&self) -> Option<&Focus> { self.focus.as_ref() }

    pub fn focused_id(&self) -> Option<&ResultId> { self.focus.as_ref().map(|f| &f.result_id) }

    /// The result whose popup is open, if any.
    pub fn popup_anchor(&self) -> Option<&ResultId> { self.focus.as_ref().filter(|f| f.popup_open).map(|f| &f.result_id) }

    pub fn pending_transition(&self) -> Option<ViewportTransition> { self.pending.as_ref().map(|p| p.transition) }

    fn close_popup<M: MapSurface + ?Sized>(&mut self, map: &mut M) {
        if let Some(overlay) = self.open_popup.take() { map.close_detail(overlay); }
        if let Some(focus) = &mut self.focus { focus.popup_open = false; }
    }

    fn mint_transition(&mut self) -> ViewportTransition {
        self.last_transition += 1;
        ViewportTransition(self.last_transition)
    }
}
