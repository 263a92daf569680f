#![allow(dead_code)]

use std::collections::HashSet;

use leadmap_core::config::EngineConfig;
use leadmap_core::traits::MapSurface;
use leadmap_core::types::{DetailContent, DisplayField, MarkerStyle, OverlayHandle, Position, RawRecord, ResultBatch, ResultId, ViewportTransition};
use leadmap_sync::SearchSession;

/// Map surface that records every call made to it.
#[derive(Debug, Default)]
pub struct RecordingMap {
    next: u64,
    pub live: HashSet<OverlayHandle>,
    pub created: usize,
    pub removed: usize,
    pub viewports: Vec<(Position, Option<u8>, ViewportTransition)>,
    pub open_popups: Vec<(OverlayHandle, ResultId)>,
    pub closed: usize,
}

impl RecordingMap {
    pub fn last_transition(&self) -> ViewportTransition { self.viewports.last().map(|v| v.2).expect("no viewport move yet") }
}

impl MapSurface for RecordingMap {
    fn create_overlay(&mut self, _position: Position, _style: &MarkerStyle) -> OverlayHandle {
        self.next += 1;
        let handle = OverlayHandle(self.next);
        self.live.insert(handle);
        self.created += 1;
        handle
    }

    fn remove_overlay(&mut self, handle: OverlayHandle) {
        assert!(self.live.remove(&handle), "removed an overlay that does not exist");
        self.removed += 1;
    }

    fn set_viewport(&mut self, center: Position, zoom: Option<u8>, transition: ViewportTransition) {
        self.viewports.push((center, zoom, transition));
    }

    fn open_detail(&mut self, handle: OverlayHandle, content: &DetailContent) {
        assert!(self.live.contains(&handle), "popup opened on a missing overlay");
        self.open_popups.push((handle, content.result_id.clone()));
    }

    fn close_detail(&mut self, handle: OverlayHandle) {
        self.open_popups.retain(|(h, _)| *h != handle);
        self.closed += 1;
    }
}

pub fn record(id: usize) -> RawRecord {
    RawRecord {
        id: Some(id.to_string()),
        lat: Some(37.0 + id as f64 * 0.001),
        lng: Some(127.0),
        category_label: if id % 2 == 0 { "관광펜션업".into() } else { "농어촌민박업".into() },
        title: format!("Lodging {id}"),
        fields: vec![DisplayField::new("Rooms", "4")],
        homepage: None,
        badge: Some("4".into()),
        has_action_target: true,
    }
}

/// Results with ids `1..=n`.
pub fn batch(n: usize) -> ResultBatch { ResultBatch::new((1..=n).map(record).collect()) }

pub fn config(page_size: usize) -> EngineConfig { EngineConfig { page_size, ..EngineConfig::default() } }

pub fn session(page_size: usize) -> SearchSession<RecordingMap> { SearchSession::new(config(page_size), RecordingMap::default()) }

pub fn id(n: usize) -> ResultId { ResultId::new(n.to_string()) }
