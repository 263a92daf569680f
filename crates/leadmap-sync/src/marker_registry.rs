//! One overlay per revealed result, keyed by result id.

use std::collections::{HashMap, HashSet};

use leadmap_core::traits::MapSurface;
use leadmap_core::types::{OverlayHandle, ResultId, SearchResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerEntry {
    pub result_id: ResultId,
    pub overlay: OverlayHandle,
}

/// Marker churn caused by one `sync`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub created: usize,
    pub removed: usize,
    pub kept: usize,
}

#[derive(Debug, Default)]
pub struct MarkerRegistry {
    entries: HashMap<ResultId, MarkerEntry>,
}

impl MarkerRegistry {
    pub fn new() -> Self { Self::default() }

    /// Reconciles markers with `revealed`. Existing markers are never recreated.
    pub fn sync<M: MapSurface + ?Sized>(&mut self, revealed: &[SearchResult], map: &mut M) -> SyncReport {
        let wanted: HashSet<&ResultId> = revealed.iter().map(|r| &r.id).collect();
        let stale: Vec<ResultId> = self.entries.keys().filter(|id| !wanted.contains(id)).cloned().collect();

        let mut report = SyncReport::default();
        for id in stale {
            if let Some(entry) = self.entries.remove(&id) {
                map.remove_overlay(entry.overlay);
                report.removed += 1;
            }
        }
        for result in revealed {
            if self.entries.contains_key(&result.id) { report.kept += 1; continue; }
            let overlay = map.create_overlay(result.position, &result.marker_style());
            self.entries.insert(result.id.clone(), MarkerEntry { result_id: result.id.clone(), overlay });
            report.created += 1;
        }
        tracing::debug!(created = report.created, removed = report.removed, kept = report.kept, "markers synced");
        report
    }

    pub fn get(&self, id: &ResultId) -> Option<OverlayHandle> { self.entries.get(id).map(|e| e.overlay) }

    pub fn entry(&self, id: &ResultId) -> Option<&MarkerEntry> { self.entries.get(id) }

    pub fn contains(&self, id: &ResultId) -> bool { self.entries.contains_key(id) }

    /// Removes every marker and returns how many were removed.
    pub fn clear<M: MapSurface + ?Sized>(&mut self, map: &mut M) -> usize {
        let removed = self.entries.len();
        for (_, entry) in self.entries.drain() { map.remove_overlay(entry.overlay); }
        removed
    }

    pub fn len(&self) -> usize { self.entries.len() }

    pub fn is_empty(&self) -> bool { self.entries.is_empty() }
}
