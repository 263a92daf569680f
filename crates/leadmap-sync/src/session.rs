//! The orchestrator. Every external trigger (search, scroll, click, provider
//! completion) goes through a `SearchSession` method, which keeps the result
//! list, reveal window, markers, focus and action records consistent.
//!
//! Asynchronous completions carry the [`SessionToken`] they were started
//! with. Search completions whose token is no longer current are discarded
//! before they touch any state.

use std::ops::Range;

use leadmap_core::config::{EngineConfig, FailurePolicy};
use leadmap_core::traits::MapSurface;
use leadmap_core::types::{
    DetailAction, ExternalRef, NavigationIntent, Notification, ResultBatch, ResultId, SearchCriteria, SearchResult, SessionToken, Severity,
    ViewportTransition,
};
use leadmap_core::{Error, ProviderError, Result};

use crate::action_gateway::{ActionGateway, ActionStatus, ActionTicket};
use crate::marker_registry::MarkerRegistry;
use crate::paginator::Paginator;
use crate::result_set::ResultSet;
use crate::selection::{FocusOptions, SelectionCoordinator};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Searching,
    Ready,
}

/// Output for the presentation layer, drained with [`SearchSession::drain_events`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    Notify(Notification),
    Navigate(NavigationIntent),
    OpenExternal { url: String },
    EmptyResults,
}

/// Whether an asynchronous completion was applied or dropped as stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Applied,
    Stale,
}

/// Raw scroll position of the result list, in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollMetrics {
    pub scroll_height: f64,
    pub scroll_top: f64,
    pub client_height: f64,
}

/// A submitted conversion: the caller runs the provider on `result` and
/// reports back with `ticket`.
#[derive(Debug, Clone)]
pub struct ConversionRequest {
    pub ticket: ActionTicket,
    pub result: SearchResult,
}

pub struct SearchSession<M: MapSurface> {
    config: EngineConfig,
    map: M,
    state: SessionState,
    token: SessionToken,
    has_loaded: bool,
    total_count: usize,
    results: ResultSet,
    paginator: Paginator,
    markers: MarkerRegistry,
    selection: SelectionCoordinator,
    actions: ActionGateway,
    events: Vec<SessionEvent>,
}

impl<M: MapSurface> SearchSession<M> {
    pub fn new(config: EngineConfig, map: M) -> Self {
        let paginator = Paginator::new(config.page_size);
        Self {
            config,
            map,
            state: SessionState::Idle,
            token: SessionToken::default(),
            has_loaded: false,
            total_count: 0,
            results: ResultSet::new(),
            paginator,
            markers: MarkerRegistry::new(),
            selection: SelectionCoordinator::new(),
            actions: ActionGateway::new(),
            events: Vec::new(),
        }
    }

    /// Begins a new search and returns its token. Invalid criteria are
    /// rejected before anything changes.
    pub fn start_search(&mut self, criteria: &SearchCriteria) -> Result<SessionToken> {
        if let Err(err) = criteria.validate() {
            self.notify(Severity::Warning, "Notice", err.to_string());
            return Err(err);
        }
        self.token = self.token.next();
        self.state = SessionState::Searching;
        tracing::info!(token = %self.token, region = %criteria.region_code, business_type = criteria.business_type_or_any(), "search started");
        Ok(self.token)
    }

    /// Installs a provider batch. A duplicate id fails the whole batch and the
    /// previous results stay in place.
    pub fn on_search_result(&mut self, token: SessionToken, batch: ResultBatch) -> Result<Delivery> {
        if !self.accepts(token) {
            tracing::debug!(%token, current = %self.token, "discarding stale search result");
            return Ok(Delivery::Stale);
        }
        let raw_len = batch.records.len();
        let ingested: Vec<SearchResult> = batch.records.into_iter().enumerate().filter_map(|(i, raw)| SearchResult::ingest(i, raw)).collect();
        if ingested.len() < raw_len {
            tracing::warn!(skipped = raw_len - ingested.len(), "records without usable coordinates were skipped");
        }
        let count = ingested.len();
        if let Err(err) = self.results.replace(ingested, token) {
            self.state = self.settled_state();
            self.notify(Severity::Error, "Error", err.to_string());
            return Err(err);
        }

        self.selection.clear_focus(&mut self.map);
        self.markers.clear(&mut self.map);
        self.actions.prune_positional(token);
        self.paginator.reset(count, self.config.page_size);
        self.total_count = batch.total_count.unwrap_or(count).max(count);
        self.sync_markers();
        self.state = SessionState::Ready;
        self.has_loaded = true;

        if count == 0 {
            tracing::info!(%token, "search returned no results");
            self.events.push(SessionEvent::EmptyResults);
            self.notify(Severity::Info, "Notice", "No results found.");
            return Ok(Delivery::Applied);
        }
        if self.config.focus_first_result {
            if let Some(first) = self.results.all().next().map(|r| r.id.clone()) {
                let options = FocusOptions { open_detail: false, zoom: Some(self.config.first_result_zoom) };
                self.selection.focus(&first, options, &self.results, &self.markers, &mut self.map)?;
            }
        }
        tracing::info!(%token, count, revealed = self.paginator.revealed_count(), "search results installed");
        self.notify(Severity::Success, "Success", format!("Found {count} lodgings."));
        Ok(Delivery::Applied)
    }

    /// A failed search never touches the result list unless the failure
    /// policy asks for the view to be cleared.
    pub fn on_search_failure(&mut self, token: SessionToken, error: &ProviderError) -> Delivery {
        if !self.accepts(token) {
            tracing::debug!(%token, current = %self.token, "discarding stale search failure");
            return Delivery::Stale;
        }
        tracing::warn!(%token, %error, "search failed");
        if self.config.failure_policy == FailurePolicy::Clear {
            self.clear_view();
        }
        self.state = self.settled_state();
        self.notify(Severity::Error, "Error", error.message().to_string());
        Delivery::Applied
    }

    /// Reveals the next page immediately.
    pub fn reveal_more(&mut self) -> Option<Range<usize>> {
        let range = self.paginator.reveal_more()?;
        self.sync_markers();
        Some(range)
    }

    /// Schedules a reveal when the list is scrolled close to its bottom.
    /// Returns whether a new reveal was scheduled.
    pub fn on_list_scroll(&mut self, metrics: ScrollMetrics) -> bool {
        let near_bottom = metrics.scroll_height - metrics.scroll_top <= metrics.client_height + self.config.scroll_threshold_px;
        near_bottom && self.paginator.schedule()
    }

    pub fn apply_scheduled_reveal(&mut self) -> Option<Range<usize>> {
        let range = self.paginator.apply_scheduled()?;
        self.sync_markers();
        Some(range)
    }

    pub fn focus(&mut self, id: &ResultId, options: FocusOptions) -> Result<ViewportTransition> {
        self.selection.focus(id, options, &self.results, &self.markers, &mut self.map)
    }

    /// "View location" on a list row.
    pub fn select_from_list(&mut self, id: &ResultId) -> Result<ViewportTransition> {
        self.focus(id, FocusOptions { open_detail: true, zoom: Some(self.config.list_focus_zoom) })
    }

    /// Marker click: recentre at the current zoom.
    pub fn select_from_marker(&mut self, id: &ResultId) -> Result<ViewportTransition> {
        self.focus(id, FocusOptions { open_detail: true, zoom: None })
    }

    pub fn clear_focus(&mut self) { self.selection.clear_focus(&mut self.map); }

    pub fn on_viewport_settled(&mut self, transition: ViewportTransition) -> bool {
        self.selection.on_viewport_settled(transition, &self.results, &self.markers, &mut self.map)
    }

    /// Submits a conversion for a result of the current set.
    pub fn convert(&mut self, id: &ResultId) -> Result<ConversionRequest> {
        let result = self.results.get(id).ok_or_else(|| Error::InvalidInput(format!("unknown result {id}")))?;
        if !result.has_action_target {
            return Err(Error::InvalidInput(format!("result {id} cannot be converted")));
        }
        let result = result.clone();
        let ticket = self.actions.submit(id, self.token)?;
        Ok(ConversionRequest { ticket, result })
    }

    /// Records the provider outcome. Only the action record, notifications and
    /// navigation are affected, never focus or viewport.
    pub fn on_conversion_complete(&mut self, ticket: &ActionTicket, outcome: std::result::Result<ExternalRef, ProviderError>) -> Result<ActionStatus> {
        if ticket.session != self.token {
            tracing::debug!(result = %ticket.result_id, issued = %ticket.session, current = %self.token, "conversion completed after the session changed");
        }
        let failure = outcome.as_ref().err().map(|e| e.message().to_string());
        match self.actions.complete(ticket, outcome)? {
            Some(intent) => {
                self.notify(Severity::Success, "Success", "Lead created.");
                self.events.push(SessionEvent::Navigate(intent));
                Ok(ActionStatus::Succeeded)
            }
            None => {
                let detail = failure.unwrap_or_default();
                self.notify(Severity::Error, "Error", format!("Failed to create lead: {detail}"));
                Ok(ActionStatus::Failed)
            }
        }
    }

    /// Fails a conversion whose provider call will never report back.
    pub fn abandon_conversion(&mut self, ticket: &ActionTicket) -> bool {
        if !self.actions.abandon(ticket) { return false; }
        self.notify(Severity::Error, "Error", "Failed to create lead: the request was interrupted.");
        true
    }

    /// Dispatches a popup button. Convert buttons return the submitted request.
    pub fn on_detail_action(&mut self, action: &DetailAction) -> Result<Option<ConversionRequest>> {
        match action {
            DetailAction::OpenHomepage { url } => {
                self.events.push(SessionEvent::OpenExternal { url: url.clone() });
                Ok(None)
            }
            DetailAction::Convert { result_id } => self.convert(result_id).map(Some),
        }
    }

    /// Recentres on the default view; results and focus stay.
    pub fn go_home(&mut self) -> ViewportTransition {
        let (center, zoom) = (self.config.default_center, self.config.default_zoom);
        self.selection.move_viewport(center, Some(zoom), &mut self.map)
    }

    /// Back to `Idle`: clears the view and invalidates any search in flight.
    pub fn reset(&mut self) -> ViewportTransition {
        self.token = self.token.next();
        self.clear_view();
        self.state = SessionState::Idle;
        self.has_loaded = false;
        tracing::info!(token = %self.token, "session reset");
        self.go_home()
    }

    /// Verifies the cross-component invariants: revealed equals rendered and an
    /// open popup always has a marker.
    pub fn check_invariants(&self) -> Result<()> {
        let revealed = self.results.prefix(self.paginator.revealed_count());
        if revealed.len() != self.markers.len() || revealed.iter().any(|r| !self.markers.contains(&r.id)) {
            return Err(Error::State(format!("{} revealed results but {} markers", revealed.len(), self.markers.len())));
        }
        if let Some(anchor) = self.selection.popup_anchor() {
            if !self.markers.contains(anchor) {
                return Err(Error::State(format!("popup open for {anchor} without a marker")));
            }
        }
        Ok(())
    }

    pub fn drain_events(&mut self) -> Vec<SessionEvent> { std::mem::take(&mut self.events) }

    pub fn state(&self) -> SessionState { self.state }

    pub fn session_token(&self) -> SessionToken { self.token }

    pub fn config(&self) -> &EngineConfig { &self.config }

    pub fn results(&self) -> &ResultSet { &self.results }

    /// The revealed prefix rendered by the list surface.
    pub fn displayed_results(&self) -> &[SearchResult] { self.results.prefix(self.paginator.revealed_count()) }

    pub fn revealed_count(&self) -> usize { self.paginator.revealed_count() }

    pub fn total_count(&self) -> usize { self.total_count }

    pub fn paginator(&self) -> &Paginator { &self.paginator }

    pub fn markers(&self) -> &MarkerRegistry { &self.markers }

    pub fn selection(&self) -> &SelectionCoordinator { &self.selection }

    pub fn actions(&self) -> &ActionGateway { &self.actions }

    /// Status of `id` as it is named in the current session.
    pub fn action_status(&self, id: &ResultId) -> Option<ActionStatus> { self.actions.status(id, self.token) }

    pub fn map(&self) -> &M { &self.map }

    pub fn map_mut(&mut self) -> &mut M { &mut self.map }

    pub fn has_no_results(&self) -> bool { self.state != SessionState::Searching && self.results.is_empty() }

    pub fn is_busy(&self) -> bool { self.state == SessionState::Searching || self.actions.has_pending() }

    pub fn is_search_disabled(&self, criteria: &SearchCriteria) -> bool {
        self.state == SessionState::Searching || criteria.validate().is_err()
    }

    fn accepts(&self, token: SessionToken) -> bool { token == self.token && self.state == SessionState::Searching }

    fn settled_state(&self) -> SessionState { if self.has_loaded { SessionState::Ready } else { SessionState::Idle } }

    fn sync_markers(&mut self) {
        let revealed = self.results.prefix(self.paginator.revealed_count());
        self.markers.sync(revealed, &mut self.map);
        self.selection.retain_revealed(&self.markers);
    }

    fn clear_view(&mut self) {
        self.selection.clear_focus(&mut self.map);
        self.markers.clear(&mut self.map);
        self.results.clear(self.token);
        self.paginator.reset(0, self.config.page_size);
        self.total_count = 0;
    }

    fn notify(&mut self, severity: Severity, title: &str, message: impl Into<String>) {
        self.events.push(SessionEvent::Notify(Notification::new(severity, title, message)));
    }
}
