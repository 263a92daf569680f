//! leadmap-driver
//!
//! Runs the search and conversion providers for a [`SearchSession`] and
//! feeds their completions back in. The session lock is never held across a
//! provider call, so a slow search cannot block scrolling, focus changes or a
//! newer search; the session token decides which completion still counts.

use anyhow::Result;
use std::sync::Arc;
use tokio::sync::Mutex;

use leadmap_core::traits::{ConversionProvider, MapSurface, SearchProvider};
use leadmap_core::types::{ResultId, SearchCriteria};
use leadmap_sync::{ActionStatus, ActionTicket, Delivery, SearchSession};

pub struct Controller<M: MapSurface> {
    session: Arc<Mutex<SearchSession<M>>>,
    search: Arc<dyn SearchProvider>,
    conversion: Arc<dyn ConversionProvider>,
}

impl<M: MapSurface> Clone for Controller<M> {
    fn clone(&self) -> Self {
        Self { session: Arc::clone(&self.session), search: Arc::clone(&self.search), conversion: Arc::clone(&self.conversion) }
    }
}

impl<M: MapSurface + Send + 'static> Controller<M> {
    pub fn new(session: SearchSession<M>, search: Arc<dyn SearchProvider>, conversion: Arc<dyn ConversionProvider>) -> Self {
        Self { session: Arc::new(Mutex::new(session)), search, conversion }
    }

    pub fn session(&self) -> Arc<Mutex<SearchSession<M>>> { Arc::clone(&self.session) }

    /// Runs `f` against the session under its lock.
    pub async fn with_session<R>(&self, f: impl FnOnce(&mut SearchSession<M>) -> R) -> R {
        let mut session = self.session.lock().await;
        f(&mut *session)
    }

    pub async fn search(&self, criteria: &SearchCriteria) -> Result<Delivery> {
        let token = self.session.lock().await.start_search(criteria)?;
        let outcome = self.search.search(criteria).await;
        let mut session = self.session.lock().await;
        let delivery = match outcome {
            Ok(batch) => {
                tracing::debug!(%token, records = batch.records.len(), "search provider returned");
                session.on_search_result(token, batch)?
            }
            Err(err) => session.on_search_failure(token, &err),
        };
        Ok(delivery)
    }

    /// If this future is dropped before the provider answers, the submitted
    /// record is failed so the result can be converted again.
    pub async fn convert(&self, id: &ResultId) -> Result<ActionStatus> {
        let request = self.session.lock().await.convert(id)?;
        let mut guard = AbandonOnDrop { session: Arc::clone(&self.session), ticket: Some(request.ticket.clone()) };
        let outcome = self.conversion.convert(&request.result).await;
        let mut session = self.session.lock().await;
        guard.ticket = None;
        Ok(session.on_conversion_complete(&request.ticket, outcome)?)
    }
}

/// Abandons an in-flight conversion ticket unless disarmed first.
struct AbandonOnDrop<M: MapSurface + Send + 'static> {
    session: Arc<Mutex<SearchSession<M>>>,
    ticket: Option<ActionTicket>,
}

impl<M: MapSurface + Send + 'static> Drop for AbandonOnDrop<M> {
    fn drop(&mut self) {
        let Some(ticket) = self.ticket.take() else { return };
        if let Ok(mut session) = self.session.try_lock() {
            session.abandon_conversion(&ticket);
            return;
        }
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let session = Arc::clone(&self.session);
                handle.spawn(async move { session.lock().await.abandon_conversion(&ticket); });
            }
            Err(_) => tracing::warn!(result = %ticket.result_id, "conversion dropped outside a runtime; record stays pending"),
        }
    }
}
