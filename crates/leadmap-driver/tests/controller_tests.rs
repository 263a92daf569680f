use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, Notify};

use leadmap_core::config::EngineConfig;
use leadmap_core::traits::{ConversionProvider, MapSurface, SearchProvider};
use leadmap_core::types::{
    DetailContent, ExternalRef, MarkerStyle, OverlayHandle, Position, RawRecord, ResultBatch, ResultId, SearchCriteria, SearchResult,
    ViewportTransition,
};
use leadmap_core::{Error, ProviderError};
use leadmap_driver::Controller;
use leadmap_sync::{ActionStatus, Delivery, SearchSession, SessionEvent, SessionState};

#[derive(Default)]
struct CountingMap {
    next: u64,
    live: usize,
}

impl MapSurface for CountingMap {
    fn create_overlay(&mut self, _position: Position, _style: &MarkerStyle) -> OverlayHandle {
        self.next += 1;
        self.live += 1;
        OverlayHandle(self.next)
    }
    fn remove_overlay(&mut self, _handle: OverlayHandle) { self.live -= 1; }
    fn set_viewport(&mut self, _center: Position, _zoom: Option<u8>, _transition: ViewportTransition) {}
    fn open_detail(&mut self, _handle: OverlayHandle, _content: &DetailContent) {}
    fn close_detail(&mut self, _handle: OverlayHandle) {}
}

fn batch(n: usize) -> ResultBatch {
    ResultBatch::new(
        (1..=n)
            .map(|i| RawRecord {
                id: Some(i.to_string()),
                lat: Some(37.0),
                lng: Some(127.0 + i as f64 * 0.001),
                category_label: "민박".into(),
                title: format!("Lodging {i}"),
                has_action_target: true,
                ..Default::default()
            })
            .collect(),
    )
}

/// Returns a batch sized by region code; region "slow" blocks until released.
struct ScriptedSearch {
    started: Notify,
    release: Notify,
}

#[async_trait]
impl SearchProvider for ScriptedSearch {
    async fn search(&self, criteria: &SearchCriteria) -> Result<ResultBatch, ProviderError> {
        match criteria.region_code.as_str() {
            "slow" => {
                self.started.notify_one();
                self.release.notified().await;
                Ok(batch(40))
            }
            "down" => Err(ProviderError::Network("backend unreachable".into())),
            code => Ok(batch(code.parse().unwrap_or(0))),
        }
    }
}

/// Conversions for result "gate" block until released; "bad" is rejected.
struct ScriptedConversion {
    calls: AtomicUsize,
    started: Notify,
    release: Notify,
    next_ref: AtomicU64,
}

#[async_trait]
impl ConversionProvider for ScriptedConversion {
    async fn convert(&self, result: &SearchResult) -> Result<ExternalRef, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match result.id.to_string().as_str() {
            "5" => {
                self.started.notify_one();
                self.release.notified().await;
            }
            "7" => return Err(ProviderError::Conflict("lead already exists".into())),
            _ => {}
        }
        Ok(ExternalRef(format!("00Q{}", self.next_ref.fetch_add(1, Ordering::SeqCst))))
    }
}

fn controller() -> (Controller<CountingMap>, Arc<ScriptedSearch>, Arc<ScriptedConversion>) {
    let search = Arc::new(ScriptedSearch { started: Notify::new(), release: Notify::new() });
    let conversion = Arc::new(ScriptedConversion { calls: AtomicUsize::new(0), started: Notify::new(), release: Notify::new(), next_ref: AtomicU64::new(1) });
    let session = SearchSession::new(EngineConfig::default(), CountingMap::default());
    (Controller::new(session, search.clone(), conversion.clone()), search, conversion)
}

async fn snapshot(c: &Controller<CountingMap>) -> (SessionState, usize, usize) {
    c.with_session(|s| (s.state(), s.results().len(), s.map().live)).await
}

#[tokio::test]
async fn search_installs_first_page() {
    let (c, _, _) = controller();
    let delivery = c.search(&SearchCriteria::new("45", None)).await.unwrap();
    assert_eq!(delivery, Delivery::Applied);
    assert_eq!(snapshot(&c).await, (SessionState::Ready, 45, 20));
}

#[tokio::test]
async fn slower_earlier_search_is_discarded() {
    let (c, search, _) = controller();
    let slow = {
        let c = c.clone();
        tokio::spawn(async move { c.search(&SearchCriteria::new("slow", None)).await })
    };
    search.started.notified().await;

    assert_eq!(c.search(&SearchCriteria::new("3", None)).await.unwrap(), Delivery::Applied);
    search.release.notify_one();
    assert_eq!(slow.await.unwrap().unwrap(), Delivery::Stale);
    assert_eq!(snapshot(&c).await, (SessionState::Ready, 3, 3));
}

#[tokio::test]
async fn provider_failure_keeps_results_and_notifies() {
    let (c, _, _) = controller();
    c.search(&SearchCriteria::new("4", None)).await.unwrap();
    c.with_session(|s| s.drain_events()).await;

    assert_eq!(c.search(&SearchCriteria::new("down", None)).await.unwrap(), Delivery::Applied);
    assert_eq!(snapshot(&c).await, (SessionState::Ready, 4, 4));
    let events = c.with_session(|s| s.drain_events()).await;
    assert!(events.iter().any(|e| matches!(e, SessionEvent::Notify(n) if n.message == "backend unreachable")));
}

#[tokio::test]
async fn blank_region_is_rejected_before_calling_the_provider() {
    let (c, _, _) = controller();
    let err = c.search(&SearchCriteria::new("", None)).await.unwrap_err();
    assert!(matches!(err.downcast_ref::<Error>(), Some(Error::InvalidInput(_))));
    assert_eq!(snapshot(&c).await.0, SessionState::Idle);
}

#[tokio::test]
async fn duplicate_conversion_fails_while_first_is_in_flight() {
    let (c, _, conversion) = controller();
    c.search(&SearchCriteria::new("10", None)).await.unwrap();

    let first = {
        let c = c.clone();
        tokio::spawn(async move { c.convert(&ResultId::from("5")).await })
    };
    conversion.started.notified().await;

    let err = c.convert(&ResultId::from("5")).await.unwrap_err();
    assert!(matches!(err.downcast_ref::<Error>(), Some(Error::AlreadyPending(_))));
    assert_eq!(c.convert(&ResultId::from("6")).await.unwrap(), ActionStatus::Succeeded, "other results convert independently");

    conversion.release.notify_one();
    assert_eq!(first.await.unwrap().unwrap(), ActionStatus::Succeeded);
    assert_eq!(conversion.calls.load(Ordering::SeqCst), 2);
    let status = c.with_session(|s| s.action_status(&ResultId::from("5"))).await;
    assert_eq!(status, Some(ActionStatus::Succeeded));
}

#[tokio::test]
async fn rejected_conversion_is_recorded_as_failed() {
    let (c, _, _) = controller();
    c.search(&SearchCriteria::new("8", None)).await.unwrap();
    assert_eq!(c.convert(&ResultId::from("7")).await.unwrap(), ActionStatus::Failed);
    let events = c.with_session(|s| s.drain_events()).await;
    assert!(!events.iter().any(|e| matches!(e, SessionEvent::Navigate(_))));
}

#[tokio::test]
async fn session_handle_is_shared() {
    let (c, _, _) = controller();
    let shared: Arc<Mutex<SearchSession<CountingMap>>> = c.session();
    c.search(&SearchCriteria::new("2", None)).await.unwrap();
    assert_eq!(shared.lock().await.results().len(), 2);
}

#[tokio::test]
async fn dropped_conversion_is_failed_and_can_be_retried() {
    let (c, _, conversion) = controller();
    c.search(&SearchCriteria::new("10", None)).await.unwrap();

    let timed_out = tokio::time::timeout(Duration::from_millis(50), c.convert(&ResultId::from("5"))).await;
    assert!(timed_out.is_err());
    let status = c.with_session(|s| s.action_status(&ResultId::from("5"))).await;
    assert_eq!(status, Some(ActionStatus::Failed));

    conversion.release.notify_one();
    assert_eq!(c.convert(&ResultId::from("5")).await.unwrap(), ActionStatus::Succeeded);
    assert_eq!(conversion.calls.load(Ordering::SeqCst), 2);
}
