//! leadmap-sync
//!
//! Keeps a paginated result list and its map markers in lock-step, with a
//! single focused result and per-result conversion tracking. See `session`
//! for the entry points.
pub mod action_gateway;
pub mod marker_registry;
pub mod paginator;
pub mod result_set;
pub mod selection;
pub mod session;

pub use action_gateway::{ActionGateway, ActionRecord, ActionStatus, ActionTicket};
pub use marker_registry::{MarkerEntry, MarkerRegistry, SyncReport};
pub use paginator::Paginator;
pub use result_set::ResultSet;
pub use selection::{Focus, FocusOptions, SelectionCoordinator};
pub use session::{ConversionRequest, Delivery, ScrollMetrics, SearchSession, SessionEvent, SessionState};
