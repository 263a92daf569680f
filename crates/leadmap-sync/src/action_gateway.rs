//! Per-result conversion bookkeeping.
//!
//! Submission and completion are two calls: the caller runs the conversion
//! provider in between. At most one `Pending` record exists per result id;
//! different ids are independent.
//!
//! Records for natural keys span sessions, so the same lodging cannot be
//! converted twice even across searches. Positional ids are reissued by every
//! search, so their records are scoped to the session that submitted them.

use std::collections::HashMap;

use leadmap_core::types::{ExternalRef, NavigationIntent, ResultId, SessionToken};
use leadmap_core::{Error, ProviderError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionStatus {
    Pending,
    Succeeded,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionRecord {
    pub result_id: ResultId,
    pub status: ActionStatus,
    pub external_ref: Option<ExternalRef>,
    pub error: Option<ProviderError>,
    /// Bumped on every submission for this id.
    pub attempt: u32,
    /// Session the submission was made in.
    pub session: SessionToken,
}

/// Proof of a submission, handed back on completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionTicket {
    pub result_id: ResultId,
    pub attempt: u32,
    pub session: SessionToken,
}

type RecordKey = (ResultId, Option<SessionToken>);

fn record_key(id: &ResultId, session: SessionToken) -> RecordKey {
    (id.clone(), id.is_positional().then_some(session))
}

#[derive(Debug, Default)]
pub struct ActionGateway {
    records: HashMap<RecordKey, ActionRecord>,
}

impl ActionGateway {
    pub fn new() -> Self { Self::default() }

    pub fn submit(&mut self, id: &ResultId, session: SessionToken) -> Result<ActionTicket> {
        let key = record_key(id, session);
        let attempt = match self.records.get(&key) {
            Some(r) if r.status == ActionStatus::Pending => return Err(Error::AlreadyPending(id.clone())),
            Some(r) => r.attempt + 1,
            None => 1,
        };
        self.records.insert(key, ActionRecord { result_id: id.clone(), status: ActionStatus::Pending, external_ref: None, error: None, attempt, session });
        tracing::info!(result = %id, attempt, %session, "conversion submitted");
        Ok(ActionTicket { result_id: id.clone(), attempt, session })
    }

    /// Resolves the pending record the ticket was issued for. On success the
    /// navigation intent for the created record is returned.
    pub fn complete(&mut self, ticket: &ActionTicket, outcome: std::result::Result<ExternalRef, ProviderError>) -> Result<Option<NavigationIntent>> {
        let record = self.pending_mut(ticket).ok_or_else(|| Error::State(format!("no pending conversion for {} (attempt {})", ticket.result_id, ticket.attempt)))?;
        match outcome {
            Ok(external_ref) => {
                record.status = ActionStatus::Succeeded;
                record.external_ref = Some(external_ref.clone());
                tracing::info!(result = %ticket.result_id, record = %external_ref, "conversion succeeded");
                Ok(Some(NavigationIntent { record_ref: external_ref }))
            }
            Err(err) => {
                tracing::warn!(result = %ticket.result_id, error = %err, "conversion failed");
                record.status = ActionStatus::Failed;
                record.error = Some(err);
                Ok(None)
            }
        }
    }

    /// Fails the ticket's record if it is still pending, for a conversion whose
    /// caller went away before the provider answered. Returns whether a record
    /// was resolved.
    pub fn abandon(&mut self, ticket: &ActionTicket) -> bool {
        let Some(record) = self.pending_mut(ticket) else { return false };
        tracing::warn!(result = %ticket.result_id, attempt = ticket.attempt, "conversion abandoned before completion");
        record.status = ActionStatus::Failed;
        record.error = Some(ProviderError::Network("conversion abandoned before completion".into()));
        true
    }

    /// Drops settled records of positional ids issued by other sessions; those
    /// ids now name different results.
    pub fn prune_positional(&mut self, current: SessionToken) {
        self.records.retain(|(_, scope), r| scope.map_or(true, |s| s == current) || r.status == ActionStatus::Pending);
    }

    /// Status as seen from `session`.
    pub fn status(&self, id: &ResultId, session: SessionToken) -> Option<ActionStatus> { self.record(id, session).map(|r| r.status) }

    pub fn record(&self, id: &ResultId, session: SessionToken) -> Option<&ActionRecord> { self.records.get(&record_key(id, session)) }

    pub fn pending_count(&self) -> usize { self.records.values().filter(|r| r.status == ActionStatus::Pending).count() }

    pub fn has_pending(&self) -> bool { self.records.values().any(|r| r.status == ActionStatus::Pending) }

    fn pending_mut(&mut self, ticket: &ActionTicket) -> Option<&mut ActionRecord> {
        self.records
            .get_mut(&record_key(&ticket.result_id, ticket.session))
            .filter(|r| r.status == ActionStatus::Pending && r.attempt == ticket.attempt)
    }
}
