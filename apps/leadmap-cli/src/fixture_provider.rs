use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};

use leadmap_core::lodging::LodgingRecord;
use leadmap_core::traits::{ConversionProvider, SearchProvider};
use leadmap_core::types::{ExternalRef, ResultBatch, SearchCriteria, SearchResult, ANY_BUSINESS_TYPE};
use leadmap_core::ProviderError;

/// Filters in-memory lodging records by region code and business type.
pub struct FixtureSearchProvider {
    records: Vec<LodgingRecord>,
}

impl FixtureSearchProvider {
    pub fn new(records: Vec<LodgingRecord>) -> Self { Self { records } }

    fn matches(record: &LodgingRecord, criteria: &SearchCriteria) -> bool {
        let region = record.sigun_code.as_deref() == Some(criteria.region_code.as_str());
        let business_type = criteria.business_type_or_any();
        region && (business_type == ANY_BUSINESS_TYPE || record.indu_type.contains(business_type))
    }
}

#[async_trait]
impl SearchProvider for FixtureSearchProvider {
    async fn search(&self, criteria: &SearchCriteria) -> Result<ResultBatch, ProviderError> {
        let records: Vec<_> = self.records.iter().filter(|r| Self::matches(r, criteria)).cloned().map(LodgingRecord::into_raw).collect();
        let total_count = Some(records.len());
        Ok(ResultBatch { records, total_count })
    }
}

/// Mints sequential lead ids.
#[derive(Default)]
pub struct StubConverter {
    next: AtomicU64,
}

#[async_trait]
impl ConversionProvider for StubConverter {
    async fn convert(&self, result: &SearchResult) -> Result<ExternalRef, ProviderError> {
        if result.title.trim().is_empty() {
            return Err(ProviderError::Validation(format!("result {} has no business name", result.id)));
        }
        let n = self.next.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(ExternalRef(format!("00Q{n:012}")))
    }
}
