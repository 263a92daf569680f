//! The canonical, ordered collection of results for one session.
//!
//! Only whole-set replacement is exposed, so no reader can ever observe a
//! half-updated list.

use std::collections::HashMap;

use leadmap_core::types::{ResultId, SearchResult, SessionToken};
use leadmap_core::{Error, Result};

#[derive(Debug, Default)]
pub struct ResultSet {
    results: Vec<SearchResult>,
    positions: HashMap<ResultId, usize>,
    token: SessionToken,
}

impl ResultSet {
    pub fn new() -> Self { Self::default() }

    /// Swaps in `results`. Duplicate ids are rejected and leave the current
    /// contents untouched.
    pub fn replace(&mut self, results: Vec<SearchResult>, token: SessionToken) -> Result<()> {
        let mut positions = HashMap::with_capacity(results.len());
        for (i, r) in results.iter().enumerate() {
            if positions.insert(r.id.clone(), i).is_some() {
                return Err(Error::DuplicateId(r.id.clone()));
            }
        }
        self.results = results;
        self.positions = positions;
        self.token = token;
        Ok(())
    }

    pub fn clear(&mut self, token: SessionToken) {
        self.results.clear();
        self.positions.clear();
        self.token = token;
    }

    pub fn get(&self, id: &ResultId) -> Option<&SearchResult> { self.positions.get(id).map(|&i| &self.results[i]) }

    pub fn index_of(&self, id: &ResultId) -> Option<usize> { self.positions.get(id).copied() }

    /// Restartable: the iterator is `Clone` and a fresh one can be taken at any time.
    pub fn all(&self) -> std::slice::Iter<'_, SearchResult> { self.results.iter() }

    /// The first `count` results, clamped to the set size.
    pub fn prefix(&self, count: usize) -> &[SearchResult] { &self.results[..count.min(self.results.len())] }

    pub fn len(&self) -> usize { self.results.len() }

    pub fn is_empty(&self) -> bool { self.results.is_empty() }

    pub fn session_token(&self) -> SessionToken { self.token }
}
