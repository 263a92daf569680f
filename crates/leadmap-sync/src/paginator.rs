//! Reveal window over the result set, growing one page at a time.

use std::ops::Range;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Paginator {
    revealed: usize,
    page_size: usize,
    total: usize,
    scheduled: bool,
}

impl Paginator {
    pub fn new(page_size: usize) -> Self { Self { page_size: page_size.max(1), ..Self::default() } }

    pub fn reset(&mut self, total: usize, page_size: usize) {
        self.page_size = page_size.max(1);
        self.total = total;
        self.revealed = self.page_size.min(total);
        self.scheduled = false;
    }

    /// Grows the window by one page and returns the newly revealed index range.
    ///
    /// No-op when everything is revealed or when a scheduled reveal has not been
    /// applied yet; the pending one already covers the request.
    pub fn reveal_more(&mut self) -> Option<Range<usize>> {
        if self.scheduled { return None; }
        self.grow()
    }

    /// Marks a deferred reveal (scroll path). Returns `false` when the request
    /// was coalesced into an already scheduled one or there is nothing left.
    pub fn schedule(&mut self) -> bool {
        if self.scheduled || self.is_fully_revealed() { return false; }
        self.scheduled = true;
        true
    }

    pub fn apply_scheduled(&mut self) -> Option<Range<usize>> {
        if !self.scheduled { return None; }
        self.scheduled = false;
        self.grow()
    }

    fn grow(&mut self) -> Option<Range<usize>> {
        if self.is_fully_revealed() { return None; }
        let from = self.revealed;
        self.revealed = (self.revealed + self.page_size).min(self.total);
        Some(from..self.revealed)
    }

    pub fn is_fully_revealed(&self) -> bool { self.revealed >= self.total }

    pub fn is_reveal_scheduled(&self) -> bool { self.scheduled }

    pub fn revealed_count(&self) -> usize { self.revealed }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reveal_grows_by_page_and_clamps() {
        let mut p = Paginator::new(20);
        p.reset(45, 20);
        assert_eq!(p.revealed_count(), 20);
        assert_eq!(p.reveal_more(), Some(20..40));
        assert_eq!(p.reveal_more(), Some(40..45));
        assert!(p.is_fully_revealed());
        assert_eq!(p.reveal_more(), None);
        assert_eq!(p.revealed_count(), 45);
    }

    #[test]
    fn reset_clamps_to_total() {
        let mut p = Paginator::new(20);
        p.reset(2, 20);
        assert_eq!(p.revealed_count(), 2);
        assert!(p.is_fully_revealed());
        p.reset(0, 20);
        assert_eq!(p.revealed_count(), 0);
        assert!(!p.schedule());
    }

    #[test]
    fn scheduled_reveals_coalesce() {
        let mut p = Paginator::new(10);
        p.reset(35, 10);
        assert!(p.schedule());
        assert!(!p.schedule(), "second scroll event joins the pending reveal");
        assert_eq!(p.reveal_more(), None, "direct reveal waits for the pending one");
        assert_eq!(p.apply_scheduled(), Some(10..20));
        assert_eq!(p.apply_scheduled(), None);
        assert_eq!(p.revealed_count(), 20);
    }

    #[test]
    fn reset_drops_pending_schedule() {
        let mut p = Paginator::new(5);
        p.reset(20, 5);
        assert!(p.schedule());
        p.reset(20, 5);
        assert!(!p.is_reveal_scheduled());
        assert_eq!(p.apply_scheduled(), None);
    }
}
