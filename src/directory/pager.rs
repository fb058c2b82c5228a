//! Incremental Pagination
//!
//! Tracks which page to ask for next and folds responses into the record
//! list. A filter change replaces the list and restarts at page zero; asking
//! for more with unchanged filters appends. Paging stops after a short page.
//!
//! Every request carries a generation. A replace bumps the generation, so a
//! response still in flight for older filters is recognised and dropped.

use tracing::debug;

use super::client::DirectoryService;
use super::filters::SearchFilters;
use super::grouping::RecordSet;
use super::model::{PsychologistRecord, PsychologistRow};
use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageMode {
    /// Discard the current list and start over
    Replace,
    /// Add to the current list
    Append,
}

/// A page the caller should fetch from the service
#[derive(Debug, Clone, PartialEq)]
pub struct PageRequest {
    pub generation: u64,
    pub page: usize,
    pub page_size: usize,
    pub mode: PageMode,
    pub filters: SearchFilters,
}

impl PageRequest {
    pub fn params(&self) -> serde_json::Value {
        self.filters.to_params(self.page, self.page_size)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageOutcome {
    Applied {
        rows: usize,
        new_records: usize,
        has_more: bool,
    },
    /// The response belongs to a superseded request
    Stale,
}

#[derive(Debug)]
pub struct Pager {
    page_size: usize,
    records: RecordSet,
    /// Filters the current list was loaded with
    active: Option<SearchFilters>,
    /// Next page index to request
    page: usize,
    has_more: bool,
    generation: u64,
    in_flight: Option<u64>,
    last_error: Option<String>,
}

impl Pager {
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size: page_size.max(1),
            records: RecordSet::new(),
            active: None,
            page: 0,
            has_more: true,
            generation: 0,
            in_flight: None,
            last_error: None,
        }
    }

    /// Start over for `filters` when they differ from the loaded ones.
    ///
    /// Changed filters always yield a fresh page zero request, even while
    /// another request is in flight. Unchanged filters yield nothing once a
    /// first page has landed; further pages come from `load_more`.
    pub fn search(&mut self, filters: &SearchFilters) -> Option<PageRequest> {
        let changed = self.active.as_ref() != Some(filters);
        // Page zero of the current generation failed and nothing is loaded
        let unloaded = self.page == 0 && self.in_flight.is_none();
        if !changed && !unloaded {
            return None;
        }

        self.generation += 1;
        self.active = Some(filters.clone());
        self.page = 0;
        self.has_more = true;
        self.last_error = None;
        self.in_flight = Some(self.generation);
        debug!(generation = self.generation, "filters changed, restarting pagination");
        Some(self.request(PageMode::Replace))
    }

    /// Next page for the loaded filters, when the last page was full and
    /// nothing is in flight
    pub fn load_more(&mut self) -> Option<PageRequest> {
        if self.active.is_none() || self.in_flight.is_some() || !self.has_more {
            return None;
        }
        if self.page == 0 {
            let filters = self.active.take().unwrap_or_default();
            return self.search(&filters);
        }

        self.in_flight = Some(self.generation);
        Some(self.request(PageMode::Append))
    }

    fn request(&self, mode: PageMode) -> PageRequest {
        PageRequest {
            generation: self.generation,
            page: self.page,
            page_size: self.page_size,
            mode,
            filters: self.active.clone().unwrap_or_default(),
        }
    }

    /// Re-issue the current filters from page zero
    pub fn refresh(&mut self) -> Option<PageRequest> {
        let filters = self.active.take().unwrap_or_default();
        self.search(&filters)
    }

    /// Apply the rows returned for `request`
    pub fn complete(&mut self, request: &PageRequest, rows: Vec<PsychologistRow>) -> PageOutcome {
        if request.generation != self.generation || request.page != self.page {
            debug!(
                generation = request.generation,
                current = self.generation,
                page = request.page,
                "dropping stale page"
            );
            return PageOutcome::Stale;
        }

        let row_count = rows.len();
        if request.mode == PageMode::Replace {
            self.records.clear();
        }
        let new_records = self.records.extend_rows(rows);

        self.page += 1;
        self.has_more = row_count >= request.page_size;
        self.in_flight = None;
        self.last_error = None;

        debug!(
            page = request.page,
            rows = row_count,
            new_records,
            has_more = self.has_more,
            "page applied"
        );

        PageOutcome::Applied {
            rows: row_count,
            new_records,
            has_more: self.has_more,
        }
    }

    /// Record a failed request. Returns false when the request was stale.
    pub fn fail(&mut self, request: &PageRequest, error: impl Into<String>) -> bool {
        if request.generation != self.generation {
            return false;
        }
        self.in_flight = None;
        self.last_error = Some(error.into());
        true
    }

    pub fn records(&self) -> &[PsychologistRecord] {
        self.records.records()
    }

    pub fn record_set(&self) -> &RecordSet {
        &self.records
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Next page index that will be requested
    pub fn page(&self) -> usize {
        self.page
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }
}

/// Walk pages for `filters` until a short page or `max_pages` pages.
/// Returns the number of pages applied.
pub async fn fetch_pages(
    service: &dyn DirectoryService,
    pager: &mut Pager,
    filters: &SearchFilters,
    max_pages: usize,
) -> Result<usize> {
    let mut applied = 0;
    while applied < max_pages {
        let Some(request) = pager.search(filters).or_else(|| pager.load_more()) else {
            break;
        };
        match service.search(request.params()).await {
            Ok(rows) => {
                if let PageOutcome::Applied { .. } = pager.complete(&request, rows) {
                    applied += 1;
                }
            }
            Err(e) => {
                pager.fail(&request, e.to_string());
                return Err(e);
            }
        }
    }
    Ok(applied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::model::Specialty;

    fn rows(start: i64, count: usize) -> Vec<PsychologistRow> {
        (0..count as i64)
            .map(|i| PsychologistRow {
                id: Some(start + i),
                nume: format!("P{}", start + i),
                cod_personal: format!("C{}", start + i),
                email: None,
                dgpc: false,
                tsa: false,
                expert: false,
                specialty: Specialty::default(),
            })
            .collect()
    }

    #[test]
    fn test_first_request_replaces_from_page_zero() {
        let mut pager = Pager::new(3);
        let req = pager.search(&SearchFilters::new()).unwrap();
        assert_eq!(req.mode, PageMode::Replace);
        assert_eq!(req.page, 0);
        assert!(pager.is_loading());
    }

    #[test]
    fn test_append_until_short_page() {
        let mut pager = Pager::new(3);
        let filters = SearchFilters::new();

        let r0 = pager.search(&filters).unwrap();
        assert_eq!(
            pager.complete(&r0, rows(0, 3)),
            PageOutcome::Applied { rows: 3, new_records: 3, has_more: true }
        );

        let r1 = pager.load_more().unwrap();
        assert_eq!(r1.mode, PageMode::Append);
        assert_eq!(r1.page, 1);
        assert_eq!(r1.params()["_offset"], 3);
        pager.complete(&r1, rows(3, 2));

        assert_eq!(pager.records().len(), 5);
        assert!(!pager.has_more());
        assert!(pager.load_more().is_none());
    }

    #[test]
    fn test_single_request_in_flight() {
        let mut pager = Pager::new(3);
        let filters = SearchFilters::new();
        let r0 = pager.search(&filters).unwrap();
        assert!(pager.load_more().is_none());
        pager.complete(&r0, rows(0, 3));
        assert!(pager.load_more().is_some());
    }

    #[test]
    fn test_filter_change_resets_and_drops_stale() {
        let mut pager = Pager::new(2);
        let all = SearchFilters::new();
        let r0 = pager.search(&all).unwrap();
        pager.complete(&r0, rows(0, 2));
        let r1 = pager.load_more().unwrap();

        let named = SearchFilters::new().with_name("Ana");
        let fresh = pager.search(&named).unwrap();
        assert_eq!(fresh.mode, PageMode::Replace);
        assert_eq!(fresh.page, 0);

        // r1 was superseded while in flight
        assert_eq!(pager.complete(&r1, rows(2, 2)), PageOutcome::Stale);
        assert_eq!(pager.records().len(), 2);

        pager.complete(&fresh, rows(100, 1));
        assert_eq!(pager.records().len(), 1);
        assert_eq!(pager.records()[0].cod_personal, "C100");
        assert!(!pager.has_more());
    }

    #[test]
    fn test_empty_first_page_stops() {
        let mut pager = Pager::new(5);
        let filters = SearchFilters::new();
        let r0 = pager.search(&filters).unwrap();
        pager.complete(&r0, Vec::new());
        assert!(pager.records().is_empty());
        assert!(!pager.has_more());
        assert!(pager.load_more().is_none());
    }

    #[test]
    fn test_failure_allows_retry_of_same_page() {
        let mut pager = Pager::new(2);
        let filters = SearchFilters::new();
        let r0 = pager.search(&filters).unwrap();
        pager.complete(&r0, rows(0, 2));

        let r1 = pager.load_more().unwrap();
        assert!(pager.fail(&r1, "timeout"));
        assert_eq!(pager.last_error(), Some("timeout"));
        assert!(!pager.is_loading());

        let again = pager.load_more().unwrap();
        assert_eq!(again.page, 1);
        assert_eq!(again.mode, PageMode::Append);
    }

    #[test]
    fn test_refresh_restarts_with_same_filters() {
        let mut pager = Pager::new(2);
        let filters = SearchFilters::new().with_name("Ion");
        let r0 = pager.search(&filters).unwrap();
        pager.complete(&r0, rows(0, 1));

        let again = pager.refresh().unwrap();
        assert_eq!(again.page, 0);
        assert_eq!(again.mode, PageMode::Replace);
        assert_eq!(again.filters, filters);
        assert!(again.generation > r0.generation);
    }

    #[test]
    fn test_unchanged_search_does_not_page() {
        let mut pager = Pager::new(2);
        let filters = SearchFilters::new().with_name("Ion");
        let r0 = pager.search(&filters).unwrap();
        assert!(pager.search(&filters).is_none());
        pager.complete(&r0, rows(0, 2));

        // Same criteria again, including trailing whitespace on the name
        assert!(pager.search(&filters).is_none());
        assert!(pager.search(&SearchFilters::new().with_name("Ion ")).is_none());
        assert_eq!(pager.page(), 1);
        assert!(!pager.is_loading());
    }

    #[test]
    fn test_search_after_failed_first_page_retries() {
        let mut pager = Pager::new(2);
        let filters = SearchFilters::new();
        let r0 = pager.search(&filters).unwrap();
        assert!(pager.fail(&r0, "offline"));

        let again = pager.search(&filters).unwrap();
        assert_eq!(again.page, 0);
        assert_eq!(again.mode, PageMode::Replace);
    }

    #[test]
    fn test_superseded_failure_keeps_current_request() {
        let mut pager = Pager::new(2);
        let old = pager.search(&SearchFilters::new()).unwrap();
        let current = pager.search(&SearchFilters::new().with_name("Ana")).unwrap();

        assert!(!pager.fail(&old, "timeout"));
        assert!(pager.is_loading());
        assert_eq!(pager.last_error(), None);

        pager.complete(&current, rows(0, 1));
        assert_eq!(pager.records().len(), 1);
    }
}
