//! Pagination and grouping against an in-memory data service

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;

use psiho_directory::directory::{
    fetch_pages, flatten, group_rows, FilterOptions, PageMode, PageOutcome, PsychologistRow, Specialty,
};
use psiho_directory::{DirectoryError, DirectoryService, Pager, Result, SearchFilters};

/// Replies with queued pages in order and remembers the params it saw
struct ScriptedService {
    pages: Arc<Mutex<VecDeque<Result<Vec<PsychologistRow>>>>>,
    seen: Arc<Mutex<Vec<Value>>>,
}

impl ScriptedService {
    fn new(pages: Vec<Result<Vec<PsychologistRow>>>) -> Self {
        Self {
            pages: Arc::new(Mutex::new(VecDeque::from(pages))),
            seen: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

#[async_trait]
impl DirectoryService for ScriptedService {
    async fn filter_options(&self) -> Result<FilterOptions> {
        Ok(FilterOptions::default())
    }

    async fn search(&self, params: Value) -> Result<Vec<PsychologistRow>> {
        self.seen.lock().await.push(params);
        self.pages.lock().await.pop_front().unwrap_or_else(|| Ok(Vec::new()))
    }
}

fn row(id: i64, cod: &str, spec: &str) -> PsychologistRow {
    PsychologistRow {
        id: Some(id),
        nume: format!("Psiholog {}", cod),
        cod_personal: cod.to_string(),
        email: None,
        dgpc: false,
        tsa: false,
        expert: false,
        specialty: Specialty {
            specialitate: spec.to_string(),
            ..Default::default()
        },
    }
}

#[tokio::test]
async fn test_fetch_stops_on_short_page() {
    let service = ScriptedService::new(vec![
        Ok(vec![row(1, "A", "x"), row(2, "B", "y"), row(3, "B", "z")]),
        Ok(vec![row(4, "C", "x")]),
        Ok(vec![row(5, "D", "never requested")]),
    ]);
    let mut pager = Pager::new(3);

    let pages = fetch_pages(&service, &mut pager, &SearchFilters::new(), 10).await.unwrap();
    assert_eq!(pages, 2);
    assert_eq!(pager.records().len(), 3);
    assert_eq!(pager.record_set().specialty_count(), 4);
    assert_eq!(service.seen.lock().await.len(), 2);
}

#[tokio::test]
async fn test_max_pages_respected_and_resumable() {
    let service = ScriptedService::new(vec![
        Ok(vec![row(1, "A", "x"), row(2, "B", "y")]),
        Ok(vec![row(3, "C", "x"), row(4, "D", "y")]),
        Ok(vec![]),
    ]);
    let mut pager = Pager::new(2);
    let filters = SearchFilters::new();

    assert_eq!(fetch_pages(&service, &mut pager, &filters, 1).await.unwrap(), 1);
    assert!(pager.has_more());
    assert_eq!(fetch_pages(&service, &mut pager, &filters, 5).await.unwrap(), 2);
    assert!(!pager.has_more());
    assert_eq!(pager.records().len(), 4);

    let offsets: Vec<u64> = service
        .seen
        .lock()
        .await
        .iter()
        .map(|p| p["_offset"].as_u64().unwrap())
        .collect();
    assert_eq!(offsets, vec![0, 2, 4]);
}

#[tokio::test]
async fn test_error_is_returned_and_pager_recovers() {
    let service = ScriptedService::new(vec![
        Err(DirectoryError::Service { status: 503, message: "unavailable".into() }),
        Ok(vec![row(1, "A", "x")]),
    ]);
    let mut pager = Pager::new(2);
    let filters = SearchFilters::new();

    assert!(fetch_pages(&service, &mut pager, &filters, 3).await.is_err());
    assert!(!pager.is_loading());
    assert!(pager.last_error().unwrap().contains("unavailable"));

    assert_eq!(fetch_pages(&service, &mut pager, &filters, 3).await.unwrap(), 1);
    assert_eq!(pager.records().len(), 1);
    assert!(pager.last_error().is_none());
}

#[tokio::test]
async fn test_filter_change_mid_scroll_replaces_list() {
    let mut pager = Pager::new(2);
    let all = SearchFilters::new();

    let first = pager.search(&all).unwrap();
    pager.complete(&first, vec![row(1, "A", "x"), row(2, "B", "x")]);
    let more = pager.load_more().unwrap();
    assert_eq!(more.mode, PageMode::Append);

    let mut experts = SearchFilters::new();
    experts.expert = true;
    let fresh = pager.search(&experts).unwrap();
    assert_eq!(fresh.params()["_expert"], true);
    assert_eq!(fresh.params()["_offset"], 0);

    // Out of order: the fresh page lands first, then the superseded append
    pager.complete(&fresh, vec![row(9, "Z", "x")]);
    assert_eq!(pager.complete(&more, vec![row(3, "C", "x"), row(4, "D", "x")]), PageOutcome::Stale);

    let cods: Vec<&str> = pager.records().iter().map(|r| r.cod_personal.as_str()).collect();
    assert_eq!(cods, vec!["Z"]);
}

#[test]
fn test_paged_grouping_matches_one_shot_grouping() {
    let rows = vec![
        row(1, "A", "x"),
        row(2, "B", "y"),
        row(3, "A", "z"),
        row(4, "C", "x"),
        row(5, "B", "w"),
    ];

    let mut pager = Pager::new(2);
    let filters = SearchFilters::new();
    for chunk in rows.chunks(2) {
        let request = pager.search(&filters).or_else(|| pager.load_more()).unwrap();
        pager.complete(&request, chunk.to_vec());
    }

    let one_shot = group_rows(rows.clone());
    assert_eq!(pager.records(), one_shot.as_slice());
    assert_eq!(flatten(pager.records()).len(), rows.len());
}
