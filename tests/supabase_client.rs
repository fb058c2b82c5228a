//! SupabaseClient against a local stand-in for the PostgREST RPC endpoint

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    routing::post,
    Json, Router,
};
use serde_json::{json, Value};

use psiho_directory::directory::{fetch_pages, DirectoryService, Pager};
use psiho_directory::{DirectoryConfig, DirectoryError, SearchFilters, SupabaseClient};

#[derive(Debug, Clone)]
struct Received {
    function: String,
    apikey: Option<String>,
    authorization: Option<String>,
    body: Value,
}

#[derive(Default)]
struct FakeRegistry {
    rows: Vec<Value>,
    received: Mutex<Vec<Received>>,
}

async fn rpc(
    State(state): State<Arc<FakeRegistry>>,
    Path(function): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let header = |name: &str| headers.get(name).and_then(|v| v.to_str().ok()).map(str::to_string);
    state.received.lock().unwrap().push(Received {
        function: function.clone(),
        apikey: header("apikey"),
        authorization: header("authorization"),
        body: body.clone(),
    });

    match function.as_str() {
        "get_filter_options" => (
            StatusCode::OK,
            Json(json!([
                { "specialitate": "Psihoterapie", "filiala": "Iasi" },
                { "specialitate": "Psihologie clinică", "filiala": null },
                { "specialitate": "Psihoterapie", "filiala": "Cluj" }
            ])),
        ),
        "search_psihologi" => {
            let name = body["_nume"].as_str().unwrap_or("").to_lowercase();
            let limit = body["_limit"].as_u64().unwrap_or(20) as usize;
            let offset = body["_offset"].as_u64().unwrap_or(0) as usize;
            let page: Vec<Value> = state
                .rows
                .iter()
                .filter(|r| r["nume"].as_str().unwrap_or("").to_lowercase().contains(&name))
                .skip(offset)
                .take(limit)
                .cloned()
                .collect();
            (StatusCode::OK, Json(Value::Array(page)))
        }
        other => (
            StatusCode::NOT_FOUND,
            Json(json!({ "code": "PGRST202", "message": format!("function {} does not exist", other) })),
        ),
    }
}

fn registry_rows() -> Vec<Value> {
    // Ana has two specialties; the second lands on the next page with page size 2
    vec![
        json!({ "id": 1, "nume": "Ana Pop", "cod_personal": "A1", "email": "ana@x.ro, ana2@x.ro",
                "dgpc": true, "tsa": null, "expert": false,
                "specialitate": "Psihologie clinică", "status": "Activ", "numar_atestat": 11 }),
        json!({ "id": 2, "nume": "Bogdan Ene", "cod_personal": "B2", "email": null,
                "dgpc": false, "tsa": true, "expert": false,
                "specialitate": "Psihoterapie", "status": "Suspendat" }),
        json!({ "id": 3, "nume": "Ana Pop", "cod_personal": "A1", "email": "ana@x.ro, ana2@x.ro",
                "dgpc": true, "tsa": null, "expert": false,
                "specialitate": "Psihoterapie", "status": "Activ", "filiala": "Cluj" }),
    ]
}

async fn serve(state: Arc<FakeRegistry>) -> String {
    let app = Router::new()
        .route("/rest/v1/rpc/{function}", post(rpc))
        .with_state(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

fn config(url: String, page_size: usize) -> DirectoryConfig {
    DirectoryConfig {
        service_url: url,
        anon_key: "anon-key".into(),
        page_size,
        debounce: Duration::from_millis(10),
        scroll_threshold: 3,
        options_rpc: "get_filter_options".into(),
        search_rpc: "search_psihologi".into(),
        log_dir: "logs".into(),
        http_timeout: Duration::from_secs(5),
    }
}

#[tokio::test]
async fn test_filter_options_sends_keys_and_dedups() {
    let state = Arc::new(FakeRegistry::default());
    let url = serve(state.clone()).await;
    let client = SupabaseClient::new(&config(url, 20)).unwrap();

    let options = client.filter_options().await.unwrap();
    assert_eq!(options.specialties, vec!["Psihologie clinică", "Psihoterapie"]);
    assert_eq!(options.branches, vec!["Cluj", "Iasi"]);

    let received = state.received.lock().unwrap().clone();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].function, "get_filter_options");
    assert_eq!(received[0].apikey.as_deref(), Some("anon-key"));
    assert_eq!(received[0].authorization.as_deref(), Some("Bearer anon-key"));
}

#[tokio::test]
async fn test_pages_merge_person_split_across_pages() {
    let state = Arc::new(FakeRegistry { rows: registry_rows(), ..Default::default() });
    let url = serve(state.clone()).await;
    let client = SupabaseClient::new(&config(url, 2)).unwrap();

    let mut pager = Pager::new(2);
    let pages = fetch_pages(&client, &mut pager, &SearchFilters::new(), 10).await.unwrap();

    assert_eq!(pages, 2);
    assert!(!pager.has_more());
    let records = pager.records();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].cod_personal, "A1");
    assert_eq!(records[0].specialitati.len(), 2);
    assert!(!records[0].tsa);
    assert_eq!(records[0].specialitati[1].specialty.filiala.as_deref(), Some("Cluj"));
    assert_eq!(records[1].cod_personal, "B2");

    let offsets: Vec<Value> = state
        .received
        .lock()
        .unwrap()
        .iter()
        .map(|r| r.body["_offset"].clone())
        .collect();
    assert_eq!(offsets, vec![json!(0), json!(2)]);
}

#[tokio::test]
async fn test_name_filter_is_forwarded() {
    let state = Arc::new(FakeRegistry { rows: registry_rows(), ..Default::default() });
    let url = serve(state.clone()).await;
    let client = SupabaseClient::new(&config(url, 20)).unwrap();

    let filters = SearchFilters::new().with_name(" bogdan ");
    let rows = client.search(filters.to_params(0, 20)).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].cod_personal, "B2");
    assert_eq!(state.received.lock().unwrap()[0].body["_nume"], "bogdan");
}

#[tokio::test]
async fn test_unknown_function_maps_to_service_error() {
    let state = Arc::new(FakeRegistry::default());
    let url = serve(state).await;
    let mut cfg = config(url, 20);
    cfg.search_rpc = "search_missing".into();
    let client = SupabaseClient::new(&cfg).unwrap();

    let err = client.search(json!({})).await.unwrap_err();
    match err {
        DirectoryError::Service { status, message } => {
            assert_eq!(status, 404);
            assert_eq!(message, "function search_missing does not exist");
        }
        other => panic!("unexpected error: {other}"),
    }
}
