//! Integration tests for the favorites engine.
//!
//! Runs the real HTTP clients and controller against an in-process mock of
//! the LifeHacks favorites API.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::codec;
use crate::controller::{FavoritesController, Identity, LoadState, REMOTE_PAGE_SIZE};
use crate::models::{FavoritePage, TipSummary};
use crate::remote::{RemoteFavoritesClient, TipLookupClient};
use crate::store::{LocalFavorites, MemoryStore};

const VALID_TOKEN: &str = "test-token";

/// Total favorites the mock server pretends the identity has saved.
const MOCK_TOTAL_ITEMS: u64 = 25;

#[derive(Clone, Default)]
struct MockState {
    queries: Arc<Mutex<Vec<HashMap<String, String>>>>,
    mutations: Arc<Mutex<Vec<String>>>,
}

fn check_auth(headers: &HeaderMap) -> Result<(), Response> {
    let authorized = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(|v| v == format!("Bearer {}", VALID_TOKEN))
        .unwrap_or(false);

    if authorized {
        Ok(())
    } else {
        Err((StatusCode::UNAUTHORIZED, "unauthorized").into_response())
    }
}

fn mock_tip(id: &str) -> TipSummary {
    TipSummary {
        id: id.to_string(),
        title: format!("Tip {}", id),
        description: Some("A handy life hack".to_string()),
        category_name: Some("Kitchen".to_string()),
        media_url: None,
        created_at: None,
    }
}

async fn list_favorites(
    State(state): State<MockState>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    if let Err(denied) = check_auth(&headers) {
        return denied;
    }

    state.queries.lock().unwrap().push(params.clone());

    // Magic search term to exercise the server-failure path.
    if params.get("q").map(String::as_str) == Some("boom") {
        return (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response();
    }

    let page_number: u32 = params
        .get("pageNumber")
        .and_then(|p| p.parse().ok())
        .unwrap_or(1);
    let page_size: u32 = params
        .get("pageSize")
        .and_then(|p| p.parse().ok())
        .unwrap_or(REMOTE_PAGE_SIZE);

    let total_pages = (MOCK_TOTAL_ITEMS as u32).div_ceil(page_size);
    let start = (page_number - 1) * page_size;
    let end = (start + page_size).min(MOCK_TOTAL_ITEMS as u32);
    let items: Vec<TipSummary> = (start..end)
        .map(|i| mock_tip(&format!("srv{}", i + 1)))
        .collect();

    Json(FavoritePage {
        items,
        total_items: MOCK_TOTAL_ITEMS,
        page_number,
        page_size,
        total_pages,
    })
    .into_response()
}

async fn add_favorite(
    State(state): State<MockState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    if let Err(denied) = check_auth(&headers) {
        return denied;
    }
    state.mutations.lock().unwrap().push(format!("add:{}", id));
    StatusCode::NO_CONTENT.into_response()
}

async fn remove_favorite(
    State(state): State<MockState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    if let Err(denied) = check_auth(&headers) {
        return denied;
    }
    state
        .mutations
        .lock()
        .unwrap()
        .push(format!("remove:{}", id));
    StatusCode::NO_CONTENT.into_response()
}

async fn get_tip(Path(id): Path<String>) -> Response {
    // Public lookup endpoint; t1..t3 exist, everything else is gone.
    match id.as_str() {
        "t1" | "t2" | "t3" => Json(mock_tip(&id)).into_response(),
        _ => (StatusCode::NOT_FOUND, "not found").into_response(),
    }
}

/// Test fixture: in-process mock API plus real clients pointed at it.
struct TestFixture {
    base_url: String,
    state: MockState,
}

impl TestFixture {
    async fn new() -> Self {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .try_init();

        let state = MockState::default();

        let app = Router::new()
            .route("/favorites", get(list_favorites))
            .route("/favorites/{id}", post(add_favorite).delete(remove_favorite))
            .route("/tips/{id}", get(get_tip))
            .with_state(state.clone());

        // Bind to random port
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind");
        let addr = listener.local_addr().expect("Failed to get addr");
        let base_url = format!("http://{}", addr);

        // Spawn server
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        // Wait for server to start
        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;

        TestFixture { base_url, state }
    }

    fn favorites_client(&self) -> RemoteFavoritesClient {
        RemoteFavoritesClient::new(&self.base_url)
    }

    fn lookup_client(&self) -> TipLookupClient {
        TipLookupClient::new(&self.base_url)
    }

    fn controller(&self) -> FavoritesController<MemoryStore> {
        FavoritesController::new(
            LocalFavorites::new(MemoryStore::new()),
            Arc::new(self.favorites_client()),
            Arc::new(self.lookup_client()),
        )
    }

    fn recorded_queries(&self) -> Vec<HashMap<String, String>> {
        self.state.queries.lock().unwrap().clone()
    }

    fn recorded_mutations(&self) -> Vec<String> {
        self.state.mutations.lock().unwrap().clone()
    }
}

#[tokio::test]
async fn test_query_sends_bearer_auth_and_mapped_sort_params() {
    use crate::controller::RemoteFavorites;

    let fixture = TestFixture::new().await;
    let client = fixture.favorites_client();

    let filter = codec::parse("q=garlic&categoryId=kitchen&sortBy=alphabetical");
    let page = client
        .query(&filter, 1, REMOTE_PAGE_SIZE, VALID_TOKEN)
        .await
        .unwrap();

    assert_eq!(page.items.len(), 10);
    assert_eq!(page.total_pages, 3);

    let queries = fixture.recorded_queries();
    assert_eq!(queries.len(), 1);
    let params = &queries[0];
    assert_eq!(params.get("q").unwrap(), "garlic");
    assert_eq!(params.get("categoryId").unwrap(), "kitchen");
    assert_eq!(params.get("orderBy").unwrap(), "Title");
    assert_eq!(params.get("sortDirection").unwrap(), "Ascending");
    assert_eq!(params.get("pageNumber").unwrap(), "1");
    assert_eq!(params.get("pageSize").unwrap(), "10");
}

#[tokio::test]
async fn test_query_omits_empty_filter_params() {
    use crate::controller::RemoteFavorites;

    let fixture = TestFixture::new().await;
    let client = fixture.favorites_client();

    let filter = codec::parse("");
    client
        .query(&filter, 1, REMOTE_PAGE_SIZE, VALID_TOKEN)
        .await
        .unwrap();

    let params = &fixture.recorded_queries()[0];
    assert!(!params.contains_key("q"));
    assert!(!params.contains_key("categoryId"));
    assert_eq!(params.get("orderBy").unwrap(), "CreatedAt");
    assert_eq!(params.get("sortDirection").unwrap(), "Descending");
}

#[tokio::test]
async fn test_bad_token_is_an_auth_error_not_a_retry() {
    use crate::controller::RemoteFavorites;

    let fixture = TestFixture::new().await;
    let client = fixture.favorites_client();

    let err = client
        .query(&codec::parse(""), 1, REMOTE_PAGE_SIZE, "expired-token")
        .await
        .unwrap_err();

    assert!(err.is_auth());
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn test_server_failure_is_retryable() {
    use crate::controller::RemoteFavorites;

    let fixture = TestFixture::new().await;
    let client = fixture.favorites_client();

    let err = client
        .query(&codec::parse("q=boom"), 1, REMOTE_PAGE_SIZE, VALID_TOKEN)
        .await
        .unwrap_err();

    assert!(err.is_retryable());
    assert!(!err.is_auth());
}

#[tokio::test]
async fn test_tip_lookup_resolves_and_reports_missing() {
    use crate::controller::TipLookup;

    let fixture = TestFixture::new().await;
    let client = fixture.lookup_client();

    let tip = client.fetch_tip_by_id("t1").await.unwrap();
    assert_eq!(tip.id, "t1");
    assert_eq!(tip.category_name.as_deref(), Some("Kitchen"));

    let err = client.fetch_tip_by_id("t99").await.unwrap_err();
    assert_eq!(err.error_code(), crate::errors::codes::NOT_FOUND);
}

#[tokio::test]
async fn test_controller_end_to_end_authenticated_load_and_load_more() {
    let fixture = TestFixture::new().await;
    let mut controller = fixture.controller();

    controller
        .set_identity(Identity::Authenticated {
            auth_token: VALID_TOKEN.to_string(),
        })
        .await;

    assert_eq!(controller.state(), &LoadState::AuthenticatedLoaded);
    assert_eq!(controller.tips().len(), 10);
    assert_eq!(controller.total_pages(), 3);

    controller.load_more().await;
    controller.load_more().await;

    assert_eq!(controller.current_page(), 3);
    assert_eq!(controller.tips().len(), 25);
    assert_eq!(controller.tips()[0].id, "srv1");
    assert_eq!(controller.tips()[24].id, "srv25");
    assert!(!controller.can_load_more());
}

#[tokio::test]
async fn test_controller_end_to_end_anonymous_resolution() {
    let fixture = TestFixture::new().await;
    let mut controller = fixture.controller();

    // t9 does not exist server-side and must be dropped silently.
    for id in ["t1", "t9", "t2"] {
        controller.add_favorite(id).await.unwrap();
    }
    controller.set_identity(Identity::Anonymous).await;

    let ids: Vec<&str> = controller.tips().iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, vec!["t1", "t2"]);
    assert_eq!(controller.total_pages(), 1);
    assert!(
        fixture.recorded_queries().is_empty(),
        "anonymous path must never hit the favorites endpoint"
    );
}

#[tokio::test]
async fn test_controller_end_to_end_authenticated_mutations() {
    let fixture = TestFixture::new().await;
    let mut controller = fixture.controller();

    controller
        .set_identity(Identity::Authenticated {
            auth_token: VALID_TOKEN.to_string(),
        })
        .await;

    controller.add_favorite("srv99").await.unwrap();
    controller.remove_favorite("srv1").await.unwrap();

    assert_eq!(
        fixture.recorded_mutations(),
        vec!["add:srv99", "remove:srv1"]
    );
}

#[tokio::test]
async fn test_expired_session_surfaces_auth_error_state() {
    let fixture = TestFixture::new().await;
    let mut controller = fixture.controller();

    controller
        .set_identity(Identity::Authenticated {
            auth_token: "expired-token".to_string(),
        })
        .await;

    match controller.state() {
        LoadState::Error(message) => {
            assert!(message.contains("authentication required"), "{}", message)
        }
        other => panic!("expected error state, got {:?}", other),
    }
    assert!(controller.tips().is_empty());
}
