//! Catalog client against a local stand-in for the upstream API
//!
//! The stand-in issues tokens, serves artist and gene fixtures, fails search
//! with 503 and rejects artworks with 401.

use axum::{
    Json, Router,
    body::Body,
    extract::{Path, Query, State},
    http::{HeaderMap, Request, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::{Duration, Utc};
use serde_json::{Value, json};
use std::{
    collections::HashMap,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
};
use tokio::net::TcpListener;
use tower::ServiceExt;

use gateway::{
    AppState,
    catalog::{CatalogClient, CatalogConfig, CatalogError},
    jwt::{DEFAULT_TOKEN_EXPIRY, JwtConfig, JwtService},
    repositories::InMemoryUserStore,
    routes::create_router,
};

const STUB_TOKEN: &str = "stub-token";

async fn issue_token(State(token_requests): State<Arc<AtomicUsize>>) -> impl IntoResponse {
    token_requests.fetch_add(1, Ordering::SeqCst);
    (
        StatusCode::CREATED,
        Json(json!({
            "type": "xapp_token",
            "token": STUB_TOKEN,
            "expires_at": (Utc::now() + Duration::hours(1)).to_rfc3339(),
        })),
    )
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get("x-xapp-token")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == STUB_TOKEN)
}

async fn artist(Path(id): Path<String>, headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }

    Json(json!({
        "id": id,
        "name": "Pablo Picasso",
        "birthday": "1881",
        "nationality": "Spanish",
        "_links": {}
    }))
    .into_response()
}

async fn genes(Query(params): Query<HashMap<String, String>>, headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    if params.get("artwork_id").map(String::as_str) != Some("demoiselles")
        || params.get("size").map(String::as_str) != Some("10")
    {
        return StatusCode::BAD_REQUEST.into_response();
    }

    Json(json!({
        "_embedded": {
            "genes": [
                {"name": "Cubism", "_links": {"thumbnail": {"href": "https://example.org/cubism.jpg"}}}
            ]
        }
    }))
    .into_response()
}

/// Start the stand-in upstream; returns its base URL and a token request counter
async fn spawn_upstream() -> (String, Arc<AtomicUsize>) {
    let token_requests = Arc::new(AtomicUsize::new(0));

    let app = Router::new()
        .route("/api/tokens/xapp_token", post(issue_token))
        .route(
            "/api/search",
            get(|| async { StatusCode::SERVICE_UNAVAILABLE }),
        )
        .route("/api/artists/:id", get(artist))
        .route("/api/artworks", get(|| async { StatusCode::UNAUTHORIZED }))
        .route("/api/genes", get(genes))
        .with_state(token_requests.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}/api", address), token_requests)
}

fn client(base_url: String) -> CatalogClient {
    CatalogClient::new(CatalogConfig {
        base_url,
        client_id: "id".to_string(),
        client_secret: "secret".to_string(),
        timeout_secs: 5,
        cache_token: true,
    })
    .unwrap()
}

#[tokio::test]
async fn test_upstream_failure_is_upstream_error() {
    let (base_url, _) = spawn_upstream().await;
    let client = client(base_url);

    match client.search_artists("picasso").await {
        Err(CatalogError::Upstream { context, detail }) => {
            assert_eq!(context, "Search request failed");
            assert!(detail.contains("503"));
        }
        other => panic!("expected upstream error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_responses_are_reshaped_and_token_is_reused() {
    let (base_url, token_requests) = spawn_upstream().await;
    let client = client(base_url);

    let artist = client.get_artist_details("pablo-picasso").await.unwrap();
    assert_eq!(artist.name.as_deref(), Some("Pablo Picasso"));
    assert_eq!(artist.birthday.as_deref(), Some("1881"));
    assert_eq!(artist.deathday, None);

    let genes = client.get_genes("demoiselles").await.unwrap();
    assert_eq!(genes.len(), 1);
    assert_eq!(genes[0].name.as_deref(), Some("Cubism"));
    assert_eq!(
        genes[0].thumbnail.as_deref(),
        Some("https://example.org/cubism.jpg")
    );

    assert_eq!(token_requests.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_upstream_unauthorized_evicts_cached_token() {
    let (base_url, token_requests) = spawn_upstream().await;
    let client = client(base_url);

    client.get_genes("demoiselles").await.unwrap();
    assert_eq!(token_requests.load(Ordering::SeqCst), 1);

    assert!(matches!(
        client.get_artworks("pablo-picasso").await,
        Err(CatalogError::Upstream { .. })
    ));
    assert_eq!(token_requests.load(Ordering::SeqCst), 1);

    client.get_genes("demoiselles").await.unwrap();
    assert_eq!(token_requests.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_catalog_routes_over_upstream() {
    let (base_url, _) = spawn_upstream().await;
    let jwt = JwtService::new(JwtConfig {
        secret: "integration-secret".to_string(),
        token_expiry: DEFAULT_TOKEN_EXPIRY,
    });
    let router = create_router(AppState::new(
        Arc::new(InMemoryUserStore::new()),
        jwt,
        client(base_url),
        false,
    ));

    let get_json = |uri: &'static str| {
        let router = router.clone();
        async move {
            let response = router
                .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
                .await
                .unwrap();
            let status = response.status();
            let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
                .await
                .unwrap();
            (status, serde_json::from_slice::<Value>(&bytes).unwrap())
        }
    };

    let (status, body) = get_json("/search?q=picasso").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body, json!({"error": "Search request failed"}));

    let (status, body) = get_json("/artist?id=pablo-picasso").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["artist"]["name"], "Pablo Picasso");
    assert_eq!(body["artist"]["nationality"], "Spanish");
    assert!(body["artist"].get("deathday").is_none());

    let (status, body) = get_json("/genes?artwork_id=demoiselles").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["genes"][0]["name"], "Cubism");

    let (status, body) = get_json("/artworks?artist_id=pablo-picasso").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body, json!({"error": "Failed to fetch artworks"}));
}
