//! HTTP surface tests: status codes and `{ "error": ... }` payloads

mod common;

use std::collections::HashMap;
use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use tower::ServiceExt;

use castfinder::app::{AppState, build_app};
use castfinder::config::Config;
use castfinder::services::UpstreamError;
use castfinder::services::models::SearchPage;

use common::{StubSource, credit, search_hit};

fn app(source: StubSource) -> Router {
    let env: HashMap<&str, &str> = HashMap::from([
        ("TMDB_API_KEY", "test_key"),
        ("TMDB_API_BASE_URL", "https://api.themoviedb.org/3"),
        ("TMDB_IMAGE_BASE_URL", "https://image.tmdb.org/t/p/w500"),
        ("TMDB_LANGUAGE", ""),
    ]);
    let config = Config::from_lookup(|key| env.get(key).map(|v| v.to_string())).unwrap();
    build_app(AppState::from_config(&config, Arc::new(source)))
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_healthz() {
    let (status, body) = send(app(StubSource::default()), get("/healthz")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_search_returns_payload() {
    let source = StubSource {
        search: Some(Ok(SearchPage {
            hits: vec![
                search_hit(27205, "movie", "Inception", Some("/inception.jpg")),
                search_hit(525, "person", "Christopher Nolan", None),
            ],
            total_results: 2,
            total_pages: 1,
        })),
        ..Default::default()
    };

    let (status, body) = send(app(source), get("/api/search?query=Inception&page=1")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_results"], 2);
    assert_eq!(body["results"].as_array().unwrap().len(), 1);
    assert_eq!(body["results"][0]["media_type"], "movie");
    assert_eq!(
        body["results"][0]["poster_path"],
        "https://image.tmdb.org/t/p/w500/inception.jpg"
    );
}

#[tokio::test]
async fn test_blank_search_is_bad_request() {
    let (status, body) = send(app(StubSource::default()), get("/api/search?query=%20%20")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Search query is required" }));

    let (status, _) = send(app(StubSource::default()), get("/api/search")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_upstream_failure_is_bad_gateway() {
    let source = StubSource {
        search: Some(Err(UpstreamError::transport())),
        ..Default::default()
    };

    let (status, body) = send(app(source), get("/api/search?query=Inception")).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(
        body["error"],
        "TMDB API error: Failed to reach the metadata provider"
    );
}

#[tokio::test]
async fn test_movie_cast() {
    let mut source = StubSource::default().with_person(6193, 54.2);
    source
        .credits
        .insert(27205, Ok(vec![credit(6193, "Cobb", Some(0))]));

    let (status, body) = send(
        app(source),
        post_json(
            "/api/movie-cast",
            json!({ "id": 27205, "mediaType": "movie", "year": "2010" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let actor = &body[0];
    assert_eq!(actor["name"], "Person 6193");
    assert_eq!(actor["role"], "Cobb");
    assert_eq!(actor["birthYear"], 1974);
    assert_eq!(actor["movieYear"], 2010);
    assert_eq!(actor["gender"], 2);
    assert_eq!(actor["known_for_department"], "Acting");
    assert_eq!(
        actor["imageUrl"],
        "https://image.tmdb.org/t/p/w500/p6193.jpg"
    );
}

#[tokio::test]
async fn test_movie_cast_requires_id_and_type() {
    let (status, body) = send(
        app(StubSource::default()),
        post_json("/api/movie-cast", json!({ "mediaType": "movie" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({ "error": "Movie ID and media type are required" })
    );
}

#[tokio::test]
async fn test_malformed_cast_body_is_json_bad_request() {
    let bodies = [
        json!({ "id": 27205, "mediaType": "person" }),
        json!({ "id": "27205", "mediaType": "movie" }),
    ];

    for body in bodies {
        let (status, payload) = send(
            app(StubSource::default()),
            post_json("/api/movie-cast", body),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(payload, json!({ "error": "Invalid request body" }));
    }
}

#[tokio::test]
async fn test_numeric_year_without_id_is_validation_error() {
    let (status, body) = send(
        app(StubSource::default()),
        post_json("/api/movie-cast", json!({ "year": 2010 })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({ "error": "Movie ID and media type are required" })
    );
}

#[tokio::test]
async fn test_non_numeric_page_is_json_bad_request() {
    let (status, body) = send(
        app(StubSource::default()),
        get("/api/search?query=Inception&page=abc"),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Invalid search parameters" }));
}
