use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use engine::persist::{save_index, IndexPaths};
use engine::{Analyzer, IndexBuilder, ScoringConfig};
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::tempdir;
use tower::ServiceExt;

fn build_tiny_index(dir: &std::path::Path) {
    let mut b = IndexBuilder::new(Analyzer::default());
    b.add_document("doc0", "UNKNOWN", "Rust is great. rust systems programming.");
    b.add_document("doc1", "UNKNOWN", "Learning rust slowly through long evenings of reading manuals.");
    b.add_document("doc2", "UNKNOWN", "Gardening tips for spring.");
    save_index(&IndexPaths::new(dir), &b.finish(), "2024-01-01T00:00:00Z".into()).unwrap();
}

fn app(dir: &std::path::Path) -> Router {
    let model = ScoringConfig::default().validate().unwrap();
    server::build_app(dir.to_string_lossy().to_string(), model).unwrap()
}

async fn call(app: Router, uri: &str) -> (StatusCode, Value) {
    let req = Request::get(uri).body(Body::empty()).unwrap();
    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let body = resp.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, json)
}

#[tokio::test]
async fn search_returns_ranked_results() {
    let dir = tempdir().unwrap();
    build_tiny_index(dir.path());

    let (status, json) = call(app(dir.path()), "/search?q=rust&k=2").await;
    assert_eq!(status, StatusCode::OK);
    let arr = json["results"].as_array().unwrap();
    assert_eq!(arr.len(), 2);
    assert_eq!(json["total_hits"].as_u64().unwrap(), 2);
    // higher tf in a shorter document wins
    assert_eq!(arr[0]["external_id"].as_str().unwrap(), "doc0");
    assert_eq!(arr[1]["external_id"].as_str().unwrap(), "doc1");
    assert_eq!(arr[0]["rank"].as_u64().unwrap(), 1);
}

#[tokio::test]
async fn empty_query_has_no_hits() {
    let dir = tempdir().unwrap();
    build_tiny_index(dir.path());

    let (status, json) = call(app(dir.path()), "/search?q=the").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["total_hits"].as_u64().unwrap(), 0);
}

#[tokio::test]
async fn doc_lookup() {
    let dir = tempdir().unwrap();
    build_tiny_index(dir.path());

    let (status, json) = call(app(dir.path()), "/doc/2").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["docno"].as_str().unwrap(), "doc2");

    let (status, _) = call(app(dir.path()), "/doc/99").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn concurrent_searches_agree() {
    let dir = tempdir().unwrap();
    build_tiny_index(dir.path());
    let app = app(dir.path());

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let app = app.clone();
            tokio::spawn(async move { call(app, "/search?q=rust").await })
        })
        .collect();
    for handle in handles {
        let (status, json) = handle.await.unwrap();
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["total_hits"].as_u64().unwrap(), 2);
        assert_eq!(json["results"][0]["external_id"].as_str().unwrap(), "doc0");
    }
}
