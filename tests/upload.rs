//! Image host uploads against an in-process HTTP server.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use chrono::DateTime;
use image::DynamicImage;
use serde_json::{json, Value};

use civic_pulse::{
    config::UploadConfig,
    evidence::{capture_frame, Capture},
    protocol::Coordinate,
    server::{ImageHost, UploadError},
};

/// Form fields seen by the server: (name, file name, text or byte count).
type Seen = Arc<Mutex<Vec<(String, Option<String>, String)>>>;

async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, router).await.unwrap() });
    format!("http://{address}")
}

fn host(endpoint: String) -> ImageHost {
    ImageHost::new(UploadConfig {
        endpoint,
        cloud_name: "demo".to_string(),
        ..UploadConfig::default()
    })
}

fn capture(coordinate: Option<Coordinate>) -> Capture {
    let now = DateTime::parse_from_rfc3339("2026-10-16T09:21:05+05:30").unwrap();
    capture_frame(&DynamicImage::new_rgb8(320, 240), coordinate, &now).unwrap()
}

async fn record(State(seen): State<Seen>, mut multipart: Multipart) -> Json<Value> {
    while let Some(field) = multipart.next_field().await.unwrap() {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        let bytes = field.bytes().await.unwrap();
        let value = if file_name.is_some() {
            bytes.len().to_string()
        } else {
            String::from_utf8_lossy(&bytes).into_owned()
        };
        seen.lock().unwrap().push((name, file_name, value));
    }

    Json(json!({ "secure_url": "https://img.example/civicpulse/evidence/abc.jpg" }))
}

#[tokio::test]
async fn test_upload_sends_form_and_returns_url() {
    let seen = Seen::default();
    let router = Router::new()
        .route("/v1_1/demo/image/upload", post(record))
        .with_state(seen.clone());
    let base = serve(router).await;

    let coordinate = Coordinate::new(11.0168, 76.9558);
    let capture = capture(Some(coordinate));
    let uploaded = host(format!("{base}/v1_1"))
        .upload(&capture, Some(&coordinate))
        .await
        .unwrap();

    assert_eq!(uploaded.url(), "https://img.example/civicpulse/evidence/abc.jpg");

    let seen = seen.lock().unwrap();
    let field = |name: &str| seen.iter().find(|(n, _, _)| n == name).cloned();

    let (_, file_name, size) = field("file").unwrap();
    assert_eq!(file_name.as_deref(), Some(capture.file_name()));
    assert_eq!(size, capture.bytes().len().to_string());
    assert_eq!(field("upload_preset").unwrap().2, "civic_issues");
    assert_eq!(field("folder").unwrap().2, "civicpulse/evidence");
    assert_eq!(field("context").unwrap().2, "lat=11.0168|lng=76.9558");
}

#[tokio::test]
async fn test_upload_without_location_has_no_context() {
    let seen = Seen::default();
    let router = Router::new()
        .route("/v1_1/demo/image/upload", post(record))
        .with_state(seen.clone());
    let base = serve(router).await;

    host(format!("{base}/v1_1"))
        .upload(&capture(None), None)
        .await
        .unwrap();

    assert!(seen.lock().unwrap().iter().all(|(n, _, _)| n != "context"));
}

#[tokio::test]
async fn test_rejection_carries_host_message() {
    let router = Router::new().route(
        "/v1_1/demo/image/upload",
        post(|| async {
            (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": { "message": "Upload preset not found" } })),
            )
        }),
    );
    let base = serve(router).await;

    let err = host(format!("{base}/v1_1"))
        .upload(&capture(None), None)
        .await
        .unwrap_err();
    assert!(matches!(&err, UploadError::Rejected(m) if m == "Upload preset not found"));
}

#[tokio::test]
async fn test_rejection_without_message_uses_status() {
    let router = Router::new().route(
        "/v1_1/demo/image/upload",
        post(|| async { (StatusCode::BAD_GATEWAY, "upstream down") }),
    );
    let base = serve(router).await;

    let err = host(format!("{base}/v1_1"))
        .upload(&capture(None), None)
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Upload failed (502)");
}

#[tokio::test]
async fn test_success_without_url_is_malformed() {
    let router = Router::new().route(
        "/v1_1/demo/image/upload",
        post(|| async { Json(json!({ "public_id": "abc" })) }),
    );
    let base = serve(router).await;

    let err = host(format!("{base}/v1_1"))
        .upload(&capture(None), None)
        .await
        .unwrap_err();
    assert!(matches!(err, UploadError::MalformedResponse));
}

#[tokio::test]
async fn test_unreachable_host_is_network_error() {
    // bind then drop to get a port nothing listens on
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let address = listener.local_addr().unwrap();
    drop(listener);

    let err = host(format!("http://{address}/v1_1"))
        .upload(&capture(None), None)
        .await
        .unwrap_err();
    assert!(matches!(err, UploadError::Network(_)));
}
