//! HTTP behaviour of the browser UI, driven through the router in-process.

mod common;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, Response, StatusCode};
use axum::Router;
use common::{context, invoice_page, png, StubEngine};
use docscan::web::{router, AppState};
use docscan::EngineError;
use std::sync::Arc;
use tower::ServiceExt;

const BOUNDARY: &str = "docscan-test-boundary";

fn app(engine: Arc<StubEngine>) -> Router {
    router(AppState::new(Arc::new(context(engine))))
}

fn upload(
    field: &str,
    file_name: &str,
    mime: &str,
    bytes: &[u8],
    cookie: Option<&str>,
) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\n\
             Content-Type: {mime}\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    let mut req = Request::builder()
        .method("POST")
        .uri("/scan")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        );
    if let Some(cookie) = cookie {
        req = req.header(header::COOKIE, cookie);
    }
    req.body(Body::from(body)).unwrap()
}

fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut req = Request::builder().uri(uri);
    if let Some(cookie) = cookie {
        req = req.header(header::COOKIE, cookie);
    }
    req.body(Body::empty()).unwrap()
}

/// `name=value` part of the response's Set-Cookie header.
fn session_cookie(res: &Response<Body>) -> String {
    res.headers()
        .get(header::SET_COOKIE)
        .expect("Set-Cookie")
        .to_str()
        .unwrap()
        .split(';')
        .next()
        .unwrap()
        .to_string()
}

async fn body_text(res: Response<Body>) -> String {
    let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn index_without_session_shows_upload_form() {
    let res = app(StubEngine::new(vec![invoice_page()]))
        .oneshot(get("/", None))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert!(session_cookie(&res).starts_with("docscan_session="));
    let html = body_text(res).await;
    assert!(html.contains("Supported formats: PNG, JPG, PDF"));
    assert!(html.contains("action=\"/scan\""));
    assert!(!html.contains("<h3>Results</h3>"));
}

#[tokio::test]
async fn upload_then_rerender_uses_cache() {
    let engine = StubEngine::new(vec![invoice_page()]);
    let app = app(Arc::clone(&engine));

    let res = app
        .clone()
        .oneshot(upload("file", "invoice.png", "image/png", &png(10, 10), None))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(res.headers()[header::LOCATION], "/");
    let cookie = session_cookie(&res);

    let res = app.clone().oneshot(get("/", Some(&cookie))).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.headers().get(header::SET_COOKIE).is_none());
    let html = body_text(res).await;
    assert!(html.contains("Original Document"));
    assert!(html.contains("<strong>Table 1</strong>"));
    assert!(html.contains("href=\"/tables/1/csv\""));
    assert!(html.contains("Download Table 1 (CSV)"));
    assert!(html.contains("\\[E = mc^2\\]"));
    assert!(html.contains("Thank you for your business."));
    assert!(html.contains("Show JSON Output"));
    assert!(!html.contains("table_res_list"));

    let html = body_text(app.clone().oneshot(get("/?json=1", Some(&cookie))).await.unwrap()).await;
    assert!(html.contains("Hide JSON Output"));
    assert!(html.contains("table_res_list"));

    // Same file again: identity unchanged, no second engine call.
    let res = app
        .clone()
        .oneshot(upload("file", "invoice.png", "image/png", &png(10, 10), Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(engine.calls(), 1);
}

#[tokio::test]
async fn sessions_are_isolated() {
    let engine = StubEngine::new(vec![invoice_page()]);
    let app = app(Arc::clone(&engine));

    let res = app
        .clone()
        .oneshot(upload("file", "a.png", "image/png", &png(4, 4), None))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::SEE_OTHER);

    let html = body_text(app.clone().oneshot(get("/", None)).await.unwrap()).await;
    assert!(!html.contains("<h3>Results</h3>"));
}

#[tokio::test]
async fn table_csv_download() {
    let engine = StubEngine::new(vec![invoice_page()]);
    let app = app(Arc::clone(&engine));

    let res = app
        .clone()
        .oneshot(upload("file", "invoice.png", "image/png", &png(6, 6), None))
        .await
        .unwrap();
    let cookie = session_cookie(&res);

    let res = app
        .clone()
        .oneshot(get("/tables/1/csv", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.headers()[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("text/csv"));
    assert!(res.headers()[header::CONTENT_DISPOSITION]
        .to_str()
        .unwrap()
        .contains("table_1.csv"));
    assert_eq!(body_text(res).await, "Item,Qty\nBolt,4\n");

    let res = app
        .clone()
        .oneshot(get("/tables/2/csv", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = app.clone().oneshot(get("/tables/1/csv", None)).await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(engine.calls(), 1);
}

#[tokio::test]
async fn corrupt_upload_shows_decode_error() {
    let engine = StubEngine::new(vec![invoice_page()]);
    let res = app(Arc::clone(&engine))
        .oneshot(upload("file", "broken.png", "image/png", b"not an image", None))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let html = body_text(res).await;
    assert!(html.contains("Could not decode image"));
    assert!(!html.contains("<h3>Results</h3>"));
    assert_eq!(engine.calls(), 0);
}

#[tokio::test]
async fn engine_failure_shows_processing_error() {
    let engine = StubEngine::failing(EngineError::Failed("connection reset".into()));
    let res = app(engine)
        .oneshot(upload("file", "a.png", "image/png", &png(4, 4), None))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_GATEWAY);
    assert!(body_text(res)
        .await
        .contains("Error during processing: connection reset"));
}

#[tokio::test]
async fn empty_engine_result_shows_no_data_message() {
    let res = app(StubEngine::new(Vec::new()))
        .oneshot(upload("file", "blank.png", "image/png", &png(4, 4), None))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body_text(res)
        .await
        .contains("Could not extract any data from this document."));
}

#[tokio::test]
async fn upload_without_file_field_is_bad_request() {
    let engine = StubEngine::new(vec![invoice_page()]);
    let res = app(Arc::clone(&engine))
        .oneshot(upload("attachment", "a.png", "image/png", &png(4, 4), None))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert!(body_text(res).await.contains("No file was uploaded."));
    assert_eq!(engine.calls(), 0);
}

#[tokio::test]
async fn health_reports_engine() {
    let res = app(StubEngine::new(vec![invoice_page()]))
        .oneshot(get("/health", None))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&body_text(res).await).unwrap();
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["engine"], "stub");
}
