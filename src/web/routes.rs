//! HTTP handlers.
//!
//! - `GET /`                 upload form, plus the cached result if any (`?json=1` shows raw JSON)
//! - `POST /scan`            multipart upload → extract → redirect to `/`
//! - `GET /tables/:n/csv`    CSV download for table `n` of the cached result
//! - `GET /health`           liveness

use super::state::{AppState, SharedSession};
use crate::config::is_truthy;
use crate::document::UploadedDocument;
use crate::error::ScanError;
use crate::view::{self, html, ResultView};
use axum::{
    extract::{Multipart, Path, Query, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Cookie carrying the browser's session id.
pub const SESSION_COOKIE: &str = "docscan_session";

#[derive(Debug, Deserialize)]
pub struct IndexQuery {
    #[serde(default)]
    json: Option<String>,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    engine: String,
}

/// Browser session id, and whether it was just minted.
struct SessionId {
    id: String,
    is_new: bool,
}

impl SessionId {
    fn from_headers(headers: &HeaderMap) -> Self {
        match cookie_value(headers, SESSION_COOKIE).filter(|v| Uuid::parse_str(v).is_ok()) {
            Some(id) => Self { id, is_new: false },
            None => Self {
                id: Uuid::new_v4().to_string(),
                is_new: true,
            },
        }
    }

    /// Attach `Set-Cookie` when the id is new.
    fn apply(&self, mut response: Response) -> Response {
        if self.is_new {
            let cookie = format!(
                "{}={}; Path=/; HttpOnly; SameSite=Lax",
                SESSION_COOKIE, self.id
            );
            if let Ok(value) = HeaderValue::from_str(&cookie) {
                response.headers_mut().append(header::SET_COOKIE, value);
            }
        }
        response
    }
}

fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(k, _)| *k == name)
        .map(|(_, v)| v.trim().to_string())
}

fn render_page(view: Option<&ResultView>, error: Option<&str>) -> String {
    html::page(&html::PageOptions {
        view,
        error,
        csv_links: html::CsvLinks::Route,
        interactive: true,
    })
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Html(render_page(None, Some(message)))).into_response()
}

fn scan_error_response(err: &ScanError) -> Response {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    error_response(status, &err.to_string())
}

/// Run blocking work with the session locked.
async fn with_session<T, F>(session: SharedSession, f: F) -> Result<T, ScanError>
where
    T: Send + 'static,
    F: FnOnce(&mut crate::session::ExtractionSession) -> Result<T, ScanError> + Send + 'static,
{
    tokio::task::spawn_blocking(move || {
        let mut guard = session
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut guard)
    })
    .await
    .map_err(|e| ScanError::Internal(format!("Scan task panicked: {e}")))?
}

/// GET /
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<IndexQuery>,
    headers: HeaderMap,
) -> Response {
    let sid = SessionId::from_headers(&headers);
    let show_json = query.json.as_deref().is_some_and(is_truthy);
    let session = state.sessions().get_or_create(&sid.id);

    let rendered = with_session(session, move |s| Ok(s.render(show_json))).await;
    let response = match rendered {
        Ok(view) => Html(render_page(view.as_ref(), None)).into_response(),
        Err(e) => scan_error_response(&e),
    };
    sid.apply(response)
}

/// POST /scan
pub async fn scan(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Response {
    let sid = SessionId::from_headers(&headers);

    let mut upload: Option<UploadedDocument> = None;
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                tracing::warn!("Failed to read multipart field: {}", e);
                let message = format!("Failed to read upload: {e}");
                return sid.apply(error_response(e.status(), &message));
            }
        };
        if field.name() != Some("file") {
            continue;
        }

        let name = field.file_name().unwrap_or("upload").to_string();
        let mime = field.content_type().unwrap_or("").to_string();
        let data = match field.bytes().await {
            Ok(data) => data,
            Err(e) => {
                tracing::warn!("Failed to read file data: {}", e);
                let message = format!("Failed to read upload: {e}");
                return sid.apply(error_response(e.status(), &message));
            }
        };
        tracing::debug!("Received '{}' ({}, {} bytes)", name, mime, data.len());
        upload = Some(UploadedDocument::new(data.to_vec(), mime, name));
        break;
    }

    let Some(document) = upload else {
        return sid.apply(error_response(StatusCode::BAD_REQUEST, "No file was uploaded."));
    };

    let ctx = state.context();
    let session = state.sessions().get_or_create(&sid.id);
    let outcome = with_session(session, move |s| {
        s.submit(document);
        s.ensure_result(&ctx).map(|_| ())
    })
    .await;

    let response = match outcome {
        Ok(()) => Redirect::to("/").into_response(),
        Err(e) => {
            tracing::warn!("Scan failed: {}", e);
            scan_error_response(&e)
        }
    };
    sid.apply(response)
}

/// GET /tables/:number/csv
pub async fn table_csv(
    State(state): State<AppState>,
    Path(number): Path<usize>,
    headers: HeaderMap,
) -> Response {
    let sid = SessionId::from_headers(&headers);
    let session = if sid.is_new {
        None
    } else {
        state.sessions().get(&sid.id)
    };
    let extraction = match session {
        Some(session) => match with_session(session, |s| Ok(s.cached())).await {
            Ok(cached) => cached,
            Err(e) => return scan_error_response(&e),
        },
        None => None,
    };

    let table = extraction.and_then(|e| {
        let page = e.result().first_page()?;
        view::partition(page)
            .tables
            .into_iter()
            .find(|t| t.number == number)
    });

    match table {
        Some(t) => {
            let file_name = t.csv_file_name();
            match t.csv {
                Some(csv) => csv_response(&file_name, csv),
                None => error_response(
                    StatusCode::NOT_FOUND,
                    &format!("Table {number} cannot be downloaded as CSV."),
                ),
            }
        }
        None => error_response(StatusCode::NOT_FOUND, &format!("Table {number} not found.")),
    }
}

fn csv_response(file_name: &str, csv: String) -> Response {
    (
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{file_name}\""),
            ),
        ],
        csv,
    )
        .into_response()
}

/// GET /health
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        engine: state.context().engine_name().to_string(),
    })
}
