//! Embedded chat page and its static assets
//!
//! In development, falls back to serving from the `web/` directory.

use axum::{
    body::Body,
    extract::Path,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use rust_embed::Embed;
use std::path::PathBuf;

#[derive(Embed)]
#[folder = "web"]
struct Assets;

const WEB_DIR: &str = "web";

fn load(path: &str) -> Option<Vec<u8>> {
    if let Some(content) = Assets::get(path) {
        return Some(content.data.into_owned());
    }
    std::fs::read(PathBuf::from(WEB_DIR).join(path)).ok()
}

/// Serve files under `web/static`, embedded or from the filesystem
pub async fn serve_static(Path(path): Path<String>) -> Response {
    if path.split('/').any(|part| part == "..") {
        return (StatusCode::NOT_FOUND, "Not found").into_response();
    }

    let path = format!("static/{path}");
    match load(&path) {
        Some(content) => {
            let mime = mime_guess::from_path(&path).first_or_octet_stream();
            (
                StatusCode::OK,
                [(header::CONTENT_TYPE, mime.as_ref().to_string())],
                Body::from(content),
            )
                .into_response()
        }
        None => (StatusCode::NOT_FOUND, "Not found").into_response(),
    }
}

/// Get the chat page (embedded or from filesystem)
pub fn get_index_html() -> Option<String> {
    load("index.html").and_then(|bytes| String::from_utf8(bytes).ok())
}
