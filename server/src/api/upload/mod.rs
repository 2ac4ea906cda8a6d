//! Upload Routes
//!
//! Photo upload for authenticated users plus public serving of stored
//! media.

mod handler;

use axum::{
    Router,
    body::Bytes,
    extract::{Path, State},
    response::IntoResponse,
    routing::{get, post},
};
use http::header;

use crate::core::ServerState;

enum MediaResponse {
    Ok(Bytes),
    NotFound,
    BadRequest(&'static str),
}

impl IntoResponse for MediaResponse {
    fn into_response(self) -> axum::response::Response {
        match self {
            MediaResponse::Ok(content) => (
                http::StatusCode::OK,
                [(header::CONTENT_TYPE, "image/jpeg")],
                content,
            )
                .into_response(),
            MediaResponse::NotFound => {
                (http::StatusCode::NOT_FOUND, "File not found").into_response()
            }
            MediaResponse::BadRequest(msg) => {
                (http::StatusCode::BAD_REQUEST, msg).into_response()
            }
        }
    }
}

/// Serve a stored photo by filename.
async fn serve_media(
    State(state): State<ServerState>,
    Path(filename): Path<String>,
) -> MediaResponse {
    // Reject path traversal
    if filename.is_empty()
        || filename.contains("..")
        || filename.contains('/')
        || filename.contains('\\')
    {
        return MediaResponse::BadRequest("Invalid filename");
    }

    let file_path = std::path::Path::new(&state.config.media_dir()).join(&filename);
    match tokio::fs::read(&file_path).await {
        Ok(content) => MediaResponse::Ok(content.into()),
        Err(_) => MediaResponse::NotFound,
    }
}

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/upload", post(handler::upload))
        .route("/api/media/{filename}", get(serve_media))
}
