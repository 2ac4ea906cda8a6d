//! Photo Upload Handler
//!
//! Accepts one multipart image, re-encodes it to JPEG and stores it
//! under a content-hash filename so repeated uploads of the same photo
//! land on the same file.

use axum::Json;
use axum::extract::{Multipart, State};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::io::Cursor;
use std::path::PathBuf;

use crate::AppError;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::utils::AppResult;

/// Maximum file size (5MB)
const MAX_FILE_SIZE: usize = 5 * 1024 * 1024;

/// Accepted source formats; everything is stored as JPEG
const SUPPORTED_FORMATS: &[&str] = &["png", "jpg", "jpeg", "webp"];

/// JPEG re-encode quality
const JPEG_QUALITY: u8 = 85;

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub filename: String,
    pub url: String,
    pub size: usize,
}

fn validate_image(data: &[u8], ext: &str) -> AppResult<()> {
    if data.len() > MAX_FILE_SIZE {
        return Err(AppError::validation(format!(
            "File too large. Maximum size is {}MB",
            MAX_FILE_SIZE / 1024 / 1024
        )));
    }

    let ext_lower = ext.to_lowercase();
    if !SUPPORTED_FORMATS.contains(&ext_lower.as_str()) {
        return Err(AppError::validation(format!(
            "Unsupported file format '{}'. Supported: {}",
            ext_lower,
            SUPPORTED_FORMATS.join(", ")
        )));
    }
    Ok(())
}

fn reencode_jpeg(data: &[u8]) -> AppResult<Vec<u8>> {
    let img = image::load_from_memory(data)
        .map_err(|e| AppError::validation(format!("Invalid image: {e}")))?;

    let mut buffer = Vec::new();
    {
        let mut cursor = Cursor::new(&mut buffer);
        let rgb = img.to_rgb8();
        let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut cursor, JPEG_QUALITY);
        rgb.write_with_encoder(encoder)
            .map_err(|e| AppError::internal(format!("Failed to encode image: {e}")))?;
    }
    Ok(buffer)
}

/// Upload a photo. Field name must be "file".
pub async fn upload(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    mut multipart: Multipart,
) -> AppResult<Json<UploadResponse>> {
    let media_dir = PathBuf::from(state.config.media_dir());
    tokio::fs::create_dir_all(&media_dir)
        .await
        .map_err(|e| AppError::internal(format!("Failed to create media directory: {e}")))?;

    let mut field_data: Option<Vec<u8>> = None;
    let mut original_filename = None;

    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some("file") {
            original_filename = field.file_name().map(|s| s.to_string());
            field_data = Some(field.bytes().await?.to_vec());
            break;
        }
    }

    let data = field_data
        .ok_or_else(|| AppError::validation("No 'file' field found in the upload"))?;
    if data.is_empty() {
        return Err(AppError::validation("Empty file provided"));
    }

    let filename = original_filename
        .ok_or_else(|| AppError::validation("No filename provided in file field"))?;
    let ext = PathBuf::from(&filename)
        .extension()
        .and_then(|e| e.to_str().map(str::to_string))
        .ok_or_else(|| AppError::validation(format!("Invalid file extension for: {filename}")))?;

    validate_image(&data, &ext)?;
    let jpeg = reencode_jpeg(&data)?;

    // Content-addressed name: identical photos collapse to one file
    let hash = hex::encode(Sha256::digest(&jpeg));
    let stored_name = format!("{hash}.jpg");
    let path = media_dir.join(&stored_name);

    if !path.exists() {
        tokio::fs::write(&path, &jpeg)
            .await
            .map_err(|e| AppError::internal(format!("Failed to store file: {e}")))?;
    } else {
        tracing::debug!(filename = %stored_name, "Duplicate upload, reusing stored file");
    }

    tracing::info!(
        user = %current_user.username,
        filename = %stored_name,
        size = jpeg.len(),
        "Photo uploaded"
    );

    Ok(Json(UploadResponse {
        url: format!("/api/media/{stored_name}"),
        filename: stored_name,
        size: jpeg.len(),
    }))
}
