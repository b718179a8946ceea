//! Admin image upload to Cloudinary.
//!
//! Mounted at `/api/upload/upload-image` and `/api/admin/products/upload-image`.

use axum::{
    Json,
    extract::{Multipart, State, multipart::MultipartRejection},
};
use serde::Serialize;
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::state::AppState;

/// Multipart field carrying the image.
pub const FILE_FIELD: &str = "my_file";

/// Request body limit for upload routes.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub success: bool,
    /// HTTPS URL of the stored image.
    pub result: String,
}

/// Accept only `image/*` content types.
fn ensure_image(content_type: Option<&str>) -> Result<&str> {
    match content_type {
        Some(ct) if ct.starts_with("image/") => Ok(ct),
        _ => Err(AppError::BadRequest(
            "Only image files can be uploaded".to_owned(),
        )),
    }
}

/// `POST /api/upload/upload-image`
#[instrument(skip_all, fields(admin_id = %admin.id))]
pub async fn upload_image(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>> {
    let mut multipart = multipart?;

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let content_type = ensure_image(field.content_type())?.to_owned();
        let file_name = field.file_name().unwrap_or("upload").to_owned();
        let bytes = field.bytes().await?;
        if bytes.is_empty() {
            break;
        }

        let image = state
            .cloudinary()
            .upload_image(bytes.to_vec(), file_name, &content_type)
            .await?;

        tracing::info!(public_id = %image.public_id, "Image uploaded");
        return Ok(Json(UploadResponse {
            success: true,
            result: image.secure_url,
        }));
    }

    Err(AppError::BadRequest("No file uploaded".to_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_image_accepts_images() {
        assert!(ensure_image(Some("image/png")).is_ok());
        assert!(ensure_image(Some("image/webp")).is_ok());
    }

    #[test]
    fn test_ensure_image_rejects_other_types() {
        assert!(ensure_image(Some("application/pdf")).is_err());
        assert!(ensure_image(None).is_err());
    }
}
