use rocket::FromForm;
use rocket::fs::TempFile;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Multipart form for the image upload endpoint: a single `image` file field.
#[derive(FromForm)]
pub struct ImageUploadForm<'r> {
    pub image: Option<TempFile<'r>>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct DeleteImageRequest {
    #[validate(length(min = 1, message = "Image URL is required"))]
    pub image_url: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadEnvelope {
    pub error: bool,
    pub message: String,
    pub image_url: String,
    pub filename: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageEnvelope {
    pub error: bool,
    pub message: String,
}

/// Extensions accepted for uploaded images.
pub const ALLOWED_IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];

/// Generate the stored filename for an upload: opaque uuid plus the
/// (already validated) extension, so client-supplied names never reach disk.
pub fn stored_filename(extension: &str) -> String {
    format!("{}.{}", Uuid::new_v4(), extension)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stored_filenames_are_unique_and_keep_the_extension() {
        let a = stored_filename("png");
        let b = stored_filename("png");
        assert_ne!(a, b);
        assert!(a.ends_with(".png"));
    }
}
