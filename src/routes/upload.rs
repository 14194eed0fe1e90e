use crate::Config;
use crate::error::app_error::AppError;
use crate::error::json::JsonBody;
use crate::models::upload::{ALLOWED_IMAGE_EXTENSIONS, DeleteImageRequest, ImageUploadForm, MessageEnvelope, UploadEnvelope, stored_filename};
use rocket::form::Form;
use rocket::http::ContentType;
use rocket::http::uri::Host;
use rocket::serde::json::Json;
use rocket::{State, routes};
use std::path::Path;
use tokio::fs;
use validator::Validate;

#[rocket::post("/image-upload", data = "<form>")]
pub async fn image_upload(
    config: &State<Config>,
    host: Option<&Host<'_>>,
    mut form: Form<ImageUploadForm<'_>>,
) -> Result<Json<UploadEnvelope>, AppError> {
    let image = form
        .image
        .as_mut()
        .filter(|file| file.len() > 0)
        .ok_or_else(|| AppError::BadRequest("No file uploaded".to_string()))?;

    let extension = image
        .content_type()
        .and_then(image_extension)
        .ok_or_else(|| AppError::BadRequest("Only image files are allowed".to_string()))?;

    let dir = Path::new(&config.uploads.dir);
    fs::create_dir_all(dir)
        .await
        .map_err(|e| AppError::io("Failed to prepare uploads directory", e))?;

    let filename = stored_filename(extension);
    image
        .copy_to(dir.join(&filename))
        .await
        .map_err(|e| AppError::io("Failed to store uploaded image", e))?;

    let image_url = format!("{}/uploads/{}", public_base_url(config, host), filename);
    tracing::info!(filename = %filename, "image uploaded");

    Ok(Json(UploadEnvelope {
        error: false,
        message: "Image uploaded successfully".to_string(),
        image_url,
        filename,
    }))
}

#[rocket::delete("/delete-image", data = "<payload>")]
pub async fn delete_image(config: &State<Config>, payload: JsonBody<DeleteImageRequest>) -> Result<Json<MessageEnvelope>, AppError> {
    payload.validate()?;

    let filename = extract_filename(&payload.image_url).ok_or_else(|| AppError::BadRequest("Invalid image URL".to_string()))?;
    let path = Path::new(&config.uploads.dir).join(filename);

    // An absent file is a failure, not a no-op.
    fs::remove_file(&path)
        .await
        .map_err(|e| AppError::io("Failed to delete image", e))?;

    Ok(Json(MessageEnvelope {
        error: false,
        message: "Image deleted successfully".to_string(),
    }))
}

fn image_extension(content_type: &ContentType) -> Option<&'static str> {
    let extension = if *content_type == ContentType::JPEG {
        "jpg"
    } else if *content_type == ContentType::PNG {
        "png"
    } else if *content_type == ContentType::GIF {
        "gif"
    } else if *content_type == ContentType::WEBP {
        "webp"
    } else {
        return None;
    };

    debug_assert!(ALLOWED_IMAGE_EXTENSIONS.contains(&extension));
    Some(extension)
}

fn public_base_url(config: &Config, host: Option<&Host<'_>>) -> String {
    if let Some(base) = &config.uploads.base_url {
        return base.trim_end_matches('/').to_string();
    }

    match host {
        Some(host) => format!("http://{host}"),
        None => format!("http://localhost:{}", config.server.port),
    }
}

/// Reduce the URL to its final path segment and reject anything that is not
/// a bare filename, so a crafted URL can never reach outside the uploads
/// directory.
fn extract_filename(image_url: &str) -> Option<&str> {
    let name = image_url.rsplit('/').next()?;
    let name = name.split(['?', '#']).next()?;

    if name.is_empty() || name == "." || name == ".." || name.contains('\\') {
        return None;
    }

    Some(name)
}

pub fn routes() -> Vec<rocket::Route> {
    routes![image_upload, delete_image]
}

#[cfg(test)]
mod tests {
    use super::{extract_filename, image_extension};
    use crate::build_rocket;
    use crate::test_utils::test_config;
    use rocket::http::{ContentType, Status};
    use rocket::local::asynchronous::Client;
    use serde_json::{Value, json};

    #[test]
    fn extract_filename_takes_the_last_segment() {
        assert_eq!(
            extract_filename("http://localhost:8000/uploads/abc.png"),
            Some("abc.png")
        );
        assert_eq!(extract_filename("abc.png"), Some("abc.png"));
        assert_eq!(extract_filename("http://h/uploads/abc.png?size=large"), Some("abc.png"));
    }

    #[test]
    fn extract_filename_rejects_traversal_and_empty_names() {
        assert_eq!(extract_filename("http://h/uploads/"), None);
        assert_eq!(extract_filename("http://h/uploads/.."), None);
        assert_eq!(extract_filename("http://h/uploads/..%5C"), Some("..%5C"));
        assert_eq!(extract_filename("c:\\temp\\x.png"), None);
    }

    #[test]
    fn only_image_content_types_map_to_an_extension() {
        assert_eq!(image_extension(&ContentType::PNG), Some("png"));
        assert_eq!(image_extension(&ContentType::JPEG), Some("jpg"));
        assert_eq!(image_extension(&ContentType::HTML), None);
        assert_eq!(image_extension(&ContentType::Binary), None);
    }

    fn multipart_image(boundary: &str, field: &str, filename: &str, content_type: &str, bytes: &[u8]) -> Vec<u8> {
        let mut body = Vec::new();
        body.extend_from_slice(
            format!(
                "--{boundary}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());
        body
    }

    async fn upload_client(uploads_dir: &std::path::Path) -> Client {
        let mut config = test_config();
        config.uploads.dir = uploads_dir.to_str().unwrap().to_string();
        Client::tracked(build_rocket(config)).await.expect("valid rocket instance")
    }

    #[rocket::async_test]
    async fn upload_stores_the_file_and_delete_removes_it() {
        let uploads = tempfile::tempdir().unwrap();
        let client = upload_client(uploads.path()).await;

        let boundary = "X-TRIPLY-BOUNDARY";
        let body = multipart_image(boundary, "image", "photo.png", "image/png", b"not-really-a-png");
        let content_type = ContentType::parse_flexible(&format!("multipart/form-data; boundary={boundary}")).unwrap();

        let response = client.post("/image-upload").header(content_type).body(body).dispatch().await;
        assert_eq!(response.status(), Status::Ok);

        let uploaded: Value = response.into_json().await.expect("json body");
        assert_eq!(uploaded["error"], false);
        let filename = uploaded["filename"].as_str().unwrap();
        let image_url = uploaded["imageUrl"].as_str().unwrap();
        assert!(filename.ends_with(".png"));
        assert!(image_url.ends_with(&format!("/uploads/{filename}")));
        assert!(uploads.path().join(filename).exists());

        let response = client
            .delete("/delete-image")
            .header(ContentType::JSON)
            .body(json!({"imageUrl": image_url}).to_string())
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Ok);
        assert!(!uploads.path().join(filename).exists());
    }

    #[rocket::async_test]
    async fn upload_without_a_file_is_a_bad_request() {
        let uploads = tempfile::tempdir().unwrap();
        let client = upload_client(uploads.path()).await;

        let boundary = "X-TRIPLY-BOUNDARY";
        // A multipart body with an unrelated field and no image.
        let body = format!("--{boundary}\r\nContent-Disposition: form-data; name=\"note\"\r\n\r\nhello\r\n--{boundary}--\r\n");
        let content_type = ContentType::parse_flexible(&format!("multipart/form-data; boundary={boundary}")).unwrap();

        let response = client.post("/image-upload").header(content_type).body(body).dispatch().await;

        assert_eq!(response.status(), Status::BadRequest);
        let body: Value = response.into_json().await.expect("json body");
        assert_eq!(body["message"], "No file uploaded");
    }

    #[rocket::async_test]
    async fn upload_of_a_non_image_is_rejected() {
        let uploads = tempfile::tempdir().unwrap();
        let client = upload_client(uploads.path()).await;

        let boundary = "X-TRIPLY-BOUNDARY";
        let body = multipart_image(boundary, "image", "page.html", "text/html", b"<html></html>");
        let content_type = ContentType::parse_flexible(&format!("multipart/form-data; boundary={boundary}")).unwrap();

        let response = client.post("/image-upload").header(content_type).body(body).dispatch().await;

        assert_eq!(response.status(), Status::BadRequest);
        let body: Value = response.into_json().await.expect("json body");
        assert_eq!(body["message"], "Only image files are allowed");
    }

    #[rocket::async_test]
    async fn deleting_a_missing_image_is_a_server_error() {
        let uploads = tempfile::tempdir().unwrap();
        let client = upload_client(uploads.path()).await;

        let response = client
            .delete("/delete-image")
            .header(ContentType::JSON)
            .body(json!({"imageUrl": "http://localhost:8000/uploads/never-stored.png"}).to_string())
            .dispatch()
            .await;

        assert_eq!(response.status(), Status::InternalServerError);
    }

    #[rocket::async_test]
    async fn deleting_without_a_url_is_a_bad_request() {
        let uploads = tempfile::tempdir().unwrap();
        let client = upload_client(uploads.path()).await;

        let response = client
            .delete("/delete-image")
            .header(ContentType::JSON)
            .body(json!({"imageUrl": ""}).to_string())
            .dispatch()
            .await;

        assert_eq!(response.status(), Status::BadRequest);
    }
}
