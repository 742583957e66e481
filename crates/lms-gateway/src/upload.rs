//! Request body extractors.
//!
//! [`ApiJson`] is `axum::Json` with failures rendered as the failure
//! envelope. [`FormUpload`] accepts either `multipart/form-data` or a JSON
//! object and turns both into an [`Upload`].

use axum::extract::{FromRequest, Multipart, Request};
use axum::http::header::CONTENT_TYPE;
use serde_json::Value;

use lms_service::{FilePart, Upload};

use crate::error::ApiError;

/// JSON body extractor with envelope-shaped rejections.
#[derive(Debug, Clone, Copy, Default, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// Form fields plus an optional uploaded file.
#[derive(Debug, Clone, Default)]
pub struct FormUpload(pub Upload);

/// Name of the multipart part that carries the uploaded file.
pub const FILE_FIELD: &str = "file";

/// Read every part of a multipart body.
///
/// The part named [`FILE_FIELD`] becomes the file. Without one, the last
/// part carrying a filename is used instead. Parts without a filename are
/// read as text fields.
///
/// # Errors
///
/// Returns `ApiError::BadRequest` if the body is not valid multipart.
pub async fn read_multipart(mut multipart: Multipart) -> Result<Upload, ApiError> {
    let mut upload = Upload::default();
    let mut have_named_file = false;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        let Some(file_name) = field.file_name().map(str::to_string) else {
            let value = field.text().await?;
            upload.fields.insert(name, value);
            continue;
        };

        let named = name == FILE_FIELD;
        if have_named_file && !named {
            tracing::debug!(field = %name, file_name = %file_name, "Skipping extra file part");
            continue;
        }

        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await?;
        tracing::debug!(field = %name, file_name = %file_name, size = bytes.len(), "Received file part");
        upload.file = Some(FilePart {
            file_name,
            content_type,
            bytes: bytes.to_vec(),
        });
        have_named_file |= named;
    }

    Ok(upload)
}

fn is_multipart(req: &Request) -> bool {
    req.headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("multipart/form-data"))
}

impl<S> FromRequest<S> for FormUpload
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if is_multipart(&req) {
            let multipart = Multipart::from_request(req, state)
                .await
                .map_err(|e| ApiError::BadRequest(e.body_text()))?;
            return Ok(Self(read_multipart(multipart).await?));
        }

        let ApiJson(value) = ApiJson::<Value>::from_request(req, state).await?;
        Ok(Self(Upload::from_json(value)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    const BOUNDARY: &str = "upload-boundary";

    fn file_part(name: &str, file_name: &str, content: &str) -> String {
        format!(
            "--{BOUNDARY}\r\n\
             Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\n\
             Content-Type: text/plain\r\n\r\n\
             {content}\r\n"
        )
    }

    fn text_part(name: &str, value: &str) -> String {
        format!(
            "--{BOUNDARY}\r\n\
             Content-Disposition: form-data; name=\"{name}\"\r\n\r\n\
             {value}\r\n"
        )
    }

    async fn extract(parts: &[String]) -> Upload {
        let body = format!("{}--{BOUNDARY}--\r\n", parts.concat());
        let req = axum::http::Request::builder()
            .method("POST")
            .uri("/api/materials")
            .header(
                CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap();
        let FormUpload(upload) = FormUpload::from_request(req, &()).await.unwrap();
        upload
    }

    #[tokio::test]
    async fn file_part_wins_over_later_attachments() {
        let upload = extract(&[
            text_part("title", "Week 1 notes"),
            file_part("file", "notes.txt", "lecture notes"),
            file_part("thumbnail", "cover.txt", "cover"),
        ])
        .await;

        let file = upload.file.unwrap();
        assert_eq!(file.file_name, "notes.txt");
        assert_eq!(file.bytes, b"lecture notes");
        assert_eq!(upload.fields["title"], "Week 1 notes");
    }

    #[tokio::test]
    async fn file_part_wins_over_earlier_attachments() {
        let upload = extract(&[
            file_part("thumbnail", "cover.txt", "cover"),
            file_part("file", "notes.txt", "lecture notes"),
        ])
        .await;

        assert_eq!(upload.file.unwrap().file_name, "notes.txt");
    }

    #[tokio::test]
    async fn falls_back_to_last_attachment_without_a_file_part() {
        let upload = extract(&[
            file_part("attachment", "first.txt", "one"),
            file_part("document", "second.txt", "two"),
        ])
        .await;

        let file = upload.file.unwrap();
        assert_eq!(file.file_name, "second.txt");
        assert_eq!(file.content_type.as_deref(), Some("text/plain"));
    }

    #[tokio::test]
    async fn json_body_has_no_file() {
        let req = axum::http::Request::builder()
            .method("POST")
            .uri("/api/materials")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"title":"Syllabus","course":"course1"}"#))
            .unwrap();
        let FormUpload(upload) = FormUpload::from_request(req, &()).await.unwrap();

        assert!(upload.file.is_none());
        assert_eq!(upload.fields["title"], "Syllabus");
    }
}
