use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};
use futures::StreamExt;
use mime::Mime;
use serde_json::json;
use thiserror::Error;

use crate::{
    http::{Actor, Error},
    schema::Media,
    types::Error as ErrorType,
    App,
};

/// Multipart field holding the uploaded file.
const FILE_FIELD: &str = "file";

#[tracing::instrument(skip(payload))]
pub async fn upload(
    app: web::Data<App>,
    actor: Actor,
    mut payload: Multipart,
) -> Result<HttpResponse, Error> {
    let user = actor.get_user()?;
    let uploads = &app.config.uploads;

    let mut file: Option<(Mime, Vec<u8>)> = None;
    while let Some(field) = payload.next().await {
        #[derive(Debug, Error)]
        #[error("Malformed multipart payload")]
        struct BadPayload;

        let mut field = field.map_err(|e| {
            Error::from_context(
                ErrorType::InvalidRequest(format!("Invalid multipart payload: {e}")),
                BadPayload,
            )
        })?;

        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let Some(mime) = field.content_type().cloned() else {
            return Err(Error::from_context(
                ErrorType::InvalidRequest("Uploaded file has no content type".to_string()),
                BadPayload,
            ));
        };

        if !uploads.is_allowed_type(&mime) {
            #[derive(Debug, Error)]
            #[error("Upload content type is not in the allow list")]
            struct DisallowedType;

            return Err(Error::from_context(
                ErrorType::InvalidRequest(format!(
                    "File type is not allowed. Accepted types: {}",
                    uploads.allowed_types.join(", ")
                )),
                DisallowedType,
            ));
        }

        // Reject oversized uploads mid-stream; nothing touches the
        // disk or the database until the whole file fits the limit.
        let max_size = uploads.max_file_size.get() as usize;
        let mut data = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk = chunk.map_err(|e| {
                Error::from_context(
                    ErrorType::InvalidRequest(format!("Invalid multipart payload: {e}")),
                    BadPayload,
                )
            })?;

            if data.len() + chunk.len() > max_size {
                #[derive(Debug, Error)]
                #[error("Upload exceeds the configured size limit")]
                struct TooLarge;

                return Err(Error::from_context(
                    ErrorType::PayloadTooLarge(format!(
                        "File too large. Max size: {max_size} bytes"
                    )),
                    TooLarge,
                ));
            }

            data.extend_from_slice(&chunk);
        }

        file = Some((mime, data));
    }

    let Some((mime, data)) = file else {
        #[derive(Debug, Error)]
        #[error("Multipart payload carried no file field")]
        struct MissingFile;

        return Err(Error::from_context(
            ErrorType::InvalidRequest(format!("Missing `{FILE_FIELD}` field")),
            MissingFile,
        ));
    };

    let locator = app.media_store.store(&mime, &data).await?;

    let mut conn = app.db_write().await?;
    let media = Media::insert(&mut conn, user.id, &locator).await?;

    Ok(HttpResponse::Ok().json(json!({
        "result": true,
        "media_id": media.id,
    })))
}
