use actix_web::{
    web::{self, Json},
    HttpResponse,
};
use serde_json::json;
use thiserror::Error;

use crate::{
    database::ErrorExt,
    http::{Actor, Error},
    schema::{Media, Tweet},
    types::form::tweets::CreateRequest,
    App,
};

#[tracing::instrument(skip(form))]
pub async fn create(
    app: web::Data<App>,
    actor: Actor,
    form: Json<CreateRequest>,
) -> Result<HttpResponse, Error> {
    let user = actor.get_user()?;

    let length = form.tweet_data.chars().count();
    let max_length = app.config.content.max_length.get() as usize;
    if length == 0 || length > max_length {
        #[derive(Debug, Error)]
        #[error("Tweet content length is out of bounds")]
        struct InvalidContent;

        return Err(Error::from_context(
            crate::types::Error::InvalidRequest(format!(
                "Tweet content must be between 1 and {max_length} characters"
            )),
            InvalidContent,
        ));
    }

    let media_ids = form.tweet_media_ids.as_deref().unwrap_or_default();

    #[derive(Debug, Error)]
    #[error("Tweet refers to unknown or unavailable media")]
    struct UnknownMedia;

    let mut tx = app.primary_db.begin().await?;

    // Attaching is all-or-nothing: every referenced media row must
    // exist, belong to the author and still be unattached.
    if !media_ids.is_empty() {
        let attachable = Media::count_attachable(&mut tx, media_ids, user.id).await?;
        if attachable != media_ids.len() as u64 {
            return Err(Error::from_context(
                crate::types::Error::NotFound("Some media files not found".to_string()),
                UnknownMedia,
            ));
        }
    }

    let tweet = Tweet::insert(&mut tx, user.id, &form.tweet_data).await?;
    if !media_ids.is_empty() {
        // The update revalidates `tweet_id IS NULL`, so an attach that
        // raced past the check above surfaces as a short count here
        // and rolls the whole tweet back.
        let attached = Media::attach_many(&mut tx, media_ids, tweet.id).await?;
        if attached != media_ids.len() {
            return Err(Error::from_context(
                crate::types::Error::NotFound("Some media files not found".to_string()),
                UnknownMedia,
            ));
        }
    }

    tx.commit().await.into_db_error()?;

    Ok(HttpResponse::Ok().json(json!({
        "result": true,
        "tweet_id": tweet.id,
    })))
}
