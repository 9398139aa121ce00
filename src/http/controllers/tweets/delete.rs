use actix_web::{web, HttpResponse};
use serde_json::json;
use thiserror::Error;

use crate::{
    http::{Actor, Error},
    schema::{Media, Tweet},
    types::id::{marker::TweetMarker, Id},
    App,
};

#[tracing::instrument]
pub async fn delete(
    app: web::Data<App>,
    path: web::Path<Id<TweetMarker>>,
    actor: Actor,
) -> Result<HttpResponse, Error> {
    let user = actor.get_user()?;
    let tweet_id = path.into_inner();

    let mut conn = app.db_write().await?;

    let tweet = Tweet::by_id(&mut conn, tweet_id).await?;
    let owned = tweet.map(|t| t.user_id == user.id).unwrap_or(false);
    if !owned {
        #[derive(Debug, Error)]
        #[error("Tweet is absent or owned by somebody else")]
        struct NotOwned;

        return Err(Error::from_context(
            crate::types::Error::NotFound(
                "Tweet not found or belongs to another user".to_string(),
            ),
            NotOwned,
        ));
    }

    // Backing files go first, best-effort; a file that refuses to die
    // never blocks the row deletion.
    let locators = Media::locators_by_tweet(&mut conn, tweet_id).await?;
    app.media_store.remove_all(&locators).await;

    Tweet::delete(&mut conn, tweet_id).await?;

    Ok(HttpResponse::Ok().json(json!({ "result": true })))
}
