use actix_web::{web, HttpResponse};
use serde_json::json;
use thiserror::Error;

use crate::{
    http::{Actor, Error},
    schema::{Like, Tweet},
    types::id::{marker::TweetMarker, Id},
    App,
};

#[tracing::instrument]
pub async fn like(
    app: web::Data<App>,
    path: web::Path<Id<TweetMarker>>,
    actor: Actor,
) -> Result<HttpResponse, Error> {
    let user = actor.get_user()?;
    let tweet_id = path.into_inner();

    let mut conn = app.db_write().await?;

    if Tweet::by_id(&mut conn, tweet_id).await?.is_none() {
        #[derive(Debug, Error)]
        #[error("Cannot like a missing tweet")]
        struct MissingTweet;

        return Err(Error::from_context(
            crate::types::Error::NotFound("Tweet not found".to_string()),
            MissingTweet,
        ));
    }

    // The unique (user_id, tweet_id) constraint decides the race
    // between two concurrent likes; exactly one insert comes back.
    if Like::insert(&mut conn, user.id, tweet_id).await?.is_none() {
        #[derive(Debug, Error)]
        #[error("Duplicate like for the same tweet")]
        struct DuplicateLike;

        return Err(Error::from_context(
            crate::types::Error::LikeAlreadyExists,
            DuplicateLike,
        ));
    }

    Ok(HttpResponse::Ok().json(json!({ "result": true })))
}

#[tracing::instrument]
pub async fn unlike(
    app: web::Data<App>,
    path: web::Path<Id<TweetMarker>>,
    actor: Actor,
) -> Result<HttpResponse, Error> {
    let user = actor.get_user()?;
    let tweet_id = path.into_inner();

    let mut conn = app.db_write().await?;

    // Deleting an absent like is an error, not a no-op.
    if !Like::delete(&mut conn, user.id, tweet_id).await? {
        #[derive(Debug, Error)]
        #[error("No like to remove")]
        struct MissingLike;

        return Err(Error::from_context(
            crate::types::Error::NotFound("Like not found".to_string()),
            MissingLike,
        ));
    }

    Ok(HttpResponse::Ok().json(json!({ "result": true })))
}
