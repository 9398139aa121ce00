use actix_web::{web, HttpResponse};
use serde_json::json;
use thiserror::Error;

use crate::{
    http::{Actor, Error},
    schema::{Follow, User},
    types::id::{marker::UserMarker, Id},
    App,
};

#[tracing::instrument]
pub async fn follow(
    app: web::Data<App>,
    path: web::Path<Id<UserMarker>>,
    actor: Actor,
) -> Result<HttpResponse, Error> {
    let user = actor.get_user()?;
    let target_id = path.into_inner();

    let mut conn = app.db_write().await?;

    let target = User::by_id(&mut conn, target_id).await?;
    if target.is_none() || target_id == user.id {
        #[derive(Debug, Error)]
        #[error("Follow target is absent or the caller themselves")]
        struct BadTarget;

        return Err(Error::from_context(
            crate::types::Error::NotFound(
                "User not found or you try to follow yourself".to_string(),
            ),
            BadTarget,
        ));
    }

    // The unique (follower_id, following_id) constraint decides the
    // race between two concurrent follows.
    if Follow::insert(&mut conn, user.id, target_id).await?.is_none() {
        #[derive(Debug, Error)]
        #[error("Duplicate follow edge")]
        struct DuplicateFollow;

        return Err(Error::from_context(
            crate::types::Error::FollowAlreadyExists,
            DuplicateFollow,
        ));
    }

    Ok(HttpResponse::Ok().json(json!({ "result": true })))
}

#[tracing::instrument]
pub async fn unfollow(
    app: web::Data<App>,
    path: web::Path<Id<UserMarker>>,
    actor: Actor,
) -> Result<HttpResponse, Error> {
    let user = actor.get_user()?;
    let target_id = path.into_inner();

    let mut conn = app.db_write().await?;

    if !Follow::delete(&mut conn, user.id, target_id).await? {
        #[derive(Debug, Error)]
        #[error("No follow edge to remove")]
        struct MissingFollow;

        return Err(Error::from_context(
            crate::types::Error::NotFound("Follow not found".to_string()),
            MissingFollow,
        ));
    }

    Ok(HttpResponse::Ok().json(json!({ "result": true })))
}
