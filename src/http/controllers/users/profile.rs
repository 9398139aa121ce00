use actix_web::{web, HttpResponse};
use serde_json::json;
use thiserror::Error;

use crate::{
    database::Connection,
    http::{Actor, Error},
    schema::User,
    types::id::{marker::UserMarker, Id},
    App,
};

/// Profile of the authenticated caller.
#[tracing::instrument]
pub async fn me(app: web::Data<App>, actor: Actor) -> Result<HttpResponse, Error> {
    let user = actor.get_user()?;

    let mut conn = app.db_read().await?;
    render(&mut conn, user).await
}

/// Public profile lookup by user id; the only unauthenticated route.
#[tracing::instrument]
pub async fn profile(
    app: web::Data<App>,
    path: web::Path<Id<UserMarker>>,
) -> Result<HttpResponse, Error> {
    let mut conn = app.db_read().await?;

    let Some(user) = User::by_id(&mut conn, path.into_inner()).await? else {
        #[derive(Debug, Error)]
        #[error("User not found")]
        struct MissingUser;

        return Err(Error::from_context(
            crate::types::Error::NotFound("User not found".to_string()),
            MissingUser,
        ));
    };

    render(&mut conn, user).await
}

async fn render(conn: &mut Connection, user: User) -> Result<HttpResponse, Error> {
    let followers = User::followers(conn, user.id).await?;
    let following = User::following(conn, user.id).await?;

    Ok(HttpResponse::Ok().json(json!({
        "result": true,
        "user": {
            "id": user.id,
            "name": user.name,
            "followers": followers,
            "following": following,
        },
    })))
}
