use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::{
    http::{Actor, Error},
    schema::feed,
    App,
};

#[tracing::instrument]
pub async fn feed(
    app: web::Data<App>,
    actor: Actor,
) -> Result<HttpResponse, Error> {
    let user = actor.get_user()?;

    let mut conn = app.db_read().await?;
    let tweets = feed::for_viewer(&mut conn, user.id).await?;

    Ok(HttpResponse::Ok().json(json!({
        "result": true,
        "tweets": tweets,
    })))
}
