use chrono::NaiveDateTime;
use serde::Serialize;
use sqlx::FromRow;

use crate::{
    database::{Connection, ErrorExt, Result},
    types::id::{marker::UserMarker, Id},
};

#[derive(Debug, Clone, FromRow, PartialEq, Eq)]
pub struct User {
    pub id: Id<UserMarker>,
    pub created_at: NaiveDateTime,
    pub name: String,
    pub api_key: String,
}

/// Minimal projection of a user used inside profile and feed
/// responses.
#[derive(Debug, FromRow, Serialize, PartialEq, Eq)]
pub struct UserView {
    pub id: Id<UserMarker>,
    pub name: String,
}

impl User {
    #[tracing::instrument(skip(conn))]
    pub async fn by_id(conn: &mut Connection, id: Id<UserMarker>) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>(r#"SELECT * FROM "users" WHERE id = $1"#)
            .bind(id)
            .fetch_optional(conn)
            .await
            .into_db_error()
    }

    #[tracing::instrument(skip_all)]
    pub async fn by_api_key(conn: &mut Connection, api_key: &str) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>(r#"SELECT * FROM "users" WHERE api_key = $1"#)
            .bind(api_key)
            .fetch_optional(conn)
            .await
            .into_db_error()
    }

    /// Users following this user, ordered by their id for a stable
    /// response body.
    #[tracing::instrument(skip(conn))]
    pub async fn followers(conn: &mut Connection, id: Id<UserMarker>) -> Result<Vec<UserView>> {
        sqlx::query_as::<_, UserView>(
            r#"SELECT u.id, u.name FROM "follows" f
               JOIN "users" u ON u.id = f.follower_id
               WHERE f.following_id = $1
               ORDER BY u.id"#,
        )
        .bind(id)
        .fetch_all(conn)
        .await
        .into_db_error()
    }

    /// Users this user follows, ordered by their id.
    #[tracing::instrument(skip(conn))]
    pub async fn following(conn: &mut Connection, id: Id<UserMarker>) -> Result<Vec<UserView>> {
        sqlx::query_as::<_, UserView>(
            r#"SELECT u.id, u.name FROM "follows" f
               JOIN "users" u ON u.id = f.following_id
               WHERE f.follower_id = $1
               ORDER BY u.id"#,
        )
        .bind(id)
        .fetch_all(conn)
        .await
        .into_db_error()
    }
}
