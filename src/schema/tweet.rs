use chrono::NaiveDateTime;
use sqlx::FromRow;

use crate::{
    database::{Connection, ErrorExt, Result},
    types::id::{
        marker::{TweetMarker, UserMarker},
        Id,
    },
};

#[derive(Debug, FromRow, PartialEq, Eq)]
pub struct Tweet {
    pub id: Id<TweetMarker>,
    pub created_at: NaiveDateTime,
    pub user_id: Id<UserMarker>,
    pub content: String,
}

impl Tweet {
    #[tracing::instrument(skip(conn))]
    pub async fn by_id(conn: &mut Connection, id: Id<TweetMarker>) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>(r#"SELECT * FROM "tweets" WHERE id = $1"#)
            .bind(id)
            .fetch_optional(conn)
            .await
            .into_db_error()
    }

    #[tracing::instrument(skip(conn, content))]
    pub async fn insert(
        conn: &mut Connection,
        user_id: Id<UserMarker>,
        content: &str,
    ) -> Result<Self> {
        sqlx::query_as::<_, Self>(
            r#"INSERT INTO "tweets" (user_id, content) VALUES ($1, $2) RETURNING *"#,
        )
        .bind(user_id)
        .bind(content)
        .fetch_one(conn)
        .await
        .into_db_error()
    }

    /// Deletes the tweet row; its likes and attached media rows go
    /// with it through `ON DELETE CASCADE`.
    #[tracing::instrument(skip(conn))]
    pub async fn delete(conn: &mut Connection, id: Id<TweetMarker>) -> Result<()> {
        sqlx::query(r#"DELETE FROM "tweets" WHERE id = $1"#)
            .bind(id)
            .execute(conn)
            .await
            .into_db_error()?;

        Ok(())
    }
}
