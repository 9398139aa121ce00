use sqlx::FromRow;

use crate::{
    database::{Connection, ErrorExt, Result},
    types::id::{
        marker::{LikeMarker, TweetMarker, UserMarker},
        Id,
    },
};

#[derive(Debug, FromRow, PartialEq, Eq)]
pub struct Like {
    pub id: Id<LikeMarker>,
    pub user_id: Id<UserMarker>,
    pub tweet_id: Id<TweetMarker>,
}

impl Like {
    /// Inserts a like, relying on the unique (user_id, tweet_id)
    /// constraint so concurrent duplicates resolve inside the store.
    /// Returns `None` when the pair already exists.
    #[tracing::instrument(skip(conn))]
    pub async fn insert(
        conn: &mut Connection,
        user_id: Id<UserMarker>,
        tweet_id: Id<TweetMarker>,
    ) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>(
            r#"INSERT INTO "likes" (user_id, tweet_id) VALUES ($1, $2)
               ON CONFLICT (user_id, tweet_id) DO NOTHING
               RETURNING *"#,
        )
        .bind(user_id)
        .bind(tweet_id)
        .fetch_optional(conn)
        .await
        .into_db_error()
    }

    /// Removes a like and reports whether it existed; deleting a
    /// missing like is an error at the handler level, not a no-op.
    #[tracing::instrument(skip(conn))]
    pub async fn delete(
        conn: &mut Connection,
        user_id: Id<UserMarker>,
        tweet_id: Id<TweetMarker>,
    ) -> Result<bool> {
        let deleted: Option<i64> = sqlx::query_scalar(
            r#"DELETE FROM "likes" WHERE user_id = $1 AND tweet_id = $2 RETURNING id"#,
        )
        .bind(user_id)
        .bind(tweet_id)
        .fetch_optional(conn)
        .await
        .into_db_error()?;

        Ok(deleted.is_some())
    }
}
