use sqlx::FromRow;

use crate::{
    database::{Connection, ErrorExt, Result},
    types::id::{
        marker::{MediaMarker, TweetMarker, UserMarker},
        Id,
    },
};

#[derive(Debug, FromRow, PartialEq, Eq)]
pub struct Media {
    pub id: Id<MediaMarker>,
    pub user_id: Id<UserMarker>,
    pub url: String,
    /// `None` while the upload has not been attached to a tweet yet.
    pub tweet_id: Option<Id<TweetMarker>>,
}

impl Media {
    #[tracing::instrument(skip(conn, url))]
    pub async fn insert(
        conn: &mut Connection,
        user_id: Id<UserMarker>,
        url: &str,
    ) -> Result<Self> {
        sqlx::query_as::<_, Self>(
            r#"INSERT INTO "tweet_media" (user_id, url) VALUES ($1, $2) RETURNING *"#,
        )
        .bind(user_id)
        .bind(url)
        .fetch_one(conn)
        .await
        .into_db_error()
    }

    /// Counts how many of the given media ids exist, belong to
    /// `user_id` and have not been attached to any tweet. Attaching is
    /// only valid when this matches the amount of requested ids.
    #[tracing::instrument(skip(conn, ids), fields(ids = ids.len()))]
    pub async fn count_attachable(
        conn: &mut Connection,
        ids: &[Id<MediaMarker>],
        user_id: Id<UserMarker>,
    ) -> Result<u64> {
        let ids = ids.iter().map(|id| id.as_i64()).collect::<Vec<_>>();
        let count: i64 = sqlx::query_scalar(
            r#"SELECT COUNT(id) FROM "tweet_media"
               WHERE id = ANY($1) AND user_id = $2 AND tweet_id IS NULL"#,
        )
        .bind(&ids)
        .bind(user_id)
        .fetch_one(conn)
        .await
        .into_db_error()?;

        Ok(count.unsigned_abs())
    }

    /// One-time pointer set over the still unattached rows. Returns
    /// how many rows actually got the pointer; a concurrent attach can
    /// win a row between the attachability check and this update, so
    /// callers must compare the count against `ids.len()` and roll the
    /// transaction back on a mismatch.
    #[tracing::instrument(skip(conn, ids), fields(ids = ids.len()))]
    pub async fn attach_many(
        conn: &mut Connection,
        ids: &[Id<MediaMarker>],
        tweet_id: Id<TweetMarker>,
    ) -> Result<usize> {
        let ids = ids.iter().map(|id| id.as_i64()).collect::<Vec<_>>();
        let attached: Vec<i64> = sqlx::query_scalar(
            r#"UPDATE "tweet_media" SET tweet_id = $2
               WHERE id = ANY($1) AND tweet_id IS NULL
               RETURNING id"#,
        )
        .bind(&ids)
        .bind(tweet_id)
        .fetch_all(conn)
        .await
        .into_db_error()?;

        Ok(attached.len())
    }

    /// Storage locators of every attachment of one tweet.
    #[tracing::instrument(skip(conn))]
    pub async fn locators_by_tweet(
        conn: &mut Connection,
        tweet_id: Id<TweetMarker>,
    ) -> Result<Vec<String>> {
        sqlx::query_scalar(r#"SELECT url FROM "tweet_media" WHERE tweet_id = $1 ORDER BY id"#)
            .bind(tweet_id)
            .fetch_all(conn)
            .await
            .into_db_error()
    }
}
