use sqlx::FromRow;

use crate::{
    database::{Connection, ErrorExt, Result},
    types::id::{
        marker::{FollowMarker, UserMarker},
        Id,
    },
};

#[derive(Debug, FromRow, PartialEq, Eq)]
pub struct Follow {
    pub id: Id<FollowMarker>,
    pub follower_id: Id<UserMarker>,
    pub following_id: Id<UserMarker>,
}

impl Follow {
    /// Inserts a follow edge, relying on the unique (follower,
    /// following) constraint for concurrent duplicates. Returns `None`
    /// when the edge already exists. The store also carries a CHECK
    /// constraint as the backstop against self-follows.
    #[tracing::instrument(skip(conn))]
    pub async fn insert(
        conn: &mut Connection,
        follower_id: Id<UserMarker>,
        following_id: Id<UserMarker>,
    ) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>(
            r#"INSERT INTO "follows" (follower_id, following_id) VALUES ($1, $2)
               ON CONFLICT (follower_id, following_id) DO NOTHING
               RETURNING *"#,
        )
        .bind(follower_id)
        .bind(following_id)
        .fetch_optional(conn)
        .await
        .into_db_error()
    }

    /// Removes a follow edge and reports whether it existed.
    #[tracing::instrument(skip(conn))]
    pub async fn delete(
        conn: &mut Connection,
        follower_id: Id<UserMarker>,
        following_id: Id<UserMarker>,
    ) -> Result<bool> {
        let deleted: Option<i64> = sqlx::query_scalar(
            r#"DELETE FROM "follows"
               WHERE follower_id = $1 AND following_id = $2
               RETURNING id"#,
        )
        .bind(follower_id)
        .bind(following_id)
        .fetch_optional(conn)
        .await
        .into_db_error()?;

        Ok(deleted.is_some())
    }
}
