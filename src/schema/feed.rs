//! Builds the ranked tweet feed for one viewer.
//!
//! A tweet is eligible when its author is the viewer or somebody the
//! viewer follows. Eligible tweets are ranked by how many *followed*
//! users liked them (distinct likers, never join rows), with the tweet
//! id descending as the deterministic tie-break. Hydration happens in
//! three flat queries so fan-out joins can never duplicate attachments
//! or likers in the response.

use serde::Serialize;
use sqlx::FromRow;
use std::collections::HashMap;

use crate::database::{Connection, ErrorExt, Result};
use crate::schema::user::UserView;
use crate::types::id::{
    marker::{TweetMarker, UserMarker},
    Id,
};

/// One eligible tweet with its ranking aggregate, straight from the
/// grouped query.
#[derive(Debug, FromRow, PartialEq, Eq)]
pub struct FeedRow {
    pub id: Id<TweetMarker>,
    pub content: String,
    pub author_id: Id<UserMarker>,
    pub author_name: String,
    /// Distinct likes placed by users the viewer follows.
    pub follow_likes: i64,
}

#[derive(Debug, FromRow, PartialEq, Eq)]
pub struct AttachmentRow {
    pub tweet_id: Id<TweetMarker>,
    pub url: String,
}

#[derive(Debug, FromRow, PartialEq, Eq)]
pub struct LikerRow {
    pub tweet_id: Id<TweetMarker>,
    pub user_id: Id<UserMarker>,
    pub name: String,
}

/// Tweet view object serialized into the `GET /tweets` response.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct FeedTweet {
    pub id: Id<TweetMarker>,
    pub content: String,
    pub attachments: Vec<String>,
    pub author: UserView,
    pub likes: Vec<Liker>,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct Liker {
    pub user_id: Id<UserMarker>,
    pub name: String,
}

/// Loads the full eligible set for `viewer`, ranked and hydrated.
#[tracing::instrument(skip(conn))]
pub async fn for_viewer(
    conn: &mut Connection,
    viewer: Id<UserMarker>,
) -> Result<Vec<FeedTweet>> {
    let mut rows = eligible_rows(conn, viewer).await?;
    rank(&mut rows);

    let ids = rows.iter().map(|row| row.id.as_i64()).collect::<Vec<_>>();
    let attachments = attachment_rows(conn, &ids).await?;
    let likers = liker_rows(conn, &ids).await?;

    Ok(assemble(rows, attachments, likers))
}

/// The eligibility and ranking query. `COUNT(DISTINCT ..)` keeps the
/// aggregate at "number of qualifying liking users" even when the left
/// join fans out.
async fn eligible_rows(conn: &mut Connection, viewer: Id<UserMarker>) -> Result<Vec<FeedRow>> {
    sqlx::query_as::<_, FeedRow>(
        r#"SELECT t.id, t.content, t.user_id AS author_id, u.name AS author_name,
                  COUNT(DISTINCT fl.user_id) AS follow_likes
           FROM "tweets" t
           JOIN "users" u ON u.id = t.user_id
           LEFT JOIN "likes" fl
             ON fl.tweet_id = t.id
            AND fl.user_id IN (SELECT following_id FROM "follows" WHERE follower_id = $1)
           WHERE t.user_id = $1
              OR t.user_id IN (SELECT following_id FROM "follows" WHERE follower_id = $1)
           GROUP BY t.id, u.name"#,
    )
    .bind(viewer)
    .fetch_all(conn)
    .await
    .into_db_error()
}

async fn attachment_rows(conn: &mut Connection, tweet_ids: &[i64]) -> Result<Vec<AttachmentRow>> {
    sqlx::query_as::<_, AttachmentRow>(
        r#"SELECT tweet_id, url FROM "tweet_media"
           WHERE tweet_id = ANY($1)
           ORDER BY id"#,
    )
    .bind(tweet_ids)
    .fetch_all(conn)
    .await
    .into_db_error()
}

async fn liker_rows(conn: &mut Connection, tweet_ids: &[i64]) -> Result<Vec<LikerRow>> {
    sqlx::query_as::<_, LikerRow>(
        r#"SELECT l.tweet_id, u.id AS user_id, u.name FROM "likes" l
           JOIN "users" u ON u.id = l.user_id
           WHERE l.tweet_id = ANY($1)
           ORDER BY l.id"#,
    )
    .bind(tweet_ids)
    .fetch_all(conn)
    .await
    .into_db_error()
}

/// Total order over eligible tweets: qualifying-liker count descending,
/// then tweet id descending. Applied in process so the ordering never
/// depends on storage-incidental row order.
pub fn rank(rows: &mut [FeedRow]) {
    rows.sort_by(|a, b| {
        b.follow_likes
            .cmp(&a.follow_likes)
            .then_with(|| b.id.cmp(&a.id))
    });
}

/// Joins the three flat row sets into view objects, preserving the
/// ranked tweet order.
pub fn assemble(
    rows: Vec<FeedRow>,
    attachments: Vec<AttachmentRow>,
    likers: Vec<LikerRow>,
) -> Vec<FeedTweet> {
    let mut attachments_by_tweet: HashMap<_, Vec<String>> = HashMap::new();
    for attachment in attachments {
        attachments_by_tweet
            .entry(attachment.tweet_id)
            .or_default()
            .push(attachment.url);
    }

    let mut likers_by_tweet: HashMap<_, Vec<Liker>> = HashMap::new();
    for liker in likers {
        likers_by_tweet.entry(liker.tweet_id).or_default().push(Liker {
            user_id: liker.user_id,
            name: liker.name,
        });
    }

    rows.into_iter()
        .map(|row| FeedTweet {
            id: row.id,
            content: row.content,
            attachments: attachments_by_tweet.remove(&row.id).unwrap_or_default(),
            author: UserView {
                id: row.author_id,
                name: row.author_name,
            },
            likes: likers_by_tweet.remove(&row.id).unwrap_or_default(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: u64, author: u64, follow_likes: i64) -> FeedRow {
        FeedRow {
            id: Id::new(id),
            content: format!("tweet #{id}"),
            author_id: Id::new(author),
            author_name: format!("user #{author}"),
            follow_likes,
        }
    }

    #[test]
    fn ranks_by_qualifying_likes_descending() {
        let mut rows = vec![row(1, 10, 0), row(2, 11, 3), row(3, 12, 1)];
        rank(&mut rows);

        let ids = rows.iter().map(|r| r.id.get()).collect::<Vec<_>>();
        assert_eq!(ids, vec![2, 3, 1]);
    }

    #[test]
    fn ties_break_by_id_descending() {
        let mut rows = vec![row(5, 10, 2), row(9, 11, 2), row(7, 12, 2)];
        rank(&mut rows);

        let ids = rows.iter().map(|r| r.id.get()).collect::<Vec<_>>();
        assert_eq!(ids, vec![9, 7, 5]);
    }

    #[test]
    fn zero_follow_feed_ranks_own_tweets_by_id() {
        // Viewer follows nobody: every count is zero, own tweets only.
        let mut rows = vec![row(1, 1, 0), row(4, 1, 0), row(2, 1, 0)];
        rank(&mut rows);

        let ids = rows.iter().map(|r| r.id.get()).collect::<Vec<_>>();
        assert_eq!(ids, vec![4, 2, 1]);
    }

    #[test]
    fn liked_tweet_outranks_unliked_regardless_of_id() {
        // B (followed by the viewer) liked tweet X authored by D; X must
        // come before any eligible tweet without likes from followed
        // users, even ones with a higher id.
        let mut rows = vec![row(8, 20, 0), row(3, 21, 1), row(6, 22, 0)];
        rank(&mut rows);

        assert_eq!(rows[0].id.get(), 3);
    }

    #[test]
    fn assemble_groups_without_duplicating_rows() {
        let mut rows = vec![row(1, 10, 2), row(2, 11, 0)];
        rank(&mut rows);

        let attachments = vec![
            AttachmentRow {
                tweet_id: Id::new(1),
                url: "uploads/a.png".into(),
            },
            AttachmentRow {
                tweet_id: Id::new(1),
                url: "uploads/b.jpg".into(),
            },
        ];
        let likers = vec![
            LikerRow {
                tweet_id: Id::new(1),
                user_id: Id::new(30),
                name: "liker one".into(),
            },
            LikerRow {
                tweet_id: Id::new(1),
                user_id: Id::new(31),
                name: "liker two".into(),
            },
            LikerRow {
                tweet_id: Id::new(1),
                user_id: Id::new(32),
                name: "liker three".into(),
            },
        ];

        let feed = assemble(rows, attachments, likers);
        assert_eq!(feed.len(), 2);

        // one entry per tweet, attachments and likers grouped under it
        assert_eq!(feed[0].id.get(), 1);
        assert_eq!(feed[0].attachments, vec!["uploads/a.png", "uploads/b.jpg"]);
        assert_eq!(feed[0].likes.len(), 3);

        assert_eq!(feed[1].id.get(), 2);
        assert!(feed[1].attachments.is_empty());
        assert!(feed[1].likes.is_empty());
    }

    #[test]
    fn assemble_preserves_ranked_order() {
        let mut rows = vec![row(1, 10, 1), row(2, 11, 5), row(3, 12, 5)];
        rank(&mut rows);

        let feed = assemble(rows, Vec::new(), Vec::new());
        let ids = feed.iter().map(|t| t.id.get()).collect::<Vec<_>>();
        assert_eq!(ids, vec![3, 2, 1]);
    }

    #[test]
    fn feed_tweet_wire_shape() {
        let feed = assemble(
            vec![row(7, 3, 0)],
            vec![AttachmentRow {
                tweet_id: Id::new(7),
                url: "uploads/pic.png".into(),
            }],
            vec![LikerRow {
                tweet_id: Id::new(7),
                user_id: Id::new(4),
                name: "carol".into(),
            }],
        );

        assert_eq!(
            serde_json::to_value(&feed).unwrap(),
            serde_json::json!([{
                "id": 7,
                "content": "tweet #7",
                "attachments": ["uploads/pic.png"],
                "author": {"id": 3, "name": "user #3"},
                "likes": [{"user_id": 4, "name": "carol"}],
            }])
        );
    }
}
