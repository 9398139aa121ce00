//! Endpoint-level tests against a live Postgres database.
//!
//! `#[sqlx::test]` provisions one throwaway database per test from
//! `DATABASE_URL` and applies the migrations before the test body
//! runs. Handlers are driven directly where possible; the multipart
//! endpoint goes through a full actix service.

use actix_web::http::StatusCode;
use actix_web::{body, test, web, HttpResponse, ResponseError};
use serde_json::json;
use sqlx::PgPool;
use std::path::{Path, PathBuf};

use chirp::http::controllers::tweets;
use chirp::http::Actor;
use chirp::schema::{Follow, Media, Tweet, User};
use chirp::types::form::tweets::CreateRequest;
use chirp::types::id::{
    marker::{MediaMarker, TweetMarker},
    Id,
};
use chirp::App;

const SCRATCH_CHARSET: &str = "abcdefghijklmnopqrstuvwxyz0123456789";

async fn build_test_app(pool: PgPool) -> (web::Data<App>, PathBuf) {
    let dir = std::env::temp_dir().join(format!(
        "chirp-api-test-{}",
        random_string::generate(12, SCRATCH_CHARSET)
    ));

    let app = App::new_for_tests(pool, &dir);
    app.media_store.init().await.unwrap();

    (web::Data::new(app), dir)
}

async fn create_user(app: &web::Data<App>, name: &str) -> User {
    let mut conn = app.db_write().await.unwrap();
    sqlx::query_as::<_, User>(
        r#"INSERT INTO "users" (name, api_key) VALUES ($1, $2) RETURNING *"#,
    )
    .bind(name)
    .bind(format!("{name}-api-key"))
    .fetch_one(&mut *conn)
    .await
    .unwrap()
}

async fn publish(
    app: &web::Data<App>,
    author: User,
    content: &str,
    media: Option<Vec<Id<MediaMarker>>>,
) -> Id<TweetMarker> {
    let form = web::Json(CreateRequest {
        tweet_data: content.to_string(),
        tweet_media_ids: media,
    });

    let resp = tweets::create(app.clone(), Actor::User(author), form)
        .await
        .unwrap();
    let body = body_json(resp).await;
    Id::new(body["tweet_id"].as_u64().unwrap())
}

async fn body_json(resp: HttpResponse) -> serde_json::Value {
    let bytes = body::to_bytes(resp.into_body()).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[sqlx::test]
async fn duplicate_like_conflicts_without_inflating_the_store(pool: PgPool) {
    let (app, _dir) = build_test_app(pool).await;
    let alice = create_user(&app, "alice").await;
    let bob = create_user(&app, "bob").await;
    let tweet_id = publish(&app, bob, "hello there", None).await;

    let resp = tweets::like(app.clone(), web::Path::from(tweet_id), Actor::User(alice.clone()))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let err = tweets::like(app.clone(), web::Path::from(tweet_id), Actor::User(alice))
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), StatusCode::CONFLICT);

    let envelope = body_json(err.error_response()).await;
    assert_eq!(envelope["result"], json!(false));
    assert_eq!(envelope["error_type"], json!("like_already_exists"));

    let mut conn = app.db_write().await.unwrap();
    let likes: i64 = sqlx::query_scalar(r#"SELECT COUNT(*) FROM "likes" WHERE tweet_id = $1"#)
        .bind(tweet_id)
        .fetch_one(&mut *conn)
        .await
        .unwrap();
    assert_eq!(likes, 1);
}

#[sqlx::test]
async fn deleting_a_tweet_cascades_rows_and_backing_files(pool: PgPool) {
    let (app, dir) = build_test_app(pool).await;
    let alice = create_user(&app, "alice").await;
    let bob = create_user(&app, "bob").await;

    let locator = app
        .media_store
        .store(&mime::IMAGE_PNG, b"not really a png")
        .await
        .unwrap();
    let file = dir.join(Path::new(&locator).file_name().unwrap());
    assert!(file.exists());

    let media_id = {
        let mut conn = app.db_write().await.unwrap();
        Media::insert(&mut conn, alice.id, &locator).await.unwrap().id
    };

    let tweet_id = publish(&app, alice.clone(), "with media", Some(vec![media_id])).await;
    tweets::like(app.clone(), web::Path::from(tweet_id), Actor::User(bob))
        .await
        .unwrap();

    let resp = tweets::delete(app.clone(), web::Path::from(tweet_id), Actor::User(alice))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(!file.exists());

    let mut conn = app.db_write().await.unwrap();
    for table in ["tweets", "likes", "tweet_media"] {
        let left: i64 = sqlx::query_scalar(&format!(r#"SELECT COUNT(*) FROM "{table}""#))
            .fetch_one(&mut *conn)
            .await
            .unwrap();
        assert_eq!(left, 0, "{table} rows survived the delete");
    }
}

#[sqlx::test]
async fn feed_spans_own_and_followed_authors_only(pool: PgPool) {
    let (app, _dir) = build_test_app(pool).await;
    let alice = create_user(&app, "alice").await;
    let bob = create_user(&app, "bob").await;
    let carol = create_user(&app, "carol").await;

    {
        let mut conn = app.db_write().await.unwrap();
        Follow::insert(&mut conn, alice.id, bob.id).await.unwrap();
    }

    let own = publish(&app, alice.clone(), "mine", None).await;
    let followed = publish(&app, bob, "from bob", None).await;
    let stranger = publish(&app, carol, "from carol", None).await;

    let resp = tweets::feed(app.clone(), Actor::User(alice)).await.unwrap();
    let body = body_json(resp).await;

    let ids = body["tweets"]
        .as_array()
        .unwrap()
        .iter()
        .map(|tweet| tweet["id"].as_u64().unwrap())
        .collect::<Vec<_>>();

    assert!(ids.contains(&own.get()));
    assert!(ids.contains(&followed.get()));
    assert!(!ids.contains(&stranger.get()));
}

#[sqlx::test]
async fn attach_only_claims_unattached_media(pool: PgPool) {
    let (app, _dir) = build_test_app(pool).await;
    let alice = create_user(&app, "alice").await;

    let locator = app
        .media_store
        .store(&mime::IMAGE_PNG, b"png bytes")
        .await
        .unwrap();

    let mut conn = app.db_write().await.unwrap();
    let media = Media::insert(&mut conn, alice.id, &locator).await.unwrap();

    let first = Tweet::insert(&mut conn, alice.id, "claims the media").await.unwrap();
    let claimed = Media::attach_many(&mut conn, &[media.id], first.id)
        .await
        .unwrap();
    assert_eq!(claimed, 1);

    // A row that already points at a tweet cannot be claimed again.
    let second = Tweet::insert(&mut conn, alice.id, "too late").await.unwrap();
    let claimed = Media::attach_many(&mut conn, &[media.id], second.id)
        .await
        .unwrap();
    assert_eq!(claimed, 0);
}

#[sqlx::test]
async fn oversized_upload_writes_neither_row_nor_file(pool: PgPool) {
    let (app, dir) = build_test_app(pool).await;
    let alice = create_user(&app, "alice").await;

    let srv = test::init_service(
        actix_web::App::new()
            .app_data(app.clone())
            .configure(chirp::http::controllers::configure),
    )
    .await;

    let max_size = app.config.uploads.max_file_size.get() as usize;
    let payload = vec![0u8; max_size + 1];

    let boundary = "chirp-test-boundary";
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"file\"; \
             filename=\"big.png\"\r\nContent-Type: image/png\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(&payload);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    let req = test::TestRequest::post()
        .uri("/medias")
        .insert_header(("api-key", alice.api_key.as_str()))
        .insert_header((
            "content-type",
            format!("multipart/form-data; boundary={boundary}"),
        ))
        .set_payload(body)
        .to_request();

    let resp = test::call_service(&srv, req).await;
    assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);

    let envelope: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(envelope["result"], json!(false));
    assert_eq!(envelope["error_type"], json!("validation_error"));

    let mut conn = app.db_write().await.unwrap();
    let rows: i64 = sqlx::query_scalar(r#"SELECT COUNT(*) FROM "tweet_media""#)
        .fetch_one(&mut *conn)
        .await
        .unwrap();
    assert_eq!(rows, 0);
    assert_eq!(std::fs::read_dir(&dir).unwrap().count(), 0);
}
