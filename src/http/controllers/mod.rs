use actix_web::{error, web, HttpRequest};
use thiserror::Error as ThisError;

use crate::{http::Error, types};

pub mod medias;
pub mod tweets;
pub mod users;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error_handler));
    cfg.app_data(web::PathConfig::default().error_handler(path_error_handler));

    cfg.service(
        web::scope("/tweets")
            .route("", web::post().to(tweets::create))
            .route("", web::get().to(tweets::feed))
            .route("/{id}", web::delete().to(tweets::delete))
            .route("/{id}/likes", web::post().to(tweets::like))
            .route("/{id}/likes", web::delete().to(tweets::unlike)),
    );

    cfg.route("/medias", web::post().to(medias::upload));

    cfg.service(
        web::scope("/users")
            .route("/me", web::get().to(users::me))
            .route("/{id}", web::get().to(users::profile))
            .route("/{id}/follow", web::post().to(users::follow))
            .route("/{id}/follow", web::delete().to(users::unfollow)),
    );
}

// Extractor failures have to render the same envelope as handler
// failures; actix's defaults answer with plain text.

fn json_error_handler(err: error::JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    #[derive(Debug, ThisError)]
    #[error("Request body failed to parse")]
    struct BadBody;

    Error::from_context(
        types::Error::InvalidRequest(format!("Invalid request body: {err}")),
        BadBody,
    )
    .into()
}

fn path_error_handler(err: error::PathError, _req: &HttpRequest) -> actix_web::Error {
    #[derive(Debug, ThisError)]
    #[error("Path segment failed to parse")]
    struct BadPath;

    Error::from_context(
        types::Error::InvalidRequest(format!("Invalid path parameter: {err}")),
        BadPath,
    )
    .into()
}
