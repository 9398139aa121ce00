use actix_web::{web, FromRequest};
use futures::future::{ready, LocalBoxFuture};
use thiserror::Error;

use crate::{schema::User, App};

use super::Error;

/// Name of the credential header, compared by exact match against
/// `users.api_key`.
pub const API_KEY_HEADER: &str = "api-key";

/// The caller behind one request, resolved once per request and shared
/// by every handler as the single authorization gate.
#[derive(Debug)]
pub enum Actor {
    Anonymous,
    User(User),
}

impl Actor {
    pub fn get_user(self) -> Result<User, Error> {
        #[derive(Debug, Error)]
        #[error("Attempt to access user-only route")]
        struct Unauthorized;
        match self {
            Self::User(n) => Ok(n),
            Self::Anonymous => Err(Error::from_context(
                crate::types::Error::Unauthorized,
                Unauthorized,
            )),
        }
    }
}

impl FromRequest for Actor {
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(
        req: &actix_web::HttpRequest,
        _payload: &mut actix_web::dev::Payload,
    ) -> Self::Future {
        let api_key = req
            .headers()
            .get(API_KEY_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string);

        if let Some(api_key) = api_key {
            let Some(app) = req.app_data::<web::Data<App>>() else {
                #[derive(Debug, Error)]
                #[error("The web app has no available configuration")]
                struct NoConfig;
                return Box::pin(ready(Err(Error::from_context(
                    crate::types::Error::Internal,
                    NoConfig,
                ))));
            };

            let app = app.clone();
            Box::pin(async move {
                let mut conn = app.db_read_prefer_primary().await?;
                if let Some(user) = User::by_api_key(&mut conn, &api_key).await? {
                    Ok(Actor::User(user))
                } else {
                    Ok(Actor::Anonymous)
                }
            })
        } else {
            Box::pin(ready(Ok(Actor::Anonymous)))
        }
    }
}
