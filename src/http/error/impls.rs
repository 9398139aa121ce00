use actix_web::{body::BoxBody, http::StatusCode, HttpResponse};
use error_stack::Report;

use super::Error;
use crate::{database, storage, types::Error as ErrorType};

impl actix_web::ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        match self.error_type {
            ErrorType::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            ErrorType::NotFound(..) => StatusCode::NOT_FOUND,
            ErrorType::InvalidRequest(..) => StatusCode::BAD_REQUEST,
            ErrorType::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorType::LikeAlreadyExists | ErrorType::FollowAlreadyExists => StatusCode::CONFLICT,
            ErrorType::PayloadTooLarge(..) => StatusCode::PAYLOAD_TOO_LARGE,
        }
    }

    fn error_response(&self) -> HttpResponse<BoxBody> {
        HttpResponse::build(self.status_code()).json(&self.error_type)
    }
}

impl From<Report<database::Error>> for Error {
    fn from(value: Report<database::Error>) -> Self {
        Error::from_report(ErrorType::Internal, value)
    }
}

impl From<Report<storage::StoreError>> for Error {
    fn from(value: Report<storage::StoreError>) -> Self {
        Error::from_report(ErrorType::Internal, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::ResponseError;
    use thiserror::Error as ThisError;

    #[derive(Debug, ThisError)]
    #[error("test context")]
    struct TestContext;

    fn error_with(error_type: ErrorType) -> Error {
        Error::from_context(error_type, TestContext)
    }

    #[test]
    fn status_codes_follow_taxonomy() {
        assert_eq!(
            error_with(ErrorType::Unauthorized).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            error_with(ErrorType::InvalidRequest("bad".into())).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            error_with(ErrorType::NotFound("missing".into())).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            error_with(ErrorType::LikeAlreadyExists).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            error_with(ErrorType::FollowAlreadyExists).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            error_with(ErrorType::PayloadTooLarge("too big".into())).status_code(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
        assert_eq!(
            error_with(ErrorType::Internal).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
