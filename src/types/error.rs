use serde::ser::SerializeStruct;
use serde::Serialize;

/// Public error taxonomy exposed through the HTTP surface.
///
/// Every non-2xx response renders one of these values as the flat
/// envelope `{"result": false, "error_type": ..., "error_message": ...}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Missing or unknown `api-key` credential.
    Unauthorized,
    /// Malformed or rejected request input.
    InvalidRequest(String),
    /// The referenced entity is absent or not owned by the caller.
    NotFound(String),
    /// A like for the same (user, tweet) pair already exists.
    LikeAlreadyExists,
    /// A follow edge for the same (follower, following) pair already exists.
    FollowAlreadyExists,
    /// The uploaded payload exceeds the configured size limit.
    PayloadTooLarge(String),
    /// Any fault the handler did not anticipate.
    Internal,
}

impl Error {
    #[must_use]
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::Unauthorized => "authentication_error",
            Self::InvalidRequest(..) | Self::PayloadTooLarge(..) => "validation_error",
            Self::NotFound(..) => "not_found",
            Self::LikeAlreadyExists => "like_already_exists",
            Self::FollowAlreadyExists => "follow_already_exists",
            Self::Internal => "server_error",
        }
    }

    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Unauthorized => "Invalid API key",
            Self::InvalidRequest(msg) | Self::NotFound(msg) | Self::PayloadTooLarge(msg) => msg,
            Self::LikeAlreadyExists => "Like already exists",
            Self::FollowAlreadyExists => "You are already following this user",
            Self::Internal => "Internal server error",
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error_type(), self.message())
    }
}

impl Serialize for Error {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut envelope = serializer.serialize_struct("Error", 3)?;
        envelope.serialize_field("result", &false)?;
        envelope.serialize_field("error_type", self.error_type())?;
        envelope.serialize_field("error_message", self.message())?;
        envelope.end()
    }
}
