use serde::Deserialize;

use crate::types::id::{marker::MediaMarker, Id};

/// Request body of `POST /tweets`.
#[derive(Debug, Deserialize)]
pub struct CreateRequest {
    pub tweet_data: String,
    #[serde(default)]
    pub tweet_media_ids: Option<Vec<Id<MediaMarker>>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn media_ids_are_optional() {
        let form: CreateRequest =
            serde_json::from_str(r#"{"tweet_data": "hello world"}"#).unwrap();
        assert_eq!(form.tweet_data, "hello world");
        assert!(form.tweet_media_ids.is_none());

        let form: CreateRequest =
            serde_json::from_str(r#"{"tweet_data": "hi", "tweet_media_ids": [1, 2]}"#).unwrap();
        let ids = form.tweet_media_ids.unwrap();
        assert_eq!(ids.len(), 2);
        assert_eq!(ids[0].get(), 1);
        assert_eq!(ids[1].get(), 2);
    }
}
