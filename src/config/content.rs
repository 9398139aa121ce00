use serde::Deserialize;
use std::num::NonZeroU32;

/// Limits applied to tweet contents.
#[derive(Debug, Deserialize)]
pub struct Content {
    /// Maximum tweet length measured in Unicode code points.
    ///
    /// **Environment variables**:
    /// - `CHIRP_CONTENT_MAX_LENGTH`
    #[serde(default = "Content::default_max_length")]
    pub max_length: NonZeroU32,
}

impl Default for Content {
    fn default() -> Self {
        Self {
            max_length: Self::default_max_length(),
        }
    }
}

impl Content {
    const DEFAULT_MAX_LENGTH: u32 = 280;

    const fn default_max_length() -> NonZeroU32 {
        match NonZeroU32::new(Self::DEFAULT_MAX_LENGTH) {
            Some(n) => n,
            None => panic!("DEFAULT_MAX_LENGTH is accidentally set to 0"),
        }
    }
}
