use mime::Mime;
use serde::Deserialize;
use std::num::NonZeroU64;
use std::path::PathBuf;

/// Configuration for the media upload blob store.
#[derive(Debug, Deserialize)]
pub struct Uploads {
    /// Directory where uploaded media files are stored.
    ///
    /// **Environment variables**:
    /// - `CHIRP_UPLOADS_DIR`
    #[serde(default = "Uploads::default_dir")]
    pub dir: PathBuf,
    /// Maximum accepted upload size in bytes.
    ///
    /// **Environment variables**:
    /// - `CHIRP_UPLOADS_MAX_FILE_SIZE`
    #[serde(default = "Uploads::default_max_file_size")]
    pub max_file_size: NonZeroU64,
    /// Media types accepted by the upload endpoint.
    ///
    /// **Environment variables**:
    /// - `CHIRP_UPLOADS_ALLOWED_TYPES`
    #[serde(default = "Uploads::default_allowed_types")]
    pub allowed_types: Vec<String>,
}

impl Uploads {
    pub fn is_allowed_type(&self, mime: &Mime) -> bool {
        self.allowed_types
            .iter()
            .any(|entry| entry == mime.essence_str())
    }
}

impl Default for Uploads {
    fn default() -> Self {
        Self {
            dir: Self::default_dir(),
            max_file_size: Self::default_max_file_size(),
            allowed_types: Self::default_allowed_types(),
        }
    }
}

impl Uploads {
    const DEFAULT_MAX_FILE_SIZE: u64 = 5 * 1024 * 1024;

    fn default_dir() -> PathBuf {
        PathBuf::from("uploads")
    }

    const fn default_max_file_size() -> NonZeroU64 {
        match NonZeroU64::new(Self::DEFAULT_MAX_FILE_SIZE) {
            Some(n) => n,
            None => panic!("DEFAULT_MAX_FILE_SIZE is accidentally set to 0"),
        }
    }

    fn default_allowed_types() -> Vec<String> {
        vec![
            mime::IMAGE_JPEG.essence_str().to_string(),
            mime::IMAGE_PNG.essence_str().to_string(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allowed_type_matches_on_essence() {
        let uploads = Uploads::default();
        assert!(uploads.is_allowed_type(&mime::IMAGE_JPEG));
        assert!(uploads.is_allowed_type(&mime::IMAGE_PNG));
        assert!(!uploads.is_allowed_type(&mime::IMAGE_GIF));
        assert!(!uploads.is_allowed_type(&mime::TEXT_PLAIN));
    }
}
