use error_stack::{Result, ResultExt};
use futures::future::join_all;
use mime::Mime;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

const FILE_NAME_LENGTH: usize = 32;
const FILE_NAME_CHARSET: &str = "abcdefghijklmnopqrstuvwxyz0123456789";

#[derive(Debug, Error)]
#[error("Failed to store media file")]
pub struct StoreError;

/// Directory-backed blob store for uploaded media.
///
/// Files are written under the configured directory with generated
/// collision-free names; callers only ever see the relative locator
/// (`<dir name>/<generated name>`) that gets persisted on the media row.
#[derive(Debug, Clone)]
pub struct MediaStore {
    dir: PathBuf,
    prefix: String,
}

impl MediaStore {
    #[must_use]
    pub fn new(dir: &Path) -> Self {
        let prefix = dir
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "uploads".to_string());

        Self {
            dir: dir.to_path_buf(),
            prefix,
        }
    }

    /// Makes sure the backing directory exists before the server
    /// accepts any uploads.
    pub async fn init(&self) -> Result<(), StoreError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .change_context(StoreError)
            .attach_printable_lazy(|| {
                format!("could not create uploads directory {}", self.dir.display())
            })
    }

    /// Writes `data` under a generated name and returns the relative
    /// locator for the new file.
    #[tracing::instrument(skip(self, data), fields(size = data.len()))]
    pub async fn store(&self, mime: &Mime, data: &[u8]) -> Result<String, StoreError> {
        let name = generate_name(mime);
        let path = self.dir.join(&name);

        tokio::fs::write(&path, data)
            .await
            .change_context(StoreError)
            .attach_printable_lazy(|| format!("could not write {}", path.display()))?;

        Ok(format!("{}/{name}", self.prefix))
    }

    /// Removes the backing files for every given locator concurrently.
    /// Failures are logged and swallowed; cleanup never blocks the
    /// operation that requested it.
    #[tracing::instrument(skip_all, fields(files = locators.len()))]
    pub async fn remove_all(&self, locators: &[String]) {
        let tasks = locators.iter().map(|locator| {
            let path = self.resolve(locator);
            async move {
                if let Err(error) = tokio::fs::remove_file(&path).await {
                    warn!(%error, path = %path.display(), "failed to remove media file");
                }
            }
        });

        join_all(tasks).await;
    }

    /// Maps a stored locator back to the file path inside the uploads
    /// directory. Only the file name component of the locator is
    /// trusted.
    fn resolve(&self, locator: &str) -> PathBuf {
        let name = Path::new(locator)
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        self.dir.join(name)
    }
}

fn generate_name(mime: &Mime) -> String {
    let ext = match (mime.type_(), mime.subtype()) {
        (mime::IMAGE, mime::JPEG) => "jpg",
        (mime::IMAGE, mime::PNG) => "png",
        (_, subtype) => subtype.as_str(),
    };

    let stem = random_string::generate(FILE_NAME_LENGTH, FILE_NAME_CHARSET);
    format!("{stem}.{ext}")
}
