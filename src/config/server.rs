use error_stack::{Report, Result, ResultExt};
use mime::Mime;
use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr};
use std::num::NonZeroUsize;

use super::LoadError;
use crate::util::figment::FigmentErrorAttachable;

#[derive(Debug, Deserialize)]
pub struct Server {
    /// Address the HTTP server binds to.
    ///
    /// **Environment variables**:
    /// - `CHIRP_IP`
    #[serde(default = "Server::default_ip")]
    pub ip: IpAddr,
    /// Port the HTTP server listens on.
    ///
    /// **Environment variables**:
    /// - `CHIRP_PORT`
    #[serde(default = "Server::default_port")]
    pub port: u16,
    /// Amount of HTTP worker threads to spawn.
    ///
    /// **Environment variables**:
    /// - `CHIRP_WORKERS`
    #[serde(default = "Server::default_workers")]
    pub workers: NonZeroUsize,
    pub db: super::Database,
    #[serde(default)]
    pub uploads: super::Uploads,
    #[serde(default)]
    pub content: super::Content,
}

impl Server {
    pub fn load() -> Result<Self, LoadError> {
        let config = Self::figment()
            .extract::<Self>()
            .map_err(|e| Report::new(LoadError).attach_figment_error(e))?;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), LoadError> {
        for entry in &self.uploads.allowed_types {
            entry
                .parse::<Mime>()
                .change_context(LoadError)
                .attach_printable_lazy(|| {
                    format!("{entry:?} in uploads.allowed_types is not a valid media type")
                })?;
        }
        Ok(())
    }
}

impl Server {
    /// Hand-built configuration wrapped around an externally managed
    /// database, used by the integration suite in `tests/`.
    #[doc(hidden)]
    #[must_use]
    pub fn for_tests(uploads_dir: &std::path::Path) -> Self {
        Self {
            ip: Self::default_ip(),
            port: Self::default_port(),
            workers: Self::default_workers(),
            db: super::Database {
                primary: super::DbPoolConfig {
                    min_idle: None,
                    pool_size: super::DbPoolConfig::default_pool_size(),
                    url: crate::util::Sensitive::new("postgres://localhost/chirp".to_string()),
                },
                replica: None,
                enforce_tls: false,
                timeout_secs: super::DbPoolConfig::default_pool_timeout_secs(),
            },
            uploads: super::Uploads {
                dir: uploads_dir.to_path_buf(),
                ..Default::default()
            },
            content: super::Content::default(),
        }
    }
}

impl Server {
    const DEFAULT_CONFIG_FILE: &'static str = "chirp.toml";

    const fn default_ip() -> IpAddr {
        IpAddr::V4(Ipv4Addr::LOCALHOST)
    }

    const fn default_port() -> u16 {
        3000
    }

    const fn default_workers() -> NonZeroUsize {
        match NonZeroUsize::new(1) {
            Some(n) => n,
            None => panic!("default worker count is accidentally set to 0"),
        }
    }

    /// Creates a default [`figment::Figment`] object to load server
    /// configuration. This function is there for implementing
    /// [`Server::load`] and testing.
    pub(crate) fn figment() -> figment::Figment {
        use figment::{
            providers::{Env, Format, Toml},
            Figment,
        };

        Figment::new()
            .merge(Toml::file(Self::DEFAULT_CONFIG_FILE))
            // The env provider cannot tell which underscores separate
            // nested keys, so the nested fields get mapped by hand.
            .merge(Env::prefixed("CHIRP_").map(|v| match v.as_str() {
                "DB_PRIMARY_URL" => "db.primary.url".into(),
                "DB_PRIMARY_MIN_IDLE" => "db.primary.min_idle".into(),
                "DB_PRIMARY_POOL_SIZE" => "db.primary.pool_size".into(),

                "DB_REPLICA_URL" => "db.replica.url".into(),
                "DB_REPLICA_MIN_IDLE" => "db.replica.min_idle".into(),
                "DB_REPLICA_POOL_SIZE" => "db.replica.pool_size".into(),

                "DB_ENFORCE_TLS" => "db.enforce_tls".into(),
                "DB_TIMEOUT_SECS" => "db.timeout_secs".into(),

                "UPLOADS_DIR" => "uploads.dir".into(),
                "UPLOADS_MAX_FILE_SIZE" => "uploads.max_file_size".into(),
                "UPLOADS_ALLOWED_TYPES" => "uploads.allowed_types".into(),

                "CONTENT_MAX_LENGTH" => "content.max_length".into(),

                _ => v.as_str().replace('_', ".").into(),
            }))
            // Environment variable aliases
            .merge(Env::raw().map(|v| match v.as_str() {
                "DATABASE_URL" => "db.primary.url".into(),
                _ => v.into(),
            }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;
    use std::num::{NonZeroU32, NonZeroU64};

    #[test]
    fn env_aliases() {
        Jail::expect_with(|jail| {
            jail.set_env("DATABASE_URL", "postgres://localhost/chirp");

            jail.set_env("CHIRP_DB_PRIMARY_MIN_IDLE", "100");
            jail.set_env("CHIRP_DB_PRIMARY_POOL_SIZE", "100");

            jail.set_env("CHIRP_DB_REPLICA_URL", "required");
            jail.set_env("CHIRP_DB_REPLICA_MIN_IDLE", "589");
            jail.set_env("CHIRP_DB_REPLICA_POOL_SIZE", "589");

            jail.set_env("CHIRP_DB_ENFORCE_TLS", "false");
            jail.set_env("CHIRP_DB_TIMEOUT_SECS", "3030");

            let config: Server = Server::figment().extract()?;
            assert_eq!(config.db.primary.url.as_str(), "postgres://localhost/chirp");
            assert_eq!(
                config.db.primary.min_idle,
                Some(NonZeroU32::new(100).unwrap())
            );
            assert_eq!(config.db.primary.pool_size, NonZeroU32::new(100).unwrap());

            let replica = config.db.replica.as_ref().unwrap();
            assert_eq!(replica.min_idle, Some(NonZeroU32::new(589).unwrap()));
            assert_eq!(replica.pool_size, NonZeroU32::new(589).unwrap());

            assert_eq!(config.db.enforce_tls, false);
            assert_eq!(config.db.timeout_secs, NonZeroU64::new(3030).unwrap());

            Ok(())
        });
    }

    #[test]
    fn upload_and_content_env_keys() {
        Jail::expect_with(|jail| {
            jail.set_env("DATABASE_URL", "postgres://localhost/chirp");
            jail.set_env("CHIRP_UPLOADS_DIR", "blobs");
            jail.set_env("CHIRP_UPLOADS_MAX_FILE_SIZE", "1024");
            jail.set_env("CHIRP_CONTENT_MAX_LENGTH", "500");

            let config: Server = Server::figment().extract()?;
            assert_eq!(config.uploads.dir, std::path::PathBuf::from("blobs"));
            assert_eq!(config.uploads.max_file_size, NonZeroU64::new(1024).unwrap());
            assert_eq!(config.content.max_length, NonZeroU32::new(500).unwrap());

            Ok(())
        });
    }

    #[test]
    fn defaults() {
        Jail::expect_with(|jail| {
            jail.set_env("DATABASE_URL", "postgres://localhost/chirp");

            let config: Server = Server::figment().extract()?;
            assert_eq!(config.ip, Server::default_ip());
            assert_eq!(config.port, 3000);
            assert_eq!(
                config.uploads.max_file_size,
                NonZeroU64::new(5 * 1024 * 1024).unwrap()
            );
            assert_eq!(
                config.uploads.allowed_types,
                vec!["image/jpeg".to_string(), "image/png".to_string()]
            );
            assert_eq!(config.content.max_length, NonZeroU32::new(280).unwrap());
            assert!(config.validate().is_ok());

            Ok(())
        });
    }
}
