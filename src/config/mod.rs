use thiserror::Error;

mod content;
mod database;
mod server;
mod uploads;

pub use content::Content;
pub use database::{Database, DbPoolConfig};
pub use server::Server;
pub use uploads::Uploads;

#[derive(Debug, Error)]
#[error("Failed to load configuration")]
pub struct LoadError;
