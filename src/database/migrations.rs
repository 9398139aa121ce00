use error_stack::Report;
use sqlx::migrate::Migrator;
use tokio::time::Instant;
use tracing::info;

use super::{Error, Pool, Result};

pub static MIGRATOR: Migrator = sqlx::migrate!();

/// Applies any migrations not yet recorded in the target database.
#[tracing::instrument(skip_all, name = "db.migrations.run_pending")]
pub async fn run_pending(pool: &Pool) -> Result<()> {
    let now = Instant::now();
    info!("Performing database migrations... (this may take a while)");

    let mut conn = pool.get().await?;
    MIGRATOR
        .run(&mut *conn)
        .await
        .map_err(|e| Report::new(Error::Migrate(e)))?;

    let elapsed = now.elapsed();
    info!("Successfully performed database migrations! took {elapsed:.2?}");

    Ok(())
}
