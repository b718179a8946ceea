//! Database migration command.
//!
//! Applies `crates/api/migrations/` and creates the session store table.

use tower_sessions_sqlx_store::PostgresStore;

use super::{CliError, connect};

/// Run all migrations.
///
/// # Errors
///
/// Returns an error if the database is unreachable or a migration fails.
pub async fn run() -> Result<(), CliError> {
    let pool = connect().await?;

    tracing::info!("Running shop schema migrations...");
    sqlx::migrate!("../api/migrations").run(&pool).await?;

    tracing::info!("Creating session store table...");
    PostgresStore::new(pool.clone()).migrate().await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
