/// Database migration runner
///
/// Runs the SQL migrations embedded from the `migrations/` directory
/// of this crate at startup. The schema carries the invariants the
/// handlers rely on: unique user email, unique workshop title, and the
/// compound unique (user, workshop) index that makes duplicate
/// enrollment rejection authoritative.
///
/// # Example
///
/// ```no_run
/// use talleres_shared::db::pool::{create_pool, DatabaseConfig};
/// use talleres_shared::db::migrations::run_migrations;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
/// run_migrations(&pool).await?;
/// # Ok(())
/// # }
/// ```

use sqlx::postgres::PgPool;
use tracing::{info, warn};

/// Runs all pending database migrations
///
/// # Errors
///
/// Returns an error if a migration fails to execute or the connection
/// is lost mid-migration. Failed migrations are rolled back.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    info!("Starting database migrations");

    let migrations = sqlx::migrate!("./migrations");

    match migrations.run(pool).await {
        Ok(()) => {
            info!("All database migrations completed successfully");
            Ok(())
        }
        Err(e) => {
            warn!("Migration failed: {}", e);
            Err(e)
        }
    }
}
