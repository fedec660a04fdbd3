use diesel::sqlite::SqliteConnection;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};

pub use authrs::db_connection::{DbConn, SqlitePool};

use crate::error::{Error, Result};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Initializes a database pool and brings the schema up to date.
pub fn init_db_connection_pool(database_url: &str) -> Result<SqlitePool> {
    let pool = authrs::db_connection::init_db_connection_pool(database_url)?;
    run_migrations(&mut *pool.get()?)?;
    Ok(pool)
}

/// Account tables first, the rest reference them.
pub fn run_migrations(conn: &mut SqliteConnection) -> Result<()> {
    authrs::db_connection::run_migrations(conn)?;
    conn.run_pending_migrations(MIGRATIONS)
        .map_err(|err| Error::Migration(err.to_string()))?;
    Ok(())
}
