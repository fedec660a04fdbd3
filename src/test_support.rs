use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, PooledConnection};
use diesel::sqlite::SqliteConnection;
use tempfile::TempDir;

use crate::db_connection::{init_db_connection_pool, SqlitePool};
use crate::models::Member;
use crate::schema::users;

/// A migrated database in a throwaway directory.
pub struct TestDb {
    pub dir: TempDir,
    pub pool: SqlitePool,
}

impl TestDb {
    pub fn new() -> TestDb {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("litrevu.sqlite3");
        let pool = init_db_connection_pool(path.to_str().unwrap()).unwrap();
        TestDb { dir, pool }
    }

    pub fn conn(&self) -> PooledConnection<ConnectionManager<SqliteConnection>> {
        self.pool.get().unwrap()
    }
}

/// Inserts an account that cannot log in.
pub fn member(conn: &mut SqliteConnection, name: &str) -> Member {
    diesel::insert_into(users::table)
        .values((
            users::username.eq(name),
            users::password_hash.eq("!"),
            users::date_joined.eq(at(0)),
            users::is_active.eq(true),
        ))
        .returning(Member::as_returning())
        .get_result(conn)
        .unwrap()
}

/// A fixed point in time, `minutes` after the epoch of the test fixtures.
pub fn at(minutes: i64) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, 1)
        .and_then(|day| day.and_hms_opt(12, 0, 0))
        .unwrap()
        + chrono::Duration::minutes(minutes)
}
