//! Persistent SQLite repository backend.
//!
//! # Responsibility
//! - Implement every repository contract with SQL over the migrated schema.
//! - Let SQLite assign ids (`AUTOINCREMENT`) and do joins natively.
//!
//! # Invariants
//! - All stores share one `SharedConnection`; each operation holds the lock
//!   for its whole duration.
//! - Operations writing more than one row run inside one `IMMEDIATE`
//!   transaction, so check-then-write sequences cannot interleave.

mod films;
mod reference;
mod relations;
mod users;

pub use films::SqliteFilmRepository;
pub use reference::SqliteReferenceRepository;
pub use relations::{SqliteFilmGenreRepository, SqliteFriendshipRepository, SqliteLikeRepository};
pub use users::SqliteUserRepository;

use crate::db::SharedConnection;
use crate::repo::error::{EntityKind, RepoError, RepoResult};
use rusqlite::{ffi, Connection};
use std::sync::MutexGuard;

const USER_EXISTS_SQL: &str = "SELECT EXISTS(SELECT 1 FROM user WHERE id = ?1);";
const FILM_EXISTS_SQL: &str = "SELECT EXISTS(SELECT 1 FROM film WHERE id = ?1);";

fn lock_connection(conn: &SharedConnection) -> RepoResult<MutexGuard<'_, Connection>> {
    conn.lock().map_err(|_| RepoError::LockPoisoned("sqlite"))
}

fn exists(conn: &Connection, sql: &str, id: i64) -> RepoResult<bool> {
    let found: i64 = conn.query_row(sql, [id], |row| row.get(0))?;
    Ok(found == 1)
}

/// Reports a foreign-key failure on a relation insert as `NotFound` for the
/// first endpoint that no longer exists.
///
/// Must run under the same connection lock as the failed insert.
fn map_missing_endpoint(
    conn: &Connection,
    err: rusqlite::Error,
    endpoints: [(EntityKind, i64); 2],
) -> RepoError {
    let foreign_key_failure = matches!(
        &err,
        rusqlite::Error::SqliteFailure(failure, _)
            if failure.extended_code == ffi::SQLITE_CONSTRAINT_FOREIGNKEY
    );
    if !foreign_key_failure {
        return err.into();
    }

    for (kind, id) in endpoints {
        let sql = match kind {
            EntityKind::User => USER_EXISTS_SQL,
            EntityKind::Film => FILM_EXISTS_SQL,
            EntityKind::Mpa | EntityKind::Genre => continue,
        };
        match exists(conn, sql, id) {
            Ok(true) => {}
            Ok(false) => return RepoError::not_found(kind, id),
            Err(lookup) => return lookup,
        }
    }
    err.into()
}
