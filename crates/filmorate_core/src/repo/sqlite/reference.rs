//! SQLite MPA and genre tables.

use super::lock_connection;
use crate::db::SharedConnection;
use crate::model::film::{Genre, GenreId, Mpa, MpaId};
use crate::repo::error::{EntityKind, RepoError, RepoResult};
use crate::repo::film_repo::ReferenceRepository;
use rusqlite::{Connection, OptionalExtension};

/// SQLite-backed reference tables seeded by migration.
#[derive(Debug, Clone)]
pub struct SqliteReferenceRepository {
    conn: SharedConnection,
}

impl SqliteReferenceRepository {
    pub fn new(conn: SharedConnection) -> Self {
        Self { conn }
    }
}

impl ReferenceRepository for SqliteReferenceRepository {
    fn list_mpa(&self) -> RepoResult<Vec<Mpa>> {
        let conn = lock_connection(&self.conn)?;
        let mut stmt = conn.prepare("SELECT id, name FROM mpa ORDER BY id ASC;")?;
        let mut rows = stmt.query([])?;
        let mut ratings = Vec::new();
        while let Some(row) = rows.next()? {
            ratings.push(Mpa {
                id: row.get("id")?,
                name: row.get("name")?,
            });
        }
        Ok(ratings)
    }

    fn get_mpa(&self, id: MpaId) -> RepoResult<Mpa> {
        let conn = lock_connection(&self.conn)?;
        load_mpa(&conn, id)
    }

    fn list_genres(&self) -> RepoResult<Vec<Genre>> {
        let conn = lock_connection(&self.conn)?;
        let mut stmt = conn.prepare("SELECT id, name FROM genre ORDER BY id ASC;")?;
        let mut rows = stmt.query([])?;
        let mut genres = Vec::new();
        while let Some(row) = rows.next()? {
            genres.push(Genre {
                id: row.get("id")?,
                name: row.get("name")?,
            });
        }
        Ok(genres)
    }

    fn get_genre(&self, id: GenreId) -> RepoResult<Genre> {
        let conn = lock_connection(&self.conn)?;
        load_genre(&conn, id)
    }
}

pub(super) fn load_mpa(conn: &Connection, id: MpaId) -> RepoResult<Mpa> {
    conn.query_row("SELECT id, name FROM mpa WHERE id = ?1;", [id], |row| {
        Ok(Mpa {
            id: row.get("id")?,
            name: row.get("name")?,
        })
    })
    .optional()?
    .ok_or(RepoError::not_found(EntityKind::Mpa, id))
}

pub(super) fn load_genre(conn: &Connection, id: GenreId) -> RepoResult<Genre> {
    conn.query_row("SELECT id, name FROM genre WHERE id = ?1;", [id], |row| {
        Ok(Genre {
            id: row.get("id")?,
            name: row.get("name")?,
        })
    })
    .optional()?
    .ok_or(RepoError::not_found(EntityKind::Genre, id))
}
