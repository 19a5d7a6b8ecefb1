//! SQLite film store.
//!
//! # Invariants
//! - Create and update validate references, write the film row and
//!   reconcile genre links inside one `IMMEDIATE` transaction.
//! - Popularity ranking is computed by a single grouped query.

use super::reference::{load_genre, load_mpa};
use super::relations::{
    delete_film_genre, insert_film_genre, insert_like, load_genre_ids, load_likers,
};
use super::{exists, lock_connection, FILM_EXISTS_SQL};
use crate::db::SharedConnection;
use crate::model::film::{Film, FilmId, Genre, GenreId, Mpa};
use crate::repo::error::{EntityKind, RepoError, RepoResult};
use crate::repo::film_repo::FilmRepository;
use log::{info, warn};
use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};

const FILM_SELECT_SQL: &str = "SELECT
    f.id,
    f.name,
    f.description,
    f.release_date,
    f.duration,
    m.id AS mpa_id,
    m.name AS mpa_name
FROM film AS f
INNER JOIN mpa AS m ON f.mpa_id = m.id";

/// SQLite-backed film store with native auto-increment ids.
#[derive(Debug, Clone)]
pub struct SqliteFilmRepository {
    conn: SharedConnection,
}

impl SqliteFilmRepository {
    pub fn new(conn: SharedConnection) -> Self {
        Self { conn }
    }
}

impl FilmRepository for SqliteFilmRepository {
    fn list_films(&self) -> RepoResult<Vec<Film>> {
        let conn = lock_connection(&self.conn)?;
        query_films(&conn, &format!("{FILM_SELECT_SQL} ORDER BY f.id ASC;"), &[])
    }

    fn popular_films(&self, count: usize) -> RepoResult<Vec<Film>> {
        let limit = i64::try_from(count).unwrap_or(i64::MAX);
        let conn = lock_connection(&self.conn)?;
        query_films(
            &conn,
            &format!(
                "{FILM_SELECT_SQL}
                 LEFT JOIN film_like AS fl ON f.id = fl.film_id
                 GROUP BY f.id
                 ORDER BY COUNT(fl.user_id) DESC, f.id ASC
                 LIMIT ?1;"
            ),
            &[limit],
        )
    }

    fn get_film(&self, id: FilmId) -> RepoResult<Film> {
        let conn = lock_connection(&self.conn)?;
        load_film(&conn, id)
    }

    fn add_film(&self, film: &Film) -> RepoResult<Film> {
        let mut conn = lock_connection(&self.conn)?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        ensure_references(&tx, film)?;

        tx.execute(
            "INSERT INTO film (name, description, release_date, duration, mpa_id)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                film.name,
                film.description,
                film.release_date,
                film.duration,
                film.mpa.id
            ],
        )?;
        let film_id = tx.last_insert_rowid();
        for genre_id in film.genre_ids() {
            insert_film_genre(&tx, film_id, genre_id)?;
        }
        for user_id in &film.likes {
            insert_like(&tx, film_id, *user_id)?;
        }
        let created = load_film(&tx, film_id)?;
        tx.commit()?;

        info!("event=film_add module=repo backend=sqlite status=ok film_id={film_id}");
        Ok(created)
    }

    fn update_film(&self, film: &Film) -> RepoResult<Film> {
        let mut conn = lock_connection(&self.conn)?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        if !exists(&tx, FILM_EXISTS_SQL, film.id)? {
            return Err(RepoError::not_found(EntityKind::Film, film.id));
        }
        ensure_references(&tx, film)?;

        tx.execute(
            "UPDATE film
             SET
                name = ?1,
                description = ?2,
                release_date = ?3,
                duration = ?4,
                mpa_id = ?5
             WHERE id = ?6;",
            params![
                film.name,
                film.description,
                film.release_date,
                film.duration,
                film.mpa.id,
                film.id
            ],
        )?;

        let current = load_genre_ids(&tx, film.id)?;
        let wanted = film.genre_ids();
        for stale in current.difference(&wanted) {
            delete_film_genre(&tx, film.id, *stale)?;
        }
        for added in wanted.difference(&current) {
            insert_film_genre(&tx, film.id, *added)?;
        }
        let updated = load_film(&tx, film.id)?;
        tx.commit()?;

        info!(
            "event=film_update module=repo backend=sqlite status=ok film_id={}",
            film.id
        );
        Ok(updated)
    }

    fn delete_film(&self, id: FilmId) -> RepoResult<()> {
        let conn = lock_connection(&self.conn)?;
        let changed = conn.execute("DELETE FROM film WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::not_found(EntityKind::Film, id));
        }
        info!("event=film_delete module=repo backend=sqlite status=ok film_id={id}");
        Ok(())
    }

    fn films_by_genre(&self, genre_id: GenreId) -> RepoResult<Vec<Film>> {
        let conn = lock_connection(&self.conn)?;
        load_genre(&conn, genre_id)?;
        query_films(
            &conn,
            &format!(
                "{FILM_SELECT_SQL}
                 INNER JOIN film_genre AS fg ON f.id = fg.film_id
                 WHERE fg.genre_id = ?1
                 ORDER BY f.id ASC;"
            ),
            &[genre_id],
        )
    }
}

fn ensure_references(conn: &Connection, film: &Film) -> RepoResult<()> {
    if let Err(err) = load_mpa(conn, film.mpa.id) {
        warn!(
            "event=film_refs module=repo backend=sqlite status=not_found mpa_id={}",
            film.mpa.id
        );
        return Err(err);
    }
    for genre_id in film.genre_ids() {
        load_genre(conn, genre_id)?;
    }
    Ok(())
}

fn load_film(conn: &Connection, id: FilmId) -> RepoResult<Film> {
    let mut stmt = conn.prepare(&format!("{FILM_SELECT_SQL} WHERE f.id = ?1;"))?;
    let film = stmt.query_row([id], parse_film_row).optional()?;
    match film {
        Some(film) => hydrate(conn, film),
        None => {
            warn!("event=film_get module=repo backend=sqlite status=not_found film_id={id}");
            Err(RepoError::not_found(EntityKind::Film, id))
        }
    }
}

fn query_films(conn: &Connection, sql: &str, binds: &[i64]) -> RepoResult<Vec<Film>> {
    let mut stmt = conn.prepare(sql)?;
    let mut rows = stmt.query(rusqlite::params_from_iter(binds.iter()))?;
    let mut films = Vec::new();
    while let Some(row) = rows.next()? {
        films.push(parse_film_row(row)?);
    }
    films.into_iter().map(|film| hydrate(conn, film)).collect()
}

fn parse_film_row(row: &Row<'_>) -> rusqlite::Result<Film> {
    Ok(Film {
        id: row.get("id")?,
        name: row.get("name")?,
        description: row.get("description")?,
        release_date: row.get("release_date")?,
        duration: row.get("duration")?,
        mpa: Mpa {
            id: row.get("mpa_id")?,
            name: row.get("mpa_name")?,
        },
        genres: Vec::new(),
        likes: Default::default(),
    })
}

/// Fills genre labels and liker ids for a film row.
fn hydrate(conn: &Connection, mut film: Film) -> RepoResult<Film> {
    let mut stmt = conn.prepare(
        "SELECT g.id, g.name
         FROM film_genre AS fg
         INNER JOIN genre AS g ON g.id = fg.genre_id
         WHERE fg.film_id = ?1
         ORDER BY g.id ASC;",
    )?;
    let mut rows = stmt.query([film.id])?;
    while let Some(row) = rows.next()? {
        film.genres.push(Genre {
            id: row.get("id")?,
            name: row.get("name")?,
        });
    }
    film.likes = load_likers(conn, film.id)?;
    Ok(film)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{open_db_in_memory, share_connection};
    use chrono::NaiveDate;
    use std::collections::BTreeSet;

    fn repo() -> SqliteFilmRepository {
        SqliteFilmRepository::new(share_connection(open_db_in_memory().unwrap()))
    }

    fn film(name: &str) -> Film {
        Film::new(
            name,
            "description",
            NaiveDate::from_ymd_opt(2001, 9, 14).unwrap(),
            120,
            2,
        )
    }

    #[test]
    fn failed_update_rolls_back_row_and_genres() {
        let repo = repo();
        let created = repo.add_film(&film("Heat").with_genres([1, 2])).unwrap();

        let mut broken = created.clone().with_genres([3, 99]);
        broken.name = "Renamed".to_string();
        let err = repo.update_film(&broken).unwrap_err();
        assert!(matches!(
            err,
            RepoError::NotFound {
                kind: EntityKind::Genre,
                id: 99
            }
        ));

        let reloaded = repo.get_film(created.id).unwrap();
        assert_eq!(reloaded.name, "Heat");
        assert_eq!(reloaded.genre_ids(), BTreeSet::from([1, 2]));
    }

    #[test]
    fn zero_limit_returns_no_films() {
        let repo = repo();
        repo.add_film(&film("Heat")).unwrap();
        assert!(repo.popular_films(0).unwrap().is_empty());
        assert_eq!(repo.popular_films(usize::MAX).unwrap().len(), 1);
    }
}
