//! SQLite friendship, like and film-genre relations.
//!
//! The free functions take a plain `&Connection` so the film store can run
//! them inside its own transaction.

use super::{lock_connection, map_missing_endpoint};
use crate::db::SharedConnection;
use crate::model::film::{FilmId, GenreId};
use crate::model::user::UserId;
use crate::repo::error::{EntityKind, RepoResult};
use crate::repo::film_repo::{FilmGenreRepository, LikeRepository};
use crate::repo::user_repo::FriendshipRepository;
use log::info;
use rusqlite::{params, Connection};
use std::collections::BTreeSet;

/// SQLite-backed directed friendship relation.
#[derive(Debug, Clone)]
pub struct SqliteFriendshipRepository {
    conn: SharedConnection,
}

impl SqliteFriendshipRepository {
    pub fn new(conn: SharedConnection) -> Self {
        Self { conn }
    }
}

impl FriendshipRepository for SqliteFriendshipRepository {
    fn add_friend(&self, user_id: UserId, friend_id: UserId) -> RepoResult<()> {
        let conn = lock_connection(&self.conn)?;
        let changed = conn
            .execute(
                "INSERT OR IGNORE INTO friendship (user_id, friend_id) VALUES (?1, ?2);",
                params![user_id, friend_id],
            )
            .map_err(|err| {
                map_missing_endpoint(
                    &conn,
                    err,
                    [(EntityKind::User, user_id), (EntityKind::User, friend_id)],
                )
            })?;
        info!(
            "event=friend_add module=repo backend=sqlite status=ok user_id={user_id} friend_id={friend_id} changed={}",
            changed > 0
        );
        Ok(())
    }

    fn delete_friend(&self, user_id: UserId, friend_id: UserId) -> RepoResult<()> {
        let conn = lock_connection(&self.conn)?;
        let changed = conn.execute(
            "DELETE FROM friendship WHERE user_id = ?1 AND friend_id = ?2;",
            params![user_id, friend_id],
        )?;
        info!(
            "event=friend_delete module=repo backend=sqlite status=ok user_id={user_id} friend_id={friend_id} changed={}",
            changed > 0
        );
        Ok(())
    }

    fn friend_ids(&self, user_id: UserId) -> RepoResult<BTreeSet<UserId>> {
        let conn = lock_connection(&self.conn)?;
        collect_ids(
            &conn,
            "SELECT friend_id FROM friendship WHERE user_id = ?1;",
            user_id,
        )
    }

    fn remove_all_for_user(&self, user_id: UserId) -> RepoResult<()> {
        let conn = lock_connection(&self.conn)?;
        let removed = conn.execute(
            "DELETE FROM friendship WHERE user_id = ?1 OR friend_id = ?1;",
            [user_id],
        )?;
        info!("event=friend_purge module=repo backend=sqlite status=ok user_id={user_id} removed={removed}");
        Ok(())
    }
}

/// SQLite-backed film -> liking user relation.
#[derive(Debug, Clone)]
pub struct SqliteLikeRepository {
    conn: SharedConnection,
}

impl SqliteLikeRepository {
    pub fn new(conn: SharedConnection) -> Self {
        Self { conn }
    }
}

impl LikeRepository for SqliteLikeRepository {
    fn add_like(&self, film_id: FilmId, user_id: UserId) -> RepoResult<()> {
        let conn = lock_connection(&self.conn)?;
        let added = insert_like(&conn, film_id, user_id)?;
        info!(
            "event=like_add module=repo backend=sqlite status=ok film_id={film_id} user_id={user_id} changed={added}"
        );
        Ok(())
    }

    fn delete_like(&self, film_id: FilmId, user_id: UserId) -> RepoResult<()> {
        let conn = lock_connection(&self.conn)?;
        let changed = conn.execute(
            "DELETE FROM film_like WHERE film_id = ?1 AND user_id = ?2;",
            params![film_id, user_id],
        )?;
        info!(
            "event=like_delete module=repo backend=sqlite status=ok film_id={film_id} user_id={user_id} changed={}",
            changed > 0
        );
        Ok(())
    }

    fn likers(&self, film_id: FilmId) -> RepoResult<BTreeSet<UserId>> {
        let conn = lock_connection(&self.conn)?;
        load_likers(&conn, film_id)
    }

    fn remove_all_for_film(&self, film_id: FilmId) -> RepoResult<()> {
        let conn = lock_connection(&self.conn)?;
        let removed = conn.execute("DELETE FROM film_like WHERE film_id = ?1;", [film_id])?;
        info!("event=like_purge module=repo backend=sqlite status=ok film_id={film_id} removed={removed}");
        Ok(())
    }

    fn remove_all_by_user(&self, user_id: UserId) -> RepoResult<()> {
        let conn = lock_connection(&self.conn)?;
        let removed = conn.execute("DELETE FROM film_like WHERE user_id = ?1;", [user_id])?;
        info!("event=like_purge module=repo backend=sqlite status=ok user_id={user_id} removed={removed}");
        Ok(())
    }
}

/// SQLite-backed film -> genre relation.
#[derive(Debug, Clone)]
pub struct SqliteFilmGenreRepository {
    conn: SharedConnection,
}

impl SqliteFilmGenreRepository {
    pub fn new(conn: SharedConnection) -> Self {
        Self { conn }
    }
}

impl FilmGenreRepository for SqliteFilmGenreRepository {
    fn add_genre(&self, film_id: FilmId, genre_id: GenreId) -> RepoResult<()> {
        let conn = lock_connection(&self.conn)?;
        let added = insert_film_genre(&conn, film_id, genre_id)?;
        info!(
            "event=film_genre_add module=repo backend=sqlite status=ok film_id={film_id} genre_id={genre_id} changed={added}"
        );
        Ok(())
    }

    fn delete_genre(&self, film_id: FilmId, genre_id: GenreId) -> RepoResult<()> {
        let conn = lock_connection(&self.conn)?;
        let removed = delete_film_genre(&conn, film_id, genre_id)?;
        info!(
            "event=film_genre_delete module=repo backend=sqlite status=ok film_id={film_id} genre_id={genre_id} changed={removed}"
        );
        Ok(())
    }

    fn genre_ids(&self, film_id: FilmId) -> RepoResult<BTreeSet<GenreId>> {
        let conn = lock_connection(&self.conn)?;
        load_genre_ids(&conn, film_id)
    }

    fn remove_all_for_film(&self, film_id: FilmId) -> RepoResult<()> {
        let conn = lock_connection(&self.conn)?;
        let removed = conn.execute("DELETE FROM film_genre WHERE film_id = ?1;", [film_id])?;
        info!("event=film_genre_purge module=repo backend=sqlite status=ok film_id={film_id} removed={removed}");
        Ok(())
    }
}

pub(super) fn insert_like(conn: &Connection, film_id: FilmId, user_id: UserId) -> RepoResult<bool> {
    let changed = conn
        .execute(
            "INSERT OR IGNORE INTO film_like (film_id, user_id) VALUES (?1, ?2);",
            params![film_id, user_id],
        )
        .map_err(|err| {
            map_missing_endpoint(
                conn,
                err,
                [(EntityKind::Film, film_id), (EntityKind::User, user_id)],
            )
        })?;
    Ok(changed > 0)
}

pub(super) fn load_likers(conn: &Connection, film_id: FilmId) -> RepoResult<BTreeSet<UserId>> {
    collect_ids(
        conn,
        "SELECT user_id FROM film_like WHERE film_id = ?1;",
        film_id,
    )
}

pub(super) fn insert_film_genre(
    conn: &Connection,
    film_id: FilmId,
    genre_id: GenreId,
) -> RepoResult<bool> {
    let changed = conn.execute(
        "INSERT OR IGNORE INTO film_genre (film_id, genre_id) VALUES (?1, ?2);",
        params![film_id, genre_id],
    )?;
    Ok(changed > 0)
}

pub(super) fn delete_film_genre(
    conn: &Connection,
    film_id: FilmId,
    genre_id: GenreId,
) -> RepoResult<bool> {
    let changed = conn.execute(
        "DELETE FROM film_genre WHERE film_id = ?1 AND genre_id = ?2;",
        params![film_id, genre_id],
    )?;
    Ok(changed > 0)
}

pub(super) fn load_genre_ids(conn: &Connection, film_id: FilmId) -> RepoResult<BTreeSet<GenreId>> {
    collect_ids(
        conn,
        "SELECT genre_id FROM film_genre WHERE film_id = ?1;",
        film_id,
    )
}

fn collect_ids(conn: &Connection, sql: &str, key: i64) -> RepoResult<BTreeSet<i64>> {
    let mut stmt = conn.prepare(sql)?;
    let mut rows = stmt.query([key])?;
    let mut ids = BTreeSet::new();
    while let Some(row) = rows.next()? {
        ids.insert(row.get::<_, i64>(0)?);
    }
    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{open_db_in_memory, share_connection};
    use crate::repo::error::RepoError;

    fn shared_with_user() -> SharedConnection {
        let conn = open_db_in_memory().unwrap();
        conn.execute(
            "INSERT INTO user (email, login, name, birthday) VALUES ('a@x.test', 'a', 'a', '1990-01-01');",
            [],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO film (name, description, release_date, duration, mpa_id)
             VALUES ('f', '', '2000-01-01', 90, 1);",
            [],
        )
        .unwrap();
        share_connection(conn)
    }

    #[test]
    fn like_for_missing_user_reports_not_found() {
        let likes = SqliteLikeRepository::new(shared_with_user());

        let err = likes.add_like(1, 42).unwrap_err();
        assert!(matches!(
            err,
            RepoError::NotFound {
                kind: EntityKind::User,
                id: 42
            }
        ));

        let err = likes.add_like(7, 1).unwrap_err();
        assert!(matches!(
            err,
            RepoError::NotFound {
                kind: EntityKind::Film,
                id: 7
            }
        ));
        assert!(likes.likers(1).unwrap().is_empty());
    }

    #[test]
    fn friend_edge_to_missing_user_reports_not_found() {
        let friendships = SqliteFriendshipRepository::new(shared_with_user());

        let err = friendships.add_friend(1, 9).unwrap_err();
        assert!(matches!(
            err,
            RepoError::NotFound {
                kind: EntityKind::User,
                id: 9
            }
        ));
    }
}
