//! SQLite user store.

use super::{exists, lock_connection, USER_EXISTS_SQL};
use crate::db::SharedConnection;
use crate::model::user::{User, UserId};
use crate::repo::error::{EntityKind, RepoError, RepoResult, UniqueField};
use crate::repo::user_repo::UserRepository;
use log::{info, warn};
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Row, TransactionBehavior};

const USER_SELECT_SQL: &str = "SELECT
    u.id,
    u.email,
    u.login,
    u.name,
    u.birthday
FROM user AS u";

/// SQLite-backed user store with native auto-increment ids.
#[derive(Debug, Clone)]
pub struct SqliteUserRepository {
    conn: SharedConnection,
}

impl SqliteUserRepository {
    pub fn new(conn: SharedConnection) -> Self {
        Self { conn }
    }
}

impl UserRepository for SqliteUserRepository {
    fn list_users(&self) -> RepoResult<Vec<User>> {
        let conn = lock_connection(&self.conn)?;
        query_users(&conn, &format!("{USER_SELECT_SQL} ORDER BY u.id ASC;"), &[])
    }

    fn get_user(&self, id: UserId) -> RepoResult<User> {
        let conn = lock_connection(&self.conn)?;
        load_user(&conn, id)
    }

    fn add_user(&self, user: &User) -> RepoResult<User> {
        let mut conn = lock_connection(&self.conn)?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        check_unique(&tx, UniqueField::Email, &user.email, None)?;
        check_unique(&tx, UniqueField::Login, &user.login, None)?;

        tx.execute(
            "INSERT INTO user (email, login, name, birthday) VALUES (?1, ?2, ?3, ?4);",
            params![user.email, user.login, user.name, user.birthday],
        )
        .map_err(|err| map_unique_violation(err, user))?;
        let created = load_user(&tx, tx.last_insert_rowid())?;
        tx.commit()?;

        info!(
            "event=user_add module=repo backend=sqlite status=ok user_id={}",
            created.id
        );
        Ok(created)
    }

    fn update_user(&self, user: &User) -> RepoResult<User> {
        let mut conn = lock_connection(&self.conn)?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        if !exists(&tx, USER_EXISTS_SQL, user.id)? {
            return Err(RepoError::not_found(EntityKind::User, user.id));
        }
        check_unique(&tx, UniqueField::Email, &user.email, Some(user.id))?;
        check_unique(&tx, UniqueField::Login, &user.login, Some(user.id))?;

        tx.execute(
            "UPDATE user
             SET
                email = ?1,
                login = ?2,
                name = ?3,
                birthday = ?4
             WHERE id = ?5;",
            params![user.email, user.login, user.name, user.birthday, user.id],
        )
        .map_err(|err| map_unique_violation(err, user))?;
        let updated = load_user(&tx, user.id)?;
        tx.commit()?;

        info!(
            "event=user_update module=repo backend=sqlite status=ok user_id={}",
            user.id
        );
        Ok(updated)
    }

    fn delete_user(&self, id: UserId) -> RepoResult<()> {
        let conn = lock_connection(&self.conn)?;
        let changed = conn.execute("DELETE FROM user WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::not_found(EntityKind::User, id));
        }
        info!("event=user_delete module=repo backend=sqlite status=ok user_id={id}");
        Ok(())
    }

    fn ensure_email_available(&self, email: &str, exclude: Option<UserId>) -> RepoResult<()> {
        let conn = lock_connection(&self.conn)?;
        check_unique(&conn, UniqueField::Email, email, exclude)
    }

    fn ensure_login_available(&self, login: &str, exclude: Option<UserId>) -> RepoResult<()> {
        let conn = lock_connection(&self.conn)?;
        check_unique(&conn, UniqueField::Login, login, exclude)
    }

    fn list_friends(&self, id: UserId) -> RepoResult<Vec<User>> {
        let conn = lock_connection(&self.conn)?;
        query_users(
            &conn,
            &format!(
                "{USER_SELECT_SQL}
                 INNER JOIN friendship AS f ON u.id = f.friend_id
                 WHERE f.user_id = ?1
                 ORDER BY u.id ASC;"
            ),
            &[id],
        )
    }

    fn list_common_friends(&self, id: UserId, other_id: UserId) -> RepoResult<Vec<User>> {
        let conn = lock_connection(&self.conn)?;
        query_users(
            &conn,
            &format!(
                "{USER_SELECT_SQL}
                 INNER JOIN friendship AS own ON u.id = own.friend_id
                 INNER JOIN friendship AS theirs ON own.friend_id = theirs.friend_id
                 WHERE own.user_id = ?1
                   AND theirs.user_id = ?2
                 ORDER BY u.id ASC;"
            ),
            &[id, other_id],
        )
    }
}

fn load_user(conn: &Connection, id: UserId) -> RepoResult<User> {
    let mut stmt = conn.prepare(&format!("{USER_SELECT_SQL} WHERE u.id = ?1;"))?;
    let user = stmt.query_row([id], parse_user_row).optional()?;
    user.ok_or_else(|| {
        warn!("event=user_get module=repo backend=sqlite status=not_found user_id={id}");
        RepoError::not_found(EntityKind::User, id)
    })
}

fn query_users(conn: &Connection, sql: &str, ids: &[UserId]) -> RepoResult<Vec<User>> {
    let mut stmt = conn.prepare(sql)?;
    let mut rows = stmt.query(rusqlite::params_from_iter(ids.iter()))?;
    let mut users = Vec::new();
    while let Some(row) = rows.next()? {
        users.push(parse_user_row(row)?);
    }
    Ok(users)
}

fn parse_user_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get("id")?,
        email: row.get("email")?,
        login: row.get("login")?,
        name: row.get("name")?,
        birthday: row.get("birthday")?,
    })
}

fn check_unique(
    conn: &Connection,
    field: UniqueField,
    candidate: &str,
    exclude: Option<UserId>,
) -> RepoResult<()> {
    let sql = match field {
        UniqueField::Email => {
            "SELECT EXISTS(SELECT 1 FROM user WHERE email = ?1 AND (?2 IS NULL OR id <> ?2));"
        }
        UniqueField::Login => {
            "SELECT EXISTS(SELECT 1 FROM user WHERE login = ?1 AND (?2 IS NULL OR id <> ?2));"
        }
    };
    let taken: i64 = conn.query_row(sql, params![candidate, exclude], |row| row.get(0))?;
    if taken == 1 {
        warn!("event=user_unique module=repo backend=sqlite status=conflict field={field}");
        return Err(RepoError::taken(field, candidate));
    }
    Ok(())
}

/// Translates a unique-index failure into the shared error taxonomy.
fn map_unique_violation(err: rusqlite::Error, user: &User) -> RepoError {
    if let rusqlite::Error::SqliteFailure(failure, Some(message)) = &err {
        if failure.code == ErrorCode::ConstraintViolation {
            if message.contains("user.email") {
                return RepoError::taken(UniqueField::Email, user.email.as_str());
            }
            if message.contains("user.login") {
                return RepoError::taken(UniqueField::Login, user.login.as_str());
            }
        }
    }
    err.into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{open_db_in_memory, share_connection};
    use chrono::NaiveDate;

    fn user(email: &str, login: &str) -> User {
        User::new(
            email,
            login,
            "",
            NaiveDate::from_ymd_opt(2000, 1, 2).unwrap(),
        )
    }

    #[test]
    fn unique_index_failure_maps_to_uniqueness_violation() {
        let conn = open_db_in_memory().unwrap();
        let first = user("a@example.com", "a");
        conn.execute(
            "INSERT INTO user (email, login, name, birthday) VALUES (?1, ?2, ?3, ?4);",
            params![first.email, first.login, first.name, first.birthday],
        )
        .unwrap();

        let duplicate = user("a@example.com", "other");
        let err = conn
            .execute(
                "INSERT INTO user (email, login, name, birthday) VALUES (?1, ?2, ?3, ?4);",
                params![duplicate.email, duplicate.login, duplicate.name, duplicate.birthday],
            )
            .unwrap_err();

        assert!(matches!(
            map_unique_violation(err, &duplicate),
            RepoError::UniquenessViolation {
                field: UniqueField::Email,
                ..
            }
        ));
    }

    #[test]
    fn birthday_round_trips_as_iso_date() {
        let repo = SqliteUserRepository::new(share_connection(open_db_in_memory().unwrap()));
        let created = repo.add_user(&user("a@example.com", "a")).unwrap();

        let conn = lock_connection(&repo.conn).unwrap();
        let stored: String = conn
            .query_row("SELECT birthday FROM user WHERE id = ?1;", [created.id], |row| {
                row.get(0)
            })
            .unwrap();
        assert_eq!(stored, "2000-01-02");
    }
}
