//! Error taxonomy shared by every repository backend.
//!
//! # Invariants
//! - Both backends report the same variant for the same failure: a missing
//!   row is always `NotFound`, a taken email/login is always
//!   `UniquenessViolation`, whatever the storage engine says natively.

use crate::db::DbError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Kind of entity a lookup was made for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    User,
    Film,
    Mpa,
    Genre,
}

impl EntityKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Film => "film",
            Self::Mpa => "mpa",
            Self::Genre => "genre",
        }
    }
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User field that must be unique across all users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UniqueField {
    Email,
    Login,
}

impl UniqueField {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Login => "login",
        }
    }
}

impl Display for UniqueField {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Repository error for catalog persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    /// Lookup by id found nothing.
    NotFound { kind: EntityKind, id: i64 },
    /// Another user already holds this email or login.
    UniquenessViolation { field: UniqueField, value: String },
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
    /// Persisted row cannot be converted to a valid model.
    InvalidData(String),
    /// In-memory store mutex was poisoned by a panicking writer.
    LockPoisoned(&'static str),
}

impl RepoError {
    pub fn not_found(kind: EntityKind, id: i64) -> Self {
        Self::NotFound { kind, id }
    }

    pub fn taken(field: UniqueField, value: impl Into<String>) -> Self {
        Self::UniquenessViolation {
            field,
            value: value.into(),
        }
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound { kind, id } => write!(f, "{kind} not found: {id}"),
            Self::UniquenessViolation { field, value } => {
                write!(f, "{field} already taken: `{value}`")
            }
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
            Self::LockPoisoned(store) => write!(f, "{store} store lock poisoned"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::NotFound { .. } => None,
            Self::UniquenessViolation { .. } => None,
            Self::InvalidData(_) => None,
            Self::LockPoisoned(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}
