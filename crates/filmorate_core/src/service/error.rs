//! Service-level error taxonomy.

use crate::repo::error::{EntityKind, RepoError, UniqueField};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Errors returned to transport layers.
///
/// `NotFound` and `UniquenessViolation` are passed through unchanged from
/// the repositories; everything else a repository reports stays wrapped in
/// `Repo`.
#[derive(Debug)]
pub enum ServiceError {
    /// Caller broke the id-assignment policy or another structural rule.
    InvalidRequest(String),
    NotFound {
        kind: EntityKind,
        id: i64,
    },
    UniquenessViolation {
        field: UniqueField,
        value: String,
    },
    /// Storage failure.
    Repo(RepoError),
}

impl ServiceError {
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidRequest(reason.into())
    }
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidRequest(reason) => write!(f, "invalid request: {reason}"),
            Self::NotFound { kind, id } => write!(f, "{kind} not found: {id}"),
            Self::UniquenessViolation { field, value } => {
                write!(f, "{field} already taken: `{value}`")
            }
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound { kind, id } => Self::NotFound { kind, id },
            RepoError::UniquenessViolation { field, value } => {
                Self::UniquenessViolation { field, value }
            }
            other => Self::Repo(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbError;

    #[test]
    fn semantic_repo_errors_pass_through() {
        let err: ServiceError = RepoError::not_found(EntityKind::Mpa, 9).into();
        assert!(matches!(
            err,
            ServiceError::NotFound {
                kind: EntityKind::Mpa,
                id: 9
            }
        ));
        assert_eq!(err.to_string(), "mpa not found: 9");

        let err: ServiceError = RepoError::taken(UniqueField::Email, "a@b.c").into();
        assert_eq!(err.to_string(), "email already taken: `a@b.c`");
    }

    #[test]
    fn storage_errors_stay_wrapped() {
        let err: ServiceError = RepoError::Db(DbError::UnsupportedSchemaVersion {
            db_version: 9,
            latest_supported: 2,
        })
        .into();
        assert!(matches!(err, ServiceError::Repo(RepoError::Db(_))));
        assert!(err.source().is_some());
    }
}
