//! Domain and storage core for the Filmorate film catalog.
//!
//! Users, films, friendships and likes live behind repository traits with an
//! in-memory and a SQLite implementation. Services on top enforce identity,
//! existence and uniqueness rules the same way for both backends.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{ConfigError, CoreConfig, StorageConfig};
pub use logging::{default_log_level, init_from_config, init_logging, logging_status};
pub use model::film::{Film, FilmId, Genre, GenreId, Mpa, MpaId};
pub use model::user::{User, UserId};
pub use model::UNASSIGNED_ID;
pub use repo::error::{EntityKind, RepoError, RepoResult, UniqueField};
pub use repo::stores::Stores;
pub use service::error::{ServiceError, ServiceResult};
pub use service::film_service::{FilmService, DEFAULT_POPULAR_COUNT};
pub use service::user_service::UserService;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
