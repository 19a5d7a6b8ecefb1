//! Backend selection and wiring.
//!
//! # Responsibility
//! - Build a complete, consistent set of repositories for one backend.
//! - Hand them out as trait objects so services stay backend-agnostic.

use crate::config::StorageConfig;
use crate::db::{open_db, open_db_in_memory, share_connection, DbResult};
use crate::repo::film_repo::{
    FilmGenreRepository, FilmRepository, LikeRepository, ReferenceRepository,
};
use crate::repo::id_allocator::IdAllocator;
use crate::repo::memory::{
    InMemoryFilmGenreRepository, InMemoryFilmRepository, InMemoryFriendshipRepository,
    InMemoryLikeRepository, InMemoryReferenceRepository, InMemoryUserRepository,
};
use crate::repo::sqlite::{
    SqliteFilmGenreRepository, SqliteFilmRepository, SqliteFriendshipRepository,
    SqliteLikeRepository, SqliteReferenceRepository, SqliteUserRepository,
};
use crate::repo::user_repo::{FriendshipRepository, UserRepository};
use log::info;
use rusqlite::Connection;
use std::sync::Arc;

/// One backend's repositories, ready to be shared across threads.
#[derive(Clone)]
pub struct Stores {
    pub users: Arc<dyn UserRepository>,
    pub friendships: Arc<dyn FriendshipRepository>,
    pub films: Arc<dyn FilmRepository>,
    pub likes: Arc<dyn LikeRepository>,
    pub film_genres: Arc<dyn FilmGenreRepository>,
    pub reference: Arc<dyn ReferenceRepository>,
    backend: &'static str,
}

impl Stores {
    /// Fresh volatile stores with their own id allocators.
    pub fn in_memory() -> Self {
        let friendships = Arc::new(InMemoryFriendshipRepository::new());
        let likes = Arc::new(InMemoryLikeRepository::new());
        let film_genres = Arc::new(InMemoryFilmGenreRepository::new());
        let reference = Arc::new(InMemoryReferenceRepository::seeded());

        let users = Arc::new(InMemoryUserRepository::new(
            IdAllocator::new(),
            Arc::clone(&friendships),
        ));
        let films = Arc::new(InMemoryFilmRepository::new(
            IdAllocator::new(),
            Arc::clone(&likes),
            Arc::clone(&film_genres),
            Arc::clone(&reference),
        ));

        Self {
            users,
            friendships,
            films,
            likes,
            film_genres,
            reference,
            backend: "memory",
        }
    }

    /// SQLite stores over one migrated connection.
    pub fn sqlite(conn: Connection) -> Self {
        let shared = share_connection(conn);
        Self {
            users: Arc::new(SqliteUserRepository::new(Arc::clone(&shared))),
            friendships: Arc::new(SqliteFriendshipRepository::new(Arc::clone(&shared))),
            films: Arc::new(SqliteFilmRepository::new(Arc::clone(&shared))),
            likes: Arc::new(SqliteLikeRepository::new(Arc::clone(&shared))),
            film_genres: Arc::new(SqliteFilmGenreRepository::new(Arc::clone(&shared))),
            reference: Arc::new(SqliteReferenceRepository::new(shared)),
            backend: "sqlite",
        }
    }

    /// SQLite stores over a private in-memory database.
    pub fn sqlite_in_memory() -> DbResult<Self> {
        Ok(Self::sqlite(open_db_in_memory()?))
    }

    /// Builds the backend named by `config`.
    pub fn open(config: &StorageConfig) -> DbResult<Self> {
        let stores = match config {
            StorageConfig::Memory => Self::in_memory(),
            StorageConfig::Sqlite { path } => Self::sqlite(open_db(path)?),
        };
        info!(
            "event=stores_open module=repo status=ok backend={}",
            stores.backend
        );
        Ok(stores)
    }

    /// `memory` or `sqlite`.
    pub fn backend_name(&self) -> &'static str {
        self.backend
    }
}

impl std::fmt::Debug for Stores {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stores")
            .field("backend", &self.backend)
            .finish_non_exhaustive()
    }
}
