//! Volatile in-process repository backend.
//!
//! # Responsibility
//! - Implement every repository contract over `BTreeMap`s held in memory.
//! - Issue ids through an injected `IdAllocator` per entity store.
//!
//! # Invariants
//! - Each store guards its own collection with exactly one `Mutex`.
//! - Lock order is film store before like/genre stores and friendship store
//!   before user store reads; relation stores never lock an entity store.
//! - Ordered maps keep every listing sorted by id without extra work.

mod films;
mod reference;
mod relations;
mod users;

pub use films::InMemoryFilmRepository;
pub use reference::InMemoryReferenceRepository;
pub use relations::{
    InMemoryFilmGenreRepository, InMemoryFriendshipRepository, InMemoryLikeRepository,
};
pub use users::InMemoryUserRepository;

use crate::repo::error::{RepoError, RepoResult};
use std::sync::{Mutex, MutexGuard};

fn lock<'a, T>(mutex: &'a Mutex<T>, store: &'static str) -> RepoResult<MutexGuard<'a, T>> {
    mutex.lock().map_err(|_| RepoError::LockPoisoned(store))
}
