//! User and friendship repository contracts.
//!
//! # Responsibility
//! - Define the operations every user backend offers, independent of how
//!   rows are stored.
//!
//! # Invariants
//! - `email` and `login` stay unique across all users. `add_user` and
//!   `update_user` enforce this atomically with the write itself.
//! - Friendship edges are directed; `a -> b` says nothing about `b -> a`.
//! - Relation repositories never check that users exist; services do.

use crate::model::user::{User, UserId};
use crate::repo::error::RepoResult;
use std::collections::BTreeSet;

/// Repository interface for user records and friend queries.
pub trait UserRepository: Send + Sync {
    /// Lists all users ordered by id.
    fn list_users(&self) -> RepoResult<Vec<User>>;
    /// Loads one user, failing with `NotFound` when absent.
    fn get_user(&self, id: UserId) -> RepoResult<User>;
    /// Stores a new user under a freshly assigned id and returns it.
    ///
    /// The incoming `id` is ignored.
    fn add_user(&self, user: &User) -> RepoResult<User>;
    /// Replaces every field of an existing user.
    fn update_user(&self, user: &User) -> RepoResult<User>;
    /// Removes one user row. Dependent edges are not touched.
    fn delete_user(&self, id: UserId) -> RepoResult<()>;
    /// Fails with `UniquenessViolation` when another user holds `email`.
    ///
    /// `exclude` skips the user being updated.
    fn ensure_email_available(&self, email: &str, exclude: Option<UserId>) -> RepoResult<()>;
    /// Fails with `UniquenessViolation` when another user holds `login`.
    fn ensure_login_available(&self, login: &str, exclude: Option<UserId>) -> RepoResult<()>;
    /// Users that `id` has added as friends, ordered by id.
    fn list_friends(&self, id: UserId) -> RepoResult<Vec<User>>;
    /// Users both `id` and `other_id` have added as friends, ordered by id.
    fn list_common_friends(&self, id: UserId, other_id: UserId) -> RepoResult<Vec<User>>;
}

/// Repository interface for the directed friendship relation.
pub trait FriendshipRepository: Send + Sync {
    /// Adds edge `user_id -> friend_id`. Re-adding is a no-op.
    fn add_friend(&self, user_id: UserId, friend_id: UserId) -> RepoResult<()>;
    /// Removes edge `user_id -> friend_id`. Removing a missing edge is a no-op.
    fn delete_friend(&self, user_id: UserId, friend_id: UserId) -> RepoResult<()>;
    /// Targets of every edge leaving `user_id`.
    fn friend_ids(&self, user_id: UserId) -> RepoResult<BTreeSet<UserId>>;
    /// Drops every edge where `user_id` is either endpoint.
    fn remove_all_for_user(&self, user_id: UserId) -> RepoResult<()>;
}
