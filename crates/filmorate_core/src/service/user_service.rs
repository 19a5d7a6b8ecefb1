//! User use-case service.
//!
//! # Responsibility
//! - Create, update, read and delete users.
//! - Manage one-sided friendship edges between existing users.
//!
//! # Invariants
//! - Create requests never carry an id; update requests always do.
//! - A blank display name on create becomes the login.
//! - Uniqueness is re-checked on update only for fields that changed.
//! - A user cannot befriend themselves.
//! - Deleting a user removes the user row first and then every friendship
//!   edge touching them and every like they gave.
//! - A new friendship edge is re-confirmed against both users after the
//!   insert and withdrawn if either was deleted meanwhile. Together with the
//!   delete order above, no edge outlives its user.

use crate::model::user::{User, UserId};
use crate::repo::film_repo::LikeRepository;
use crate::repo::stores::Stores;
use crate::repo::user_repo::{FriendshipRepository, UserRepository};
use crate::service::error::{ServiceError, ServiceResult};
use log::{info, warn};
use std::sync::Arc;

/// User service facade over repository implementations.
#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UserRepository>,
    friendships: Arc<dyn FriendshipRepository>,
    likes: Arc<dyn LikeRepository>,
}

impl UserService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        friendships: Arc<dyn FriendshipRepository>,
        likes: Arc<dyn LikeRepository>,
    ) -> Self {
        Self {
            users,
            friendships,
            likes,
        }
    }

    /// Creates a service over one backend's repositories.
    pub fn from_stores(stores: &Stores) -> Self {
        Self::new(
            Arc::clone(&stores.users),
            Arc::clone(&stores.friendships),
            Arc::clone(&stores.likes),
        )
    }

    pub fn get_users_list(&self) -> ServiceResult<Vec<User>> {
        Ok(self.users.list_users()?)
    }

    pub fn get_user_by_id(&self, id: UserId) -> ServiceResult<User> {
        Ok(self.users.get_user(id)?)
    }

    /// Stores a new user and returns it with its assigned id.
    pub fn create_user(&self, mut user: User) -> ServiceResult<User> {
        if user.has_id() {
            return Err(reject(
                "user_create",
                "user id is assigned automatically and must not be sent",
            ));
        }
        user.default_name_to_login();

        let created = self.users.add_user(&user)?;
        info!(
            "event=user_create module=service status=ok user_id={}",
            created.id
        );
        Ok(created)
    }

    /// Replaces an existing user.
    pub fn update_user(&self, user: User) -> ServiceResult<User> {
        if !user.has_id() {
            return Err(reject("user_update", "user id is required for update"));
        }

        let current = self.users.get_user(user.id)?;
        if current.email != user.email {
            self.users
                .ensure_email_available(&user.email, Some(user.id))?;
        }
        if current.login != user.login {
            self.users
                .ensure_login_available(&user.login, Some(user.id))?;
        }

        let updated = self.users.update_user(&user)?;
        info!(
            "event=user_update module=service status=ok user_id={}",
            updated.id
        );
        Ok(updated)
    }

    /// Deletes a user together with the edges that reference them.
    pub fn delete_user(&self, id: UserId) -> ServiceResult<()> {
        self.users.delete_user(id)?;
        self.friendships.remove_all_for_user(id)?;
        self.likes.remove_all_by_user(id)?;
        info!("event=user_delete module=service status=ok user_id={id}");
        Ok(())
    }

    /// Adds the one-sided edge `id -> friend_id`.
    pub fn add_friend(&self, id: UserId, friend_id: UserId) -> ServiceResult<()> {
        self.ensure_friend_pair(id, friend_id, "friend_add")?;
        self.friendships.add_friend(id, friend_id)?;

        if let Err(err) = self.ensure_users_exist(id, friend_id) {
            self.friendships.delete_friend(id, friend_id)?;
            warn!("event=friend_add module=service status=withdrawn user_id={id} friend_id={friend_id}");
            return Err(err);
        }
        Ok(())
    }

    /// Removes the one-sided edge `id -> friend_id`.
    pub fn delete_friend(&self, id: UserId, friend_id: UserId) -> ServiceResult<()> {
        self.ensure_friend_pair(id, friend_id, "friend_delete")?;
        self.friendships.delete_friend(id, friend_id)?;
        Ok(())
    }

    pub fn get_friends_list_by_id(&self, id: UserId) -> ServiceResult<Vec<User>> {
        self.users.get_user(id)?;
        Ok(self.users.list_friends(id)?)
    }

    pub fn get_common_friends(&self, id: UserId, other_id: UserId) -> ServiceResult<Vec<User>> {
        self.ensure_users_exist(id, other_id)?;
        Ok(self.users.list_common_friends(id, other_id)?)
    }

    fn ensure_friend_pair(
        &self,
        id: UserId,
        friend_id: UserId,
        event: &'static str,
    ) -> ServiceResult<()> {
        if id == friend_id {
            return Err(reject(event, "a user cannot be their own friend"));
        }
        self.ensure_users_exist(id, friend_id)
    }

    fn ensure_users_exist(&self, id: UserId, other_id: UserId) -> ServiceResult<()> {
        self.users.get_user(id)?;
        self.users.get_user(other_id)?;
        Ok(())
    }
}

fn reject(event: &'static str, reason: &str) -> ServiceError {
    warn!("event={event} module=service status=rejected reason={reason:?}");
    ServiceError::invalid(reason)
}
