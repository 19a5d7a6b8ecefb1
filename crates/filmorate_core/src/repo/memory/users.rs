//! In-memory user store.

use super::lock;
use super::relations::InMemoryFriendshipRepository;
use crate::model::user::{User, UserId};
use crate::repo::error::{EntityKind, RepoError, RepoResult, UniqueField};
use crate::repo::id_allocator::IdAllocator;
use crate::repo::user_repo::{FriendshipRepository, UserRepository};
use log::{info, warn};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

const STORE: &str = "user";

/// In-memory user records plus friend queries over the friendship relation.
#[derive(Debug)]
pub struct InMemoryUserRepository {
    users: Mutex<BTreeMap<UserId, User>>,
    ids: IdAllocator,
    friendships: Arc<InMemoryFriendshipRepository>,
}

impl InMemoryUserRepository {
    pub fn new(ids: IdAllocator, friendships: Arc<InMemoryFriendshipRepository>) -> Self {
        Self {
            users: Mutex::new(BTreeMap::new()),
            ids,
            friendships,
        }
    }

    fn users_by_ids(&self, ids: impl IntoIterator<Item = UserId>) -> RepoResult<Vec<User>> {
        let users = lock(&self.users, STORE)?;
        Ok(ids
            .into_iter()
            .filter_map(|id| users.get(&id).cloned())
            .collect())
    }
}

impl UserRepository for InMemoryUserRepository {
    fn list_users(&self) -> RepoResult<Vec<User>> {
        let users = lock(&self.users, STORE)?;
        Ok(users.values().cloned().collect())
    }

    fn get_user(&self, id: UserId) -> RepoResult<User> {
        let users = lock(&self.users, STORE)?;
        users.get(&id).cloned().ok_or_else(|| {
            warn!("event=user_get module=repo backend=memory status=not_found user_id={id}");
            RepoError::not_found(EntityKind::User, id)
        })
    }

    fn add_user(&self, user: &User) -> RepoResult<User> {
        let mut users = lock(&self.users, STORE)?;
        check_unique(&users, UniqueField::Email, &user.email, None)?;
        check_unique(&users, UniqueField::Login, &user.login, None)?;

        let mut created = user.clone();
        created.id = self.ids.next_id();
        users.insert(created.id, created.clone());

        info!(
            "event=user_add module=repo backend=memory status=ok user_id={}",
            created.id
        );
        Ok(created)
    }

    fn update_user(&self, user: &User) -> RepoResult<User> {
        let mut users = lock(&self.users, STORE)?;
        if !users.contains_key(&user.id) {
            return Err(RepoError::not_found(EntityKind::User, user.id));
        }
        check_unique(&users, UniqueField::Email, &user.email, Some(user.id))?;
        check_unique(&users, UniqueField::Login, &user.login, Some(user.id))?;

        users.insert(user.id, user.clone());
        info!(
            "event=user_update module=repo backend=memory status=ok user_id={}",
            user.id
        );
        Ok(user.clone())
    }

    fn delete_user(&self, id: UserId) -> RepoResult<()> {
        let mut users = lock(&self.users, STORE)?;
        if users.remove(&id).is_none() {
            return Err(RepoError::not_found(EntityKind::User, id));
        }
        info!("event=user_delete module=repo backend=memory status=ok user_id={id}");
        Ok(())
    }

    fn ensure_email_available(&self, email: &str, exclude: Option<UserId>) -> RepoResult<()> {
        let users = lock(&self.users, STORE)?;
        check_unique(&users, UniqueField::Email, email, exclude)
    }

    fn ensure_login_available(&self, login: &str, exclude: Option<UserId>) -> RepoResult<()> {
        let users = lock(&self.users, STORE)?;
        check_unique(&users, UniqueField::Login, login, exclude)
    }

    fn list_friends(&self, id: UserId) -> RepoResult<Vec<User>> {
        let friend_ids = self.friendships.friend_ids(id)?;
        self.users_by_ids(friend_ids)
    }

    fn list_common_friends(&self, id: UserId, other_id: UserId) -> RepoResult<Vec<User>> {
        let own = self.friendships.friend_ids(id)?;
        let other = self.friendships.friend_ids(other_id)?;
        self.users_by_ids(own.intersection(&other).copied())
    }
}

fn check_unique(
    users: &BTreeMap<UserId, User>,
    field: UniqueField,
    candidate: &str,
    exclude: Option<UserId>,
) -> RepoResult<()> {
    let taken = users.values().any(|existing| {
        let value = match field {
            UniqueField::Email => existing.email.as_str(),
            UniqueField::Login => existing.login.as_str(),
        };
        value == candidate && Some(existing.id) != exclude
    });

    if taken {
        warn!("event=user_unique module=repo backend=memory status=conflict field={field}");
        return Err(RepoError::taken(field, candidate));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn repo() -> InMemoryUserRepository {
        InMemoryUserRepository::new(
            IdAllocator::new(),
            Arc::new(InMemoryFriendshipRepository::new()),
        )
    }

    fn user(email: &str, login: &str) -> User {
        User::new(
            email,
            login,
            "Name",
            NaiveDate::from_ymd_opt(1990, 5, 17).unwrap(),
        )
    }

    #[test]
    fn add_user_ignores_incoming_id() {
        let repo = repo();
        let mut request = user("a@example.com", "a");
        request.id = 42;

        let created = repo.add_user(&request).unwrap();
        assert_eq!(created.id, 1);
        assert!(repo.get_user(42).is_err());
    }

    #[test]
    fn update_may_keep_own_email_and_login() {
        let repo = repo();
        let mut created = repo.add_user(&user("a@example.com", "a")).unwrap();
        created.name = "Renamed".to_string();

        let updated = repo.update_user(&created).unwrap();
        assert_eq!(updated.name, "Renamed");
    }

    #[test]
    fn update_rejects_login_of_another_user() {
        let repo = repo();
        repo.add_user(&user("a@example.com", "a")).unwrap();
        let mut second = repo.add_user(&user("b@example.com", "b")).unwrap();
        second.login = "a".to_string();

        let err = repo.update_user(&second).unwrap_err();
        assert!(matches!(
            err,
            RepoError::UniquenessViolation { field: UniqueField::Login, ref value } if value == "a"
        ));
        assert_eq!(repo.get_user(second.id).unwrap().login, "b");
    }

    #[test]
    fn uniqueness_is_case_sensitive() {
        let repo = repo();
        repo.add_user(&user("a@example.com", "a")).unwrap();
        repo.add_user(&user("A@example.com", "A")).unwrap();
        assert_eq!(repo.list_users().unwrap().len(), 2);
    }
}
