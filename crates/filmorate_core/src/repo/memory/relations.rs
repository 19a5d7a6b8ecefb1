//! In-memory friendship, like and film-genre relations.

use super::lock;
use crate::model::film::{FilmId, GenreId};
use crate::model::user::UserId;
use crate::repo::error::RepoResult;
use crate::repo::film_repo::{FilmGenreRepository, LikeRepository};
use crate::repo::user_repo::FriendshipRepository;
use log::info;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Mutex;

/// Directed adjacency sets keyed by source id.
///
/// Sources with no remaining targets are dropped from the map.
#[derive(Debug)]
struct EdgeSet {
    store: &'static str,
    edges: Mutex<BTreeMap<i64, BTreeSet<i64>>>,
}

impl EdgeSet {
    fn new(store: &'static str) -> Self {
        Self {
            store,
            edges: Mutex::new(BTreeMap::new()),
        }
    }

    fn insert(&self, source: i64, target: i64) -> RepoResult<bool> {
        let mut edges = lock(&self.edges, self.store)?;
        Ok(edges.entry(source).or_default().insert(target))
    }

    fn remove(&self, source: i64, target: i64) -> RepoResult<bool> {
        let mut edges = lock(&self.edges, self.store)?;
        let Some(targets) = edges.get_mut(&source) else {
            return Ok(false);
        };
        let removed = targets.remove(&target);
        if targets.is_empty() {
            edges.remove(&source);
        }
        Ok(removed)
    }

    fn targets(&self, source: i64) -> RepoResult<BTreeSet<i64>> {
        let edges = lock(&self.edges, self.store)?;
        Ok(edges.get(&source).cloned().unwrap_or_default())
    }

    fn sources_of(&self, target: i64) -> RepoResult<BTreeSet<i64>> {
        let edges = lock(&self.edges, self.store)?;
        Ok(edges
            .iter()
            .filter(|(_, targets)| targets.contains(&target))
            .map(|(source, _)| *source)
            .collect())
    }

    /// Each `remove_*` returns how many edges it dropped.
    fn remove_source(&self, source: i64) -> RepoResult<usize> {
        let mut edges = lock(&self.edges, self.store)?;
        Ok(edges.remove(&source).map_or(0, |targets| targets.len()))
    }

    fn remove_target(&self, target: i64) -> RepoResult<usize> {
        let mut edges = lock(&self.edges, self.store)?;
        Ok(drop_target(&mut edges, target))
    }

    /// Drops `id` as source and as target under a single guard.
    fn remove_endpoint(&self, id: i64) -> RepoResult<usize> {
        let mut edges = lock(&self.edges, self.store)?;
        let outgoing = edges.remove(&id).map_or(0, |targets| targets.len());
        Ok(outgoing + drop_target(&mut edges, id))
    }
}

fn drop_target(edges: &mut BTreeMap<i64, BTreeSet<i64>>, target: i64) -> usize {
    let mut removed = 0;
    edges.retain(|_, targets| {
        if targets.remove(&target) {
            removed += 1;
        }
        !targets.is_empty()
    });
    removed
}

/// In-memory directed friendship relation.
#[derive(Debug)]
pub struct InMemoryFriendshipRepository {
    edges: EdgeSet,
}

impl InMemoryFriendshipRepository {
    pub fn new() -> Self {
        Self {
            edges: EdgeSet::new("friendship"),
        }
    }
}

impl Default for InMemoryFriendshipRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl FriendshipRepository for InMemoryFriendshipRepository {
    fn add_friend(&self, user_id: UserId, friend_id: UserId) -> RepoResult<()> {
        let added = self.edges.insert(user_id, friend_id)?;
        info!(
            "event=friend_add module=repo backend=memory status=ok user_id={user_id} friend_id={friend_id} changed={added}"
        );
        Ok(())
    }

    fn delete_friend(&self, user_id: UserId, friend_id: UserId) -> RepoResult<()> {
        let removed = self.edges.remove(user_id, friend_id)?;
        info!(
            "event=friend_delete module=repo backend=memory status=ok user_id={user_id} friend_id={friend_id} changed={removed}"
        );
        Ok(())
    }

    fn friend_ids(&self, user_id: UserId) -> RepoResult<BTreeSet<UserId>> {
        self.edges.targets(user_id)
    }

    fn remove_all_for_user(&self, user_id: UserId) -> RepoResult<()> {
        let removed = self.edges.remove_endpoint(user_id)?;
        info!("event=friend_purge module=repo backend=memory status=ok user_id={user_id} removed={removed}");
        Ok(())
    }
}

/// In-memory film -> liking user relation.
#[derive(Debug)]
pub struct InMemoryLikeRepository {
    edges: EdgeSet,
}

impl InMemoryLikeRepository {
    pub fn new() -> Self {
        Self {
            edges: EdgeSet::new("film_like"),
        }
    }
}

impl Default for InMemoryLikeRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl LikeRepository for InMemoryLikeRepository {
    fn add_like(&self, film_id: FilmId, user_id: UserId) -> RepoResult<()> {
        let added = self.edges.insert(film_id, user_id)?;
        info!(
            "event=like_add module=repo backend=memory status=ok film_id={film_id} user_id={user_id} changed={added}"
        );
        Ok(())
    }

    fn delete_like(&self, film_id: FilmId, user_id: UserId) -> RepoResult<()> {
        let removed = self.edges.remove(film_id, user_id)?;
        info!(
            "event=like_delete module=repo backend=memory status=ok film_id={film_id} user_id={user_id} changed={removed}"
        );
        Ok(())
    }

    fn likers(&self, film_id: FilmId) -> RepoResult<BTreeSet<UserId>> {
        self.edges.targets(film_id)
    }

    fn remove_all_for_film(&self, film_id: FilmId) -> RepoResult<()> {
        let removed = self.edges.remove_source(film_id)?;
        info!("event=like_purge module=repo backend=memory status=ok film_id={film_id} removed={removed}");
        Ok(())
    }

    fn remove_all_by_user(&self, user_id: UserId) -> RepoResult<()> {
        let removed = self.edges.remove_target(user_id)?;
        info!("event=like_purge module=repo backend=memory status=ok user_id={user_id} removed={removed}");
        Ok(())
    }
}

/// In-memory film -> genre relation.
#[derive(Debug)]
pub struct InMemoryFilmGenreRepository {
    edges: EdgeSet,
}

impl InMemoryFilmGenreRepository {
    pub fn new() -> Self {
        Self {
            edges: EdgeSet::new("film_genre"),
        }
    }

    /// Films linked to `genre_id`.
    pub fn film_ids_with_genre(&self, genre_id: GenreId) -> RepoResult<BTreeSet<FilmId>> {
        self.edges.sources_of(genre_id)
    }
}

impl Default for InMemoryFilmGenreRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl FilmGenreRepository for InMemoryFilmGenreRepository {
    fn add_genre(&self, film_id: FilmId, genre_id: GenreId) -> RepoResult<()> {
        let added = self.edges.insert(film_id, genre_id)?;
        info!(
            "event=film_genre_add module=repo backend=memory status=ok film_id={film_id} genre_id={genre_id} changed={added}"
        );
        Ok(())
    }

    fn delete_genre(&self, film_id: FilmId, genre_id: GenreId) -> RepoResult<()> {
        let removed = self.edges.remove(film_id, genre_id)?;
        info!(
            "event=film_genre_delete module=repo backend=memory status=ok film_id={film_id} genre_id={genre_id} changed={removed}"
        );
        Ok(())
    }

    fn genre_ids(&self, film_id: FilmId) -> RepoResult<BTreeSet<GenreId>> {
        self.edges.targets(film_id)
    }

    fn remove_all_for_film(&self, film_id: FilmId) -> RepoResult<()> {
        let removed = self.edges.remove_source(film_id)?;
        info!("event=film_genre_purge module=repo backend=memory status=ok film_id={film_id} removed={removed}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn friendship_edges_are_directed_and_idempotent() {
        let repo = InMemoryFriendshipRepository::new();
        repo.add_friend(1, 2).unwrap();
        repo.add_friend(1, 2).unwrap();

        assert_eq!(repo.friend_ids(1).unwrap(), BTreeSet::from([2]));
        assert!(repo.friend_ids(2).unwrap().is_empty());

        repo.delete_friend(1, 2).unwrap();
        repo.delete_friend(1, 2).unwrap();
        assert!(repo.friend_ids(1).unwrap().is_empty());
    }

    #[test]
    fn removing_user_drops_edges_in_both_directions() {
        let repo = InMemoryFriendshipRepository::new();
        repo.add_friend(1, 2).unwrap();
        repo.add_friend(2, 1).unwrap();
        repo.add_friend(3, 2).unwrap();
        repo.add_friend(3, 1).unwrap();

        repo.remove_all_for_user(2).unwrap();

        assert_eq!(repo.friend_ids(1).unwrap(), BTreeSet::new());
        assert!(repo.friend_ids(2).unwrap().is_empty());
        assert_eq!(repo.friend_ids(3).unwrap(), BTreeSet::from([1]));
    }

    #[test]
    fn likes_can_be_purged_by_film_or_by_user() {
        let repo = InMemoryLikeRepository::new();
        repo.add_like(10, 1).unwrap();
        repo.add_like(10, 2).unwrap();
        repo.add_like(11, 2).unwrap();

        repo.remove_all_by_user(2).unwrap();
        assert_eq!(repo.likers(10).unwrap(), BTreeSet::from([1]));
        assert!(repo.likers(11).unwrap().is_empty());

        repo.remove_all_for_film(10).unwrap();
        assert!(repo.likers(10).unwrap().is_empty());
    }

    #[test]
    fn genre_links_support_reverse_lookup() {
        let repo = InMemoryFilmGenreRepository::new();
        repo.add_genre(1, 2).unwrap();
        repo.add_genre(3, 2).unwrap();
        repo.add_genre(3, 4).unwrap();

        assert_eq!(repo.film_ids_with_genre(2).unwrap(), BTreeSet::from([1, 3]));
        repo.delete_genre(3, 2).unwrap();
        assert_eq!(repo.film_ids_with_genre(2).unwrap(), BTreeSet::from([1]));
        assert_eq!(repo.genre_ids(3).unwrap(), BTreeSet::from([4]));
    }

    #[test]
    fn purges_report_how_many_edges_they_dropped() {
        let edges = EdgeSet::new("test");
        edges.insert(1, 2).unwrap();
        edges.insert(2, 1).unwrap();
        edges.insert(3, 1).unwrap();
        edges.insert(3, 4).unwrap();

        assert_eq!(edges.remove_endpoint(1).unwrap(), 3);
        assert_eq!(edges.remove_target(9).unwrap(), 0);
        assert_eq!(edges.remove_source(3).unwrap(), 1);
        assert!(edges.targets(3).unwrap().is_empty());
    }
}
