//! Film, like, genre-link and reference repository contracts.
//!
//! # Responsibility
//! - Define the operations every film backend offers.
//! - Keep likes and genre links in their own relation repositories.
//!
//! # Invariants
//! - Film writes fail with `NotFound { kind: Mpa }` for an unknown rating
//!   and `NotFound { kind: Genre }` for an unknown genre.
//! - `update_film` replaces the genre set exactly; likes are untouched.
//! - Popularity order is like count descending, then film id ascending.

use crate::model::film::{Film, FilmId, Genre, GenreId, Mpa, MpaId};
use crate::model::user::UserId;
use crate::repo::error::RepoResult;
use std::collections::BTreeSet;

/// Repository interface for film records.
pub trait FilmRepository: Send + Sync {
    /// Lists all films ordered by id.
    fn list_films(&self) -> RepoResult<Vec<Film>>;
    /// Top `count` films by number of likes.
    fn popular_films(&self, count: usize) -> RepoResult<Vec<Film>>;
    /// Loads one fully hydrated film, failing with `NotFound` when absent.
    fn get_film(&self, id: FilmId) -> RepoResult<Film>;
    /// Stores a new film with its genre links and likes.
    ///
    /// The incoming `id` is ignored.
    fn add_film(&self, film: &Film) -> RepoResult<Film>;
    /// Replaces scalar fields, rating and genre set of an existing film.
    fn update_film(&self, film: &Film) -> RepoResult<Film>;
    /// Removes one film row. Dependent edges are not touched.
    fn delete_film(&self, id: FilmId) -> RepoResult<()>;
    /// Films linked to `genre_id`, ordered by id.
    fn films_by_genre(&self, genre_id: GenreId) -> RepoResult<Vec<Film>>;
}

/// Repository interface for the film -> liking user relation.
pub trait LikeRepository: Send + Sync {
    /// Records that `user_id` liked `film_id`. Re-adding is a no-op.
    fn add_like(&self, film_id: FilmId, user_id: UserId) -> RepoResult<()>;
    /// Removes the like. Removing a missing like is a no-op.
    fn delete_like(&self, film_id: FilmId, user_id: UserId) -> RepoResult<()>;
    /// Users who liked `film_id`.
    fn likers(&self, film_id: FilmId) -> RepoResult<BTreeSet<UserId>>;
    fn remove_all_for_film(&self, film_id: FilmId) -> RepoResult<()>;
    fn remove_all_by_user(&self, user_id: UserId) -> RepoResult<()>;
}

/// Repository interface for the film -> genre relation.
pub trait FilmGenreRepository: Send + Sync {
    /// Links `genre_id` to `film_id`. Re-adding is a no-op.
    fn add_genre(&self, film_id: FilmId, genre_id: GenreId) -> RepoResult<()>;
    /// Unlinks `genre_id`. Removing a missing link is a no-op.
    fn delete_genre(&self, film_id: FilmId, genre_id: GenreId) -> RepoResult<()>;
    /// Genre ids linked to `film_id`.
    fn genre_ids(&self, film_id: FilmId) -> RepoResult<BTreeSet<GenreId>>;
    fn remove_all_for_film(&self, film_id: FilmId) -> RepoResult<()>;
}

/// Read-only access to the closed MPA and genre tables.
pub trait ReferenceRepository: Send + Sync {
    /// All ratings ordered by id.
    fn list_mpa(&self) -> RepoResult<Vec<Mpa>>;
    fn get_mpa(&self, id: MpaId) -> RepoResult<Mpa>;
    /// All genres ordered by id.
    fn list_genres(&self) -> RepoResult<Vec<Genre>>;
    fn get_genre(&self, id: GenreId) -> RepoResult<Genre>;
}
