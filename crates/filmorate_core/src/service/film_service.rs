//! Film use-case service.
//!
//! # Responsibility
//! - Create, update, read and delete films.
//! - Manage likes between existing films and users.
//! - Expose the MPA and genre reference tables.
//!
//! # Invariants
//! - Create requests never carry an id; update requests always do.
//! - Likes sent with a new film must name existing users. A liker deleted
//!   while the film is being stored is dropped from the result.
//! - Deleting a film removes the film row first and then its likes and
//!   genre links.
//! - A new like is re-confirmed against its film and user after the insert
//!   and withdrawn if either was deleted meanwhile.

use crate::model::film::{Film, FilmId, Genre, GenreId, Mpa, MpaId};
use crate::model::user::UserId;
use crate::repo::error::RepoError;
use crate::repo::film_repo::{
    FilmGenreRepository, FilmRepository, LikeRepository, ReferenceRepository,
};
use crate::repo::stores::Stores;
use crate::repo::user_repo::UserRepository;
use crate::service::error::{ServiceError, ServiceResult};
use log::{info, warn};
use std::sync::Arc;

/// Number of films returned by the popularity ranking when none is given.
pub const DEFAULT_POPULAR_COUNT: usize = 10;

/// Film service facade over repository implementations.
#[derive(Clone)]
pub struct FilmService {
    films: Arc<dyn FilmRepository>,
    likes: Arc<dyn LikeRepository>,
    film_genres: Arc<dyn FilmGenreRepository>,
    users: Arc<dyn UserRepository>,
    reference: Arc<dyn ReferenceRepository>,
}

impl FilmService {
    pub fn new(
        films: Arc<dyn FilmRepository>,
        likes: Arc<dyn LikeRepository>,
        film_genres: Arc<dyn FilmGenreRepository>,
        users: Arc<dyn UserRepository>,
        reference: Arc<dyn ReferenceRepository>,
    ) -> Self {
        Self {
            films,
            likes,
            film_genres,
            users,
            reference,
        }
    }

    /// Creates a service over one backend's repositories.
    pub fn from_stores(stores: &Stores) -> Self {
        Self::new(
            Arc::clone(&stores.films),
            Arc::clone(&stores.likes),
            Arc::clone(&stores.film_genres),
            Arc::clone(&stores.users),
            Arc::clone(&stores.reference),
        )
    }

    pub fn get_films_list(&self) -> ServiceResult<Vec<Film>> {
        Ok(self.films.list_films()?)
    }

    pub fn get_film_by_id(&self, id: FilmId) -> ServiceResult<Film> {
        Ok(self.films.get_film(id)?)
    }

    /// Most liked films, `DEFAULT_POPULAR_COUNT` of them unless `count` is set.
    pub fn get_popular_films(&self, count: Option<usize>) -> ServiceResult<Vec<Film>> {
        Ok(self
            .films
            .popular_films(count.unwrap_or(DEFAULT_POPULAR_COUNT))?)
    }

    pub fn get_films_by_genre(&self, genre_id: GenreId) -> ServiceResult<Vec<Film>> {
        Ok(self.films.films_by_genre(genre_id)?)
    }

    /// Stores a new film and returns it with its assigned id.
    pub fn create_film(&self, film: Film) -> ServiceResult<Film> {
        if film.has_id() {
            return Err(reject(
                "film_create",
                "film id is assigned automatically and must not be sent",
            ));
        }
        for user_id in &film.likes {
            self.users.get_user(*user_id)?;
        }

        let mut created = self.films.add_film(&film)?;
        for user_id in &film.likes {
            match self.users.get_user(*user_id) {
                Ok(_) => {}
                Err(RepoError::NotFound { .. }) => {
                    self.likes.delete_like(created.id, *user_id)?;
                    created.likes.remove(user_id);
                }
                Err(err) => return Err(err.into()),
            }
        }
        info!(
            "event=film_create module=service status=ok film_id={}",
            created.id
        );
        Ok(created)
    }

    /// Replaces an existing film, including its full genre set.
    pub fn update_film(&self, film: Film) -> ServiceResult<Film> {
        if !film.has_id() {
            return Err(reject("film_update", "film id is required for update"));
        }
        self.films.get_film(film.id)?;

        let updated = self.films.update_film(&film)?;
        info!(
            "event=film_update module=service status=ok film_id={}",
            updated.id
        );
        Ok(updated)
    }

    /// Deletes a film together with its likes and genre links.
    pub fn delete_film(&self, id: FilmId) -> ServiceResult<()> {
        self.films.delete_film(id)?;
        self.likes.remove_all_for_film(id)?;
        self.film_genres.remove_all_for_film(id)?;
        info!("event=film_delete module=service status=ok film_id={id}");
        Ok(())
    }

    pub fn add_like(&self, film_id: FilmId, user_id: UserId) -> ServiceResult<()> {
        self.ensure_like_pair(film_id, user_id)?;
        self.likes.add_like(film_id, user_id)?;

        if let Err(err) = self.ensure_like_pair(film_id, user_id) {
            self.likes.delete_like(film_id, user_id)?;
            warn!("event=like_add module=service status=withdrawn film_id={film_id} user_id={user_id}");
            return Err(err);
        }
        Ok(())
    }

    pub fn delete_like(&self, film_id: FilmId, user_id: UserId) -> ServiceResult<()> {
        self.ensure_like_pair(film_id, user_id)?;
        self.likes.delete_like(film_id, user_id)?;
        Ok(())
    }

    pub fn list_mpa(&self) -> ServiceResult<Vec<Mpa>> {
        Ok(self.reference.list_mpa()?)
    }

    pub fn get_mpa(&self, id: MpaId) -> ServiceResult<Mpa> {
        Ok(self.reference.get_mpa(id)?)
    }

    pub fn list_genres(&self) -> ServiceResult<Vec<Genre>> {
        Ok(self.reference.list_genres()?)
    }

    pub fn get_genre(&self, id: GenreId) -> ServiceResult<Genre> {
        Ok(self.reference.get_genre(id)?)
    }

    fn ensure_like_pair(&self, film_id: FilmId, user_id: UserId) -> ServiceResult<()> {
        self.films.get_film(film_id)?;
        self.users.get_user(user_id)?;
        Ok(())
    }
}

fn reject(event: &'static str, reason: &str) -> ServiceError {
    warn!("event={event} module=service status=rejected reason={reason:?}");
    ServiceError::invalid(reason)
}
