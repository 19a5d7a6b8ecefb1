//! In-memory film store.
//!
//! Film rows hold scalar fields only. Genres and likes are kept by the
//! relation stores and joined back in on every read.

use super::lock;
use super::reference::InMemoryReferenceRepository;
use super::relations::{InMemoryFilmGenreRepository, InMemoryLikeRepository};
use crate::model::film::{Film, FilmId, GenreId, MpaId};
use crate::repo::error::{EntityKind, RepoError, RepoResult};
use crate::repo::film_repo::{
    FilmGenreRepository, FilmRepository, LikeRepository, ReferenceRepository,
};
use crate::repo::id_allocator::IdAllocator;
use chrono::NaiveDate;
use log::{info, warn};
use std::cmp::Reverse;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

const STORE: &str = "film";

#[derive(Debug, Clone)]
struct FilmRow {
    id: FilmId,
    name: String,
    description: String,
    release_date: NaiveDate,
    duration: u32,
    mpa_id: MpaId,
}

impl FilmRow {
    fn from_film(id: FilmId, film: &Film) -> Self {
        Self {
            id,
            name: film.name.clone(),
            description: film.description.clone(),
            release_date: film.release_date,
            duration: film.duration,
            mpa_id: film.mpa.id,
        }
    }
}

/// In-memory film records delegating likes and genre links to relation stores.
#[derive(Debug)]
pub struct InMemoryFilmRepository {
    films: Mutex<BTreeMap<FilmId, FilmRow>>,
    ids: IdAllocator,
    likes: Arc<InMemoryLikeRepository>,
    genres: Arc<InMemoryFilmGenreRepository>,
    reference: Arc<InMemoryReferenceRepository>,
}

impl InMemoryFilmRepository {
    pub fn new(
        ids: IdAllocator,
        likes: Arc<InMemoryLikeRepository>,
        genres: Arc<InMemoryFilmGenreRepository>,
        reference: Arc<InMemoryReferenceRepository>,
    ) -> Self {
        Self {
            films: Mutex::new(BTreeMap::new()),
            ids,
            likes,
            genres,
            reference,
        }
    }

    fn ensure_references(&self, film: &Film) -> RepoResult<()> {
        if let Err(err) = self.reference.get_mpa(film.mpa.id) {
            warn!(
                "event=film_refs module=repo backend=memory status=not_found mpa_id={}",
                film.mpa.id
            );
            return Err(err);
        }
        for genre_id in film.genre_ids() {
            self.reference.get_genre(genre_id)?;
        }
        Ok(())
    }

    fn hydrate(&self, row: &FilmRow) -> RepoResult<Film> {
        let genres = self
            .genres
            .genre_ids(row.id)?
            .into_iter()
            .map(|genre_id| self.reference.get_genre(genre_id))
            .collect::<RepoResult<Vec<_>>>()?;

        Ok(Film {
            id: row.id,
            name: row.name.clone(),
            description: row.description.clone(),
            release_date: row.release_date,
            duration: row.duration,
            mpa: self.reference.get_mpa(row.mpa_id)?,
            genres,
            likes: self.likes.likers(row.id)?,
        })
    }
}

impl FilmRepository for InMemoryFilmRepository {
    fn list_films(&self) -> RepoResult<Vec<Film>> {
        let films = lock(&self.films, STORE)?;
        films.values().map(|row| self.hydrate(row)).collect()
    }

    fn popular_films(&self, count: usize) -> RepoResult<Vec<Film>> {
        let films = lock(&self.films, STORE)?;
        let mut ranked = Vec::with_capacity(films.len());
        for row in films.values() {
            ranked.push((self.likes.likers(row.id)?.len(), row));
        }
        ranked.sort_by_key(|(likes, row)| (Reverse(*likes), row.id));

        ranked
            .into_iter()
            .take(count)
            .map(|(_, row)| self.hydrate(row))
            .collect()
    }

    fn get_film(&self, id: FilmId) -> RepoResult<Film> {
        let films = lock(&self.films, STORE)?;
        match films.get(&id) {
            Some(row) => self.hydrate(row),
            None => {
                warn!("event=film_get module=repo backend=memory status=not_found film_id={id}");
                Err(RepoError::not_found(EntityKind::Film, id))
            }
        }
    }

    fn add_film(&self, film: &Film) -> RepoResult<Film> {
        self.ensure_references(film)?;

        let mut films = lock(&self.films, STORE)?;
        let row = FilmRow::from_film(self.ids.next_id(), film);
        for genre_id in film.genre_ids() {
            self.genres.add_genre(row.id, genre_id)?;
        }
        for user_id in &film.likes {
            self.likes.add_like(row.id, *user_id)?;
        }
        films.insert(row.id, row.clone());

        info!(
            "event=film_add module=repo backend=memory status=ok film_id={}",
            row.id
        );
        self.hydrate(&row)
    }

    fn update_film(&self, film: &Film) -> RepoResult<Film> {
        self.ensure_references(film)?;

        let mut films = lock(&self.films, STORE)?;
        if !films.contains_key(&film.id) {
            return Err(RepoError::not_found(EntityKind::Film, film.id));
        }

        let current = self.genres.genre_ids(film.id)?;
        let wanted = film.genre_ids();
        for stale in current.difference(&wanted) {
            self.genres.delete_genre(film.id, *stale)?;
        }
        for added in wanted.difference(&current) {
            self.genres.add_genre(film.id, *added)?;
        }

        let row = FilmRow::from_film(film.id, film);
        films.insert(row.id, row.clone());

        info!(
            "event=film_update module=repo backend=memory status=ok film_id={}",
            row.id
        );
        self.hydrate(&row)
    }

    fn delete_film(&self, id: FilmId) -> RepoResult<()> {
        let mut films = lock(&self.films, STORE)?;
        if films.remove(&id).is_none() {
            return Err(RepoError::not_found(EntityKind::Film, id));
        }
        info!("event=film_delete module=repo backend=memory status=ok film_id={id}");
        Ok(())
    }

    fn films_by_genre(&self, genre_id: GenreId) -> RepoResult<Vec<Film>> {
        self.reference.get_genre(genre_id)?;
        let film_ids = self.genres.film_ids_with_genre(genre_id)?;

        let films = lock(&self.films, STORE)?;
        film_ids
            .iter()
            .filter_map(|id| films.get(id))
            .map(|row| self.hydrate(row))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn repo() -> InMemoryFilmRepository {
        InMemoryFilmRepository::new(
            IdAllocator::new(),
            Arc::new(InMemoryLikeRepository::new()),
            Arc::new(InMemoryFilmGenreRepository::new()),
            Arc::new(InMemoryReferenceRepository::seeded()),
        )
    }

    fn film(name: &str) -> Film {
        Film::new(
            name,
            "description",
            NaiveDate::from_ymd_opt(2001, 9, 14).unwrap(),
            120,
            1,
        )
    }

    #[test]
    fn add_film_hydrates_labels() {
        let repo = repo();
        let created = repo.add_film(&film("Heat").with_genres([4, 2])).unwrap();

        assert_eq!(created.mpa.name, "G");
        let names: Vec<_> = created.genres.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["Drama", "Thriller"]);
    }

    #[test]
    fn unknown_genre_leaves_no_partial_film() {
        let repo = repo();
        let err = repo.add_film(&film("Heat").with_genres([1, 99])).unwrap_err();

        assert!(matches!(
            err,
            RepoError::NotFound { kind: EntityKind::Genre, id: 99 }
        ));
        assert!(repo.list_films().unwrap().is_empty());
    }

    #[test]
    fn likes_given_on_create_are_stored() {
        let repo = repo();
        let mut request = film("Heat");
        request.likes = BTreeSet::from([3, 5]);

        let created = repo.add_film(&request).unwrap();
        assert_eq!(created.like_count(), 2);
    }
}
