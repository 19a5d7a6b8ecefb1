//! In-memory MPA and genre tables.

use crate::model::film::{Genre, GenreId, Mpa, MpaId};
use crate::model::reference::{GENRES, MPA_RATINGS};
use crate::repo::error::{EntityKind, RepoError, RepoResult};
use crate::repo::film_repo::ReferenceRepository;
use std::collections::BTreeMap;

/// Read-only reference tables, seeded once at construction.
#[derive(Debug, Clone)]
pub struct InMemoryReferenceRepository {
    ratings: BTreeMap<MpaId, String>,
    genres: BTreeMap<GenreId, String>,
}

impl InMemoryReferenceRepository {
    /// Tables filled with the catalog's standard ratings and genres.
    pub fn seeded() -> Self {
        Self {
            ratings: MPA_RATINGS
                .iter()
                .map(|(id, name)| (*id, (*name).to_string()))
                .collect(),
            genres: GENRES
                .iter()
                .map(|(id, name)| (*id, (*name).to_string()))
                .collect(),
        }
    }
}

impl Default for InMemoryReferenceRepository {
    fn default() -> Self {
        Self::seeded()
    }
}

impl ReferenceRepository for InMemoryReferenceRepository {
    fn list_mpa(&self) -> RepoResult<Vec<Mpa>> {
        Ok(self
            .ratings
            .iter()
            .map(|(id, name)| Mpa {
                id: *id,
                name: name.clone(),
            })
            .collect())
    }

    fn get_mpa(&self, id: MpaId) -> RepoResult<Mpa> {
        self.ratings
            .get(&id)
            .map(|name| Mpa {
                id,
                name: name.clone(),
            })
            .ok_or(RepoError::not_found(EntityKind::Mpa, id))
    }

    fn list_genres(&self) -> RepoResult<Vec<Genre>> {
        Ok(self
            .genres
            .iter()
            .map(|(id, name)| Genre {
                id: *id,
                name: name.clone(),
            })
            .collect())
    }

    fn get_genre(&self, id: GenreId) -> RepoResult<Genre> {
        self.genres
            .get(&id)
            .map(|name| Genre {
                id,
                name: name.clone(),
            })
            .ok_or(RepoError::not_found(EntityKind::Genre, id))
    }
}
