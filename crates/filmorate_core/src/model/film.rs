//! Film domain model.
//!
//! # Invariants
//! - `mpa` must reference an existing MPA rating.
//! - Every entry of `genres` must reference an existing genre.
//! - `genres` and `likes` are hydrated by the film store on every read;
//!   on writes only their ids matter.

use super::user::UserId;
use super::UNASSIGNED_ID;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

pub type FilmId = i64;
pub type MpaId = i64;
pub type GenreId = i64;

/// MPA classification reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mpa {
    pub id: MpaId,
    /// Label such as `PG-13`. Ignored on writes.
    #[serde(default)]
    pub name: String,
}

impl Mpa {
    /// Reference by id only, as sent by callers.
    pub fn from_id(id: MpaId) -> Self {
        Self {
            id,
            name: String::new(),
        }
    }
}

/// Genre reference.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Genre {
    pub id: GenreId,
    #[serde(default)]
    pub name: String,
}

impl Genre {
    pub fn from_id(id: GenreId) -> Self {
        Self {
            id,
            name: String::new(),
        }
    }
}

/// Catalog film.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Film {
    /// Store-assigned id. `0` on create requests.
    #[serde(default)]
    pub id: FilmId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub release_date: NaiveDate,
    /// Running time in minutes.
    pub duration: u32,
    pub mpa: Mpa,
    /// Ordered by genre id on reads.
    #[serde(default)]
    pub genres: Vec<Genre>,
    /// Ids of users who liked the film.
    #[serde(default)]
    pub likes: BTreeSet<UserId>,
}

impl Film {
    /// Builds a create request without genres or likes.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        release_date: NaiveDate,
        duration: u32,
        mpa_id: MpaId,
    ) -> Self {
        Self {
            id: UNASSIGNED_ID,
            name: name.into(),
            description: description.into(),
            release_date,
            duration,
            mpa: Mpa::from_id(mpa_id),
            genres: Vec::new(),
            likes: BTreeSet::new(),
        }
    }

    /// Replaces the genre references with the given ids.
    pub fn with_genres(mut self, genre_ids: impl IntoIterator<Item = GenreId>) -> Self {
        self.genres = genre_ids.into_iter().map(Genre::from_id).collect();
        self
    }

    pub fn has_id(&self) -> bool {
        self.id != UNASSIGNED_ID
    }

    /// Distinct genre ids referenced by this film.
    pub fn genre_ids(&self) -> BTreeSet<GenreId> {
        self.genres.iter().map(|genre| genre.id).collect()
    }

    pub fn like_count(&self) -> usize {
        self.likes.len()
    }
}
