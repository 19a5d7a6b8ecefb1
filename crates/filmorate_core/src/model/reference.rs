//! Closed reference tables shared by both storage backends.
//!
//! The SQLite seed migration inserts the same rows; keep them in sync.

use super::film::{GenreId, MpaId};

/// MPA ratings known to the catalog.
pub const MPA_RATINGS: &[(MpaId, &str)] = &[
    (1, "G"),
    (2, "PG"),
    (3, "PG-13"),
    (4, "R"),
    (5, "NC-17"),
];

/// Genres known to the catalog.
pub const GENRES: &[(GenreId, &str)] = &[
    (1, "Comedy"),
    (2, "Drama"),
    (3, "Animation"),
    (4, "Thriller"),
    (5, "Documentary"),
    (6, "Action"),
];
