//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts.
//! - Provide two interchangeable backends: volatile (`memory`) and
//!   persistent (`sqlite`). They share contracts and the error taxonomy,
//!   never code.
//!
//! # Invariants
//! - Repository APIs return semantic errors (`NotFound`,
//!   `UniquenessViolation`) in addition to storage errors.
//! - Relation repositories do not look entities up before linking them.
//!   SQLite still reports a foreign-key failure as `NotFound`.

pub mod error;
pub mod film_repo;
pub mod id_allocator;
pub mod memory;
pub mod sqlite;
pub mod stores;
pub mod user_repo;
