//! Catalog domain model.
//!
//! # Responsibility
//! - Define the entities shared by repositories and services: users, films
//!   and the closed MPA/genre reference tables.
//!
//! # Invariants
//! - Identifiers are assigned by a store exactly once, at creation.
//!   `UNASSIGNED_ID` marks an entity that has not been stored yet.
//! - Relationship data (friends, likes, genre links) lives in dedicated
//!   relation stores; the collections on `Film` are read snapshots.

pub mod film;
pub mod reference;
pub mod user;

/// Identifier value carried by entities that have not been created yet.
pub const UNASSIGNED_ID: i64 = 0;
