//! Core use-case services.
//!
//! # Responsibility
//! - Enforce id-assignment policy, existence checks and uniqueness checks on
//!   top of the repositories.
//! - Be the single entry point transport layers call.
//!
//! # Invariants
//! - Services never bypass repository contracts and never know which backend
//!   they run on.

pub mod error;
pub mod film_service;
pub mod user_service;
