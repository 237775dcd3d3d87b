//! Port trait definitions (Hexagonal Architecture)
//!
//! `Repository` is the contract every storage adapter and decorator
//! implements, so callers stay independent of the backing store.

pub mod repository;

pub use repository::Repository;
