//! In-memory caching layer for repository reads.
//!
//! Memoizes `find` results per query behind a single async mutex with a
//! fixed time-to-live. Wraps any `Repository` as a decorator.

pub mod cached_repository;

pub use cached_repository::CachedRepository;
