//! Document-store adapter backed by MongoDB.

pub mod connection;
pub mod query;
pub mod repository;

pub use connection::connect;
pub use repository::DocumentRepository;
