pub mod books;
pub mod catalog;
pub mod errors;
pub mod ids;
pub mod recommendations;
pub mod repositories;
pub mod users;

// Re-exports
pub use errors::RepositoryError;
