//! Postgres implementations of the store and directory seams.

pub mod club_repository;
pub mod event_repository;
pub mod user_repository;

// Re-export all repositories for convenient access
pub use club_repository::ClubRepository;
pub use event_repository::EventRepository;
pub use user_repository::UserRepository;
