pub mod postgres_repository;
pub mod story;
pub mod trip;
pub mod user;
