//! Storage layer - persisted entities and repositories

pub mod entity;
pub mod mapper;
pub mod repositories;

pub use repositories::{InMemoryStateRepository, JsonFileStateRepository};
