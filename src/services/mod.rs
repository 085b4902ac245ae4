//! Domain services built on the table stores

pub mod character_service;
pub mod types;

pub use character_service::CharacterService;
pub use types::{BreakthroughOutcome, CharacterAggregate, NewCharacter, Statistics};
