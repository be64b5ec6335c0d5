//! Storage module
//!
//! Provides the persistence collaborator: the `Persistence` boundary and a
//! JSON file implementation of it.

pub mod json_store;

pub use json_store::{JsonFileStore, Persistence};
