//! Tree module
//!
//! The folder/note hierarchy:
//! - Model definitions shared with persistence
//! - The store that owns the collections and enforces the tree invariants

pub mod models;
pub mod store;

pub use models::*;
pub use store::{next_order, TreeStore};
