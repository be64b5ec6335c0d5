//! RsvpNotes library
//!
//! Folder/note tree with soft-delete trash, and a word-at-a-time RSVP
//! reader with adaptive pacing and a training ramp.

pub mod app;
pub mod config;
pub mod error;
pub mod reader;
pub mod services;
pub mod storage;
pub mod tree;
