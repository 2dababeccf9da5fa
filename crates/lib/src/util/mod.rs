//! Shared utilities.
//!
//! File hashing and directory walking used by manifest collection.

pub mod hash;
