//! Resolved task manifests.
//!
//! A manifest is what a task runner consumes: one platform's variables with
//! every file dependency expanded and described by its metadata.

mod collect;
mod types;

pub use collect::{Detail, FileCollector, FsCollector, build_isolated};
pub use types::*;
