mod check;
mod flatten;
mod info;
mod manifest;
mod merge;

pub use check::{ManifestKind, cmd_check};
pub use flatten::cmd_flatten;
pub use info::cmd_info;
pub use manifest::{ManifestArgs, cmd_manifest};
pub use merge::cmd_merge;
