//! Key names and defaults shared across the crate.

/// Application name, used in environment variable prefixes.
pub const APP_NAME: &str = "isodep";

/// Default variable tested by condition expressions (`OS=="linux"`).
pub const DEFAULT_CONDITION_VAR: &str = "OS";

// Root keys of a descriptor.
pub const KEY_VARIABLES: &str = "variables";
pub const KEY_CONDITIONS: &str = "conditions";
pub const KEY_INCLUDES: &str = "includes";

// Variable keys inside a `variables` block.
pub const KEY_COMMAND: &str = "command";
pub const KEY_RELATIVE_CWD: &str = "relative_cwd";
pub const KEY_READ_ONLY: &str = "read_only";
pub const KEY_TRACKED: &str = "isolate_dependency_tracked";
pub const KEY_UNTRACKED: &str = "isolate_dependency_untracked";
pub const KEY_TOUCHED: &str = "isolate_dependency_touched";

/// Every key accepted inside a `variables` block.
pub const VALID_VARIABLES: &[&str] = &[
  KEY_COMMAND,
  KEY_RELATIVE_CWD,
  KEY_READ_ONLY,
  KEY_TRACKED,
  KEY_UNTRACKED,
  KEY_TOUCHED,
];

/// Environment variable overriding the condition variable name.
pub const ENV_CONDITION_VAR: &str = "ISODEP_CONDITION_VAR";

/// Environment variable listing extra platforms, comma separated.
pub const ENV_PLATFORMS: &str = "ISODEP_PLATFORMS";
