//! Host platform detection.
//!
//! Platform labels are opaque strings everywhere else in the crate. This
//! module only answers "which label describes the machine we run on".

pub mod os;

use os::Os;

/// Returns the platform flavor of the current host (`linux`, `mac`, `win`).
///
/// Operating systems without a dedicated flavor report their
/// `std::env::consts::OS` name unchanged.
pub fn flavor() -> String {
  flavor_for(std::env::consts::OS)
}

/// Flavor for a given `std::env::consts::OS` value.
pub fn flavor_for(std_os: &str) -> String {
  match Os::from_std(std_os) {
    Some(os) => os.flavor().to_string(),
    None => std_os.to_string(),
  }
}
