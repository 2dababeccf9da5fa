/// Operating systems with a well-known platform flavor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Os {
  Linux,
  MacOs,
  Windows,
}

impl Os {
  /// Map a `std::env::consts::OS` value to a known OS.
  pub fn from_std(name: &str) -> Option<Self> {
    match name {
      "linux" => Some(Self::Linux),
      "macos" => Some(Self::MacOs),
      "windows" => Some(Self::Windows),
      _ => None,
    }
  }

  /// Returns the flavor label used in condition expressions
  pub fn flavor(&self) -> &'static str {
    match self {
      Self::Linux => "linux",
      Self::MacOs => "mac",
      Self::Windows => "win",
    }
  }
}
