use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::PermdocError;

/// Host platform family.
///
/// Selected once at startup and passed down as configuration; nothing
/// below the entry point inspects the OS on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Linux,
    #[serde(rename = "macos")]
    MacOs,
    Bsd,
    #[serde(rename = "unix")]
    OtherUnix,
}

impl Platform {
    /// The platform this binary was built for.
    #[must_use]
    pub const fn detect() -> Self {
        if cfg!(target_os = "linux") || cfg!(target_os = "android") {
            Self::Linux
        } else if cfg!(target_os = "macos") {
            Self::MacOs
        } else if cfg!(any(
            target_os = "freebsd",
            target_os = "openbsd",
            target_os = "netbsd",
            target_os = "dragonfly"
        )) {
            Self::Bsd
        } else {
            Self::OtherUnix
        }
    }

    /// Separator between search path entries.
    #[must_use]
    pub const fn path_separator(self) -> char {
        ':'
    }

    /// Whether the superuser bypasses read/write checks by default.
    ///
    /// Unknown Unix flavours are evaluated strictly.
    #[must_use]
    pub const fn default_root_bypass(self) -> bool {
        !matches!(self, Self::OtherUnix)
    }

    /// Command that adds `user` to `group`.
    #[must_use]
    pub fn add_to_group_command(self, user: &str, group: &str) -> String {
        match self {
            Self::Linux | Self::OtherUnix => format!("sudo usermod -aG {group} {user}"),
            Self::MacOs => format!("sudo dseditgroup -o edit -a {user} -t user {group}"),
            Self::Bsd => format!("sudo pw groupmod {group} -m {user}"),
        }
    }
}

impl Default for Platform {
    fn default() -> Self {
        Self::detect()
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Linux => write!(f, "linux"),
            Self::MacOs => write!(f, "macos"),
            Self::Bsd => write!(f, "bsd"),
            Self::OtherUnix => write!(f, "unix"),
        }
    }
}

impl FromStr for Platform {
    type Err = PermdocError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "linux" => Ok(Self::Linux),
            "macos" | "darwin" | "osx" => Ok(Self::MacOs),
            "bsd" | "freebsd" | "openbsd" | "netbsd" => Ok(Self::Bsd),
            "unix" | "other" => Ok(Self::OtherUnix),
            _ => Err(PermdocError::InvalidPlatform(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_aliases() {
        assert_eq!("Darwin".parse::<Platform>().unwrap(), Platform::MacOs);
        assert_eq!("freebsd".parse::<Platform>().unwrap(), Platform::Bsd);
        assert!("windows".parse::<Platform>().is_err());
    }

    #[test]
    fn display_round_trips() {
        for p in [Platform::Linux, Platform::MacOs, Platform::Bsd, Platform::OtherUnix] {
            assert_eq!(p.to_string().parse::<Platform>().unwrap(), p);
        }
    }

    #[test]
    fn group_commands_differ_per_platform() {
        assert!(Platform::Linux
            .add_to_group_command("bob", "wheel")
            .contains("usermod -aG wheel bob"));
        assert!(Platform::MacOs
            .add_to_group_command("bob", "wheel")
            .contains("dseditgroup"));
    }
}
