use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::PermdocError;

/// One of the three permission classes of a Unix mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionClass {
    /// File owner (`u`)
    Owner,
    /// Owning group (`g`)
    Group,
    /// Everyone else (`o`)
    Other,
}

impl PermissionClass {
    /// All classes in mode order.
    pub const ALL: [Self; 3] = [Self::Owner, Self::Group, Self::Other];

    /// The `chmod` who-letter for this class.
    #[must_use]
    pub const fn chmod_letter(self) -> char {
        match self {
            Self::Owner => 'u',
            Self::Group => 'g',
            Self::Other => 'o',
        }
    }

    const fn shift(self) -> u32 {
        match self {
            Self::Owner => 6,
            Self::Group => 3,
            Self::Other => 0,
        }
    }
}

impl fmt::Display for PermissionClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Owner => write!(f, "owner"),
            Self::Group => write!(f, "group"),
            Self::Other => write!(f, "other"),
        }
    }
}

/// A single permission bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionBit {
    Read,
    Write,
    Execute,
}

impl PermissionBit {
    /// All bits in `rwx` order.
    pub const ALL: [Self; 3] = [Self::Read, Self::Write, Self::Execute];

    /// The `chmod` permission letter for this bit.
    #[must_use]
    pub const fn chmod_letter(self) -> char {
        match self {
            Self::Read => 'r',
            Self::Write => 'w',
            Self::Execute => 'x',
        }
    }
}

impl fmt::Display for PermissionBit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read => write!(f, "read"),
            Self::Write => write!(f, "write"),
            Self::Execute => write!(f, "execute"),
        }
    }
}

/// Read/write/execute flags for one permission class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Triple {
    pub read: bool,
    pub write: bool,
    pub execute: bool,
}

impl Triple {
    /// Whether the given bit is set.
    #[must_use]
    pub const fn has(self, bit: PermissionBit) -> bool {
        match bit {
            PermissionBit::Read => self.read,
            PermissionBit::Write => self.write,
            PermissionBit::Execute => self.execute,
        }
    }

    /// True when no bit is set.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        !self.read && !self.write && !self.execute
    }
}

impl fmt::Display for Triple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}{}",
            if self.read { 'r' } else { '-' },
            if self.write { 'w' } else { '-' },
            if self.execute { 'x' } else { '-' }
        )
    }
}

/// Permission bits of a filesystem entry (the low nine bits plus
/// setuid/setgid/sticky).
///
/// Serializes as a four digit octal string (`"0755"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Mode(u32);

impl Mode {
    /// Mask of the bits a `Mode` keeps.
    pub const MASK: u32 = 0o7777;

    /// Build a mode from raw `st_mode` bits. File type bits are dropped.
    #[must_use]
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits & Self::MASK)
    }

    /// Raw permission bits.
    #[must_use]
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// The triple for one class.
    #[must_use]
    pub const fn triple(self, class: PermissionClass) -> Triple {
        let t = (self.0 >> class.shift()) & 0o7;
        Triple {
            read: t & 0o4 != 0,
            write: t & 0o2 != 0,
            execute: t & 0o1 != 0,
        }
    }

    /// True if any class has the execute bit.
    #[must_use]
    pub const fn any_execute(self) -> bool {
        self.0 & 0o111 != 0
    }

    /// Nine character symbolic form (`rwxr-x---`).
    #[must_use]
    pub fn symbolic(self) -> String {
        PermissionClass::ALL
            .iter()
            .map(|c| self.triple(*c).to_string())
            .collect()
    }

    /// Octal form with a leading zero (`0755`).
    #[must_use]
    pub fn octal(self) -> String {
        format!("{:04o}", self.0)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.symbolic(), self.octal())
    }
}

impl FromStr for Mode {
    type Err = PermdocError;

    /// Accepts octal (`755`, `0755`, `0o755`) or nine character symbolic
    /// (`rwxr-x---`, spaces between triples allowed).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let invalid = || PermdocError::InvalidMode(s.to_string());

        let octal = trimmed.strip_prefix("0o").unwrap_or(trimmed);
        if !octal.is_empty() && octal.len() <= 4 && octal.chars().all(|c| c.is_digit(8)) {
            let bits = u32::from_str_radix(octal, 8).map_err(|_| invalid())?;
            return Ok(Self::from_bits(bits));
        }

        let symbolic: Vec<char> = trimmed.chars().filter(|c| !c.is_whitespace()).collect();
        if symbolic.len() != 9 {
            return Err(invalid());
        }

        let mut bits = 0u32;
        for (i, ch) in symbolic.iter().enumerate() {
            let expected = ['r', 'w', 'x'][i % 3];
            if *ch == expected {
                bits |= 1 << (8 - i);
            } else if *ch != '-' {
                return Err(invalid());
            }
        }
        Ok(Self(bits))
    }
}

impl TryFrom<String> for Mode {
    type Error = PermdocError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Mode> for String {
    fn from(mode: Mode) -> Self {
        mode.octal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn triples_split_by_class() {
        let mode = Mode::from_bits(0o750);
        assert_eq!(mode.triple(PermissionClass::Owner).to_string(), "rwx");
        assert_eq!(mode.triple(PermissionClass::Group).to_string(), "r-x");
        assert!(mode.triple(PermissionClass::Other).is_empty());
    }

    #[test]
    fn file_type_bits_are_dropped() {
        // S_IFREG | 0644
        let mode = Mode::from_bits(0o100_644);
        assert_eq!(mode.bits(), 0o644);
        assert_eq!(mode.octal(), "0644");
    }

    #[test]
    fn parses_symbolic_with_spaces() {
        let mode: Mode = "rw- --- rwx".parse().unwrap();
        assert_eq!(mode.bits(), 0o607);
        assert_eq!(mode.symbolic(), "rw----rwx");
    }

    #[test]
    fn parses_octal_forms() {
        assert_eq!("755".parse::<Mode>().unwrap().bits(), 0o755);
        assert_eq!("0o700".parse::<Mode>().unwrap().bits(), 0o700);
        assert_eq!("4755".parse::<Mode>().unwrap().bits(), 0o4755);
    }

    #[test]
    fn rejects_garbage() {
        assert!("rwxrwxrw".parse::<Mode>().is_err());
        assert!("rwzr-xr-x".parse::<Mode>().is_err());
        assert!("899".parse::<Mode>().is_err());
        assert!("".parse::<Mode>().is_err());
    }

    #[test]
    fn serializes_as_octal_string() {
        let json = serde_json::to_string(&Mode::from_bits(0o755)).unwrap();
        assert_eq!(json, "\"0755\"");
        let back: Mode = serde_json::from_str(&json).unwrap();
        assert_eq!(back.bits(), 0o755);
    }

    #[test]
    fn any_execute_checks_all_classes() {
        assert!(Mode::from_bits(0o001).any_execute());
        assert!(!Mode::from_bits(0o666).any_execute());
    }
}
