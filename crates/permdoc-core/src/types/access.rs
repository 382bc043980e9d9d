use serde::{Deserialize, Serialize};
use std::fmt;

use super::mode::{PermissionBit, PermissionClass};

/// Which rule decided the principal's access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessClass {
    Owner,
    Group,
    Other,
    /// Superuser bypass policy
    Superuser,
}

impl AccessClass {
    /// The mode class consulted, if a single triple decided access.
    #[must_use]
    pub const fn permission_class(self) -> Option<PermissionClass> {
        match self {
            Self::Owner => Some(PermissionClass::Owner),
            Self::Group => Some(PermissionClass::Group),
            Self::Other => Some(PermissionClass::Other),
            Self::Superuser => None,
        }
    }
}

impl From<PermissionClass> for AccessClass {
    fn from(class: PermissionClass) -> Self {
        match class {
            PermissionClass::Owner => Self::Owner,
            PermissionClass::Group => Self::Group,
            PermissionClass::Other => Self::Other,
        }
    }
}

impl fmt::Display for AccessClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Owner => write!(f, "owner"),
            Self::Group => write!(f, "group"),
            Self::Other => write!(f, "other"),
            Self::Superuser => write!(f, "superuser"),
        }
    }
}

/// What the principal may do with an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessCapabilities {
    pub can_read: bool,
    pub can_write: bool,
    pub can_execute: bool,
    /// Rule that produced these capabilities
    pub class: AccessClass,
}

impl AccessCapabilities {
    #[must_use]
    pub const fn allows(&self, bit: PermissionBit) -> bool {
        match bit {
            PermissionBit::Read => self.can_read,
            PermissionBit::Write => self.can_write,
            PermissionBit::Execute => self.can_execute,
        }
    }

    /// Bits the principal lacks, in `rwx` order.
    pub fn missing(&self) -> Vec<PermissionBit> {
        PermissionBit::ALL
            .into_iter()
            .filter(|bit| !self.allows(*bit))
            .collect()
    }

    #[must_use]
    pub const fn is_full(&self) -> bool {
        self.can_read && self.can_write && self.can_execute
    }

    #[must_use]
    pub const fn is_none(&self) -> bool {
        !self.can_read && !self.can_write && !self.can_execute
    }
}
