use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// A numeric user or group id together with its resolved name.
///
/// When the host has no name for the id, `name` holds the id in decimal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identity {
    pub id: u32,
    pub name: String,
}

impl Identity {
    pub fn new(id: u32, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }

    /// An identity the host could not name.
    #[must_use]
    pub fn unnamed(id: u32) -> Self {
        Self {
            id,
            name: id.to_string(),
        }
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.name == self.id.to_string() {
            write!(f, "{}", self.id)
        } else {
            write!(f, "{} ({})", self.name, self.id)
        }
    }
}

/// The identity on whose behalf access is evaluated.
///
/// Captured once at the start of a diagnosis and never re-queried, so
/// every check in one report sees the same user and group set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    user: Identity,
    primary_group: Identity,
    supplementary_groups: Vec<Identity>,
    captured_at: DateTime<Utc>,
}

impl Principal {
    /// Superuser uid.
    pub const ROOT_UID: u32 = 0;

    pub fn new(user: Identity, primary_group: Identity, supplementary_groups: Vec<Identity>) -> Self {
        Self::captured(user, primary_group, supplementary_groups, Utc::now())
    }

    /// Build a principal with an explicit capture time.
    pub fn captured(
        user: Identity,
        primary_group: Identity,
        mut supplementary_groups: Vec<Identity>,
        captured_at: DateTime<Utc>,
    ) -> Self {
        let mut seen = HashSet::new();
        supplementary_groups.retain(|g| g.id != primary_group.id && seen.insert(g.id));
        Self {
            user,
            primary_group,
            supplementary_groups,
            captured_at,
        }
    }

    pub const fn user(&self) -> &Identity {
        &self.user
    }

    pub fn username(&self) -> &str {
        &self.user.name
    }

    pub const fn uid(&self) -> u32 {
        self.user.id
    }

    pub const fn primary_group(&self) -> &Identity {
        &self.primary_group
    }

    pub fn supplementary_groups(&self) -> &[Identity] {
        &self.supplementary_groups
    }

    pub const fn captured_at(&self) -> DateTime<Utc> {
        self.captured_at
    }

    /// Primary group followed by supplementary groups.
    pub fn groups(&self) -> impl Iterator<Item = &Identity> {
        std::iter::once(&self.primary_group).chain(self.supplementary_groups.iter())
    }

    /// Whether the principal belongs to the group, as primary or
    /// supplementary member.
    #[must_use]
    pub fn in_group(&self, gid: u32) -> bool {
        self.groups().any(|g| g.id == gid)
    }

    #[must_use]
    pub const fn is_superuser(&self) -> bool {
        self.user.id == Self::ROOT_UID
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let groups: Vec<&str> = self.groups().map(|g| g.name.as_str()).collect();
        write!(f, "{} (groups: {})", self.user, groups.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bob() -> Principal {
        Principal::new(
            Identity::new(1001, "bob"),
            Identity::new(1001, "bob"),
            vec![
                Identity::new(27, "sudo"),
                Identity::new(1001, "bob"),
                Identity::new(100, "users"),
            ],
        )
    }

    #[test]
    fn membership_covers_primary_and_supplementary() {
        let p = bob();
        assert!(p.in_group(1001));
        assert!(p.in_group(27));
        assert!(p.in_group(100));
        assert!(!p.in_group(0));
    }

    #[test]
    fn primary_group_not_repeated_in_supplementary() {
        let p = bob();
        assert_eq!(p.supplementary_groups().len(), 2);
        assert_eq!(p.groups().count(), 3);
    }

    #[test]
    fn root_is_superuser() {
        let root = Principal::new(Identity::new(0, "root"), Identity::new(0, "root"), vec![]);
        assert!(root.is_superuser());
        assert!(!bob().is_superuser());
    }

    #[test]
    fn unnamed_identity_displays_number() {
        assert_eq!(Identity::unnamed(4242).to_string(), "4242");
        assert_eq!(Identity::new(0, "root").to_string(), "root (0)");
    }
}
