//! Permission evaluation.
//!
//! Classic Unix resolution: the owner triple applies to the owner, the
//! group triple to members of the owning group, the other triple to
//! everyone else. Exactly one triple is consulted; a restrictive owner
//! triple is not rescued by a generous group or other triple.
//!
//! The superuser rule differs between platforms, so it lives in an
//! [`AccessPolicy`] implementation that callers can swap.

use permdoc_core::{
    AccessCapabilities, AccessClass, EntryMeta, FileKind, FileState, PermissionClass, Platform,
    Principal,
};

/// Strategy that turns ownership, mode and principal into capabilities.
pub trait AccessPolicy {
    /// Short identifier recorded in reports.
    fn name(&self) -> &'static str;

    /// Capabilities of `principal` on an entry with `meta`.
    fn capabilities(&self, meta: &EntryMeta, principal: &Principal) -> AccessCapabilities;

    /// Whether `principal` may search a directory with `meta`.
    fn can_search(&self, meta: &EntryMeta, principal: &Principal) -> bool {
        self.capabilities(meta, principal).can_execute
    }
}

/// Which mode class applies to the principal.
#[must_use]
pub fn applicable_class(meta: &EntryMeta, principal: &Principal) -> PermissionClass {
    if principal.uid() == meta.owner.id {
        PermissionClass::Owner
    } else if principal.in_group(meta.group.id) {
        PermissionClass::Group
    } else {
        PermissionClass::Other
    }
}

/// Standard Unix evaluation with an optional superuser bypass.
///
/// With the bypass on, root may always read and write, may search any
/// directory, and may execute a file when at least one execute bit is set
/// in any class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnixPolicy {
    root_bypass: bool,
}

impl UnixPolicy {
    #[must_use]
    pub const fn new(root_bypass: bool) -> Self {
        Self { root_bypass }
    }

    /// No superuser bypass: root is evaluated like any other user.
    #[must_use]
    pub const fn strict() -> Self {
        Self::new(false)
    }

    #[must_use]
    pub const fn for_platform(platform: Platform) -> Self {
        Self::new(platform.default_root_bypass())
    }

    #[must_use]
    pub const fn root_bypass(&self) -> bool {
        self.root_bypass
    }
}

impl Default for UnixPolicy {
    fn default() -> Self {
        Self::for_platform(Platform::detect())
    }
}

impl AccessPolicy for UnixPolicy {
    fn name(&self) -> &'static str {
        if self.root_bypass {
            "unix"
        } else {
            "unix-strict"
        }
    }

    fn capabilities(&self, meta: &EntryMeta, principal: &Principal) -> AccessCapabilities {
        if self.root_bypass && principal.is_superuser() {
            return AccessCapabilities {
                can_read: true,
                can_write: true,
                can_execute: meta.mode.any_execute(),
                class: AccessClass::Superuser,
            };
        }

        let class = applicable_class(meta, principal);
        let triple = meta.mode.triple(class);
        AccessCapabilities {
            can_read: triple.read,
            can_write: triple.write,
            can_execute: triple.execute,
            class: class.into(),
        }
    }

    fn can_search(&self, meta: &EntryMeta, principal: &Principal) -> bool {
        (self.root_bypass && principal.is_superuser())
            || self.capabilities(meta, principal).can_execute
    }
}

/// Applies an [`AccessPolicy`] to file states.
#[derive(Clone, Copy)]
pub struct PermissionInspector<'p> {
    policy: &'p dyn AccessPolicy,
}

impl<'p> PermissionInspector<'p> {
    pub fn new(policy: &'p dyn AccessPolicy) -> Self {
        Self { policy }
    }

    pub fn policy_name(&self) -> &'static str {
        self.policy.name()
    }

    /// Capabilities on an existing entry; `None` for a missing one, which
    /// has no permissions to evaluate. Execute on a directory means search.
    pub fn inspect(&self, state: &FileState, principal: &Principal) -> Option<AccessCapabilities> {
        let meta = state.meta()?;
        let mut caps = self.policy.capabilities(meta, principal);
        if state.kind() == FileKind::Directory {
            caps.can_execute = self.policy.can_search(meta, principal);
        }
        Some(caps)
    }

    /// Whether the principal may traverse (search) a directory.
    pub fn can_traverse(&self, state: &FileState, principal: &Principal) -> Option<bool> {
        state
            .meta()
            .map(|meta| self.policy.can_search(meta, principal))
    }
}

impl std::fmt::Debug for PermissionInspector<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PermissionInspector")
            .field("policy", &self.policy.name())
            .finish()
    }
}
