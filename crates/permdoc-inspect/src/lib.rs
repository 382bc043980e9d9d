//! # permdoc-inspect
//!
//! Host inspection building blocks for permdoc.
//!
//! - [`host`]: the [`Host`] trait and the live [`SystemHost`]
//! - [`memory`]: an in-memory host for tests
//! - [`stat`]: [`permdoc_core::FileState`] snapshots with resolved names
//! - [`path_model`]: command resolution and search path hygiene
//! - [`permissions`]: owner/group/other evaluation behind [`AccessPolicy`]
//! - [`links`]: bounded symlink chain resolution and hard link detection
//!
//! Every function takes the host explicitly; nothing here reads the
//! environment or the current identity on its own.

pub mod host;
pub mod links;
pub mod memory;
pub mod path_model;
pub mod permissions;
pub mod stat;

pub use host::{is_absent, Host, RawMeta, SystemHost};
pub use links::{distinguish_hard_link, has_other_names, LinkResolver, DEFAULT_MAX_DEPTH};
pub use memory::MemoryHost;
pub use permissions::{applicable_class, AccessPolicy, PermissionInspector, UnixPolicy};
pub use stat::{entry_meta, entry_state, followed_state};
