//! Core types for permdoc.
//!
//! This crate holds the value types shared by every other permdoc crate:
//!
//! - **Inputs**: [`AccessRequest`], [`Principal`], [`SearchPath`]
//! - **Observations**: [`FileState`], [`LinkChain`], [`AccessCapabilities`]
//! - **Results**: [`Finding`], [`Suggestion`], [`DiagnosticReport`]
//! - **Errors**: [`PermdocError`] for the few things that are not findings
//!
//! # Example
//!
//! ```rust
//! use permdoc_core::{Mode, PermissionClass, SearchPath};
//!
//! let mode: Mode = "rwxr-x---".parse().unwrap();
//! assert!(mode.triple(PermissionClass::Group).execute);
//!
//! let path = SearchPath::parse_with("/bin:/usr/bin:/bin", ':');
//! assert_eq!(path.find_duplicates(), vec!["/bin".to_string()]);
//! ```

mod error;
pub mod types;

pub use error::{PermdocError, Result};
pub use types::*;
