//! Diagnose why a file, directory or command is not accessible.
//!
//! permdoc inspects a target the way the kernel would on an access
//! attempt (search path, existence, symlinks, mode bits, parent
//! traversal) and returns an ordered list of findings plus one
//! remediation step per problem.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use permdoc::{render, AccessRequest, ReportFormat};
//!
//! let request = AccessRequest::new("/var/log/syslog", None)?;
//! let report = permdoc::diagnose(&request);
//!
//! print!("{}", render(&report, ReportFormat::Text)?);
//! std::process::exit(report.exit_code());
//! # Ok::<(), permdoc::PermdocError>(())
//! ```
//!
//! # Testing against a fake host
//!
//! ```rust
//! use permdoc::{AccessRequest, Diagnostics, FindingCode, Identity, MemoryHost, Principal, UnixPolicy};
//!
//! let bob = Principal::new(Identity::new(1001, "bob"), Identity::new(1001, "bob"), vec![]);
//! let host = MemoryHost::new(bob).dir("/srv", 0, 0, 0o700);
//! let policy = UnixPolicy::strict();
//!
//! let report = Diagnostics::new(&host, &policy).diagnose(&AccessRequest::path("/srv")?);
//! assert!(report.has_code(FindingCode::AccessDenied));
//! # Ok::<(), permdoc::PermdocError>(())
//! ```

pub mod engine;
pub mod remediation;
pub mod reporter;

// Re-export core types
pub use permdoc_core::*;

// Host access and per-entry analysis
pub use permdoc_inspect as inspect;
pub use permdoc_inspect::{AccessPolicy, Host, MemoryHost, SystemHost, UnixPolicy};

pub use engine::{Diagnostics, EngineOptions};
pub use reporter::{render, ReportFormat};

pub use serde;
pub use serde_json;

/// Diagnose `request` on the live system with the platform's default
/// policy and options.
pub fn diagnose(request: &AccessRequest) -> DiagnosticReport {
    let host = SystemHost::new();
    let policy = UnixPolicy::default();
    Diagnostics::new(&host, &policy).diagnose(request)
}
