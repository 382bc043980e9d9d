//! The diagnostics engine.
//!
//! [`Diagnostics::diagnose`] runs a fixed sequence of checks against one
//! target and freezes the result into a [`DiagnosticReport`]. The order of
//! findings in the report is the order below, and it is also the order of
//! the remediation steps:
//!
//! 1. search path audit and command resolution (commands only)
//! 2. existence
//! 3. structural symlink failures
//! 4. ownership, per-bit permissions, aggregate denial
//! 5. parent directory traversal
//! 6. symlink chain summary
//! 7. hard links
//!
//! Host failures never abort a run. They become `UNKNOWN_STATE` findings and
//! the remaining independent checks still run. An unreadable target is an
//! error; an unreadable parent is only a warning.

use std::path::Path;

use permdoc_core::{
    AccessClass, AccessRequest, DiagnosticReport, FileKind, FileState, Finding,
    FindingCode, LinkTerminal, ParentCheck, PermissionBit, Platform, Principal, ReportBuilder,
    SearchPath, Severity, TargetHint,
};
use permdoc_inspect::{
    entry_state, followed_state, has_other_names, path_model, AccessPolicy, Host, LinkResolver,
    PermissionInspector, DEFAULT_MAX_DEPTH,
};
use tracing::{debug, info_span};

use crate::remediation::{self, RemediationContext};

/// Switches for the optional checks and platform selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineOptions {
    /// Check that the parent directory can be traversed
    pub check_parent: bool,
    /// Report entries with more than one hard link
    pub check_hard_links: bool,
    /// Symlink hops followed before reporting a cycle
    pub max_link_depth: usize,
    pub platform: Platform,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            check_parent: true,
            check_hard_links: true,
            max_link_depth: DEFAULT_MAX_DEPTH,
            platform: Platform::detect(),
        }
    }
}

/// Runs diagnoses against a host with a given access policy.
///
/// Holds no per-run state; one value can diagnose any number of targets,
/// and can be shared between threads.
pub struct Diagnostics<'h> {
    host: &'h (dyn Host + Sync),
    policy: &'h (dyn AccessPolicy + Sync),
    options: EngineOptions,
}

impl<'h> Diagnostics<'h> {
    pub fn new(host: &'h (dyn Host + Sync), policy: &'h (dyn AccessPolicy + Sync)) -> Self {
        Self {
            host,
            policy,
            options: EngineOptions::default(),
        }
    }

    #[must_use]
    pub const fn with_options(mut self, options: EngineOptions) -> Self {
        self.options = options;
        self
    }

    pub const fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// Diagnose `request` against the live state of the host.
    ///
    /// The principal and the search path are read from the host exactly
    /// once, here, and passed down to every check.
    pub fn diagnose(&self, request: &AccessRequest) -> DiagnosticReport {
        let principal = self.host.current_principal();
        let search_path = self
            .host
            .search_path()
            .map(|raw| SearchPath::parse(&raw, self.options.platform));
        self.diagnose_with(request, principal, search_path.as_ref())
    }

    /// Diagnose `request` for an explicit principal and search path.
    ///
    /// `None` for the search path means the variable is unset, so no
    /// command can resolve.
    pub fn diagnose_with(
        &self,
        request: &AccessRequest,
        principal: Principal,
        search_path: Option<&SearchPath>,
    ) -> DiagnosticReport {
        let span = info_span!("diagnose", target = request.target());
        let _guard = span.enter();

        let mut run = Run {
            host: self.host,
            inspector: PermissionInspector::new(self.policy),
            options: &self.options,
            report: ReportBuilder::new(
                request.clone(),
                principal,
                self.options.platform,
                self.policy.name(),
            ),
            target: None,
            parent: None,
        };

        let path = match request.effective_hint() {
            TargetHint::AsCommand => run.resolve_command(request.target(), search_path),
            TargetHint::AsPath => Some(request.target().to_string()),
        };
        if let Some(path) = path {
            run.inspect_path(&path);
        }
        run.finish()
    }
}

impl std::fmt::Debug for Diagnostics<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Diagnostics")
            .field("policy", &self.policy.name())
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

/// State of a single diagnosis while it is assembled.
struct Run<'a> {
    host: &'a dyn Host,
    inspector: PermissionInspector<'a>,
    options: &'a EngineOptions,
    report: ReportBuilder,
    /// Entry whose permissions were evaluated (a link's final target)
    target: Option<FileState>,
    parent: Option<FileState>,
}

impl Run<'_> {
    fn resolve_command(&mut self, name: &str, search_path: Option<&SearchPath>) -> Option<String> {
        let unset = SearchPath::from_entries(Vec::<String>::new());
        let search_path = search_path.unwrap_or(&unset);

        let Some(location) = path_model::resolve(self.host, search_path, name) else {
            let message = if !path_model::is_searchable(name) {
                format!("'{name}' contains '/', so it is never looked up in the search path")
            } else if search_path.is_empty() {
                format!("'{name}' cannot be found: the search path is empty")
            } else {
                format!(
                    "'{name}' was not found in any of the {} search path entries",
                    search_path.len()
                )
            };
            self.report
                .push(Finding::new(FindingCode::CommandNotFound, message).with_subject(name));
            return None;
        };

        self.report.extend(path_model::audit(self.host, search_path));
        self.report.push(
            Finding::new(
                FindingCode::CommandResolved,
                format!(
                    "'{name}' resolves to {} (search path entry #{})",
                    location.path,
                    location.entry_index + 1
                ),
            )
            .with_subject(location.path.clone()),
        );
        let path = location.path.clone();
        self.report.resolution(location);
        Some(path)
    }

    fn inspect_path(&mut self, path: &str) {
        self.report.inspected_path(path);

        let state = match entry_state(self.host, path) {
            Ok(state) => state,
            Err(e) => {
                self.unknown_target(path, &e.to_string());
                self.check_parent(path);
                return;
            }
        };
        self.report.state(state.clone());

        if !state.exists() {
            self.report.push(
                Finding::new(FindingCode::TargetMissing, format!("'{path}' does not exist"))
                    .with_subject(path),
            );
            return;
        }

        let mut resolved_link = None;
        let target = if state.kind() == FileKind::Symlink {
            let chain = LinkResolver::new(self.options.max_link_depth).resolve(self.host, path);
            self.report.link_chain(chain.clone());
            match &chain.terminal {
                LinkTerminal::Broken => {
                    let dest = chain.final_path().unwrap_or(path);
                    self.report.push(
                        Finding::new(
                            FindingCode::DanglingSymlink,
                            format!("'{path}' points to '{dest}', which does not exist"),
                        )
                        .with_subject(path),
                    );
                    return;
                }
                LinkTerminal::Cycle { depth } => {
                    self.report.push(
                        Finding::new(
                            FindingCode::LinkCycle,
                            format!("'{path}' did not resolve after {depth} symlink hops; the chain loops"),
                        )
                        .with_subject(path),
                    );
                    return;
                }
                LinkTerminal::Unreadable { path: hop, reason } => {
                    self.unknown_target(hop, reason);
                    self.check_parent(path);
                    return;
                }
                LinkTerminal::File | LinkTerminal::Directory | LinkTerminal::Special => {}
            }

            let dest = chain.final_path().unwrap_or(path).to_string();
            match entry_state(self.host, &dest) {
                Ok(target) if target.exists() => {
                    self.report.link_target(target.clone());
                    resolved_link = Some(chain);
                    target
                }
                Ok(_) => {
                    self.unknown_target(&dest, "link target vanished during inspection");
                    self.check_parent(path);
                    return;
                }
                Err(e) => {
                    self.unknown_target(&dest, &e.to_string());
                    self.check_parent(path);
                    return;
                }
            }
        } else {
            state
        };

        self.check_permissions(&target);
        self.check_parent(path);

        if let Some(chain) = resolved_link {
            self.report.push(
                Finding::new(
                    FindingCode::SymlinkResolved,
                    format!(
                        "'{path}' is a symlink resolving through {} hop(s): {}",
                        chain.link_count(),
                        chain.describe()
                    ),
                )
                .with_subject(path),
            );
        }

        if self.options.check_hard_links {
            if let Some(meta) = target.meta() {
                if has_other_names(target.kind(), meta) {
                    self.report.push(
                        Finding::new(
                            FindingCode::HardLinkPresent,
                            format!(
                                "'{}' has {} names; a mode change affects all of them",
                                target.path(),
                                meta.nlink
                            ),
                        )
                        .with_subject(target.path()),
                    );
                }
            }
        }

        self.target = Some(target);
    }

    fn check_permissions(&mut self, target: &FileState) {
        let principal = self.report.principal().clone();
        let (Some(meta), Some(caps)) = (target.meta(), self.inspector.inspect(target, &principal))
        else {
            return;
        };
        let path = target.path();
        self.report.capabilities(caps);
        debug!(path, class = %caps.class, "permission class selected");

        match caps.class {
            AccessClass::Owner => {}
            AccessClass::Superuser => {
                self.report.push(
                    Finding::new(
                        FindingCode::SuperuserBypass,
                        format!(
                            "running as {}: read and write are granted regardless of mode {}",
                            principal.username(),
                            meta.mode
                        ),
                    )
                    .with_subject(path),
                );
            }
            AccessClass::Group | AccessClass::Other => {
                self.report.push(
                    Finding::new(
                        FindingCode::NotOwner,
                        format!(
                            "'{path}' is owned by {}, group {}; the {} permissions apply to {}",
                            meta.owner.name,
                            meta.group.name,
                            caps.class,
                            principal.username()
                        ),
                    )
                    .with_subject(path),
                );
            }
        }

        for bit in caps.missing() {
            let finding = match caps.class.permission_class() {
                Some(class) => {
                    let triple = meta.mode.triple(class);
                    Finding::new(
                        FindingCode::missing_bit(class, bit),
                        format!(
                            "{} has no {bit} permission: the {} triple is {triple}{}",
                            principal.username(),
                            caps.class,
                            bit_consequence(target.kind(), bit)
                        ),
                    )
                }
                None => Finding::new(
                    FindingCode::NoExecute,
                    format!(
                        "no execute bit is set in {}; even the superuser cannot execute it",
                        meta.mode
                    ),
                ),
            };
            self.report.push(finding.with_subject(path));
        }

        if caps.is_none() {
            self.report.push(
                Finding::new(
                    FindingCode::AccessDenied,
                    format!(
                        "{} can neither read, write nor execute '{path}'",
                        principal.username()
                    ),
                )
                .with_subject(path),
            );
        }
    }

    /// Traverse check on the directory holding `path` as given.
    fn check_parent(&mut self, path: &str) {
        if !self.options.check_parent {
            return;
        }
        let Some(parent) = parent_of(path) else {
            return;
        };

        match followed_state(self.host, &parent) {
            Ok(state) if state.exists() => {
                let principal = self.report.principal().clone();
                let traversable = self.inspector.can_traverse(&state, &principal);
                if traversable == Some(false) {
                    self.report.push(
                        Finding::new(
                            FindingCode::ParentNotTraversable,
                            format!(
                                "{} cannot traverse '{parent}' (mode {}), which blocks access to everything inside it",
                                principal.username(),
                                state.meta().map_or_else(String::new, |m| m.mode.to_string())
                            ),
                        )
                        .with_subject(parent.clone()),
                    );
                }
                self.report.parent(ParentCheck {
                    path: parent,
                    traversable,
                    state: Some(state.clone()),
                });
                self.parent = Some(state);
            }
            Ok(_) => {
                self.unknown_state(&parent, "parent directory is not visible");
                self.report.parent(ParentCheck {
                    path: parent,
                    traversable: None,
                    state: None,
                });
            }
            Err(e) => {
                self.unknown_state(&parent, &e.to_string());
                self.report.parent(ParentCheck {
                    path: parent,
                    traversable: None,
                    state: None,
                });
            }
        }
    }

    fn unknown_state(&mut self, path: &str, reason: &str) {
        debug!(path, reason, "metadata query failed");
        self.report.push(
            Finding::new(
                FindingCode::UnknownState,
                format!("could not inspect '{path}': {reason}"),
            )
            .with_subject(path),
        );
    }

    /// The target itself could not be inspected, so access is unproven.
    fn unknown_target(&mut self, path: &str, reason: &str) {
        debug!(path, reason, "target metadata query failed");
        self.report.push(
            Finding::new(
                FindingCode::UnknownState,
                format!("could not inspect '{path}': {reason}; access cannot be confirmed"),
            )
            .with_subject(path)
            .escalate(Severity::Error),
        );
    }

    fn finish(mut self) -> DiagnosticReport {
        let suggestions = {
            let ctx = RemediationContext {
                principal: self.report.principal(),
                platform: self.options.platform,
                target: self.target.as_ref(),
                parent: self.parent.as_ref(),
            };
            remediation::plan(self.report.findings(), &ctx)
        };
        for suggestion in suggestions {
            self.report.suggest(suggestion);
        }
        self.report.build()
    }
}

fn bit_consequence(kind: FileKind, bit: PermissionBit) -> &'static str {
    match (kind, bit) {
        (FileKind::Directory, PermissionBit::Read) => " (cannot list entries)",
        (FileKind::Directory, PermissionBit::Write) => " (cannot create or remove entries)",
        (FileKind::Directory, PermissionBit::Execute) => " (cannot enter or traverse)",
        (_, PermissionBit::Execute) => " (cannot run it)",
        _ => "",
    }
}

/// Directory containing `path`. A bare name lives in `.`; `/` has none.
fn parent_of(path: &str) -> Option<String> {
    let parent = Path::new(path).parent()?;
    if parent.as_os_str().is_empty() {
        Some(".".to_string())
    } else {
        Some(parent.to_string_lossy().into_owned())
    }
}
