//! Remediation planning.
//!
//! Each actionable finding (warning or error) gets exactly one
//! [`Suggestion`], phrased as the smallest change that removes it. The
//! plan keeps the order of the findings, so structural blockers such as
//! an untraversable parent always appear as their own step.

use permdoc_core::{
    EntryMeta, FileKind, FileState, Finding, FindingCode, PermissionBit,
    PermissionClass, Platform, Principal, Suggestion,
};
use permdoc_inspect::applicable_class;

/// What the planner knows about the diagnosed target.
#[derive(Debug, Clone, Copy)]
pub struct RemediationContext<'a> {
    pub principal: &'a Principal,
    pub platform: Platform,
    /// Entry whose permissions were evaluated
    pub target: Option<&'a FileState>,
    /// Parent directory of the inspected path
    pub parent: Option<&'a FileState>,
}

/// One suggestion per actionable finding, in finding order.
pub fn plan(findings: &[Finding], ctx: &RemediationContext<'_>) -> Vec<Suggestion> {
    findings
        .iter()
        .enumerate()
        .filter(|(_, f)| f.is_actionable())
        .map(|(index, finding)| {
            let (action, command) = remedy(finding, ctx);
            Suggestion {
                finding_index: index,
                code: finding.code,
                action,
                command,
            }
        })
        .collect()
}

fn remedy(finding: &Finding, ctx: &RemediationContext<'_>) -> (String, Option<String>) {
    let subject = finding.subject.as_deref().unwrap_or(".");
    let quoted = shell_quote(subject);

    if let Some((class, bit)) = finding.code.class_and_bit() {
        return grant_bit(ctx, subject, class, bit);
    }

    match finding.code {
        FindingCode::CommandNotFound => (
            format!(
                "Install '{subject}' or add the directory that contains it to the search path"
            ),
            Some("export PATH=\"/path/to/dir:$PATH\"".to_string()),
        ),
        FindingCode::TargetMissing => (
            format!("Create '{subject}' or correct the path; check the spelling and the working directory"),
            Some(format!("ls -la {}", shell_quote(&parent_dir(subject)))),
        ),
        FindingCode::UnknownState => {
            let command = match ctx.platform {
                Platform::Linux => format!("namei -l {quoted}"),
                _ => format!("ls -ld {quoted}"),
            };
            (
                format!("Inspect every component of '{subject}' with a user allowed to read it"),
                Some(command),
            )
        }
        FindingCode::DanglingSymlink => (
            format!("Point '{subject}' at an existing target, or remove the link"),
            Some(format!("ln -sfn /path/to/target {quoted}")),
        ),
        FindingCode::LinkCycle => (
            format!("Re-point one link in the chain starting at '{subject}' so it ends at a real file"),
            Some(format!("ls -l {quoted}")),
        ),
        FindingCode::NoExecute => (
            format!("Set an execute bit on '{subject}'; even the superuser needs one to run it"),
            Some(format!("chmod u+x {quoted}")),
        ),
        FindingCode::AccessDenied => deny_remedy(ctx, subject),
        FindingCode::ParentNotTraversable => traverse_remedy(ctx, subject),
        FindingCode::EmptyPathSegment
        | FindingCode::RelativePathEntry
        | FindingCode::MissingPathEntry
        | FindingCode::PathEntryNotDirectory
        | FindingCode::DuplicatePathEntry
        | FindingCode::CommandResolved
        | FindingCode::NotOwner
        | FindingCode::SuperuserBypass
        | FindingCode::SymlinkResolved
        | FindingCode::HardLinkPresent
        | FindingCode::OwnerNoRead
        | FindingCode::OwnerNoWrite
        | FindingCode::OwnerNoExecute
        | FindingCode::GroupNoRead
        | FindingCode::GroupNoWrite
        | FindingCode::GroupNoExecute
        | FindingCode::OtherNoRead
        | FindingCode::OtherNoWrite
        | FindingCode::OtherNoExecute => (format!("Review '{subject}'"), None),
    }
}

/// `sudo ` unless the principal may change the entry itself.
fn privilege(ctx: &RemediationContext<'_>, meta: Option<&EntryMeta>) -> &'static str {
    let own = meta.is_some_and(|m| m.owner.id == ctx.principal.uid());
    if own || ctx.principal.is_superuser() {
        ""
    } else {
        "sudo "
    }
}

fn grant_bit(
    ctx: &RemediationContext<'_>,
    path: &str,
    class: PermissionClass,
    bit: PermissionBit,
) -> (String, Option<String>) {
    let meta = ctx.target.and_then(FileState::meta);
    let sudo = privilege(ctx, meta);
    let quoted = shell_quote(path);
    let who = class.chmod_letter();
    let letter = bit.chmod_letter();
    let user = ctx.principal.username();

    match class {
        PermissionClass::Owner => (
            format!("You own '{path}'; grant yourself {bit} permission"),
            Some(format!("chmod {who}+{letter} {quoted}")),
        ),
        PermissionClass::Group => {
            let group = meta.map_or("its group", |m| m.group.name.as_str());
            (
                format!("Grant {bit} permission to the group '{group}', which {user} belongs to"),
                Some(format!("{sudo}chmod {who}+{letter} {quoted}")),
            )
        }
        PermissionClass::Other => match meta {
            // Joining the owning group is narrower than opening the
            // entry to everyone.
            Some(m) if m.mode.triple(PermissionClass::Group).has(bit) => (
                format!(
                    "The group '{}' already has {bit} permission; add {user} to that group",
                    m.group.name
                ),
                Some(ctx.platform.add_to_group_command(user, &m.group.name)),
            ),
            _ => (
                format!(
                    "{user} is neither owner nor group member; grant {bit} to others, or change ownership"
                ),
                Some(format!("{sudo}chmod {who}+{letter} {quoted}")),
            ),
        },
    }
}

fn deny_remedy(ctx: &RemediationContext<'_>, path: &str) -> (String, Option<String>) {
    let meta = ctx.target.and_then(FileState::meta);
    let quoted = shell_quote(path);
    let user = ctx.principal.username();
    let is_dir = ctx.target.is_some_and(|t| t.kind() == FileKind::Directory);
    let class = ctx
        .target
        .and_then(FileState::meta)
        .map(|m| applicable_class(m, ctx.principal));

    match class {
        Some(PermissionClass::Owner) => {
            let bits = if is_dir { "rwx" } else { "rw" };
            (
                format!("You own '{path}' but removed your own access; restore it"),
                Some(format!("chmod u+{bits} {quoted}")),
            )
        }
        _ => {
            let owner = meta.map_or("its owner", |m| m.owner.name.as_str());
            (
                format!(
                    "Nothing in the mode grants {user} access; take ownership from {owner}, or use the per-bit grants above"
                ),
                Some(format!("{}chown {user} {quoted}", privilege(ctx, meta))),
            )
        }
    }
}

fn traverse_remedy(ctx: &RemediationContext<'_>, dir: &str) -> (String, Option<String>) {
    let meta = ctx.parent.and_then(FileState::meta);
    let quoted = shell_quote(dir);
    let user = ctx.principal.username();
    let who = meta.map_or('o', |m| applicable_class(m, ctx.principal).chmod_letter());
    (
        format!("Allow {user} to traverse '{dir}' (execute on a directory does not allow listing it)"),
        Some(format!("{}chmod {who}+x {quoted}", privilege(ctx, meta))),
    )
}

fn parent_dir(path: &str) -> String {
    match std::path::Path::new(path).parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_string_lossy().into_owned(),
        Some(_) => ".".to_string(),
        None => "/".to_string(),
    }
}

/// Quote `s` for a POSIX shell when it contains anything unusual.
#[must_use]
pub fn shell_quote(s: &str) -> String {
    let safe = !s.is_empty()
        && s.chars()
            .all(|c| c.is_ascii_alphanumeric() || "/._-+:,@%=".contains(c));
    if safe {
        s.to_string()
    } else {
        format!("'{}'", s.replace('\'', r"'\''"))
    }
}
