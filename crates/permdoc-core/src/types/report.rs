//! The diagnostic report and its builder.

use serde::{Deserialize, Serialize};

use super::access::AccessCapabilities;
use super::file_state::FileState;
use super::finding::{Finding, FindingCode, Severity, Suggestion};
use super::identity::Principal;
use super::link::LinkChain;
use super::platform::Platform;
use super::request::{AccessRequest, TargetHint};
use super::search_path::ResolvedLocation;

/// Exit status when no error-severity finding is present.
pub const EXIT_OK: i32 = 0;
/// Exit status when at least one error-severity finding is present.
pub const EXIT_FINDINGS: i32 = 1;
/// Exit status for malformed input.
pub const EXIT_USAGE: i32 = 2;

/// Outcome of the parent directory traversal check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParentCheck {
    pub path: String,
    /// `None` when the parent could not be inspected
    pub traversable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<FileState>,
}

/// Complete, immutable result of one diagnosis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosticReport {
    request: AccessRequest,
    treated_as: TargetHint,
    platform: Platform,
    policy: String,
    principal: Principal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    resolution: Option<ResolvedLocation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    inspected_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    state: Option<FileState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    link_chain: Option<LinkChain>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    link_target: Option<FileState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    capabilities: Option<AccessCapabilities>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    parent: Option<ParentCheck>,
    findings: Vec<Finding>,
    suggestions: Vec<Suggestion>,
}

impl DiagnosticReport {
    pub const fn request(&self) -> &AccessRequest {
        &self.request
    }

    pub const fn treated_as(&self) -> TargetHint {
        self.treated_as
    }

    pub const fn platform(&self) -> Platform {
        self.platform
    }

    /// Name of the access policy that computed capabilities.
    pub fn policy(&self) -> &str {
        &self.policy
    }

    pub const fn principal(&self) -> &Principal {
        &self.principal
    }

    pub const fn resolution(&self) -> Option<&ResolvedLocation> {
        self.resolution.as_ref()
    }

    /// Path that was actually inspected (after command resolution).
    pub fn inspected_path(&self) -> Option<&str> {
        self.inspected_path.as_deref()
    }

    /// State of the inspected path itself (a symlink stays a symlink).
    pub const fn state(&self) -> Option<&FileState> {
        self.state.as_ref()
    }

    pub const fn link_chain(&self) -> Option<&LinkChain> {
        self.link_chain.as_ref()
    }

    /// State of the final symlink target, when the path is a symlink.
    pub const fn link_target(&self) -> Option<&FileState> {
        self.link_target.as_ref()
    }

    pub const fn capabilities(&self) -> Option<&AccessCapabilities> {
        self.capabilities.as_ref()
    }

    pub const fn parent(&self) -> Option<&ParentCheck> {
        self.parent.as_ref()
    }

    /// Findings in the order the checks ran.
    pub fn findings(&self) -> &[Finding] {
        &self.findings
    }

    /// Remediation steps in finding order.
    pub fn suggestions(&self) -> &[Suggestion] {
        &self.suggestions
    }

    /// Finding codes in report order.
    pub fn codes(&self) -> Vec<FindingCode> {
        self.findings.iter().map(|f| f.code).collect()
    }

    pub fn has_code(&self, code: FindingCode) -> bool {
        self.findings.iter().any(|f| f.code == code)
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.findings.iter().filter(|f| f.severity == severity).count()
    }

    pub fn has_errors(&self) -> bool {
        self.count(Severity::Error) > 0
    }

    /// Highest severity present, if any finding exists.
    pub fn highest_severity(&self) -> Option<Severity> {
        self.findings.iter().map(|f| f.severity).max()
    }

    /// Process exit status for this report.
    pub fn exit_code(&self) -> i32 {
        if self.has_errors() {
            EXIT_FINDINGS
        } else {
            EXIT_OK
        }
    }
}

/// Assembles a [`DiagnosticReport`] while checks run.
#[derive(Debug)]
pub struct ReportBuilder {
    report: DiagnosticReport,
}

impl ReportBuilder {
    pub fn new(request: AccessRequest, principal: Principal, platform: Platform, policy: &str) -> Self {
        let treated_as = request.effective_hint();
        Self {
            report: DiagnosticReport {
                request,
                treated_as,
                platform,
                policy: policy.to_string(),
                principal,
                resolution: None,
                inspected_path: None,
                state: None,
                link_chain: None,
                link_target: None,
                capabilities: None,
                parent: None,
                findings: Vec::new(),
                suggestions: Vec::new(),
            },
        }
    }

    pub const fn principal(&self) -> &Principal {
        &self.report.principal
    }

    pub fn findings(&self) -> &[Finding] {
        &self.report.findings
    }

    /// Append a finding and return its index.
    pub fn push(&mut self, finding: Finding) -> usize {
        tracing::debug!(code = %finding.code, severity = %finding.severity, "finding");
        self.report.findings.push(finding);
        self.report.findings.len() - 1
    }

    pub fn extend(&mut self, findings: impl IntoIterator<Item = Finding>) {
        for finding in findings {
            self.push(finding);
        }
    }

    pub fn suggest(&mut self, suggestion: Suggestion) {
        self.report.suggestions.push(suggestion);
    }

    pub fn resolution(&mut self, location: ResolvedLocation) -> &mut Self {
        self.report.resolution = Some(location);
        self
    }

    pub fn inspected_path(&mut self, path: impl Into<String>) -> &mut Self {
        self.report.inspected_path = Some(path.into());
        self
    }

    pub fn state(&mut self, state: FileState) -> &mut Self {
        self.report.state = Some(state);
        self
    }

    pub fn link_chain(&mut self, chain: LinkChain) -> &mut Self {
        self.report.link_chain = Some(chain);
        self
    }

    pub fn link_target(&mut self, state: FileState) -> &mut Self {
        self.report.link_target = Some(state);
        self
    }

    pub fn capabilities(&mut self, caps: AccessCapabilities) -> &mut Self {
        self.report.capabilities = Some(caps);
        self
    }

    pub fn parent(&mut self, parent: ParentCheck) -> &mut Self {
        self.report.parent = Some(parent);
        self
    }

    /// Freeze the report.
    #[must_use]
    pub fn build(self) -> DiagnosticReport {
        self.report
    }
}
