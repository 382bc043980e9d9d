//! Diagnoses against a real temporary directory.

use std::os::unix::fs::symlink;

use permdoc::{
    render, AccessRequest, Diagnostics, EngineOptions, FindingCode, ReportFormat, SystemHost,
    UnixPolicy,
};

fn diagnose(path: &std::path::Path) -> permdoc::DiagnosticReport {
    let host = SystemHost::new();
    let policy = UnixPolicy::default();
    Diagnostics::new(&host, &policy)
        .with_options(EngineOptions::default())
        .diagnose(&AccessRequest::path(path.to_str().unwrap()).unwrap())
}

#[test]
fn dangling_symlink_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let link = dir.path().join("current");
    symlink(dir.path().join("release-7"), &link).unwrap();

    let report = diagnose(&link);
    assert_eq!(report.codes(), [FindingCode::DanglingSymlink]);
    assert_ne!(report.exit_code(), 0);
}

#[test]
fn symlink_to_own_file_resolves() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("data.txt");
    std::fs::write(&file, b"x").unwrap();
    let link = dir.path().join("alias");
    symlink(&file, &link).unwrap();

    let report = diagnose(&link);
    assert!(report.has_code(FindingCode::SymlinkResolved));
    assert!(!report.has_errors());
    assert_eq!(report.link_chain().unwrap().link_count(), 1);
}

#[test]
fn hard_link_is_informational() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("original");
    std::fs::write(&file, b"x").unwrap();
    std::fs::hard_link(&file, dir.path().join("second")).unwrap();

    let report = diagnose(&file);
    assert!(report.has_code(FindingCode::HardLinkPresent));
    assert_eq!(report.exit_code(), 0);
}

#[test]
fn structured_render_is_stable() {
    let dir = tempfile::tempdir().unwrap();
    let report = diagnose(&dir.path().join("missing"));
    let a = render(&report, ReportFormat::Structured).unwrap();
    let b = render(&report, ReportFormat::Structured).unwrap();
    assert_eq!(a, b);
    assert!(a.contains("TARGET_MISSING"));
}
