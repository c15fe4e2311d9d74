// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! End-to-end runs of a parsed manifest through the converger.

mod common;

use std::sync::Arc;

use common::{context, RecordingHost, RecordingResolver};
use fsconverge_core::application::{Converger, Manifest, OutcomeStatus};
use fsconverge_core::infrastructure::HandlebarsRenderer;

fn converger() -> Converger {
    let host = Arc::new(RecordingHost::new());
    let resolver = Arc::new(RecordingResolver::unsupported());
    Converger::new(context(&host, &resolver), Arc::new(HandlebarsRenderer::new()))
}

fn manifest(root: &std::path::Path) -> Manifest {
    let yaml = format!(
        r#"
resources:
  - kind: directory
    path: {root}/srv/app
    recursive: true
    mode: "0755"
  - kind: file
    path: {root}/missing/motd
    content: "unreachable"
  - kind: file
    path: {root}/srv/app/motd
    content: "hello"
    mode: "0600"
  - kind: template
    path: {root}/srv/app/app.conf
    template:
      source: "port={{{{port}}}}"
      variables:
        port: 8080
"#,
        root = root.display()
    );
    Manifest::from_yaml_str(&yaml).unwrap()
}

#[test]
fn test_failures_are_isolated_per_resource() {
    let dir = tempfile::tempdir().unwrap();
    let manifest = manifest(dir.path());
    let converger = converger();

    let report = converger.converge_all(&manifest.resources);

    let statuses: Vec<_> = report.outcomes.iter().map(|o| o.status).collect();
    assert_eq!(
        statuses,
        vec![
            OutcomeStatus::Changed,
            OutcomeStatus::Failed,
            OutcomeStatus::Changed,
            OutcomeStatus::Changed,
        ]
    );
    assert!(report.outcomes[1].error.is_some());
    assert_eq!(
        std::fs::read_to_string(dir.path().join("srv/app/app.conf")).unwrap(),
        "port=8080"
    );
}

#[test]
fn test_second_run_reports_no_changes() {
    let dir = tempfile::tempdir().unwrap();
    let manifest = manifest(dir.path());
    let converger = converger();

    converger.converge_all(&manifest.resources);
    let report = converger.converge_all(&manifest.resources);

    assert_eq!(report.count(OutcomeStatus::Changed), 0);
    assert_eq!(report.count(OutcomeStatus::Unchanged), 3);
    assert_eq!(report.count(OutcomeStatus::Failed), 1);
}

#[test]
fn test_delete_action() {
    let dir = tempfile::tempdir().unwrap();
    let stale = dir.path().join("stale");
    std::fs::write(&stale, "x").unwrap();
    let yaml = format!(
        "resources:\n  - kind: file\n    path: {}\n    action: delete\n",
        stale.display()
    );
    let manifest = Manifest::from_yaml_str(&yaml).unwrap();

    let report = converger().converge_all(&manifest.resources);

    assert_eq!(report.outcomes[0].status, OutcomeStatus::Changed);
    assert!(!stale.exists());
}

#[test]
fn test_load_current_resource_dispatch() {
    let dir = tempfile::tempdir().unwrap();
    let manifest = manifest(dir.path());
    let converger = converger();

    converger.converge_all(&manifest.resources);
    let current = converger.load_current_resource(&manifest.resources[2].resource);

    assert!(current.exists);
    assert_eq!(current.mode.map(|m| m.bits()), Some(0o600));
    assert!(current.checksum.is_some());
}

#[test]
fn test_path_over_limit_fails_only_that_resource() {
    let dir = tempfile::tempdir().unwrap();
    let short = dir.path().join("a");
    let long = dir.path().join("x".repeat(64));
    let yaml = format!(
        "resources:\n  - kind: file\n    path: {}\n  - kind: file\n    path: {}\n",
        long.display(),
        short.display()
    );
    let manifest = Manifest::from_yaml_str(&yaml).unwrap();
    let limit = short.to_string_lossy().len() + 8;

    let report = converger().with_path_limit(limit).converge_all(&manifest.resources);

    assert_eq!(report.outcomes[0].status, OutcomeStatus::Failed);
    assert!(report.outcomes[0].error.as_deref().unwrap().contains("too long"));
    assert_eq!(report.outcomes[1].status, OutcomeStatus::Changed);
    assert!(!long.exists());
    assert!(short.exists());
}

#[test]
fn test_invalid_paths_fail_beside_valid_ones() {
    let dir = tempfile::tempdir().unwrap();
    let good = dir.path().join("ok");
    let long = format!("/{}", "x".repeat(5004));
    let yaml = format!(
        r#"
resources:
  - kind: file
    path: ""
  - kind: file
    path: {long}
  - kind: file
    path: {good}
    content: "ok"
"#,
        good = good.display()
    );
    let manifest = Manifest::from_yaml_str(&yaml).unwrap();

    let report = converger().converge_all(&manifest.resources);

    let statuses: Vec<_> = report.outcomes.iter().map(|o| o.status).collect();
    assert_eq!(
        statuses,
        vec![
            OutcomeStatus::Failed,
            OutcomeStatus::Failed,
            OutcomeStatus::Changed,
        ]
    );
    assert!(report.outcomes[0].error.as_deref().unwrap().contains("empty"));
    assert!(report.outcomes[1].error.as_deref().unwrap().contains("too long"));
    assert_eq!(std::fs::read_to_string(&good).unwrap(), "ok");
}

#[test]
fn test_raised_path_limit_admits_long_paths() {
    let dir = tempfile::tempdir().unwrap();
    let long = dir.path().join("y".repeat(200)).join("z".repeat(200));
    let yaml = format!(
        "resources:\n  - kind: directory\n    path: {}\n    recursive: true\n",
        long.display()
    );
    let manifest = Manifest::from_yaml_str(&yaml).unwrap();
    let limit = long.to_string_lossy().len() - 1;

    let rejected = converger().with_path_limit(limit).converge_all(&manifest.resources);
    let accepted = converger()
        .with_path_limit(limit + 1)
        .converge_all(&manifest.resources);

    assert_eq!(rejected.outcomes[0].status, OutcomeStatus::Failed);
    assert_eq!(accepted.outcomes[0].status, OutcomeStatus::Changed);
    assert!(long.is_dir());
}
