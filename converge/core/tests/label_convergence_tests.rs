// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Security label convergence through the providers.
//!
//! Uses an in-memory resolver so the tests run on hosts without SELinux.
//! New objects report an inherited label, as they would under a real policy.

mod common;

use std::sync::Arc;

use common::{context, rpath, RecordingHost, RecordingResolver};
use fsconverge_core::application::{
    ConvergenceProvider, DirectoryProvider, FileProvider, TemplateProvider,
};
use fsconverge_core::domain::attributes::{AccessAttributes, FileMode};
use fsconverge_core::domain::resource::{DirectoryResource, FileResource, TemplateResource};
use fsconverge_core::domain::template::TemplateSource;
use fsconverge_core::infrastructure::HandlebarsRenderer;
use serde_json::json;

const INHERITED: &str = "unconfined_u:object_r:user_tmp_t:s0";
const ETC: &str = "system_u:object_r:etc_t:s0";
const HTTPD: &str = "system_u:object_r:httpd_sys_content_t:s0";

fn file_provider(resolver: &Arc<RecordingResolver>) -> FileProvider {
    FileProvider::new(context(&Arc::new(RecordingHost::new()), resolver))
}

#[test]
fn test_created_file_gets_default_label() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("conf");
    let resolver = Arc::new(
        RecordingResolver::supported()
            .with_inherited(INHERITED)
            .with_default(&path, ETC),
    );
    let provider = file_provider(&resolver);

    let result = provider
        .apply_create_action(&FileResource::new(rpath(&path)).with_content("x"))
        .unwrap();

    assert!(result.updated);
    assert_eq!(resolver.label_of(&path).as_deref(), Some(ETC));
}

#[test]
fn test_default_label_is_a_fixed_point() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("conf");
    std::fs::write(&path, "x").unwrap();
    let resolver = Arc::new(RecordingResolver::supported().with_default(&path, ETC));
    resolver.put_label(&path, ETC);
    let provider = file_provider(&resolver);

    let result = provider
        .apply_create_action(&FileResource::new(rpath(&path)))
        .unwrap();

    assert!(!result.updated);
    assert_eq!(resolver.sets(), 0);
}

#[test]
fn test_declared_label_applied_once() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("index.html");
    std::fs::write(&path, "x").unwrap();
    let resolver = Arc::new(RecordingResolver::supported().with_default(&path, ETC));
    resolver.put_label(&path, INHERITED);
    let provider = file_provider(&resolver);
    let desired = FileResource::new(rpath(&path)).with_security_label(HTTPD);

    assert!(provider.apply_create_action(&desired).unwrap().updated);
    assert_eq!(resolver.label_of(&path).as_deref(), Some(HTTPD));

    assert!(!provider.apply_create_action(&desired).unwrap().updated);
    assert_eq!(resolver.sets(), 1);
}

#[test]
fn test_label_equal_to_default_is_converged_even_if_declared_differs() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("index.html");
    std::fs::write(&path, "x").unwrap();
    let resolver = Arc::new(RecordingResolver::supported().with_default(&path, ETC));
    resolver.put_label(&path, ETC);
    let provider = file_provider(&resolver);

    let desired = FileResource::new(rpath(&path)).with_security_label(HTTPD);
    assert!(!provider.apply_create_action(&desired).unwrap().updated);
    assert_eq!(resolver.sets(), 0);
}

#[test]
fn test_no_default_and_no_declaration_leaves_label() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("misc");
    std::fs::write(&path, "x").unwrap();
    let resolver = Arc::new(RecordingResolver::supported());
    resolver.put_label(&path, INHERITED);
    let provider = file_provider(&resolver);

    assert!(!provider
        .apply_create_action(&FileResource::new(rpath(&path)))
        .unwrap()
        .updated);
    assert_eq!(resolver.label_of(&path).as_deref(), Some(INHERITED));
}

#[test]
fn test_unreadable_label_without_default_is_left_alone() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("conf");
    std::fs::write(&path, "x").unwrap();
    let resolver = Arc::new(RecordingResolver::supported());
    let provider = file_provider(&resolver);

    let result = provider
        .apply_create_action(&FileResource::new(rpath(&path)).with_security_label(HTTPD))
        .unwrap();

    assert!(!result.updated);
    assert_eq!(resolver.sets(), 0);
    assert_eq!(resolver.label_of(&path), None);
}

#[test]
fn test_failed_label_write_is_not_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("conf");
    std::fs::write(&path, "x").unwrap();
    let resolver = Arc::new(RecordingResolver::supported().failing_writes());
    resolver.put_label(&path, INHERITED);
    let provider = file_provider(&resolver);

    let result = provider
        .apply_create_action(&FileResource::new(rpath(&path)).with_security_label(HTTPD))
        .unwrap();

    assert!(!result.updated);
    assert_eq!(resolver.sets(), 1);
}

#[test]
fn test_unsupported_host_makes_no_label_calls() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("conf");
    let resolver = Arc::new(RecordingResolver::unsupported());
    let provider = file_provider(&resolver);
    let desired = FileResource::new(rpath(&path))
        .with_content("x")
        .with_security_label(HTTPD);

    provider.apply_create_action(&desired).unwrap();
    provider.apply_create_action(&desired).unwrap();
    let current = provider.load_current_resource(&desired);

    assert_eq!(current.security_label, None);
    assert_eq!(resolver.gets(), 0);
    assert_eq!(resolver.sets(), 0);
    assert!(resolver.lookups().is_empty());
}

#[test]
fn test_default_lookup_uses_managed_kind_and_declared_mode() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("secret");
    let subdir = dir.path().join("www");
    let host = Arc::new(RecordingHost::new());
    let resolver = Arc::new(RecordingResolver::supported().with_inherited(INHERITED));

    FileProvider::new(context(&host, &resolver))
        .apply_create_action(&FileResource::new(rpath(&file)).with_attributes(AccessAttributes {
            mode: Some(FileMode::new(0o640)),
            ..Default::default()
        }))
        .unwrap();
    DirectoryProvider::new(context(&host, &resolver))
        .apply_create_action(&DirectoryResource::new(rpath(&subdir)))
        .unwrap();

    let lookups = resolver.lookups();
    assert_eq!(lookups, vec![(file, 0o100640), (subdir, 0o040000)]);
}

#[test]
fn test_directory_and_template_converge_labels() {
    let dir = tempfile::tempdir().unwrap();
    let subdir = dir.path().join("html");
    let page = subdir.join("index.html");
    let host = Arc::new(RecordingHost::new());
    let resolver = Arc::new(
        RecordingResolver::supported()
            .with_inherited(INHERITED)
            .with_default(&subdir, HTTPD),
    );

    let directories = DirectoryProvider::new(context(&host, &resolver));
    let templates = TemplateProvider::new(
        context(&host, &resolver),
        Arc::new(HandlebarsRenderer::new()),
    );
    let page_resource = TemplateResource::new(
        rpath(&page),
        TemplateSource::inline("<h1>{{t}}</h1>", json!({"t": "hi"})),
    )
    .with_security_label(HTTPD);

    directories
        .apply_create_action(&DirectoryResource::new(rpath(&subdir)))
        .unwrap();
    templates.apply_create_action(&page_resource).unwrap();

    assert_eq!(resolver.label_of(&subdir).as_deref(), Some(HTTPD));
    assert_eq!(resolver.label_of(&page).as_deref(), Some(HTTPD));

    let sets = resolver.sets();
    assert!(!templates.apply_create_action(&page_resource).unwrap().updated);
    assert_eq!(resolver.sets(), sets);
}
