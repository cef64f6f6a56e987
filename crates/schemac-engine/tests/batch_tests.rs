//! End-to-end batch runs against a temporary directory

use std::fs;
use std::path::Path;

use pretty_assertions::assert_eq;
use schemac_core::{Config, ErrorKind, Outcome};
use schemac_engine::{run_batch, Mode};

const BLOG: &str = r#"[
    {"name": "blog", "type": "fixed", "tables": [
        {"name": "users", "columns": [
            {"name": "id", "type": "serial", "size": "INT"},
            {"name": "handle", "type": "string", "maxLength": 50}
        ], "indexes": [{"type": "primary", "columns": ["id"]}]},
        {"name": "posts", "columns": [
            {"name": "id", "type": "serial", "size": "INT"},
            {"name": "userId", "type": "FK", "column": "users.id", "ondelete": "CASCADE"}
        ], "indexes": [{"type": "primary", "columns": ["id"]}]}
    ]}
]"#;

const BROKEN_SECOND_DATABASE: &str = r#"[
    {"name": "good", "type": "fixed", "tables": [{"name": "items"}]},
    {"name": "bad", "type": "instance", "tables": [
        {"name": "items", "columns": [{"name": "qty", "type": "integer", "size": "TINYINT", "unsigned": true, "maxValue": 300}]}
    ]}
]"#;

fn setup(files: &[(&str, &str)]) -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir(dir.path().join("in")).unwrap();
    for (name, contents) in files {
        fs::write(dir.path().join("in").join(name), contents).unwrap();
    }
    dir
}

fn outputs(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[test]
fn sql_batch_writes_one_file_per_database() {
    let dir = setup(&[("blog.json", BLOG)]);
    let out = dir.path().join("out");

    let report = run_batch(Mode::Sql, &dir.path().join("in"), &out, &Config::default()).unwrap();

    assert!(!report.has_failures());
    assert_eq!(outputs(&out), vec!["blog.core.sql"]);

    let sql = fs::read_to_string(out.join("blog.core.sql")).unwrap();
    assert!(sql.starts_with("CREATE DATABASE `blog` CHARACTER SET utf8mb4 COLLATE utf8mb4_unicode_ci;\nUSE `blog`;\n"));
    assert!(sql.contains(
        "`userId` INT UNSIGNED NOT NULL, PRIMARY KEY (`id`), FOREIGN KEY (`userId`) REFERENCES `users` (`id`) ON DELETE CASCADE);"
    ));
}

#[test]
fn failing_file_writes_nothing_and_batch_continues() {
    let dir = setup(&[("blog.json", BLOG), ("broken.json", BROKEN_SECOND_DATABASE)]);
    let out = dir.path().join("out");

    let report = run_batch(Mode::Sql, &dir.path().join("in"), &out, &Config::default()).unwrap();

    assert!(report.has_failures());
    assert_eq!(report.summary.compiled, 1);
    assert_eq!(report.summary.failed, 1);
    assert_eq!(outputs(&out), vec!["blog.core.sql"]);

    match &report.files[1].outcome {
        Outcome::Failed { code, .. } => assert_eq!(*code, Some(ErrorKind::Range)),
        other => panic!("expected failure, got {:?}", other),
    }
}

#[test]
fn invalid_schema_names_are_skipped() {
    let dir = setup(&[("Blog Draft.json", BLOG), ("blog.json", BLOG)]);
    let out = dir.path().join("out");

    let report = run_batch(Mode::Descriptor, &dir.path().join("in"), &out, &Config::default()).unwrap();

    assert_eq!(report.summary.skipped, 1);
    assert_eq!(report.summary.compiled, 1);
    assert!(!report.has_failures());
    assert_eq!(outputs(&out), vec!["blog.js"]);
}

#[test]
fn rerun_produces_identical_digests() {
    let dir = setup(&[("blog.json", BLOG)]);
    let input = dir.path().join("in");
    let out = dir.path().join("out");

    let first = run_batch(Mode::Descriptor, &input, &out, &Config::default()).unwrap();
    let second = run_batch(Mode::Descriptor, &input, &out, &Config::default()).unwrap();

    assert_eq!(first.files, second.files);
}
