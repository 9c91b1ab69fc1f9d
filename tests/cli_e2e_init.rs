//! End-to-end tests for the `init` command.
//!
//! These tests invoke the actual CLI binary and validate the metadata
//! documents the `init` subcommand writes.

mod common;

use common::prelude::*;

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_init_git_source() {
    let fixture = TestFixture::new();

    fixture
        .command()
        .arg("init")
        .arg("--git")
        .arg("https://example.com/project.git")
        .arg("--tag")
        .arg("v1.0")
        .arg("--post-processor")
        .arg("notebook")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created"));

    let document: serde_json::Value = serde_json::from_str(&fixture.read("project_metadata.json")).unwrap();
    assert_eq!(
        document,
        serde_json::json!({
            "sources": [{"type": "git", "repository": "https://example.com/project.git", "tag": "v1.0"}],
            "post_processors": ["notebook"]
        })
    );
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_init_refuses_to_overwrite() {
    let fixture = TestFixture::new().with_metadata("{}");

    fixture
        .command()
        .arg("init")
        .arg("--path")
        .arg("/srv/project")
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    fixture.child("project_metadata.json").assert("{}");

    fixture
        .command()
        .arg("init")
        .arg("--path")
        .arg("/srv/project")
        .arg("--force")
        .assert()
        .success();

    fixture
        .child("project_metadata.json")
        .assert(predicate::str::contains("/srv/project"));
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_init_without_source_fails() {
    let fixture = TestFixture::new();

    fixture
        .command()
        .arg("init")
        .assert()
        .failure()
        .stderr(predicate::str::contains("No source given"));

    fixture
        .child("project_metadata.json")
        .assert(predicate::path::missing());
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_init_interactive_conflicts_with_source_flags() {
    let fixture = TestFixture::new();

    fixture
        .command()
        .arg("init")
        .arg("--interactive")
        .arg("--url")
        .arg("https://example.com/data.csv")
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_init_warns_about_unknown_post_processor() {
    let fixture = TestFixture::new();

    fixture
        .command()
        .arg("init")
        .arg("--path")
        .arg("/srv/project")
        .arg("--post-processor")
        .arg("lint:black")
        .assert()
        .success()
        .stderr(predicate::str::contains("lint:black"));
}
