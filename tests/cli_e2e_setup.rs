//! End-to-end tests for the `setup` command.

mod common;

use common::prelude::*;

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_setup_builds_workspace() {
    let fixture = TestFixture::new()
        .with_upstream_file("src/main.py", "print('hi')\n")
        .with_path_metadata();

    fixture
        .command()
        .arg("setup")
        .assert()
        .success()
        .stdout(predicate::str::contains("is ready"));

    fixture
        .child("_clean/src/main.py")
        .assert("print('hi')\n");
    fixture.child("_src/src/main.py").assert("print('hi')\n");
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_setup_without_metadata() {
    let fixture = TestFixture::new();

    fixture
        .command()
        .arg("setup")
        .assert()
        .failure()
        .stderr(predicate::str::contains("project-patcher init"));
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_setup_quiet() {
    let fixture = TestFixture::new()
        .with_upstream_file("a.txt", "a\n")
        .with_path_metadata();

    fixture
        .command()
        .arg("setup")
        .arg("--quiet")
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_setup_with_configured_directories() {
    let fixture = TestFixture::new()
        .with_upstream_file("a.txt", "a\n")
        .with_path_metadata()
        .with_config("[directories]\nclean = \"pristine\"\nworking = \"tree\"\n");

    fixture.command().arg("setup").assert().success();

    fixture.child("pristine/a.txt").assert("a\n");
    fixture.child("tree/a.txt").assert("a\n");

    fixture
        .command()
        .arg("setup")
        .arg("--working-dir")
        .arg("flag-tree")
        .assert()
        .success();
    fixture.child("flag-tree/a.txt").assert("a\n");
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_setup_missing_plugin_message() {
    let fixture = TestFixture::new()
        .with_upstream_file("a.txt", "a\n")
        .with_config("[missing.post_processors]\n\"lint:black\" = \"Install the lint plugin\"\n");
    let metadata = fixture.path_metadata(&["lint:black"]);
    let fixture = fixture.with_metadata(&metadata);

    fixture
        .command()
        .arg("setup")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Install the lint plugin"));

    fixture
        .command()
        .arg("setup")
        .arg("--keep-going")
        .assert()
        .success()
        .stderr(predicate::str::contains("Install the lint plugin"));
    fixture.child("_src/a.txt").assert("a\n");
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_setup_import() {
    let source = TestFixture::new()
        .with_upstream_file("a.txt", "a\n")
        .with_path_metadata();
    let fixture = TestFixture::new();

    fixture
        .command()
        .arg("setup")
        .arg("--import")
        .arg(source.metadata_path())
        .assert()
        .success();

    fixture
        .child("project_metadata.json")
        .assert(predicate::path::exists());
    fixture.child("_src/a.txt").assert("a\n");
}
