use assert_cmd::Command;
use predicates::prelude::*;

fn bundler() -> Command {
    let mut cmd = Command::cargo_bin("flutter-bundler").unwrap();
    cmd.env_remove("FLUTTER_ROOT")
        .env_remove("FLUTTER_ENGINE_VERSION")
        .env_remove("FLUTTER_BUNDLER_WORKSPACE");
    cmd
}

#[test]
fn help_lists_subcommands() {
    bundler()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("build").and(predicate::str::contains("run")));
}

#[test]
fn build_help_lists_targets() {
    bundler()
        .args(["build", "--help"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("mac")
                .and(predicate::str::contains("dmg"))
                .and(predicate::str::contains("nsis"))
                .and(predicate::str::contains("snap")),
        );
}

#[test]
fn unknown_target_is_rejected_before_any_stage() {
    let tmp = tempfile::tempdir().unwrap();
    bundler()
        .args(["build", "msi", "--project-dir"])
        .arg(tmp.path())
        .assert()
        .code(2)
        .stderr(predicate::str::contains("invalid value 'msi'"));

    assert_eq!(std::fs::read_dir(tmp.path()).unwrap().count(), 0);
}

#[test]
fn missing_manifest_fails() {
    let tmp = tempfile::tempdir().unwrap();
    bundler()
        .args(["build", "mac", "--project-dir"])
        .arg(tmp.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("could not find Cargo.toml"));
}

#[test]
fn missing_toolkit_version_fails_without_side_effects() {
    let tmp = tempfile::tempdir().unwrap();
    std::fs::write(
        tmp.path().join("Cargo.toml"),
        "[package]\nname = \"demo\"\nversion = \"0.1.0\"\n\n[package.metadata.flutter]\nidentifier = \"com.example.demo\"\n\n[workspace]\n",
    )
    .unwrap();

    bundler()
        .args(["build", "dmg", "--project-dir"])
        .arg(tmp.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("manifest error"));

    assert!(!tmp.path().join("target").exists());
}

#[test]
fn missing_project_dir_fails() {
    let tmp = tempfile::tempdir().unwrap();
    bundler()
        .args(["run", "--project-dir"])
        .arg(tmp.path().join("nope"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Project directory does not exist"));
}
