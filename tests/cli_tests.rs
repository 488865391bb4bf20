use assert_cmd::Command;
use predicates::prelude::*;

const DEB_URL: &str =
    "https://s3.amazonaws.com/mciuploads/mongosh/v1.0.0-draft.2/mongodb-mongosh_1.0.0_amd64.deb";

fn cli() -> Command {
    let mut cmd = Command::cargo_bin("barque_release").unwrap();
    cmd.env_remove("BARQUE_RELEASE_BRANCHES")
        .env_remove("BARQUE_REPO_BASE_URL")
        .env("RUST_LOG", "off");
    cmd
}

#[test]
fn test_help_lists_commands() {
    cli()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("publish"))
        .stdout(predicate::str::contains("plan"))
        .stdout(predicate::str::contains("wait"));
}

#[test]
fn test_plan_prints_every_published_url() {
    let output = cli()
        .args(["plan", "debian-x64", DEB_URL, "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let urls: Vec<String> = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(urls.len(), 8);
    assert!(urls.iter().all(|url| url.ends_with("mongodb-mongosh_1.0.0_amd64.deb")));
}

#[test]
fn test_plan_honours_release_branches_from_environment() {
    cli()
        .env("BARQUE_RELEASE_BRANCHES", "6.0.0")
        .args(["plan", "rhel-ppc64le", DEB_URL])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "https://repo.mongodb.org/yum/redhat/8/mongodb-org/6.0/ppc64le/RPMS/mongodb-mongosh_1.0.0_amd64.deb",
        ));
}

#[test]
fn test_plan_rejects_unknown_variant() {
    cli()
        .args(["plan", "solaris-sparc", DEB_URL])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("solaris-sparc"));
}

#[test]
fn test_quiet_and_verbose_conflict() {
    cli()
        .args(["--quiet", "--verbose", "plan", "debian-x64", DEB_URL])
        .assert()
        .code(2);
}

#[test]
fn test_patch_publish_needs_no_github_token() {
    let dir = tempfile::tempdir().unwrap();
    let report = dir.path().join("report.json");

    cli()
        .env_remove("GITHUB_TOKEN")
        .env_remove("GH_TOKEN")
        .args(["publish", "--release-version", "1.0.0", "--revision", "abc", "--is-patch"])
        .arg("--report")
        .arg(&report)
        .assert()
        .success()
        .stdout(predicate::str::contains("Not a public release"));

    let saved: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&report).unwrap()).unwrap();
    assert_eq!(saved["skipped"], true);
    assert_eq!(saved["checkpoints"], serde_json::json!([]));
}

#[test]
fn test_plan_rhel_x64_usage() {
    cli()
        .args([
            "plan",
            "rhel-x64",
            "https://s3.amazonaws.com/mciuploads/mongosh/v1.0.0-draft.2/mongodb-mongosh-1.0.0.x86_64.rpm",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "https://repo.mongodb.org/yum/redhat/8/mongodb-org/5.0/x86_64/RPMS/mongodb-mongosh-1.0.0.x86_64.rpm",
        ));
}
