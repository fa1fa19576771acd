use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn catalog(config_dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("catalog").unwrap();
    cmd.env("CATALOG_CONFIG_DIR", config_dir.path())
        .env_remove("RUST_LOG")
        .env_remove("CATALOG_SERVER");
    cmd
}

#[test]
fn whoami_without_credentials_says_not_logged_in() {
    let dir = TempDir::new().unwrap();
    catalog(&dir)
        .arg("whoami")
        .assert()
        .failure()
        .stderr(predicate::str::contains("not logged in"))
        .stderr(predicate::str::contains("catalog login"));
}

#[test]
fn logout_without_credentials_is_a_no_op() {
    let dir = TempDir::new().unwrap();
    catalog(&dir)
        .arg("logout")
        .assert()
        .success()
        .stdout(predicate::str::contains("Not logged in."));
}

#[test]
fn hashpw_reads_stdin() {
    let dir = TempDir::new().unwrap();
    catalog(&dir)
        .args(["hashpw", "--stdin", "--cost", "4"])
        .write_stdin("s3cret\n")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("$2"));
}

#[test]
fn hashpw_rejects_out_of_range_cost() {
    let dir = TempDir::new().unwrap();
    catalog(&dir)
        .args(["hashpw", "--stdin", "--cost", "3"])
        .write_stdin("s3cret\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid cost"));
}

#[test]
fn login_rejects_non_http_urls() {
    let dir = TempDir::new().unwrap();
    catalog(&dir)
        .args([
            "login",
            "--server",
            "ftp://example.com",
            "--username",
            "admin",
            "--password-stdin",
        ])
        .write_stdin("pw\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("login failed"));
    assert!(!dir.path().join("credentials.json").exists());
}

#[test]
fn version_prints_package_version() {
    let dir = TempDir::new().unwrap();
    catalog(&dir)
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}
