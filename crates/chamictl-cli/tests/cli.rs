use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

/// A command isolated from the invoking user's config files and tokens.
fn chamictl(home: &std::path::Path) -> Command {
    let mut cmd = Command::cargo_bin("chamictl").unwrap();
    cmd.env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join(".config"))
        .env_remove("CHAMICTL_CONFIG")
        .env_remove("RUST_LOG");
    cmd
}

const CONFIG: &str = "\
log:
  level: info
default-cluster: lab
clusters:
  - name: lab
    cluster:
      uri: https://lab.example.com
      enable-auth: false
";

#[test]
fn help_lists_services() {
    let home = tempdir().unwrap();
    chamictl(home.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("bss"))
        .stdout(predicate::str::contains("cloud-init"))
        .stdout(predicate::str::contains("pcs"));
}

#[test]
fn config_show_reads_explicit_file() {
    let home = tempdir().unwrap();
    let path = home.path().join("config.yaml");
    std::fs::write(&path, CONFIG).unwrap();

    chamictl(home.path())
        .args(["config", "show", "--config"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("default-cluster: lab"));

    chamictl(home.path())
        .args(["config", "show", "log.level", "--config"])
        .arg(&path)
        .assert()
        .success()
        .stdout("info\n");
}

#[test]
fn config_cluster_set_creates_file() {
    let home = tempdir().unwrap();
    let path = home.path().join("new/config.yaml");

    chamictl(home.path())
        .args(["config", "--no-confirm", "cluster", "set", "prod"])
        .args(["--uri", "https://prod.example.com", "--default", "--config"])
        .arg(&path)
        .assert()
        .success();

    let written = std::fs::read_to_string(&path).unwrap();
    assert!(written.contains("default-cluster: prod"));
    assert!(written.contains("https://prod.example.com"));
}

#[test]
fn dangling_default_cluster_rejected() {
    let home = tempdir().unwrap();
    let path = home.path().join("config.yaml");
    std::fs::write(&path, "default-cluster: nope\n").unwrap();

    chamictl(home.path())
        .args(["smd", "status", "--config"])
        .arg(&path)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("nope"));
}

#[test]
fn missing_base_uri_fails() {
    let home = tempdir().unwrap();
    chamictl(home.path())
        .args(["--ignore-config", "bss", "bootparams", "get"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("base URI for bss not found"));
}

#[test]
fn token_and_no_token_conflict() {
    let home = tempdir().unwrap();
    chamictl(home.path())
        .args(["pcs", "status", "--token", "abc", "--no-token"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}

#[test]
fn invalid_transition_operation() {
    let home = tempdir().unwrap();
    chamictl(home.path())
        .args(["--ignore-config", "--no-token", "pcs", "--uri", "http://127.0.0.1:9"])
        .args(["transition", "start", "sideways", "-x", "x1000c0s0b0n0"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("invalid operation: sideways"));
}

#[test]
fn cloud_init_status_reports_unreachable_service() {
    let home = tempdir().unwrap();
    chamictl(home.path())
        .args(["--ignore-config", "cloud-init", "--uri", "http://127.0.0.1:9", "status"])
        .assert()
        .code(1)
        .stdout("cloud-init is not running\n");

    chamictl(home.path())
        .args(["--ignore-config", "cloud-init", "--uri", "http://127.0.0.1:9", "status", "-q"])
        .assert()
        .code(1)
        .stdout("")
        .stderr(predicate::str::contains("Error").not());
}

#[test]
fn cloud_init_open_config_get_needs_no_token() {
    let home = tempdir().unwrap();
    chamictl(home.path())
        .args(["--ignore-config", "cloud-init", "--uri", "http://127.0.0.1:9", "config", "get"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("request to http://127.0.0.1:9/"))
        .stderr(predicate::str::contains("Token error").not());

    chamictl(home.path())
        .args(["--ignore-config", "cloud-init", "--uri", "http://127.0.0.1:9"])
        .args(["config", "get", "--secure"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Token error"));
}

#[test]
fn config_loading_is_logged_with_level_flag() {
    let home = tempdir().unwrap();
    let dir = home.path().join(".config/chamictl");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("config.yaml"), CONFIG).unwrap();

    chamictl(home.path())
        .args(["--log-level", "debug", "config", "show", "default-cluster"])
        .assert()
        .success()
        .stdout("lab\n")
        .stderr(predicate::str::contains("loaded config file"));

    chamictl(home.path())
        .args(["config", "show", "default-cluster"])
        .assert()
        .success()
        .stderr(predicate::str::contains("loaded config file").not());
}
