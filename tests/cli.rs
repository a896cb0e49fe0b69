use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;

fn pipeline(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("release_pipeline").unwrap();
    cmd.current_dir(dir)
        .env_remove("RUST_LOG")
        .env_remove("UPLOAD")
        .env_remove("RANCHER_URL")
        .env_remove("RANCHER_KEY")
        .env_remove("RANCHER_SECRET")
        .env_remove("RANCHER_SERVICE")
        .env_remove("RANCHER_IMAGE")
        .env_remove("RANCHER_TIMEOUT");
    cmd
}

/// Writes a compiler stand-in that creates its `-o` output, plus a config using it.
#[cfg(unix)]
fn fake_toolchain(dir: &Path) {
    use std::os::unix::fs::PermissionsExt;

    let compiler = dir.join("fake-go");
    std::fs::write(
        &compiler,
        "#!/bin/sh\nif [ \"$GOARCH\" = \"386\" ]; then echo \"unsupported arch\" >&2; exit 2; fi\n\
         mkdir -p \"$(dirname \"$3\")\" && echo binary > \"$3\"\n",
    )
    .unwrap();
    std::fs::set_permissions(&compiler, std::fs::Permissions::from_mode(0o755)).unwrap();
    std::fs::write(
        dir.join("release.toml"),
        format!("[toolchain]\nprogram = \"{}\"\n", compiler.display()),
    )
    .unwrap();
}

#[test]
fn help_lists_commands() {
    let dir = tempfile::tempdir().unwrap();
    pipeline(dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("build"))
        .stdout(predicate::str::contains("package"))
        .stdout(predicate::str::contains("deploy"));
}

#[test]
fn invalid_version_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    pipeline(dir.path())
        .args(["build", "--name", "agent", "--version", "latest"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("invalid version 'latest'"));
}

#[test]
fn invalid_target_is_a_usage_error() {
    let dir = tempfile::tempdir().unwrap();
    pipeline(dir.path())
        .args(["build", "--name", "agent", "--version", "1.0.0", "--target", "solaris"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("expected os/arch"));
}

#[test]
fn explicit_missing_config_fails() {
    let dir = tempfile::tempdir().unwrap();
    pipeline(dir.path())
        .args(["--config", "missing.toml", "build", "--name", "agent", "--version", "1.0.0"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("missing.toml"));
}

#[test]
fn deploy_requires_credentials() {
    let dir = tempfile::tempdir().unwrap();
    pipeline(dir.path())
        .args(["deploy", "--image", "org/app:2", "--service", "stack-a/service-b"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("RANCHER_URL must be set"));
}

#[test]
fn deploy_rejects_unparsable_timeout() {
    let dir = tempfile::tempdir().unwrap();
    pipeline(dir.path())
        .env("RANCHER_TIMEOUT", "soon")
        .args(["deploy", "--image", "org/app:2", "--service", "service-b"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid RANCHER_TIMEOUT 'soon'"));
}

#[cfg(unix)]
#[test]
fn build_reports_every_target() {
    let dir = tempfile::tempdir().unwrap();
    fake_toolchain(dir.path());

    pipeline(dir.path())
        .args([
            "build", "--name", "agent", "--version", "1.2.3", "--target", "linux/386", "--target",
            "windows/amd64",
        ])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("windows_amd64"))
        .stderr(predicate::str::contains("unsupported arch"))
        .stderr(predicate::str::contains("1 of 2 target(s) failed"));

    assert!(dir.path().join("bin/agent_1.2.3_windows_amd64.exe").is_file());
}

#[cfg(unix)]
#[test]
fn package_writes_archive_per_target() {
    let dir = tempfile::tempdir().unwrap();
    fake_toolchain(dir.path());
    std::fs::write(dir.path().join("manifest.json"), r#"{"name":"agent","version":"0.0.0"}"#).unwrap();
    std::fs::write(dir.path().join("README.md"), "# agent\n").unwrap();

    pipeline(dir.path())
        .args([
            "package", "--name", "agent", "--version", "1.2.3", "--target", "linux/amd64", "--file",
            "README.md",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 target(s) succeeded"));

    let target_dir = dir.path().join("build/outputs/linux/amd64/agent/1.2.3");
    assert!(target_dir.join("agent").is_file());
    assert!(target_dir.join("package.zip").is_file());
    let manifest = std::fs::read_to_string(target_dir.join("manifest.json")).unwrap();
    assert!(manifest.contains("\"version\": \"1.2.3\""));
    assert!(manifest.contains("\"os\": \"linux\""));
}

#[test]
fn deploy_confirms_and_finalizes_upgrade() {
    let mut server = mockito::Server::new();
    let _stacks = server
        .mock("GET", "/v2-beta/stacks")
        .match_query(mockito::Matcher::UrlEncoded("name".into(), "stack-a".into()))
        .with_header("content-type", "application/json")
        .with_body(r#"{"data":[{"id":"1st5","name":"stack-a"}]}"#)
        .create();
    let _services = server
        .mock("GET", "/v2-beta/services")
        .match_query(mockito::Matcher::AllOf(vec![
            mockito::Matcher::UrlEncoded("name".into(), "service-b".into()),
            mockito::Matcher::UrlEncoded("stackId".into(), "1st5".into()),
        ]))
        .with_header("content-type", "application/json")
        .with_body(r#"{"data":[{"id":"1s9","name":"service-b","state":"active","launchConfig":{"imageUuid":"docker:org/app:1"}}]}"#)
        .create();
    let upgrade = server
        .mock("POST", "/v2-beta/services/1s9")
        .match_query(mockito::Matcher::UrlEncoded("action".into(), "upgrade".into()))
        .match_body(mockito::Matcher::PartialJson(serde_json::json!({
            "inServiceStrategy": {"launchConfig": {"imageUuid": "docker:org/app:2"}}
        })))
        .with_header("content-type", "application/json")
        .with_body(r#"{"id":"1s9","state":"upgrading"}"#)
        .create();
    let _state = server
        .mock("GET", "/v2-beta/services/1s9")
        .with_header("content-type", "application/json")
        .with_body(r#"{"id":"1s9","state":"upgraded"}"#)
        .create();
    let finish = server
        .mock("POST", "/v2-beta/services/1s9")
        .match_query(mockito::Matcher::UrlEncoded("action".into(), "finishupgrade".into()))
        .with_header("content-type", "application/json")
        .with_body(r#"{"id":"1s9","state":"finishing-upgrade"}"#)
        .create();

    let dir = tempfile::tempdir().unwrap();
    pipeline(dir.path())
        .env("RANCHER_URL", format!("{}/v2-beta", server.url()))
        .env("RANCHER_KEY", "key")
        .env("RANCHER_SECRET", "secret")
        .args([
            "deploy", "--image", "org/app:2", "--service", "stack-a/service-b", "--timeout", "10",
            "--poll-interval", "1",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Waiting up to 10s"))
        .stdout(predicate::str::contains("upgraded to docker:org/app:2 and finalized"));

    upgrade.assert();
    finish.assert();
}

#[test]
fn deploy_without_confirmation_warns_and_skips_finalize() {
    let mut server = mockito::Server::new();
    let _services = server
        .mock("GET", "/v2-beta/services")
        .match_query(mockito::Matcher::UrlEncoded("name".into(), "service-b".into()))
        .with_header("content-type", "application/json")
        .with_body(r#"{"data":[{"id":"1s9","name":"service-b","state":"active","launchConfig":{"imageUuid":"docker:org/app:1"}}]}"#)
        .create();
    let upgrade = server
        .mock("POST", "/v2-beta/services/1s9")
        .match_query(mockito::Matcher::UrlEncoded("action".into(), "upgrade".into()))
        .with_header("content-type", "application/json")
        .with_body(r#"{"id":"1s9","state":"upgrading"}"#)
        .create();
    let finish = server
        .mock("POST", "/v2-beta/services/1s9")
        .match_query(mockito::Matcher::UrlEncoded("action".into(), "finishupgrade".into()))
        .expect(0)
        .create();

    let dir = tempfile::tempdir().unwrap();
    pipeline(dir.path())
        .env("RANCHER_URL", format!("{}/v2-beta", server.url()))
        .env("RANCHER_KEY", "key")
        .env("RANCHER_SECRET", "secret")
        .args(["deploy", "--image", "org/app:2", "--service", "service-b", "--no-confirm"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Confirmation skipped"));

    upgrade.assert();
    finish.assert();
}
