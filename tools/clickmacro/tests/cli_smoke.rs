use assert_cmd::cargo::cargo_bin_cmd;

fn fixture(path: &str) -> String {
    format!("{}/tests/fixtures/{path}", env!("CARGO_MANIFEST_DIR"))
}

#[test]
fn help_lists_all_flags() {
    let mut cmd = cargo_bin_cmd!("clickmacro");
    cmd.arg("--help");
    let out = cmd.assert().success();
    let stdout = String::from_utf8(out.get_output().stdout.clone()).expect("utf8");

    for flag in [
        "--config",
        "--data-file",
        "--run-delay-ms",
        "--test-delay-ms",
        "--mouse",
        "--log-file",
    ] {
        assert!(stdout.contains(flag), "help is missing {flag}");
    }
}

#[test]
fn render_help_matches_cli_definition() {
    let help = clickmacro::render_help();
    assert!(help.contains("--data-file"));
    assert!(help.contains("virtual"));
}

#[test]
fn version_exits_zero() {
    let mut cmd = cargo_bin_cmd!("clickmacro");
    cmd.arg("--version");
    let out = cmd.assert().success();
    let stdout = String::from_utf8(out.get_output().stdout.clone()).expect("utf8");
    assert!(stdout.contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn missing_config_path_exits_nonzero() {
    let mut cmd = cargo_bin_cmd!("clickmacro");
    cmd.arg("--config").arg(fixture("configs/missing.toml"));
    cmd.assert().failure();
}

#[test]
fn invalid_config_exits_nonzero() {
    let mut cmd = cargo_bin_cmd!("clickmacro");
    cmd.arg("--config").arg(fixture("configs/invalid-delay.toml"));
    let out = cmd.assert().failure();
    let stderr = String::from_utf8(out.get_output().stderr.clone()).expect("utf8");
    assert!(stderr.contains("playback.test_delay_ms"));
}

#[test]
fn unknown_mouse_backend_is_rejected() {
    let mut cmd = cargo_bin_cmd!("clickmacro");
    cmd.arg("--mouse").arg("xdo");
    cmd.assert().failure();
}
