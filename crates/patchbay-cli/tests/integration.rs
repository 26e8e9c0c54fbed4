//! Integration tests for the patchbay binary.

use std::process::Command;

fn patchbay_bin() -> Command {
    Command::new(env!("CARGO_BIN_EXE_patchbay"))
}

#[test]
fn cli_info_lists_demo_graph() {
    let output = patchbay_bin()
        .args(["info", "--instrument"])
        .output()
        .expect("failed to run patchbay info");
    assert!(output.status.success(), "patchbay info failed");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("patchbay.sine"));
    assert!(stdout.contains("Output Gain"));
    assert!(stdout.contains("[output]"));
}

#[test]
fn cli_render_writes_wav() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("demo.wav");
    let output = patchbay_bin()
        .arg("render")
        .arg(&path)
        .args(["--blocks", "4", "--block-size", "256", "--gain-db", "-12"])
        .output()
        .expect("failed to run patchbay render");
    assert!(
        output.status.success(),
        "render failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(path.exists());
    assert!(std::fs::metadata(&path).unwrap().len() > 44);
}

#[test]
fn cli_render_rejects_bad_config() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("graph.toml");
    std::fs::write(&config, "max_block_frames = 0\n").unwrap();
    let output = patchbay_bin()
        .arg("render")
        .arg(dir.path().join("out.wav"))
        .arg("--config")
        .arg(&config)
        .output()
        .expect("failed to run patchbay render");
    assert!(!output.status.success());
}
