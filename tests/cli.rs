//! Behaviour of the `model-list` binary.

use std::{
    fs,
    path::Path,
    process::{Command, Output},
};

use anyhow::{Context, Result};
use tempfile::TempDir;

fn touch(root: &Path, relative: &str) -> Result<()> {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().context("path has no parent")?)?;
    fs::write(path, "{}")?;
    Ok(())
}

fn model_list(root: &Path, args: &[&str]) -> Result<Output> {
    Command::new(env!("CARGO_BIN_EXE_model-list"))
        .arg("--root")
        .arg(root)
        .args(args)
        .env("NO_COLOR", "1")
        .output()
        .context("failed to execute model-list")
}

// Running without a subcommand builds the manifest in the conventional
// location relative to the working directory.
#[test]
fn no_arguments_builds_default_tree() -> Result<()> {
    let tmp = TempDir::new()?;
    let res = tmp.path().join("project/res");
    touch(&res, "models/a/x.mimodel")?;
    touch(&res, "model_overrides/a/x.mimodel")?;
    touch(&res, "models/b/y.mimodel")?;

    let output = Command::new(env!("CARGO_BIN_EXE_model-list"))
        .current_dir(tmp.path())
        .env("NO_COLOR", "1")
        .output()
        .context("failed to execute model-list")?;

    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Wrote model list to"));
    assert_eq!(
        fs::read_to_string(res.join("models/model_list.json"))?,
        r#"["/model_overrides/a/x.mimodel", "/models/b/y.mimodel"]"#
    );
    Ok(())
}

#[test]
fn missing_models_directory_fails() -> Result<()> {
    let tmp = TempDir::new()?;

    let output = model_list(tmp.path(), &["build"])?;

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("models directory not found"),
        "stderr: {stderr}"
    );
    Ok(())
}

#[test]
fn check_exit_codes_track_freshness() -> Result<()> {
    let tmp = TempDir::new()?;
    touch(tmp.path(), "models/a/x.mimodel")?;

    let missing = model_list(tmp.path(), &["check", "--quiet"])?;
    assert_eq!(missing.status.code(), Some(2));

    let build = model_list(tmp.path(), &["build", "--quiet"])?;
    assert!(build.status.success());
    assert!(build.stdout.is_empty());

    let fresh = model_list(tmp.path(), &["check"])?;
    assert_eq!(fresh.status.code(), Some(0));

    touch(tmp.path(), "models/b/y.mimodel")?;
    let stale = model_list(tmp.path(), &["check"])?;
    assert_eq!(stale.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&stale.stdout).contains("+ /models/b/y.mimodel"));
    Ok(())
}

#[test]
fn unwritable_output_fails() -> Result<()> {
    let tmp = TempDir::new()?;
    touch(tmp.path(), "models/a/x.mimodel")?;
    fs::write(
        tmp.path().join("model_list.toml"),
        "_version = \"1\"\noutput = \"nope/deeper/list.json\"\n",
    )?;

    let output = model_list(tmp.path(), &["build"])?;

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed to write"), "stderr: {stderr}");
    Ok(())
}

#[test]
fn init_writes_config_once() -> Result<()> {
    let tmp = TempDir::new()?;

    let first = model_list(tmp.path(), &["init"])?;
    assert!(first.status.success());
    let written = fs::read_to_string(tmp.path().join("model_list.toml"))?;
    assert!(written.contains("_version = \"1\""));

    let second = model_list(tmp.path(), &["init"])?;
    assert!(!second.status.success());
    Ok(())
}
