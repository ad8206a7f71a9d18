use assert_cmd::prelude::*;
use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;
use std::fs;
use std::process::Command;
use tempfile::TempDir;

fn vigil(home: &TempDir) -> Result<Command, Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("vigil")?;
    cmd.env("HOME", home.path()).env("NO_COLOR", "1");
    Ok(cmd)
}

#[test]
fn lists_builtin_codecs() -> Result<(), Box<dyn std::error::Error>> {
    let home = TempDir::new()?;
    vigil(&home)?
        .args(["plugins", "list"])
        .assert()
        .success()
        .stdout(contains("codec::eth").and(contains("codec::ipv4")).and(contains("static")))
        .stdout(contains("codec::unknown").not());
    Ok(())
}

#[test]
fn lists_as_json() -> Result<(), Box<dyn std::error::Error>> {
    let home = TempDir::new()?;
    let output = vigil(&home)?.args(["plugins", "list", "--json"]).output()?;
    assert!(output.status.success());
    let listing: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    let keys: Vec<&str> = listing
        .as_array()
        .ok_or("expected an array")?
        .iter()
        .filter_map(|l| l["key"].as_str())
        .collect();
    let mut sorted = keys.clone();
    sorted.sort();
    assert_eq!(keys, sorted);
    assert!(keys.contains(&"codec::udp"));
    Ok(())
}

#[test]
fn disabled_plugins_are_not_listed() -> Result<(), Box<dyn std::error::Error>> {
    let home = TempDir::new()?;
    let dir = home.path().join(".config/vigil");
    fs::create_dir_all(&dir)?;
    fs::write(
        dir.join("config.toml"),
        "[plugins]\ndisabled = ['codec::vlan']\n",
    )?;
    vigil(&home)?
        .args(["plugins", "list"])
        .assert()
        .success()
        .stdout(contains("codec::eth").and(contains("codec::vlan").not()));
    Ok(())
}

#[test]
fn show_prints_help_text() -> Result<(), Box<dyn std::error::Error>> {
    let home = TempDir::new()?;
    vigil(&home)?
        .args(["plugins", "show"])
        .assert()
        .success()
        .stdout(contains("support for ethernet II framing"));
    Ok(())
}

#[test]
fn unreadable_config_aborts() -> Result<(), Box<dyn std::error::Error>> {
    let home = TempDir::new()?;
    let missing = home.path().join("missing.toml");
    vigil(&home)?
        .arg("--config")
        .arg(&missing)
        .args(["plugins", "list"])
        .assert()
        .failure()
        .stderr(contains("failed to load configuration"));
    Ok(())
}
