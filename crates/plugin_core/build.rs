//! Records the compiler and target this crate is built with so they become
//! part of the descriptor build fingerprint.

use std::env;
use std::process::Command;

fn main() {
    let rustc = env::var("RUSTC").unwrap_or_else(|_| "rustc".to_string());
    let version = Command::new(rustc)
        .arg("--version")
        .output()
        .ok()
        .filter(|out| out.status.success())
        .and_then(|out| String::from_utf8(out.stdout).ok())
        .map(|v| v.trim().replace(' ', "-"))
        .unwrap_or_else(|| "rustc-unknown".to_string());
    let target = env::var("TARGET").unwrap_or_else(|_| "unknown-target".to_string());

    println!("cargo:rustc-env=VIGIL_RUSTC_VERSION={version}");
    println!("cargo:rustc-env=VIGIL_TARGET={target}");
    println!("cargo:rerun-if-env-changed=RUSTC");
    println!("cargo:rerun-if-changed=build.rs");
}
