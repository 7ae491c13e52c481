//! Stamps the binary with the git revision it was built from.
//!
//! `mediasize --version` prints the crate version when HEAD is exactly a
//! release tag, and `dev@<short-hash>` otherwise.

use std::process::Command;

fn git(args: &[&str]) -> Option<String> {
    Command::new("git")
        .args(args)
        .output()
        .ok()
        .filter(|o| o.status.success())
        .map(|o| String::from_utf8_lossy(&o.stdout).trim().to_string())
}

fn main() {
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs/");

    let hash = git(&["rev-parse", "--short", "HEAD"]).unwrap_or_default();
    let release = git(&["describe", "--exact-match", "--tags", "HEAD"]).is_some();

    println!("cargo:rustc-env=MEDIASIZE_GIT_HASH={hash}");
    println!("cargo:rustc-env=MEDIASIZE_RELEASE={release}");
}
