use std::fs;
use std::process::Command;

fn main() {
    // Stamp the toolkit with its own revision, resolved the same way the
    // library resolves markers at runtime: git first, then the .git_sha
    // record, then "unknown".
    let sha = query_git()
        .or_else(read_cache_record)
        .unwrap_or_else(|| "unknown".into());

    println!("cargo:rustc-env=GIT_SHA={sha}");

    // Re-stamp when HEAD moves, not on every source change.
    println!("cargo:rerun-if-changed=../../.git/HEAD");
    println!("cargo:rerun-if-changed=../../.git/refs/");
}

fn query_git() -> Option<String> {
    Command::new("git")
        .args(["rev-parse", "--short=7", "HEAD"])
        .output()
        .ok()
        .filter(|o| o.status.success())
        .and_then(|o| String::from_utf8(o.stdout).ok())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn read_cache_record() -> Option<String> {
    fs::read_to_string("../../.git_sha")
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
