//! Build script for intake-flow
//!
//! Exports GIT_HASH, BUILD_TIMESTAMP and BUILD_PROFILE to the binary so
//! the startup log line identifies exactly which build is running.

use std::process::Command;

/// Short commit hash, or "unknown" outside a git checkout
fn git_short_hash() -> String {
    let Ok(output) = Command::new("git").args(["rev-parse", "--short=8", "HEAD"]).output() else {
        return "unknown".to_string();
    };
    if !output.status.success() {
        return "unknown".to_string();
    }
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

fn main() {
    let exports = [
        ("GIT_HASH", git_short_hash()),
        (
            "BUILD_TIMESTAMP",
            chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
        ),
        (
            "BUILD_PROFILE",
            std::env::var("PROFILE").unwrap_or_else(|_| "unknown".to_string()),
        ),
    ];
    for (key, value) in exports {
        println!("cargo:rustc-env={}={}", key, value);
    }
    // No rerun-if-changed: the script reruns on every build so the stamp stays fresh
}
