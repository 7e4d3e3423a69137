use std::process::Command;

/// Compile-time env var carrying the informational version.
const VERSION_VAR: &str = "AHKFLOW_INFORMATIONAL_VERSION";

fn main() {
    println!("cargo:rerun-if-env-changed={}", VERSION_VAR);
    // Rerun if .git/HEAD changes (new commits, checkouts)
    println!("cargo:rerun-if-changed=../.git/HEAD");
    println!("cargo:rerun-if-changed=../.git/refs");

    match informational_version() {
        Some(version) => {
            println!("cargo:rustc-env={}={}", VERSION_VAR, version);
            println!("cargo:warning=Building version: {}", version);
        }
        None => {
            println!("cargo:warning=No version metadata available - building as development version");
        }
    }
}

/// Pick the informational version for this build.
///
/// Order: explicit override, exact git tag, package version plus commit hash.
/// Returns `None` outside a git checkout when no override is given.
fn informational_version() -> Option<String> {
    if let Ok(version) = std::env::var(VERSION_VAR) {
        let version = version.trim();
        if !version.is_empty() {
            return Some(version.to_string());
        }
    }

    if let Some(tag) = git(&["describe", "--tags", "--exact-match"]) {
        return Some(tag.strip_prefix('v').unwrap_or(&tag).to_string());
    }

    let hash = git(&["rev-parse", "--short=8", "HEAD"])?;
    let package_version = std::env::var("CARGO_PKG_VERSION").ok()?;
    Some(format!("{}+{}", package_version, hash))
}

/// Run a git command, returning its trimmed stdout on success.
fn git(args: &[&str]) -> Option<String> {
    Command::new("git")
        .args(args)
        .output()
        .ok()
        .and_then(|output| {
            if output.status.success() {
                String::from_utf8(output.stdout).ok()
            } else {
                None
            }
        })
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
