use std::process::Command;

fn git(args: &[&str]) -> Option<String> {
    Command::new("git")
        .args(args)
        .output()
        .ok()
        .filter(|o| o.status.success())
        .and_then(|o| String::from_utf8(o.stdout).ok())
        .map(|s| s.trim().to_string())
}

fn main() {
    // Re-run if git HEAD changes
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/index");

    // Release builds (HEAD tagged with the package version, clean tree) report
    // the bare version, everything else gets the short hash appended.
    let version = env!("CARGO_PKG_VERSION");
    let tagged = git(&["tag", "--points-at", "HEAD"])
        .map(|tags| tags.lines().any(|t| t == version || t == format!("v{}", version)))
        .unwrap_or(false);
    let dirty = git(&["status", "--porcelain"])
        .map(|s| !s.is_empty())
        .unwrap_or(false);

    let hash = if tagged && !dirty {
        String::new()
    } else {
        git(&["rev-parse", "--short", "HEAD"]).unwrap_or_default()
    };

    println!("cargo:rustc-env=QUADERNO_GIT_HASH={}", hash);
}
