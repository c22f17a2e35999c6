use std::process::Command;

fn git(args: &[&str]) -> Option<String> {
    Command::new("git")
        .args(args)
        .output()
        .ok()
        .filter(|output| output.status.success())
        .and_then(|output| String::from_utf8(output.stdout).ok())
        .map(|s| s.trim().to_string())
}

fn main() {
    let git_hash = git(&["rev-parse", "--short", "HEAD"]).unwrap_or_else(|| "unknown".to_string());

    // Tagged releases report the bare package version
    let is_release = git(&["describe", "--exact-match", "--tags", "HEAD"]).is_some();

    let suffix = if is_release {
        String::new()
    } else {
        format!("-dev.{}", git_hash)
    };

    println!("cargo:rustc-env=FULCRUM_GIT_HASH={}", git_hash);
    println!("cargo:rustc-env=FULCRUM_VERSION_SUFFIX={}", suffix);

    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs/heads");
}
