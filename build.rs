use std::env;
use std::process::Command;

fn main() {
    let git_hash = get_git_hash();
    let build_date = chrono::Utc::now().format("%Y-%m-%d");

    println!("cargo:rustc-env=LIBWS_GIT_HASH={git_hash}");
    println!("cargo:rustc-env=LIBWS_BUILD_DATE={build_date}");

    // Rerun if git state changes
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs/");

    let target = env::var("TARGET").unwrap_or_default();
    if target.contains("musl") {
        println!("cargo:rustc-link-arg=-static");
    }
}

fn get_git_hash() -> String {
    if let Ok(output) = Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .output()
    {
        if output.status.success() {
            return String::from_utf8_lossy(&output.stdout).trim().to_string();
        }
    }
    "unknown".to_string()
}
