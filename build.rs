// RustGpioDelayLine - Build Script
//
// Sets up the ESP-IDF environment and bakes version info into the binary.

use std::process::Command;

fn main() {
    // ESP-IDF environment setup (MUST be first!) — only when building for the
    // on-device espidf target; host test builds have no ESP-IDF toolchain.
    // Build scripts always compile for the host, so the target is detected at
    // runtime via the cargo-provided env var rather than a cfg attribute.
    if std::env::var("CARGO_CFG_TARGET_OS").as_deref() == Ok("espidf") {
        embuild::espidf::sysenv::output();
    }

    // Get git version info
    let version = env!("CARGO_PKG_VERSION");
    let git_hash = Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .output()
        .ok()
        .and_then(|o| String::from_utf8(o.stdout).ok())
        .map(|s| s.trim().to_string())
        .unwrap_or_else(|| "unknown".to_string());

    println!("cargo:rustc-env=GIT_HASH={}", git_hash);
    println!(
        "cargo:rustc-env=VERSION_STRING=DelayLine v{}-g{}",
        version, git_hash
    );

    // Rebuild if git HEAD changes
    println!("cargo:rerun-if-changed=.git/HEAD");
}
