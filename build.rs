//! Stamps `tm --version` with when and from which commit it was built.
//!
//! `TM_BUILD_TIMESTAMP` is UTC at second precision. `TM_GIT_COMMIT` falls
//! back to "unknown" for source tarballs.

use std::process::Command;

const EMBEDDED_TABLES: [&str; 2] = [
    "src/catalog/embedded/tasks.kdl",
    "src/catalog/embedded/ground_truth.kdl",
];

fn main() {
    for path in [".git/HEAD", ".git/index"].iter().chain(&EMBEDDED_TABLES) {
        println!("cargo:rerun-if-changed={path}");
    }

    let built_at = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
    println!("cargo:rustc-env=TM_BUILD_TIMESTAMP={built_at}");

    let commit = short_commit().unwrap_or_else(|| "unknown".into());
    println!("cargo:rustc-env=TM_GIT_COMMIT={commit}");
}

fn short_commit() -> Option<String> {
    let output = Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .output()
        .ok()
        .filter(|o| o.status.success())?;
    let hash = String::from_utf8(output.stdout).ok()?;
    Some(hash.trim().to_owned())
}
