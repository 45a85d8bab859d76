//! Build script - puts the nRF52840 + S140 linker script where the linker
//! can find it. Host builds (tests) don't link firmware and skip this.

use std::env;
use std::fs;
use std::path::PathBuf;

fn main() {
    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");

    if env::var_os("CARGO_FEATURE_EMBEDDED").is_none() {
        return;
    }

    let Some(out_dir) = env::var_os("OUT_DIR").map(PathBuf::from) else {
        println!("cargo:warning=OUT_DIR not set, memory.x not copied");
        return;
    };

    if let Err(e) = fs::copy("memory.x", out_dir.join("memory.x")) {
        println!("cargo:warning=failed to copy memory.x: {e}");
        return;
    }

    println!("cargo:rustc-link-search={}", out_dir.display());
}
