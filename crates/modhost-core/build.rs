//! Compiles the declared module list into the crate.
//!
//! The packaging build passes the list through `MODHOST_MODULES`, e.g.
//! `MODHOST_MODULES="video_codec;onnx_backend"`. Invalid names fail the build.

#[path = "src/names.rs"]
mod names;

use names::{DECLARED_VAR, MODULES_VAR};

fn main() {
    println!("cargo:rerun-if-env-changed={MODULES_VAR}");

    let raw = std::env::var(MODULES_VAR).unwrap_or_default();
    let mut declared: Vec<&str> = Vec::new();

    for name in names::split_list(&raw) {
        if let Err(reason) = names::check_name(name) {
            panic!("invalid module name `{name}` in {MODULES_VAR}: {reason}");
        }
        if !declared.contains(&name) {
            declared.push(name);
        }
    }

    println!("cargo:rustc-env={DECLARED_VAR}={}", declared.join(";"));
}
