//! Links `kernel.ld` and resolves the `mkdx`-produced disk image
//! `drivers::block` embeds.
//!
//! A real build points `KO6_DISK_IMAGE` at an image produced by running the
//! `mkdx` binary over a demo directory (see `mkdx/src/main.rs`); this crate
//! only embeds whatever path that names. Without it set, falls back to an
//! empty placeholder so the kernel still links standalone.

use std::{env, fs, path::PathBuf};

fn main() {
    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR").expect("set by cargo"));
    let linker_script = manifest_dir.join("kernel.ld");
    println!("cargo::rustc-link-arg=-T{}", linker_script.display());
    println!("cargo:rerun-if-changed={}", linker_script.display());

    let out_dir = PathBuf::from(env::var("OUT_DIR").expect("OUT_DIR set by cargo"));
    let image_path = env::var("KO6_DISK_IMAGE").map(PathBuf::from).unwrap_or_else(|_| {
        let placeholder = out_dir.join("empty.dx");
        fs::write(&placeholder, vec![0u8; ko6_params::BLOCK_SIZE]).expect("write placeholder image");
        placeholder
    });
    println!("cargo:rustc-env=KO6_DISK_IMAGE_PATH={}", image_path.display());
    println!("cargo:rerun-if-env-changed=KO6_DISK_IMAGE");
    println!("cargo:rerun-if-changed={}", image_path.display());
}
