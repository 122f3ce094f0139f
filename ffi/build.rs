//! Generate `ecp.h` for C callers into `OUT_DIR` (and `include/` when
//! `ECP_FFI_HEADER_DIR` is set).

use std::env;
use std::path::PathBuf;

fn main() {
    println!("cargo:rerun-if-changed=src/lib.rs");
    println!("cargo:rerun-if-changed=src/types.rs");
    println!("cargo:rerun-if-env-changed=ECP_FFI_HEADER_DIR");

    let crate_dir = env::var("CARGO_MANIFEST_DIR").unwrap_or_else(|_| ".".to_string());
    let out_dir = env::var("OUT_DIR").map(PathBuf::from).unwrap_or_else(|_| PathBuf::from("."));

    let bindings = cbindgen::Builder::new()
        .with_crate(&crate_dir)
        .with_language(cbindgen::Language::C)
        .with_include_guard("ECP_H")
        .with_documentation(true)
        .generate();

    // Header generation must not break the library build.
    let bindings = match bindings {
        Ok(bindings) => bindings,
        Err(err) => {
            println!("cargo:warning=cbindgen failed: {err}");
            return;
        }
    };

    bindings.write_to_file(out_dir.join("ecp.h"));
    if let Ok(dir) = env::var("ECP_FFI_HEADER_DIR") {
        bindings.write_to_file(PathBuf::from(dir).join("ecp.h"));
    }
}
