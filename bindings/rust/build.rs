fn main() {
    println!("cargo:rerun-if-changed=bindings/rust/build.rs");
    println!("cargo:rerun-if-changed=bindings/c/tree_sitter/tree-sitter-sifu.h");

    #[cfg(feature = "abi-probe")]
    compile_abi_probes();
}

/// Builds a C and a C++ translation unit that include the public header and
/// call `tree_sitter_sifu`, so the unit tests can check that both resolve to
/// the symbol exported by this crate.
#[cfg(feature = "abi-probe")]
fn compile_abi_probes() {
    use std::path::PathBuf;

    let c_dir: PathBuf = ["bindings", "c"].iter().collect();
    let probe_dir = c_dir.join("tests");
    println!("cargo:rerun-if-changed=bindings/c/tests");

    cc::Build::new()
        .include(&c_dir)
        .std("c11")
        .file(probe_dir.join("abi_probe.c"))
        .compile("tree-sitter-sifu-abi-probe-c");

    cc::Build::new()
        .cpp(true)
        .include(&c_dir)
        .file(probe_dir.join("abi_probe.cc"))
        .compile("tree-sitter-sifu-abi-probe-cpp");
}
