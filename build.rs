/// hello-window build script.
///
/// The window only exists on Windows. Other targets still compile the
/// platform-independent core so its tests run anywhere, so this warns
/// instead of failing.
fn main() {
    let target_os = std::env::var("CARGO_CFG_TARGET_OS").unwrap_or_default();
    if target_os != "windows" {
        println!(
            "cargo:warning=hello-window opens no window on {target_os:?}; \
             only the test build is useful on this target"
        );
    }

    // Only re-run the build script when it changes.
    println!("cargo:rerun-if-changed=build.rs");
}
