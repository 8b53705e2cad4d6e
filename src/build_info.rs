//! Compile-time build information.

include!(concat!(env!("OUT_DIR"), "/build_info.rs"));

/// One-line version string for `--version`.
pub fn version_line() -> String {
    format!(
        "{} {} ({} {})",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        BUILD_COMMIT,
        BUILD_DATE
    )
}
