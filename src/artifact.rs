/// Name of the executable packaged inside release archives.
pub const TOOL_NAME: &str = "uprun";

/// Base URL release artifacts are published under.
pub const DOWNLOAD_BASE_URL: &str =
    "https://github.com/uprun-tools/uprun/releases/download";

/// Public platform name used in artifact file names.
///
/// Apple's OS goes by its marketing name in published artifacts (`darwin` is
/// the kernel identifier, `macos` the Rust one); every other identifier is
/// used as-is.
pub fn platform_display_name(os: &str) -> &str {
    match os {
        "darwin" | "macos" => "macOS",
        other => other,
    }
}

/// URL of the release zip for a version and platform identifier.
/// Artifacts are built 64-bit only.
pub fn artifact_url(base: Option<&str>, version: &str, os: &str) -> String {
    format!(
        "{}/v{version}/{TOOL_NAME}_{version}_{}_64-bits.zip",
        base.unwrap_or(DOWNLOAD_BASE_URL),
        platform_display_name(os),
    )
}

/// File name of the executable entry expected inside the archive.
pub fn expected_binary_name() -> &'static str {
    if cfg!(windows) {
        "uprun.exe"
    } else {
        TOOL_NAME
    }
}
