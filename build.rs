fn main() {
    // Release CI stamps VERSION; without it the binary runs as locally built
    // and is exempt from ordering-based update decisions.
    if let Ok(version) = std::env::var("VERSION") {
        println!("cargo:rustc-env=UPRUN_RELEASE_VERSION={}", version);
    }
    println!("cargo:rerun-if-env-changed=VERSION");
}
