//! Build script: embeds the git hash and sanity-checks GPU toolkits
//! before whisper-rs-sys starts a long native build.

use std::process::Command;

fn main() {
    // Embed git short hash for version string
    if let Ok(output) = Command::new("git")
        .args(["rev-parse", "--short=7", "HEAD"])
        .output()
        && output.status.success()
    {
        let hash = String::from_utf8_lossy(&output.stdout).trim().to_string();
        println!("cargo:rustc-env=GIT_HASH={}", hash);
    }
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs/heads/");

    if cfg!(feature = "cuda") {
        require_tool(
            "nvcc",
            "install the CUDA toolkit: https://developer.nvidia.com/cuda-downloads",
        );
    }
    if cfg!(feature = "vulkan") {
        require_tool(
            "vulkaninfo",
            "install the Vulkan SDK: https://vulkan.lunarg.com/",
        );
    }
    if cfg!(feature = "hipblas") {
        require_tool("rocminfo", "install ROCm: https://rocm.docs.amd.com/");
    }
    if cfg!(feature = "openblas") {
        require_tool(
            "pkg-config",
            "install OpenBLAS: sudo apt install libopenblas-dev",
        );
    }
}

/// Fail before the native build starts when a required GPU tool is
/// missing; the same failure from whisper-rs-sys surfaces minutes in.
fn require_tool(tool: &str, hint: &str) {
    if Command::new(tool).arg("--version").output().is_err() {
        panic!(
            "`{}` not found; {} (or build without this feature)",
            tool, hint
        );
    }
}
