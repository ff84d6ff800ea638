use anyhow::{Context, Result};
use std::path::Path;
use std::process::Command;

/// Confirms the installed binary answers its version entry point.
///
/// Failure reports the exact path tested so the user can diagnose
/// permission or corruption problems directly.
pub fn verify_installed(binary: &Path) -> Result<String> {
    let output = Command::new(binary)
        .arg("--version")
        .output()
        .with_context(|| format!("failed to execute {}", binary.display()))?;

    if !output.status.success() {
        anyhow::bail!(
            "installed binary at {} failed its version check (exit code {:?})",
            binary.display(),
            output.status.code()
        );
    }

    let reported = String::from_utf8_lossy(&output.stdout).trim().to_string();
    log::info!("Installed binary reports: {}", reported);
    Ok(reported)
}
