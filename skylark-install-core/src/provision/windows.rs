//! Windows runtime provisioning
//!
//! Scoop is the primary package manager, Chocolatey the fallback.

use crate::runtime::RuntimeKind;
use anyhow::Result;
use std::process::Command;

pub fn install_runtime(kind: RuntimeKind) -> Result<()> {
    if is_manager_available("scoop") {
        return install_with("scoop", &["install"], scoop_package(kind));
    }

    println!("Scoop not found. Checking for Chocolatey as fallback...");

    if is_manager_available("choco") {
        return install_with("choco", &["install", "-y"], choco_package(kind));
    }

    anyhow::bail!(
        "no package manager found. Install Scoop (https://scoop.sh) or Chocolatey \
         (https://chocolatey.org/install), or install {} manually:\n{}",
        kind.name(),
        manual_instructions(kind)
    );
}

fn scoop_package(kind: RuntimeKind) -> &'static str {
    match kind {
        RuntimeKind::Node => "nodejs-lts",
        RuntimeKind::Python => "python",
    }
}

fn choco_package(kind: RuntimeKind) -> &'static str {
    match kind {
        RuntimeKind::Node => "nodejs-lts",
        RuntimeKind::Python => "python311",
    }
}

fn install_with(manager: &str, install_args: &[&str], package: &str) -> Result<()> {
    println!("Installing {} with {}...", package, manager);

    let output = Command::new(manager)
        .args(install_args)
        .arg(package)
        .output()
        .map_err(|e| anyhow::anyhow!("failed to execute {}: {}", manager, e))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        anyhow::bail!("{} failed to install {}: {}", manager, package, stderr.trim());
    }

    println!("{} installed successfully with {}", package, manager);
    Ok(())
}

pub fn manual_instructions(kind: RuntimeKind) -> &'static str {
    match kind {
        RuntimeKind::Node => {
            "  scoop install nodejs-lts\n  Or download from https://nodejs.org/en/download"
        }
        RuntimeKind::Python => {
            "  scoop install python\n  Or download from https://www.python.org/downloads/"
        }
    }
}

fn is_manager_available(name: &str) -> bool {
    Command::new(name)
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}
