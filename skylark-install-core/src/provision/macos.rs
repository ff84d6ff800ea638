//! macOS runtime provisioning
//!
//! Homebrew is the primary package manager, MacPorts the fallback.

use crate::runtime::RuntimeKind;
use anyhow::Result;
use std::process::Command;

pub fn install_runtime(kind: RuntimeKind) -> Result<()> {
    let brew_installed = Command::new("brew")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false);

    if brew_installed {
        return install_with_brew(kind);
    }

    println!("Homebrew not found. Checking for MacPorts as fallback...");

    let port_installed = Command::new("port")
        .arg("version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false);

    if !port_installed {
        anyhow::bail!(
            "no package manager found. Install Homebrew (https://brew.sh) or MacPorts \
             (https://www.macports.org), or install {} manually:\n{}",
            kind.name(),
            manual_instructions(kind)
        );
    }

    println!("MacPorts found, using as fallback package manager");
    install_with_port(kind)
}

fn install_with_brew(kind: RuntimeKind) -> Result<()> {
    let package = match kind {
        RuntimeKind::Node => "node@20",
        RuntimeKind::Python => "python@3.11",
    };

    println!("Installing {} with Homebrew...", package);
    let output = Command::new("brew")
        .args(["install", package])
        .output()
        .map_err(|e| anyhow::anyhow!("failed to execute brew: {}", e))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        anyhow::bail!("Homebrew failed to install {}: {}", package, stderr.trim());
    }

    println!("{} installed successfully", package);
    Ok(())
}

fn install_with_port(kind: RuntimeKind) -> Result<()> {
    let package = match kind {
        RuntimeKind::Node => "nodejs20",
        RuntimeKind::Python => "python311",
    };

    println!("Installing {} with MacPorts...", package);
    let status = Command::new("sudo")
        .args(["port", "install", package])
        .status()
        .map_err(|e| anyhow::anyhow!("failed to execute port: {}", e))?;

    if !status.success() {
        anyhow::bail!("MacPorts failed to install {}", package);
    }

    println!("{} installed successfully via MacPorts", package);
    Ok(())
}

pub fn manual_instructions(kind: RuntimeKind) -> &'static str {
    match kind {
        RuntimeKind::Node => {
            "  brew install node@20\n  Or download from https://nodejs.org/en/download"
        }
        RuntimeKind::Python => {
            "  brew install python@3.11\n  Or download from https://www.python.org/downloads/"
        }
    }
}
