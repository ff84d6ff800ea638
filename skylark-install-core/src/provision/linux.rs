//! Linux runtime provisioning
//!
//! Installs missing runtimes using the first available of:
//! - apt-get (Debian, Ubuntu, Kali)
//! - dnf (Fedora, RHEL 8+)
//! - yum (RHEL 7, CentOS 7)
//! - pacman (Arch Linux, Manjaro)

use crate::runtime::RuntimeKind;
use anyhow::Result;
use std::process::Command;

/// A package manager and the pinned runtime packages it installs
struct PackageManager {
    name: &'static str,
    install_args: &'static [&'static str],
    node_package: &'static str,
    python_package: &'static str,
}

const MANAGERS: &[PackageManager] = &[
    PackageManager {
        name: "apt-get",
        install_args: &["install", "-y"],
        node_package: "nodejs",
        python_package: "python3.11",
    },
    PackageManager {
        name: "dnf",
        install_args: &["install", "-y"],
        node_package: "nodejs",
        python_package: "python3.11",
    },
    PackageManager {
        name: "yum",
        install_args: &["install", "-y"],
        node_package: "nodejs",
        python_package: "python3",
    },
    PackageManager {
        name: "pacman",
        install_args: &["-S", "--noconfirm"],
        node_package: "nodejs",
        python_package: "python",
    },
];

pub fn install_runtime(kind: RuntimeKind) -> Result<()> {
    let manager = MANAGERS
        .iter()
        .find(|m| is_manager_available(m.name))
        .ok_or_else(|| {
            anyhow::anyhow!(
                "no supported package manager found (apt-get, dnf, yum, or pacman required). \
                 Install {} manually:\n{}",
                kind.name(),
                manual_instructions(kind)
            )
        })?;

    let package = match kind {
        RuntimeKind::Node => manager.node_package,
        RuntimeKind::Python => manager.python_package,
    };

    println!("Installing {} with {}...", package, manager.name);

    // Root runs the manager directly; everyone else goes through sudo
    let needs_sudo = std::env::var("USER").unwrap_or_default() != "root";
    let mut cmd = if needs_sudo {
        let mut cmd = Command::new("sudo");
        cmd.arg(manager.name);
        cmd
    } else {
        Command::new(manager.name)
    };
    cmd.args(manager.install_args).arg(package);

    let output = cmd
        .output()
        .map_err(|e| anyhow::anyhow!("failed to execute {}: {}", manager.name, e))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        anyhow::bail!(
            "{} failed to install {}: {}",
            manager.name,
            package,
            stderr.trim()
        );
    }

    println!("{} installed successfully with {}", package, manager.name);
    Ok(())
}

pub fn manual_instructions(kind: RuntimeKind) -> &'static str {
    match kind {
        RuntimeKind::Node => {
            "  Debian/Ubuntu: sudo apt-get install nodejs\n  Fedora: sudo dnf install nodejs\n  Or download from https://nodejs.org/en/download"
        }
        RuntimeKind::Python => {
            "  Debian/Ubuntu: sudo apt-get install python3.11\n  Fedora: sudo dnf install python3.11\n  Or download from https://www.python.org/downloads/"
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
