use crate::prompt::ConfirmPolicy;
use crate::runtime::{self, RuntimeKind, SelectedRuntime};
use anyhow::Result;

// Platform-specific provisioning modules
#[cfg(target_os = "linux")]
mod linux;
#[cfg(target_os = "macos")]
mod macos;
#[cfg(target_os = "windows")]
mod windows;

/// Locates a runtime satisfying its version floor, provisioning one through
/// the platform's package manager when the probe comes up empty.
///
/// Provisioning is a single attempt: if the package manager reports success
/// but the re-probe still fails the floor, that is an environment problem
/// outside the installer's control and the run stops.
pub fn ensure_runtime(kind: RuntimeKind, confirm: &ConfirmPolicy) -> Result<SelectedRuntime> {
    if let Some(found) = runtime::probe(kind) {
        return Ok(found);
    }

    println!(
        "{} was not found on this system (Skylark needs {}).",
        kind.name(),
        kind.describe_floor()
    );

    let question = format!("Install {} now via your package manager?", kind.name());
    if !confirm.confirm(&question)? {
        anyhow::bail!(
            "{} is required but missing. Install {} manually and re-run the installer:\n{}",
            kind.name(),
            kind.describe_floor(),
            manual_instructions(kind)
        );
    }

    install_runtime(kind)?;

    runtime::reprobe(kind).ok_or_else(|| {
        anyhow::anyhow!(
            "{} still does not satisfy {} after installation. The package manager \
             reported success, so this points at an environment problem (stale PATH, \
             conflicting install) the installer cannot fix. Manual steps:\n{}",
            kind.name(),
            kind.describe_floor(),
            manual_instructions(kind)
        )
    })
}

fn install_runtime(kind: RuntimeKind) -> Result<()> {
    #[cfg(target_os = "linux")]
    return linux::install_runtime(kind);

    #[cfg(target_os = "macos")]
    return macos::install_runtime(kind);

    #[cfg(target_os = "windows")]
    return windows::install_runtime(kind);

    #[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
    anyhow::bail!(
        "no runtime provisioning support for this platform; install {} manually",
        kind.name()
    )
}

fn manual_instructions(kind: RuntimeKind) -> &'static str {
    #[cfg(target_os = "linux")]
    return linux::manual_instructions(kind);

    #[cfg(target_os = "macos")]
    return macos::manual_instructions(kind);

    #[cfg(target_os = "windows")]
    return windows::manual_instructions(kind);

    #[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
    match kind {
        RuntimeKind::Node => "  https://nodejs.org/en/download",
        RuntimeKind::Python => "  https://www.python.org/downloads/",
    }
}
