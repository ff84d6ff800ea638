use crate::platform::{Os, PlatformTarget};
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Resolves the user-local directory the binary is installed into.
///
/// Unix: `~/.local/bin`. Windows: `%USERPROFILE%\AppData\Local\Programs\skylark`.
pub fn resolve_install_dir(platform: &PlatformTarget) -> Result<PathBuf> {
    let home = home_dir(platform)?;
    let dir = match platform.os {
        Os::Windows => home
            .join("AppData")
            .join("Local")
            .join("Programs")
            .join("skylark"),
        _ => home.join(".local").join("bin"),
    };
    Ok(dir)
}

fn home_dir(platform: &PlatformTarget) -> Result<PathBuf> {
    let var = match platform.os {
        Os::Windows => "USERPROFILE",
        _ => "HOME",
    };
    let home = std::env::var(var)
        .with_context(|| format!("could not determine home directory ({} is not set)", var))?;
    Ok(PathBuf::from(home))
}

/// Copies the verified executable into the install directory, overwriting
/// any previous copy (idempotent upgrade semantics).
pub fn install_binary(src: &Path, platform: &PlatformTarget) -> Result<PathBuf> {
    let dir = resolve_install_dir(platform)?;
    install_binary_to(src, &dir, platform.executable_name())
}

/// Testable inner operation: install into an explicit directory.
pub fn install_binary_to(src: &Path, install_dir: &Path, executable_name: &str) -> Result<PathBuf> {
    fs::create_dir_all(install_dir)
        .with_context(|| format!("Failed to create {}", install_dir.display()))?;

    let dest = install_dir.join(executable_name);
    fs::copy(src, &dest).with_context(|| {
        format!(
            "Failed to copy {} to {}",
            src.display(),
            dest.display()
        )
    })?;

    // Re-assert the mode; the unpacked file may have lost it
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = fs::metadata(&dest)
            .with_context(|| format!("Failed to get metadata: {}", dest.display()))?
            .permissions();
        perms.set_mode(0o755);
        fs::set_permissions(&dest, perms)
            .with_context(|| format!("Failed to set permissions: {}", dest.display()))?;
    }

    log::info!("Installed {}", dest.display());
    Ok(dest)
}
