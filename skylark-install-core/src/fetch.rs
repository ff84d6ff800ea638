use crate::platform::PlatformTarget;
use crate::registry::ReleaseRegistry;
use crate::version::ReleaseTag;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use walkdir::WalkDir;

/// A downloaded, unpacked, executable-ready binary.
///
/// Holds its temporary directory alive until the binary has been copied to
/// the install target; dropping this removes the directory on success and
/// failure paths alike.
pub struct FetchedBinary {
    pub path: PathBuf,
    _tempdir: TempDir,
}

/// Downloads the release asset for `platform`, unpacks it, and locates the
/// product executable inside. Any failure here is fatal and not retried.
pub fn fetch_release_binary(
    registry: &ReleaseRegistry,
    tag: &ReleaseTag,
    platform: &PlatformTarget,
) -> Result<FetchedBinary> {
    // Prefixed name so an interrupted run's leftovers are identifiable
    // under the OS temp root.
    let tempdir = tempfile::Builder::new()
        .prefix("skylark-install-")
        .tempdir()
        .context("Failed to create temporary directory")?;

    let asset_name = platform.asset_name();
    let archive_path = tempdir.path().join(asset_name);
    registry.download_asset(tag, asset_name, &archive_path)?;

    let unpack_dir = tempdir.path().join("unpacked");
    extract_zip(&archive_path, &unpack_dir)?;

    let executable = find_executable(&unpack_dir, platform.executable_name())?;
    set_executable(&executable)?;

    Ok(FetchedBinary {
        path: executable,
        _tempdir: tempdir,
    })
}

/// Extracts a ZIP archive to the destination directory, creating it if
/// needed. Entries with absolute paths or parent-directory references are
/// rejected.
pub fn extract_zip(archive_path: &Path, dest_dir: &Path) -> Result<()> {
    let file = fs::File::open(archive_path)
        .with_context(|| format!("Failed to open archive: {}", archive_path.display()))?;

    let mut archive = zip::ZipArchive::new(file)
        .with_context(|| format!("Failed to read ZIP archive: {}", archive_path.display()))?;

    fs::create_dir_all(dest_dir)
        .with_context(|| format!("Failed to create directory: {}", dest_dir.display()))?;

    for i in 0..archive.len() {
        let mut entry = archive
            .by_index(i)
            .with_context(|| format!("Failed to read archive entry {i}"))?;

        let entry_path = entry
            .enclosed_name()
            .with_context(|| format!("Invalid entry path in archive: entry {i}"))?;

        if entry_path.is_absolute()
            || entry_path
                .components()
                .any(|c| matches!(c, std::path::Component::ParentDir))
        {
            anyhow::bail!(
                "Refusing to extract path with parent directory or absolute reference: {}",
                entry_path.display()
            );
        }

        let output_path = dest_dir.join(&entry_path);

        if entry.is_dir() {
            fs::create_dir_all(&output_path)
                .with_context(|| format!("Failed to create directory: {}", output_path.display()))?;
        } else {
            if let Some(parent) = output_path.parent() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
            }

            let mut outfile = fs::File::create(&output_path)
                .with_context(|| format!("Failed to create file: {}", output_path.display()))?;

            std::io::copy(&mut entry, &mut outfile)
                .with_context(|| format!("Failed to extract: {}", output_path.display()))?;
        }
    }

    Ok(())
}

/// Locates the product executable in the unpacked tree. Release zips are
/// usually flat, but some carry a wrapping folder, so the search descends.
fn find_executable(unpack_dir: &Path, executable_name: &str) -> Result<PathBuf> {
    for entry in WalkDir::new(unpack_dir).into_iter().filter_map(|e| e.ok()) {
        if entry.file_type().is_file() && entry.file_name() == executable_name {
            return Ok(entry.path().to_path_buf());
        }
    }
    anyhow::bail!(
        "could not find '{}' in the unpacked archive at {}: the asset layout may have changed",
        executable_name,
        unpack_dir.display()
    )
}

#[cfg(unix)]
fn set_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mut perms = fs::metadata(path)
        .with_context(|| format!("Failed to get metadata: {}", path.display()))?
        .permissions();
    perms.set_mode(0o755);
    fs::set_permissions(path, perms)
        .with_context(|| format!("Failed to set permissions: {}", path.display()))?;
    Ok(())
}

#[cfg(windows)]
fn set_executable(_path: &Path) -> Result<()> {
    Ok(())
}
