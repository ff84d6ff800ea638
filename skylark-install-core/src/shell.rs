use anyhow::{Context, Result};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Marker comment guarding the PATH export so repeated installs never
/// duplicate the edit.
pub const PATH_MARKER: &str = "# added by skylark-install";

/// Result of the config patch, so re-runs can report "already set up"
/// instead of pretending to edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchOutcome {
    Added,
    AlreadyPresent,
}

/// Shells with a known startup file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellKind {
    Bash,
    Zsh,
    Fish,
    Other,
}

impl ShellKind {
    /// Derives the shell from a `$SHELL` value like `/usr/bin/zsh`.
    pub fn from_shell_var(shell: &str) -> ShellKind {
        match shell.rsplit('/').next().unwrap_or("") {
            "bash" => ShellKind::Bash,
            "zsh" => ShellKind::Zsh,
            "fish" => ShellKind::Fish,
            _ => ShellKind::Other,
        }
    }

    /// Startup file the PATH export lands in, relative to `home`.
    pub fn config_path(&self, home: &Path) -> PathBuf {
        match self {
            ShellKind::Bash => home.join(".bashrc"),
            ShellKind::Zsh => home.join(".zshrc"),
            ShellKind::Fish => home.join(".config").join("fish").join("config.fish"),
            ShellKind::Other => home.join(".profile"),
        }
    }

    /// The line that puts `install_dir` on PATH, in this shell's dialect.
    pub fn export_line(&self, install_dir: &Path) -> String {
        match self {
            ShellKind::Fish => format!("fish_add_path {}", install_dir.display()),
            _ => format!("export PATH=\"$PATH:{}\"", install_dir.display()),
        }
    }
}

/// Registers the install directory on the user's PATH via their shell
/// startup file. Windows builds print manual instructions instead of
/// editing persistent environment.
pub fn register_path(install_dir: &Path) -> Result<PatchOutcome> {
    #[cfg(unix)]
    {
        let shell_var = std::env::var("SHELL").unwrap_or_default();
        let shell = ShellKind::from_shell_var(&shell_var);
        let home = std::env::var("HOME").context("could not determine home directory (HOME is not set)")?;
        let config_path = shell.config_path(Path::new(&home));
        apply_path_export(&config_path, &shell.export_line(install_dir), install_dir)
    }

    #[cfg(not(unix))]
    {
        log::warn!(
            "Add {} to your PATH to use 'skylark' from any terminal \
             (System Properties > Advanced > Environment Variables).",
            install_dir.display()
        );
        Ok(PatchOutcome::AlreadyPresent)
    }
}

/// Applies the marker-guarded PATH export to an explicit config file.
///
/// Append-only: the existing content is never rewritten, and a timestamped
/// backup is taken before the file is touched. Returns `AlreadyPresent`
/// without modification when the marker or the directory is already there.
pub fn apply_path_export(
    config_path: &Path,
    export_line: &str,
    install_dir: &Path,
) -> Result<PatchOutcome> {
    let existing = if config_path.exists() {
        fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read {}", config_path.display()))?
    } else {
        String::new()
    };

    if existing.contains(PATH_MARKER) || existing.contains(&install_dir.display().to_string()) {
        log::info!(
            "{} already references {}, leaving it unchanged",
            config_path.display(),
            install_dir.display()
        );
        return Ok(PatchOutcome::AlreadyPresent);
    }

    if config_path.exists() {
        backup_config(config_path)?;
    } else if let Some(parent) = config_path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let mut file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(config_path)
        .with_context(|| format!("Failed to open {}", config_path.display()))?;

    // Lead with a newline in case the file does not end with one
    write!(file, "\n{}\n{}\n", PATH_MARKER, export_line)
        .with_context(|| format!("Failed to append to {}", config_path.display()))?;

    log::info!(
        "Added {} to PATH in {}",
        install_dir.display(),
        config_path.display()
    );
    Ok(PatchOutcome::Added)
}

fn backup_config(config_path: &Path) -> Result<PathBuf> {
    let stamp = chrono::Local::now().format("%Y%m%d-%H%M%S");
    let backup_path = config_path.with_file_name(format!(
        "{}.bak-{}",
        config_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("shellrc"),
        stamp
    ));
    fs::copy(config_path, &backup_path).with_context(|| {
        format!(
            "Failed to back up {} to {}",
            config_path.display(),
            backup_path.display()
        )
    })?;
    log::debug!("Backed up {} to {}", config_path.display(), backup_path.display());
    Ok(backup_path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shell_detection_from_shell_var() {
        assert_eq!(ShellKind::from_shell_var("/bin/bash"), ShellKind::Bash);
        assert_eq!(ShellKind::from_shell_var("/usr/bin/zsh"), ShellKind::Zsh);
        assert_eq!(ShellKind::from_shell_var("/usr/bin/fish"), ShellKind::Fish);
        assert_eq!(ShellKind::from_shell_var("/bin/ksh"), ShellKind::Other);
        assert_eq!(ShellKind::from_shell_var(""), ShellKind::Other);
    }

    #[test]
    fn test_config_path_per_shell() {
        let home = Path::new("/home/u");
        assert_eq!(ShellKind::Bash.config_path(home), home.join(".bashrc"));
        assert_eq!(ShellKind::Zsh.config_path(home), home.join(".zshrc"));
        assert_eq!(
            ShellKind::Fish.config_path(home),
            home.join(".config/fish/config.fish")
        );
        assert_eq!(ShellKind::Other.config_path(home), home.join(".profile"));
    }

    #[test]
    fn test_fish_uses_its_own_dialect() {
        let line = ShellKind::Fish.export_line(Path::new("/home/u/.local/bin"));
        assert!(line.starts_with("fish_add_path"));
        let line = ShellKind::Zsh.export_line(Path::new("/home/u/.local/bin"));
        assert!(line.starts_with("export PATH="));
    }

    #[test]
    fn test_patch_is_added_once_then_idempotent() {
        let temp = tempfile::tempdir().unwrap();
        let config = temp.path().join(".bashrc");
        let install_dir = Path::new("/home/u/.local/bin");
        let line = ShellKind::Bash.export_line(install_dir);

        let first = apply_path_export(&config, &line, install_dir).unwrap();
        assert_eq!(first, PatchOutcome::Added);

        let second = apply_path_export(&config, &line, install_dir).unwrap();
        assert_eq!(second, PatchOutcome::AlreadyPresent);

        let content = fs::read_to_string(&config).unwrap();
        assert_eq!(content.matches(PATH_MARKER).count(), 1);
        assert_eq!(content.matches("export PATH=").count(), 1);
    }

    #[test]
    fn test_existing_content_is_preserved_and_backed_up() {
        let temp = tempfile::tempdir().unwrap();
        let config = temp.path().join(".zshrc");
        fs::write(&config, "alias ll='ls -l'\n").unwrap();

        let install_dir = Path::new("/home/u/.local/bin");
        let line = ShellKind::Zsh.export_line(install_dir);
        apply_path_export(&config, &line, install_dir).unwrap();

        let content = fs::read_to_string(&config).unwrap();
        assert!(content.starts_with("alias ll='ls -l'\n"));
        assert!(content.contains(PATH_MARKER));

        // The pre-edit content survives in a backup sibling
        let backup = fs::read_dir(temp.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .find(|e| e.file_name().to_string_lossy().starts_with(".zshrc.bak-"));
        let backup = backup.expect("backup file should exist");
        assert_eq!(
            fs::read_to_string(backup.path()).unwrap(),
            "alias ll='ls -l'\n"
        );
    }

    #[test]
    fn test_preexisting_manual_export_is_respected() {
        let temp = tempfile::tempdir().unwrap();
        let config = temp.path().join(".bashrc");
        let install_dir = Path::new("/home/u/.local/bin");
        // User already added the directory by hand, without our marker
        fs::write(
            &config,
            "export PATH=\"$PATH:/home/u/.local/bin\"\n",
        )
        .unwrap();

        let line = ShellKind::Bash.export_line(install_dir);
        let outcome = apply_path_export(&config, &line, install_dir).unwrap();
        assert_eq!(outcome, PatchOutcome::AlreadyPresent);
    }

    #[test]
    fn test_missing_parent_directories_are_created() {
        let temp = tempfile::tempdir().unwrap();
        let config = temp
            .path()
            .join(".config")
            .join("fish")
            .join("config.fish");
        let install_dir = Path::new("/home/u/.local/bin");

        let line = ShellKind::Fish.export_line(install_dir);
        let outcome = apply_path_export(&config, &line, install_dir).unwrap();
        assert_eq!(outcome, PatchOutcome::Added);
        assert!(config.exists());
    }
}
