use anyhow::Result;
use std::path::PathBuf;

// Internal modules (private)
mod fetch;
mod install;
mod platform;
mod prompt;
mod provision;
mod registry;
mod runtime;
mod shell;
mod verify;
mod version;

// Re-export public types
pub use platform::{Arch, Os, PlatformTarget};
pub use prompt::ConfirmPolicy;
pub use registry::{ReleaseRegistry, FALLBACK_VERSION, GITHUB_REPO};
pub use runtime::{RuntimeKind, SelectedRuntime};
pub use shell::PatchOutcome;
pub use version::{Channel, ReleaseTag, VersionSpec};

/// Configuration options for a single installer run
#[derive(Debug, Clone)]
pub struct InstallConfig {
    /// Release to install ("latest" resolves against the registry)
    pub version: VersionSpec,
    /// Suppress interactive prompts, substituting an affirmative default
    pub assume_yes: bool,
    /// In-place upgrade: skip post-install verification, since the old
    /// process may still be resident and would produce a false negative
    pub upgrade_in_place: bool,
}

impl Default for InstallConfig {
    fn default() -> Self {
        Self {
            version: VersionSpec::Latest,
            assume_yes: false,
            upgrade_in_place: false,
        }
    }
}

/// Summary of a completed installation
#[derive(Debug, Clone)]
pub struct InstallReport {
    /// Concrete release that was installed
    pub version: ReleaseTag,
    /// Final path of the installed executable
    pub executable: PathBuf,
    /// Whether the PATH export was newly added or already in place
    pub path_registration: PatchOutcome,
    /// False when verification was skipped in upgrade mode
    pub verified: bool,
    /// Interpreters selected for the product's runtime requirements
    pub node: SelectedRuntime,
    pub python: SelectedRuntime,
}

/// Installer engine running the strictly sequential pipeline:
/// platform detection, runtime provisioning, version resolution, artifact
/// fetch, installation, PATH registration, verification. Each step's
/// output gates the next; every failure is terminal for the run.
pub struct Installer {
    config: InstallConfig,
}

impl Installer {
    pub fn new(config: InstallConfig) -> Self {
        Self { config }
    }

    pub fn run(&self) -> Result<InstallReport> {
        // Platform first: an unsupported machine must fail before any
        // network access happens
        let platform = PlatformTarget::current()?;
        log::info!("Installing for {}", platform.display_name());

        let confirm = ConfirmPolicy::from_flag(self.config.assume_yes);
        let node = provision::ensure_runtime(RuntimeKind::Node, &confirm)?;
        let python = provision::ensure_runtime(RuntimeKind::Python, &confirm)?;

        let registry = ReleaseRegistry::new()?;
        let tag = registry.resolve(&self.config.version)?;

        // Existence is checked up front so a bad version fails fast
        // instead of surfacing as a download 404
        if !registry.tag_exists(&tag)? {
            anyhow::bail!(
                "version {} was not found in the release registry ({}). \
                 Run with -v latest or pick a published release.",
                tag,
                GITHUB_REPO
            );
        }

        let fetched = fetch::fetch_release_binary(&registry, &tag, &platform)?;
        let executable = install::install_binary(&fetched.path, &platform)?;

        let install_dir = executable
            .parent()
            .map(|p| p.to_path_buf())
            .unwrap_or_else(|| executable.clone());
        let path_registration = shell::register_path(&install_dir)?;

        let verified = if self.config.upgrade_in_place {
            log::info!("Upgrade in progress, skipping post-install verification");
            false
        } else {
            verify::verify_installed(&executable)?;
            true
        };

        Ok(InstallReport {
            version: tag,
            executable,
            path_registration,
            verified,
            node,
            python,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_targets_latest_interactively() {
        let config = InstallConfig::default();
        assert_eq!(config.version, VersionSpec::Latest);
        assert!(!config.assume_yes);
        assert!(!config.upgrade_in_place);
    }
}
