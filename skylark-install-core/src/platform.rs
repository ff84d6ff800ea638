use anyhow::Result;

/// Operating systems the release pipeline publishes binaries for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Os {
    Linux,
    MacOs,
    Windows,
}

/// CPU architectures with published release assets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arch {
    X86_64,
    Arm64,
}

/// The resolved (OS, architecture) pair for this machine.
///
/// Every supported pair maps to exactly one release asset name; resolution
/// happens before any network access so an unsupported platform fails fast.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlatformTarget {
    pub os: Os,
    pub arch: Arch,
}

impl PlatformTarget {
    /// Detects the platform the installer is running on.
    pub fn current() -> Result<PlatformTarget> {
        PlatformTarget::from_parts(std::env::consts::OS, std::env::consts::ARCH)
    }

    /// Resolves a platform from raw OS/arch identifiers (the values of
    /// `std::env::consts`). An unknown architecture on a supported OS falls
    /// back to the x86_64 asset with a warning; the asset may not run on
    /// that machine. Known risk, documented in the README.
    pub fn from_parts(os: &str, arch: &str) -> Result<PlatformTarget> {
        let os = match os {
            "linux" => Os::Linux,
            "macos" => Os::MacOs,
            "windows" => Os::Windows,
            other => anyhow::bail!(
                "unsupported operating system '{}': Skylark ships binaries for Linux, macOS, and Windows",
                other
            ),
        };

        let arch = match arch {
            "x86_64" | "amd64" => Arch::X86_64,
            "aarch64" | "arm64" => Arch::Arm64,
            other => {
                log::warn!(
                    "unrecognized architecture '{}': falling back to the x86_64 asset, which may not run on this machine",
                    other
                );
                Arch::X86_64
            }
        };

        Ok(PlatformTarget { os, arch })
    }

    /// The release asset published for this platform.
    pub fn asset_name(&self) -> &'static str {
        match (self.os, self.arch) {
            (Os::Linux, _) => "skylark-linux.zip",
            (Os::MacOs, Arch::X86_64) => "skylark-macos.zip",
            (Os::MacOs, Arch::Arm64) => "skylark-macos-arm64.zip",
            (Os::Windows, _) => "skylark-windows.exe.zip",
        }
    }

    /// Name of the executable inside the asset (and after installation).
    pub fn executable_name(&self) -> &'static str {
        match self.os {
            Os::Windows => "skylark.exe",
            _ => "skylark",
        }
    }

    pub fn display_name(&self) -> String {
        let os = match self.os {
            Os::Linux => "Linux",
            Os::MacOs => "macOS",
            Os::Windows => "Windows",
        };
        let arch = match self.arch {
            Arch::X86_64 => "x86_64",
            Arch::Arm64 => "arm64",
        };
        format!("{} {}", os, arch)
    }
}
