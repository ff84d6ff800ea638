use clap::Parser;
use skylark_install_core::VersionSpec;

/// Bootstrap installer for the Skylark CLI
#[derive(Parser, Debug)]
#[command(name = "skylark-install")]
#[command(author = "Skylark Engineering")]
// The built-in flag is disabled because -v/--version selects the release
// to install rather than printing our own version.
#[command(disable_version_flag = true)]
#[command(
    about = "Installs the Skylark CLI from GitHub releases",
    long_about = None
)]
pub struct Args {
    /// Release to install: "latest", "vX.Y.Z", or "vX.Y.Z-{alpha|beta|rc}.N"
    #[arg(
        short = 'v',
        long = "version",
        value_name = "VERSION",
        default_value = "latest",
        value_parser = parse_version_spec
    )]
    pub version: VersionSpec,

    /// Non-interactive mode: auto-confirm all prompts
    #[arg(short = 'y', long = "yes")]
    pub yes: bool,

    /// In-place upgrade mode: skip the post-install version check
    #[arg(long = "upgrade")]
    pub upgrade: bool,
}

/// Validates the version token at parse time, before any side effect.
fn parse_version_spec(token: &str) -> Result<VersionSpec, String> {
    VersionSpec::parse(token).map_err(|e| e.to_string())
}

/// Parses command-line arguments.
///
/// Help exits 0; any input error exits 1 (clap's default of 2 does not
/// match the installer's exit-code contract).
pub fn parse_args() -> Args {
    match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let code = match e.kind() {
                clap::error::ErrorKind::DisplayHelp
                | clap::error::ErrorKind::DisplayVersion => 0,
                _ => 1,
            };
            let _ = e.print();
            std::process::exit(code);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_to_latest() {
        let args = Args::try_parse_from(["skylark-install"]).unwrap();
        assert_eq!(args.version, VersionSpec::Latest);
        assert!(!args.yes);
        assert!(!args.upgrade);
    }

    #[test]
    fn test_accepts_exact_version() {
        let args = Args::try_parse_from(["skylark-install", "-v", "v1.2.3"]).unwrap();
        assert_eq!(args.version.to_string(), "v1.2.3");
    }

    #[test]
    fn test_accepts_prerelease_version() {
        let args =
            Args::try_parse_from(["skylark-install", "--version", "v1.2.3-beta.4"]).unwrap();
        assert_eq!(args.version.to_string(), "v1.2.3-beta.4");
    }

    #[test]
    fn test_rejects_bad_version_at_parse_time() {
        assert!(Args::try_parse_from(["skylark-install", "-v", "1.2.3"]).is_err());
        assert!(Args::try_parse_from(["skylark-install", "-v", "v1.2"]).is_err());
        assert!(Args::try_parse_from(["skylark-install", "-v", "v1.2.3-beta"]).is_err());
    }

    #[test]
    fn test_flags_parse() {
        let args =
            Args::try_parse_from(["skylark-install", "-y", "--upgrade"]).unwrap();
        assert!(args.yes);
        assert!(args.upgrade);
    }
}
