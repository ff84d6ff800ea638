use anyhow::Result;
use regex::Regex;
use std::fmt;

lazy_static::lazy_static! {
    // Release tags are strict: vMAJOR.MINOR.PATCH with an optional
    // -{alpha|beta|rc}.N suffix. Anything looser is rejected up front.
    static ref TAG_PATTERN: Regex =
        Regex::new(r"^v(\d+)\.(\d+)\.(\d+)(?:-(alpha|beta|rc)\.(\d+))?$").unwrap();
}

/// Pre-release channel ordering: alpha < beta < rc < stable
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Channel {
    Alpha,
    Beta,
    Rc,
}

impl Channel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Alpha => "alpha",
            Channel::Beta => "beta",
            Channel::Rc => "rc",
        }
    }

    fn parse(s: &str) -> Option<Channel> {
        match s {
            "alpha" => Some(Channel::Alpha),
            "beta" => Some(Channel::Beta),
            "rc" => Some(Channel::Rc),
            _ => None,
        }
    }
}

/// A concrete release tag like `v1.2.3` or `v1.2.3-beta.4`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseTag {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
    pub pre: Option<(Channel, u32)>,
}

impl ReleaseTag {
    /// Parses a tag against the strict release grammar.
    pub fn parse(token: &str) -> Result<ReleaseTag> {
        let caps = TAG_PATTERN.captures(token).ok_or_else(|| {
            anyhow::anyhow!(
                "invalid version '{}': expected a tag like v1.2.3 or v1.2.3-beta.4",
                token
            )
        })?;

        let part = |i: usize| -> Result<u32> {
            caps.get(i)
                .map(|m| m.as_str())
                .unwrap_or("0")
                .parse::<u32>()
                .map_err(|_| anyhow::anyhow!("version component out of range in '{}'", token))
        };

        let pre = match caps.get(4) {
            Some(channel) => {
                // The grammar only admits the three known channel names
                let channel = Channel::parse(channel.as_str())
                    .ok_or_else(|| anyhow::anyhow!("unknown pre-release channel in '{}'", token))?;
                Some((channel, part(5)?))
            }
            None => None,
        };

        Ok(ReleaseTag {
            major: part(1)?,
            minor: part(2)?,
            patch: part(3)?,
            pre,
        })
    }

    pub fn is_prerelease(&self) -> bool {
        self.pre.is_some()
    }
}

impl fmt::Display for ReleaseTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}.{}.{}", self.major, self.minor, self.patch)?;
        if let Some((channel, n)) = self.pre {
            write!(f, "-{}.{}", channel.as_str(), n)?;
        }
        Ok(())
    }
}

/// What the user asked to install: the latest published release, or a
/// specific tag. Resolved to a concrete `ReleaseTag` before any artifact
/// is fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionSpec {
    Latest,
    Exact(ReleaseTag),
}

impl VersionSpec {
    /// Parses a user-supplied version token. This runs during argument
    /// parsing, before the installer has any side effects.
    pub fn parse(token: &str) -> Result<VersionSpec> {
        if token == "latest" {
            return Ok(VersionSpec::Latest);
        }
        if token.is_empty() {
            anyhow::bail!("version may not be empty: expected \"latest\" or a tag like v1.2.3");
        }
        Ok(VersionSpec::Exact(ReleaseTag::parse(token)?))
    }
}

impl fmt::Display for VersionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionSpec::Latest => write!(f, "latest"),
            VersionSpec::Exact(tag) => write!(f, "{}", tag),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_latest_marker() {
        assert_eq!(VersionSpec::parse("latest").unwrap(), VersionSpec::Latest);
    }

    #[test]
    fn test_accepts_stable_tag() {
        let spec = VersionSpec::parse("v1.2.3").unwrap();
        let tag = match spec {
            VersionSpec::Exact(tag) => tag,
            other => panic!("expected exact tag, got {:?}", other),
        };
        assert_eq!((tag.major, tag.minor, tag.patch), (1, 2, 3));
        assert!(!tag.is_prerelease());
    }

    #[test]
    fn test_accepts_prerelease_tags() {
        for (token, channel, n) in [
            ("v1.2.3-beta.4", Channel::Beta, 4),
            ("v1.2.3-rc.1", Channel::Rc, 1),
            ("v1.2.3-alpha.2", Channel::Alpha, 2),
        ] {
            let tag = ReleaseTag::parse(token).unwrap();
            assert_eq!(tag.pre, Some((channel, n)), "token: {}", token);
            assert!(tag.is_prerelease());
        }
    }

    #[test]
    fn test_rejects_missing_v_prefix() {
        assert!(VersionSpec::parse("1.2.3").is_err());
    }

    #[test]
    fn test_rejects_short_version() {
        assert!(VersionSpec::parse("v1.2").is_err());
    }

    #[test]
    fn test_rejects_prerelease_without_number() {
        assert!(VersionSpec::parse("v1.2.3-beta").is_err());
    }

    #[test]
    fn test_rejects_empty_token() {
        assert!(VersionSpec::parse("").is_err());
    }

    #[test]
    fn test_rejects_unknown_channel() {
        assert!(VersionSpec::parse("v1.2.3-nightly.1").is_err());
    }

    #[test]
    fn test_display_round_trips() {
        for token in ["v1.2.3", "v0.10.0-rc.2", "v2.0.0-alpha.11"] {
            assert_eq!(ReleaseTag::parse(token).unwrap().to_string(), token);
        }
        assert_eq!(VersionSpec::Latest.to_string(), "latest");
    }

    #[test]
    fn test_channel_ordering() {
        assert!(Channel::Alpha < Channel::Beta);
        assert!(Channel::Beta < Channel::Rc);
    }
}
