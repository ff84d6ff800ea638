use regex::Regex;
use std::collections::HashMap;
use std::process::Command;
use std::sync::Mutex;

lazy_static::lazy_static! {
    static ref VERSION_PATTERN: Regex = Regex::new(r"(\d+)\.(\d+)(?:\.(\d+))?").unwrap();

    // Probe results are remembered for the rest of the run so the pipeline
    // and the final report agree on which interpreter was selected.
    static ref PROBE_CACHE: Mutex<HashMap<&'static str, Option<SelectedRuntime>>> =
        Mutex::new(HashMap::new());
}

/// Interpreters the installed product needs at run time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeKind {
    Node,
    Python,
}

impl RuntimeKind {
    pub fn name(&self) -> &'static str {
        match self {
            RuntimeKind::Node => "Node.js",
            RuntimeKind::Python => "Python",
        }
    }

    /// Minimum acceptable (major, minor) version
    pub fn floor(&self) -> (u32, u32) {
        match self {
            RuntimeKind::Node => (18, 0),
            RuntimeKind::Python => (3, 10),
        }
    }

    pub fn describe_floor(&self) -> String {
        let (major, minor) = self.floor();
        match self {
            RuntimeKind::Node => format!("{} >= {}", self.name(), major),
            RuntimeKind::Python => format!("{} >= {}.{}", self.name(), major, minor),
        }
    }

    /// Command names to probe, most specific first. The first candidate
    /// meeting the floor wins.
    fn candidates(&self) -> &'static [&'static str] {
        match self {
            RuntimeKind::Node => &["node", "nodejs"],
            RuntimeKind::Python => &[
                "python3.13",
                "python3.12",
                "python3.11",
                "python3.10",
                "python3",
                "python",
            ],
        }
    }
}

/// An interpreter that satisfied its version floor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedRuntime {
    pub kind: RuntimeKind,
    pub command: String,
    pub major: u32,
    pub minor: u32,
}

impl SelectedRuntime {
    pub fn describe(&self) -> String {
        format!("{} {}.{} ({})", self.kind.name(), self.major, self.minor, self.command)
    }
}

/// Probes for an installed runtime satisfying the floor, remembering the
/// result for the rest of the run.
pub fn probe(kind: RuntimeKind) -> Option<SelectedRuntime> {
    let mut cache = PROBE_CACHE.lock().unwrap();
    if let Some(cached) = cache.get(kind.name()) {
        return cached.clone();
    }
    let selected = probe_uncached(kind);
    cache.insert(kind.name(), selected.clone());
    selected
}

/// Probes again after a provisioning attempt, discarding the cached miss.
pub fn reprobe(kind: RuntimeKind) -> Option<SelectedRuntime> {
    let mut cache = PROBE_CACHE.lock().unwrap();
    let selected = probe_uncached(kind);
    cache.insert(kind.name(), selected.clone());
    selected
}

fn probe_uncached(kind: RuntimeKind) -> Option<SelectedRuntime> {
    for candidate in kind.candidates() {
        // Skip candidates not on PATH without spawning anything
        if which::which(candidate).is_err() {
            continue;
        }

        let output = match Command::new(candidate).arg("--version").output() {
            Ok(output) if output.status.success() => output,
            _ => continue,
        };

        // Node prints the version on stdout ("v20.11.1"); some Python
        // builds still report on stderr, so check both.
        let text = format!(
            "{}{}",
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );

        let Some((major, minor)) = parse_version_output(&text) else {
            log::debug!("{}: unparseable version output from {}", kind.name(), candidate);
            continue;
        };

        if (major, minor) < kind.floor() {
            log::debug!(
                "{}: {} is {}.{}, below the floor",
                kind.name(),
                candidate,
                major,
                minor
            );
            continue;
        }

        log::info!("Found {} {}.{} via '{}'", kind.name(), major, minor, candidate);
        return Some(SelectedRuntime {
            kind,
            command: candidate.to_string(),
            major,
            minor,
        });
    }
    None
}

fn parse_version_output(text: &str) -> Option<(u32, u32)> {
    let caps = VERSION_PATTERN.captures(text)?;
    let major = caps.get(1)?.as_str().parse().ok()?;
    let minor = caps.get(2)?.as_str().parse().ok()?;
    Some((major, minor))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_node_style_output() {
        assert_eq!(parse_version_output("v20.11.1\n"), Some((20, 11)));
    }

    #[test]
    fn test_parses_python_style_output() {
        assert_eq!(parse_version_output("Python 3.11.4\n"), Some((3, 11)));
    }

    #[test]
    fn test_parses_two_component_versions() {
        assert_eq!(parse_version_output("v22.1"), Some((22, 1)));
    }

    #[test]
    fn test_rejects_output_without_version() {
        assert_eq!(parse_version_output("command not found"), None);
    }

    #[test]
    fn test_floor_comparison_is_lexicographic() {
        // 3.9 < 3.10: tuple ordering, not string ordering
        assert!((3, 9) < RuntimeKind::Python.floor());
        assert!((3, 10) >= RuntimeKind::Python.floor());
        assert!((17, 99) < RuntimeKind::Node.floor());
    }

    #[test]
    fn test_candidates_probe_most_specific_first() {
        let candidates = RuntimeKind::Python.candidates();
        assert_eq!(candidates.first(), Some(&"python3.13"));
        assert_eq!(candidates.last(), Some(&"python"));
    }

    #[test]
    fn test_probe_result_is_remembered() {
        // Two probes for the same kind must agree (the second is served
        // from the cache even if PATH changed in between).
        let first = probe(RuntimeKind::Node);
        let second = probe(RuntimeKind::Node);
        assert_eq!(first, second);
    }

    #[test]
    fn test_describe_floor_wording() {
        assert_eq!(RuntimeKind::Node.describe_floor(), "Node.js >= 18");
        assert_eq!(RuntimeKind::Python.describe_floor(), "Python >= 3.10");
    }
}
