use std::fmt;

use semver::Version;

use crate::error::UpdateError;

/// Version string carried by binaries that did not come out of the release
/// pipeline (plain `cargo build` with no VERSION stamped by CI).
pub const LOCALLY_BUILT: &str = "(locally built)";

/// Raw version string of the running binary.
pub fn running() -> &'static str {
    option_env!("UPRUN_RELEASE_VERSION").unwrap_or(LOCALLY_BUILT)
}

/// Version identity of a build.
///
/// Locally built binaries carry no release version and never update through
/// ordering comparison; only a forced update replaces them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildVersion {
    Released(Version),
    LocallyBuilt,
}

impl BuildVersion {
    /// Parse a version string, recognizing the locally-built sentinel.
    pub fn parse(input: &str) -> Result<Self, UpdateError> {
        if input == LOCALLY_BUILT {
            return Ok(BuildVersion::LocallyBuilt);
        }
        Version::parse(input)
            .map(BuildVersion::Released)
            .map_err(|source| UpdateError::Parse {
                input: input.to_string(),
                source,
            })
    }
}

impl fmt::Display for BuildVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildVersion::Released(version) => version.fmt(f),
            BuildVersion::LocallyBuilt => f.write_str(LOCALLY_BUILT),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_release_version() {
        let parsed = BuildVersion::parse("1.4.2").unwrap();
        assert_eq!(
            parsed,
            BuildVersion::Released(Version::parse("1.4.2").unwrap())
        );
    }

    #[test]
    fn test_parse_with_prerelease_and_build_metadata() {
        let parsed = BuildVersion::parse("2.0.0-rc.1+build.5").unwrap();
        match parsed {
            BuildVersion::Released(v) => {
                assert_eq!(v.major, 2);
                assert_eq!(v.pre.as_str(), "rc.1");
                assert_eq!(v.build.as_str(), "build.5");
            }
            BuildVersion::LocallyBuilt => panic!("expected a released version"),
        }
    }

    #[test]
    fn test_parse_sentinel() {
        assert_eq!(
            BuildVersion::parse(LOCALLY_BUILT).unwrap(),
            BuildVersion::LocallyBuilt
        );
    }

    #[test]
    fn test_parse_malformed_is_propagated() {
        let err = BuildVersion::parse("not-a-version").unwrap_err();
        match err {
            UpdateError::Parse { input, .. } => assert_eq!(input, "not-a-version"),
            other => panic!("expected Parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_display_roundtrip() {
        assert_eq!(BuildVersion::parse("1.2.3").unwrap().to_string(), "1.2.3");
        assert_eq!(BuildVersion::LocallyBuilt.to_string(), LOCALLY_BUILT);
    }

    #[test]
    fn test_running_version_is_parseable() {
        // Either a CI-stamped release version or the locally-built sentinel.
        assert!(BuildVersion::parse(running()).is_ok());
    }
}
