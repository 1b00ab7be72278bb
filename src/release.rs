use std::time::Duration;

use serde::Deserialize;

use crate::error::UpdateError;

/// Release index queried for the latest published version.
pub const RELEASE_INDEX_URL: &str =
    "https://api.github.com/repos/uprun-tools/uprun/releases/latest";

/// Bound on every remote call so a degraded network cannot stall the
/// wrapped command indefinitely.
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

pub const USER_AGENT: &str = concat!("uprun/", env!("CARGO_PKG_VERSION"));

/// Blocking HTTP agent shared by the resolver and the artifact download.
pub fn http_agent() -> ureq::Agent {
    ureq::AgentBuilder::new().timeout(HTTP_TIMEOUT).build()
}

/// Release index response; only the tag is interesting here.
#[derive(Debug, Deserialize)]
struct ReleaseInfo {
    #[serde(default)]
    tag_name: String,
}

/// Remote release index.
pub struct ReleaseIndex {
    url: String,
}

impl ReleaseIndex {
    pub fn new(url: Option<&str>) -> Self {
        Self {
            url: url.unwrap_or(RELEASE_INDEX_URL).to_string(),
        }
    }

    /// Latest published version, with the tag's leading "v" marker stripped.
    pub fn latest_version(&self) -> Result<String, UpdateError> {
        let response = http_agent()
            .get(&self.url)
            .set("User-Agent", USER_AGENT)
            .call()
            .map_err(|err| UpdateError::Resolution {
                reason: err.to_string(),
            })?;

        if response.status() != 200 {
            return Err(UpdateError::Resolution {
                reason: format!("release index returned status {}", response.status()),
            });
        }

        let body = response
            .into_string()
            .map_err(|err| UpdateError::Resolution {
                reason: format!("failed to read release index response: {err}"),
            })?;

        parse_latest_tag(&body)
    }
}

/// Extract the version from a release index JSON document.
pub fn parse_latest_tag(body: &str) -> Result<String, UpdateError> {
    let info: ReleaseInfo =
        serde_json::from_str(body).map_err(|err| UpdateError::Resolution {
            reason: format!("undecodable release index response: {err}"),
        })?;

    if info.tag_name.is_empty() {
        return Err(UpdateError::Resolution {
            reason: "release index response has no tag_name".to_string(),
        });
    }

    Ok(info
        .tag_name
        .strip_prefix('v')
        .unwrap_or(&info.tag_name)
        .to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tag_strips_version_marker() {
        let version = parse_latest_tag(r#"{"tag_name": "v1.4.2"}"#).unwrap();
        assert_eq!(version, "1.4.2");
    }

    #[test]
    fn test_parse_tag_without_marker_passes_through() {
        let version = parse_latest_tag(r#"{"tag_name": "1.4.2"}"#).unwrap();
        assert_eq!(version, "1.4.2");
    }

    #[test]
    fn test_parse_tag_ignores_extra_fields() {
        let body = r#"{"tag_name": "v2.0.0", "name": "Release 2.0.0", "prerelease": false}"#;
        assert_eq!(parse_latest_tag(body).unwrap(), "2.0.0");
    }

    #[test]
    fn test_missing_tag_name_is_resolution_error() {
        let err = parse_latest_tag(r#"{"name": "no tag here"}"#).unwrap_err();
        assert!(matches!(err, UpdateError::Resolution { .. }));
    }

    #[test]
    fn test_empty_tag_name_is_resolution_error() {
        let err = parse_latest_tag(r#"{"tag_name": ""}"#).unwrap_err();
        assert!(matches!(err, UpdateError::Resolution { .. }));
    }

    #[test]
    fn test_undecodable_body_is_resolution_error() {
        let err = parse_latest_tag("<html>rate limited</html>").unwrap_err();
        assert!(matches!(err, UpdateError::Resolution { .. }));
    }

    #[test]
    fn test_unreachable_index_is_resolution_error() {
        // Nothing listens on the discard port; the connection is refused
        // without touching the network.
        let index = ReleaseIndex::new(Some("http://127.0.0.1:9/releases/latest"));
        let err = index.latest_version().unwrap_err();
        assert!(matches!(err, UpdateError::Resolution { .. }));
    }
}
