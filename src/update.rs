use std::fmt;
use std::time::Duration;

use semver::Version;
use tracing::{debug, error, warn};

use crate::apply;
use crate::artifact;
use crate::config::UpdateConfig;
use crate::error::UpdateError;
use crate::release::ReleaseIndex;
use crate::restart;
use crate::throttle::ThrottleFile;
use crate::version::{self, BuildVersion};

/// Why an invocation decided not to update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// `--no-auto-update` on the command line
    ForceDisabled,
    /// `auto_update = false` in the configuration
    Disabled,
    /// The previous check is younger than the configured interval
    CheckedRecently { elapsed: Duration },
    /// Local builds only update when explicitly forced
    LocallyBuilt,
    /// The running version is not older than the resolved one
    UpToDate { current: Version, latest: Version },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::ForceDisabled => {
                write!(f, "auto update is force disabled for this invocation")
            }
            SkipReason::Disabled => write!(f, "auto update is disabled in the config"),
            SkipReason::CheckedRecently { elapsed } => {
                write!(f, "last check was {elapsed:?} ago, within the interval")
            }
            SkipReason::LocallyBuilt => write!(
                f,
                "running a locally built version, no update unless explicitly requested"
            ),
            SkipReason::UpToDate { current, latest } => {
                write!(f, "current version {current} is up to date (latest {latest})")
            }
        }
    }
}

/// Result of one update cycle.
#[derive(Debug)]
pub enum UpdateOutcome {
    Applied { from: BuildVersion, to: Version },
    Skipped(SkipReason),
    Failed(UpdateError),
}

/// Decision table for whether this invocation performs a remote check.
/// Evaluated in order; first match wins. Only reads the throttle stamp,
/// never writes it.
pub fn check_skip_reason(config: &UpdateConfig, throttle: &ThrottleFile) -> Option<SkipReason> {
    match config.auto_update_override {
        Some(false) => return Some(SkipReason::ForceDisabled),
        Some(true) => return None,
        None => {}
    }
    if !config.auto_update {
        return Some(SkipReason::Disabled);
    }
    if let Some(elapsed) = throttle.elapsed_since_check()
        && elapsed < config.check_interval
    {
        return Some(SkipReason::CheckedRecently { elapsed });
    }
    None
}

/// Ordering rule for whether the resolved version replaces the running one:
/// update when the candidate is strictly newer, or whenever the update was
/// forced. Local builds are outside the ordering and only update when forced.
pub fn version_skip_reason(
    current: &BuildVersion,
    latest: &Version,
    forced: bool,
) -> Option<SkipReason> {
    if forced {
        return None;
    }
    match current {
        BuildVersion::LocallyBuilt => Some(SkipReason::LocallyBuilt),
        BuildVersion::Released(cur) if *cur >= *latest => Some(SkipReason::UpToDate {
            current: cur.clone(),
            latest: latest.clone(),
        }),
        BuildVersion::Released(_) => None,
    }
}

/// Sequences gate, resolution, comparison and application for one invocation.
pub struct Updater {
    config: UpdateConfig,
    throttle: ThrottleFile,
    current: String,
}

impl Updater {
    /// Updater for the running binary's own version.
    pub fn new(config: UpdateConfig, throttle: ThrottleFile) -> Self {
        Self::with_version(config, throttle, version::running())
    }

    /// Updater for an explicit running version string.
    pub fn with_version(
        config: UpdateConfig,
        throttle: ThrottleFile,
        current: impl Into<String>,
    ) -> Self {
        Self {
            config,
            throttle,
            current: current.into(),
        }
    }

    /// One full update cycle: gate, stamp, resolve, compare, download, swap.
    ///
    /// Never touches the network when the gate says skip. Stamps the throttle
    /// file before resolving so that a failed check still counts as checked
    /// and a degraded remote is not hammered on every invocation.
    pub fn check_and_apply(&self) -> UpdateOutcome {
        if let Some(reason) = check_skip_reason(&self.config, &self.throttle) {
            return UpdateOutcome::Skipped(reason);
        }
        if self.config.auto_update_override == Some(true) {
            debug!("auto update is forced for this invocation");
        }

        debug!("comparing local and latest versions");
        if let Err(err) = self.throttle.record_check() {
            warn!("could not stamp the update check time: {err}");
        }

        let latest_raw = match &self.config.pinned_version {
            Some(pinned) => pinned.clone(),
            None => {
                let index = ReleaseIndex::new(self.config.release_index_url.as_deref());
                match index.latest_version() {
                    Ok(version) => version,
                    Err(err) => return UpdateOutcome::Failed(err),
                }
            }
        };

        let latest = match Version::parse(&latest_raw) {
            Ok(version) => version,
            Err(source) => {
                return UpdateOutcome::Failed(UpdateError::Parse {
                    input: latest_raw,
                    source,
                });
            }
        };

        let current = match BuildVersion::parse(&self.current) {
            Ok(version) => version,
            Err(err) => return UpdateOutcome::Failed(err),
        };

        let forced = self.config.auto_update_override == Some(true);
        if let Some(reason) = version_skip_reason(&current, &latest, forced) {
            return UpdateOutcome::Skipped(reason);
        }

        let url = artifact::artifact_url(
            self.config.download_base_url.as_deref(),
            &latest.to_string(),
            std::env::consts::OS,
        );

        warn!("updating {} from {current} to {latest}", artifact::TOOL_NAME);
        match apply::apply_update(&url) {
            Ok(()) => UpdateOutcome::Applied {
                from: current,
                to: latest,
            },
            Err(err) => UpdateOutcome::Failed(err),
        }
    }
}

/// Update gate wrapped around the tool's normal entry point; returns the
/// process exit code.
///
/// Every failure on the update path degrades to running the current binary:
/// the user's invocation is never aborted by a failed update attempt.
pub fn run_with_update_check<F>(updater: &Updater, run: F) -> i32
where
    F: FnOnce() -> i32,
{
    match updater.check_and_apply() {
        UpdateOutcome::Applied { from, to } => {
            warn!("{} updated from {from} to {to}, restarting", artifact::TOOL_NAME);
            match restart::restart() {
                Ok(code) => code,
                Err(err) => {
                    error!("{err}");
                    1
                }
            }
        }
        UpdateOutcome::Skipped(reason) => {
            debug!("{reason}, bypassing update");
            run()
        }
        UpdateOutcome::Failed(err) => {
            match &err {
                UpdateError::RollbackFailed { .. } => error!("{err}"),
                other => warn!("update failed, continuing with the current version: {other}"),
            }
            run()
        }
    }
}
