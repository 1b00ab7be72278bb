use clap::Parser;
use std::path::PathBuf;

/// Command line arguments
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the configuration file (defaults to <config dir>/uprun/uprun.toml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Check for updates on this invocation even if disabled or throttled
    #[arg(long, conflicts_with = "no_auto_update")]
    pub auto_update: bool,

    /// Skip the update check entirely for this invocation
    #[arg(long)]
    pub no_auto_update: bool,

    /// Update to a specific version instead of the latest release
    #[arg(long, value_name = "VERSION")]
    pub update_version: Option<String>,

    /// Arguments passed through to the wrapped command
    #[arg(last = true)]
    pub args: Vec<String>,
}

impl Args {
    /// Tri-state auto-update override: unset, forced on, or forced off.
    pub fn auto_update_override(&self) -> Option<bool> {
        if self.auto_update {
            Some(true)
        } else if self.no_auto_update {
            Some(false)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_override_unset_by_default() {
        let args = Args::parse_from(["uprun"]);
        assert_eq!(args.auto_update_override(), None);
    }

    #[test]
    fn test_override_forced_on() {
        let args = Args::parse_from(["uprun", "--auto-update"]);
        assert_eq!(args.auto_update_override(), Some(true));
    }

    #[test]
    fn test_override_forced_off() {
        let args = Args::parse_from(["uprun", "--no-auto-update"]);
        assert_eq!(args.auto_update_override(), Some(false));
    }

    #[test]
    fn test_conflicting_overrides_rejected() {
        let result = Args::try_parse_from(["uprun", "--auto-update", "--no-auto-update"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_trailing_args_pass_through() {
        let args = Args::parse_from(["uprun", "--", "apply", "-auto-approve"]);
        assert_eq!(args.args, vec!["apply", "-auto-approve"]);
    }

    #[test]
    fn test_update_version_pin() {
        let args = Args::parse_from(["uprun", "--update-version", "1.4.2"]);
        assert_eq!(args.update_version.as_deref(), Some("1.4.2"));
    }
}
