use std::env;
use std::ffi::{OsStr, OsString};
use std::io;
use std::process::Command;

use crate::error::UpdateError;

/// Re-run the launcher with the original argument vector and inherited
/// standard streams, returning the child's exit code.
///
/// The freshly swapped binary image serves the invocation; this process only
/// waits for it and hands its result back, so the user sees no difference
/// from the update having happened.
pub fn restart() -> Result<i32, UpdateError> {
    let mut argv = env::args_os();
    let program = argv
        .next()
        .ok_or_else(|| UpdateError::Restart(io::Error::other("empty argument vector")))?;
    let args: Vec<OsString> = argv.collect();
    run_passthrough(&program, &args)
}

fn run_passthrough(program: &OsStr, args: &[OsString]) -> Result<i32, UpdateError> {
    let status = Command::new(program)
        .args(args)
        .status()
        .map_err(UpdateError::Restart)?;

    // A child killed by a signal has no exit code; report plain failure.
    Ok(status.code().unwrap_or(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(unix)]
    #[test]
    fn test_child_exit_code_propagates() {
        let args = [OsString::from("-c"), OsString::from("exit 7")];
        let code = run_passthrough(OsStr::new("/bin/sh"), &args).unwrap();
        assert_eq!(code, 7);
    }

    #[cfg(unix)]
    #[test]
    fn test_child_success_is_zero() {
        let args = [OsString::from("-c"), OsString::from("true")];
        let code = run_passthrough(OsStr::new("/bin/sh"), &args).unwrap();
        assert_eq!(code, 0);
    }

    #[cfg(unix)]
    #[test]
    fn test_signalled_child_reports_failure() {
        let args = [OsString::from("-c"), OsString::from("kill -9 $$")];
        let code = run_passthrough(OsStr::new("/bin/sh"), &args).unwrap();
        assert_eq!(code, 1);
    }

    #[test]
    fn test_missing_program_is_restart_error() {
        let err = run_passthrough(OsStr::new("/nonexistent/uprun-12345"), &[]).unwrap_err();
        assert!(matches!(err, UpdateError::Restart(_)));
    }
}
