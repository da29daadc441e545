// src/host/privilege.rs

//! Administrator-rights check performed before `run`.
//!
//! Most maintenance tools refuse to work, or silently do less, without
//! elevation. The probe asks the OS through a tiny command:
//! `net session` on Windows (succeeds only when elevated) and `id -u`
//! elsewhere (uid 0 means root).

use std::fmt;
use std::process::Stdio;

use tracing::{debug, warn};

use crate::errors::{MaintError, Result};
use crate::exec::process::base_command;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Elevation {
    Elevated,
    Limited,
    /// The probe itself could not run.
    Unknown,
}

impl fmt::Display for Elevation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Elevation::Elevated => "elevated",
            Elevation::Limited => "not elevated",
            Elevation::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

/// Ask the host whether this process has administrator rights.
pub async fn detect() -> Elevation {
    #[cfg(windows)]
    let (program, args) = ("net", ["session".to_string()]);
    #[cfg(not(windows))]
    let (program, args) = ("id", ["-u".to_string()]);

    let mut cmd = base_command(program, &args);
    cmd.stdout(Stdio::piped()).stderr(Stdio::null());

    let output = match cmd.output().await {
        Ok(output) => output,
        Err(e) => {
            debug!(program, error = %e, "elevation probe could not start");
            return Elevation::Unknown;
        }
    };

    if cfg!(windows) {
        if output.status.success() {
            Elevation::Elevated
        } else {
            Elevation::Limited
        }
    } else if output.status.success() {
        elevation_from_uid(&String::from_utf8_lossy(&output.stdout))
    } else {
        Elevation::Unknown
    }
}

/// Interpret the output of `id -u`.
pub fn elevation_from_uid(stdout: &str) -> Elevation {
    match stdout.trim().parse::<u32>() {
        Ok(0) => Elevation::Elevated,
        Ok(_) => Elevation::Limited,
        Err(_) => Elevation::Unknown,
    }
}

/// Decide whether `run` may proceed.
///
/// A limited process is refused unless the operator opted out; an
/// inconclusive probe only warns.
pub fn admit(elevation: Elevation, allow_unelevated: bool) -> Result<()> {
    match (elevation, allow_unelevated) {
        (Elevation::Elevated, _) => Ok(()),
        (Elevation::Limited, false) => Err(MaintError::NotElevated),
        (Elevation::Limited, true) => {
            warn!("running without administrator rights; most actions will fail");
            Ok(())
        }
        (Elevation::Unknown, _) => {
            warn!("could not determine administrator rights; continuing");
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uid_output_maps_to_elevation() {
        assert_eq!(elevation_from_uid("0\n"), Elevation::Elevated);
        assert_eq!(elevation_from_uid("1000\n"), Elevation::Limited);
        assert_eq!(elevation_from_uid(""), Elevation::Unknown);
        assert_eq!(elevation_from_uid("root"), Elevation::Unknown);
    }

    #[test]
    fn limited_process_is_refused_unless_allowed() {
        assert!(admit(Elevation::Elevated, false).is_ok());
        assert!(matches!(
            admit(Elevation::Limited, false),
            Err(MaintError::NotElevated)
        ));
        assert!(admit(Elevation::Limited, true).is_ok());
        assert!(admit(Elevation::Unknown, false).is_ok());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn probe_is_conclusive_on_unix() {
        assert_ne!(detect().await, Elevation::Unknown);
    }
}
