// src/exec/progress.rs

//! Completion-percentage extraction from free-form tool output.
//!
//! The extractor does not enforce monotonicity: whatever a line reports is
//! passed through, even if it is lower than a previous value.

use std::sync::LazyLock;

use regex::Regex;

use crate::types::ProgressKind;

static VERIFY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Verification (\d+)% complete\.").expect("verify-style pattern is valid")
});

static IMAGE_RESTORE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[=+>\s*\] (\d+)\.\d+%").expect("image-restore-style pattern is valid")
});

/// Try to read a completion percentage (0..=100) from `line`.
///
/// `None` just means the line carries no progress information.
pub fn extract(line: &str, kind: ProgressKind) -> Option<u8> {
    let re = match kind {
        ProgressKind::VerifyStyle => &*VERIFY_RE,
        ProgressKind::ImageRestoreStyle => &*IMAGE_RESTORE_RE,
    };

    let digits = re.captures(line)?.get(1)?.as_str();
    let value: u32 = digits.parse().ok()?;
    u8::try_from(value).ok().filter(|pct| *pct <= 100)
}
