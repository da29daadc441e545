use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

/// Which text pattern the progress extractor should look for in a command's
/// output.
///
/// - `VerifyStyle`: lines like `Verification 42% complete.`
/// - `ImageRestoreStyle`: bracketed bars like `[=====>     ] 37.5%`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProgressKind {
    VerifyStyle,
    ImageRestoreStyle,
}

impl FromStr for ProgressKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "verify-style" => Ok(ProgressKind::VerifyStyle),
            "image-restore-style" => Ok(ProgressKind::ImageRestoreStyle),
            other => Err(format!(
                "invalid progress kind: {other} (expected \"verify-style\" or \"image-restore-style\")"
            )),
        }
    }
}

impl fmt::Display for ProgressKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProgressKind::VerifyStyle => f.write_str("verify-style"),
            ProgressKind::ImageRestoreStyle => f.write_str("image-restore-style"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_kebab_case_names() {
        assert_eq!(
            "verify-style".parse::<ProgressKind>(),
            Ok(ProgressKind::VerifyStyle)
        );
        assert_eq!(
            " Image-Restore-Style ".parse::<ProgressKind>(),
            Ok(ProgressKind::ImageRestoreStyle)
        );
        assert!("sfc".parse::<ProgressKind>().is_err());
    }

    #[test]
    fn display_matches_config_spelling() {
        for kind in [ProgressKind::VerifyStyle, ProgressKind::ImageRestoreStyle] {
            assert_eq!(kind.to_string().parse::<ProgressKind>(), Ok(kind));
        }
    }
}
