// src/registry/paths.rs

//! `{placeholder}` expansion for step paths and program names.

use std::path::PathBuf;

use thiserror::Error;

/// Placeholders a template may use.
pub const PLACEHOLDERS: &[&str] = &["temp", "home", "local_data", "windir", "exe_dir"];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PathError {
    #[error("unknown placeholder {{{0}}}")]
    Unknown(String),

    #[error("placeholder {{{0}}} cannot be resolved on this host")]
    Unresolved(String),

    #[error("unterminated placeholder in {0:?}")]
    Unterminated(String),
}

/// Check that every placeholder in `template` is one we know about.
pub fn validate_template(template: &str) -> Result<(), PathError> {
    expand_with(template, |_| Some(PathBuf::new())).map(|_| ())
}

/// Expand placeholders in `template` using `lookup` for their values.
pub fn expand_with<F>(template: &str, lookup: F) -> Result<String, PathError>
where
    F: Fn(&str) -> Option<PathBuf>,
{
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let close = after
            .find('}')
            .ok_or_else(|| PathError::Unterminated(template.to_string()))?;
        let name = &after[..close];

        if !PLACEHOLDERS.contains(&name) {
            return Err(PathError::Unknown(name.to_string()));
        }
        let value = lookup(name).ok_or_else(|| PathError::Unresolved(name.to_string()))?;
        out.push_str(&value.to_string_lossy());

        rest = &after[close + 1..];
    }
    out.push_str(rest);

    Ok(out)
}

/// Resolve a placeholder against the running host.
pub fn host_placeholder(name: &str) -> Option<PathBuf> {
    match name {
        "temp" => Some(std::env::temp_dir()),
        "home" => dirs::home_dir(),
        "local_data" => dirs::data_local_dir(),
        "windir" => std::env::var_os("SystemRoot")
            .or_else(|| std::env::var_os("windir"))
            .map(PathBuf::from)
            .or_else(|| Some(PathBuf::from(r"C:\Windows"))),
        "exe_dir" => std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(PathBuf::from)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fake(name: &str) -> Option<PathBuf> {
        match name {
            "temp" => Some(PathBuf::from("/var/tmp")),
            _ => None,
        }
    }

    #[test]
    fn expands_known_placeholders() {
        assert_eq!(expand_with("{temp}/x", fake).unwrap(), "/var/tmp/x");
        assert_eq!(expand_with("plain/path", fake).unwrap(), "plain/path");
    }

    #[test]
    fn reports_unknown_unresolved_and_unterminated() {
        assert_eq!(
            expand_with("{current}", fake),
            Err(PathError::Unknown("current".into()))
        );
        assert_eq!(
            expand_with("{home}/IconCache.db", fake),
            Err(PathError::Unresolved("home".into()))
        );
        assert!(matches!(
            expand_with("{temp", fake),
            Err(PathError::Unterminated(_))
        ));
    }

    #[test]
    fn validate_ignores_host_availability() {
        assert!(validate_template("{home}/{local_data}").is_ok());
        assert!(validate_template("{nope}").is_err());
    }

    #[test]
    fn host_always_has_temp_and_windir() {
        assert!(host_placeholder("temp").is_some());
        assert!(host_placeholder("windir").is_some());
        assert!(host_placeholder("bogus").is_none());
    }
}
