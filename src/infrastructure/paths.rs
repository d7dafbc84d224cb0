//! Filesystem locations for configuration and trace output.
//!
//! The data directory is resolved from the environment in this order:
//! `SCRIM_DATA_DIR`, `$XDG_DATA_HOME/scrim`, `$HOME/.local/share/scrim`, and
//! finally a `scrim` directory under the system temp dir.

use std::env;
use std::path::PathBuf;

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "SCRIM_DATA_DIR";

/// Returns the directory used for trace files and the default config.
///
/// # Examples
///
/// ```
/// use scrim::infrastructure::get_data_dir;
///
/// let data_dir = get_data_dir();
/// assert!(data_dir.ends_with("scrim") || std::env::var_os("SCRIM_DATA_DIR").is_some());
/// ```
#[must_use]
pub fn get_data_dir() -> PathBuf {
    if let Some(dir) = env::var_os(DATA_DIR_ENV).filter(|v| !v.is_empty()) {
        return PathBuf::from(dir);
    }
    if let Some(xdg) = env::var_os("XDG_DATA_HOME").filter(|v| !v.is_empty()) {
        return PathBuf::from(xdg).join("scrim");
    }
    env::var_os("HOME")
        .filter(|v| !v.is_empty())
        .map_or_else(
            || env::temp_dir().join("scrim"),
            |home| PathBuf::from(home).join(".local").join("share").join("scrim"),
        )
}

/// Expands a leading `~` to the user's home directory.
///
/// Paths without a leading `~`, or when `HOME` is unset, are returned as-is.
///
/// # Examples
///
/// ```
/// use scrim::infrastructure::expand_tilde;
///
/// assert_eq!(expand_tilde("/absolute/path"), std::path::PathBuf::from("/absolute/path"));
/// ```
#[must_use]
pub fn expand_tilde(path: &str) -> PathBuf {
    let home = env::var_os("HOME").filter(|v| !v.is_empty());
    match (path, home) {
        ("~", Some(home)) => PathBuf::from(home),
        (rest, Some(home)) if rest.starts_with("~/") => PathBuf::from(home).join(&rest[2..]),
        (other, _) => PathBuf::from(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_tilde_paths_are_untouched() {
        assert_eq!(expand_tilde("relative/dir"), PathBuf::from("relative/dir"));
        assert_eq!(expand_tilde("/etc/scrim.toml"), PathBuf::from("/etc/scrim.toml"));
    }

    #[test]
    fn tilde_prefix_is_expanded_when_home_is_known() {
        let Some(home) = env::var_os("HOME").filter(|v| !v.is_empty()) else {
            return;
        };
        assert_eq!(expand_tilde("~/traces"), PathBuf::from(&home).join("traces"));
        assert_eq!(expand_tilde("~"), PathBuf::from(home));
    }
}
