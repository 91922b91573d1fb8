//! Chromium executable resolution.
//!
//! Resolution happens once at startup, before the listener binds. An
//! explicitly configured path wins, then well-known binary names on
//! `$PATH`, then conventional install locations. A missing binary is a
//! fatal startup diagnostic rather than an install attempt racing the
//! first request.

use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use tracing::debug;

/// Binary names tried on `$PATH`, most specific first.
const PATH_CANDIDATES: &[&str] = &[
    "google-chrome",
    "google-chrome-stable",
    "chromium",
    "chromium-browser",
    "chrome",
];

/// Conventional install locations tried after `$PATH`.
fn install_candidates() -> Vec<PathBuf> {
    let mut candidates = vec![
        PathBuf::from("/usr/bin/google-chrome"),
        PathBuf::from("/usr/bin/chromium"),
        PathBuf::from("/usr/bin/chromium-browser"),
        PathBuf::from("/snap/bin/chromium"),
    ];
    if cfg!(target_os = "macos") {
        candidates.push(PathBuf::from(
            "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
        ));
        candidates.push(PathBuf::from(
            "/Applications/Chromium.app/Contents/MacOS/Chromium",
        ));
    }
    candidates
}

/// Resolve the Chromium executable to launch.
///
/// `configured` comes from `CHROMIUM_PATH`. Pointing it at a path that
/// does not exist is an error, not a silent fallthrough to probing.
pub fn find_chromium(configured: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = configured {
        if path.exists() {
            return Ok(path.to_path_buf());
        }
        bail!(
            "CHROMIUM_PATH points at {} but nothing is there",
            path.display()
        );
    }

    for name in PATH_CANDIDATES {
        if let Ok(found) = which::which(name) {
            debug!("resolved {name} to {}", found.display());
            return Ok(found);
        }
    }

    for candidate in install_candidates() {
        if candidate.exists() {
            debug!("falling back to {}", candidate.display());
            return Ok(candidate);
        }
    }

    bail!("no Chromium binary found; install google-chrome or chromium, or set CHROMIUM_PATH")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configured_path_wins_when_present() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let resolved = find_chromium(Some(file.path())).unwrap();
        assert_eq!(resolved, file.path());
    }

    #[test]
    fn test_dangling_configured_path_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("no-such-chrome");
        let err = find_chromium(Some(&missing)).unwrap_err();
        assert!(err.to_string().contains("CHROMIUM_PATH"));
        assert!(err.to_string().contains("no-such-chrome"));
    }
}
