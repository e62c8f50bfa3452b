// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Where PrintFleet keeps its config file and preference database.

use std::path::PathBuf;

use printfleet_core::error::Result;

const APP_DIR: &str = "printfleet";

/// Overrides the data directory entirely (used by tests and portable installs).
const OVERRIDE_ENV: &str = "PRINTFLEET_DATA_DIR";

/// Resolve and create the data directory.
pub fn data_dir() -> Result<PathBuf> {
    let dir = match std::env::var_os(OVERRIDE_ENV) {
        Some(path) => PathBuf::from(path),
        None => resolve(
            std::env::var_os("XDG_DATA_HOME").map(PathBuf::from),
            std::env::var_os("HOME").map(PathBuf::from),
        ),
    };
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// XDG data home, else `~/.local/share`, else the temp dir.
fn resolve(xdg_data_home: Option<PathBuf>, home: Option<PathBuf>) -> PathBuf {
    let base = xdg_data_home
        .filter(|p| p.is_absolute())
        .or_else(|| home.map(|h| h.join(".local").join("share")))
        .unwrap_or_else(std::env::temp_dir);
    base.join(APP_DIR)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn xdg_wins_over_home() {
        let dir = resolve(Some("/data".into()), Some("/home/ann".into()));
        assert_eq!(dir, PathBuf::from("/data/printfleet"));
    }

    #[test]
    fn relative_xdg_is_ignored() {
        let dir = resolve(Some("data".into()), Some("/home/ann".into()));
        assert_eq!(dir, PathBuf::from("/home/ann/.local/share/printfleet"));
    }

    #[test]
    fn falls_back_to_temp() {
        assert_eq!(resolve(None, None), std::env::temp_dir().join("printfleet"));
    }
}
