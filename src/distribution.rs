//! Deploy-time identity of the distribution this launcher manages.
//!
//! The identity ships with the launcher: built-in defaults, overridable by a
//! `distribution.json` profile placed next to the executable. Nothing here is
//! mutated at runtime.

use camino::{Utf8Path, Utf8PathBuf};
use color_eyre::eyre::{eyre, Context};
use color_eyre::Result;
use serde::Deserialize;

/// Profile file read from the executable's directory, when present.
const PROFILE_FILE: &str = "distribution.json";

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DistributionInfo {
    /// Registration name; must be unique on the host.
    pub name: String,

    /// Terminal window title shown while the launcher runs.
    pub window_title: String,

    /// Root filesystem tarball registered on first run. Relative paths
    /// resolve against the executable's directory.
    pub rootfs: Utf8PathBuf,

    /// Directory the distribution's backing files are installed into.
    /// Defaults to `state/` next to the executable.
    pub install_dir: Option<Utf8PathBuf>,

    /// Command run once after registration to show the new environment to
    /// the user.
    pub probe_command: String,
}

impl Default for DistributionInfo {
    fn default() -> Self {
        Self {
            name: "MyDistribution".into(),
            window_title: "My Distribution".into(),
            rootfs: "install.tar.gz".into(),
            install_dir: None,
            probe_command: "/usr/bin/neofetch".into(),
        }
    }
}

impl DistributionInfo {
    /// Load the profile from the executable's directory, falling back to the
    /// built-in defaults when no profile file exists. A malformed profile is
    /// an error rather than a silent fallback.
    pub fn load() -> Result<Self> {
        Self::load_from(&executable_dir()?)
    }

    fn load_from(dir: &Utf8Path) -> Result<Self> {
        let path = dir.join(PROFILE_FILE);
        let mut info = if path.exists() {
            let raw =
                std::fs::read_to_string(&path).with_context(|| format!("Reading {path}"))?;
            serde_json::from_str(&raw).with_context(|| format!("Parsing {path}"))?
        } else {
            Self::default()
        };
        info.anchor(dir);
        Ok(info)
    }

    /// Resolve relative profile paths against `dir` and fill in the default
    /// install directory.
    fn anchor(&mut self, dir: &Utf8Path) {
        if self.rootfs.is_relative() {
            self.rootfs = dir.join(&self.rootfs);
        }
        match &self.install_dir {
            Some(d) if d.is_relative() => self.install_dir = Some(dir.join(d)),
            Some(_) => {}
            None => self.install_dir = Some(dir.join("state")),
        }
    }

    /// Directory the registration imports into. Always set after `load`.
    pub fn install_dir(&self) -> &Utf8Path {
        self.install_dir
            .as_deref()
            .unwrap_or_else(|| Utf8Path::new("state"))
    }
}

fn executable_dir() -> Result<Utf8PathBuf> {
    let exe = std::env::current_exe().context("Locating the launcher executable")?;
    let dir = exe
        .parent()
        .ok_or_else(|| eyre!("Launcher executable has no parent directory"))?
        .to_path_buf();
    Utf8PathBuf::from_path_buf(dir)
        .map_err(|p| eyre!("Launcher directory is not valid UTF-8: {}", p.display()))
}
