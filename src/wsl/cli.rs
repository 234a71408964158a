//! [`WslApi`] implementation backed by `wsl.exe`.
//!
//! Registration, configuration, and launches all go through the `wsl.exe`
//! command-line surface rather than the wslapi.dll binding: `--import` for
//! registration, `--list --quiet` for the registration query, and
//! `--distribution`/`--user` for in-guest execution. Configuration is
//! applied by writing `/etc/wsl.conf` inside the guest as root.

use std::process::{Command, Stdio};

use tracing::debug;

use crate::command_run::CommandRunExt;
use crate::distribution::DistributionInfo;
use crate::wsl::{DistributionFlags, WslApi, WslError, EXIT_CODE_CANNOT_START};

const WSL_EXE: &str = "wsl.exe";

pub struct WslCli {
    distribution: DistributionInfo,
}

impl WslCli {
    pub fn new(distribution: DistributionInfo) -> Self {
        Self { distribution }
    }

    fn wsl(&self) -> Command {
        Command::new(WSL_EXE)
    }

    /// A command targeting the launcher's distribution, running as `user`.
    fn in_guest(&self, user: &str) -> Command {
        let mut cmd = self.wsl();
        cmd.args(["--distribution", &self.distribution.name, "--user", user]);
        cmd
    }

    /// Resolve a uid to its guest user name so it can be written to the
    /// `[user]` section of wsl.conf, which takes names rather than uids.
    fn user_name_for_uid(&self, uid: u32) -> Result<String, WslError> {
        if uid == 0 {
            return Ok("root".to_string());
        }
        let passwd = self
            .in_guest("root")
            .args(["-e", "getent", "passwd", &uid.to_string()])
            .run_get_string()?;
        passwd
            .split(':')
            .next()
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .ok_or_else(|| WslError::Api {
                context: format!("resolving uid {uid}"),
                message: format!("unparseable passwd entry: {passwd:?}"),
            })
    }
}

/// Render the `/etc/wsl.conf` content for a flag set and default user.
fn render_wsl_conf(default_user: &str, flags: DistributionFlags) -> String {
    let automount = flags.contains(DistributionFlags::ENABLE_DRIVE_MOUNTING);
    let interop = flags.contains(DistributionFlags::ENABLE_INTEROP);
    let append_path = flags.contains(DistributionFlags::APPEND_NT_PATH);
    format!(
        "[automount]\nenabled={automount}\n\n\
         [interop]\nenabled={interop}\nappendWindowsPath={append_path}\n\n\
         [user]\ndefault={default_user}\n"
    )
}

/// Whether a registration failure means the distribution already exists.
/// `wsl.exe` localizes its messages, so the stable `ERROR_ALREADY_EXISTS`
/// HRESULT is checked alongside the English text.
fn is_already_exists(message: &str) -> bool {
    let lower = message.to_ascii_lowercase();
    lower.contains("already exists") || lower.contains("0x800700b7")
}

/// Whether a service failure means the subsystem itself is unavailable
/// (`ERROR_LINUX_SUBSYSTEM_NOT_PRESENT`). Raced feature removal surfaces
/// here rather than in the up-front component check.
fn is_subsystem_missing(message: &str) -> bool {
    let lower = message.to_ascii_lowercase();
    lower.contains("0x8007019e") || lower.contains("optional component is not enabled")
}

fn classify(err: WslError) -> WslError {
    match err {
        WslError::Api { ref message, .. } if is_subsystem_missing(message) => {
            WslError::FeatureNotPresent
        }
        other => other,
    }
}

impl WslApi for WslCli {
    fn is_optional_component_installed(&self) -> bool {
        // `wsl.exe --status` exits non-zero when the subsystem is not
        // usable; a spawn failure means wsl.exe itself is absent.
        match self
            .wsl()
            .arg("--status")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
        {
            Ok(status) => status.success(),
            Err(err) => {
                debug!("wsl.exe --status failed to spawn: {err}");
                false
            }
        }
    }

    fn is_distribution_registered(&self) -> bool {
        match self.wsl().args(["--list", "--quiet"]).run_get_string() {
            Ok(listing) => listing
                .lines()
                .any(|line| line.trim() == self.distribution.name),
            Err(err) => {
                debug!("listing distributions failed: {err}");
                false
            }
        }
    }

    fn register_distribution(&self) -> Result<(), WslError> {
        let install_dir = self.distribution.install_dir();
        std::fs::create_dir_all(install_dir).map_err(|source| WslError::Spawn {
            command: format!("mkdir {install_dir}"),
            source,
        })?;

        let result = self
            .wsl()
            .args([
                "--import",
                &self.distribution.name,
                install_dir.as_str(),
                self.distribution.rootfs.as_str(),
            ])
            .run();
        match result {
            Err(WslError::Api { message, .. }) if is_already_exists(&message) => {
                Err(WslError::AlreadyRegistered(self.distribution.name.clone()))
            }
            other => other.map_err(classify),
        }
    }

    fn configure_distribution(
        &self,
        default_uid: u32,
        flags: DistributionFlags,
    ) -> Result<(), WslError> {
        let default_user = self.user_name_for_uid(default_uid).map_err(classify)?;
        let conf = render_wsl_conf(&default_user, flags);
        debug!("writing wsl.conf:\n{conf}");
        self.in_guest("root")
            .args(["-e", "sh", "-c", "cat > /etc/wsl.conf"])
            .run_with_stdin(&conf)
            .map_err(classify)
    }

    fn launch_interactive(&self, command: &str, use_cwd: bool) -> Result<u32, WslError> {
        let mut cmd = self.wsl();
        cmd.args(["--distribution", &self.distribution.name]);
        if !use_cwd {
            cmd.args(["--cd", "~"]);
        }
        if !command.is_empty() {
            // Handed to the guest's default shell as one command line; the
            // launcher's space-join already flattened argument boundaries.
            cmd.arg("--").arg(command);
        }
        tracing::trace!("launch: {cmd:?}");
        let status = cmd.status().map_err(|source| WslError::Spawn {
            command: format!("{cmd:?}"),
            source,
        })?;
        Ok(status
            .code()
            .map(|code| code as u32)
            .unwrap_or(EXIT_CODE_CANNOT_START))
    }

    fn query_uid(&self, user_name: &str) -> Result<Option<u32>, WslError> {
        match self
            .in_guest("root")
            .args(["-e", "id", "-u", user_name])
            .run_get_string()
        {
            // Non-numeric output means the guest printed something other
            // than a uid; treat it the same as an unknown user.
            Ok(output) => Ok(output.trim().parse().ok()),
            Err(err) => {
                debug!("uid lookup for {user_name} failed: {err}");
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_wsl_conf_full_flags() {
        let conf = render_wsl_conf("bob", DistributionFlags::DEFAULT);
        assert!(conf.contains("[automount]\nenabled=true"));
        assert!(conf.contains("enabled=true\nappendWindowsPath=true"));
        assert!(conf.contains("[user]\ndefault=bob"));
    }

    #[test]
    fn test_render_wsl_conf_install_time_flags() {
        let conf = render_wsl_conf(
            "root",
            DistributionFlags::ENABLE_INTEROP | DistributionFlags::ENABLE_DRIVE_MOUNTING,
        );
        assert!(conf.contains("[automount]\nenabled=true"));
        assert!(conf.contains("appendWindowsPath=false"));
        assert!(conf.contains("default=root"));
    }

    #[test]
    fn test_render_wsl_conf_empty_flags() {
        let conf = render_wsl_conf("root", DistributionFlags::empty());
        assert!(conf.contains("[automount]\nenabled=false"));
        assert!(conf.contains("[interop]\nenabled=false"));
    }

    #[test]
    fn test_subsystem_missing_classification() {
        let err = classify(WslError::Api {
            context: "wsl --import".into(),
            message: "Error code: Wsl/0x8007019e".into(),
        });
        assert!(matches!(err, WslError::FeatureNotPresent));

        let err = classify(WslError::Api {
            context: "wsl --import".into(),
            message: "disk full".into(),
        });
        assert!(matches!(err, WslError::Api { .. }));
    }

    #[test]
    fn test_already_exists_classification() {
        assert!(is_already_exists(
            "A distribution with the supplied name already exists."
        ));
        assert!(is_already_exists("Error code: Wsl/Service/RegisterDistro/0x800700b7"));
        assert!(!is_already_exists("The system cannot find the file specified."));
    }
}
