//! WSL service integration.
//!
//! The launcher consumes the Windows Subsystem for Linux through the
//! [`WslApi`] capability trait: feature-presence and registration queries,
//! registration, configuration, interactive launch, and identity lookup.
//! [`WslCli`] is the production implementation, driving `wsl.exe` as a child
//! process; tests substitute a recording fake.

use bitflags::bitflags;
use thiserror::Error;

mod cli;

pub use cli::WslCli;

/// Guest exit code `wsl.exe` reports when the Linux process could not be
/// started at all (as opposed to starting and failing).
pub const EXIT_CODE_CANNOT_START: u32 = u32::MAX;

bitflags! {
    /// Distribution configuration flags, mirroring `WSL_DISTRIBUTION_FLAGS`
    /// from `wslapi.h`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct DistributionFlags: u32 {
        /// Allow launching Windows processes from inside the guest.
        const ENABLE_INTEROP = 0x1;
        /// Append Windows path elements to $PATH inside the guest.
        const APPEND_NT_PATH = 0x2;
        /// Automount fixed Windows drives under /mnt.
        const ENABLE_DRIVE_MOUNTING = 0x4;
    }
}

impl DistributionFlags {
    /// The stock configuration (`WSL_DISTRIBUTION_FLAGS_DEFAULT`).
    pub const DEFAULT: Self = Self::from_bits_truncate(0x7);
}

/// Failures surfaced by gateway operations and by the orchestrator itself.
#[derive(Debug, Error)]
pub enum WslError {
    #[error("the Windows Subsystem for Linux optional component is not installed")]
    FeatureNotPresent,

    /// Registration raced with another installer; benign but reported.
    #[error("a distribution named '{0}' is already registered")]
    AlreadyRegistered(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("failed to launch {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The WSL service reported a failure; `message` carries whatever
    /// diagnostic text it produced.
    #[error("{context}: {message}")]
    Api { context: String, message: String },
}

/// Capability surface of the WSL service.
///
/// Method names follow the `wslapi.h` entry points
/// (`WslIsOptionalComponentInstalled`, `WslRegisterDistribution`, ...) so the
/// mapping to the underlying service stays obvious. All calls are synchronous
/// and block until the service-side operation completes.
pub trait WslApi {
    /// Whether the WSL optional component is installed and usable.
    fn is_optional_component_installed(&self) -> bool;

    /// Whether the launcher's distribution is currently registered.
    fn is_distribution_registered(&self) -> bool;

    /// Register the bundled root filesystem as a new distribution.
    fn register_distribution(&self) -> Result<(), WslError>;

    /// Set the default uid and behavior flags for the distribution.
    fn configure_distribution(
        &self,
        default_uid: u32,
        flags: DistributionFlags,
    ) -> Result<(), WslError>;

    /// Run `command` inside the guest with inherited stdio and return the
    /// guest exit code. An empty command launches the default shell.
    /// `use_cwd` starts the guest process in the current working directory
    /// rather than the guest user's home.
    fn launch_interactive(&self, command: &str, use_cwd: bool) -> Result<u32, WslError>;

    /// Resolve a guest user name to its uid. `None` means the user does not
    /// exist in the guest.
    fn query_uid(&self, user_name: &str) -> Result<Option<u32>, WslError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_flags_cover_stock_configuration() {
        assert!(DistributionFlags::DEFAULT.contains(DistributionFlags::ENABLE_INTEROP));
        assert!(DistributionFlags::DEFAULT.contains(DistributionFlags::APPEND_NT_PATH));
        assert!(DistributionFlags::DEFAULT.contains(DistributionFlags::ENABLE_DRIVE_MOUNTING));
        assert_eq!(DistributionFlags::DEFAULT.bits(), 0x7);
    }
}
