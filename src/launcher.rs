//! Install and launch orchestration.
//!
//! Maps one argument vector to one process exit code: verify the WSL
//! optional component, register and configure the distribution on first run,
//! then dispatch to an interactive shell, an explicit command, or a
//! configuration change. Everything the orchestrator needs from WSL goes
//! through the [`WslApi`] trait.

use tracing::debug;

use crate::console::Console;
use crate::distribution::DistributionInfo;
use crate::invocation::{self, InstallDecision, RunMode};
use crate::wsl::{DistributionFlags, WslApi, WslError, EXIT_CODE_CANNOT_START};

const MSG_MISSING_OPTIONAL_COMPONENT: &str = "The Windows Subsystem for Linux optional component is not installed.\n\
     Please enable it from \"Turn Windows features on or off\" (or run\n\
     `wsl --install --no-distribution` from an elevated prompt) and try again.";
const MSG_STATUS_INSTALLING: &str = "Installing, this may take a few minutes...";
const MSG_INSTALL_SUCCESS: &str = "Installation successful!";
const MSG_INSTALL_ALREADY_EXISTS: &str = "This distribution is already installed.";

/// Top-level orchestration. Returns the process exit code: `0` on success,
/// `1` on any failure; an empty invocation additionally propagates the guest
/// process's own exit code when the launch itself succeeds.
pub fn run(
    api: &dyn WslApi,
    console: &dyn Console,
    distribution: &DistributionInfo,
    args: &[String],
) -> i32 {
    console.set_title(&distribution.window_title);

    let mut exit_code: u32 = 1;

    // The optional component missing is terminal: nothing else can work, and
    // only the user (or an administrator) can enable it.
    if !api.is_optional_component_installed() {
        eprintln!("{MSG_MISSING_OPTIONAL_COMPONENT}");
        if args.is_empty() {
            console.prompt_for_acknowledgment();
        }
        return exit_code as i32;
    }

    let decision = InstallDecision::from_args(args);
    let mut failure: Option<WslError> = None;

    if !api.is_distribution_registered() {
        match install_distribution(api, distribution, decision.create_user) {
            Ok(()) => {
                println!("{MSG_INSTALL_SUCCESS}");
                exit_code = 0;
            }
            Err(err) => {
                // Another installer won the registration race. Reported
                // distinctly, but still a failure for this invocation.
                if matches!(err, WslError::AlreadyRegistered(_)) {
                    println!("{MSG_INSTALL_ALREADY_EXISTS}");
                }
                exit_code = 1;
                failure = Some(err);
            }
        }
    }

    if failure.is_none() && !decision.install_only {
        match invocation::run_mode(args) {
            RunMode::InteractiveDefault => match api.launch_interactive("", false) {
                Ok(code) => {
                    exit_code = code;
                    // The service succeeded but the Linux process never
                    // started; hold the window so the error output from
                    // wsl.exe stays readable.
                    if code == EXIT_CODE_CANNOT_START {
                        console.prompt_for_acknowledgment();
                    }
                }
                Err(err) => failure = Some(err),
            },
            RunMode::ExplicitCommand(command) => {
                match api.launch_interactive(&command, true) {
                    Ok(code) => exit_code = code,
                    Err(err) => failure = Some(err),
                }
            }
            RunMode::SetDefaultUser(user_name) => {
                match set_default_user(api, &user_name) {
                    Ok(()) => exit_code = 0,
                    Err(err) => failure = Some(err),
                }
            }
            RunMode::InvalidConfig => {
                failure = Some(WslError::InvalidArgument(
                    "expected: config --default-user <username>".into(),
                ));
            }
            RunMode::Usage => {
                print_usage();
                return exit_code as i32;
            }
        }
    }

    if let Some(err) = failure {
        match err {
            WslError::FeatureNotPresent => eprintln!("{MSG_MISSING_OPTIONAL_COMPONENT}"),
            other => eprintln!("Error: {other}"),
        }
        if args.is_empty() {
            console.prompt_for_acknowledgment();
        }
        return 1;
    }

    exit_code as i32
}

/// First-run install sequence: register, best-effort configure, then probe
/// the new environment. A failed registration aborts immediately; a failed
/// configuration does not.
fn install_distribution(
    api: &dyn WslApi,
    distribution: &DistributionInfo,
    create_user: bool,
) -> Result<(), WslError> {
    println!("{MSG_STATUS_INSTALLING}");
    api.register_distribution()?;

    // Interop and drive mounting are conveniences, not prerequisites.
    if let Err(err) = api.configure_distribution(
        0,
        DistributionFlags::ENABLE_INTEROP | DistributionFlags::ENABLE_DRIVE_MOUNTING,
    ) {
        debug!("post-install configuration failed: {err}");
    }

    // Show the freshly installed environment to the user.
    api.launch_interactive(&distribution.probe_command, true)?;

    if create_user {
        // Extension point: create a user account for the host user and make
        // it the default. Registration currently leaves root as the default.
        debug!("default user creation is not implemented; keeping root");
    }

    Ok(())
}

/// Resolve `user_name` inside the guest and make its uid the default.
fn set_default_user(api: &dyn WslApi, user_name: &str) -> Result<(), WslError> {
    let uid = api
        .query_uid(user_name)?
        .ok_or_else(|| WslError::InvalidArgument(format!("unknown user: {user_name}")))?;
    api.configure_distribution(uid, DistributionFlags::DEFAULT)
}

fn print_usage() {
    println!(
        "Launches or configures a Linux distribution.\n\
         \n\
         Usage:\n\
             <no args>\n\
                 Launches the user's default shell in the user's home directory.\n\
         \n\
             install [--root]\n\
                 Install the distribution and do not launch the shell when complete.\n\
                   --root\n\
                       Do not create a user account and leave the default user set to root.\n\
         \n\
             run <command line>\n\
             -c <command line>\n\
                 Run the provided command line in the current working directory.\n\
         \n\
             config --default-user <username>\n\
                 Sets the default user. This must be an existing user."
    );
}
