//! Launcher for shipping a Linux distribution on the Windows Subsystem for Linux.
//!
//! On first run the launcher registers the bundled root filesystem with the
//! WSL service and applies initial interop/drive-mount configuration. Later
//! runs dispatch to an interactive shell, a one-off command (`run`/`-c`), or
//! a configuration change (`config --default-user`).

use color_eyre::{eyre::Context as _, Report, Result};

mod command_run;
mod console;
mod distribution;
mod invocation;
mod launcher;
mod wsl;

/// Install and configure the tracing/logging system.
///
/// Sets up structured logging with environment-based filtering,
/// error layer integration, and console output formatting.
/// Logs are filtered by RUST_LOG environment variable, defaulting to 'info'.
fn install_tracing() {
    use tracing_error::ErrorLayer;
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let format = fmt::format().without_time().with_target(false).compact();

    let fmt_layer = fmt::layer()
        .event_format(format)
        .with_writer(std::io::stderr);
    let filter_layer = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap();

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .with(ErrorLayer::default())
        .init();
}

fn main() -> Result<(), Report> {
    install_tracing();
    color_eyre::install()?;

    let distribution =
        distribution::DistributionInfo::load().context("Loading launcher profile")?;
    let api = wsl::WslCli::new(distribution.clone());
    let console = console::Term;

    // argv[0] is the launcher itself.
    let args: Vec<String> = std::env::args().skip(1).collect();
    let code = launcher::run(&api, &console, &distribution, &args);
    tracing::debug!("exiting with code {code}");
    std::process::exit(code)
}
