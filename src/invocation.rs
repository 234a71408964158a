//! Command-line forms accepted by the launcher.
//!
//! The grammar is deliberately positional and literal: the first token
//! selects the mode, extra tokens after `install [--root]` are ignored, and
//! any unrecognized first token falls back to usage output. This predates
//! conventional option parsing and existing deployments depend on it, so it
//! is matched token-for-token rather than fed through an option parser.

pub const ARG_CONFIG: &str = "config";
pub const ARG_CONFIG_DEFAULT_USER: &str = "--default-user";
pub const ARG_INSTALL: &str = "install";
pub const ARG_INSTALL_ROOT: &str = "--root";
pub const ARG_RUN: &str = "run";
pub const ARG_RUN_C: &str = "-c";

/// Whether this invocation is install-only, and whether installation should
/// set up a non-root default user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstallDecision {
    pub install_only: bool,
    pub create_user: bool,
}

impl InstallDecision {
    pub fn from_args(args: &[String]) -> Self {
        let install_only = args.first().is_some_and(|a| a == ARG_INSTALL);
        let root_only = install_only && args.get(1).is_some_and(|a| a == ARG_INSTALL_ROOT);
        Self {
            install_only,
            create_user: !root_only,
        }
    }
}

/// The action selected by an argument vector. Selection is total: every
/// vector maps to exactly one variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunMode {
    /// No arguments: launch the default shell.
    InteractiveDefault,
    /// `run <cmd...>` or `-c <cmd...>`: the remaining tokens joined with
    /// single spaces. The join loses argument boundaries for tokens that
    /// themselves contain spaces; this is long-standing documented behavior.
    ExplicitCommand(String),
    /// `config --default-user <name>` with exactly that shape.
    SetDefaultUser(String),
    /// `config` with any other arity or sub-flag.
    InvalidConfig,
    /// Any other first token.
    Usage,
}

pub fn run_mode(args: &[String]) -> RunMode {
    match args.first().map(String::as_str) {
        None => RunMode::InteractiveDefault,
        Some(ARG_RUN) | Some(ARG_RUN_C) => RunMode::ExplicitCommand(args[1..].join(" ")),
        Some(ARG_CONFIG) => {
            if args.len() == 3 && args[1] == ARG_CONFIG_DEFAULT_USER {
                RunMode::SetDefaultUser(args[2].clone())
            } else {
                RunMode::InvalidConfig
            }
        }
        Some(_) => RunMode::Usage,
    }
}
