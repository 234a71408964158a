//! Helpers for running `wsl.exe` (and friends) as child processes.
//!
//! Output handling has one wrinkle: `wsl.exe` writes UTF-16LE to its
//! standard streams on most hosts but plain UTF-8 when wrapped by some
//! terminals, so captured bytes are sniffed and decoded before use.

use std::io::Write as _;
use std::process::{Command, Stdio};

use crate::wsl::WslError;

/// Upper bound on stderr text carried into an error, to keep pathological
/// service output from swamping the diagnostic.
const MAX_DIAGNOSTIC_CHARS: usize = 1024;

/// Decode captured console output from a child process.
///
/// UTF-16LE is detected either by its byte-order mark or by the interleaved
/// NUL bytes ASCII text produces in that encoding.
pub(crate) fn decode_console_output(bytes: &[u8]) -> String {
    let has_bom = bytes.starts_with(&[0xFF, 0xFE]);
    let looks_utf16 = has_bom || (bytes.len() >= 2 && bytes[1] == 0);
    if looks_utf16 {
        let start = if has_bom { 2 } else { 0 };
        let units: Vec<u16> = bytes[start..]
            .chunks_exact(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
            .collect();
        String::from_utf16_lossy(&units)
    } else {
        String::from_utf8_lossy(bytes).into_owned()
    }
}

/// Decode stderr and keep only the trailing portion.
fn diagnostic_tail(bytes: &[u8]) -> String {
    let text = decode_console_output(bytes);
    let trimmed = text.trim();
    let total = trimmed.chars().count();
    trimmed
        .chars()
        .skip(total.saturating_sub(MAX_DIAGNOSTIC_CHARS))
        .collect()
}

fn spawn_error(cmd: &Command, source: std::io::Error) -> WslError {
    WslError::Spawn {
        command: format!("{cmd:?}"),
        source,
    }
}

fn check_status(cmd: &Command, output: &std::process::Output) -> Result<(), WslError> {
    if output.status.success() {
        return Ok(());
    }
    Err(WslError::Api {
        context: format!("{cmd:?}"),
        message: diagnostic_tail(&output.stderr),
    })
}

/// Helpers intended for [`std::process::Command`].
pub(crate) trait CommandRunExt {
    /// Run the child to completion, discarding stdout. A non-zero exit turns
    /// into an error carrying the decoded trailing stderr content.
    fn run(&mut self) -> Result<(), WslError>;

    /// Run the child and return its decoded stdout. Uses `run` semantics for
    /// abnormal exits.
    fn run_get_string(&mut self) -> Result<String, WslError>;

    /// Run the child with `input` fed to stdin.
    fn run_with_stdin(&mut self, input: &str) -> Result<(), WslError>;
}

impl CommandRunExt for Command {
    fn run(&mut self) -> Result<(), WslError> {
        tracing::trace!("exec: {self:?}");
        let output = self
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| spawn_error(self, e))?;
        check_status(self, &output)
    }

    fn run_get_string(&mut self) -> Result<String, WslError> {
        tracing::trace!("exec: {self:?}");
        let output = self
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| spawn_error(self, e))?;
        check_status(self, &output)?;
        Ok(decode_console_output(&output.stdout))
    }

    fn run_with_stdin(&mut self, input: &str) -> Result<(), WslError> {
        tracing::trace!("exec (piped stdin): {self:?}");
        let mut child = self
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| spawn_error(self, e))?;
        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(input.as_bytes())
                .map_err(|e| spawn_error(self, e))?;
        }
        let output = child
            .wait_with_output()
            .map_err(|e| spawn_error(self, e))?;
        check_status(self, &output)
    }
}
