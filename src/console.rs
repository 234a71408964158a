//! Console title and acknowledgment-prompt policy.
//!
//! When the launcher was started with no arguments it was most likely
//! double-clicked, so its window closes the moment the process exits. The
//! orchestrator blocks on [`Console::prompt_for_acknowledgment`] before
//! exiting on those paths so error output stays readable. Behind a trait so
//! orchestrator tests can observe prompts without a terminal.

use std::io::{self, BufRead as _, Write as _};

pub trait Console {
    /// Update the terminal window title.
    fn set_title(&self, title: &str);

    /// Block until the user acknowledges.
    fn prompt_for_acknowledgment(&self);
}

/// [`Console`] backed by the real terminal.
pub struct Term;

impl Console for Term {
    fn set_title(&self, title: &str) {
        // OSC 0 is honored by Windows Terminal, VT-enabled conhost, and
        // effectively every other emulator.
        let mut out = io::stdout();
        let _ = write!(out, "\x1b]0;{title}\x07");
        let _ = out.flush();
    }

    fn prompt_for_acknowledgment(&self) {
        println!("Press enter to continue...");
        let mut line = String::new();
        let _ = io::stdin().lock().read_line(&mut line);
    }
}
