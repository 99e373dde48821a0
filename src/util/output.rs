use std::io::{self, Write};
use std::sync::atomic::{AtomicU8, Ordering};

use console::style;

const QUIET: u8 = 0;
const NORMAL: u8 = 1;

static VERBOSITY: AtomicU8 = AtomicU8::new(NORMAL);

/// `quiet` wins over any number of `-v` flags.
pub fn configure(verbose: u8, quiet: bool, no_color: bool) {
    let level = if quiet {
        QUIET
    } else {
        NORMAL.saturating_add(verbose)
    };
    VERBOSITY.store(level, Ordering::Relaxed);
    if no_color {
        console::set_colors_enabled(false);
        console::set_colors_enabled_stderr(false);
    }
}

fn level() -> u8 {
    VERBOSITY.load(Ordering::Relaxed)
}

pub fn info(message: &str) {
    if level() >= NORMAL {
        let _ = writeln!(io::stderr(), "{}", message);
    }
}

/// Only shown with `--verbose`.
pub fn detail(message: &str) {
    if level() > NORMAL {
        let _ = writeln!(io::stderr(), "{}", style(message).dim());
    }
}

pub fn warn(message: &str) {
    let _ = writeln!(io::stderr(), "{}", style(message).yellow());
}

pub fn error(message: &str) {
    let _ = writeln!(io::stderr(), "{}", style(message).red());
}
