//! CLI color helpers for stderr diagnostics.
//!
//! All functions respect `NO_COLOR`, `FORCE_COLOR`, and TTY detection via
//! `owo-colors`' `if_supports_color()`, plus the `--no-color` flag.

use std::sync::atomic::{AtomicBool, Ordering};

use owo_colors::OwoColorize;
use owo_colors::Stream::Stderr;

/// Global override: when true, forces color off (set by `--no-color` flag).
///
/// Kept in-process: the environment is what this tool forwards, so the
/// flag must not show up in it.
static NO_COLOR_FLAG: AtomicBool = AtomicBool::new(false);

// Ember (error): #B87060
const EMBER: (u8, u8, u8) = (184, 112, 96);

// Copper (warning): #C49A5C
const COPPER: (u8, u8, u8) = (196, 154, 92);

/// Call once from main.rs when `--no-color` is passed.
pub fn set_no_color() {
    NO_COLOR_FLAG.store(true, Ordering::Relaxed);
}

fn color_disabled() -> bool {
    NO_COLOR_FLAG.load(Ordering::Relaxed)
}

/// Apply error styling (ember red, for stderr messages).
pub fn error(text: &str) -> String {
    if color_disabled() {
        return text.to_string();
    }
    text.if_supports_color(Stderr, |t| t.truecolor(EMBER.0, EMBER.1, EMBER.2))
        .to_string()
}

/// Apply warning styling (copper amber, for stderr messages).
pub fn warning(text: &str) -> String {
    if color_disabled() {
        return text.to_string();
    }
    text.if_supports_color(Stderr, |t| t.truecolor(COPPER.0, COPPER.1, COPPER.2))
        .to_string()
}
