//! Terminal output helpers.
//!
//! Status lines go to stderr so that stdout carries only command results
//! (summaries, JSON) and stays pipeable.
//!
//! ```no_run
//! use joinery_cli::ui;
//!
//! ui::init_colors(false);
//! ui::success("Resolved config");
//! ui::warning("config.buildPath moved to config.paths.public");
//! ```

mod messages;

use std::sync::atomic::{AtomicBool, Ordering};

pub use messages::{success, warning};

static COLORS: AtomicBool = AtomicBool::new(true);

/// Check if color output should be enabled.
///
/// Respects NO_COLOR and FORCE_COLOR environment variables, falls back to
/// terminal capability detection.
pub fn should_use_color() -> bool {
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    if std::env::var_os("FORCE_COLOR").is_some() {
        return true;
    }
    console::user_attended_stderr()
}

/// Decides once whether status messages are colored.
pub fn init_colors(no_color: bool) {
    COLORS.store(!no_color && should_use_color(), Ordering::Relaxed);
}

pub(crate) fn colors_enabled() -> bool {
    COLORS.load(Ordering::Relaxed)
}
