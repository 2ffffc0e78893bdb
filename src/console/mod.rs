use anyhow::Error;

mod render;

/// Console output for the analyst pipeline. Rendering only: the ticker
/// arrives as a CLI argument, so there is no interactive input loop.
pub struct Console;

impl Console {
    /// Display a welcome banner
    pub fn display_welcome() {
        render::display_welcome();
    }

    /// Announce the start of a run for the given ticker
    pub fn display_run_start(ticker: &str) {
        render::display_run_start(ticker);
    }

    /// Display the final pipeline result
    pub fn display_result(result: &str) {
        render::display_result(result);
    }

    /// Display an error with context-aware messaging
    pub fn display_error(error: &Error) {
        render::display_error(error);
    }
}
