//! Platform shell of the demos: one top level window, the message pump and
//! logging setup.

#[cfg(windows)]
mod dbg;
mod logging;
#[cfg(windows)]
mod window;

pub use logging::setup_tracing;
#[cfg(windows)]
pub use window::{WindowConfig, run};

/// Process exit status for the code posted with `WM_QUIT`. Codes outside `0..=255` map
/// to 1 instead of being truncated.
pub fn exit_status(code: i32) -> u8 {
    u8::try_from(code).unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quit_code_kept_when_it_fits() {
        assert_eq!(exit_status(0), 0);
        assert_eq!(exit_status(3), 3);
        assert_eq!(exit_status(255), 255);
    }

    #[test]
    fn out_of_range_quit_code_is_failure() {
        assert_eq!(exit_status(256), 1);
        assert_eq!(exit_status(-1), 1);
    }
}
