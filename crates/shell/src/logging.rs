use std::io;

use tracing::level_filters::LevelFilter;
#[cfg(windows)]
use tracing_subscriber::fmt::writer::{MakeWriterExt, Tee};

#[cfg(windows)]
use crate::dbg::DebugOutput;

/// Installs the global `tracing` subscriber.
///
/// On Windows every build logs to the debugger output as well as stderr, since release
/// builds run without a console. Debug builds log everything, release builds `INFO`
/// and above.
pub fn setup_tracing() {
    #[cfg(debug_assertions)]
    let level = LevelFilter::TRACE;
    #[cfg(not(debug_assertions))]
    let level = LevelFilter::INFO;

    let res = tracing_subscriber::fmt::fmt()
        .with_ansi(false)
        .with_thread_ids(true)
        .with_max_level(level)
        .with_writer(log_writer())
        .try_init();

    // a subscriber installed earlier keeps working
    _ = res;
}

#[cfg(windows)]
type LogWriter = Tee<DebugOutput, fn() -> io::Stderr>;

#[cfg(windows)]
fn log_writer() -> LogWriter {
    DebugOutput.and(io::stderr as fn() -> io::Stderr)
}

#[cfg(not(windows))]
fn log_writer() -> fn() -> io::Stderr {
    io::stderr
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tracing_subscriber::fmt::MakeWriter;

    use super::*;

    #[test]
    fn log_writer_accepts_event_text() {
        let writer = log_writer();
        let mut event = writer.make_writer();
        event.write_all(b"shader compilation failed\n").unwrap();
        event.flush().unwrap();
    }

    #[cfg(windows)]
    #[test]
    fn debugger_output_in_every_profile() {
        // the writer type is the same with and without debug assertions
        let _: LogWriter = log_writer();
    }
}
