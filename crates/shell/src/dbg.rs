//! Debugger output for `tracing`.
//!
//! The demos run without a console in release builds, so log lines are sent to
//! `OutputDebugStringW` where a debugger or [DebugView](https://learn.microsoft.com/en-us/sysinternals/downloads/debugview)
//! picks them up.

use std::io::{self, Write};

use tracing_subscriber::fmt::MakeWriter;
use windows::{Win32::System::Diagnostics::Debug::OutputDebugStringW, core::PCWSTR};

/// Creates one [`DebugOutputWriter`] per log event.
#[derive(Debug, Clone, Copy, Default)]
pub struct DebugOutput;

impl<'a> MakeWriter<'a> for DebugOutput {
    type Writer = DebugOutputWriter;

    fn make_writer(&'a self) -> Self::Writer {
        DebugOutputWriter { buf: Vec::new() }
    }
}

/// Collects a formatted event as UTF-16 and emits it as one debug string on drop.
pub struct DebugOutputWriter {
    buf: Vec<u16>,
}

impl Write for DebugOutputWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buf.extend(String::from_utf8_lossy(buf).encode_utf16());
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for DebugOutputWriter {
    fn drop(&mut self) {
        if self.buf.is_empty() {
            return;
        }

        self.buf.push(0);
        unsafe {
            OutputDebugStringW(PCWSTR(self.buf.as_ptr()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_text_is_collected_as_utf16() {
        let mut writer = DebugOutput.make_writer();
        writer.write_all("resize failed. ".as_bytes()).unwrap();
        writer.write_all("extent: 0×0\n".as_bytes()).unwrap();

        let expected: Vec<u16> = "resize failed. extent: 0×0\n".encode_utf16().collect();
        assert_eq!(writer.buf, expected);
    }
}
