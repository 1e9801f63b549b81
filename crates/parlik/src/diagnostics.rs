//! The diagnostic stream threaded through the likelihood callbacks

use std::fmt::Display;
use std::io::Write;
use std::sync::Mutex;

use tracing::warn;

/// An optional, shareable sink for diagnostic messages.
///
/// Callbacks receive a copy of the stream and may print to it. It carries no
/// control semantics: printing never fails from the caller's perspective (a
/// failed write is logged and dropped). Since callbacks run concurrently, the
/// underlying writer sits behind a [`Mutex`] and each message is written as a
/// single line while holding the lock.
#[derive(Clone, Copy, Default)]
pub struct DiagnosticStream<'a> {
    sink: Option<&'a Mutex<dyn Write + Send>>,
}

impl<'a> DiagnosticStream<'a> {
    /// A stream that discards every message
    pub fn none() -> Self {
        DiagnosticStream { sink: None }
    }

    pub fn new(sink: &'a Mutex<dyn Write + Send>) -> Self {
        DiagnosticStream { sink: Some(sink) }
    }

    pub fn is_enabled(&self) -> bool {
        self.sink.is_some()
    }

    /// write `message` (followed by a newline) to the stream
    pub fn print(&self, message: impl Display) {
        let Some(sink) = self.sink else {
            return;
        };
        // a panicking writer elsewhere shouldn't silence every other message
        let mut writer = match sink.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Err(err) = writeln!(writer, "{message}") {
            warn!("dropped a diagnostic message: {err}");
        }
    }
}

impl core::fmt::Debug for DiagnosticStream<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        f.debug_struct("DiagnosticStream")
            .field("enabled", &self.is_enabled())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn print_appends_lines() {
        let buf: Mutex<Vec<u8>> = Mutex::new(Vec::new());
        let stream = DiagnosticStream::new(&buf);
        assert!(stream.is_enabled());
        stream.print("first");
        stream.print(format_args!("second {}", 2));
        let contents = String::from_utf8(buf.into_inner().unwrap()).unwrap();
        assert_eq!(contents, "first\nsecond 2\n");
    }

    #[test]
    fn none_discards() {
        let stream = DiagnosticStream::none();
        assert!(!stream.is_enabled());
        stream.print("ignored");
    }
}
