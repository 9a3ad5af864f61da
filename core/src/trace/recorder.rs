use std::fmt::Write as _;
use std::io;

/// Observer of every byte the decoder moves across the link.
pub trait Trace {
    fn comment(&mut self, text: &str);

    /// Bytes received from the monitor, one call per frame.
    fn on_input(&mut self, bytes: &[u8]);

    /// Bytes sent to the monitor.
    fn on_output(&mut self, bytes: &[u8]);
}

impl<T: Trace + ?Sized> Trace for &mut T {
    fn comment(&mut self, text: &str) {
        (**self).comment(text)
    }

    fn on_input(&mut self, bytes: &[u8]) {
        (**self).on_input(bytes)
    }

    fn on_output(&mut self, bytes: &[u8]) {
        (**self).on_output(bytes)
    }
}

/// Discards everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullTrace;

impl Trace for NullTrace {
    fn comment(&mut self, _text: &str) {}
    fn on_input(&mut self, _bytes: &[u8]) {}
    fn on_output(&mut self, _bytes: &[u8]) {}
}

/// Renders directives back to back in memory, e.g. `#protocol 3<FE 19<FC`.
#[derive(Clone, Debug, Default)]
pub struct StringTrace {
    buffer: String,
}

impl StringTrace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_str(&self) -> &str {
        &self.buffer
    }
}

impl std::fmt::Display for StringTrace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.buffer)
    }
}

impl Trace for StringTrace {
    fn comment(&mut self, text: &str) {
        self.buffer.push('#');
        self.buffer.push_str(text);
    }

    fn on_input(&mut self, bytes: &[u8]) {
        self.buffer.push('<');
        push_hex(&mut self.buffer, bytes);
    }

    fn on_output(&mut self, bytes: &[u8]) {
        self.buffer.push('>');
        push_hex(&mut self.buffer, bytes);
    }
}

/// Writes one directive per line, the format [`crate::trace::parse_trace`] reads.
///
/// Write failures are logged and otherwise ignored; a broken trace file must
/// not stop decoding.
#[derive(Debug)]
pub struct WriterTrace<W: io::Write> {
    writer: W,
    failed: bool,
}

impl<W: io::Write> WriterTrace<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            failed: false,
        }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn line(&mut self, prefix: char, body: &str) {
        if self.failed {
            return;
        }
        if let Err(err) = writeln!(self.writer, "{prefix}{body}") {
            log::warn!("trace write failed, disabling trace: {err}");
            self.failed = true;
        }
    }
}

impl<W: io::Write> Trace for WriterTrace<W> {
    fn comment(&mut self, text: &str) {
        self.line('#', text);
    }

    fn on_input(&mut self, bytes: &[u8]) {
        self.line('<', &hex(bytes));
    }

    fn on_output(&mut self, bytes: &[u8]) {
        self.line('>', &hex(bytes));
    }
}

/// Upper-case hex bytes separated by single spaces.
pub fn hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 3);
    push_hex(&mut out, bytes);
    out
}

fn push_hex(out: &mut String, bytes: &[u8]) {
    for (idx, byte) in bytes.iter().enumerate() {
        if idx > 0 {
            out.push(' ');
        }
        let _ = write!(out, "{:02X}", byte);
    }
}
