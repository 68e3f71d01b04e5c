//! Progress display for a scan and a log sink that shares the terminal with it.

use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use tracing_subscriber::fmt::MakeWriter;

/// One tick per probed candidate; the message holds the file being probed.
pub fn probe_style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner:.green} probing {pos}/{len} [{bar:30.cyan/blue}] {wide_msg:.dim}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .progress_chars("=> ")
}

/// Routes formatted log events through [`ProgressBar::suspend`] so a log
/// line never lands in the middle of a bar redraw.
#[derive(Clone, Debug)]
pub struct BarLogWriter<M> {
    bar: ProgressBar,
    inner: M,
}

impl<M> BarLogWriter<M> {
    pub fn new(bar: ProgressBar, inner: M) -> Self {
        Self { bar, inner }
    }
}

impl<'a, M> MakeWriter<'a> for BarLogWriter<M>
where
    M: MakeWriter<'a>,
{
    type Writer = SuspendedLine<M::Writer>;

    fn make_writer(&'a self) -> Self::Writer {
        SuspendedLine {
            bar: self.bar.clone(),
            inner: self.inner.make_writer(),
            buffer: Vec::new(),
        }
    }
}

/// Buffers one event and emits it with the bar hidden, on flush or drop.
#[derive(Debug)]
pub struct SuspendedLine<W: Write> {
    bar: ProgressBar,
    inner: W,
    buffer: Vec<u8>,
}

impl<W: Write> SuspendedLine<W> {
    fn emit(&mut self) -> io::Result<()> {
        if self.buffer.is_empty() {
            return Ok(());
        }
        let buffer = std::mem::take(&mut self.buffer);
        let inner = &mut self.inner;
        self.bar
            .suspend(|| inner.write_all(&buffer).and_then(|()| inner.flush()))
    }
}

impl<W: Write> Write for SuspendedLine<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.emit()
    }
}

impl<W: Write> Drop for SuspendedLine<W> {
    fn drop(&mut self) {
        let _ = self.emit();
    }
}
