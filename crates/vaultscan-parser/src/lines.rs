//! Bounded line reading.
//!
//! Lines are decoded lossily and stripped of `\n` / `\r\n`. A line longer
//! than the configured limit is a read error for the whole file.

use std::io::{self, BufRead, Read};

/// Whether the first line of a note opens a frontmatter block
pub fn opens_frontmatter(first_line: &str) -> bool {
    first_line.starts_with("---")
}

/// Line iterator with a per-line byte limit
pub struct LineReader<R> {
    reader: R,
    max_line_bytes: usize,
    buf: Vec<u8>,
    failed: bool,
}

impl<R: BufRead> LineReader<R> {
    pub fn new(reader: R, max_line_bytes: usize) -> Self {
        Self {
            reader,
            max_line_bytes,
            buf: Vec::new(),
            failed: false,
        }
    }

    fn read_line(&mut self) -> io::Result<Option<String>> {
        self.buf.clear();
        // Room for the terminator on a line that is exactly at the limit.
        let cap = self.max_line_bytes as u64 + 2;
        let read = (&mut self.reader)
            .take(cap)
            .read_until(b'\n', &mut self.buf)?;
        if read == 0 {
            return Ok(None);
        }

        let mut content: &[u8] = &self.buf;
        if let Some(rest) = content.strip_suffix(b"\n") {
            content = rest;
            if let Some(rest) = content.strip_suffix(b"\r") {
                content = rest;
            }
        }

        if content.len() > self.max_line_bytes {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("line exceeds {} bytes", self.max_line_bytes),
            ));
        }

        Ok(Some(String::from_utf8_lossy(content).into_owned()))
    }
}

impl<R: BufRead> Iterator for LineReader<R> {
    type Item = io::Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        match self.read_line() {
            Ok(Some(line)) => Some(Ok(line)),
            Ok(None) => None,
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}
