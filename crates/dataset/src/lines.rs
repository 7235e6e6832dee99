//! Line splitting that accepts `\n`, `\r\n` and a bare `\r` as terminators.

use std::collections::VecDeque;
use std::io::{self, BufRead};

pub(crate) struct Lines<R> {
    reader: R,
    buf: Vec<u8>,
    pending: VecDeque<String>,
    done: bool,
}

impl<R: BufRead> Lines<R> {
    pub(crate) fn new(reader: R) -> Self {
        Self { reader, buf: Vec::new(), pending: VecDeque::new(), done: false }
    }

    fn fill(&mut self) -> io::Result<()> {
        self.buf.clear();
        if self.reader.read_until(b'\n', &mut self.buf)? == 0 {
            self.done = true;
            return Ok(());
        }

        let mut chunk = self.buf.as_slice();
        if let Some(rest) = chunk.strip_suffix(b"\n") {
            chunk = rest;
        }
        if let Some(rest) = chunk.strip_suffix(b"\r") {
            chunk = rest;
        }
        // `\r` never occurs inside a multi-byte UTF-8 sequence
        for part in chunk.split(|b| *b == b'\r') {
            let line = String::from_utf8(part.to_vec())
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
            self.pending.push_back(line);
        }
        Ok(())
    }
}

impl<R: BufRead> Iterator for Lines<R> {
    type Item = io::Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        while self.pending.is_empty() && !self.done {
            if let Err(e) = self.fill() {
                self.done = true;
                return Some(Err(e));
            }
        }
        self.pending.pop_front().map(Ok)
    }
}
