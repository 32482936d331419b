//! Line sources and tokenization.

use std::borrow::Cow;
use std::collections::VecDeque;
use std::io::BufRead;

/// Supplies input lines to the dispatcher; `None` means end of input.
pub trait LineSource {
    fn next_line(&mut self) -> Option<String>;
}

/// Lines read from any buffered reader, e.g. locked stdin.
pub struct ReaderLines<R> {
    reader: R,
}

impl<R: BufRead> ReaderLines<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl<R: BufRead> LineSource for ReaderLines<R> {
    /// Only end of input or a failing reader yields `None`; bytes that are not
    /// UTF-8 are replaced so the session keeps going.
    fn next_line(&mut self) -> Option<String> {
        let mut buf = Vec::new();
        match self.reader.read_until(b'\n', &mut buf) {
            Ok(0) => return None,
            Ok(_) => {}
            Err(e) => {
                log::warn!("failed to read input line: {}", e);
                return None;
            }
        }
        let line = String::from_utf8_lossy(&buf);
        if let Cow::Owned(_) = line {
            log::warn!("input line is not valid UTF-8; invalid bytes replaced");
        }
        Some(line.trim_end_matches(|c: char| c == '\n' || c == '\r').to_string())
    }
}

/// A fixed script of lines.
#[derive(Debug, Clone, Default)]
pub struct ScriptedLines {
    lines: VecDeque<String>,
}

impl ScriptedLines {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.lines.len()
    }
}

impl LineSource for ScriptedLines {
    fn next_line(&mut self) -> Option<String> {
        self.lines.pop_front()
    }
}

/// Split a command line on whitespace.
pub fn tokenize(line: &str) -> Vec<String> {
    line.split_whitespace().map(String::from).collect()
}
