//! Tokenizer for console lines of the form `command[,arg1[,arg2]]`

use heapless::{String, Vec};

/// Longest accepted line, longer input is cut off
pub const MAX_LINE_LEN: usize = 19;

/// A lower-cased, truncated console line
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandLine {
    buffer: String<MAX_LINE_LEN>,
}

impl CommandLine {
    /// Parse everything up to the first CR or LF.
    pub fn parse(raw: &str) -> Self {
        let mut line = Self::default();
        line.extend(raw);
        line
    }

    /// Parse raw serial input. Bytes that are not valid UTF-8 are skipped.
    pub fn from_bytes(raw: &[u8]) -> Self {
        let mut line = Self::default();
        for chunk in raw.utf8_chunks() {
            if !line.extend(chunk.valid()) {
                break;
            }
        }
        line
    }

    // false once a terminator was seen or the buffer is full
    fn extend(&mut self, text: &str) -> bool {
        for c in text.chars() {
            if c == '\r' || c == '\n' || self.buffer.push(c.to_ascii_lowercase()).is_err() {
                return false;
            }
        }
        true
    }

    /// The line as kept after truncation and lower-casing
    pub fn as_str(&self) -> &str {
        &self.buffer
    }

    // Empty tokens are skipped, so `cal,,low` reads as `cal,low`.
    fn tokens(&self) -> impl Iterator<Item = &str> {
        self.buffer.split(',').filter(|token| !token.is_empty())
    }

    /// The command name
    pub fn command(&self) -> Option<&str> {
        self.tokens().next()
    }

    /// First argument
    pub fn arg1(&self) -> Option<&str> {
        self.tokens().nth(1)
    }

    /// Second argument
    pub fn arg2(&self) -> Option<&str> {
        self.tokens().nth(2)
    }
}

/// Collects serial input byte by byte into lines.
#[derive(Debug, Default)]
pub struct LineReader {
    buffer: Vec<u8, MAX_LINE_LEN>,
}

impl LineReader {
    /// Create an empty reader
    pub const fn new() -> Self {
        Self { buffer: Vec::new() }
    }

    /// Feed one byte, returns the line once a CR or LF arrives.
    /// Bytes past [`MAX_LINE_LEN`] are dropped until the terminator.
    pub fn push(&mut self, byte: u8) -> Option<CommandLine> {
        match byte {
            b'\r' | b'\n' if self.buffer.is_empty() => None,
            b'\r' | b'\n' => {
                let line = CommandLine::from_bytes(&self.buffer);
                self.buffer.clear();
                Some(line)
            }
            _ => {
                // full buffer: truncate
                let _ = self.buffer.push(byte);
                None
            }
        }
    }
}

/// Leading number of `arg`, `25.5abc` gives 25.5. `None` without any digit.
pub fn parse_float(arg: &str) -> Option<f32> {
    arg.get(..numeric_prefix_len(arg, true))?.parse().ok()
}

/// Like [`parse_float`], but only for arguments starting with a digit.
/// Signs and a leading dot are refused.
pub fn parse_unsigned_float(arg: &str) -> Option<f32> {
    if arg.as_bytes().first()?.is_ascii_digit() {
        parse_float(arg)
    } else {
        None
    }
}

/// Leading integer of `arg`, `None` without any digit or on overflow.
pub fn parse_int(arg: &str) -> Option<i32> {
    arg.get(..numeric_prefix_len(arg, false))?.parse().ok()
}

fn numeric_prefix_len(arg: &str, fraction: bool) -> usize {
    let bytes = arg.as_bytes();
    let mut end = usize::from(matches!(bytes.first(), Some(b'-' | b'+')));
    let mut digits = 0;
    let mut seen_dot = !fraction;
    while let Some(&b) = bytes.get(end) {
        match b {
            b'0'..=b'9' => digits += 1,
            b'.' if !seen_dot => seen_dot = true,
            _ => break,
        }
        end += 1;
    }
    if digits == 0 {
        0
    } else {
        end
    }
}
