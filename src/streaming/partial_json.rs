//! Tolerant parser for incomplete JSON text
//!
//! Streamed structured output arrives as a growing JSON prefix. The parser
//! first tries a strict parse; otherwise it repairs the prefix (closes an open
//! string, drops a dangling key, removes an incomplete trailing scalar, appends
//! the missing closers) and parses again.

use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Container {
    Object,
    Array,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Expect {
    Key,
    Colon,
    Value,
    Comma,
}

#[derive(Debug, Clone, Copy)]
struct Frame {
    container: Container,
    expect: Expect,
    /// Byte offset where the current member or element begins.
    entry_start: usize,
}

#[derive(Debug, Default)]
struct Scanner {
    stack: Vec<Frame>,
    root_started: bool,
    root_done: bool,
    in_string: bool,
    string_is_key: bool,
    escape_start: Option<usize>,
    unicode_remaining: u8,
    scalar_start: Option<usize>,
}

impl Scanner {
    /// Whether a value may begin at this point.
    fn value_allowed(&self) -> bool {
        match self.stack.last() {
            Some(frame) => frame.expect == Expect::Value,
            None => !self.root_done,
        }
    }

    fn begin_value(&mut self) -> Option<()> {
        if !self.value_allowed() {
            return None;
        }
        self.root_started = true;
        Some(())
    }

    fn after_value(&mut self) {
        match self.stack.last_mut() {
            Some(frame) => frame.expect = Expect::Comma,
            None => self.root_done = true,
        }
    }

    fn end_scalar(&mut self) {
        if self.scalar_start.take().is_some() {
            self.after_value();
        }
    }

    fn scan(&mut self, text: &str) -> Option<()> {
        for (i, c) in text.char_indices() {
            if self.in_string {
                self.scan_string_char(i, c);
                continue;
            }
            if self.scalar_start.is_some() {
                if c.is_whitespace() || matches!(c, '{' | '}' | '[' | ']' | ',' | ':' | '"') {
                    self.end_scalar();
                } else {
                    continue;
                }
            }
            match c {
                c if c.is_whitespace() => {}
                '{' | '[' => {
                    self.begin_value()?;
                    let container = if c == '{' { Container::Object } else { Container::Array };
                    let expect = if c == '{' { Expect::Key } else { Expect::Value };
                    self.stack.push(Frame {
                        container,
                        expect,
                        entry_start: i + 1,
                    });
                }
                '}' | ']' => {
                    let frame = self.stack.pop()?;
                    let expected = if c == '}' { Container::Object } else { Container::Array };
                    if frame.container != expected {
                        return None;
                    }
                    self.after_value();
                }
                '"' => {
                    let is_key = matches!(
                        self.stack.last(),
                        Some(Frame { container: Container::Object, expect: Expect::Key, .. })
                    );
                    if !is_key {
                        self.begin_value()?;
                    }
                    self.in_string = true;
                    self.string_is_key = is_key;
                }
                ':' => {
                    let frame = self.stack.last_mut()?;
                    if frame.expect != Expect::Colon {
                        return None;
                    }
                    frame.expect = Expect::Value;
                }
                ',' => {
                    let frame = self.stack.last_mut()?;
                    if frame.expect != Expect::Comma {
                        return None;
                    }
                    frame.expect = match frame.container {
                        Container::Object => Expect::Key,
                        Container::Array => Expect::Value,
                    };
                    frame.entry_start = i + 1;
                }
                _ => {
                    self.begin_value()?;
                    self.scalar_start = Some(i);
                }
            }
        }
        Some(())
    }

    fn scan_string_char(&mut self, i: usize, c: char) {
        if self.unicode_remaining > 0 {
            self.unicode_remaining -= 1;
            if self.unicode_remaining == 0 {
                self.escape_start = None;
            }
            return;
        }
        if self.escape_start.is_some() {
            if c == 'u' {
                self.unicode_remaining = 4;
            } else {
                self.escape_start = None;
            }
            return;
        }
        match c {
            '\\' => self.escape_start = Some(i),
            '"' => {
                self.in_string = false;
                if self.string_is_key {
                    if let Some(frame) = self.stack.last_mut() {
                        frame.expect = Expect::Colon;
                    }
                } else {
                    self.after_value();
                }
            }
            _ => {}
        }
    }

    /// Offset to cut back to when the current object member is incomplete.
    fn open_member_start(&self) -> Option<usize> {
        self.stack
            .last()
            .filter(|frame| frame.container == Container::Object)
            .map(|frame| frame.entry_start)
    }

    fn repair(&self, text: &str) -> Option<String> {
        if !self.root_started {
            return None;
        }
        let mut repaired = text.to_string();

        if self.in_string {
            if self.string_is_key {
                repaired.truncate(self.open_member_start()?);
            } else {
                if let Some(escape) = self.escape_start {
                    repaired.truncate(escape);
                }
                repaired.push('"');
            }
        } else if let Some(start) = self.scalar_start {
            let mut token = repaired[start..].to_string();
            while !token.is_empty() && serde_json::from_str::<Value>(&token).is_err() {
                token.pop();
            }
            if token.is_empty() {
                match self.open_member_start() {
                    Some(member_start) => repaired.truncate(member_start),
                    None => repaired.truncate(start),
                }
            } else {
                repaired.truncate(start);
                repaired.push_str(&token);
            }
        } else if let Some(frame) = self.stack.last()
            && frame.container == Container::Object
            && matches!(frame.expect, Expect::Colon | Expect::Value)
        {
            repaired.truncate(frame.entry_start);
        }

        let trimmed_len = repaired.trim_end().len();
        repaired.truncate(trimmed_len);
        if repaired.ends_with(',') {
            repaired.pop();
        }

        for frame in self.stack.iter().rev() {
            repaired.push(match frame.container {
                Container::Object => '}',
                Container::Array => ']',
            });
        }
        Some(repaired)
    }
}

/// Parse a possibly incomplete JSON document.
///
/// Returns `None` for empty input and for text that cannot be repaired into
/// JSON.
pub fn parse_partial_json(text: &str) -> Option<Value> {
    if let Ok(value) = serde_json::from_str(text) {
        return Some(value);
    }

    let mut scanner = Scanner::default();
    scanner.scan(text)?;
    let repaired = scanner.repair(text)?;
    serde_json::from_str(&repaired).ok()
}
