//! Text delta accumulator
//!
//! Turns raw text fragments into display chunks. With trimming enabled the
//! leading whitespace of the whole text is dropped and trailing whitespace is
//! withheld until more non-whitespace text arrives, so the concatenation of
//! all emitted chunks equals the full text without its outer whitespace.

#[derive(Debug, Clone, Default)]
pub struct TextDeltaAccumulator {
    trim_whitespace: bool,
    is_first: bool,
    withheld: String,
    text: String,
}

impl TextDeltaAccumulator {
    pub fn new(trim_whitespace: bool) -> Self {
        Self {
            trim_whitespace,
            is_first: true,
            withheld: String::new(),
            text: String::new(),
        }
    }

    /// Feed one fragment; returns the chunk to emit, if any.
    pub fn push(&mut self, fragment: &str) -> Option<String> {
        if !self.trim_whitespace {
            if fragment.is_empty() {
                return None;
            }
            self.text.push_str(fragment);
            return Some(fragment.to_string());
        }

        let combined = if self.is_first {
            fragment.trim_start().to_string()
        } else {
            format!("{}{}", self.withheld, fragment)
        };

        let content = combined.trim_end();
        if content.is_empty() {
            // whitespace only: keep withholding it
            if !self.is_first {
                self.withheld = combined;
            }
            return None;
        }

        self.withheld = combined[content.len()..].to_string();
        self.is_first = false;
        let chunk = content.to_string();
        self.text.push_str(&chunk);
        Some(chunk)
    }

    /// Text emitted so far.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn into_text(self) -> String {
        self.text
    }
}
