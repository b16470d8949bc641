//! Front matter splitting.
//!
//! An article file may start with a description block:
//!
//! ```text
//! ---
//! title: Hello
//! topics:
//!   - rust
//! ---
//!
//! Body text.
//! ```
//!
//! [`split`] separates that block from the body with plain line scanning.
//! It never fails: a file without an opening `---` line is all body. Turning
//! the block into a [`Description`](crate::Description) is a separate step.

/// Line that opens and closes a description block.
pub const DELIMITER: &str = "---";

/// A raw file separated into its description block and body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedDocument {
    /// Lines strictly between the delimiters, each with its own newline.
    pub metadata: String,
    /// Text after the closing delimiter, leading blank lines removed.
    pub body: String,
    /// False when the opening delimiter was never closed. In that case the
    /// whole remainder is in `metadata` and `body` is empty.
    pub terminated: bool,
}

impl ParsedDocument {
    fn plain(text: &str) -> Self {
        Self {
            metadata: String::new(),
            body: text.to_string(),
            terminated: true,
        }
    }

    /// Description lines in order, without line terminators.
    pub fn metadata_lines(&self) -> impl Iterator<Item = &str> {
        self.metadata.lines()
    }

    /// Whether the document carries a non-blank description block.
    pub fn has_metadata(&self) -> bool {
        !self.metadata.trim().is_empty()
    }
}

/// Splits raw file content into description block and body.
///
/// Content is decoded as UTF-8, replacing invalid sequences.
pub fn split(raw: &[u8]) -> ParsedDocument {
    split_str(&String::from_utf8_lossy(raw))
}

/// [`split`] for content that is already text.
pub fn split_str(text: &str) -> ParsedDocument {
    let mut lines = text.split_inclusive('\n');

    let Some(first) = lines.next() else {
        return ParsedDocument::plain(text);
    };
    if without_newline(first) != DELIMITER {
        return ParsedDocument::plain(text);
    }

    let mut metadata = String::new();
    let mut consumed = first.len();

    for line in lines {
        consumed += line.len();

        // Any line starting with the delimiter closes the block, not only an exact match.
        if line.starts_with(DELIMITER) {
            let body = text[consumed..].trim_start_matches(['\n', '\r']);
            return ParsedDocument {
                metadata,
                body: body.to_string(),
                terminated: true,
            };
        }

        metadata.push_str(line);
    }

    ParsedDocument {
        metadata,
        body: String::new(),
        terminated: false,
    }
}

fn without_newline(line: &str) -> &str {
    let line = line.strip_suffix('\n').unwrap_or(line);
    line.strip_suffix('\r').unwrap_or(line)
}
