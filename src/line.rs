//! Line classification and the one-line lookahead cursor.
//!
//! A PIML document is read one physical line at a time. Each line is
//! comment-stripped, measured for indentation and classified by its prefix:
//!
//! | Prefix       | Kind                  |
//! |--------------|-----------------------|
//! | `> (`        | array object header   |
//! | `>\|`        | set item              |
//! | `>`          | array item            |
//! | `(key)`      | key-only / key-value  |
//! | anything     | multi-line content    |

use crate::scalar::{find_comment, unescape};
use crate::{Error, Result};
use std::borrow::Cow;

/// What a classified line introduces.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineKind {
    /// Empty or comment-only
    Blank,
    /// `(key) value`
    KeyValue,
    /// `(key)`
    KeyOnly,
    /// `> value`
    ArrayItem,
    /// `>| value`
    SetItem,
    /// `> (Label)`
    ArrayObjectHeader,
    /// Indented text without a recognized prefix
    MultiLineContent,
}

impl LineKind {
    /// Human-readable name used in error messages.
    pub fn describe(self) -> &'static str {
        match self {
            LineKind::Blank => "blank line",
            LineKind::KeyValue | LineKind::KeyOnly => "key",
            LineKind::ArrayItem | LineKind::ArrayObjectHeader => "list item",
            LineKind::SetItem => "set item",
            LineKind::MultiLineContent => "text line",
        }
    }
}

/// One classified physical line.
#[derive(Clone, Debug, PartialEq)]
pub struct Line<'de> {
    /// 1-based line number in the document.
    pub number: usize,
    /// Leading space count.
    pub indent: usize,
    pub kind: LineKind,
    /// Key text for `KeyValue` / `KeyOnly`.
    pub key: Option<Cow<'de, str>>,
    /// Item or value payload; for `MultiLineContent` the whole line with its
    /// indentation preserved.
    pub value: Cow<'de, str>,
    /// The raw text, for error messages.
    pub raw: &'de str,
}

/// Classifies a single physical line.
///
/// # Examples
///
/// ```rust
/// use serde_piml::line::{classify, LineKind};
///
/// let line = classify("  (first name) John # comment", 1).unwrap();
/// assert_eq!(line.indent, 2);
/// assert_eq!(line.kind, LineKind::KeyValue);
/// assert_eq!(line.key.as_deref(), Some("first name"));
/// assert_eq!(line.value, "John");
/// ```
pub fn classify(raw: &str, number: usize) -> Result<Line<'_>> {
    let content = match find_comment(raw) {
        Some(pos) => raw[..pos].trim_end(),
        None => raw,
    };

    let trimmed = content.trim();
    let blank = |value| Line {
        number,
        indent: 0,
        kind: LineKind::Blank,
        key: None,
        value,
        raw,
    };
    if trimmed.is_empty() {
        return Ok(blank(Cow::Borrowed("")));
    }

    let mut indent = 0;
    for ch in content.chars() {
        match ch {
            ' ' => indent += 1,
            '\t' => return Err(Error::syntax(number, "tabs are not allowed", raw)),
            _ => break,
        }
    }

    let line = |kind, key, value| Line {
        number,
        indent,
        kind,
        key,
        value,
        raw,
    };

    if trimmed.starts_with("> (") {
        Ok(line(LineKind::ArrayObjectHeader, None, Cow::Borrowed("")))
    } else if let Some(rest) = trimmed.strip_prefix(">|") {
        Ok(line(LineKind::SetItem, None, unescape(rest.trim())))
    } else if let Some(rest) = trimmed.strip_prefix('>') {
        Ok(line(LineKind::ArrayItem, None, unescape(rest.trim())))
    } else if let Some(rest) = trimmed.strip_prefix('(') {
        let close = rest
            .find(')')
            .ok_or_else(|| Error::syntax(number, "invalid key format, missing ')'", raw))?;
        let key = unescape(&rest[..close]);
        let value = rest[close + 1..].trim();
        if value.is_empty() {
            Ok(line(LineKind::KeyOnly, Some(key), Cow::Borrowed("")))
        } else {
            Ok(line(LineKind::KeyValue, Some(key), unescape(value)))
        }
    } else {
        Ok(line(LineKind::MultiLineContent, None, unescape(content)))
    }
}

/// Cursor over the document lines with a single buffered lookahead.
///
/// `peek` skips blank and comment-only lines; `consume` hands out the buffered
/// line. The number of whitespace-only lines skipped directly before the
/// buffered line is kept so multi-line text can restore them.
pub struct LineReader<'de> {
    lines: std::iter::Enumerate<std::str::Lines<'de>>,
    peeked: Option<Line<'de>>,
    blank_run: usize,
    last_line: usize,
}

impl<'de> LineReader<'de> {
    pub fn new(input: &'de str) -> Self {
        LineReader {
            lines: input.lines().enumerate(),
            peeked: None,
            blank_run: 0,
            last_line: 0,
        }
    }

    /// Returns the next significant line without consuming it.
    pub fn peek(&mut self) -> Result<Option<&Line<'de>>> {
        if self.peeked.is_none() {
            self.blank_run = 0;
            for (index, raw) in self.lines.by_ref() {
                self.last_line = index + 1;
                let line = classify(raw, index + 1)?;
                if line.kind != LineKind::Blank {
                    self.peeked = Some(line);
                    break;
                }
                if raw.trim().is_empty() {
                    self.blank_run += 1;
                }
            }
        }
        Ok(self.peeked.as_ref())
    }

    /// Takes the buffered line so the next `peek` advances.
    pub fn consume(&mut self) -> Option<Line<'de>> {
        self.peeked.take()
    }

    /// Whitespace-only lines skipped right before the buffered line.
    pub fn blank_run(&self) -> usize {
        self.blank_run
    }

    /// Number of the most recently scanned physical line.
    pub fn line_number(&self) -> usize {
        self.peeked.as_ref().map_or(self.last_line, |line| line.number)
    }
}
