/*
MIT License

Copyright (c) 2026 Raja Lehtihet and Wael El Oraiby

Permission is hereby granted, free of charge, to any person obtaining a copy
of this software and associated documentation files (the "Software"), to deal
in the Software without restriction, including without limitation the rights
to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
copies of the Software, and to permit persons to whom the Software is
furnished to do so, subject to the following conditions:

The above copyright notice and this permission notice shall be included in all
copies or substantial portions of the Software.

THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
SOFTWARE.
*/

//! Located syntax errors for declaration lists.

use crate::ast::SourceSpan;
use std::fmt;

/// Syntax error with the offending source line and a caret marker under it.
///
/// `line` and `column` are 1-based; both are `0` when the error has no
/// position (for example incomplete input).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    /// What the parser or loader expected.
    pub message: String,
    /// Source label, `<inline>` for strings.
    pub file: String,
    /// 1-based line.
    pub line: usize,
    /// 1-based UTF-8 column.
    pub column: usize,
    /// Full text of the offending line.
    pub snippet: String,
    /// Spaces and carets aligned with `snippet`.
    pub pointer: String,
}

impl SyntaxError {
    /// Error without a position.
    pub fn unlocated(message: impl Into<String>, file: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            file: file.into(),
            line: 0,
            column: 0,
            snippet: String::new(),
            pointer: String::new(),
        }
    }

    /// Error anchored at `span` inside `source`.
    pub fn located(
        message: impl Into<String>,
        file: impl Into<String>,
        source: &str,
        span: &SourceSpan,
    ) -> Self {
        let snippet = source
            .lines()
            .nth(span.line.saturating_sub(1))
            .unwrap_or_default()
            .to_string();
        let pointer = caret_marker(&snippet, span.column, span.len());
        Self {
            message: message.into(),
            file: file.into(),
            line: span.line,
            column: span.column,
            snippet,
            pointer,
        }
    }

    /// Returns whether the error carries a line and column.
    pub fn is_located(&self) -> bool {
        self.line > 0 && self.column > 0
    }
}

/// Carets start at `column` and never run past the end of the line; at
/// least one caret is always drawn.
fn caret_marker(line: &str, column: usize, len: usize) -> String {
    let width = line.chars().count();
    let offset = column.saturating_sub(1).min(width);
    let carets = len.clamp(1, width.saturating_sub(offset).max(1));
    format!("{}{}", " ".repeat(offset), "^".repeat(carets))
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.is_located() {
            return match self.file.as_str() {
                "" => write!(f, "{}", self.message),
                file => write!(f, "{} ({file})", self.message),
            };
        }
        let gutter = " ".repeat(self.line.to_string().len());
        writeln!(f, "{}", self.message)?;
        writeln!(f, "{gutter}--> {}:{}:{}", self.file, self.line, self.column)?;
        writeln!(f, "{gutter} |")?;
        writeln!(f, "{} | {}", self.line, self.snippet)?;
        write!(f, "{gutter} | {}", self.pointer)
    }
}

impl std::error::Error for SyntaxError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(start: usize, end: usize, line: usize, column: usize) -> SourceSpan {
        SourceSpan {
            start,
            end,
            line,
            column,
        }
    }

    #[test]
    fn renders_location_snippet_and_caret() {
        let source = "abstract A;\nfeature b in A [2..];\n";
        let err = SyntaxError::located("expected upper bound", "m.fm", source, &span(29, 31, 2, 18));
        assert_eq!(err.snippet, "feature b in A [2..];");
        assert_eq!(err.pointer, format!("{}^^", " ".repeat(17)));
        assert_eq!(
            err.to_string(),
            format!(
                "expected upper bound\n --> m.fm:2:18\n  |\n2 | feature b in A [2..];\n  | {}",
                err.pointer
            )
        );
    }

    #[test]
    fn carets_stop_at_line_end() {
        let err = SyntaxError::located("unterminated", "<inline>", "x", &span(0, 40, 1, 1));
        assert_eq!(err.pointer, "^");
        assert_eq!(caret_marker("ab", 3, 0), "  ^");
    }

    #[test]
    fn unlocated_errors_show_only_the_file() {
        let err = SyntaxError::unlocated("Incomplete input", "m.fm");
        assert!(!err.is_located());
        assert_eq!(err.to_string(), "Incomplete input (m.fm)");
        assert_eq!(SyntaxError::unlocated("bad", "").to_string(), "bad");
    }
}
