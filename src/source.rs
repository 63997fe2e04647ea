// Copyright (c) 2016-2021 Fabian Schuiki

//! A source file abstraction that keeps source locations lean. Tokens and
//! diagnostics carry byte spans into the file contents; line and column
//! information is resolved lazily when a diagnostic is rendered.

use crate::name::RcStr;
use std::rc::Rc;

/// A span that does not refer to any text in the source file. Used to
/// initialize span accumulators before the first token has been seen.
pub const INVALID_SPAN: Span = Span { begin: 0, end: 0 };

/// A range of bytes within a source file.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Span {
    pub begin: usize,
    pub end: usize,
}

impl Span {
    /// Create a new span from two byte offsets.
    pub fn new(begin: usize, end: usize) -> Span {
        Span { begin, end }
    }

    /// Create a new span that covers both input spans.
    pub fn union(a: Span, b: Span) -> Span {
        Span {
            begin: std::cmp::min(a.begin, b.begin),
            end: std::cmp::max(a.end, b.end),
        }
    }

    /// Modify this span to also cover `other`.
    pub fn expand(&mut self, other: Span) {
        *self = Span::union(*self, other);
    }
}

/// A single source file, consisting of a path and the file contents. The
/// contents are held in memory for the duration of a parse; spans index into
/// them.
pub struct SourceFile {
    path: RcStr,
    content: Rc<String>,
}

impl SourceFile {
    /// Create a source file from a path and its contents. The path is only
    /// used in diagnostic messages; tests pass virtual paths.
    pub fn new(path: &str, content: String) -> SourceFile {
        SourceFile {
            path: RcStr::new(path),
            content: Rc::new(content),
        }
    }

    /// The path of this source file.
    pub fn path(&self) -> RcStr {
        self.path.clone()
    }

    /// The entire contents of this source file.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Copy a range of the source content into a String owned by the caller.
    pub fn extract(&self, span: Span) -> String {
        self.content
            .get(span.begin..span.end)
            .unwrap_or("")
            .to_string()
    }

    /// Resolve a byte offset to a 1-based line and column.
    pub fn line_col(&self, offset: usize) -> (usize, usize) {
        let mut line = 1;
        let mut col = 1;
        for (i, c) in self.content.char_indices() {
            if i >= offset {
                break;
            }
            if c == '\n' {
                line += 1;
                col = 1;
            } else {
                col += 1;
            }
        }
        (line, col)
    }

    /// The byte extent of the line containing `offset`, excluding the
    /// terminating newline.
    pub fn line_extent(&self, offset: usize) -> Span {
        let bytes = self.content.as_bytes();
        let mut begin = std::cmp::min(offset, bytes.len());
        while begin > 0 && bytes[begin - 1] != b'\n' {
            begin -= 1;
        }
        let mut end = std::cmp::min(offset, bytes.len());
        while end < bytes.len() && bytes[end] != b'\n' {
            end += 1;
        }
        Span::new(begin, end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_col_resolution() {
        let f = SourceFile::new("test.v", "module a;\nendmodule\n".to_string());
        assert_eq!(f.line_col(0), (1, 1));
        assert_eq!(f.line_col(7), (1, 8));
        assert_eq!(f.line_col(10), (2, 1));
    }

    #[test]
    fn extract_and_line_extent() {
        let f = SourceFile::new("test.v", "wire w;\nreg r;\n".to_string());
        assert_eq!(f.extract(Span::new(0, 4)), "wire");
        let line = f.line_extent(10);
        assert_eq!(f.extract(line), "reg r;");
    }
}
