// Copyright (c) 2016-2021 Fabian Schuiki

//! Utilities to implement diagnostics and error reporting facilities.

use crate::source::{SourceFile, Span};
use std::fmt;

/// The severity of a diagnostic.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub enum Severity {
    Note,
    Warning,
    Error,
    Fatal,
}

impl Severity {
    pub fn to_str(self) -> &'static str {
        match self {
            Severity::Fatal => "fatal",
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Note => "note",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.to_str())
    }
}

/// Used to emit structured diagnostic messages.
#[must_use]
#[derive(Clone, Debug)]
pub struct DiagBuilder {
    pub severity: Severity,
    pub message: String,
    pub segments: Vec<DiagSegment>,
}

/// A portion of a diagnostic message.
#[derive(Clone, Debug)]
pub enum DiagSegment {
    Span(Span),
    Note(String),
}

/// A diagnostic result type. Either carries the result `T` in the Ok variant,
/// or an assembled diagnostic in the Err variant.
pub type DiagResult<T> = Result<T, DiagBuilder>;

impl DiagBuilder {
    pub fn new<S: Into<String>>(severity: Severity, message: S) -> DiagBuilder {
        DiagBuilder {
            severity,
            message: message.into(),
            segments: Vec::new(),
        }
    }

    pub fn fatal<S: Into<String>>(message: S) -> DiagBuilder {
        DiagBuilder::new(Severity::Fatal, message)
    }

    pub fn error<S: Into<String>>(message: S) -> DiagBuilder {
        DiagBuilder::new(Severity::Error, message)
    }

    pub fn warning<S: Into<String>>(message: S) -> DiagBuilder {
        DiagBuilder::new(Severity::Warning, message)
    }

    pub fn note<S: Into<String>>(message: S) -> DiagBuilder {
        DiagBuilder::new(Severity::Note, message)
    }

    pub fn segment(self, segment: DiagSegment) -> DiagBuilder {
        let mut segments = self.segments;
        segments.push(segment);
        DiagBuilder { segments, ..self }
    }

    pub fn span(self, span: Span) -> DiagBuilder {
        self.segment(DiagSegment::Span(span))
    }

    pub fn add_note<S: Into<String>>(self, message: S) -> DiagBuilder {
        self.segment(DiagSegment::Note(message.into()))
    }

    pub fn get_severity(&self) -> Severity {
        self.severity
    }

    pub fn get_message(&self) -> &String {
        &self.message
    }

    pub fn get_segments(&self) -> &[DiagSegment] {
        &self.segments
    }

    /// Render this diagnostic against the source file its spans refer to.
    /// The rendered form resolves each span to `path:line:column` and prints
    /// the offending source line with a caret underline.
    pub fn display<'a>(&'a self, file: &'a SourceFile) -> DiagDisplay<'a> {
        DiagDisplay { diag: self, file }
    }
}

/// Renders the diagnostic without span resolution. Used for diagnostics that
/// do not refer to any source text, such as I/O failures.
impl fmt::Display for DiagBuilder {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}{}:\x1B[m\x1B[1m {}\x1B[m",
            severity_color(self.severity),
            self.severity,
            self.message
        )?;
        for segment in &self.segments {
            if let DiagSegment::Note(ref message) = *segment {
                write!(f, "\n   = \x1B[1mnote:\x1B[m {}", message)?;
            }
        }
        Ok(())
    }
}

/// A diagnostic paired with the source file needed to resolve its spans.
pub struct DiagDisplay<'a> {
    diag: &'a DiagBuilder,
    file: &'a SourceFile,
}

impl fmt::Display for DiagDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let colorcode = severity_color(self.diag.severity);
        write!(
            f,
            "{}{}:\x1B[m\x1B[1m {}\x1B[m\n",
            colorcode, self.diag.severity, self.diag.message
        )?;
        for segment in &self.diag.segments {
            match *segment {
                DiagSegment::Span(sp) => {
                    let (line, col) = self.file.line_col(sp.begin);
                    let extent = self.file.line_extent(sp.begin);
                    let text = self.file.extract(extent);
                    write!(f, "  --> {}:{}:{}\n", self.file.path(), line, col)?;
                    write!(f, "   | \n")?;
                    write!(f, "   | ")?;
                    for c in text.chars() {
                        match c {
                            '\t' => write!(f, "    ")?,
                            c => write!(f, "{}", c)?,
                        }
                    }
                    write!(f, "\n   | ")?;
                    for (i, c) in text.char_indices() {
                        let pos = extent.begin + i;
                        let hit = (pos >= sp.begin && pos < sp.end)
                            || (pos == sp.begin && sp.begin == sp.end);
                        let d = if hit { '^' } else { ' ' };
                        match c {
                            '\t' => write!(f, "{}{}{}{}", d, d, d, d)?,
                            _ => write!(f, "{}", d)?,
                        }
                    }
                    write!(f, "\n")?;
                }
                DiagSegment::Note(ref message) => {
                    write!(f, "   = \x1B[1mnote:\x1B[m {}\n", message)?
                }
            }
        }
        Ok(())
    }
}

fn severity_color(severity: Severity) -> &'static str {
    match severity {
        Severity::Fatal | Severity::Error => "\x1B[31;1m",
        Severity::Warning => "\x1B[33;1m",
        Severity::Note => "\x1B[36;1m",
    }
}
