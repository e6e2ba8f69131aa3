//! Error type, formatting and utilities.

use serde::Serialize;
use std::borrow::Cow;

use crate::span::{LineIndex, Span};

/// Handy label creation for [`SourceDiag`]
macro_rules! label {
    ($span:expr $(,)?) => {
        ($span.to_owned().into(), None)
    };
    ($span:expr, $message:expr $(,)?) => {
        ($span.to_owned().into(), Some($message.into()))
    };
    ($span:expr, $fmt:literal, $($arg:expr),+) => {
        label!($span, format!($fmt, $($arg),+))
    }
}
pub(crate) use label;

pub type CowStr = Cow<'static, str>;

/// A label is a pair of a code location and an optional hint at that location
pub type Label = (Span, Option<CowStr>);

/// A diagnostic of source code
#[derive(Debug, Clone, Serialize)]
#[non_exhaustive]
pub struct SourceDiag {
    /// If the diagnostic is an error or warning
    pub severity: Severity,
    /// In which stage did this origin
    pub stage: Stage,
    /// Report message describing the problem
    pub message: CowStr,
    /// Spans of the code that help the user find the error
    ///
    /// Ordered from high to low importance. The first is the main location
    /// of the error and the one the plain report format points at.
    pub labels: Vec<Label>,
    /// Additional hints for the user
    pub hints: Vec<CowStr>,
}

impl std::fmt::Display for SourceDiag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.message.fmt(f)
    }
}

impl std::error::Error for SourceDiag {}

impl PartialEq for SourceDiag {
    fn eq(&self, other: &Self) -> bool {
        self.severity == other.severity && self.message == other.message
    }
}

impl SourceDiag {
    /// Creates a new error
    pub(crate) fn error(message: impl Into<CowStr>, label: Label, stage: Stage) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
            labels: vec![label],
            hints: vec![],
            stage,
        }
    }

    /// Creates a new warning
    pub(crate) fn warning(message: impl Into<CowStr>, label: Label, stage: Stage) -> Self {
        Self {
            severity: Severity::Warning,
            message: message.into(),
            labels: vec![label],
            hints: vec![],
            stage,
        }
    }

    /// Checks if the diagnostic is an error
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    /// Checks if the diagnostic is a warning
    pub fn is_warning(&self) -> bool {
        self.severity == Severity::Warning
    }

    /// Adds a new label
    pub(crate) fn label(mut self, label: Label) -> Self {
        self.labels.push(label);
        self
    }

    /// Adds a new hint
    pub(crate) fn hint(mut self, hint: impl Into<CowStr>) -> Self {
        self.hints.push(hint.into());
        self
    }

    /// The main location of the diagnostic, if it has one
    pub fn span(&self) -> Option<Span> {
        self.labels.first().map(|l| l.0)
    }
}

/// Diagnostic severity
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum Severity {
    /// Fatal error
    Error,
    /// Non fatal warning
    Warning,
}

/// Stage where the diagnostic origined
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub enum Stage {
    /// Parse stage
    Parse,
    /// Execution stage
    Runtime,
}

/// Errors and warnings container
///
/// The [`Display`](std::fmt::Display) implementation only shows the messages,
/// use one of the print or write methods for the full
/// `<file>:<line>:<column>: <severity>: <message>` report format.
#[derive(Debug, Clone, Serialize, Default)]
pub struct SourceReport {
    buf: Vec<SourceDiag>,
}

impl SourceReport {
    pub(crate) fn empty() -> Self {
        Self { buf: Vec::new() }
    }

    pub(crate) fn push(&mut self, diag: SourceDiag) {
        self.buf.push(diag);
    }

    pub(crate) fn error(&mut self, e: SourceDiag) {
        debug_assert!(e.is_error());
        self.push(e);
    }

    pub(crate) fn warn(&mut self, w: SourceDiag) {
        debug_assert!(w.is_warning());
        self.push(w);
    }

    /// Iterate over all diagnostics in emission order
    pub fn iter(&self) -> impl Iterator<Item = &SourceDiag> {
        self.buf.iter()
    }

    /// Get the errors
    pub fn errors(&self) -> impl Iterator<Item = &SourceDiag> {
        self.iter().filter(|e| e.is_error())
    }

    /// Get the warnings
    pub fn warnings(&self) -> impl Iterator<Item = &SourceDiag> {
        self.iter().filter(|e| e.is_warning())
    }

    /// Check if the report has any error
    pub fn has_errors(&self) -> bool {
        self.errors().next().is_some()
    }

    /// Check if the report has any warning
    pub fn has_warnings(&self) -> bool {
        self.warnings().next().is_some()
    }

    /// Check if the report is empty
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Turn every warning into an error
    ///
    /// This is the report side of the `--strict` mode.
    pub fn promote_warnings(&mut self) {
        for diag in &mut self.buf {
            diag.severity = Severity::Error;
        }
    }

    /// Consumes the report and returns a [`Vec`] of [`SourceDiag`]
    pub fn into_vec(self) -> Vec<SourceDiag> {
        self.buf
    }

    /// Write the report in the plain diagnostic format
    ///
    /// One line per diagnostic: `<file>:<line>:<column>: <severity>: <message>`.
    /// This format is stable, downstream tools parse it.
    pub fn write(
        &self,
        file_name: &str,
        source_code: &str,
        w: &mut impl std::io::Write,
    ) -> std::io::Result<()> {
        let lidx = LineIndex::new(source_code);
        for diag in self.iter() {
            write_diag(&mut *w, diag, &lidx, file_name)?;
        }
        Ok(())
    }

    /// Print the report to stderr
    pub fn eprint(&self, file_name: &str, source_code: &str) -> std::io::Result<()> {
        self.write(file_name, source_code, &mut std::io::stderr().lock())
    }
}

impl std::fmt::Display for SourceReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for diag in self.iter() {
            writeln!(f, "{diag}")?;
        }
        Ok(())
    }
}
impl std::error::Error for SourceReport {}

/// Writes a single diagnostic in the plain report format
pub fn write_diag(
    mut w: impl std::io::Write,
    diag: &SourceDiag,
    lidx: &LineIndex,
    file_name: &str,
) -> std::io::Result<()> {
    let (line, col) = diag.span().map(|s| lidx.line_col(s.start())).unwrap_or((1, 1));
    writeln!(
        w,
        "{file_name}:{line}:{col}: {severity}: {message}",
        severity = diag.severity,
        message = diag.message,
    )
}

/// Output from the parse and execution passes
#[derive(Debug, Clone, Serialize)]
pub struct PassResult<T> {
    output: Option<T>,
    report: SourceReport,
}

impl<T> PassResult<T> {
    pub(crate) fn new(output: Option<T>, report: SourceReport) -> Self {
        Self { output, report }
    }

    /// Check if the result has any output. It may not be valid.
    pub fn has_output(&self) -> bool {
        self.output.is_some()
    }

    /// Get the report
    pub fn report(&self) -> &SourceReport {
        &self.report
    }

    /// Get the report mutably, e.g. to [`promote_warnings`](SourceReport::promote_warnings)
    pub fn report_mut(&mut self) -> &mut SourceReport {
        &mut self.report
    }

    /// Check if the result is valid.
    ///
    /// If the result is invalid, the output, if any, should be discarded or
    /// used knowing that it contains errors or is incomplete.
    pub fn is_valid(&self) -> bool {
        self.has_output() && !self.report.has_errors()
    }

    /// Get the output
    pub fn output(&self) -> Option<&T> {
        self.output.as_ref()
    }

    /// Transform into a common Rust [`Result`]
    ///
    /// If the result is valid, the [`Ok`] variant holds the output and a
    /// report with only warnings. Otherwise [`Err`] holds the full report.
    pub fn into_result(self) -> Result<(T, SourceReport), SourceReport> {
        if !self.is_valid() {
            return Err(self.report);
        }
        Ok((self.output.unwrap(), self.report))
    }

    /// Transform into a [`SourceReport`] discarding the output
    pub fn into_report(self) -> SourceReport {
        self.report
    }

    /// Transform into the output discarding errors/warnings
    pub fn into_output(self) -> Option<T> {
        self.output
    }

    /// Unwraps the inner output
    ///
    /// # Panics
    /// If the output is `None`.
    pub fn unwrap_output(self) -> T {
        self.output.unwrap()
    }

    /// Get output and report in a tuple
    pub fn into_tuple(self) -> (Option<T>, SourceReport) {
        (self.output, self.report)
    }

    /// Map the inner output
    pub fn map<F, O>(self, f: F) -> PassResult<O>
    where
        F: FnOnce(T) -> O,
    {
        PassResult {
            output: self.output.map(f),
            report: self.report,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_format() {
        let src = "A recipe\n\nIngredients.\n";
        let mut report = SourceReport::empty();
        report.error(SourceDiag::error(
            "something went wrong",
            label!(Span::new(10, 21)),
            Stage::Parse,
        ));
        report.warn(SourceDiag::warning(
            "this is dubious",
            label!(Span::pos(0)),
            Stage::Parse,
        ));
        let mut out = Vec::new();
        report.write("test.ch", src, &mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "test.ch:3:1: error: something went wrong\n\
             test.ch:1:1: warning: this is dubious\n"
        );
    }

    #[test]
    fn promote_warnings() {
        let mut report = SourceReport::empty();
        report.warn(SourceDiag::warning(
            "w",
            label!(Span::pos(0)),
            Stage::Parse,
        ));
        assert!(!report.has_errors());
        report.promote_warnings();
        assert!(report.has_errors());
        assert!(!report.has_warnings());
    }
}
