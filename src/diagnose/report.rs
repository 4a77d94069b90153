// Diagnostic sinks and rendering
//
//  Copyright (C) 2026 pkgld contributors.
//
//  This file is part of pkgld.
//
//  This program is free software: you can redistribute it and/or modify
//  it under the terms of the GNU General Public License as published by
//  the Free Software Foundation, either version 3 of the License, or
//  (at your option) any later version.
//
//  This program is distributed in the hope that it will be useful,
//  but WITHOUT ANY WARRANTY; without even the implied warranty of
//  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
//  GNU General Public License for more details.
//
//  You should have received a copy of the GNU General Public License
//  along with this program.  If not, see <http://www.gnu.org/licenses/>.

//! Diagnostic sinks and rendering.
//!
//! A [`Reporter`] is the injected collaborator through which every
//!   diagnostic produced during linking flows.
//! The linker itself never decides whether to abort on a diagnostic;
//!   it records as much as it can and the caller consults
//!   [`Reporter::error_count`] once the stage concludes.

use super::{Diagnostic, Level};
use crate::span::Span;
use std::io::Write;

/// Sink for diagnostic reports.
///
/// Implementations must expect to receive many diagnostics per run and
///   must never panic on any of them;
///     the whole point of the diagnostic system is to surface the maximal
///     set of problems from a single linking pass.
pub trait Reporter {
    /// Record a diagnostic event.
    fn report(&mut self, diagnostic: &impl Diagnostic);

    /// Number of diagnostics recorded at [`Level::Error`] severity or
    ///   worse.
    fn error_count(&self) -> usize;

    /// Whether a build-failing diagnostic has been recorded.
    fn has_errors(&self) -> bool {
        self.error_count() > 0
    }
}

/// Render diagnostics to a writer as they are reported.
///
/// The output is modeled after Rust's own error reporting:
///   a severity and message heading followed by one line per annotated
///   span.
/// Rendering failures are ignored rather than masking the diagnostics
///   that were requested;
///     a reporter that cannot write is in no position to report that
///     fact either.
pub struct VisualReporter<W: Write> {
    writer: W,
    error_count: usize,
}

impl<W: Write> VisualReporter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            error_count: 0,
        }
    }

    /// Consume the reporter and return the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> Reporter for VisualReporter<W> {
    fn report(&mut self, diagnostic: &impl Diagnostic) {
        let level = diagnostic.severity();

        if level.is_error() {
            self.error_count += 1;
        }

        // See the struct-level note on swallowed write errors.
        let _ = write!(
            self.writer,
            "{level}[{code:04}]: {diagnostic}\n",
            code = diagnostic.code(),
        );

        for aspan in diagnostic.describe() {
            let _ = match aspan.label() {
                Some(label) => write!(
                    self.writer,
                    "   {slevel}: {span}: {label}\n",
                    slevel = aspan.level(),
                    span = aspan.span(),
                ),
                None => write!(self.writer, "   at {span}\n", span = aspan.span()),
            };
        }
    }

    fn error_count(&self) -> usize {
        self.error_count
    }
}

/// A diagnostic captured by [`CollectingReporter`].
///
/// The originating value is flattened into its rendered message,
///   code,
///   severity,
///   and spans,
///     since diagnostics of many different types flow through a single
///     sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Captured {
    pub level: Level,
    pub code: u16,
    pub message: String,
    pub spans: Vec<Span>,
}

/// Accumulate diagnostics for programmatic inspection.
///
/// This is the sink of choice for tests and for callers
///   (such as IDE integrations)
///   that want structured access to everything the linker had to say
///   rather than rendered text.
#[derive(Debug, Default)]
pub struct CollectingReporter {
    captured: Vec<Captured>,
    error_count: usize,
}

impl CollectingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn diagnostics(&self) -> &[Captured] {
        &self.captured
    }

    /// Codes of every captured diagnostic, in report order.
    pub fn codes(&self) -> Vec<u16> {
        self.captured.iter().map(|c| c.code).collect()
    }

    /// Captured diagnostics matching the given code.
    pub fn with_code(&self, code: u16) -> Vec<&Captured> {
        self.captured.iter().filter(|c| c.code == code).collect()
    }
}

impl Reporter for CollectingReporter {
    fn report(&mut self, diagnostic: &impl Diagnostic) {
        let level = diagnostic.severity();

        if level.is_error() {
            self.error_count += 1;
        }

        self.captured.push(Captured {
            level,
            code: diagnostic.code(),
            message: diagnostic.to_string(),
            spans: diagnostic.describe().iter().map(|a| a.span()).collect(),
        });
    }

    fn error_count(&self) -> usize {
        self.error_count
    }
}
