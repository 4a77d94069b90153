// Diagnostic system
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

//! Diagnostic system for error reporting.
//!
//! Linking is expected to surface _every_ detectable problem in a single
//!   run rather than stopping at the first,
//!     so diagnostics are values that flow through an injected
//!     [`Reporter`](report::Reporter) sink instead of values that abort
//!     the stage.
//! The caller inspects the sink after linking completes and fails the
//!   overall build if any [`Level::Error`]-or-worse diagnostic was
//!   recorded.
//!
//! Each diagnostic carries a severity [`Level`],
//!   a stable numeric identifier
//!     (see [`Diagnostic::code`];
//!       these must never be renumbered once released since build systems
//!       key suppressions off of them),
//!   and a series of [`AnnotatedSpan`]s describing the source locations
//!   that contribute to the event.

pub mod report;

pub use report::{CollectingReporter, Reporter, VisualReporter};

use crate::span::Span;
use std::borrow::Cow;
use std::error::Error;
use std::fmt::{self, Display};

/// Diagnostic report.
///
/// This describes an error condition or other special event using a
///   series of [`Span`]s to describe the source, cause, and circumstances
///   around an event.
pub trait Diagnostic: Error + Sized {
    /// Stable numeric identifier for this diagnostic.
    ///
    /// Identifiers are unique per message meaning,
    ///   not per message site,
    ///   and are never reused once published.
    fn code(&self) -> u16;

    /// Severity of this diagnostic as a whole.
    fn severity(&self) -> Level {
        Level::Error
    }

    /// Produce a series of [`AnnotatedSpan`]s describing the source and
    ///   circumstances of the diagnostic event.
    fn describe(&self) -> Vec<AnnotatedSpan>;
}

/// Diagnostic severity level.
///
/// Levels are used both for entire reports and for styling of individual
///   [`AnnotatedSpan`]s.
///
/// Lower levels are more severe
///   (e.g. level 1 is the worst).
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Default)]
#[repr(u8)]
pub enum Level {
    /// An error internal to the linker that the user cannot resolve,
    ///   but may be able to work around.
    InternalError = 1,

    /// A user-resolvable error.
    ///
    /// These represent errors resulting from the user's authoring.
    /// Any diagnostic at this level or worse causes the overall build to
    ///   fail once linking has run to completion.
    #[default]
    Error,

    /// A suspect condition that does not prevent producing output.
    ///
    /// The output is well-defined,
    ///   but possibly not what the user intended.
    Warning,

    /// Useful information that supplements other messages.
    ///
    /// This is most often used when multiple spans are in play for a
    ///   given diagnostic report,
    ///     such as pointing at the first of a set of duplicate
    ///     definitions.
    Note,

    /// Additional advice to the user that may help in debugging or fixing
    ///   a problem.
    Help,
}

impl Level {
    /// Whether this level represents a build-failing condition.
    pub fn is_error(self) -> bool {
        self <= Level::Error
    }
}

impl Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Level::InternalError => write!(f, "internal error"),
            Level::Error => write!(f, "error"),
            Level::Warning => write!(f, "warning"),
            Level::Note => write!(f, "note"),
            Level::Help => write!(f, "help"),
        }
    }
}

/// A label associated with a report or [`Span`].
///
/// See [`AnnotatedSpan`].
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Label(Cow<'static, str>);

impl Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl From<String> for Label {
    fn from(s: String) -> Self {
        Self(Cow::Owned(s))
    }
}

impl From<&'static str> for Label {
    fn from(s: &'static str) -> Self {
        Self(Cow::Borrowed(s))
    }
}

/// A span with an associated severity level and optional label.
///
/// Annotated spans are intended to guide users through debugging a
///   diagnostic message by describing important source locations that
///   contribute to a given diagnostic event.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct AnnotatedSpan(Span, Level, Option<Label>);

impl AnnotatedSpan {
    pub fn span(&self) -> Span {
        self.0
    }

    pub fn level(&self) -> Level {
        self.1
    }

    pub fn label(&self) -> Option<&Label> {
        self.2.as_ref()
    }
}

impl From<AnnotatedSpan> for Vec<AnnotatedSpan> {
    fn from(x: AnnotatedSpan) -> Self {
        vec![x]
    }
}

/// Convenience methods for annotating a [`Span`] in the construction of a
///   [`Diagnostic`] description.
pub trait Annotate: Sized {
    /// Annotate a [`Span`] with a severity [`Level`] and an optional
    ///   [`Label`] to display alongside of it.
    ///
    /// You may wish to use one of the more specific methods that provide
    ///   a more pleasant interface.
    fn annotate(self, level: Level, label: Option<Label>) -> AnnotatedSpan;

    /// Annotate a span with a clarifying label styled as an error.
    ///
    /// If the label does not include additional _useful_ information over
    ///   the generic message,
    ///     then it may be omitted in favor of [`Annotate::mark_error`] to
    ///     simply mark the location of the error.
    ///
    /// (This is not named `err` since it does not return an [`Err`].)
    fn error<L: Into<Label>>(self, label: L) -> AnnotatedSpan {
        self.annotate(Level::Error, Some(label.into()))
    }

    /// Like [`Annotate::error`],
    ///   but only styles the span as a [`Level::Error`] without attaching
    ///   a label.
    fn mark_error(self) -> AnnotatedSpan {
        self.annotate(Level::Error, None)
    }

    /// Annotate a span with a clarifying label styled as a warning.
    fn warning<L: Into<Label>>(self, label: L) -> AnnotatedSpan {
        self.annotate(Level::Warning, Some(label.into()))
    }

    /// Supplemental annotated span providing additional context for
    ///   another span.
    ///
    /// For example,
    ///   if an error is related to a conflict with how a symbol is
    ///     defined,
    ///       then a note span may indicate the location of the other
    ///       definition.
    fn note<L: Into<Label>>(self, label: L) -> AnnotatedSpan {
        self.annotate(Level::Note, Some(label.into()))
    }

    /// Provide additional information that may be used to help the user
    ///   in debugging or fixing a diagnostic.
    fn help<L: Into<Label>>(self, label: L) -> AnnotatedSpan {
        self.annotate(Level::Help, Some(label.into()))
    }
}

impl<S: Into<Span>> Annotate for S {
    fn annotate(self, level: Level, label: Option<Label>) -> AnnotatedSpan {
        AnnotatedSpan(self.into(), level, label)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::span::UNKNOWN_SPAN;

    #[test]
    fn level_error_ordering() {
        assert!(Level::InternalError.is_error());
        assert!(Level::Error.is_error());
        assert!(!Level::Warning.is_error());
        assert!(!Level::Note.is_error());
        assert!(!Level::Help.is_error());
    }

    #[test]
    fn annotate_span_levels() {
        let err = UNKNOWN_SPAN.error("bad");
        assert_eq!(Level::Error, err.level());
        assert_eq!("bad", format!("{}", err.label().unwrap()));

        let note = UNKNOWN_SPAN.note("see here");
        assert_eq!(Level::Note, note.level());

        let marked = UNKNOWN_SPAN.mark_error();
        assert_eq!(None, marked.label());
    }
}
