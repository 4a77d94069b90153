// Source spans
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

//! Mapping to source input locations.
//!
//! A [`Span`] is a mapping to a line within a source file,
//!   representing primarily where some linked entity originated.
//! This underpins the diagnostic system,
//!   giving the user specific locations for debugging errors in their
//!   authoring.
//!
//! A span contains a [`Context`] representing the source file.
//! A context's path is an interned [`SymbolId`],
//!   _not_ a [`PathBuf`](std::path::PathBuf),
//!   so that spans are freely copyable:
//!
//! ```
//! use pkgld::span::{Context, Span};
//! use pkgld::sym::GlobalSymbolIntern;
//!
//! let ctx: Context = "some/path/product.pkgs".intern().into();
//! let span = Span::new(ctx, 20);
//!
//! assert_eq!(Some(ctx), span.context());
//! assert_eq!(20, span.line());
//!
//! // Freely copyable
//! let cp = span;
//! assert_eq!(cp, span);
//! ```
//!
//! Since compiled sections reach the linker long after their sources were
//!   read,
//!     spans are carried on every row and reference rather than resolved
//!     on demand.
//! Entities synthesized by the linker itself
//!   (such as flattened group edges)
//!   use [`UNKNOWN_SPAN`].
//!
//! The original toolchain recorded only a file and line for each
//!   diagnostic,
//!     so spans do not track byte offsets;
//!       the upstream compiler is free to point the line at whatever it
//!       considers most useful for the row.

use crate::global::SourceLineSize;
use crate::sym::{GlobalSymbolResolve, SymbolId};
use std::fmt::{self, Display};

/// A source location with no context.
///
/// This is used for entities synthesized during linking,
///   or rows for which the upstream compiler provided no location.
pub const UNKNOWN_SPAN: Span = Span { ctx: None, line: 0 };

/// Source file providing a [`Span`].
///
/// The path is an interned string rather than a filesystem path,
///   both for cheap copying and because the file may not exist on the
///   linking host at all
///     (sections may have been compiled elsewhere).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Context(SymbolId);

impl Context {
    pub fn path(&self) -> SymbolId {
        self.0
    }
}

impl From<SymbolId> for Context {
    fn from(sym: SymbolId) -> Self {
        Self(sym)
    }
}

impl Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        Display::fmt(self.0.lookup_str(), f)
    }
}

/// A line within a source file.
///
/// Spans are intended to be meaningfully identifiable and copyable
///   without interning,
///     and so this is a small, [`Copy`] value.
/// If a span has no [`Context`],
///   it represents an unknown or synthesized location
///   (see [`UNKNOWN_SPAN`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Span {
    ctx: Option<Context>,
    line: SourceLineSize,
}

impl Span {
    pub fn new<C: Into<Context>>(ctx: C, line: SourceLineSize) -> Self {
        Self {
            ctx: Some(ctx.into()),
            line,
        }
    }

    pub fn context(&self) -> Option<Context> {
        self.ctx
    }

    pub fn line(&self) -> SourceLineSize {
        self.line
    }
}

// Spans are small and `Copy`;
//   this lets borrowed spans flow into annotations without explicit
//   dereferencing at every call site.
impl From<&Span> for Span {
    fn from(span: &Span) -> Self {
        *span
    }
}

impl Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.ctx {
            Some(ctx) => write!(f, "{}:{}", ctx, self.line),
            None => write!(f, "<unknown location>"),
        }
    }
}
