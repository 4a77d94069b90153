// Deferred duplicate symbol reporting
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

//! Deferred duplicate symbol reporting
//!   (stage three of linking).
//!
//! Duplicate definitions discovered while building the symbol table are
//!   not reported at discovery time because most of them never matter:
//!     a section that defines a colliding symbol but is never reached
//!     from the entry section contributes nothing to the output.
//! This stage revisits the possibly-conflicting set after reachability
//!   is known and reports only the collisions where the authoritative
//!   definition _and_ at least one competing definition both live in
//!   resolved sections.
//!
//! Tables that allow duplicate rows by design
//!   (see [`TableKind::allows_duplicates`])
//!   never reach this stage;
//!     their collisions were never recorded as conflicts.

use super::resolve::Resolution;
use super::symtab::{SymbolKey, SymbolTableBuild};
use crate::diagnose::{Annotate, AnnotatedSpan, Diagnostic, Reporter};
use crate::section::TableKind;
use crate::span::Span;
use crate::sym::SymbolId;
use std::error::Error;
use std::fmt::{self, Display};

/// A symbol with multiple live definitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateSymbol {
    pub table: TableKind,
    pub name: SymbolId,

    /// Span of the definition the table builder kept.
    pub primary: Span,

    /// Spans of the competing definitions in resolved sections.
    pub duplicates: Vec<Span>,
}

impl Display for DuplicateSymbol {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "duplicate definition of {} symbol `{}`",
            self.table, self.name,
        )
    }
}

impl Error for DuplicateSymbol {}

impl Diagnostic for DuplicateSymbol {
    fn code(&self) -> u16 {
        120
    }

    fn describe(&self) -> Vec<AnnotatedSpan> {
        let mut spans = vec![self.primary.error("first defined here")];
        spans.extend(
            self.duplicates.iter().map(|s| s.note("duplicated here")),
        );
        spans
    }
}

/// Report each conflict whose definitions survived resolution.
///
/// Conflicts are visited in discovery order so that report output is
///   deterministic for a given store.
pub fn report_conflicts<R: Reporter>(
    build: &SymbolTableBuild,
    resolution: &Resolution,
    reporter: &mut R,
) {
    for &key in &build.conflicts {
        // Legal overrides, not conflicts.
        if key.0.allows_duplicates() {
            continue;
        }

        if let Some(dup) = live_conflict(build, resolution, key) {
            reporter.report(&dup);
        }
    }
}

fn live_conflict(
    build: &SymbolTableBuild,
    resolution: &Resolution,
    (table, name): SymbolKey,
) -> Option<DuplicateSymbol> {
    let entry = build.table.get(table, name)?;

    if !resolution.is_resolved(entry.authoritative.section) {
        return None;
    }

    let duplicates: Vec<Span> = entry
        .conflicting
        .iter()
        .filter(|sym| resolution.is_resolved(sym.section))
        .map(|sym| sym.span)
        .collect();

    if duplicates.is_empty() {
        return None;
    }

    Some(DuplicateSymbol {
        table,
        name,
        primary: entry.authoritative.span,
        duplicates,
    })
}
