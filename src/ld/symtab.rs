// Global symbol table construction
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

//! Global symbol table construction
//!   (stage one of linking).
//!
//! This stage scans every section of the store exactly once,
//!   producing:
//!
//!   1. the entry section,
//!        selected as the first entry-capable section encountered
//!        (each subsequent one is a structural error);
//!   2. the global [`SymbolTable`],
//!        mapping each symbol key to its _authoritative_ definition
//!        together with any duplicate definitions; and
//!   3. the conflict set,
//!        the keys that acquired at least one
//!        [possibly-conflicting](SymbolEntry::conflicting) duplicate.
//!
//! Duplicate classification is deliberate about what it does _not_ do:
//!   no conflict error is ever reported here,
//!     because a conflicting definition is only an error if both sides
//!     turn out to be reachable,
//!       and reachability is not known until
//!       [resolution](super::resolve) has run.
//! The only duplicates fully discharged here are _redundant_ ones:
//!   content-identical private rows of a
//!   [collapsible](TableKind::collapsible) table collapse into the
//!   authoritative definition,
//!     with the duplicate row marked so its primary key is excluded from
//!     emission downstream.

use crate::diagnose::{Annotate, AnnotatedSpan, Diagnostic, Level, Reporter};
use crate::section::{
    Access, OutputKind, RowRef, SectionId, SectionKind, SectionStore,
    TableKind,
};
use crate::span::Span;
use crate::sym::SymbolId;
use fxhash::FxHashMap;
use std::error::Error;
use std::fmt::{self, Display};

/// Key of a symbol in the global table.
///
/// Symbol names are only unique within a table's symbol space,
///   so the table kind participates in identity.
pub type SymbolKey = (TableKind, SymbolId);

/// A named, exported entity derived from exactly one row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Symbol {
    pub name: SymbolId,
    pub access: Access,
    pub table: TableKind,
    pub section: SectionId,
    pub row: RowRef,
    pub span: Span,
}

/// A symbol name together with every definition it received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolEntry {
    /// The definition all references resolve to.
    pub authoritative: Symbol,

    /// Content-identical duplicates,
    ///   tolerated and never an error.
    pub redundant: Vec<Symbol>,

    /// Duplicates whose content differs from the authoritative
    ///   definition.
    ///
    /// Whether these are errors is not known until reachability has been
    ///   established;
    ///     see [`ld::conflict`](super::conflict).
    pub conflicting: Vec<Symbol>,
}

/// The global name→symbol table.
#[derive(Debug, Default)]
pub struct SymbolTable {
    map: FxHashMap<SymbolKey, SymbolEntry>,
}

impl SymbolTable {
    pub fn get(&self, table: TableKind, name: SymbolId) -> Option<&SymbolEntry> {
        self.map.get(&(table, name))
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

/// Output of the build pass.
#[derive(Debug)]
pub struct SymbolTableBuild {
    /// The section rooting this link,
    ///   if any entry-capable section was present.
    pub entry: Option<SectionId>,

    pub table: SymbolTable,

    /// Keys with at least one possibly-conflicting duplicate,
    ///   in the order the first duplicate was encountered.
    pub conflicts: Vec<SymbolKey>,
}

/// Structural problems found while scanning sections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StructuralError {
    /// More than one entry-capable section in the store.
    MultipleEntrySections {
        name: SymbolId,
        span: Span,
        first_name: SymbolId,
        first_span: Span,
    },

    /// The entry section's kind does not match the requested output.
    EntryKindMismatch {
        name: SymbolId,
        kind: SectionKind,
        expected: SectionKind,
        span: Span,
    },
}

impl Display for StructuralError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::MultipleEntrySections { name, .. } => {
                write!(f, "multiple entry sections; `{}` is extraneous", name)
            }

            Self::EntryKindMismatch {
                name,
                kind,
                expected,
                ..
            } => write!(
                f,
                "entry section `{}` is a {} but a {} output was requested",
                name, kind, expected,
            ),
        }
    }
}

impl Error for StructuralError {}

impl Diagnostic for StructuralError {
    fn code(&self) -> u16 {
        match self {
            Self::MultipleEntrySections { .. } => 100,
            Self::EntryKindMismatch { .. } => 101,
        }
    }

    fn severity(&self) -> Level {
        match self {
            Self::MultipleEntrySections { .. } => Level::Error,
            Self::EntryKindMismatch { .. } => Level::Warning,
        }
    }

    fn describe(&self) -> Vec<AnnotatedSpan> {
        match self {
            Self::MultipleEntrySections {
                span,
                first_name,
                first_span,
                ..
            } => vec![
                span.error("this section also claims to root the output"),
                first_span.note(format!(
                    "the output is rooted by `{}`, selected here",
                    first_name,
                )),
            ],

            Self::EntryKindMismatch { span, .. } => {
                span.warning("kind declared here").into()
            }
        }
    }
}

/// How a row's definition relates to an existing authoritative symbol.
enum DupClass {
    Redundant,
    Conflicting,
}

/// Scan the store and build the global symbol table.
///
/// This is the only stage that mutates the store
///   (marking redundant rows);
///     every later stage reads it immutably.
pub fn build<R: Reporter>(
    store: &mut SectionStore,
    output: OutputKind,
    reporter: &mut R,
) -> SymbolTableBuild {
    let mut entry: Option<SectionId> = None;
    let mut table = SymbolTable::default();
    let mut conflicts: Vec<SymbolKey> = Vec::new();
    let mut redundant_rows: Vec<RowRef> = Vec::new();

    for (sid, section) in store.iter() {
        if section.kind().is_entry() {
            match entry {
                None => {
                    entry = Some(sid);

                    if let Some(expected) = output.expected_entry() {
                        if section.kind() != expected {
                            reporter.report(
                                &StructuralError::EntryKindMismatch {
                                    name: section.name(),
                                    kind: section.kind(),
                                    expected,
                                    span: section.span(),
                                },
                            );
                        }
                    }
                }

                Some(first) => {
                    let first_section = store.get(first);
                    reporter.report(&StructuralError::MultipleEntrySections {
                        name: section.name(),
                        span: section.span(),
                        first_name: first_section.name(),
                        first_span: first_section.span(),
                    });
                }
            }
        }

        for (tix, sec_table) in section.tables().iter().enumerate() {
            if !sec_table.kind().produces_symbols() {
                continue;
            }

            for (rix, row) in sec_table.rows().iter().enumerate() {
                let sym = Symbol {
                    name: row.id(),
                    access: row.access(),
                    table: sec_table.kind(),
                    section: sid,
                    row: RowRef {
                        section: sid,
                        table: tix,
                        row: rix,
                    },
                    span: row.span(),
                };

                let key = (sym.table, sym.name);

                match table.map.get_mut(&key) {
                    None => {
                        table.map.insert(
                            key,
                            SymbolEntry {
                                authoritative: sym,
                                redundant: Vec::new(),
                                conflicting: Vec::new(),
                            },
                        );
                    }

                    Some(existing) => {
                        let auth_row = store.row(existing.authoritative.row);

                        let class = if auth_row.content_eq(row)
                            && sym.access == Access::Private
                            && existing.authoritative.access
                                == Access::Private
                            && sym.table.collapsible()
                        {
                            DupClass::Redundant
                        } else {
                            DupClass::Conflicting
                        };

                        match class {
                            DupClass::Redundant => {
                                redundant_rows.push(sym.row);
                                existing.redundant.push(sym);
                            }

                            DupClass::Conflicting => {
                                if existing.conflicting.is_empty() {
                                    conflicts.push(key);
                                }

                                existing.conflicting.push(sym);
                            }
                        }
                    }
                }
            }
        }
    }

    // Deferred so that classification above can read the store
    // immutably.
    for rref in redundant_rows {
        store.row_mut(rref).mark_redundant();
    }

    SymbolTableBuild {
        entry,
        table,
        conflicts,
    }
}
