// Reference resolution and reachability
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

//! Reference resolution and reachability
//!   (stage two of linking).
//!
//! Starting at the entry section,
//!   this stage performs a depth-first walk over every
//!   [`SimpleRef`](crate::section::SimpleRef) of every section it
//!   reaches,
//!     resolving each against the global symbol table under the
//!     visibility rules of [`Access`].
//! The walk is cycle-safe:
//!   each section carries a visited marker
//!     (a bit in the resolved set)
//!   and is never re-entered,
//!     even when reached by multiple paths.
//!
//! A failed reference is fatal only to that reference;
//!   the walk continues so that one run reports every resolution problem
//!   the store contains.
//! Sections that are never reached are never walked,
//!   and so their references
//!     (dangling or otherwise)
//!   produce no diagnostics at all.
//!
//! Alongside the resolved set this stage records the section dependency
//!   graph it discovered,
//!     which downstream consumers
//!       (emission ordering, visualization)
//!     take as part of the immutable link snapshot.

use super::symtab::{Symbol, SymbolKey, SymbolTable};
use crate::diagnose::{Annotate, AnnotatedSpan, Diagnostic, Reporter};
use crate::section::{
    Access, OutputKind, Section, SectionId, SectionStore, TableKind,
};
use crate::span::Span;
use crate::sym::SymbolId;
use fixedbitset::FixedBitSet;
use fxhash::FxHashSet;
use petgraph::graph::{DiGraph, NodeIndex};
use std::error::Error;
use std::fmt::{self, Display};

/// Sections and symbols reachable from the entry section.
#[derive(Debug)]
pub struct Resolution {
    /// Visited marker per section,
    ///   indexed by [`SectionId`].
    resolved: FixedBitSet,

    /// Symbols that at least one resolved reference names.
    referenced: FxHashSet<SymbolKey>,

    /// The discovered section dependency graph.
    ///
    /// Node indexes correspond to [`SectionId`] indexes;
    ///   an edge `a → b` means a reference in `a` resolved to a symbol
    ///   owned by `b`.
    graph: DiGraph<SectionId, ()>,
}

impl Resolution {
    /// Whether the given section is reachable from the entry section.
    pub fn is_resolved(&self, id: SectionId) -> bool {
        self.resolved.contains(id.as_usize())
    }

    /// Sections reachable from the entry section,
    ///   in id order.
    pub fn resolved_sections(&self) -> impl Iterator<Item = SectionId> + '_ {
        self.graph
            .node_indices()
            .filter(|ix| self.resolved.contains(ix.index()))
            .map(|ix| self.graph[ix])
    }

    /// Whether the given symbol was the target of a resolved reference.
    pub fn is_referenced(&self, table: TableKind, name: SymbolId) -> bool {
        self.referenced.contains(&(table, name))
    }

    pub fn referenced_symbols(&self) -> impl Iterator<Item = SymbolKey> + '_ {
        self.referenced.iter().copied()
    }

    pub fn graph(&self) -> &DiGraph<SectionId, ()> {
        &self.graph
    }
}

/// A reference that could not be resolved to exactly one symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefError {
    /// The name is not defined anywhere in the store.
    Unresolved {
        table: TableKind,
        name: SymbolId,
        span: Span,
    },

    /// The name is defined,
    ///   but no definition is visible from the referencing section.
    Inaccessible {
        table: TableKind,
        name: SymbolId,
        access: Access,
        span: Span,
        def_span: Span,
    },

    /// More than one visible definition satisfies the reference.
    AmbiguousRef {
        table: TableKind,
        name: SymbolId,
        span: Span,
        primary: Span,
        extra: Vec<Span>,
    },
}

impl Display for RefError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Unresolved { table, name, .. } => {
                write!(f, "unresolved reference to {} symbol `{}`", table, name)
            }

            Self::Inaccessible {
                table,
                name,
                access,
                ..
            } => write!(
                f,
                "{} symbol `{}` exists but its {} access level \
                 forbids this reference",
                table, name, access,
            ),

            Self::AmbiguousRef { table, name, .. } => write!(
                f,
                "reference to {} symbol `{}` matches multiple definitions",
                table, name,
            ),
        }
    }
}

impl Error for RefError {}

impl Diagnostic for RefError {
    fn code(&self) -> u16 {
        match self {
            Self::Unresolved { .. } => 110,
            Self::Inaccessible { .. } => 111,
            Self::AmbiguousRef { .. } => 112,
        }
    }

    fn describe(&self) -> Vec<AnnotatedSpan> {
        match self {
            Self::Unresolved { span, .. } => {
                span.error("nothing defines this name").into()
            }

            Self::Inaccessible {
                span,
                access,
                def_span,
                ..
            } => vec![
                span.error(format!("this reference is blocked ({})", access)),
                def_span.note("definition is here"),
            ],

            Self::AmbiguousRef {
                span,
                primary,
                extra,
                ..
            } => {
                let mut spans = vec![
                    span.mark_error(),
                    primary.note("resolves here first"),
                ];
                spans.extend(
                    extra.iter().map(|s| s.note("and also resolves here")),
                );
                spans
            }
        }
    }
}

/// Whether `sym` is visible from the referencing section `from`.
///
/// [`Access::Private`] and the section-local levels compare section
///   _identity_,
///     whereas [`Access::Protected`] compares the source file the
///     sections were compiled from:
///       two sections from one file see each other's protected symbols
///       but not each other's private ones.
/// [`Access::Internal`] extends section identity to sections sharing a
///   named library,
///     which is a property of the owning section and so requires the
///     store to look up.
fn visible(
    store: &SectionStore,
    sym: &Symbol,
    from_id: SectionId,
    from: &Section,
) -> bool {
    match sym.access {
        Access::Public => true,

        Access::Internal => {
            sym.section == from_id
                || matches!(
                    (store.get(sym.section).library(), from.library()),
                    (Some(a), Some(b)) if a == b
                )
        }

        Access::Protected => match (sym.span.context(), from.span().context())
        {
            (Some(a), Some(b)) => a == b,
            _ => sym.section == from_id,
        },

        Access::Private | Access::Global | Access::Virtual => {
            sym.section == from_id
        }
    }
}

/// Walk the store from `entry`,
///   resolving references and collecting the reachable sections.
pub fn resolve<R: Reporter>(
    store: &SectionStore,
    symtab: &SymbolTable,
    entry: SectionId,
    output: OutputKind,
    reporter: &mut R,
) -> Resolution {
    let mut resolved = FixedBitSet::with_capacity(store.len());
    let mut referenced = FxHashSet::default();
    let mut graph = DiGraph::with_capacity(store.len(), store.len());

    // One node per section so that node and section indexes coincide.
    for id in store.ids() {
        graph.add_node(id);
    }

    let mut stack = vec![entry];
    resolved.insert(entry.as_usize());

    while let Some(from_id) = stack.pop() {
        let from = store.get(from_id);

        for sref in from.refs() {
            // Media cannot exist in a library output, so references to
            // it are meaningless there and deliberately skipped.
            if output == OutputKind::Library && sref.table == TableKind::Media
            {
                continue;
            }

            let entry_sym = match symtab.get(sref.table, sref.id) {
                Some(e) => e,
                None => {
                    reporter.report(&RefError::Unresolved {
                        table: sref.table,
                        name: sref.id,
                        span: sref.span,
                    });
                    continue;
                }
            };

            let candidates: Vec<&Symbol> =
                std::iter::once(&entry_sym.authoritative)
                    .chain(entry_sym.conflicting.iter())
                    .chain(entry_sym.redundant.iter())
                    .filter(|sym| {
                        visible(store, sym, from_id, from)
                    })
                    .collect();

            let chosen = match candidates.as_slice() {
                [] => {
                    reporter.report(&RefError::Inaccessible {
                        table: sref.table,
                        name: sref.id,
                        access: entry_sym.authoritative.access,
                        span: sref.span,
                        def_span: entry_sym.authoritative.span,
                    });
                    None
                }

                [sym] => Some(**sym),

                // Duplicates in duplicate-tolerant tables are legal
                // overrides; the first candidate wins.
                [first, ..] if sref.table.allows_duplicates() => {
                    Some(**first)
                }

                [first, rest @ ..] => {
                    reporter.report(&RefError::AmbiguousRef {
                        table: sref.table,
                        name: sref.id,
                        span: sref.span,
                        primary: first.span,
                        extra: rest.iter().map(|sym| sym.span).collect(),
                    });
                    None
                }
            };

            if let Some(sym) = chosen {
                referenced.insert((sref.table, sref.id));

                let owner = sym.section;
                graph.add_edge(
                    NodeIndex::new(from_id.as_usize()),
                    NodeIndex::new(owner.as_usize()),
                    (),
                );

                if !resolved.contains(owner.as_usize()) {
                    resolved.insert(owner.as_usize());
                    stack.push(owner);
                }
            }
        }
    }

    Resolution {
        resolved,
        referenced,
        graph,
    }
}
