// Linker pipeline
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

//! Link compiled sections into a single output.
//!
//! Linking runs four stages in sequence over a [`SectionStore`]:
//!
//!  1. [`symtab`] scans every section into a global symbol table,
//!       selecting the entry section and classifying duplicate
//!       definitions;
//!  2. [`resolve`] walks references from the entry section,
//!       producing the reachable section set and dependency graph;
//!  3. [`conflict`] reports the duplicate definitions whose sections
//!       both turned out to be reachable;
//!  4. [`flatten`] (bundle outputs only) collapses nested grouping
//!       edges and validates the bundle's containment structure.
//!
//! All stages run to completion regardless of recoverable problems,
//!   recording them through the caller's [`Reporter`];
//!     the caller decides afterward whether the error count warrants
//!     discarding the output.
//! Only structural impossibilities
//!   (no entry section at all;
//!     a bundle entry with no package table)
//!   abort with [`LinkError`].

use crate::diagnose::Reporter;
use crate::section::{
    OutputKind, SectionId, SectionKind, SectionStore, TableKind,
};
use crate::span::Span;
use crate::sym::SymbolId;
use std::error::Error;
use std::fmt::{self, Display};

pub mod conflict;
pub mod flatten;
pub mod resolve;
pub mod symtab;

use flatten::BundleRefs;
use resolve::Resolution;
use symtab::SymbolTable;

/// Immutable result of a completed link.
#[derive(Debug)]
pub struct LinkedOutput {
    /// The section linking started from.
    pub entry: SectionId,

    /// Global symbol table.
    pub symbols: SymbolTable,

    /// Reachable sections, referenced symbols, and the section
    ///   dependency graph.
    pub resolution: Resolution,

    /// Flattened bundle relationships,
    ///   present only for [`OutputKind::Bundle`].
    pub bundle: Option<BundleRefs>,
}

/// Conditions under which no output can be produced at all.
///
/// Everything else the linker encounters is recorded through the
///   [`Reporter`] and linking continues.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkError {
    /// No section in the store can serve as the entry section.
    MissingEntrySection,

    /// The entry section lacks a table the output kind requires.
    MissingEntryTable {
        name: SymbolId,
        kind: SectionKind,
        table: TableKind,
        span: Span,
    },
}

impl Display for LinkError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::MissingEntrySection => {
                write!(f, "no entry section found in input")
            }

            Self::MissingEntryTable {
                name,
                kind,
                table,
                ..
            } => write!(
                f,
                "{} entry section `{}` has no {} table",
                kind, name, table,
            ),
        }
    }
}

impl Error for LinkError {}

/// Link the store into a single output of the given kind.
pub fn link<R: Reporter>(
    store: &mut SectionStore,
    output: OutputKind,
    reporter: &mut R,
) -> Result<LinkedOutput, LinkError> {
    let build = symtab::build(store, output, reporter);
    let entry = build.entry.ok_or(LinkError::MissingEntrySection)?;

    if output == OutputKind::Bundle {
        let section = store.get(entry);

        let has_packages = section
            .tables()
            .iter()
            .any(|t| t.kind() == TableKind::BundlePackage);

        if !has_packages {
            return Err(LinkError::MissingEntryTable {
                name: section.name(),
                kind: section.kind(),
                table: TableKind::BundlePackage,
                span: section.span(),
            });
        }
    }

    let resolution =
        resolve::resolve(store, &build.table, entry, output, reporter);

    conflict::report_conflicts(&build, &resolution, reporter);

    let bundle = (output == OutputKind::Bundle)
        .then(|| flatten::flatten(store, &resolution, reporter));

    Ok(LinkedOutput {
        entry,
        symbols: build.table,
        resolution,
        bundle,
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::diagnose::CollectingReporter;
    use crate::section::{Access, Row, Section};
    use crate::span::UNKNOWN_SPAN;
    use crate::sym::GlobalSymbolIntern;

    #[test]
    fn empty_store_has_no_entry() {
        let mut store = SectionStore::new();
        let mut reporter = CollectingReporter::new();

        assert_eq!(
            Err(LinkError::MissingEntrySection),
            link(&mut store, OutputKind::Package, &mut reporter)
                .map(|_| ()),
        );
    }

    #[test]
    fn fragments_alone_cannot_be_linked() {
        let mut store = SectionStore::new();
        store.add(Section::new(
            "frag".intern(),
            SectionKind::Fragment,
            UNKNOWN_SPAN,
        ));

        let mut reporter = CollectingReporter::new();

        assert_eq!(
            Err(LinkError::MissingEntrySection),
            link(&mut store, OutputKind::Package, &mut reporter)
                .map(|_| ()),
        );
    }

    #[test]
    fn bundle_entry_without_packages_is_fatal() {
        let mut store = SectionStore::new();
        store.add(Section::new(
            "bundle".intern(),
            SectionKind::Bundle,
            UNKNOWN_SPAN,
        ));

        let mut reporter = CollectingReporter::new();

        match link(&mut store, OutputKind::Bundle, &mut reporter) {
            Err(LinkError::MissingEntryTable { table, .. }) => {
                assert_eq!(TableKind::BundlePackage, table);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn package_link_produces_no_bundle_refs() {
        let mut store = SectionStore::new();
        store.add(Section::new(
            "pkg".intern(),
            SectionKind::Package,
            UNKNOWN_SPAN,
        ));

        let mut reporter = CollectingReporter::new();

        let output = link(&mut store, OutputKind::Package, &mut reporter)
            .expect("link must succeed");

        assert!(output.bundle.is_none());
        assert!(output.resolution.is_resolved(output.entry));
    }

    #[test]
    fn bundle_link_produces_bundle_refs() {
        let mut store = SectionStore::new();

        let mut entry = Section::new(
            "bundle".intern(),
            SectionKind::Bundle,
            UNKNOWN_SPAN,
        );
        let p1 = "P1".intern();
        entry.table_mut(TableKind::BundlePackage).push(Row::new(
            p1,
            Access::Public,
            UNKNOWN_SPAN,
        ));
        entry.add_complex_ref(crate::section::ComplexRef {
            parent_kind: crate::section::EntityKind::PackageGroup,
            parent: flatten::chain_group(),
            child_kind: crate::section::EntityKind::Package,
            child: p1,
            primary: false,
            span: UNKNOWN_SPAN,
        });
        store.add(entry);

        let mut reporter = CollectingReporter::new();

        let output = link(&mut store, OutputKind::Bundle, &mut reporter)
            .expect("link must succeed");

        assert!(reporter.codes().is_empty());

        let bundle = output.bundle.expect("bundle refs must be present");
        assert!(bundle.is_scheduled(p1));
    }
}
