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

//! End-to-end linking over multi-section stores.

use pkgld::diagnose::{CollectingReporter, Reporter};
use pkgld::ld::{flatten, link};
use pkgld::section::{
    Access, ComplexRef, EntityKind, OutputKind, Row, Section, SectionKind,
    SectionStore, TableKind,
};
use pkgld::span::{Span, UNKNOWN_SPAN};
use pkgld::sym::GlobalSymbolIntern;

#[test]
fn bundle_chain_scheduling_end_to_end() {
    let p1 = "P1".intern();
    let r1 = "R1".intern();

    let mut entry = Section::new(
        "bundle".intern(),
        SectionKind::Bundle,
        Span::new("bundle.pkgs".intern(), 1),
    );

    entry.table_mut(TableKind::BundlePackage).push(Row::new(
        p1,
        Access::Public,
        Span::new("bundle.pkgs".intern(), 10),
    ));

    // Authored, but never placed into the chain group.
    entry.table_mut(TableKind::RollbackBoundary).push(Row::new(
        r1,
        Access::Public,
        Span::new("bundle.pkgs".intern(), 20),
    ));

    entry.add_complex_ref(ComplexRef {
        parent_kind: EntityKind::PackageGroup,
        parent: flatten::chain_group(),
        child_kind: EntityKind::Package,
        child: p1,
        primary: true,
        span: Span::new("bundle.pkgs".intern(), 11),
    });

    let mut store = SectionStore::new();
    store.add(entry);

    let mut reporter = CollectingReporter::new();
    let output = link(&mut store, OutputKind::Bundle, &mut reporter)
        .expect("link must succeed");

    // Exactly one diagnostic: the unscheduled rollback boundary.
    assert_eq!(vec![133], reporter.codes());
    assert_eq!(1, reporter.error_count());

    let bundle = output.bundle.expect("bundle refs must be present");
    assert!(bundle.is_scheduled(p1));
    assert!(!bundle.is_scheduled(r1));
}

#[test]
fn unreferenced_conflicts_stay_silent_until_reached() {
    let shared = "shared".intern();
    let used = "used".intern();

    let mut store = SectionStore::new();

    let mut pkg = Section::new(
        "pkg".intern(),
        SectionKind::Package,
        UNKNOWN_SPAN,
    );
    pkg.add_ref(TableKind::Component, used, UNKNOWN_SPAN);
    store.add(pkg);

    // Both define the same Public component with differing content,
    // but only section `a` is reachable.
    let mut a = Section::new(
        "a".intern(),
        SectionKind::Fragment,
        UNKNOWN_SPAN,
    );
    a.table_mut(TableKind::Component).push(Row::new(
        used,
        Access::Public,
        UNKNOWN_SPAN,
    ));
    a.table_mut(TableKind::Component).push(Row::new(
        shared,
        Access::Public,
        Span::new("a.pkgs".intern(), 5),
    ));
    store.add(a);

    let mut b = Section::new(
        "b".intern(),
        SectionKind::Fragment,
        UNKNOWN_SPAN,
    );
    b.table_mut(TableKind::Component).push(Row::new(
        shared,
        Access::Public,
        Span::new("b.pkgs".intern(), 5),
    ));
    store.add(b);

    let mut reporter = CollectingReporter::new();
    link(&mut store, OutputKind::Package, &mut reporter)
        .expect("link must succeed");

    assert!(reporter.codes().is_empty());
}

#[test]
fn conflict_surfaces_once_both_sections_are_reached() {
    let shared = "shared".intern();
    let x = "x".intern();
    let y = "y".intern();

    let mut store = SectionStore::new();

    let mut pkg = Section::new(
        "pkg".intern(),
        SectionKind::Package,
        UNKNOWN_SPAN,
    );
    pkg.add_ref(TableKind::Component, x, UNKNOWN_SPAN);
    pkg.add_ref(TableKind::Component, y, UNKNOWN_SPAN);
    store.add(pkg);

    let mut a = Section::new(
        "a".intern(),
        SectionKind::Fragment,
        UNKNOWN_SPAN,
    );
    a.table_mut(TableKind::Component).push(Row::new(
        x,
        Access::Public,
        UNKNOWN_SPAN,
    ));
    a.table_mut(TableKind::Component).push(Row::new(
        shared,
        Access::Public,
        Span::new("a.pkgs".intern(), 5),
    ));
    store.add(a);

    let mut b = Section::new(
        "b".intern(),
        SectionKind::Fragment,
        UNKNOWN_SPAN,
    );
    b.table_mut(TableKind::Component).push(Row::new(
        y,
        Access::Public,
        UNKNOWN_SPAN,
    ));
    b.table_mut(TableKind::Component).push(Row::new(
        shared,
        Access::Public,
        Span::new("b.pkgs".intern(), 5),
    ));
    store.add(b);

    let mut reporter = CollectingReporter::new();
    link(&mut store, OutputKind::Package, &mut reporter)
        .expect("link must succeed");

    assert_eq!(vec![120], reporter.codes());
}

#[test]
fn library_visibility_respected_across_sections() {
    let internal = "internal".intern();
    let lib = "corelib".intern();

    let mut store = SectionStore::new();

    let mut pkg = Section::new(
        "pkg".intern(),
        SectionKind::Package,
        Span::new("pkg.pkgs".intern(), 1),
    );
    pkg.add_ref(TableKind::Component, internal, UNKNOWN_SPAN);
    store.add(pkg);

    // Same symbol name, but the referencing section is not part of the
    // library, so the reference is denied.
    let mut a = Section::new(
        "a".intern(),
        SectionKind::Fragment,
        Span::new("a.pkgs".intern(), 1),
    )
    .with_library(lib);
    a.table_mut(TableKind::Component).push(Row::new(
        internal,
        Access::Internal,
        Span::new("a.pkgs".intern(), 5),
    ));
    store.add(a);

    let mut reporter = CollectingReporter::new();
    link(&mut store, OutputKind::Package, &mut reporter)
        .expect("link must succeed");

    assert_eq!(vec![111], reporter.codes());
    assert!(reporter.has_errors());
}

#[test]
fn nested_bundle_groups_flatten_end_to_end() {
    let p1 = "P1".intern();
    let sub = "WebComponents".intern();

    let mut entry = Section::new(
        "bundle".intern(),
        SectionKind::Bundle,
        UNKNOWN_SPAN,
    );

    entry.table_mut(TableKind::BundlePackage).push(Row::new(
        p1,
        Access::Public,
        UNKNOWN_SPAN,
    ));

    // Chain -> WebComponents -> P1.
    entry.add_complex_ref(ComplexRef {
        parent_kind: EntityKind::PackageGroup,
        parent: flatten::chain_group(),
        child_kind: EntityKind::PackageGroup,
        child: sub,
        primary: false,
        span: UNKNOWN_SPAN,
    });
    entry.add_complex_ref(ComplexRef {
        parent_kind: EntityKind::PackageGroup,
        parent: sub,
        child_kind: EntityKind::Package,
        child: p1,
        primary: true,
        span: UNKNOWN_SPAN,
    });

    let mut store = SectionStore::new();
    store.add(entry);

    let mut reporter = CollectingReporter::new();
    let output = link(&mut store, OutputKind::Bundle, &mut reporter)
        .expect("link must succeed");

    assert!(reporter.codes().is_empty());

    let bundle = output.bundle.expect("bundle refs must be present");
    assert!(bundle.is_scheduled(p1));

    // The intermediate group is gone and the primary flag survived the
    // collapse.
    assert_eq!(1, bundle.edges.len());
    assert!(bundle.edges[0].primary);
    assert_eq!(p1, bundle.edges[0].child);
}
