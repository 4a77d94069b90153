// Complex reference flattening and bundle validation
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

//! Complex reference flattening and bundle validation
//!   (stage four of linking, bundle outputs only).
//!
//! Bundle sources express containment as arbitrarily nested grouping
//!   edges:
//!     a package group may contain another package group,
//!     which contains the actual packages.
//! The downstream binder wants none of that nesting;
//!   it consumes flat parent/child edges whose children are always
//!   concrete entities.
//!
//! Flattening builds a fresh edge set rather than rewriting parent
//!   pointers in place,
//!     so no pass ever iterates a collection it is mutating.
//! Group nesting must form a DAG;
//!   cycles are an authoring defect,
//!     reported up front and their edges withheld from expansion so
//!     that expansion terminates.
//!
//! The flattened edges are then reclassified into the concrete
//!   relationships the binder consumes
//!     (package→container assignment,
//!       install chain membership,
//!       payload ownership)
//!   with each structural invariant checked independently so one run
//!   reports every violation.

use super::resolve::Resolution;
use crate::diagnose::{
    Annotate, AnnotatedSpan, Diagnostic, Level, Reporter,
};
use crate::section::{
    ComplexRef, EntityKind, SectionStore, TableKind,
};
use crate::span::Span;
use crate::sym::{GlobalSymbolIntern, SymbolId};
use fxhash::{FxHashMap, FxHashSet};
use std::error::Error;
use std::fmt::{self, Display};

/// Name of the well-known package group holding the install chain.
///
/// Every bundle package and rollback boundary must be scheduled into
///   this group,
///     directly or through nested groups.
pub fn chain_group() -> SymbolId {
    "Chain".intern()
}

/// Name of the well-known container holding the bootstrapper UI's own
///   payloads.
pub fn ux_container() -> SymbolId {
    "UXContainer".intern()
}

/// Flattened and reclassified bundle relationships.
#[derive(Debug, Default)]
pub struct BundleRefs {
    /// Flat containment edges;
    ///   no edge has a group child.
    pub edges: Vec<ComplexRef>,

    /// Container each package was assigned to.
    pub package_container: FxHashMap<SymbolId, SymbolId>,

    /// Install chain membership,
    ///   in authored order.
    pub chain: Vec<SymbolId>,

    /// Container each payload was assigned to,
    ///   the UX container included.
    pub payload_container: FxHashMap<SymbolId, SymbolId>,
}

impl BundleRefs {
    pub fn is_scheduled(&self, name: SymbolId) -> bool {
        self.chain.contains(&name)
    }
}

/// A structural defect in the bundle's containment relationships.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BundleError {
    /// Group membership nests back into itself.
    GroupCycle {
        members: Vec<(EntityKind, SymbolId, Span)>,
    },

    /// A package was assigned to two different containers.
    PackageInMultipleContainers {
        package: SymbolId,
        first: SymbolId,
        second: SymbolId,
        span: Span,
    },

    /// A bundle package is not a member of the install chain.
    UnscheduledPackage { name: SymbolId, span: Span },

    /// A rollback boundary is not a member of the install chain.
    UnscheduledRollbackBoundary { name: SymbolId, span: Span },

    /// A payload belongs to neither the UX container nor any package,
    ///   layout, or container.
    OrphanedPayload { name: SymbolId, span: Span },

    /// A payload belongs to the UX container _and_ a package or layout.
    PayloadSharedWithUx { name: SymbolId, span: Span },

    /// A payload was assigned a container other than the one it
    ///   authored.
    PayloadContainerMismatch {
        name: SymbolId,
        authored: SymbolId,
        assigned: SymbolId,
        span: Span,
    },

    /// A layout-only payload was also placed in an authored container.
    LayoutPayloadInContainer { name: SymbolId, span: Span },
}

impl Display for BundleError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::GroupCycle { members } => {
                write!(f, "group membership cycle involving ")?;

                for (i, (kind, name, _)) in members.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{} `{}`", kind, name)?;
                }

                Ok(())
            }

            Self::PackageInMultipleContainers {
                package,
                first,
                second,
                ..
            } => write!(
                f,
                "package `{}` is assigned to container `{}` \
                 but already belongs to container `{}`",
                package, second, first,
            ),

            Self::UnscheduledPackage { name, .. } => write!(
                f,
                "package `{}` is not scheduled into the install chain",
                name,
            ),

            Self::UnscheduledRollbackBoundary { name, .. } => write!(
                f,
                "rollback boundary `{}` is not scheduled into the \
                 install chain",
                name,
            ),

            Self::OrphanedPayload { name, .. } => write!(
                f,
                "payload `{}` belongs to no container, package, or layout",
                name,
            ),

            Self::PayloadSharedWithUx { name, .. } => write!(
                f,
                "payload `{}` belongs to both the UX container \
                 and a package or layout",
                name,
            ),

            Self::PayloadContainerMismatch {
                name,
                authored,
                assigned,
                ..
            } => write!(
                f,
                "payload `{}` authored container `{}` \
                 but was assigned to container `{}`",
                name, authored, assigned,
            ),

            Self::LayoutPayloadInContainer { name, .. } => write!(
                f,
                "layout-only payload `{}` is also placed in a container",
                name,
            ),
        }
    }
}

impl Error for BundleError {}

impl Diagnostic for BundleError {
    fn code(&self) -> u16 {
        match self {
            Self::GroupCycle { .. } => 130,
            Self::PackageInMultipleContainers { .. } => 131,
            Self::UnscheduledPackage { .. } => 132,
            Self::UnscheduledRollbackBoundary { .. } => 133,
            Self::OrphanedPayload { .. } => 134,
            Self::PayloadSharedWithUx { .. } => 135,
            Self::PayloadContainerMismatch { .. } => 136,
            Self::LayoutPayloadInContainer { .. } => 137,
        }
    }

    fn severity(&self) -> Level {
        match self {
            Self::PayloadContainerMismatch { .. }
            | Self::LayoutPayloadInContainer { .. } => Level::Warning,
            _ => Level::Error,
        }
    }

    fn describe(&self) -> Vec<AnnotatedSpan> {
        match self {
            Self::GroupCycle { members } => members
                .iter()
                .map(|(_, _, span)| span.mark_error())
                .collect(),

            Self::PackageInMultipleContainers { span, .. }
            | Self::UnscheduledPackage { span, .. }
            | Self::UnscheduledRollbackBoundary { span, .. }
            | Self::OrphanedPayload { span, .. }
            | Self::PayloadSharedWithUx { span, .. } => {
                span.mark_error().into()
            }

            Self::PayloadContainerMismatch { span, .. }
            | Self::LayoutPayloadInContainer { span, .. } => {
                span.warning("declared here").into()
            }
        }
    }
}

/// A group node in the nesting graph.
type GroupKey = (EntityKind, SymbolId);

/// Flatten and reclassify the complex references of every resolved
///   section.
pub fn flatten<R: Reporter>(
    store: &SectionStore,
    resolution: &Resolution,
    reporter: &mut R,
) -> BundleRefs {
    let edges: Vec<ComplexRef> = resolution
        .resolved_sections()
        .flat_map(|id| store.get(id).complex_refs().iter().copied())
        .collect();

    let cyclic = detect_cycles(&edges, reporter);
    let flat = flatten_edges(&edges, &cyclic);

    reclassify(store, resolution, flat, reporter)
}

/// Find group nesting cycles and report each once.
///
/// Returns the set of group→group edges participating in a cycle,
///   which expansion must skip.
fn detect_cycles<R: Reporter>(
    edges: &[ComplexRef],
    reporter: &mut R,
) -> FxHashSet<(GroupKey, GroupKey)> {
    use petgraph::algo::tarjan_scc;
    use petgraph::graph::{DiGraph, NodeIndex};

    let mut graph: DiGraph<GroupKey, ()> = DiGraph::new();
    let mut nodes: FxHashMap<GroupKey, NodeIndex> = FxHashMap::default();
    let mut spans: FxHashMap<GroupKey, Span> = FxHashMap::default();

    let mut node = |graph: &mut DiGraph<GroupKey, ()>, key: GroupKey| {
        *nodes.entry(key).or_insert_with(|| graph.add_node(key))
    };

    for edge in edges {
        if edge.parent_kind.is_group() && edge.child_kind.is_group() {
            let parent = node(&mut graph, (edge.parent_kind, edge.parent));
            let child = node(&mut graph, (edge.child_kind, edge.child));
            graph.add_edge(parent, child, ());

            spans.entry((edge.child_kind, edge.child)).or_insert(edge.span);
            spans.entry((edge.parent_kind, edge.parent)).or_insert(edge.span);
        }
    }

    let mut cyclic = FxHashSet::default();

    for scc in tarjan_scc(&graph) {
        let is_cycle = scc.len() > 1
            || scc
                .first()
                .map(|&ix| graph.find_edge(ix, ix).is_some())
                .unwrap_or(false);

        if !is_cycle {
            continue;
        }

        let keys: FxHashSet<GroupKey> =
            scc.iter().map(|&ix| graph[ix]).collect();

        for edge in edges {
            let pkey = (edge.parent_kind, edge.parent);
            let ckey = (edge.child_kind, edge.child);

            if edge.child_kind.is_group()
                && keys.contains(&pkey)
                && keys.contains(&ckey)
            {
                cyclic.insert((pkey, ckey));
            }
        }

        reporter.report(&BundleError::GroupCycle {
            members: scc
                .iter()
                .map(|&ix| {
                    let (kind, name) = graph[ix];
                    (kind, name, spans[&graph[ix]])
                })
                .collect(),
        });
    }

    cyclic
}

/// Expand group children into their transitive concrete members.
///
/// The result contains no group children;
///   group _parents_ survive only for root groups
///     (groups that are never themselves a member),
///   since any group appearing as a child is consumed by the expansion
///   of the edge that contains it.
fn flatten_edges(
    edges: &[ComplexRef],
    cyclic: &FxHashSet<(GroupKey, GroupKey)>,
) -> Vec<ComplexRef> {
    let mut members: FxHashMap<GroupKey, Vec<&ComplexRef>> =
        FxHashMap::default();
    let mut consumed: FxHashSet<GroupKey> = FxHashSet::default();

    for edge in edges {
        let pkey = (edge.parent_kind, edge.parent);
        let ckey = (edge.child_kind, edge.child);

        if cyclic.contains(&(pkey, ckey)) {
            continue;
        }

        if edge.parent_kind.is_group() {
            members.entry(pkey).or_default().push(edge);
        }

        if edge.child_kind.is_group() {
            consumed.insert(ckey);
        }
    }

    let mut flat = Vec::with_capacity(edges.len());

    for edge in edges {
        let pkey = (edge.parent_kind, edge.parent);
        let ckey = (edge.child_kind, edge.child);

        if cyclic.contains(&(pkey, ckey)) {
            continue;
        }

        // A group that is itself a member is expanded where it appears
        // as a child; its own edges must not also surface at top level.
        if edge.parent_kind.is_group() && consumed.contains(&pkey) {
            continue;
        }

        if edge.child_kind.is_group() {
            expand(&members, cyclic, ckey, *edge, edge.primary, &mut flat);
        } else {
            flat.push(*edge);
        }
    }

    flat
}

/// Recursively replace the group `key` with its concrete members,
///   re-parented to `under`'s parent and OR-ing the primary flag along
///   the collapsed chain.
fn expand(
    members: &FxHashMap<GroupKey, Vec<&ComplexRef>>,
    cyclic: &FxHashSet<(GroupKey, GroupKey)>,
    key: GroupKey,
    under: ComplexRef,
    primary: bool,
    out: &mut Vec<ComplexRef>,
) {
    let group_members = match members.get(&key) {
        Some(m) => m,
        // Empty group: nothing to contribute.
        None => return,
    };

    for member in group_members {
        let ckey = (member.child_kind, member.child);

        if cyclic.contains(&(key, ckey)) {
            continue;
        }

        if member.child_kind.is_group() {
            expand(
                members,
                cyclic,
                ckey,
                under,
                primary || member.primary,
                out,
            );
        } else {
            out.push(ComplexRef {
                parent_kind: under.parent_kind,
                parent: under.parent,
                child_kind: member.child_kind,
                child: member.child,
                primary: primary || member.primary,
                span: member.span,
            });
        }
    }
}

/// Bucket flat edges into container/chain/payload assignments and
///   check each structural invariant.
fn reclassify<R: Reporter>(
    store: &SectionStore,
    resolution: &Resolution,
    flat: Vec<ComplexRef>,
    reporter: &mut R,
) -> BundleRefs {
    let chain = chain_group();
    let ux = ux_container();

    let mut package_container: FxHashMap<SymbolId, SymbolId> =
        FxHashMap::default();
    let mut chain_members: Vec<SymbolId> = Vec::new();
    let mut chain_set: FxHashSet<SymbolId> = FxHashSet::default();
    let mut payload_container: FxHashMap<SymbolId, SymbolId> =
        FxHashMap::default();
    let mut payload_in_ux: FxHashSet<SymbolId> = FxHashSet::default();
    let mut payload_in_pkg: FxHashSet<SymbolId> = FxHashSet::default();

    for edge in &flat {
        match (edge.parent_kind, edge.child_kind) {
            (
                EntityKind::Container,
                EntityKind::Package | EntityKind::ContainerPackage,
            ) => match package_container.get(&edge.child) {
                Some(&first) if first != edge.parent => {
                    reporter.report(
                        &BundleError::PackageInMultipleContainers {
                            package: edge.child,
                            first,
                            second: edge.parent,
                            span: edge.span,
                        },
                    );
                }

                Some(_) => {}

                None => {
                    package_container.insert(edge.child, edge.parent);
                }
            },

            (EntityKind::PackageGroup, EntityKind::Package)
                if edge.parent == chain =>
            {
                if chain_set.insert(edge.child) {
                    chain_members.push(edge.child);
                }
            }

            (EntityKind::Container, EntityKind::Payload) => {
                if edge.parent == ux {
                    payload_in_ux.insert(edge.child);
                } else {
                    payload_container
                        .entry(edge.child)
                        .or_insert(edge.parent);
                }
            }

            (
                EntityKind::Package
                | EntityKind::ContainerPackage
                | EntityKind::Layout,
                EntityKind::Payload,
            ) => {
                payload_in_pkg.insert(edge.child);
            }

            _ => {}
        }
    }

    // Scheduling and payload checks walk the store in section order so
    // that diagnostics come out deterministically.
    for id in resolution.resolved_sections() {
        for table in store.get(id).tables() {
            match table.kind() {
                TableKind::BundlePackage => {
                    for row in table.rows() {
                        if !row.is_redundant()
                            && !chain_set.contains(&row.id())
                        {
                            reporter.report(
                                &BundleError::UnscheduledPackage {
                                    name: row.id(),
                                    span: row.span(),
                                },
                            );
                        }
                    }
                }

                TableKind::RollbackBoundary => {
                    for row in table.rows() {
                        if !row.is_redundant()
                            && !chain_set.contains(&row.id())
                        {
                            reporter.report(
                                &BundleError::UnscheduledRollbackBoundary {
                                    name: row.id(),
                                    span: row.span(),
                                },
                            );
                        }
                    }
                }

                TableKind::Payload => {
                    for row in table.rows() {
                        if row.is_redundant() {
                            continue;
                        }

                        check_payload(
                            row.id(),
                            row.span(),
                            row.field_text(0),
                            row.field_flag(1).unwrap_or(false),
                            &payload_in_ux,
                            &payload_in_pkg,
                            &payload_container,
                            reporter,
                        );
                    }
                }

                _ => {}
            }
        }
    }

    for &payload in &payload_in_ux {
        payload_container.entry(payload).or_insert(ux);
    }

    BundleRefs {
        edges: flat,
        package_container,
        chain: chain_members,
        payload_container,
    }
}

#[allow(clippy::too_many_arguments)]
fn check_payload<R: Reporter>(
    name: SymbolId,
    span: Span,
    authored: Option<SymbolId>,
    layout_only: bool,
    in_ux: &FxHashSet<SymbolId>,
    in_pkg: &FxHashSet<SymbolId>,
    containers: &FxHashMap<SymbolId, SymbolId>,
    reporter: &mut R,
) {
    let ux = in_ux.contains(&name);
    let pkg = in_pkg.contains(&name);
    let container = containers.get(&name).copied();

    if !ux && !pkg && container.is_none() {
        reporter.report(&BundleError::OrphanedPayload { name, span });
        return;
    }

    if ux && pkg {
        reporter.report(&BundleError::PayloadSharedWithUx { name, span });
    }

    if let (Some(authored), Some(assigned)) = (authored, container) {
        if authored != assigned {
            reporter.report(&BundleError::PayloadContainerMismatch {
                name,
                authored,
                assigned,
                span,
            });
        }
    }

    if layout_only && authored.is_some() {
        reporter.report(&BundleError::LayoutPayloadInContainer {
            name,
            span,
        });
    }
}

#[cfg(test)]
mod test {
    use super::super::{resolve, symtab};
    use super::*;
    use crate::diagnose::CollectingReporter;
    use crate::section::{
        Access, FieldValue, OutputKind, Row, Section, SectionKind,
    };
    use crate::span::UNKNOWN_SPAN;

    fn cref(
        parent_kind: EntityKind,
        parent: SymbolId,
        child_kind: EntityKind,
        child: SymbolId,
        primary: bool,
    ) -> ComplexRef {
        ComplexRef {
            parent_kind,
            parent,
            child_kind,
            child,
            primary,
            span: UNKNOWN_SPAN,
        }
    }

    fn run(store: &mut SectionStore) -> (BundleRefs, CollectingReporter) {
        let mut reporter = CollectingReporter::new();
        let build = symtab::build(store, OutputKind::Bundle, &mut reporter);
        let entry = build.entry.expect("test store must have an entry");

        let resolution = resolve::resolve(
            store,
            &build.table,
            entry,
            OutputKind::Bundle,
            &mut reporter,
        );

        let refs = flatten(store, &resolution, &mut reporter);
        (refs, reporter)
    }

    fn bundle_entry() -> Section {
        Section::new("bundle".intern(), SectionKind::Bundle, UNKNOWN_SPAN)
    }

    #[test]
    fn nested_groups_collapse_to_single_edge_with_ored_primary() {
        let a = "A".intern();
        let b = "B".intern();
        let p = "P".intern();

        let mut entry = bundle_entry();
        entry.add_complex_ref(cref(
            EntityKind::PackageGroup,
            a,
            EntityKind::PackageGroup,
            b,
            true,
        ));
        entry.add_complex_ref(cref(
            EntityKind::PackageGroup,
            b,
            EntityKind::Package,
            p,
            false,
        ));

        let mut store = SectionStore::new();
        store.add(entry);

        let (refs, reporter) = run(&mut store);

        assert!(reporter.codes().is_empty());
        assert_eq!(1, refs.edges.len());

        let edge = &refs.edges[0];
        assert_eq!((EntityKind::PackageGroup, a), (edge.parent_kind, edge.parent));
        assert_eq!((EntityKind::Package, p), (edge.child_kind, edge.child));
        assert!(edge.primary);
    }

    #[test]
    fn group_cycle_is_reported_and_expansion_terminates() {
        let a = "A".intern();
        let b = "B".intern();
        let p = "P".intern();

        let mut entry = bundle_entry();
        entry.add_complex_ref(cref(
            EntityKind::PackageGroup,
            a,
            EntityKind::PackageGroup,
            b,
            false,
        ));
        entry.add_complex_ref(cref(
            EntityKind::PackageGroup,
            b,
            EntityKind::PackageGroup,
            a,
            false,
        ));
        entry.add_complex_ref(cref(
            EntityKind::PackageGroup,
            b,
            EntityKind::Package,
            p,
            false,
        ));

        let mut store = SectionStore::new();
        store.add(entry);

        let (refs, reporter) = run(&mut store);

        assert_eq!(vec![130], reporter.codes());

        // The concrete membership survives with the cycle edges gone.
        assert_eq!(1, refs.edges.len());
        assert_eq!(p, refs.edges[0].child);
    }

    #[test]
    fn package_in_two_containers_is_reported_first_wins() {
        let c1 = "c1".intern();
        let c2 = "c2".intern();
        let p = "P".intern();

        let mut entry = bundle_entry();
        entry.add_complex_ref(cref(
            EntityKind::Container,
            c1,
            EntityKind::Package,
            p,
            false,
        ));
        entry.add_complex_ref(cref(
            EntityKind::Container,
            c2,
            EntityKind::Package,
            p,
            false,
        ));

        let mut store = SectionStore::new();
        store.add(entry);

        let (refs, reporter) = run(&mut store);

        assert_eq!(vec![131], reporter.codes());
        assert_eq!(Some(&c1), refs.package_container.get(&p));
    }

    #[test]
    fn chain_membership_schedules_packages_and_boundaries() {
        let p1 = "P1".intern();
        let r1 = "R1".intern();

        let mut entry = bundle_entry();
        entry.table_mut(TableKind::BundlePackage).push(Row::new(
            p1,
            Access::Public,
            UNKNOWN_SPAN,
        ));
        entry.table_mut(TableKind::RollbackBoundary).push(Row::new(
            r1,
            Access::Public,
            UNKNOWN_SPAN,
        ));
        entry.add_complex_ref(cref(
            EntityKind::PackageGroup,
            chain_group(),
            EntityKind::Package,
            p1,
            false,
        ));

        let mut store = SectionStore::new();
        store.add(entry);

        let (refs, reporter) = run(&mut store);

        assert_eq!(vec![133], reporter.codes());
        assert!(refs.is_scheduled(p1));
        assert!(!refs.is_scheduled(r1));
    }

    #[test]
    fn chain_membership_through_nested_group() {
        let sub = "SubGroup".intern();
        let p1 = "P1".intern();

        let mut entry = bundle_entry();
        entry.table_mut(TableKind::BundlePackage).push(Row::new(
            p1,
            Access::Public,
            UNKNOWN_SPAN,
        ));
        entry.add_complex_ref(cref(
            EntityKind::PackageGroup,
            chain_group(),
            EntityKind::PackageGroup,
            sub,
            false,
        ));
        entry.add_complex_ref(cref(
            EntityKind::PackageGroup,
            sub,
            EntityKind::Package,
            p1,
            false,
        ));

        let mut store = SectionStore::new();
        store.add(entry);

        let (refs, reporter) = run(&mut store);

        assert!(reporter.codes().is_empty());
        assert!(refs.is_scheduled(p1));
    }

    #[test]
    fn payload_with_no_owner_is_orphaned() {
        let pay = "pay".intern();

        let mut entry = bundle_entry();
        entry.table_mut(TableKind::Payload).push(Row::new(
            pay,
            Access::Public,
            UNKNOWN_SPAN,
        ));

        let mut store = SectionStore::new();
        store.add(entry);

        let (_, reporter) = run(&mut store);
        assert_eq!(vec![134], reporter.codes());
    }

    #[test]
    fn payload_in_ux_and_package_is_shared() {
        let pay = "pay".intern();
        let p = "P".intern();

        let mut entry = bundle_entry();
        entry.table_mut(TableKind::Payload).push(Row::new(
            pay,
            Access::Public,
            UNKNOWN_SPAN,
        ));
        entry.add_complex_ref(cref(
            EntityKind::Container,
            ux_container(),
            EntityKind::Payload,
            pay,
            false,
        ));
        entry.add_complex_ref(cref(
            EntityKind::Package,
            p,
            EntityKind::Payload,
            pay,
            false,
        ));

        let mut store = SectionStore::new();
        store.add(entry);

        let (refs, reporter) = run(&mut store);

        assert_eq!(vec![135], reporter.codes());
        assert_eq!(
            Some(&ux_container()),
            refs.payload_container.get(&pay)
        );
    }

    #[test]
    fn payload_container_mismatch_is_warning() {
        let pay = "pay".intern();
        let authored = "authoredC".intern();
        let assigned = "otherC".intern();

        let mut entry = bundle_entry();
        entry.table_mut(TableKind::Payload).push(
            Row::new(pay, Access::Public, UNKNOWN_SPAN)
                .with_field(FieldValue::Text(authored)),
        );
        entry.add_complex_ref(cref(
            EntityKind::Container,
            assigned,
            EntityKind::Payload,
            pay,
            false,
        ));

        let mut store = SectionStore::new();
        store.add(entry);

        let (_, reporter) = run(&mut store);

        assert_eq!(vec![136], reporter.codes());
        assert!(!reporter.has_errors());
    }

    #[test]
    fn layout_only_payload_in_authored_container_is_warning() {
        let pay = "pay".intern();
        let c = "c".intern();

        let mut entry = bundle_entry();
        entry.table_mut(TableKind::Payload).push(
            Row::new(pay, Access::Public, UNKNOWN_SPAN)
                .with_field(FieldValue::Text(c))
                .with_field(FieldValue::Flag(true)),
        );
        entry.add_complex_ref(cref(
            EntityKind::Container,
            c,
            EntityKind::Payload,
            pay,
            false,
        ));

        let mut store = SectionStore::new();
        store.add(entry);

        let (_, reporter) = run(&mut store);

        assert_eq!(vec![137], reporter.codes());
        assert!(!reporter.has_errors());
    }
}
