// Compiled sections and their tables
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

//! Compiled sections,
//!   the linker's unit of reachability.
//!
//! A [`Section`] is produced by the upstream compiler from one source
//!   fragment and contains typed [`Table`]s of [`Row`]s along with the
//!   references the source authored:
//!
//!   - [`SimpleRef`]s are named dependency edges resolved against the
//!     global symbol table during linking; and
//!   - [`ComplexRef`]s are hierarchical containment edges between bundle
//!     entities that are flattened by [`ld::flatten`](crate::ld::flatten)
//!     before the downstream binder can use them.
//!
//! Sections are immutable once handed to the linker with a single
//!   exception:
//!     the symbol table builder marks rows whose definitions are
//!     [redundant](Row::is_redundant) so that their primary keys can be
//!     excluded from emission downstream.
//! All sections live in a [`SectionStore`] and are addressed by
//!   [`SectionId`],
//!     which is a plain index and is never invalidated
//!       (sections are not removed from the store).

use crate::span::Span;
use crate::sym::SymbolId;
use std::fmt::{self, Display};

/// Kind of compiled section.
///
/// The kind determines whether a section can serve as the entry section
///   of a link
///     (see [`SectionKind::is_entry`])
///   and is checked against the [`OutputKind`] the caller requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
    Package,
    Module,
    Patch,
    PatchCreation,
    Bundle,
    Fragment,
    Unknown,
}

impl SectionKind {
    /// Whether a section of this kind can root a link.
    ///
    /// Fragments only ever contribute to some other output and an
    ///   [`SectionKind::Unknown`] section cannot be trusted to.
    pub fn is_entry(self) -> bool {
        !matches!(self, Self::Fragment | Self::Unknown)
    }
}

impl Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Package => write!(f, "package"),
            Self::Module => write!(f, "module"),
            Self::Patch => write!(f, "patch"),
            Self::PatchCreation => write!(f, "patch creation"),
            Self::Bundle => write!(f, "bundle"),
            Self::Fragment => write!(f, "fragment"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// Kind of artifact the caller asked the linker to produce.
///
/// This mirrors [`SectionKind`] for the entry-capable kinds and adds
///   [`OutputKind::Library`],
///     which has no entry section kind of its own:
///       library linking bundles fragments for later consumption and
///       relaxes parts of reference resolution
///         (see the media exception in
///           [`ld::resolve`](crate::ld::resolve)).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputKind {
    Package,
    Module,
    Patch,
    PatchCreation,
    Bundle,
    Fragment,
    Library,
}

impl OutputKind {
    /// The section kind expected to root an output of this kind,
    ///   if there is a specific expectation at all.
    ///
    /// A mismatch is a warning rather than an error:
    ///   the entry section's own kind wins,
    ///     since it is what the authoring actually declared.
    pub fn expected_entry(self) -> Option<SectionKind> {
        match self {
            Self::Package => Some(SectionKind::Package),
            Self::Module => Some(SectionKind::Module),
            Self::Patch => Some(SectionKind::Patch),
            Self::PatchCreation => Some(SectionKind::PatchCreation),
            Self::Bundle => Some(SectionKind::Bundle),
            Self::Fragment | Self::Library => None,
        }
    }
}

impl Display for OutputKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Package => write!(f, "package"),
            Self::Module => write!(f, "module"),
            Self::Patch => write!(f, "patch"),
            Self::PatchCreation => write!(f, "patch creation"),
            Self::Bundle => write!(f, "bundle"),
            Self::Fragment => write!(f, "fragment"),
            Self::Library => write!(f, "library"),
        }
    }
}

/// Visibility of a symbol relative to the section referencing it.
///
/// The first four levels form the cross-section visibility model;
///   [`Access::Global`] and [`Access::Virtual`] are section-scoped
///   variants the compiler assigns to identifiers that only ever have
///   meaning inside their own section
///     (generated ids and override slots respectively).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Accessible from any section.
    Public,

    /// Accessible from sections sharing the defining section's library
    ///   identity
    ///     (or from the defining section itself).
    Internal,

    /// Accessible from sections compiled from the same source file.
    Protected,

    /// Accessible only from the defining section instance.
    ///
    /// This is stricter than [`Access::Protected`]:
    ///   two sections compiled from the same file do _not_ see each
    ///   other's private symbols.
    Private,

    /// Section-local identifier generated by the compiler.
    Global,

    /// Section-local override slot.
    Virtual,
}

impl Display for Access {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Public => write!(f, "public"),
            Self::Internal => write!(f, "internal"),
            Self::Protected => write!(f, "protected"),
            Self::Private => write!(f, "private"),
            Self::Global => write!(f, "global"),
            Self::Virtual => write!(f, "virtual"),
        }
    }
}

/// Kind of table within a section.
///
/// Table kinds carry the capability predicates that the linker's
///   special-casing keys off of,
///     so that no stage ever has to compare table _names_:
///
///   - [`produces_symbols`](TableKind::produces_symbols) gates symbol
///     table construction;
///   - [`allows_duplicates`](TableKind::allows_duplicates) marks tables
///     whose same-name symbols are legal overrides rather than
///     conflicts; and
///   - [`collapsible`](TableKind::collapsible) marks tables whose
///     content-identical private duplicates collapse into a single
///     definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableKind {
    /// Directory declarations.
    ///
    /// Many sections declare the same standard directories,
    ///   so identical private declarations are tolerated and collapsed.
    Directory,

    /// Disk volume / media declarations.
    ///
    /// Media has no meaning in a library output;
    ///   references to it are skipped entirely when linking one.
    Media,

    /// Action sequencing.
    ///
    /// Duplicate symbols here are legal:
    ///   a later definition overrides the scheduled action.
    Action,

    /// Late-bound variables.
    ///
    /// Duplicate symbols here are legal overrides,
    ///   resolved by the runtime engine rather than the linker.
    Variable,

    Component,
    Property,

    /// Packages scheduled into a bundle's chain.
    BundlePackage,
    RollbackBoundary,
    Container,
    Layout,
    PackageGroup,
    PayloadGroup,
    Payload,

    /// Auxiliary rows that define no symbols.
    Data,
}

impl TableKind {
    /// Whether rows of this table define symbols in the global table.
    pub fn produces_symbols(self) -> bool {
        !matches!(self, Self::Data)
    }

    /// Whether same-name symbols in this table are legal overrides.
    pub fn allows_duplicates(self) -> bool {
        matches!(self, Self::Action | Self::Variable)
    }

    /// Whether content-identical private duplicates collapse into one
    ///   definition rather than conflicting.
    pub fn collapsible(self) -> bool {
        matches!(self, Self::Directory)
    }
}

impl Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Directory => write!(f, "Directory"),
            Self::Media => write!(f, "Media"),
            Self::Action => write!(f, "Action"),
            Self::Variable => write!(f, "Variable"),
            Self::Component => write!(f, "Component"),
            Self::Property => write!(f, "Property"),
            Self::BundlePackage => write!(f, "BundlePackage"),
            Self::RollbackBoundary => write!(f, "RollbackBoundary"),
            Self::Container => write!(f, "Container"),
            Self::Layout => write!(f, "Layout"),
            Self::PackageGroup => write!(f, "PackageGroup"),
            Self::PayloadGroup => write!(f, "PayloadGroup"),
            Self::Payload => write!(f, "Payload"),
            Self::Data => write!(f, "Data"),
        }
    }
}

/// A single typed field of a [`Row`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldValue {
    Text(SymbolId),
    Num(u32),
    Flag(bool),
}

/// A row within a [`Table`].
///
/// The row's `id` is its primary key and,
///   for symbol-producing tables,
///   the name of the symbol it exports.
/// Field layout beyond the id is table-specific and opaque to most of the
///   linker;
///     content comparison for redundancy classification compares fields
///     structurally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    id: SymbolId,
    access: Access,
    fields: Vec<FieldValue>,
    span: Span,
    redundant: bool,
}

impl Row {
    pub fn new(id: SymbolId, access: Access, span: Span) -> Self {
        Self {
            id,
            access,
            fields: Vec::new(),
            span,
            redundant: false,
        }
    }

    pub fn with_field(mut self, field: FieldValue) -> Self {
        self.fields.push(field);
        self
    }

    pub fn id(&self) -> SymbolId {
        self.id
    }

    pub fn access(&self) -> Access {
        self.access
    }

    pub fn span(&self) -> Span {
        self.span
    }

    pub fn fields(&self) -> &[FieldValue] {
        &self.fields
    }

    /// Text value of the field at `index`,
    ///   if present and textual.
    pub fn field_text(&self, index: usize) -> Option<SymbolId> {
        match self.fields.get(index) {
            Some(FieldValue::Text(sym)) => Some(*sym),
            _ => None,
        }
    }

    /// Flag value of the field at `index`,
    ///   if present and a flag.
    pub fn field_flag(&self, index: usize) -> Option<bool> {
        match self.fields.get(index) {
            Some(FieldValue::Flag(flag)) => Some(*flag),
            _ => None,
        }
    }

    /// Whether this row's definition was found to duplicate an identical
    ///   authoritative definition during symbol table construction.
    ///
    /// Redundant rows must be excluded from emission downstream to avoid
    ///   duplicate-primary-key failures.
    pub fn is_redundant(&self) -> bool {
        self.redundant
    }

    pub(crate) fn mark_redundant(&mut self) {
        self.redundant = true;
    }

    /// Whether two rows define the same content.
    ///
    /// Only the id and field data participate;
    ///   spans differ by definition and the redundant flag is derived
    ///   state.
    pub fn content_eq(&self, other: &Row) -> bool {
        self.id == other.id && self.fields == other.fields
    }
}

/// A typed collection of rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    kind: TableKind,
    rows: Vec<Row>,
}

impl Table {
    pub fn new(kind: TableKind) -> Self {
        Self {
            kind,
            rows: Vec::new(),
        }
    }

    pub fn kind(&self) -> TableKind {
        self.kind
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn push(&mut self, row: Row) {
        self.rows.push(row);
    }

    pub(crate) fn row_mut(&mut self, index: usize) -> Option<&mut Row> {
        self.rows.get_mut(index)
    }
}

/// A named dependency edge from a section to a symbol.
///
/// References name the target's table explicitly since symbol names are
///   only unique within a table's symbol space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimpleRef {
    pub table: TableKind,
    pub id: SymbolId,
    pub span: Span,
}

/// Entity kinds that may participate in a [`ComplexRef`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Container,
    Layout,
    PackageGroup,
    PayloadGroup,
    Package,
    ContainerPackage,
    Payload,
}

impl EntityKind {
    /// Whether this entity is a grouping construct that must be
    ///   flattened away before binding.
    pub fn is_group(self) -> bool {
        matches!(self, Self::PackageGroup | Self::PayloadGroup)
    }
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Container => write!(f, "container"),
            Self::Layout => write!(f, "layout"),
            Self::PackageGroup => write!(f, "package group"),
            Self::PayloadGroup => write!(f, "payload group"),
            Self::Package => write!(f, "package"),
            Self::ContainerPackage => write!(f, "container package"),
            Self::Payload => write!(f, "payload"),
        }
    }
}

/// A hierarchical containment edge between bundle entities.
///
/// These may nest arbitrarily
///   (a package group containing another package group)
///   and are flattened into concrete parent/child edges by
///   [`ld::flatten`](crate::ld::flatten).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComplexRef {
    pub parent_kind: EntityKind,
    pub parent: SymbolId,
    pub child_kind: EntityKind,
    pub child: SymbolId,

    /// Whether the child is the parent's primary member.
    ///
    /// Survives flattening:
    ///   a flattened edge is primary if any edge along the collapsed
    ///   chain was.
    pub primary: bool,

    pub span: Span,
}

/// A compiled unit of tables and references.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    name: SymbolId,
    kind: SectionKind,
    library: Option<SymbolId>,
    span: Span,
    tables: Vec<Table>,
    refs: Vec<SimpleRef>,
    complex_refs: Vec<ComplexRef>,
}

impl Section {
    pub fn new(name: SymbolId, kind: SectionKind, span: Span) -> Self {
        Self {
            name,
            kind,
            library: None,
            span,
            tables: Vec::new(),
            refs: Vec::new(),
            complex_refs: Vec::new(),
        }
    }

    /// Associate this section with an owning library identity.
    pub fn with_library(mut self, library: SymbolId) -> Self {
        self.library = Some(library);
        self
    }

    pub fn name(&self) -> SymbolId {
        self.name
    }

    pub fn kind(&self) -> SectionKind {
        self.kind
    }

    pub fn library(&self) -> Option<SymbolId> {
        self.library
    }

    /// Span of the section declaration itself.
    ///
    /// The span's context identifies the source file this section was
    ///   compiled from,
    ///     which is what [`Access::Protected`] visibility compares.
    pub fn span(&self) -> Span {
        self.span
    }

    pub fn tables(&self) -> &[Table] {
        &self.tables
    }

    pub fn table(&self, kind: TableKind) -> Option<&Table> {
        self.tables.iter().find(|t| t.kind() == kind)
    }

    /// Table of the given kind,
    ///   created empty if the section does not yet have one.
    pub fn table_mut(&mut self, kind: TableKind) -> &mut Table {
        match self.tables.iter().position(|t| t.kind() == kind) {
            Some(index) => &mut self.tables[index],
            None => {
                self.tables.push(Table::new(kind));
                self.tables.last_mut().unwrap()
            }
        }
    }

    pub fn refs(&self) -> &[SimpleRef] {
        &self.refs
    }

    pub fn add_ref(&mut self, table: TableKind, id: SymbolId, span: Span) {
        self.refs.push(SimpleRef { table, id, span });
    }

    pub fn complex_refs(&self) -> &[ComplexRef] {
        &self.complex_refs
    }

    pub fn add_complex_ref(&mut self, cref: ComplexRef) {
        self.complex_refs.push(cref);
    }
}

/// Position of a [`Row`] within a [`SectionStore`].
///
/// Rows are never removed or reordered,
///   so a `RowRef` remains valid for the lifetime of the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowRef {
    pub section: SectionId,
    pub table: usize,
    pub row: usize,
}

/// Index of a [`Section`] within a [`SectionStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SectionId(usize);

impl SectionId {
    pub fn as_usize(self) -> usize {
        self.0
    }
}

/// The full set of compiled sections for one linking run.
#[derive(Debug, Default)]
pub struct SectionStore {
    sections: Vec<Section>,
}

impl SectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, section: Section) -> SectionId {
        self.sections.push(section);
        SectionId(self.sections.len() - 1)
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Retrieve a section by id.
    ///
    /// Panics
    /// ======
    /// A [`SectionId`] can only be produced by this store and sections
    ///   are never removed,
    ///     so a missing section represents a bug in the linker and will
    ///     panic.
    pub fn get(&self, id: SectionId) -> &Section {
        &self.sections[id.0]
    }

    /// Retrieve a row by position.
    ///
    /// Panics under the same conditions as [`SectionStore::get`].
    pub fn row(&self, rref: RowRef) -> &Row {
        &self.sections[rref.section.0].tables[rref.table].rows[rref.row]
    }

    pub(crate) fn row_mut(&mut self, rref: RowRef) -> &mut Row {
        self.sections[rref.section.0].tables[rref.table]
            .row_mut(rref.row)
            .expect("invalid RowRef: row is missing from the store")
    }

    pub fn iter(&self) -> impl Iterator<Item = (SectionId, &Section)> {
        self.sections
            .iter()
            .enumerate()
            .map(|(index, section)| (SectionId(index), section))
    }

    pub fn ids(&self) -> impl Iterator<Item = SectionId> {
        (0..self.sections.len()).map(SectionId)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::span::UNKNOWN_SPAN;
    use crate::sym::GlobalSymbolIntern;

    #[test]
    fn entry_capable_kinds() {
        assert!(SectionKind::Package.is_entry());
        assert!(SectionKind::Module.is_entry());
        assert!(SectionKind::Patch.is_entry());
        assert!(SectionKind::PatchCreation.is_entry());
        assert!(SectionKind::Bundle.is_entry());

        assert!(!SectionKind::Fragment.is_entry());
        assert!(!SectionKind::Unknown.is_entry());
    }

    #[test]
    fn library_output_expects_no_particular_entry() {
        assert_eq!(None, OutputKind::Library.expected_entry());
        assert_eq!(None, OutputKind::Fragment.expected_entry());
        assert_eq!(
            Some(SectionKind::Bundle),
            OutputKind::Bundle.expected_entry()
        );
    }

    #[test]
    fn table_capability_predicates() {
        assert!(TableKind::Directory.collapsible());
        assert!(!TableKind::Component.collapsible());

        assert!(TableKind::Action.allows_duplicates());
        assert!(TableKind::Variable.allows_duplicates());
        assert!(!TableKind::Directory.allows_duplicates());

        assert!(TableKind::Payload.produces_symbols());
        assert!(!TableKind::Data.produces_symbols());
    }

    #[test]
    fn row_content_eq_ignores_span() {
        let id = "row".intern();
        let a = Row::new(id, Access::Private, UNKNOWN_SPAN)
            .with_field(FieldValue::Text("x".intern()));
        let b = Row::new(id, Access::Private, Span::new("f".intern(), 3))
            .with_field(FieldValue::Text("x".intern()));
        let c = Row::new(id, Access::Private, UNKNOWN_SPAN)
            .with_field(FieldValue::Text("y".intern()));

        assert!(a.content_eq(&b));
        assert!(!a.content_eq(&c));
    }

    #[test]
    fn table_mut_creates_on_demand() {
        let mut section =
            Section::new("sec".intern(), SectionKind::Fragment, UNKNOWN_SPAN);

        assert!(section.table(TableKind::Component).is_none());

        section
            .table_mut(TableKind::Component)
            .push(Row::new("c1".intern(), Access::Public, UNKNOWN_SPAN));

        assert_eq!(
            1,
            section.table(TableKind::Component).unwrap().rows().len()
        );

        // A second request reuses the existing table.
        section
            .table_mut(TableKind::Component)
            .push(Row::new("c2".intern(), Access::Public, UNKNOWN_SPAN));

        assert_eq!(1, section.tables().len());
    }

    #[test]
    fn store_assigns_sequential_ids() {
        let mut store = SectionStore::new();

        let a = store.add(Section::new(
            "a".intern(),
            SectionKind::Fragment,
            UNKNOWN_SPAN,
        ));
        let b = store.add(Section::new(
            "b".intern(),
            SectionKind::Fragment,
            UNKNOWN_SPAN,
        ));

        assert_eq!(0, a.as_usize());
        assert_eq!(1, b.as_usize());
        assert_eq!("a".intern(), store.get(a).name());
        assert_eq!("b".intern(), store.get(b).name());
        assert_eq!(2, store.len());
    }

    #[test]
    fn row_ref_round_trip() {
        let mut store = SectionStore::new();

        let mut section =
            Section::new("s".intern(), SectionKind::Fragment, UNKNOWN_SPAN);
        section
            .table_mut(TableKind::Directory)
            .push(Row::new("d1".intern(), Access::Private, UNKNOWN_SPAN));
        let sid = store.add(section);

        let rref = RowRef {
            section: sid,
            table: 0,
            row: 0,
        };

        assert_eq!("d1".intern(), store.row(rref).id());
        assert!(!store.row(rref).is_redundant());

        store.row_mut(rref).mark_redundant();
        assert!(store.row(rref).is_redundant());
    }
}
