// String internment
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

//! String internment system.
//!
//! Interned strings are represented by an integer [`SymbolId`],
//!   created by an [`Interner`].
//! Interners represent symbols as integer values which allows for `O(1)`
//!   comparison of any arbitrary interned value,
//!     regardless of length.
//! This matters for the linker in particular,
//!   since nearly everything it touches is a name:
//!     symbol ids, section names, library identities, and source paths.
//!
//! The most convenient way to intern strings is using the global static
//!   interner via [`GlobalSymbolIntern`]:
//!
//! ```
//! use pkgld::sym::{GlobalSymbolIntern, GlobalSymbolResolve, SymbolId};
//!
//! let foo: SymbolId = "foo".intern();
//!
//! // Interning the same string twice returns the same intern.
//! assert_eq!(foo, "foo".intern());
//!
//! // Different strings intern to different values.
//! assert_ne!(foo, "bar".intern());
//!
//! // Interned slices can be looked up by their symbol id.
//! assert_eq!("foo", foo.lookup_str());
//! ```
//!
//! Strings should be interned as soon as they are encountered and only
//!   looked up again when they need to be displayed to the user,
//!     such as when rendering a diagnostic.
//!
//! Internment Mechanism
//! ====================
//! The interner is backed by a [bumpalo][bumpalo] arena so that interned
//!   slices have a stable address for the lifetime of the pool,
//!     with an [Fx Hash][fxhash]-keyed map from slice to [`SymbolId`].
//! [`SymbolId`] is monotonically increasing from 1;
//!   index 0 is reserved so that [`SymbolId`] can be backed by
//!   [`NonZeroU32`] and `Option<SymbolId>` costs no extra space.

use crate::global;
use bumpalo::Bump;
use fxhash::FxBuildHasher;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt::{self, Debug, Display};
use std::num::NonZeroU32;

/// Unique symbol identifier produced by an [`Interner`].
///
/// This newtype helps to prevent other indexes from being used where a
///   symbol index is expected.
/// Note, however, that it provides no defense against mixing symbol
///   indexes between multiple [`Interner`]s;
///     in practice only the global interner is used.
///
/// The index `0` is never valid,
///   which allows us to have `Option<SymbolId>` at no space cost.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SymbolId(NonZeroU32);
assert_eq_size!(Option<SymbolId>, SymbolId);

impl SymbolId {
    pub fn as_usize(self) -> usize {
        self.0.get() as usize
    }

    /// Construct an id from a non-zero value for testing.
    ///
    /// Panics
    /// ------
    /// Will panic if `n == 0`.
    #[cfg(test)]
    pub fn test_from_int(n: u32) -> SymbolId {
        SymbolId(NonZeroU32::new(n).unwrap())
    }
}

impl Display for SymbolId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        Display::fmt(self.lookup_str(), f)
    }
}

impl Debug for SymbolId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "SymbolId({} \"{}\")", self.0, self.lookup_str())
    }
}

/// An interner backed by an [arena](bumpalo).
///
/// Since all symbols exist until the interner itself is freed,
///   an arena is an efficient and appropriate memory allocation strategy
///   that also provides a stable location in memory for symbol data.
///
/// See the [module-level documentation](self) for examples and more
///   information on how to use this interner.
pub struct Interner<'i> {
    /// Storage for interned strings.
    arena: Bump,

    /// Interned strings by [`SymbolId`].
    ///
    /// The first index is populated during initialization to ensure that
    ///   [`SymbolId`] will never be `0`.
    ///
    /// These string slices are stored in `arena`.
    strings: RefCell<Vec<&'i str>>,

    /// Map of interned strings to their respective [`SymbolId`].
    ///
    /// This allows us to determine whether a string has already been
    ///   interned and, if so, to return its corresponding symbol.
    map: RefCell<HashMap<&'i str, SymbolId, FxBuildHasher>>,
}

impl<'i> Interner<'i> {
    /// Initialize a new interner with no initial capacity.
    ///
    /// Prefer [`with_capacity`](Interner::with_capacity) when possible.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Initialize a new interner with an initial capacity for the
    ///   underlying map.
    ///
    /// The given `capacity` has no affect on arena allocation.
    pub fn with_capacity(capacity: usize) -> Self {
        let mut strings = Vec::with_capacity(capacity);

        // The first index is not used since SymbolId cannot be 0.
        strings.push("");

        Self {
            arena: Bump::new(),
            strings: RefCell::new(strings),
            map: RefCell::new(HashMap::with_capacity_and_hasher(
                capacity,
                Default::default(),
            )),
        }
    }

    /// Intern a string slice or return an existing [`SymbolId`].
    pub fn intern(&self, value: &str) -> SymbolId {
        let mut map = self.map.borrow_mut();

        if let Some(sym) = map.get(value) {
            return *sym;
        }

        let mut strings = self.strings.borrow_mut();

        let next_index: u32 = strings
            .len()
            .try_into()
            .expect("internal error: SymbolId range exhausted");

        // Not zero, since `strings` is seeded with a reserved first
        // element on initialization.
        let id = SymbolId(
            NonZeroU32::new(next_index)
                .expect("internal error: SymbolId must be nonzero"),
        );

        let clone = self.copy_slice_into_arena(value);

        map.insert(clone, id);
        strings.push(clone);

        id
    }

    /// Retrieve a symbol by string slice,
    ///   if it has already been interned.
    pub fn intern_soft(&self, value: &str) -> Option<SymbolId> {
        self.map.borrow().get(value).copied()
    }

    /// Determine whether the given value has already been interned.
    pub fn contains(&self, value: &str) -> bool {
        self.map.borrow().contains_key(value)
    }

    /// Number of interned strings in this interner's pool.
    pub fn len(&self) -> usize {
        self.map.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Look up a symbol's string value by its [`SymbolId`].
    ///
    /// If the index is not found,
    ///   the result is [`None`].
    pub fn index_lookup(&'i self, index: SymbolId) -> Option<&'i str> {
        self.strings.borrow().get(index.as_usize()).copied()
    }

    fn copy_slice_into_arena(&self, value: &str) -> &'i str {
        // The returned slice is behind a stable arena address that lives
        // as long as the interner itself, so widening the lifetime to
        // that of the interner is sound.
        unsafe {
            &*(std::str::from_utf8_unchecked(
                self.arena.alloc_slice_clone(value.as_bytes()),
            ) as *const str)
        }
    }
}

impl<'i> Default for Interner<'i> {
    fn default() -> Self {
        Self::new()
    }
}

thread_local! {
    static INTERNER: Interner<'static> =
        Interner::with_capacity(global::INIT_GLOBAL_INTERNER_CAPACITY);
}

/// Perform an operation using the global interner.
///
/// The global interner is static and thread-local,
///   created using the [`thread_local!`] macro,
///   which provides access with a lifetime that cannot exceed that of the
///   closure.
/// This is a problem,
///   because we must return string slices from the interner's storage.
///
/// This function transmutes the lifetime of the interner reference back to
///   `'static`,
///     which is expected to be safe because the thread-local storage is
///     never deallocated and is only accessible to one thread.
fn with_static_interner<F, R>(f: F) -> R
where
    F: FnOnce(&'static Interner<'static>) -> R,
{
    INTERNER.with(|interner| {
        f(unsafe {
            std::mem::transmute::<
                &Interner<'static>,
                &'static Interner<'static>,
            >(interner)
        })
    })
}

/// Intern a string using a global interner.
///
/// This exists as its own trait
///   (rather than inherent methods on string types)
///   to make it easy to see what systems rely on global state.
pub trait GlobalSymbolIntern {
    /// Intern a string using the global interner.
    fn intern(self) -> SymbolId;
}

impl GlobalSymbolIntern for &str {
    fn intern(self) -> SymbolId {
        with_static_interner(|interner| interner.intern(self))
    }
}

/// Resolve a [`SymbolId`] to the string value it represents using the
///   global interner.
pub trait GlobalSymbolResolve {
    /// Resolve a [`SymbolId`] allocated using the global interner.
    ///
    /// This name is intended to convey that this operation has a cost:
    ///   a lookup is performed on the global interner pool.
    /// This shouldn't be done more than is necessary.
    ///
    /// Panics
    /// ======
    /// This will panic if the symbol cannot be found.
    /// Such a situation should never occur if the interner is being used
    ///   properly and would represent a bug in the linker.
    fn lookup_str(&self) -> &'static str;
}

impl GlobalSymbolResolve for SymbolId {
    fn lookup_str(&self) -> &'static str {
        with_static_interner(|interner| {
            interner
                .index_lookup(*self)
                .expect("missing symbol in global interner pool")
        })
    }
}
