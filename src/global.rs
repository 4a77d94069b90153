// Global constants and types
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

//! Global constants and types across the entire linker.
//!
//! The linker operates on one section store at a time,
//!   but sizes must accommodate the largest store we reasonably expect to
//!   encounter:
//!     a setup authoring for a large product can easily produce tens of
//!     thousands of symbols across its compiled sections.

/// Initial capacity of the global interner.
///
/// A typical package links a few thousand unique identifiers
///   (symbol names, library identities, paths).
/// This can be adjusted after profiling against real-world stores.
pub const INIT_GLOBAL_INTERNER_CAPACITY: usize = 4096;

/// Supported number of unique interned strings per linking run.
pub type ProgSymSize = u32;

/// Supported line count of a single source file.
pub type SourceLineSize = u32;
