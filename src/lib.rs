// Declarative installer package linker
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

//! Linker for declarative installer packages.
//!
//! Independently compiled units
//!   ("sections",
//!     see [`section`])
//!   are linked into a single output by resolving cross-unit name
//!   references,
//!     determining reachability from the requested output's entry
//!     section,
//!     reporting duplicate definitions,
//!     and
//!       (for bundle outputs)
//!       flattening nested grouping relationships into the flat
//!       parent/child edges the downstream binder consumes.
//! See [`ld::link`] for the pipeline.
//!
//! Diagnostics are never printed directly;
//!   every recoverable problem flows through a caller-supplied
//!   [`diagnose::Reporter`] so that one run reports the maximal set.

// We build docs for private items.
#![allow(rustdoc::private_intra_doc_links)]

pub mod global;

#[macro_use]
extern crate static_assertions;

pub mod diagnose;
pub mod ld;
pub mod section;
pub mod span;
pub mod sym;
