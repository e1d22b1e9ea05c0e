// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
#![deny(unsafe_code)]
#![allow(clippy::too_many_arguments)]

//! # jvmscope
//!
//! A framework for statically introspecting compiled JVM class files without loading
//! them into a JVM. `jvmscope` decodes class bytes into immutable descriptors (modifiers,
//! generic signatures, annotations including type-use annotations, fields, methods,
//! nesting) and links every descriptor of a scan into a graph answering transitive
//! hierarchy and annotation queries.
//!
//! ## Features
//!
//! - **Tolerant scanning** - One broken class becomes a diagnostic, never a failed scan
//! - **Parallel decoding** - Sources are decoded on a rayon pool with pooled decoders
//! - **Full generic signatures** - Parsed, placed with type annotations and rendered in
//!   Java source notation
//! - **Cycle-safe closure queries** - Ancestors, implementors, meta-annotations and
//!   `@Inherited` propagation over an index arena
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use jvmscope::prelude::*;
//!
//! let sources = vec![
//!     ClassPathEntry::new("target/classes/com/example/Service.class"),
//!     ClassPathEntry::new("target/classes/com/example/ServiceImpl.class"),
//! ];
//!
//! let result = Scanner::new(ScanConfig::default()).scan(sources)?;
//! let graph = result.graph();
//!
//! for class in &graph.implementors_of("com.example.Service") {
//!     println!("{class}");
//! }
//! if result.diagnostics().has_any() {
//!     println!("{}", result.diagnostics().summary());
//! }
//! # Ok::<(), jvmscope::Error>(())
//! ```
//!
//! ## Architecture
//!
//! - [`file`] - Byte sources and the bounds-checked [`Parser`]
//! - [`metadata`] - Constant pool, signatures, annotations, descriptors and the class graph
//! - [`scan`] - The parallel [`Scanner`], its configuration and the decoder [`Recycler`]
//! - [`utils`] - Cancellation of running scans
//! - [`Error`] and [`Result`] - Error handling
//!
//! ## Error Handling
//!
//! Decoding a single class returns a [`Result`]; format errors
//! ([`Error::is_format_error`]) reject that class only:
//!
//! ```rust
//! use jvmscope::{metadata::descriptor::ClassDecoder, Error};
//!
//! let mut decoder = ClassDecoder::new();
//! match decoder.decode("Empty.class", 0, &[], &Default::default()) {
//!     Ok(_) => println!("decoded"),
//!     Err(Error::NotSupported(what)) => println!("skipped {what}"),
//!     Err(e) if e.is_format_error() => println!("malformed: {e}"),
//!     Err(e) => println!("other error: {e}"),
//! }
//! ```
//!
//! A [`Scanner`] turns those errors into [`metadata::diagnostics::Diagnostics`] and only
//! fails the whole scan when its worker pool cannot be built or the decoder pool is misused.

#[macro_use]
pub(crate) mod macros;

#[macro_use]
pub(crate) mod error;

/// Shared functionality which is used in unit- and integration-tests
#[cfg(test)]
pub(crate) mod test;

/// Convenient re-exports of the most commonly used types and traits.
///
/// # Example
///
/// ```rust,no_run
/// use jvmscope::prelude::*;
///
/// let result = Scanner::new(ScanConfig::sequential())
///     .scan(vec![ClassPathEntry::new("App.class")])?;
/// println!("{} classes", result.graph().len());
/// # Ok::<(), jvmscope::Error>(())
/// ```
pub mod prelude;

/// Byte sources and low-level parsing
pub mod file;

/// Class file decoding and the class graph
pub mod metadata;

/// Parallel scanning
pub mod scan;

/// Utilities shared by the scanner
pub mod utils;

/// `jvmscope` Result type
///
/// A type alias for `std::result::Result<T, Error>` where the error type is always
/// [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// `jvmscope` Error type
///
/// See [`Error::is_format_error`] for the distinction between errors that reject one class
/// and errors that abort a scan.
pub use error::Error;

/// Bounds-checked big-endian cursor
pub use file::parser::Parser;

/// Byte sources accepted by the scanner
pub use file::{memory::ClassBytes, physical::ClassPathEntry, ByteSource};

/// Descriptors produced by the decoder
pub use metadata::descriptor::{
    ClassDecoder, ClassDescriptor, ClassDescriptorRc, ClassKind, DecodeOptions, FieldDescriptor,
    MethodDescriptor,
};

/// The class graph and its query results
pub use metadata::graph::{ClassGraph, DescriptorSet};

/// Scan diagnostics
pub use metadata::diagnostics::{Diagnostic, DiagnosticCategory, DiagnosticSeverity, Diagnostics};

/// Scanning
pub use scan::{Recyclable, Recycled, Recycler, ScanConfig, ScanResult, Scanner};

/// Cooperative cancellation
pub use utils::synchronization::CancellationToken;
