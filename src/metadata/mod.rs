//! Class file metadata: decoding, descriptors and the class graph.
//!
//! This module contains everything between raw class bytes and the queryable
//! [`graph::ClassGraph`]. Decoding is strictly per class; cross-class resolution happens
//! only once every class of a scan has been registered.
//!
//! # Key Components
//!
//! - [`constpool`] - Constant pool decoding and typed entry access
//! - [`signatures`] - Generic signature grammar, parser and canonical rendering
//! - [`annotations`] - Annotation instances and element values
//! - [`typeannotations`] - Type-use annotations and their placement onto signatures
//! - [`descriptor`] - The class decoder and the immutable class descriptors it produces
//! - [`graph`] - Registration, name resolution and closure queries
//! - [`diagnostics`] - Non-fatal problems collected during a scan
//!
//! # Examples
//!
//! ```rust,no_run
//! use jvmscope::metadata::descriptor::{ClassDecoder, DecodeOptions};
//!
//! let bytes = std::fs::read("target/classes/com/example/App.class")?;
//! let mut decoder = ClassDecoder::new();
//! let class = decoder.decode("App.class", 0, &bytes, &DecodeOptions::default())?;
//!
//! println!("{} {}", class.kind, class.name);
//! for method in &class.methods {
//!     println!("  {}", method.signature);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod annotations;
pub mod constpool;
pub mod descriptor;
pub mod diagnostics;
pub mod graph;
pub mod signatures;
pub mod typeannotations;
