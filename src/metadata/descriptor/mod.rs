//! Class descriptors: the decoded, immutable view of one class file.
//!
//! A [`ClassDescriptor`] holds everything the scanner extracts from a class file without
//! loading it: name, kind, access flags, supertypes, generic signatures, annotations, nested
//! class relationships, and the declared fields and methods. Descriptors are produced by the
//! [`ClassDecoder`] and shared as [`ClassDescriptorRc`] once they enter a graph.
//!
//! # Decoding
//!
//! ```rust
//! use jvmscope::metadata::descriptor::{ClassDecoder, DecodeOptions};
//!
//! fn describe(bytes: &[u8]) -> jvmscope::Result<()> {
//!     let mut decoder = ClassDecoder::new();
//!     let class = decoder.decode("Foo.class", 0, bytes, &DecodeOptions::default())?;
//!     println!("{class}");
//!     for method in &class.methods {
//!         println!("  {method}");
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Member signatures
//!
//! Every field and method carries a parsed signature even when the class file has no
//! `Signature` attribute; in that case it is derived from the erased descriptor and
//! `has_generic_signature` is `false`. Type annotations are attached to the nodes of these
//! signatures during decoding.

mod builder;
mod modifiers;
mod types;

pub use builder::{
    ClassDecoder, DecodeOptions, CLASS_MAGIC, DEFAULT_MAX_MAJOR_VERSION, MIN_MAJOR_VERSION,
};
pub use modifiers::{ClassKind, ClassModifiers, FieldModifiers, MethodModifiers};
pub use types::{
    ClassDescriptor, ClassDescriptorRc, EnclosingMethod, FieldDescriptor, MethodDescriptor,
};
