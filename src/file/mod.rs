//! Class byte sources and the low-level cursor used to decode them.
//!
//! The scanner never discovers class files on its own; an external resolver (directory
//! walker, archive reader, module image reader, ...) hands it an ordered sequence of
//! [`crate::file::ByteSource`] values. Each source is an opaque identifier plus a way to obtain
//! the bytes of exactly one compiled class. Reading the bytes is the only point where a scan
//! task may block.
//!
//! # Key Components
//!
//! ## Sources
//! - [`crate::file::ByteSource`] - Trait for anything that can produce one class's bytes
//! - [`crate::file::memory::ClassBytes`] - In-memory source
//! - [`crate::file::physical::ClassPathEntry`] - Source backed by a file on disk, read lazily
//!
//! ## Parsing Infrastructure
//! - [`crate::file::parser::Parser`] - Bounds-checked big-endian cursor
//! - [`crate::file::io`] - Primitive big-endian reads
//!
//! # Examples
//!
//! ```rust
//! use jvmscope::file::{ByteSource, memory::ClassBytes};
//!
//! let source = ClassBytes::new("com/example/Foo.class", vec![0xCA, 0xFE, 0xBA, 0xBE]);
//! assert_eq!(source.identifier(), "com/example/Foo.class");
//! assert_eq!(source.read_bytes()?.len(), 4);
//! # Ok::<(), jvmscope::Error>(())
//! ```

pub mod io;
pub mod memory;
pub mod parser;
pub mod physical;

use std::borrow::Cow;

use crate::Result;

/// A supplier of the bytes of one compiled class.
///
/// Implementations must be shareable across the scanner's worker threads. The identifier is
/// an opaque label used in diagnostics (typically a path or an archive entry name); the
/// scanner makes no assumption about its format.
pub trait ByteSource: Send + Sync {
    /// Opaque label identifying this source in diagnostics.
    fn identifier(&self) -> &str;

    /// Obtain the class bytes.
    ///
    /// # Errors
    /// Returns an error if the underlying storage cannot be read. The scanner records the
    /// failure as a diagnostic and continues with the remaining sources.
    fn read_bytes(&self) -> Result<Cow<'_, [u8]>>;
}

impl ByteSource for (String, Vec<u8>) {
    fn identifier(&self) -> &str {
        &self.0
    }

    fn read_bytes(&self) -> Result<Cow<'_, [u8]>> {
        Ok(Cow::Borrowed(&self.1))
    }
}

impl ByteSource for (&str, &[u8]) {
    fn identifier(&self) -> &str {
        self.0
    }

    fn read_bytes(&self) -> Result<Cow<'_, [u8]>> {
        Ok(Cow::Borrowed(self.1))
    }
}

impl<T: ByteSource + ?Sized> ByteSource for Box<T> {
    fn identifier(&self) -> &str {
        (**self).identifier()
    }

    fn read_bytes(&self) -> Result<Cow<'_, [u8]>> {
        (**self).read_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tuple_sources() {
        let owned = ("a/B.class".to_string(), vec![1_u8, 2, 3]);
        assert_eq!(owned.identifier(), "a/B.class");
        assert_eq!(owned.read_bytes().unwrap().as_ref(), &[1, 2, 3]);

        let data = [4_u8, 5];
        let borrowed: (&str, &[u8]) = ("c/D.class", &data);
        assert_eq!(borrowed.identifier(), "c/D.class");
        assert_eq!(borrowed.read_bytes().unwrap().as_ref(), &[4, 5]);
    }

    #[test]
    fn boxed_sources() {
        let sources: Vec<Box<dyn ByteSource>> = vec![
            Box::new(("x/Y.class".to_string(), vec![9_u8])),
            Box::new(memory::ClassBytes::new("z/W.class", vec![8, 7])),
        ];

        let ids: Vec<&str> = sources.iter().map(|s| s.identifier()).collect();
        assert_eq!(ids, ["x/Y.class", "z/W.class"]);
        assert_eq!(sources[1].read_bytes().unwrap().len(), 2);
    }
}
