//! Low-level byte stream cursor for class file and signature decoding.
//!
//! This module provides the [`crate::file::parser::Parser`] type, a cursor-based binary data
//! parser used for everything the crate decodes: the class file structure itself (header,
//! constant pool, member tables, attributes) and the textual generic signatures stored in
//! the constant pool, which the signature parser walks byte by byte.
//!
//! # Architecture
//!
//! The parser is built around a simple cursor-based model that maintains a position within
//! a byte slice:
//!
//! - **Position tracking** - Maintains current offset for sequential parsing operations
//! - **Bounds checking** - All operations validate data availability before reading
//! - **Type-safe reading** - [`crate::file::parser::Parser::read_be`] for any [`crate::file::io::ByteIO`] type
//! - **Zero-copy slices** - [`crate::file::parser::Parser::read_bytes`] and
//!   [`crate::file::parser::Parser::take_until`] borrow from the input
//!
//! # Usage Examples
//!
//! ## Reading a class file header
//!
//! ```rust
//! use jvmscope::Parser;
//!
//! let data = [0xCA, 0xFE, 0xBA, 0xBE, 0x00, 0x00, 0x00, 0x34];
//! let mut parser = Parser::new(&data);
//!
//! assert_eq!(parser.read_be::<u32>()?, 0xCAFE_BABE);
//! assert_eq!(parser.read_be::<u16>()?, 0);
//! assert_eq!(parser.read_be::<u16>()?, 52);
//! assert!(!parser.has_more_data());
//! # Ok::<(), jvmscope::Error>(())
//! ```
//!
//! ## Scanning text
//!
//! ```rust
//! use jvmscope::Parser;
//!
//! let signature = b"Ljava/util/List;";
//! let mut parser = Parser::new(signature);
//!
//! parser.expect_byte(b'L')?;
//! let name = parser.take_until(|b| b == b';' || b == b'<')?;
//! assert_eq!(name, b"java/util/List");
//! # Ok::<(), jvmscope::Error>(())
//! ```

use crate::{
    file::io::{read_be_at, ByteIO},
    Error::OutOfBounds,
    Result,
};

/// A bounds-checked cursor over a byte slice.
///
/// `Parser` reads big-endian values (the byte order of the class file format) and raw
/// slices while maintaining a position. Every read validates that enough data remains, so
/// truncated or malformed input results in [`crate::Error::OutOfBounds`] rather than a
/// panic.
///
/// # Examples
///
/// ```rust
/// use jvmscope::Parser;
///
/// let data = [0x00, 0x02, 0xAA, 0xBB];
/// let mut parser = Parser::new(&data);
///
/// let count = parser.read_be::<u16>()?;
/// let payload = parser.read_bytes(count as usize)?;
/// assert_eq!(payload, &[0xAA, 0xBB]);
/// # Ok::<(), jvmscope::Error>(())
/// ```
pub struct Parser<'a> {
    /// The binary data being parsed
    data: &'a [u8],
    /// Current position within the data buffer
    position: usize,
}

impl<'a> Parser<'a> {
    /// Create a new [`crate::file::parser::Parser`] from a byte slice.
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        Parser { data, position: 0 }
    }

    /// Returns the length of the underlying data buffer.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the parser has no data.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns `true` if there are unread bytes left.
    #[must_use]
    pub fn has_more_data(&self) -> bool {
        self.position < self.data.len()
    }

    /// Number of unread bytes.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.position)
    }

    /// Move the cursor forward by one byte.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the parser is exhausted.
    pub fn advance(&mut self) -> Result<()> {
        self.advance_by(1)
    }

    /// Move the cursor forward by `step` bytes.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if fewer than `step` bytes remain.
    pub fn advance_by(&mut self, step: usize) -> Result<()> {
        if step > self.remaining() {
            return Err(OutOfBounds);
        }

        self.position += step;
        Ok(())
    }

    /// Current position of the cursor.
    #[must_use]
    pub fn pos(&self) -> usize {
        self.position
    }

    /// Returns the byte at the cursor without consuming it.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the parser is exhausted.
    pub fn peek_byte(&self) -> Result<u8> {
        self.data.get(self.position).copied().ok_or(OutOfBounds)
    }

    /// Read a value of type `T` in big-endian byte order.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if not enough data remains.
    pub fn read_be<T: ByteIO>(&mut self) -> Result<T> {
        read_be_at::<T>(self.data, &mut self.position)
    }

    /// Read `count` raw bytes, borrowing them from the input.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if fewer than `count` bytes remain.
    pub fn read_bytes(&mut self, count: usize) -> Result<&'a [u8]> {
        if count > self.remaining() {
            return Err(OutOfBounds);
        }

        let slice = &self.data[self.position..self.position + count];
        self.position += count;
        Ok(slice)
    }

    /// Consume one byte which must equal `expected`.
    ///
    /// # Errors
    /// Returns a malformed error if a different byte is found, or
    /// [`crate::Error::OutOfBounds`] if the parser is exhausted.
    pub fn expect_byte(&mut self, expected: u8) -> Result<()> {
        let found = self.read_be::<u8>()?;
        if found != expected {
            return Err(malformed_error!(
                "Expected '{}' at offset {} - found '{}'",
                char::from(expected),
                self.position - 1,
                char::from(found)
            ));
        }
        Ok(())
    }

    /// Consume bytes up to (not including) the first byte matching `stop`.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if no byte matches before the end of the data.
    pub fn take_until<F>(&mut self, stop: F) -> Result<&'a [u8]>
    where
        F: Fn(u8) -> bool,
    {
        let rest = &self.data[self.position..];
        let Some(len) = rest.iter().position(|&b| stop(b)) else {
            return Err(OutOfBounds);
        };

        self.position += len;
        Ok(&rest[..len])
    }
}
