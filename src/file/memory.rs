//! In-memory class byte source.

use std::borrow::Cow;

use super::ByteSource;
use crate::Result;

/// The bytes of one class, already held in memory.
#[derive(Debug, Clone)]
pub struct ClassBytes {
    identifier: String,
    data: Vec<u8>,
}

impl ClassBytes {
    /// Create a new in-memory source
    pub fn new(identifier: impl Into<String>, data: Vec<u8>) -> ClassBytes {
        ClassBytes {
            identifier: identifier.into(),
            data,
        }
    }

    /// Length of the held data
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if no bytes are held
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl ByteSource for ClassBytes {
    fn identifier(&self) -> &str {
        &self.identifier
    }

    fn read_bytes(&self) -> Result<Cow<'_, [u8]>> {
        Ok(Cow::Borrowed(&self.data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory() {
        let mut data = vec![0xCC_u8; 64];
        data[10] = 0xBB;

        let memory = ClassBytes::new("pkg/Thing.class", data);
        assert_eq!(memory.len(), 64);
        assert!(!memory.is_empty());

        let bytes = memory.read_bytes().unwrap();
        assert!(matches!(bytes, Cow::Borrowed(_)));
        assert_eq!(bytes[10], 0xBB);
        assert_eq!(bytes[11], 0xCC);
    }
}
