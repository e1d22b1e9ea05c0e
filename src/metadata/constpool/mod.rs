//! Constant pool parsing and resolution.
//!
//! Every name, descriptor, signature and literal a class file mentions lives in its constant
//! pool (JVMS §4.4). The [`crate::metadata::constpool::ConstantPool`] parses the pool once into
//! an indexed table of [`crate::metadata::constpool::ConstantPoolEntry`] values; all later
//! lookups are O(1) and never mutate the table.
//!
//! # Indexing
//!
//! Pool indices are 1-based. Index 0 is reserved, and `Long`/`Double` entries occupy two
//! slots whose second slot is unusable. Both gaps are stored as
//! [`crate::metadata::constpool::ConstantPoolEntry::Reserved`] so that a raw index maps
//! directly onto the table.
//!
//! # Examples
//!
//! ```rust
//! use jvmscope::{metadata::constpool::ConstantPool, Parser};
//!
//! // count = 3: #1 Utf8 "a/B", #2 Class #1
//! let data = [0x00, 0x03, 0x01, 0x00, 0x03, b'a', b'/', b'B', 0x07, 0x00, 0x01];
//! let mut pool = ConstantPool::new();
//! pool.parse(&mut Parser::new(&data))?;
//!
//! assert_eq!(pool.utf8(1)?, "a/B");
//! assert_eq!(pool.class_name(2)?, "a.B");
//! assert!(pool.utf8(2).is_err());
//! # Ok::<(), jvmscope::Error>(())
//! ```

mod mutf8;
mod types;

pub use types::*;

use crate::{Parser, Result};

/// The parsed constant pool of one class file.
///
/// The table is reusable: [`crate::metadata::constpool::ConstantPool::parse`] clears it before
/// reading, so one pool can serve every class a decoder processes.
#[derive(Debug, Default)]
pub struct ConstantPool {
    entries: Vec<ConstantPoolEntry>,
}

impl ConstantPool {
    /// Create an empty pool
    #[must_use]
    pub fn new() -> Self {
        ConstantPool {
            entries: Vec::new(),
        }
    }

    /// Parse `constant_pool_count` and the entries following it.
    ///
    /// # Errors
    /// Returns a format error for unknown tags, truncated entries, a zero count, or a
    /// `Long`/`Double` entry in the last slot.
    pub fn parse(&mut self, parser: &mut Parser<'_>) -> Result<()> {
        self.entries.clear();

        let count = parser.read_be::<u16>()?;
        if count == 0 {
            return Err(malformed_error!("Constant pool count must be at least 1"));
        }

        self.entries.reserve(count as usize);
        self.entries.push(ConstantPoolEntry::Reserved);

        while self.entries.len() < count as usize {
            let index = self.entries.len();
            let tag = parser.read_be::<u8>()?;
            let entry = match tag {
                CONSTANT_UTF8 => {
                    let length = parser.read_be::<u16>()?;
                    let bytes = parser.read_bytes(length as usize)?;
                    ConstantPoolEntry::Utf8(mutf8::decode(bytes)?)
                }
                CONSTANT_INTEGER => ConstantPoolEntry::Integer(parser.read_be::<i32>()?),
                CONSTANT_FLOAT => ConstantPoolEntry::Float(parser.read_be::<f32>()?),
                CONSTANT_LONG => ConstantPoolEntry::Long(parser.read_be::<i64>()?),
                CONSTANT_DOUBLE => ConstantPoolEntry::Double(parser.read_be::<f64>()?),
                CONSTANT_CLASS => ConstantPoolEntry::Class {
                    name_index: parser.read_be::<u16>()?,
                },
                CONSTANT_STRING => ConstantPoolEntry::String {
                    string_index: parser.read_be::<u16>()?,
                },
                CONSTANT_FIELDREF => ConstantPoolEntry::FieldRef {
                    class_index: parser.read_be::<u16>()?,
                    name_and_type_index: parser.read_be::<u16>()?,
                },
                CONSTANT_METHODREF => ConstantPoolEntry::MethodRef {
                    class_index: parser.read_be::<u16>()?,
                    name_and_type_index: parser.read_be::<u16>()?,
                },
                CONSTANT_INTERFACE_METHODREF => ConstantPoolEntry::InterfaceMethodRef {
                    class_index: parser.read_be::<u16>()?,
                    name_and_type_index: parser.read_be::<u16>()?,
                },
                CONSTANT_NAME_AND_TYPE => ConstantPoolEntry::NameAndType {
                    name_index: parser.read_be::<u16>()?,
                    descriptor_index: parser.read_be::<u16>()?,
                },
                CONSTANT_METHOD_HANDLE => ConstantPoolEntry::MethodHandle {
                    reference_kind: parser.read_be::<u8>()?,
                    reference_index: parser.read_be::<u16>()?,
                },
                CONSTANT_METHOD_TYPE => ConstantPoolEntry::MethodType {
                    descriptor_index: parser.read_be::<u16>()?,
                },
                CONSTANT_DYNAMIC => ConstantPoolEntry::Dynamic {
                    bootstrap_method_attr_index: parser.read_be::<u16>()?,
                    name_and_type_index: parser.read_be::<u16>()?,
                },
                CONSTANT_INVOKE_DYNAMIC => ConstantPoolEntry::InvokeDynamic {
                    bootstrap_method_attr_index: parser.read_be::<u16>()?,
                    name_and_type_index: parser.read_be::<u16>()?,
                },
                CONSTANT_MODULE => ConstantPoolEntry::Module {
                    name_index: parser.read_be::<u16>()?,
                },
                CONSTANT_PACKAGE => ConstantPoolEntry::Package {
                    name_index: parser.read_be::<u16>()?,
                },
                _ => {
                    return Err(malformed_error!(
                        "Invalid constant pool tag {} at index {}",
                        tag,
                        index
                    ))
                }
            };

            let wide = matches!(
                entry,
                ConstantPoolEntry::Long(_) | ConstantPoolEntry::Double(_)
            );
            self.entries.push(entry);

            if wide {
                if self.entries.len() >= count as usize {
                    return Err(malformed_error!(
                        "8-byte constant at index {} overflows the pool",
                        index
                    ));
                }
                self.entries.push(ConstantPoolEntry::Reserved);
            }
        }

        Ok(())
    }

    /// Number of slots, including the reserved index 0
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing has been parsed
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop all entries, keeping the allocation
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Look up a usable entry.
    ///
    /// # Errors
    /// Returns a format error if `index` is out of range or names a reserved slot.
    pub fn get(&self, index: u16) -> Result<&ConstantPoolEntry> {
        match self.entries.get(index as usize) {
            Some(ConstantPoolEntry::Reserved) | None => Err(malformed_error!(
                "Invalid constant pool index {} (pool size {})",
                index,
                self.entries.len()
            )),
            Some(entry) => Ok(entry),
        }
    }

    fn wrong_tag(index: u16, expected: &str, found: &ConstantPoolEntry) -> crate::Error {
        malformed_error!(
            "Constant pool index {} - expected {}, found {}",
            index,
            expected,
            found.kind()
        )
    }

    /// Resolve a `Utf8` entry.
    ///
    /// # Errors
    /// Returns a format error on an invalid index or a non-`Utf8` entry.
    pub fn utf8(&self, index: u16) -> Result<&str> {
        match self.get(index)? {
            ConstantPoolEntry::Utf8(text) => Ok(text),
            other => Err(Self::wrong_tag(index, "Utf8", other)),
        }
    }

    /// Resolve a `Class` entry to its internal name (`java/lang/String`, `[I`, ...).
    ///
    /// # Errors
    /// Returns a format error on an invalid index or a non-`Class` entry.
    pub fn class_internal_name(&self, index: u16) -> Result<&str> {
        match self.get(index)? {
            ConstantPoolEntry::Class { name_index } => self.utf8(*name_index),
            other => Err(Self::wrong_tag(index, "Class", other)),
        }
    }

    /// Resolve a `Class` entry to a dotted fully-qualified name.
    ///
    /// # Errors
    /// Returns a format error on an invalid index or a non-`Class` entry.
    pub fn class_name(&self, index: u16) -> Result<String> {
        Ok(internal_to_dotted(self.class_internal_name(index)?))
    }

    /// Like [`crate::metadata::constpool::ConstantPool::class_name`], with index 0 meaning "none".
    ///
    /// # Errors
    /// Returns a format error on an invalid non-zero index or a non-`Class` entry.
    pub fn optional_class_name(&self, index: u16) -> Result<Option<String>> {
        if index == 0 {
            return Ok(None);
        }
        self.class_name(index).map(Some)
    }

    /// Resolve a `String` entry to its text.
    ///
    /// # Errors
    /// Returns a format error on an invalid index or a non-`String` entry.
    pub fn string(&self, index: u16) -> Result<&str> {
        match self.get(index)? {
            ConstantPoolEntry::String { string_index } => self.utf8(*string_index),
            other => Err(Self::wrong_tag(index, "String", other)),
        }
    }

    /// Resolve a `NameAndType` entry to `(name, descriptor)`.
    ///
    /// # Errors
    /// Returns a format error on an invalid index or a non-`NameAndType` entry.
    pub fn name_and_type(&self, index: u16) -> Result<(&str, &str)> {
        match self.get(index)? {
            ConstantPoolEntry::NameAndType {
                name_index,
                descriptor_index,
            } => Ok((self.utf8(*name_index)?, self.utf8(*descriptor_index)?)),
            other => Err(Self::wrong_tag(index, "NameAndType", other)),
        }
    }

    /// Resolve a loadable constant typed by a field descriptor.
    ///
    /// `Z`, `B`, `C`, `S` and `I` read an `Integer` entry, `J` a `Long`, `F` a `Float`, `D`
    /// a `Double` and `Ljava/lang/String;` a `String`.
    ///
    /// # Errors
    /// Returns a format error if the entry does not match the descriptor, or if the
    /// descriptor is not a constant-capable type.
    pub fn constant_value(&self, index: u16, descriptor: &str) -> Result<ConstantValue> {
        let entry = self.get(index)?;
        let value = match (descriptor, entry) {
            ("Z", ConstantPoolEntry::Integer(v)) => ConstantValue::Boolean(*v != 0),
            ("B", ConstantPoolEntry::Integer(v)) => ConstantValue::Byte(*v as i8),
            ("C", ConstantPoolEntry::Integer(v)) => ConstantValue::char_from_unit(*v as u16),
            ("S", ConstantPoolEntry::Integer(v)) => ConstantValue::Short(*v as i16),
            ("I", ConstantPoolEntry::Integer(v)) => ConstantValue::Int(*v),
            ("J", ConstantPoolEntry::Long(v)) => ConstantValue::Long(*v),
            ("F", ConstantPoolEntry::Float(v)) => ConstantValue::Float(*v),
            ("D", ConstantPoolEntry::Double(v)) => ConstantValue::Double(*v),
            ("Ljava/lang/String;", ConstantPoolEntry::String { string_index }) => {
                ConstantValue::String(self.utf8(*string_index)?.to_string())
            }
            _ => {
                return Err(malformed_error!(
                    "Constant pool index {} ({}) cannot initialize a value of type {}",
                    index,
                    entry.kind(),
                    descriptor
                ))
            }
        };

        Ok(value)
    }

    /// Dotted names of every class named by a `Class` entry.
    ///
    /// Array entries contribute their element class; primitive arrays contribute nothing.
    /// Entries whose name index is broken are skipped.
    pub fn class_names(&self) -> impl Iterator<Item = String> + '_ {
        self.entries.iter().filter_map(|entry| match entry {
            ConstantPoolEntry::Class { name_index } => {
                let name = self.utf8(*name_index).ok()?;
                let element = name.trim_start_matches('[');
                if element.len() == name.len() {
                    Some(internal_to_dotted(name))
                } else {
                    element
                        .strip_prefix('L')
                        .and_then(|e| e.strip_suffix(';'))
                        .map(internal_to_dotted)
                }
            }
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utf8(out: &mut Vec<u8>, text: &str) {
        out.push(CONSTANT_UTF8);
        out.extend_from_slice(&(text.len() as u16).to_be_bytes());
        out.extend_from_slice(text.as_bytes());
    }

    fn sample() -> ConstantPool {
        let mut data = vec![0x00, 0x0C];
        utf8(&mut data, "a/B"); // 1
        data.extend_from_slice(&[CONSTANT_CLASS, 0x00, 0x01]); // 2
        data.push(CONSTANT_LONG); // 3, 4
        data.extend_from_slice(&7_i64.to_be_bytes());
        data.push(CONSTANT_INTEGER); // 5
        data.extend_from_slice(&65_i32.to_be_bytes());
        utf8(&mut data, "hello"); // 6
        data.extend_from_slice(&[CONSTANT_STRING, 0x00, 0x06]); // 7
        utf8(&mut data, "[[Lc/D;"); // 8
        data.extend_from_slice(&[CONSTANT_CLASS, 0x00, 0x08]); // 9
        data.extend_from_slice(&[CONSTANT_NAME_AND_TYPE, 0x00, 0x06, 0x00, 0x01]); // 10
        data.push(CONSTANT_FLOAT); // 11
        data.extend_from_slice(&2.5_f32.to_be_bytes());

        let mut pool = ConstantPool::new();
        pool.parse(&mut Parser::new(&data)).unwrap();
        pool
    }

    #[test]
    fn resolution() {
        let pool = sample();
        assert_eq!(pool.len(), 12);
        assert_eq!(pool.utf8(1).unwrap(), "a/B");
        assert_eq!(pool.class_name(2).unwrap(), "a.B");
        assert_eq!(pool.optional_class_name(0).unwrap(), None);
        assert_eq!(pool.string(7).unwrap(), "hello");
        assert_eq!(pool.name_and_type(10).unwrap(), ("hello", "a/B"));
        assert_eq!(pool.get(3).unwrap(), &ConstantPoolEntry::Long(7));
    }

    #[test]
    fn reserved_and_wrong_tags() {
        let pool = sample();
        assert!(pool.get(0).is_err());
        assert!(pool.get(4).is_err());
        assert!(pool.get(12).is_err());
        assert!(pool.utf8(2).is_err());
        assert!(pool.class_name(1).is_err());
        assert!(pool.string(6).is_err());
    }

    #[test]
    fn typed_constants() {
        let pool = sample();
        assert_eq!(pool.constant_value(5, "I").unwrap(), ConstantValue::Int(65));
        assert_eq!(pool.constant_value(5, "C").unwrap(), ConstantValue::Char('A'));
        assert_eq!(pool.constant_value(5, "Z").unwrap(), ConstantValue::Boolean(true));
        assert_eq!(pool.constant_value(3, "J").unwrap(), ConstantValue::Long(7));
        assert_eq!(pool.constant_value(11, "F").unwrap(), ConstantValue::Float(2.5));
        assert_eq!(
            pool.constant_value(7, "Ljava/lang/String;").unwrap(),
            ConstantValue::String("hello".into())
        );
        assert!(pool.constant_value(3, "I").is_err());
        assert!(pool.constant_value(7, "Ljava/lang/Object;").is_err());
    }

    #[test]
    fn class_names_unwrap_arrays() {
        let pool = sample();
        let names: Vec<String> = pool.class_names().collect();
        assert_eq!(names, ["a.B", "c.D"]);
    }

    #[test]
    fn invalid_pools() {
        let mut pool = ConstantPool::new();
        assert!(pool.parse(&mut Parser::new(&[0x00, 0x00])).is_err());
        assert!(pool.parse(&mut Parser::new(&[0x00, 0x02, 0x02])).is_err());
        assert!(pool.parse(&mut Parser::new(&[0x00, 0x02, 0x01, 0x00])).is_err());

        // Long in the last slot
        let mut data = vec![0x00, 0x02, CONSTANT_LONG];
        data.extend_from_slice(&1_i64.to_be_bytes());
        assert!(pool.parse(&mut Parser::new(&data)).is_err());
    }

    #[test]
    fn reuse_clears_previous_entries() {
        let mut pool = sample();
        pool.parse(&mut Parser::new(&[0x00, 0x01])).unwrap();
        assert_eq!(pool.len(), 1);
        assert!(pool.utf8(1).is_err());
    }
}
