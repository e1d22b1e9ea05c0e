use std::fmt;

/// Tag bytes of constant pool entries (JVMS §4.4).
pub const CONSTANT_UTF8: u8 = 1;
/// `CONSTANT_Integer`
pub const CONSTANT_INTEGER: u8 = 3;
/// `CONSTANT_Float`
pub const CONSTANT_FLOAT: u8 = 4;
/// `CONSTANT_Long`, occupies two slots
pub const CONSTANT_LONG: u8 = 5;
/// `CONSTANT_Double`, occupies two slots
pub const CONSTANT_DOUBLE: u8 = 6;
/// `CONSTANT_Class`
pub const CONSTANT_CLASS: u8 = 7;
/// `CONSTANT_String`
pub const CONSTANT_STRING: u8 = 8;
/// `CONSTANT_Fieldref`
pub const CONSTANT_FIELDREF: u8 = 9;
/// `CONSTANT_Methodref`
pub const CONSTANT_METHODREF: u8 = 10;
/// `CONSTANT_InterfaceMethodref`
pub const CONSTANT_INTERFACE_METHODREF: u8 = 11;
/// `CONSTANT_NameAndType`
pub const CONSTANT_NAME_AND_TYPE: u8 = 12;
/// `CONSTANT_MethodHandle`
pub const CONSTANT_METHOD_HANDLE: u8 = 15;
/// `CONSTANT_MethodType`
pub const CONSTANT_METHOD_TYPE: u8 = 16;
/// `CONSTANT_Dynamic`
pub const CONSTANT_DYNAMIC: u8 = 17;
/// `CONSTANT_InvokeDynamic`
pub const CONSTANT_INVOKE_DYNAMIC: u8 = 18;
/// `CONSTANT_Module`
pub const CONSTANT_MODULE: u8 = 19;
/// `CONSTANT_Package`
pub const CONSTANT_PACKAGE: u8 = 20;

/// One slot of the constant pool.
///
/// Structured entries hold the raw pool indices they reference; the pool resolves them on
/// demand.
#[derive(Debug, Clone, PartialEq)]
pub enum ConstantPoolEntry {
    /// Index 0 and the second slot of `Long`/`Double` entries
    Reserved,
    /// Decoded modified UTF-8 text
    Utf8(String),
    /// 32-bit integer (also backs `boolean`, `byte`, `char` and `short` constants)
    Integer(i32),
    /// 32-bit float
    Float(f32),
    /// 64-bit integer
    Long(i64),
    /// 64-bit float
    Double(f64),
    /// Class or array type, by internal name
    Class {
        /// Utf8 index of the internal name
        name_index: u16,
    },
    /// String literal
    String {
        /// Utf8 index of the text
        string_index: u16,
    },
    /// Field reference
    FieldRef {
        /// Class index of the owner
        class_index: u16,
        /// `NameAndType` index
        name_and_type_index: u16,
    },
    /// Method reference
    MethodRef {
        /// Class index of the owner
        class_index: u16,
        /// `NameAndType` index
        name_and_type_index: u16,
    },
    /// Interface method reference
    InterfaceMethodRef {
        /// Class index of the owner
        class_index: u16,
        /// `NameAndType` index
        name_and_type_index: u16,
    },
    /// Name and descriptor pair
    NameAndType {
        /// Utf8 index of the name
        name_index: u16,
        /// Utf8 index of the descriptor
        descriptor_index: u16,
    },
    /// Method handle
    MethodHandle {
        /// Kind of handle (1..=9)
        reference_kind: u8,
        /// Index of the referenced member
        reference_index: u16,
    },
    /// Method type
    MethodType {
        /// Utf8 index of the method descriptor
        descriptor_index: u16,
    },
    /// Dynamically computed constant
    Dynamic {
        /// Index into the `BootstrapMethods` attribute
        bootstrap_method_attr_index: u16,
        /// `NameAndType` index
        name_and_type_index: u16,
    },
    /// Dynamically computed call site
    InvokeDynamic {
        /// Index into the `BootstrapMethods` attribute
        bootstrap_method_attr_index: u16,
        /// `NameAndType` index
        name_and_type_index: u16,
    },
    /// Module name
    Module {
        /// Utf8 index of the module name
        name_index: u16,
    },
    /// Package name
    Package {
        /// Utf8 index of the package name
        name_index: u16,
    },
}

impl ConstantPoolEntry {
    /// Short name of the entry kind, used in error messages
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            ConstantPoolEntry::Reserved => "Reserved",
            ConstantPoolEntry::Utf8(_) => "Utf8",
            ConstantPoolEntry::Integer(_) => "Integer",
            ConstantPoolEntry::Float(_) => "Float",
            ConstantPoolEntry::Long(_) => "Long",
            ConstantPoolEntry::Double(_) => "Double",
            ConstantPoolEntry::Class { .. } => "Class",
            ConstantPoolEntry::String { .. } => "String",
            ConstantPoolEntry::FieldRef { .. } => "Fieldref",
            ConstantPoolEntry::MethodRef { .. } => "Methodref",
            ConstantPoolEntry::InterfaceMethodRef { .. } => "InterfaceMethodref",
            ConstantPoolEntry::NameAndType { .. } => "NameAndType",
            ConstantPoolEntry::MethodHandle { .. } => "MethodHandle",
            ConstantPoolEntry::MethodType { .. } => "MethodType",
            ConstantPoolEntry::Dynamic { .. } => "Dynamic",
            ConstantPoolEntry::InvokeDynamic { .. } => "InvokeDynamic",
            ConstantPoolEntry::Module { .. } => "Module",
            ConstantPoolEntry::Package { .. } => "Package",
        }
    }
}

/// A typed constant: a field initializer or an annotation element constant.
#[derive(Debug, Clone, PartialEq)]
pub enum ConstantValue {
    /// `boolean`
    Boolean(bool),
    /// `byte`
    Byte(i8),
    /// `char`; code units that are not a valid scalar value become `U+FFFD`
    Char(char),
    /// `short`
    Short(i16),
    /// `int`
    Int(i32),
    /// `long`
    Long(i64),
    /// `float`
    Float(f32),
    /// `double`
    Double(f64),
    /// `java.lang.String`
    String(String),
}

impl ConstantValue {
    /// Build a `char` constant from a UTF-16 code unit
    #[must_use]
    pub fn char_from_unit(unit: u16) -> ConstantValue {
        ConstantValue::Char(char::from_u32(u32::from(unit)).unwrap_or(char::REPLACEMENT_CHARACTER))
    }

    /// Returns the text of a `String` constant
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConstantValue::String(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for ConstantValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstantValue::Boolean(v) => write!(f, "{v}"),
            ConstantValue::Byte(v) => write!(f, "(byte) {v}"),
            ConstantValue::Char(v) => write!(f, "'{}'", v.escape_default()),
            ConstantValue::Short(v) => write!(f, "(short) {v}"),
            ConstantValue::Int(v) => write!(f, "{v}"),
            ConstantValue::Long(v) => write!(f, "{v}L"),
            ConstantValue::Float(v) => write!(f, "{v:?}f"),
            ConstantValue::Double(v) => write!(f, "{v:?}"),
            ConstantValue::String(v) => write!(f, "\"{}\"", v.escape_default()),
        }
    }
}

/// Convert an internal class name (`java/util/Map$Entry`) to dotted form (`java.util.Map$Entry`).
#[must_use]
pub fn internal_to_dotted(name: &str) -> String {
    name.replace('/', ".")
}

/// Convert a dotted class name back to internal form.
#[must_use]
pub fn dotted_to_internal(name: &str) -> String {
    name.replace('.', "/")
}
