//! Access flags of classes, fields and methods (JVMS Tables 4.1-B, 4.5-A, 4.6-A).
//!
//! The three flag sets share bit values with different meanings (0x0040 is `volatile` on a
//! field and `bridge` on a method), so each gets its own type.

use std::fmt;

use bitflags::bitflags;
use strum::Display;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    /// Class access and property flags
    pub struct ClassModifiers: u16 {
        /// Declared `public`
        const PUBLIC = 0x0001;
        /// Declared `private` (inner class flags only)
        const PRIVATE = 0x0002;
        /// Declared `protected` (inner class flags only)
        const PROTECTED = 0x0004;
        /// Declared `static` (inner class flags only)
        const STATIC = 0x0008;
        /// Declared `final`
        const FINAL = 0x0010;
        /// Treat superclass methods specially when invoked by `invokespecial`
        const SUPER = 0x0020;
        /// Is an interface
        const INTERFACE = 0x0200;
        /// Declared `abstract`
        const ABSTRACT = 0x0400;
        /// Not present in source
        const SYNTHETIC = 0x1000;
        /// Is an annotation interface
        const ANNOTATION = 0x2000;
        /// Is an enum class
        const ENUM = 0x4000;
        /// Is a module descriptor
        const MODULE = 0x8000;
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    /// Field access and property flags
    pub struct FieldModifiers: u16 {
        /// Declared `public`
        const PUBLIC = 0x0001;
        /// Declared `private`
        const PRIVATE = 0x0002;
        /// Declared `protected`
        const PROTECTED = 0x0004;
        /// Declared `static`
        const STATIC = 0x0008;
        /// Declared `final`
        const FINAL = 0x0010;
        /// Declared `volatile`
        const VOLATILE = 0x0040;
        /// Declared `transient`
        const TRANSIENT = 0x0080;
        /// Not present in source
        const SYNTHETIC = 0x1000;
        /// Element of an enum class
        const ENUM = 0x4000;
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    /// Method access and property flags
    pub struct MethodModifiers: u16 {
        /// Declared `public`
        const PUBLIC = 0x0001;
        /// Declared `private`
        const PRIVATE = 0x0002;
        /// Declared `protected`
        const PROTECTED = 0x0004;
        /// Declared `static`
        const STATIC = 0x0008;
        /// Declared `final`
        const FINAL = 0x0010;
        /// Declared `synchronized`
        const SYNCHRONIZED = 0x0020;
        /// A bridge method, generated by the compiler
        const BRIDGE = 0x0040;
        /// Declared with a variable number of arguments
        const VARARGS = 0x0080;
        /// Declared `native`
        const NATIVE = 0x0100;
        /// Declared `abstract`
        const ABSTRACT = 0x0400;
        /// Declared `strictfp`
        const STRICT = 0x0800;
        /// Not present in source
        const SYNTHETIC = 0x1000;
    }
}

/// Java keywords for the given `(flag, keyword)` table, in source order
fn write_keywords<F: bitflags::Flags + Copy>(
    f: &mut fmt::Formatter<'_>,
    flags: F,
    table: &[(F, &str)],
) -> fmt::Result {
    let mut first = true;
    for (flag, keyword) in table {
        if flags.contains(*flag) {
            if !first {
                write!(f, " ")?;
            }
            write!(f, "{keyword}")?;
            first = false;
        }
    }
    Ok(())
}

impl fmt::Display for ClassModifiers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // `abstract` is implied for interfaces and not written in source
        let mut flags = *self;
        if flags.contains(ClassModifiers::INTERFACE) {
            flags.remove(ClassModifiers::ABSTRACT);
        }
        write_keywords(
            f,
            flags,
            &[
                (ClassModifiers::PUBLIC, "public"),
                (ClassModifiers::PROTECTED, "protected"),
                (ClassModifiers::PRIVATE, "private"),
                (ClassModifiers::ABSTRACT, "abstract"),
                (ClassModifiers::STATIC, "static"),
                (ClassModifiers::FINAL, "final"),
                (ClassModifiers::SYNTHETIC, "synthetic"),
            ],
        )
    }
}

impl fmt::Display for FieldModifiers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_keywords(
            f,
            *self,
            &[
                (FieldModifiers::PUBLIC, "public"),
                (FieldModifiers::PROTECTED, "protected"),
                (FieldModifiers::PRIVATE, "private"),
                (FieldModifiers::STATIC, "static"),
                (FieldModifiers::FINAL, "final"),
                (FieldModifiers::TRANSIENT, "transient"),
                (FieldModifiers::VOLATILE, "volatile"),
                (FieldModifiers::SYNTHETIC, "synthetic"),
            ],
        )
    }
}

impl fmt::Display for MethodModifiers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_keywords(
            f,
            *self,
            &[
                (MethodModifiers::PUBLIC, "public"),
                (MethodModifiers::PROTECTED, "protected"),
                (MethodModifiers::PRIVATE, "private"),
                (MethodModifiers::ABSTRACT, "abstract"),
                (MethodModifiers::STATIC, "static"),
                (MethodModifiers::FINAL, "final"),
                (MethodModifiers::SYNCHRONIZED, "synchronized"),
                (MethodModifiers::NATIVE, "native"),
                (MethodModifiers::STRICT, "strictfp"),
                (MethodModifiers::SYNTHETIC, "synthetic"),
                (MethodModifiers::BRIDGE, "bridge"),
            ],
        )
    }
}

/// What kind of type a class file declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum ClassKind {
    /// A regular (possibly abstract) class
    #[strum(serialize = "class")]
    Class,
    /// An interface that is not an annotation type
    #[strum(serialize = "interface")]
    Interface,
    /// An annotation interface (`@interface`)
    #[strum(serialize = "@interface")]
    AnnotationType,
    /// An enum class
    #[strum(serialize = "enum")]
    Enum,
}

impl ClassKind {
    /// Derive the kind from class access flags; the annotation flag takes precedence over
    /// the interface flag
    #[must_use]
    pub fn from_modifiers(modifiers: ClassModifiers) -> ClassKind {
        if modifiers.contains(ClassModifiers::ANNOTATION) {
            ClassKind::AnnotationType
        } else if modifiers.contains(ClassModifiers::INTERFACE) {
            ClassKind::Interface
        } else if modifiers.contains(ClassModifiers::ENUM) {
            ClassKind::Enum
        } else {
            ClassKind::Class
        }
    }

    /// Interfaces and annotation types
    #[must_use]
    pub fn is_interface(self) -> bool {
        matches!(self, ClassKind::Interface | ClassKind::AnnotationType)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds() {
        let annotation =
            ClassModifiers::INTERFACE | ClassModifiers::ABSTRACT | ClassModifiers::ANNOTATION;
        assert_eq!(ClassKind::from_modifiers(annotation), ClassKind::AnnotationType);
        assert_eq!(
            ClassKind::from_modifiers(ClassModifiers::INTERFACE),
            ClassKind::Interface
        );
        assert_eq!(
            ClassKind::from_modifiers(ClassModifiers::ENUM | ClassModifiers::FINAL),
            ClassKind::Enum
        );
        assert_eq!(ClassKind::from_modifiers(ClassModifiers::PUBLIC), ClassKind::Class);
        assert!(ClassKind::AnnotationType.is_interface());
        assert_eq!(ClassKind::AnnotationType.to_string(), "@interface");
    }

    #[test]
    fn shared_bits_differ() {
        let field = FieldModifiers::from_bits_truncate(0x0040);
        let method = MethodModifiers::from_bits_truncate(0x0040);
        assert_eq!(field, FieldModifiers::VOLATILE);
        assert_eq!(method, MethodModifiers::BRIDGE);
    }

    #[test]
    fn keywords() {
        let class = ClassModifiers::PUBLIC | ClassModifiers::INTERFACE | ClassModifiers::ABSTRACT;
        assert_eq!(class.to_string(), "public");

        let field = FieldModifiers::PRIVATE | FieldModifiers::STATIC | FieldModifiers::FINAL;
        assert_eq!(field.to_string(), "private static final");

        let method = MethodModifiers::PUBLIC | MethodModifiers::SYNCHRONIZED;
        assert_eq!(method.to_string(), "public synchronized");
    }
}
