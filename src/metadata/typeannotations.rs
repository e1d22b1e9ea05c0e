//! Type-use annotation side table.
//!
//! `Runtime*TypeAnnotations` attributes (JVMS §4.7.20) do not annotate a declaration; they
//! annotate one occurrence of a type inside the declaration's signature. Each entry names
//! the signature position through a target (which type in the declaration) and a
//! [`crate::metadata::signatures::TypePath`] (which node within that type).
//!
//! The decoder first collects these entries as
//! [`crate::metadata::typeannotations::TypeAnnotationRecord`]s, then places each annotation
//! onto the parsed signature of its class, field or method once that signature is known.

use crate::{
    file::parser::Parser,
    metadata::{
        annotations::{AnnotationInstance, AnnotationParser},
        constpool::ConstantPool,
        signatures::{TypePath, TypePathStep},
    },
    Result,
};

/// `supertype_index` value denoting the superclass
pub const SUPERCLASS_INDEX: u16 = 0xFFFF;

/// Which type of a declaration a type annotation belongs to (JVMS Table 4.7.20-A/B/C).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeAnnotationTarget {
    /// 0x00 - type parameter declaration of a generic class or interface
    ClassTypeParameter(u8),
    /// 0x01 - type parameter declaration of a generic method
    MethodTypeParameter(u8),
    /// 0x10 - superclass ([`SUPERCLASS_INDEX`]) or interface `i` of `implements`/`extends`
    Supertype(u16),
    /// 0x11 - bound of a class type parameter
    ClassTypeParameterBound {
        /// Type parameter index
        parameter: u8,
        /// 0 is the class bound, `i > 0` is interface bound `i - 1`
        bound: u8,
    },
    /// 0x12 - bound of a method type parameter
    MethodTypeParameterBound {
        /// Type parameter index
        parameter: u8,
        /// 0 is the class bound, `i > 0` is interface bound `i - 1`
        bound: u8,
    },
    /// 0x13 - type in a field declaration
    Field,
    /// 0x14 - method result type (or the type of a newly constructed object)
    Return,
    /// 0x15 - receiver type of a method
    Receiver,
    /// 0x16 - type of formal parameter `i`
    FormalParameter(u8),
    /// 0x17 - type `i` of the `throws` clause
    Throws(u16),
    /// 0x40..=0x4B - type inside a method body; only valid within `Code`
    Code,
}

/// One decoded `type_annotation` entry.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeAnnotationRecord {
    /// The type the annotation applies to
    pub target: TypeAnnotationTarget,
    /// The node within that type
    pub path: TypePath,
    /// The annotation itself
    pub annotation: AnnotationInstance,
}

/// Parse a `Runtime*TypeAnnotations` attribute body.
///
/// # Errors
/// Returns a format error for unknown target types, invalid type path steps, or malformed
/// annotations.
pub fn parse_type_annotations(
    parser: &mut Parser<'_>,
    pool: &ConstantPool,
) -> Result<Vec<TypeAnnotationRecord>> {
    let count = parser.read_be::<u16>()?;
    let mut records = Vec::with_capacity(count as usize);

    for _ in 0..count {
        let target = parse_target(parser)?;

        let length = parser.read_be::<u8>()?;
        let mut path = Vec::with_capacity(length as usize);
        for _ in 0..length {
            let kind = parser.read_be::<u8>()?;
            let argument_index = parser.read_be::<u8>()?;
            path.push(TypePathStep::from_raw(kind, argument_index)?);
        }

        let annotation = AnnotationParser::new(parser, pool).parse_annotation()?;
        records.push(TypeAnnotationRecord {
            target,
            path,
            annotation,
        });
    }

    Ok(records)
}

fn parse_target(parser: &mut Parser<'_>) -> Result<TypeAnnotationTarget> {
    let target_type = parser.read_be::<u8>()?;
    let target = match target_type {
        0x00 => TypeAnnotationTarget::ClassTypeParameter(parser.read_be::<u8>()?),
        0x01 => TypeAnnotationTarget::MethodTypeParameter(parser.read_be::<u8>()?),
        0x10 => TypeAnnotationTarget::Supertype(parser.read_be::<u16>()?),
        0x11 => TypeAnnotationTarget::ClassTypeParameterBound {
            parameter: parser.read_be::<u8>()?,
            bound: parser.read_be::<u8>()?,
        },
        0x12 => TypeAnnotationTarget::MethodTypeParameterBound {
            parameter: parser.read_be::<u8>()?,
            bound: parser.read_be::<u8>()?,
        },
        0x13 => TypeAnnotationTarget::Field,
        0x14 => TypeAnnotationTarget::Return,
        0x15 => TypeAnnotationTarget::Receiver,
        0x16 => TypeAnnotationTarget::FormalParameter(parser.read_be::<u8>()?),
        0x17 => TypeAnnotationTarget::Throws(parser.read_be::<u16>()?),
        0x40 | 0x41 => {
            // localvar_target: table of {start_pc, length, index}
            let table_length = parser.read_be::<u16>()?;
            parser.advance_by(table_length as usize * 6)?;
            TypeAnnotationTarget::Code
        }
        0x42..=0x46 => {
            // catch_target / offset_target
            parser.advance_by(2)?;
            TypeAnnotationTarget::Code
        }
        0x47..=0x4B => {
            // type_argument_target: offset and type argument index
            parser.advance_by(3)?;
            TypeAnnotationTarget::Code
        }
        _ => {
            return Err(malformed_error!(
                "Invalid type annotation target type 0x{:02X}",
                target_type
            ))
        }
    };

    Ok(target)
}
