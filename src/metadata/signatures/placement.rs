//! Placing type-use annotations onto the node of a type a `type_path` names.
//!
//! A type annotation's `type_path` (JVMS §4.7.20.2) is a sequence of steps from the outermost
//! type down to the annotated node:
//!
//! - [`crate::metadata::signatures::TypePathStep::ArrayElement`] moves one array dimension inward
//! - [`crate::metadata::signatures::TypePathStep::Nested`] moves one nested-class segment inward
//! - [`crate::metadata::signatures::TypePathStep::WildcardBound`] moves onto a wildcard's bound
//! - [`crate::metadata::signatures::TypePathStep::TypeArgument`] moves onto type argument `i`
//!
//! A path naming a node that does not exist in the type is malformed.

use std::fmt;

use crate::{
    metadata::{
        annotations::AnnotationInstance,
        signatures::{ClassSegment, ClassTypeSignature, TypeSignature},
    },
    Result,
};

/// One step of a type path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypePathStep {
    /// `type_path_kind` 0
    ArrayElement,
    /// `type_path_kind` 1
    Nested,
    /// `type_path_kind` 2
    WildcardBound,
    /// `type_path_kind` 3 with its `type_argument_index`
    TypeArgument(u8),
}

impl TypePathStep {
    /// Decode a `(type_path_kind, type_argument_index)` pair
    ///
    /// # Errors
    /// Returns a format error for an unknown kind or a non-zero index on a kind that has none
    pub fn from_raw(kind: u8, argument_index: u8) -> Result<TypePathStep> {
        match (kind, argument_index) {
            (0, 0) => Ok(TypePathStep::ArrayElement),
            (1, 0) => Ok(TypePathStep::Nested),
            (2, 0) => Ok(TypePathStep::WildcardBound),
            (3, index) => Ok(TypePathStep::TypeArgument(index)),
            _ => Err(malformed_error!(
                "Invalid type path step - kind {}, argument {}",
                kind,
                argument_index
            )),
        }
    }
}

/// A complete type path; empty means "the type itself".
pub type TypePath = Vec<TypePathStep>;

struct DisplayPath<'a>(&'a [TypePathStep]);

impl fmt::Display for DisplayPath<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, step) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            match step {
                TypePathStep::ArrayElement => write!(f, "[]")?,
                TypePathStep::Nested => write!(f, ".")?,
                TypePathStep::WildcardBound => write!(f, "*")?,
                TypePathStep::TypeArgument(i) => write!(f, "{i}")?,
            }
        }
        write!(f, "]")
    }
}

fn invalid_path(path: &[TypePathStep], ty: &dyn fmt::Display) -> crate::Error {
    malformed_error!(
        "Type path {} does not name a node of type {}",
        DisplayPath(path),
        ty
    )
}

impl TypeSignature {
    /// Attach `annotation` to the node `path` names.
    ///
    /// # Errors
    /// Returns a format error if the path names a node that does not exist.
    pub fn attach_annotation(
        &mut self,
        path: &[TypePathStep],
        annotation: AnnotationInstance,
    ) -> Result<()> {
        match self {
            TypeSignature::Primitive { annotations, .. }
            | TypeSignature::TypeVariable { annotations, .. } => {
                if !path.is_empty() {
                    return Err(invalid_path(path, &*self));
                }
                annotations.push(annotation);
                Ok(())
            }
            TypeSignature::Class(class) => class.attach_annotation(path, annotation),
            TypeSignature::Array {
                element,
                dimension_annotations,
            } => {
                let depth = path
                    .iter()
                    .take_while(|step| **step == TypePathStep::ArrayElement)
                    .count();

                if depth < dimension_annotations.len() {
                    if depth != path.len() {
                        return Err(malformed_error!(
                            "Type path {} leaves an array before reaching its element",
                            DisplayPath(path)
                        ));
                    }
                    dimension_annotations[depth].push(annotation);
                    return Ok(());
                }

                let dimensions = dimension_annotations.len();
                element.attach_annotation(&path[dimensions..], annotation)
            }
            TypeSignature::Wildcard {
                bound, annotations, ..
            } => match path.split_first() {
                None => {
                    annotations.push(annotation);
                    Ok(())
                }
                Some((TypePathStep::WildcardBound, rest)) => match bound {
                    Some(bound) => bound.attach_annotation(rest, annotation),
                    None => Err(malformed_error!(
                        "Type path {} names the bound of an unbounded wildcard",
                        DisplayPath(path)
                    )),
                },
                Some(_) => Err(invalid_path(path, &*self)),
            },
        }
    }
}

impl ClassTypeSignature {
    /// Attach `annotation` to the node `path` names, starting at this class type.
    ///
    /// Descriptors, and signatures of inner classes of non-generic classes, spell nested
    /// classes as one `Outer$Inner` segment. When a path steps into more nested segments
    /// than the type has, the trailing segment is split at its `$` separators first; its
    /// type arguments move to the innermost part and its annotations to the outermost.
    ///
    /// # Errors
    /// Returns a format error if the path names a node that does not exist.
    pub fn attach_annotation(
        &mut self,
        path: &[TypePathStep],
        annotation: AnnotationInstance,
    ) -> Result<()> {
        let nested = path
            .iter()
            .take_while(|step| **step == TypePathStep::Nested)
            .count();

        if nested >= self.segments.len() {
            self.split_nested_segments();
        }

        let Some(segment) = self.segments.get_mut(nested) else {
            return Err(invalid_path(path, &*self));
        };

        match path[nested..].split_first() {
            None => {
                segment.annotations.push(annotation);
                Ok(())
            }
            Some((TypePathStep::TypeArgument(index), rest)) => {
                match segment.type_arguments.get_mut(*index as usize) {
                    Some(argument) => argument.attach_annotation(rest, annotation),
                    None => Err(malformed_error!(
                        "Type path {} names missing type argument {} of {}",
                        DisplayPath(path),
                        index,
                        segment.name
                    )),
                }
            }
            Some(_) => Err(invalid_path(path, &*self)),
        }
    }

    fn split_nested_segments(&mut self) {
        let Some(last) = self.segments.last() else {
            return;
        };

        // The outermost segment carries the package; `$` inside the package is not a nesting
        let package_end = if self.segments.len() == 1 {
            last.name.rfind('.').map_or(0, |i| i + 1)
        } else {
            0
        };
        if !last.name[package_end..].contains('$') {
            return;
        }

        let Some(last) = self.segments.pop() else {
            return;
        };
        let ClassSegment {
            name,
            mut annotations,
            mut type_arguments,
        } = last;
        let (package, simple) = name.split_at(package_end);
        let parts: Vec<&str> = simple.split('$').collect();
        let innermost = parts.len() - 1;
        for (i, part) in parts.into_iter().enumerate() {
            let mut segment = ClassSegment {
                name: if i == 0 {
                    format!("{package}{part}")
                } else {
                    part.to_string()
                },
                ..ClassSegment::default()
            };
            if i == 0 {
                segment.annotations = std::mem::take(&mut annotations);
            }
            if i == innermost {
                segment.type_arguments = std::mem::take(&mut type_arguments);
            }
            self.segments.push(segment);
        }
    }
}
