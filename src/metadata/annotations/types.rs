use std::fmt;

use crate::metadata::{constpool::ConstantValue, signatures::TypeSignature};

/// One annotation occurrence: the annotation type and its explicit element values.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationInstance {
    /// Dotted name of the annotation type
    pub name: String,
    /// Explicitly given element values, in class file order
    pub parameters: Vec<(String, AnnotationValue)>,
}

impl AnnotationInstance {
    /// An annotation without explicit element values
    pub fn new(name: impl Into<String>) -> AnnotationInstance {
        AnnotationInstance {
            name: name.into(),
            parameters: Vec::new(),
        }
    }

    /// Add an element value
    #[must_use]
    pub fn with_parameter(mut self, name: impl Into<String>, value: AnnotationValue) -> Self {
        self.parameters.push((name.into(), value));
        self
    }

    /// Look up an explicitly given element value
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&AnnotationValue> {
        self.parameters
            .iter()
            .find(|(param, _)| param == name)
            .map(|(_, value)| value)
    }

    /// Append the dotted names of every class this annotation mentions: its type, enum
    /// types, class literals and nested annotations.
    pub fn collect_class_names(&self, out: &mut Vec<String>) {
        out.push(self.name.clone());
        for (_, value) in &self.parameters {
            value.collect_class_names(out);
        }
    }
}

/// An annotation element value (JVMS §4.7.16.1).
#[derive(Debug, Clone, PartialEq)]
pub enum AnnotationValue {
    /// Primitive or `String` constant
    Constant(ConstantValue),
    /// Enum constant reference
    Enum {
        /// Dotted name of the enum type
        type_name: String,
        /// Simple name of the constant
        constant_name: String,
    },
    /// Class literal; may be a primitive or `void`
    Class(TypeSignature),
    /// Nested annotation
    Annotation(Box<AnnotationInstance>),
    /// Array of values
    Array(Vec<AnnotationValue>),
}

impl AnnotationValue {
    /// The constant, if this is one
    #[must_use]
    pub fn as_constant(&self) -> Option<&ConstantValue> {
        match self {
            AnnotationValue::Constant(value) => Some(value),
            _ => None,
        }
    }

    /// The text, if this is a `String` constant
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        self.as_constant().and_then(ConstantValue::as_str)
    }

    /// The elements, if this is an array
    #[must_use]
    pub fn as_array(&self) -> Option<&[AnnotationValue]> {
        match self {
            AnnotationValue::Array(values) => Some(values),
            _ => None,
        }
    }

    fn collect_class_names(&self, out: &mut Vec<String>) {
        match self {
            AnnotationValue::Constant(_) => {}
            AnnotationValue::Enum { type_name, .. } => out.push(type_name.clone()),
            AnnotationValue::Class(ty) => ty.collect_class_names(out),
            AnnotationValue::Annotation(annotation) => annotation.collect_class_names(out),
            AnnotationValue::Array(values) => {
                for value in values {
                    value.collect_class_names(out);
                }
            }
        }
    }
}

impl fmt::Display for AnnotationInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.name)?;
        if self.parameters.is_empty() {
            return Ok(());
        }

        write!(f, "(")?;
        for (i, (name, value)) in self.parameters.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{name}={value}")?;
        }
        write!(f, ")")
    }
}

impl fmt::Display for AnnotationValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnnotationValue::Constant(value) => write!(f, "{value}"),
            AnnotationValue::Enum {
                type_name,
                constant_name,
            } => write!(f, "{type_name}.{constant_name}"),
            AnnotationValue::Class(ty) => write!(f, "{ty}.class"),
            AnnotationValue::Annotation(annotation) => write!(f, "{annotation}"),
            AnnotationValue::Array(values) => {
                write!(f, "{{")?;
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{value}")?;
                }
                write!(f, "}}")
            }
        }
    }
}
