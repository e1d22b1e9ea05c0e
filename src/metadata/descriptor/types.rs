use std::{fmt, sync::Arc};

use crate::metadata::{
    annotations::{AnnotationInstance, AnnotationValue},
    constpool::ConstantValue,
    descriptor::{ClassKind, ClassModifiers, FieldModifiers, MethodModifiers},
    signatures::{ClassSignature, MethodSignature, TypeSignature},
};

/// A reference-counted, immutable class descriptor
pub type ClassDescriptorRc = Arc<ClassDescriptor>;

/// The method or class a local or anonymous class is declared in (`EnclosingMethod`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnclosingMethod {
    /// Dotted name of the innermost enclosing class
    pub class_name: String,
    /// Name of the enclosing method; absent for classes in initializers
    pub method_name: Option<String>,
    /// Descriptor of the enclosing method
    pub method_descriptor: Option<String>,
}

/// The parsed, immutable representation of one compiled class.
#[derive(Debug, Clone)]
pub struct ClassDescriptor {
    /// Fully qualified binary name, dotted (`pkg.Outer$Inner`)
    pub name: String,
    /// Declared kind
    pub kind: ClassKind,
    /// Access flags; for nested classes merged with the flags from `InnerClasses`
    pub modifiers: ClassModifiers,
    /// Class file major version
    pub major_version: u16,
    /// Class file minor version
    pub minor_version: u16,
    /// Superclass name; absent for interfaces, annotation types and `java.lang.Object`
    pub superclass: Option<String>,
    /// Directly implemented (or, for interfaces, extended) interfaces, in declaration order
    pub interfaces: Vec<String>,
    /// Generic class signature, with supertype and type parameter annotations placed
    pub signature: Option<ClassSignature>,
    /// Declaration annotations
    pub annotations: Vec<AnnotationInstance>,
    /// Directly enclosing class of a member, local or anonymous class
    pub outer_class: Option<String>,
    /// Member classes declared directly in this class
    pub inner_classes: Vec<String>,
    /// Enclosing method, for local and anonymous classes
    pub enclosing_method: Option<EnclosingMethod>,
    /// `SourceFile` attribute
    pub source_file: Option<String>,
    /// Declared fields
    pub fields: Vec<FieldDescriptor>,
    /// Declared methods, including constructors and initializers
    pub methods: Vec<MethodDescriptor>,
    /// Every class named by the constant pool or by a signature, sorted and without this
    /// class itself
    pub referenced_classes: Vec<String>,
    /// Identifier of the byte source
    pub source: String,
    /// Position of the byte source in the scan input
    pub source_index: usize,
}

impl ClassDescriptor {
    /// Returns `true` for interfaces and annotation types
    #[must_use]
    pub fn is_interface(&self) -> bool {
        self.kind.is_interface()
    }

    /// Returns `true` for annotation types
    #[must_use]
    pub fn is_annotation(&self) -> bool {
        self.kind == ClassKind::AnnotationType
    }

    /// Package part of the name, empty for the unnamed package
    #[must_use]
    pub fn package_name(&self) -> &str {
        self.name.rfind('.').map_or("", |i| &self.name[..i])
    }

    /// Name without the package
    #[must_use]
    pub fn simple_name(&self) -> &str {
        let simple = self.name.rfind('.').map_or(&self.name[..], |i| &self.name[i + 1..]);
        simple.rfind('$').map_or(simple, |i| &simple[i + 1..])
    }

    /// Look up a declaration annotation by type name
    #[must_use]
    pub fn annotation(&self, name: &str) -> Option<&AnnotationInstance> {
        self.annotations.iter().find(|a| a.name == name)
    }

    /// Look up a field by name
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// All methods with the given name (overloads in declaration order)
    pub fn methods_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a MethodDescriptor> {
        self.methods.iter().filter(move |m| m.name == name)
    }
}

impl fmt::Display for ClassDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let modifiers = self.modifiers.to_string();
        if !modifiers.is_empty() {
            write!(f, "{modifiers} ")?;
        }
        write!(f, "{} {}", self.kind, self.name)
    }
}

/// A declared field.
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    /// Field name
    pub name: String,
    /// Access flags
    pub modifiers: FieldModifiers,
    /// Raw type descriptor (`Ljava/util/List;`)
    pub descriptor: String,
    /// Type from the `Signature` attribute if present, else from the descriptor
    pub type_signature: TypeSignature,
    /// Whether `type_signature` came from a `Signature` attribute
    pub has_generic_signature: bool,
    /// Declaration annotations
    pub annotations: Vec<AnnotationInstance>,
    /// Constant initializer of a `final` field
    pub constant_value: Option<ConstantValue>,
}

impl FieldDescriptor {
    /// Look up a declaration annotation by type name
    #[must_use]
    pub fn annotation(&self, name: &str) -> Option<&AnnotationInstance> {
        self.annotations.iter().find(|a| a.name == name)
    }
}

impl fmt::Display for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let modifiers = self.modifiers.to_string();
        if !modifiers.is_empty() {
            write!(f, "{modifiers} ")?;
        }
        write!(f, "{} {}", self.type_signature, self.name)?;
        if let Some(value) = &self.constant_value {
            write!(f, " = {value}")?;
        }
        Ok(())
    }
}

/// A declared method, constructor (`<init>`) or class initializer (`<clinit>`).
#[derive(Debug, Clone)]
pub struct MethodDescriptor {
    /// Method name
    pub name: String,
    /// Access flags
    pub modifiers: MethodModifiers,
    /// Raw method descriptor (`(I)V`)
    pub descriptor: String,
    /// Signature from the `Signature` attribute if present, else from the descriptor
    pub signature: MethodSignature,
    /// Whether `signature` came from a `Signature` attribute
    pub has_generic_signature: bool,
    /// Declaration annotations
    pub annotations: Vec<AnnotationInstance>,
    /// Annotations per formal parameter; may be shorter than the parameter list
    pub parameter_annotations: Vec<Vec<AnnotationInstance>>,
    /// Parameter names from `MethodParameters`; empty if the attribute is absent
    pub parameter_names: Vec<Option<String>>,
    /// Element default of an annotation type method
    pub default_value: Option<AnnotationValue>,
    /// Dotted names of the declared exceptions
    pub exceptions: Vec<String>,
}

impl MethodDescriptor {
    /// Returns `true` for instance constructors
    #[must_use]
    pub fn is_constructor(&self) -> bool {
        self.name == "<init>"
    }

    /// Look up a declaration annotation by type name
    #[must_use]
    pub fn annotation(&self, name: &str) -> Option<&AnnotationInstance> {
        self.annotations.iter().find(|a| a.name == name)
    }

    /// Declaration annotations of formal parameter `index`
    #[must_use]
    pub fn parameter_annotations(&self, index: usize) -> &[AnnotationInstance] {
        self.parameter_annotations
            .get(index)
            .map_or(&[][..], Vec::as_slice)
    }
}

impl fmt::Display for MethodDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let modifiers = self.modifiers.to_string();
        if !modifiers.is_empty() {
            write!(f, "{modifiers} ")?;
        }

        let join = |types: &[TypeSignature]| {
            types
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        };

        let signature = &self.signature;
        if !signature.type_parameters.is_empty() {
            let parameters: Vec<String> = signature
                .type_parameters
                .iter()
                .map(ToString::to_string)
                .collect();
            write!(f, "<{}> ", parameters.join(", "))?;
        }
        write!(
            f,
            "{} {}({})",
            signature.result,
            self.name,
            join(&signature.parameters)
        )?;
        if !signature.throws.is_empty() {
            write!(f, " throws {}", join(&signature.throws))?;
        }
        Ok(())
    }
}
