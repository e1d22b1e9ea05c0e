use std::fmt;

use strum::Display;

use crate::metadata::annotations::AnnotationInstance;

/// The eight primitive types plus `void`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "lowercase")]
pub enum PrimitiveType {
    /// `Z`
    Boolean,
    /// `B`
    Byte,
    /// `C`
    Char,
    /// `S`
    Short,
    /// `I`
    Int,
    /// `J`
    Long,
    /// `F`
    Float,
    /// `D`
    Double,
    /// `V`, only valid as a method result or an annotation class value
    Void,
}

impl PrimitiveType {
    /// Map a descriptor character to a primitive type
    #[must_use]
    pub fn from_descriptor(c: u8) -> Option<PrimitiveType> {
        match c {
            b'Z' => Some(PrimitiveType::Boolean),
            b'B' => Some(PrimitiveType::Byte),
            b'C' => Some(PrimitiveType::Char),
            b'S' => Some(PrimitiveType::Short),
            b'I' => Some(PrimitiveType::Int),
            b'J' => Some(PrimitiveType::Long),
            b'F' => Some(PrimitiveType::Float),
            b'D' => Some(PrimitiveType::Double),
            b'V' => Some(PrimitiveType::Void),
            _ => None,
        }
    }

    /// The descriptor character of this type
    #[must_use]
    pub fn descriptor(self) -> char {
        match self {
            PrimitiveType::Boolean => 'Z',
            PrimitiveType::Byte => 'B',
            PrimitiveType::Char => 'C',
            PrimitiveType::Short => 'S',
            PrimitiveType::Int => 'I',
            PrimitiveType::Long => 'J',
            PrimitiveType::Float => 'F',
            PrimitiveType::Double => 'D',
            PrimitiveType::Void => 'V',
        }
    }
}

/// Bound kind of a wildcard type argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WildcardKind {
    /// `?` (`*`)
    Unbounded,
    /// `? extends B` (`+`)
    Extends,
    /// `? super B` (`-`)
    Super,
}

/// A parsed Java type, as found in field signatures, method parameters, results, type
/// arguments and bounds.
///
/// Every node carries the type-use annotations attached to that exact occurrence.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeSignature {
    /// A primitive type (or `void` as a result)
    Primitive {
        /// Which primitive
        kind: PrimitiveType,
        /// Type-use annotations
        annotations: Vec<AnnotationInstance>,
    },
    /// A class or interface type
    Class(ClassTypeSignature),
    /// An array type; the element is never itself an array
    Array {
        /// Element type
        element: Box<TypeSignature>,
        /// Annotations per dimension; the length is the dimension count and index 0 is the
        /// outermost dimension
        dimension_annotations: Vec<Vec<AnnotationInstance>>,
    },
    /// A reference to a type parameter
    TypeVariable {
        /// Name of the type parameter
        name: String,
        /// Type-use annotations
        annotations: Vec<AnnotationInstance>,
    },
    /// A wildcard type argument
    Wildcard {
        /// Bound kind
        kind: WildcardKind,
        /// The bound, absent for [`WildcardKind::Unbounded`]
        bound: Option<Box<TypeSignature>>,
        /// Type-use annotations on the wildcard itself
        annotations: Vec<AnnotationInstance>,
    },
}

impl TypeSignature {
    /// Unannotated primitive
    #[must_use]
    pub fn primitive(kind: PrimitiveType) -> TypeSignature {
        TypeSignature::Primitive {
            kind,
            annotations: Vec::new(),
        }
    }

    /// Unannotated, non-generic class type from a dotted name
    #[must_use]
    pub fn class(name: impl Into<String>) -> TypeSignature {
        TypeSignature::Class(ClassTypeSignature::new(name))
    }

    /// Unannotated array of `dimensions` dimensions
    #[must_use]
    pub fn array(element: TypeSignature, dimensions: usize) -> TypeSignature {
        TypeSignature::Array {
            element: Box::new(element),
            dimension_annotations: vec![Vec::new(); dimensions],
        }
    }

    /// Unannotated type variable
    #[must_use]
    pub fn type_variable(name: impl Into<String>) -> TypeSignature {
        TypeSignature::TypeVariable {
            name: name.into(),
            annotations: Vec::new(),
        }
    }

    /// Returns `true` for `void`
    #[must_use]
    pub fn is_void(&self) -> bool {
        matches!(
            self,
            TypeSignature::Primitive {
                kind: PrimitiveType::Void,
                ..
            }
        )
    }

    /// The binary class name if this is a class type
    #[must_use]
    pub fn class_name(&self) -> Option<String> {
        match self {
            TypeSignature::Class(class) => Some(class.name()),
            _ => None,
        }
    }

    /// Annotations on this node itself; for arrays, the outermost dimension
    #[must_use]
    pub fn annotations(&self) -> &[AnnotationInstance] {
        match self {
            TypeSignature::Primitive { annotations, .. }
            | TypeSignature::TypeVariable { annotations, .. }
            | TypeSignature::Wildcard { annotations, .. } => annotations,
            TypeSignature::Class(class) => class
                .segments
                .last()
                .map_or(&[][..], |segment| &segment.annotations),
            TypeSignature::Array {
                dimension_annotations,
                ..
            } => dimension_annotations.first().map_or(&[][..], Vec::as_slice),
        }
    }

    /// Append the binary names of every class this type mentions.
    pub fn collect_class_names(&self, out: &mut Vec<String>) {
        match self {
            TypeSignature::Primitive { .. } | TypeSignature::TypeVariable { .. } => {}
            TypeSignature::Class(class) => class.collect_class_names(out),
            TypeSignature::Array { element, .. } => element.collect_class_names(out),
            TypeSignature::Wildcard { bound, .. } => {
                if let Some(bound) = bound {
                    bound.collect_class_names(out);
                }
            }
        }
    }
}

/// One `.`-separated segment of a class type.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ClassSegment {
    /// Dotted, package-qualified name for the first segment; simple name for the rest
    pub name: String,
    /// Type arguments of this segment
    pub type_arguments: Vec<TypeSignature>,
    /// Type-use annotations on this segment
    pub annotations: Vec<AnnotationInstance>,
}

/// A class type: `pkg.Outer<A>.Inner<B>`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ClassTypeSignature {
    /// Segments from outermost to innermost; never empty once parsed
    pub segments: Vec<ClassSegment>,
}

impl ClassTypeSignature {
    /// A single-segment, non-generic class type
    pub fn new(name: impl Into<String>) -> ClassTypeSignature {
        ClassTypeSignature {
            segments: vec![ClassSegment {
                name: name.into(),
                ..ClassSegment::default()
            }],
        }
    }

    /// Binary name (`pkg.Outer$Inner`)
    #[must_use]
    pub fn name(&self) -> String {
        let mut name = String::new();
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                name.push('$');
            }
            name.push_str(&segment.name);
        }
        name
    }

    /// Type arguments of the innermost segment
    #[must_use]
    pub fn type_arguments(&self) -> &[TypeSignature] {
        self.segments
            .last()
            .map_or(&[][..], |segment| &segment.type_arguments)
    }

    /// Append the binary names of this type and of every class in its type arguments.
    pub fn collect_class_names(&self, out: &mut Vec<String>) {
        out.push(self.name());
        for segment in &self.segments {
            for argument in &segment.type_arguments {
                argument.collect_class_names(out);
            }
        }
    }
}

/// A formal type parameter: `T extends Bound & Iface`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TypeParameter {
    /// Parameter name
    pub name: String,
    /// Class bound; absent when the parameter only has interface bounds
    pub class_bound: Option<TypeSignature>,
    /// Interface bounds, in declaration order
    pub interface_bounds: Vec<TypeSignature>,
    /// Type-use annotations on the parameter declaration
    pub annotations: Vec<AnnotationInstance>,
}

impl TypeParameter {
    /// Bound by type-annotation `bound_index`: 0 is the class bound, `i > 0` is interface
    /// bound `i - 1`.
    pub fn bound_mut(&mut self, index: u8) -> Option<&mut TypeSignature> {
        match index {
            0 => self.class_bound.as_mut(),
            i => self.interface_bounds.get_mut(i as usize - 1),
        }
    }

    fn collect_class_names(&self, out: &mut Vec<String>) {
        for bound in self.class_bound.iter().chain(&self.interface_bounds) {
            bound.collect_class_names(out);
        }
    }
}

/// A parsed method signature or method descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodSignature {
    /// Generic type parameters
    pub type_parameters: Vec<TypeParameter>,
    /// Parameter types, in order
    pub parameters: Vec<TypeSignature>,
    /// Result type (`void` for none)
    pub result: TypeSignature,
    /// Thrown types (class types or type variables)
    pub throws: Vec<TypeSignature>,
    /// Receiver type; only present when the receiver carries type-use annotations
    pub receiver: Option<TypeSignature>,
}

impl MethodSignature {
    /// Append the binary names of every class the signature mentions.
    pub fn collect_class_names(&self, out: &mut Vec<String>) {
        for parameter in &self.type_parameters {
            parameter.collect_class_names(out);
        }
        for ty in self.parameters.iter().chain(&self.throws) {
            ty.collect_class_names(out);
        }
        self.result.collect_class_names(out);
    }
}

/// A parsed class signature.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ClassSignature {
    /// Generic type parameters
    pub type_parameters: Vec<TypeParameter>,
    /// Superclass type; absent only for `java.lang.Object`
    pub superclass: Option<ClassTypeSignature>,
    /// Superinterface types, in declaration order
    pub interfaces: Vec<ClassTypeSignature>,
}

impl ClassSignature {
    /// Append the binary names of every class the signature mentions.
    pub fn collect_class_names(&self, out: &mut Vec<String>) {
        for parameter in &self.type_parameters {
            parameter.collect_class_names(out);
        }
        for ty in self.superclass.iter().chain(&self.interfaces) {
            ty.collect_class_names(out);
        }
    }
}

fn write_annotations(f: &mut fmt::Formatter<'_>, annotations: &[AnnotationInstance]) -> fmt::Result {
    for annotation in annotations {
        write!(f, "{annotation} ")?;
    }
    Ok(())
}

fn write_list<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

fn write_type_parameters(f: &mut fmt::Formatter<'_>, params: &[TypeParameter]) -> fmt::Result {
    if params.is_empty() {
        return Ok(());
    }
    write!(f, "<")?;
    write_list(f, params)?;
    write!(f, ">")
}

impl fmt::Display for TypeSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeSignature::Primitive { kind, annotations } => {
                write_annotations(f, annotations)?;
                write!(f, "{kind}")
            }
            TypeSignature::Class(class) => write!(f, "{class}"),
            TypeSignature::Array {
                element,
                dimension_annotations,
            } => {
                write!(f, "{element}")?;
                for annotations in dimension_annotations {
                    if !annotations.is_empty() {
                        write!(f, " ")?;
                        write_annotations(f, annotations)?;
                    }
                    write!(f, "[]")?;
                }
                Ok(())
            }
            TypeSignature::TypeVariable { name, annotations } => {
                write_annotations(f, annotations)?;
                write!(f, "{name}")
            }
            TypeSignature::Wildcard {
                kind,
                bound,
                annotations,
            } => {
                write_annotations(f, annotations)?;
                write!(f, "?")?;
                match (kind, bound) {
                    (WildcardKind::Extends, Some(bound)) => write!(f, " extends {bound}"),
                    (WildcardKind::Super, Some(bound)) => write!(f, " super {bound}"),
                    _ => Ok(()),
                }
            }
        }
    }
}

impl fmt::Display for ClassTypeSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                write!(f, ".")?;
            }
            write_annotations(f, &segment.annotations)?;
            write!(f, "{}", segment.name)?;
            if !segment.type_arguments.is_empty() {
                write!(f, "<")?;
                write_list(f, &segment.type_arguments)?;
                write!(f, ">")?;
            }
        }
        Ok(())
    }
}

impl fmt::Display for TypeParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_annotations(f, &self.annotations)?;
        write!(f, "{}", self.name)?;

        // A lone, unannotated `java.lang.Object` class bound is the implicit default
        let implicit_object = self.interface_bounds.is_empty()
            && matches!(&self.class_bound, Some(TypeSignature::Class(c))
                if c.segments.len() == 1
                    && c.segments[0].name == "java.lang.Object"
                    && c.segments[0].annotations.is_empty());

        let mut bounds = self
            .class_bound
            .iter()
            .filter(|_| !implicit_object)
            .chain(&self.interface_bounds);

        if let Some(first) = bounds.next() {
            write!(f, " extends {first}")?;
            for bound in bounds {
                write!(f, " & {bound}")?;
            }
        }
        Ok(())
    }
}

impl fmt::Display for MethodSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.type_parameters.is_empty() {
            write_type_parameters(f, &self.type_parameters)?;
            write!(f, " ")?;
        }
        write!(f, "{} (", self.result)?;
        if let Some(receiver) = &self.receiver {
            write!(f, "{receiver} this")?;
            if !self.parameters.is_empty() {
                write!(f, ", ")?;
            }
        }
        write_list(f, &self.parameters)?;
        write!(f, ")")?;
        if !self.throws.is_empty() {
            write!(f, " throws ")?;
            write_list(f, &self.throws)?;
        }
        Ok(())
    }
}

impl fmt::Display for ClassSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_type_parameters(f, &self.type_parameters)?;
        let mut separator = if self.type_parameters.is_empty() { "" } else { " " };
        if let Some(superclass) = &self.superclass {
            write!(f, "{separator}extends {superclass}")?;
            separator = " ";
        }
        if !self.interfaces.is_empty() {
            write!(f, "{separator}implements ")?;
            write_list(f, &self.interfaces)?;
        }
        Ok(())
    }
}
