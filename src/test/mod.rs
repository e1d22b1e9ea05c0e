//! Shared helpers for unit tests.


use crate::{
    metadata::{
        constpool::ConstantPool,
        descriptor::{
            ClassDescriptor, ClassKind, ClassModifiers, FieldDescriptor, FieldModifiers,
            MethodDescriptor, MethodModifiers,
        },
        signatures::{parse_method_signature, PrimitiveType, TypeSignature},
    },
    Parser,
};

impl classfile::PoolBuilder {
    /// Parse the assembled entries into a [`ConstantPool`]
    pub fn build(&self) -> ConstantPool {
        let bytes = self.bytes();
        let mut pool = ConstantPool::new();
        pool.parse(&mut Parser::new(&bytes))
            .expect("assembled constant pool must parse");
        pool
    }
}

/// A public class extending `java.lang.Object` with no members
pub fn descriptor(name: &str) -> ClassDescriptor {
    ClassDescriptor {
        name: name.to_string(),
        kind: ClassKind::Class,
        modifiers: ClassModifiers::PUBLIC | ClassModifiers::SUPER,
        major_version: 52,
        minor_version: 0,
        superclass: Some("java.lang.Object".to_string()),
        interfaces: Vec::new(),
        signature: None,
        annotations: Vec::new(),
        outer_class: None,
        inner_classes: Vec::new(),
        enclosing_method: None,
        source_file: None,
        fields: Vec::new(),
        methods: Vec::new(),
        referenced_classes: Vec::new(),
        source: format!("{name}.class"),
        source_index: 0,
    }
}

/// A public interface with no members
pub fn interface(name: &str) -> ClassDescriptor {
    ClassDescriptor {
        kind: ClassKind::Interface,
        modifiers: ClassModifiers::PUBLIC | ClassModifiers::INTERFACE | ClassModifiers::ABSTRACT,
        superclass: None,
        ..descriptor(name)
    }
}

/// A public annotation type with no elements
pub fn annotation_type(name: &str) -> ClassDescriptor {
    ClassDescriptor {
        kind: ClassKind::AnnotationType,
        modifiers: ClassModifiers::PUBLIC
            | ClassModifiers::INTERFACE
            | ClassModifiers::ABSTRACT
            | ClassModifiers::ANNOTATION,
        interfaces: vec!["java.lang.annotation.Annotation".to_string()],
        ..interface(name)
    }
}

/// A public `void name()` method
pub fn method(name: &str) -> MethodDescriptor {
    MethodDescriptor {
        name: name.to_string(),
        modifiers: MethodModifiers::PUBLIC,
        descriptor: "()V".to_string(),
        signature: parse_method_signature("()V").expect("valid descriptor"),
        has_generic_signature: false,
        annotations: Vec::new(),
        parameter_annotations: Vec::new(),
        parameter_names: Vec::new(),
        default_value: None,
        exceptions: Vec::new(),
    }
}

/// A private `int` field
pub fn field(name: &str) -> FieldDescriptor {
    FieldDescriptor {
        name: name.to_string(),
        modifiers: FieldModifiers::PRIVATE,
        descriptor: "I".to_string(),
        type_signature: TypeSignature::primitive(PrimitiveType::Int),
        has_generic_signature: false,
        annotations: Vec::new(),
        constant_value: None,
    }
}
