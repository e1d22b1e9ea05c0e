//! Decoding one class file into a [`crate::metadata::descriptor::ClassDescriptor`].

use crate::{
    file::parser::Parser,
    metadata::{
        annotations::{AnnotationInstance, AnnotationParser, AnnotationValue},
        constpool::ConstantPool,
        descriptor::{
            ClassDescriptor, ClassKind, ClassModifiers, EnclosingMethod, FieldDescriptor,
            FieldModifiers, MethodDescriptor, MethodModifiers,
        },
        signatures::{
            parse_class_signature, parse_field_signature, parse_method_signature,
            ClassSignature, ClassTypeSignature, MethodSignature, TypeSignature,
        },
        typeannotations::{
            parse_type_annotations, TypeAnnotationRecord, TypeAnnotationTarget, SUPERCLASS_INDEX,
        },
    },
    Error, Result,
};

/// The class file magic number
pub const CLASS_MAGIC: u32 = 0xCAFE_BABE;
/// Oldest supported class file major version (JDK 1.1)
pub const MIN_MAJOR_VERSION: u16 = 45;
/// Newest class file major version accepted by default (Java 26)
pub const DEFAULT_MAX_MAJOR_VERSION: u16 = 70;

/// Per-class decoding options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Decode `RuntimeInvisible*Annotations` attributes in addition to the visible ones
    pub include_invisible_annotations: bool,
    /// Reject class files with a newer major version
    pub max_major_version: u16,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        DecodeOptions {
            include_invisible_annotations: true,
            max_major_version: DEFAULT_MAX_MAJOR_VERSION,
        }
    }
}

/// Reusable class file decoder.
///
/// The decoder owns the scratch state needed while decoding (most notably the constant pool
/// table), so one instance can decode any number of classes sequentially without
/// reallocating. The scanner pools decoders across its workers.
///
/// # Example
///
/// ```rust
/// use jvmscope::metadata::descriptor::{ClassDecoder, DecodeOptions};
///
/// let mut decoder = ClassDecoder::new();
/// let result = decoder.decode("Empty.class", 0, &[], &DecodeOptions::default());
/// assert!(result.is_err());
/// ```
#[derive(Debug, Default)]
pub struct ClassDecoder {
    pool: ConstantPool,
    decoded: u64,
}

impl ClassDecoder {
    /// Create a new decoder
    #[must_use]
    pub fn new() -> Self {
        ClassDecoder {
            pool: ConstantPool::new(),
            decoded: 0,
        }
    }

    /// Number of classes this instance decoded successfully
    #[must_use]
    pub fn decoded(&self) -> u64 {
        self.decoded
    }

    /// Drop per-class state, keeping allocations for the next class
    pub fn reset(&mut self) {
        self.pool.clear();
    }

    /// Release all allocations
    pub fn release_buffers(&mut self) {
        self.pool = ConstantPool::new();
    }

    /// Decode one class file.
    ///
    /// ## Arguments
    /// * 'source'       - Identifier of the byte source, recorded in the descriptor
    /// * 'source_index' - Position of the source in the scan input
    /// * 'data'         - The class file bytes
    /// * 'options'      - Decoding options
    ///
    /// # Errors
    /// Returns a format error if the bytes are not a valid class file, and
    /// [`crate::Error::NotSupported`] for module descriptors.
    pub fn decode(
        &mut self,
        source: &str,
        source_index: usize,
        data: &[u8],
        options: &DecodeOptions,
    ) -> Result<ClassDescriptor> {
        let mut parser = Parser::new(data);

        let magic = parser.read_be::<u32>()?;
        if magic != CLASS_MAGIC {
            return Err(malformed_error!("Invalid magic 0x{:08X}", magic));
        }

        let minor_version = parser.read_be::<u16>()?;
        let major_version = parser.read_be::<u16>()?;
        if !(MIN_MAJOR_VERSION..=options.max_major_version).contains(&major_version) {
            return Err(malformed_error!(
                "Unsupported class file version {}.{}",
                major_version,
                minor_version
            ));
        }

        self.pool.parse(&mut parser)?;

        let reader = ClassReader {
            pool: &self.pool,
            options,
            parser,
        };
        let mut descriptor = reader.read()?;

        descriptor.major_version = major_version;
        descriptor.minor_version = minor_version;
        descriptor.source = source.to_string();
        descriptor.source_index = source_index;

        self.decoded += 1;
        Ok(descriptor)
    }
}

/// Attributes of the class itself
#[derive(Default)]
struct ClassAttributes {
    signature: Option<String>,
    annotations: Vec<AnnotationInstance>,
    type_annotations: Vec<TypeAnnotationRecord>,
    inner_flags: Option<u16>,
    outer_class: Option<String>,
    inner_classes: Vec<String>,
    enclosing_method: Option<EnclosingMethod>,
    source_file: Option<String>,
}

/// Cursor over the part of a class file following the constant pool
struct ClassReader<'a, 'p> {
    pool: &'p ConstantPool,
    options: &'p DecodeOptions,
    parser: Parser<'a>,
}

impl<'a, 'p> ClassReader<'a, 'p> {
    fn read(mut self) -> Result<ClassDescriptor> {
        let file_modifiers = ClassModifiers::from_bits_truncate(self.parser.read_be::<u16>()?);
        let name = self.pool.class_name(self.parser.read_be::<u16>()?)?;

        if file_modifiers.contains(ClassModifiers::MODULE) {
            return Err(Error::NotSupported(format!("module descriptor '{name}'")));
        }

        let raw_superclass = self
            .pool
            .optional_class_name(self.parser.read_be::<u16>()?)?;
        if raw_superclass.is_none() && name != "java.lang.Object" {
            return Err(malformed_error!("Class {} has no superclass", name));
        }

        let interface_count = self.parser.read_be::<u16>()?;
        let mut interfaces = Vec::with_capacity(interface_count as usize);
        for _ in 0..interface_count {
            interfaces.push(self.pool.class_name(self.parser.read_be::<u16>()?)?);
        }

        let field_count = self.parser.read_be::<u16>()?;
        let mut fields = Vec::with_capacity(field_count as usize);
        for _ in 0..field_count {
            fields.push(self.read_field()?);
        }

        let method_count = self.parser.read_be::<u16>()?;
        let mut methods = Vec::with_capacity(method_count as usize);
        let mut constructor_parameters = Vec::new();
        for index in 0..method_count as usize {
            let (method, deferred) = self.read_method(&name)?;
            if !deferred.is_empty() {
                constructor_parameters.push((index, deferred));
            }
            methods.push(method);
        }

        let attributes = self.read_class_attributes(&name)?;

        // Constructor parameter indices skip the outer instance and the enum name and ordinal
        let synthetic = if file_modifiers.contains(ClassModifiers::ENUM) {
            2
        } else {
            match (attributes.inner_flags, &attributes.outer_class) {
                (Some(flags), Some(_)) if flags & ClassModifiers::STATIC.bits() == 0 => 1,
                _ => 0,
            }
        };
        for (index, records) in constructor_parameters {
            let method = &mut methods[index];
            for mut record in records {
                if let TypeAnnotationTarget::FormalParameter(parameter) = record.target {
                    let shifted = parameter.checked_add(synthetic).ok_or_else(|| {
                        malformed_error!("Formal parameter index {} overflows", parameter)
                    })?;
                    record.target = TypeAnnotationTarget::FormalParameter(shifted);
                }
                place_method_annotation(&mut method.signature, &name, &method.name, record)?;
            }
        }

        if self.parser.has_more_data() {
            return Err(malformed_error!(
                "{} trailing bytes after class {}",
                self.parser.remaining(),
                name
            ));
        }

        let kind = ClassKind::from_modifiers(file_modifiers);
        let modifiers = match attributes.inner_flags {
            Some(flags) => {
                ClassModifiers::from_bits_truncate(flags) | (file_modifiers & ClassModifiers::SUPER)
            }
            None => file_modifiers,
        };

        let mut signature = match &attributes.signature {
            Some(text) => Some(parse_class_signature(text)?),
            None => None,
        };

        let placed: Vec<_> = attributes
            .type_annotations
            .into_iter()
            .filter(|record| record.target != TypeAnnotationTarget::Code)
            .collect();
        if !placed.is_empty() {
            let signature = signature.get_or_insert_with(|| ClassSignature {
                type_parameters: Vec::new(),
                superclass: raw_superclass.as_deref().map(ClassTypeSignature::new),
                interfaces: interfaces
                    .iter()
                    .map(|i| ClassTypeSignature::new(i.as_str()))
                    .collect(),
            });
            for record in placed {
                place_class_annotation(signature, record)?;
            }
        }

        let mut referenced: Vec<String> = self.pool.class_names().collect();
        if let Some(signature) = &signature {
            signature.collect_class_names(&mut referenced);
        }
        for annotation in &attributes.annotations {
            annotation.collect_class_names(&mut referenced);
        }
        for field in &fields {
            field.type_signature.collect_class_names(&mut referenced);
            for annotation in &field.annotations {
                annotation.collect_class_names(&mut referenced);
            }
        }
        for method in &methods {
            method.signature.collect_class_names(&mut referenced);
            for annotation in method
                .annotations
                .iter()
                .chain(method.parameter_annotations.iter().flatten())
            {
                annotation.collect_class_names(&mut referenced);
            }
        }
        referenced.sort_unstable();
        referenced.dedup();
        referenced.retain(|r| *r != name);

        let outer_class = attributes.outer_class.or_else(|| {
            attributes
                .enclosing_method
                .as_ref()
                .map(|e| e.class_name.clone())
        });

        Ok(ClassDescriptor {
            superclass: if kind.is_interface() {
                None
            } else {
                raw_superclass
            },
            name,
            kind,
            modifiers,
            major_version: 0,
            minor_version: 0,
            interfaces,
            signature,
            annotations: attributes.annotations,
            outer_class,
            inner_classes: attributes.inner_classes,
            enclosing_method: attributes.enclosing_method,
            source_file: attributes.source_file,
            fields,
            methods,
            referenced_classes: referenced,
            source: String::new(),
            source_index: 0,
        })
    }

    /// Names and bodies of the next `u2`-counted attribute table
    fn read_attributes(&mut self) -> Result<Vec<(&'p str, &'a [u8])>> {
        let count = self.parser.read_be::<u16>()?;
        let mut attributes = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let name = self.pool.utf8(self.parser.read_be::<u16>()?)?;
            let length = self.parser.read_be::<u32>()?;
            let body = self.parser.read_bytes(length as usize)?;
            attributes.push((name, body));
        }
        Ok(attributes)
    }

    /// Attributes shared by classes, fields and methods. Returns `false` for anything else.
    fn read_common_attribute(
        &self,
        name: &str,
        body: &mut Parser<'a>,
        annotations: &mut Vec<AnnotationInstance>,
        type_annotations: &mut Vec<TypeAnnotationRecord>,
    ) -> Result<bool> {
        let invisible = self.options.include_invisible_annotations;
        match name {
            "RuntimeVisibleAnnotations" => {
                annotations.extend(AnnotationParser::new(body, self.pool).parse_annotations()?);
            }
            "RuntimeInvisibleAnnotations" if invisible => {
                annotations.extend(AnnotationParser::new(body, self.pool).parse_annotations()?);
            }
            "RuntimeVisibleTypeAnnotations" => {
                type_annotations.extend(parse_type_annotations(body, self.pool)?);
            }
            "RuntimeInvisibleTypeAnnotations" if invisible => {
                type_annotations.extend(parse_type_annotations(body, self.pool)?);
            }
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn read_field(&mut self) -> Result<FieldDescriptor> {
        let modifiers = FieldModifiers::from_bits_truncate(self.parser.read_be::<u16>()?);
        let name = self.pool.utf8(self.parser.read_be::<u16>()?)?.to_string();
        let descriptor = self.pool.utf8(self.parser.read_be::<u16>()?)?.to_string();

        let mut signature_text = None;
        let mut constant_index = None;
        let mut annotations = Vec::new();
        let mut type_annotations = Vec::new();

        for (attribute, body) in self.read_attributes()? {
            let mut body = Parser::new(body);
            match attribute {
                "Signature" => {
                    signature_text = Some(self.pool.utf8(body.read_be::<u16>()?)?);
                }
                "ConstantValue" => constant_index = Some(body.read_be::<u16>()?),
                _ => {
                    self.read_common_attribute(
                        attribute,
                        &mut body,
                        &mut annotations,
                        &mut type_annotations,
                    )?;
                }
            }
        }

        let mut type_signature = parse_field_signature(signature_text.unwrap_or(&descriptor))?;
        for record in type_annotations {
            match record.target {
                TypeAnnotationTarget::Field => {
                    type_signature.attach_annotation(&record.path, record.annotation)?;
                }
                TypeAnnotationTarget::Code => {}
                other => {
                    return Err(malformed_error!(
                        "Type annotation target {:?} is not valid on field {}",
                        other,
                        name
                    ))
                }
            }
        }

        let constant_value = match constant_index {
            Some(index) if modifiers.contains(FieldModifiers::FINAL) => {
                Some(self.pool.constant_value(index, &descriptor)?)
            }
            _ => None,
        };

        Ok(FieldDescriptor {
            name,
            modifiers,
            descriptor,
            type_signature,
            has_generic_signature: signature_text.is_some(),
            annotations,
            constant_value,
        })
    }

    /// Formal parameter annotations of a constructor without a generic signature are returned
    /// unplaced, since their index skips synthetic parameters that depend on the class attributes
    fn read_method(
        &mut self,
        class_name: &str,
    ) -> Result<(MethodDescriptor, Vec<TypeAnnotationRecord>)> {
        let modifiers = MethodModifiers::from_bits_truncate(self.parser.read_be::<u16>()?);
        let name = self.pool.utf8(self.parser.read_be::<u16>()?)?.to_string();
        let descriptor = self.pool.utf8(self.parser.read_be::<u16>()?)?.to_string();

        let mut signature_text = None;
        let mut annotations = Vec::new();
        let mut type_annotations = Vec::new();
        let mut parameter_annotations = Vec::new();
        let mut parameter_names = Vec::new();
        let mut default_value = None;
        let mut exceptions = Vec::new();

        let invisible = self.options.include_invisible_annotations;
        for (attribute, body) in self.read_attributes()? {
            let mut body = Parser::new(body);
            match attribute {
                "Signature" => {
                    signature_text = Some(self.pool.utf8(body.read_be::<u16>()?)?);
                }
                "Exceptions" => {
                    let count = body.read_be::<u16>()?;
                    for _ in 0..count {
                        exceptions.push(self.pool.class_name(body.read_be::<u16>()?)?);
                    }
                }
                "RuntimeVisibleParameterAnnotations" => {
                    let parsed =
                        AnnotationParser::new(&mut body, self.pool).parse_parameter_annotations()?;
                    merge_parameter_annotations(&mut parameter_annotations, parsed);
                }
                "RuntimeInvisibleParameterAnnotations" if invisible => {
                    let parsed =
                        AnnotationParser::new(&mut body, self.pool).parse_parameter_annotations()?;
                    merge_parameter_annotations(&mut parameter_annotations, parsed);
                }
                "AnnotationDefault" => {
                    default_value =
                        Some(AnnotationParser::new(&mut body, self.pool).parse_element_value()?);
                }
                "MethodParameters" => {
                    let count = body.read_be::<u8>()?;
                    for _ in 0..count {
                        let name_index = body.read_be::<u16>()?;
                        let _access_flags = body.read_be::<u16>()?;
                        parameter_names.push(if name_index == 0 {
                            None
                        } else {
                            Some(self.pool.utf8(name_index)?.to_string())
                        });
                    }
                }
                _ => {
                    self.read_common_attribute(
                        attribute,
                        &mut body,
                        &mut annotations,
                        &mut type_annotations,
                    )?;
                }
            }
        }

        let mut signature = parse_method_signature(signature_text.unwrap_or(&descriptor))?;
        if signature.throws.is_empty() {
            signature.throws = exceptions
                .iter()
                .map(|e| TypeSignature::class(e.as_str()))
                .collect();
        }

        let mut deferred = Vec::new();
        for record in type_annotations {
            if signature_text.is_none()
                && name == "<init>"
                && matches!(record.target, TypeAnnotationTarget::FormalParameter(_))
            {
                deferred.push(record);
            } else {
                place_method_annotation(&mut signature, class_name, &name, record)?;
            }
        }

        let method = MethodDescriptor {
            name,
            modifiers,
            descriptor,
            signature,
            has_generic_signature: signature_text.is_some(),
            annotations,
            parameter_annotations,
            parameter_names,
            default_value,
            exceptions,
        };
        Ok((method, deferred))
    }

    fn read_class_attributes(&mut self, class_name: &str) -> Result<ClassAttributes> {
        let mut attributes = ClassAttributes::default();

        for (attribute, body) in self.read_attributes()? {
            let mut body = Parser::new(body);
            match attribute {
                "Signature" => {
                    attributes.signature =
                        Some(self.pool.utf8(body.read_be::<u16>()?)?.to_string());
                }
                "InnerClasses" => {
                    let count = body.read_be::<u16>()?;
                    for _ in 0..count {
                        let inner = self.pool.class_name(body.read_be::<u16>()?)?;
                        let outer = self.pool.optional_class_name(body.read_be::<u16>()?)?;
                        let _inner_name_index = body.read_be::<u16>()?;
                        let flags = body.read_be::<u16>()?;

                        if inner == class_name {
                            attributes.inner_flags = Some(flags);
                            if outer.is_some() {
                                attributes.outer_class = outer;
                            }
                        } else if outer.as_deref() == Some(class_name)
                            && !attributes.inner_classes.contains(&inner)
                        {
                            attributes.inner_classes.push(inner);
                        }
                    }
                }
                "EnclosingMethod" => {
                    let class = self.pool.class_name(body.read_be::<u16>()?)?;
                    let method_index = body.read_be::<u16>()?;
                    let (method_name, method_descriptor) = if method_index == 0 {
                        (None, None)
                    } else {
                        let (name, descriptor) = self.pool.name_and_type(method_index)?;
                        (Some(name.to_string()), Some(descriptor.to_string()))
                    };
                    attributes.enclosing_method = Some(EnclosingMethod {
                        class_name: class,
                        method_name,
                        method_descriptor,
                    });
                }
                "SourceFile" => {
                    attributes.source_file =
                        Some(self.pool.utf8(body.read_be::<u16>()?)?.to_string());
                }
                _ => {
                    self.read_common_attribute(
                        attribute,
                        &mut body,
                        &mut attributes.annotations,
                        &mut attributes.type_annotations,
                    )?;
                }
            }
        }

        Ok(attributes)
    }
}

fn merge_parameter_annotations(
    into: &mut Vec<Vec<AnnotationInstance>>,
    from: Vec<Vec<AnnotationInstance>>,
) {
    if into.len() < from.len() {
        into.resize_with(from.len(), Vec::new);
    }
    for (slot, annotations) in into.iter_mut().zip(from) {
        slot.extend(annotations);
    }
}

fn missing(what: &str, index: impl std::fmt::Display, owner: &str) -> Error {
    malformed_error!("Type annotation names missing {} {} of {}", what, index, owner)
}

fn place_class_annotation(signature: &mut ClassSignature, record: TypeAnnotationRecord) -> Result<()> {
    let TypeAnnotationRecord {
        target,
        path,
        annotation,
    } = record;

    match target {
        TypeAnnotationTarget::ClassTypeParameter(index) => {
            let parameter = signature
                .type_parameters
                .get_mut(index as usize)
                .ok_or_else(|| missing("type parameter", index, "class"))?;
            parameter.annotations.push(annotation);
            Ok(())
        }
        TypeAnnotationTarget::ClassTypeParameterBound { parameter, bound } => signature
            .type_parameters
            .get_mut(parameter as usize)
            .and_then(|p| p.bound_mut(bound))
            .ok_or_else(|| missing("bound", bound, "class type parameter"))?
            .attach_annotation(&path, annotation),
        TypeAnnotationTarget::Supertype(SUPERCLASS_INDEX) => signature
            .superclass
            .as_mut()
            .ok_or_else(|| missing("superclass", "", "class"))?
            .attach_annotation(&path, annotation),
        TypeAnnotationTarget::Supertype(index) => signature
            .interfaces
            .get_mut(index as usize)
            .ok_or_else(|| missing("interface", index, "class"))?
            .attach_annotation(&path, annotation),
        other => Err(malformed_error!(
            "Type annotation target {:?} is not valid on a class",
            other
        )),
    }
}

fn place_method_annotation(
    signature: &mut MethodSignature,
    class_name: &str,
    method_name: &str,
    record: TypeAnnotationRecord,
) -> Result<()> {
    let TypeAnnotationRecord {
        target,
        path,
        annotation,
    } = record;

    match target {
        TypeAnnotationTarget::MethodTypeParameter(index) => {
            let parameter = signature
                .type_parameters
                .get_mut(index as usize)
                .ok_or_else(|| missing("type parameter", index, method_name))?;
            parameter.annotations.push(annotation);
            Ok(())
        }
        TypeAnnotationTarget::MethodTypeParameterBound { parameter, bound } => signature
            .type_parameters
            .get_mut(parameter as usize)
            .and_then(|p| p.bound_mut(bound))
            .ok_or_else(|| missing("type parameter bound", bound, method_name))?
            .attach_annotation(&path, annotation),
        TypeAnnotationTarget::Return => signature.result.attach_annotation(&path, annotation),
        TypeAnnotationTarget::Receiver => signature
            .receiver
            .get_or_insert_with(|| TypeSignature::class(class_name))
            .attach_annotation(&path, annotation),
        TypeAnnotationTarget::FormalParameter(index) => signature
            .parameters
            .get_mut(index as usize)
            .ok_or_else(|| missing("formal parameter", index, method_name))?
            .attach_annotation(&path, annotation),
        TypeAnnotationTarget::Throws(index) => signature
            .throws
            .get_mut(index as usize)
            .ok_or_else(|| missing("thrown type", index, method_name))?
            .attach_annotation(&path, annotation),
        TypeAnnotationTarget::Code => Ok(()),
        other => Err(malformed_error!(
            "Type annotation target {:?} is not valid on method {}",
            other,
            method_name
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        metadata::{constpool::ConstantValue, signatures::PrimitiveType},
        test::classfile::*,
    };

    fn decode(bytes: &[u8]) -> Result<ClassDescriptor> {
        ClassDecoder::new().decode("Test.class", 7, bytes, &DecodeOptions::default())
    }

    #[test]
    fn minimal_class() {
        let bytes = ClassFileBuilder::new("com/example/Foo")
            .version(61, 0)
            .source_file("Foo.java")
            .build();
        let class = decode(&bytes).unwrap();

        assert_eq!(class.name, "com.example.Foo");
        assert_eq!(class.kind, ClassKind::Class);
        assert_eq!(class.superclass.as_deref(), Some("java.lang.Object"));
        assert_eq!(class.major_version, 61);
        assert_eq!(class.source, "Test.class");
        assert_eq!(class.source_index, 7);
        assert_eq!(class.source_file.as_deref(), Some("Foo.java"));
        assert_eq!(class.package_name(), "com.example");
        assert_eq!(class.simple_name(), "Foo");
        assert_eq!(class.referenced_classes, ["java.lang.Object"]);
        assert!(class.signature.is_none());
    }

    #[test]
    fn kinds_and_superclass() {
        let iface = decode(&ClassFileBuilder::interface("a/I").build()).unwrap();
        assert_eq!(iface.kind, ClassKind::Interface);
        assert!(iface.superclass.is_none());

        let ann = decode(&ClassFileBuilder::annotation_type("a/Ann").build()).unwrap();
        assert_eq!(ann.kind, ClassKind::AnnotationType);
        assert_eq!(ann.interfaces, ["java.lang.annotation.Annotation"]);
        assert!(ann.superclass.is_none());

        let object = decode(&ClassFileBuilder::new("java/lang/Object").no_superclass().build())
            .unwrap();
        assert!(object.superclass.is_none());

        assert!(decode(&ClassFileBuilder::new("a/NoSuper").no_superclass().build()).is_err());
    }

    #[test]
    fn header_validation() {
        let good = ClassFileBuilder::new("a/B").build();

        let mut bad_magic = good.clone();
        bad_magic[0] = 0xCB;
        assert!(decode(&bad_magic).unwrap_err().is_format_error());

        let too_new = ClassFileBuilder::new("a/B").version(71, 0).build();
        assert!(decode(&too_new).unwrap_err().is_format_error());

        let too_old = ClassFileBuilder::new("a/B").version(44, 0).build();
        assert!(decode(&too_old).is_err());

        let options = DecodeOptions {
            max_major_version: 71,
            ..DecodeOptions::default()
        };
        assert!(ClassDecoder::new().decode("x", 0, &too_new, &options).is_ok());

        for len in [0, 3, 9, 20, good.len() - 1] {
            assert!(decode(&good[..len]).unwrap_err().is_format_error());
        }

        let mut trailing = good;
        trailing.push(0);
        assert!(decode(&trailing).is_err());
    }

    #[test]
    fn module_descriptor_not_supported() {
        let bytes = ClassFileBuilder::new("module-info")
            .access(ACC_MODULE)
            .no_superclass()
            .build();
        assert!(matches!(decode(&bytes), Err(Error::NotSupported(_))));
    }

    #[test]
    fn fields_and_constants() {
        let bytes = ClassFileBuilder::new("a/Consts")
            .field(FieldBuilder::new("MAX", "I").access(ACC_STATIC | ACC_FINAL).constant(Constant::Int(10)))
            .field(FieldBuilder::new("FLAG", "Z").access(ACC_STATIC | ACC_FINAL).constant(Constant::Int(1)))
            .field(FieldBuilder::new("LETTER", "C").access(ACC_STATIC | ACC_FINAL).constant(Constant::Int(0x41)))
            .field(FieldBuilder::new("BIG", "J").access(ACC_STATIC | ACC_FINAL).constant(Constant::Long(1 << 40)))
            .field(FieldBuilder::new("RATIO", "D").access(ACC_STATIC | ACC_FINAL).constant(Constant::Double(0.5)))
            .field(
                FieldBuilder::new("NAME", "Ljava/lang/String;")
                    .access(ACC_STATIC | ACC_FINAL)
                    .constant(Constant::Str("jvm".into())),
            )
            .field(FieldBuilder::new("mutable", "I").constant(Constant::Int(3)))
            .field(
                FieldBuilder::new("items", "Ljava/util/List;")
                    .signature("Ljava/util/List<Ljava/lang/String;>;")
                    .annotation(Ann::new("La/Inject;")),
            )
            .build();
        let class = decode(&bytes).unwrap();

        let constant = |name: &str| class.field(name).and_then(|f| f.constant_value.clone());
        assert_eq!(constant("MAX"), Some(ConstantValue::Int(10)));
        assert_eq!(constant("FLAG"), Some(ConstantValue::Boolean(true)));
        assert_eq!(constant("LETTER"), Some(ConstantValue::Char('A')));
        assert_eq!(constant("BIG"), Some(ConstantValue::Long(1 << 40)));
        assert_eq!(constant("RATIO"), Some(ConstantValue::Double(0.5)));
        assert_eq!(constant("NAME"), Some(ConstantValue::String("jvm".into())));
        assert_eq!(constant("mutable"), None);

        let items = class.field("items").unwrap();
        assert!(items.has_generic_signature);
        assert_eq!(items.type_signature.to_string(), "java.util.List<java.lang.String>");
        assert!(items.annotation("a.Inject").is_some());

        let max = class.field("MAX").unwrap();
        assert!(!max.has_generic_signature);
        assert_eq!(max.type_signature, TypeSignature::primitive(PrimitiveType::Int));
        assert_eq!(max.to_string(), "static final int MAX = 10");

        assert!(class.referenced_classes.contains(&"java.util.List".to_string()));
        assert!(class.referenced_classes.contains(&"a.Inject".to_string()));
    }

    #[test]
    fn mismatched_constant_is_malformed() {
        let bytes = ClassFileBuilder::new("a/Bad")
            .field(FieldBuilder::new("X", "I").access(ACC_FINAL).constant(Constant::Str("no".into())))
            .build();
        assert!(decode(&bytes).unwrap_err().is_format_error());
    }

    #[test]
    fn methods() {
        let bytes = ClassFileBuilder::annotation_type("a/Config")
            .method(
                MethodBuilder::new("timeout", "()I")
                    .access(ACC_PUBLIC | ACC_ABSTRACT)
                    .default_value(Elem::Int(30)),
            )
            .build();
        let config = decode(&bytes).unwrap();
        let timeout = config.methods_named("timeout").next().unwrap();
        assert_eq!(
            timeout.default_value,
            Some(AnnotationValue::Constant(ConstantValue::Int(30)))
        );

        let bytes = ClassFileBuilder::new("a/Service")
            .method(
                MethodBuilder::new("call", "(Ljava/lang/String;I)V")
                    .with_code()
                    .exception("java/io/IOException")
                    .parameter(Some("name"), 0)
                    .parameter(None, ACC_FINAL)
                    .parameter_annotations(vec![vec![Ann::new("La/NotNull;")], vec![]])
                    .annotation(Ann::new("La/Traced;")),
            )
            .method(
                MethodBuilder::new("map", "(Ljava/util/function/Function;)Ljava/lang/Object;")
                    .signature("<R:Ljava/lang/Object;>(Ljava/util/function/Function<-TR;+TR;>;)TR;^Ljava/lang/Exception;")
                    .exception("java/lang/Exception"),
            )
            .build();
        let service = decode(&bytes).unwrap();

        let call = service.methods_named("call").next().unwrap();
        assert_eq!(call.exceptions, ["java.io.IOException"]);
        assert_eq!(call.signature.throws, [TypeSignature::class("java.io.IOException")]);
        assert_eq!(call.parameter_names, [Some("name".to_string()), None]);
        assert_eq!(call.parameter_annotations(0)[0].name, "a.NotNull");
        assert!(call.parameter_annotations(1).is_empty());
        assert!(call.parameter_annotations(5).is_empty());
        assert!(call.annotation("a.Traced").is_some());
        assert!(!call.has_generic_signature);
        assert_eq!(
            call.to_string(),
            "public void call(java.lang.String, int) throws java.io.IOException"
        );

        let map = service.methods_named("map").next().unwrap();
        assert!(map.has_generic_signature);
        assert_eq!(map.signature.type_parameters[0].name, "R");
        assert_eq!(map.signature.throws.len(), 1);
        assert_eq!(
            map.signature.parameters[0].to_string(),
            "java.util.function.Function<? super R, ? extends R>"
        );
    }

    #[test]
    fn invisible_annotations_are_optional() {
        let bytes = ClassFileBuilder::new("a/C")
            .annotation(Ann::new("La/Visible;"))
            .invisible_annotation(Ann::new("La/Invisible;"))
            .build();

        let all = decode(&bytes).unwrap();
        assert_eq!(all.annotations.len(), 2);

        let options = DecodeOptions {
            include_invisible_annotations: false,
            ..DecodeOptions::default()
        };
        let visible = ClassDecoder::new().decode("x", 0, &bytes, &options).unwrap();
        assert_eq!(visible.annotations.len(), 1);
        assert_eq!(visible.annotations[0].name, "a.Visible");
    }

    #[test]
    fn nested_classes() {
        let outer = ClassFileBuilder::new("a/Outer")
            .inner_class("a/Outer$Inner", Some("a/Outer"), Some("Inner"), ACC_PRIVATE | ACC_STATIC)
            .inner_class("a/Other$X", Some("a/Other"), Some("X"), ACC_PUBLIC)
            .build();
        let outer = decode(&outer).unwrap();
        assert_eq!(outer.inner_classes, ["a.Outer$Inner"]);
        assert!(outer.outer_class.is_none());

        let inner = ClassFileBuilder::new("a/Outer$Inner")
            .access(ACC_SUPER)
            .inner_class("a/Outer$Inner", Some("a/Outer"), Some("Inner"), ACC_PRIVATE | ACC_STATIC)
            .build();
        let inner = decode(&inner).unwrap();
        assert_eq!(inner.outer_class.as_deref(), Some("a.Outer"));
        assert!(inner.modifiers.contains(ClassModifiers::PRIVATE | ClassModifiers::STATIC));
        assert_eq!(inner.simple_name(), "Inner");

        let local = ClassFileBuilder::new("a/Outer$1")
            .inner_class("a/Outer$1", None, None, 0)
            .enclosing_method("a/Outer", Some(("run", "()V")))
            .build();
        let local = decode(&local).unwrap();
        assert_eq!(local.outer_class.as_deref(), Some("a.Outer"));
        let enclosing = local.enclosing_method.unwrap();
        assert_eq!(enclosing.method_name.as_deref(), Some("run"));
        assert_eq!(enclosing.method_descriptor.as_deref(), Some("()V"));
    }

    #[test]
    fn unknown_attributes_are_skipped() {
        let bytes = ClassFileBuilder::new("a/C")
            .raw_attribute("Deprecated", &[])
            .raw_attribute("com.vendor.Custom", &[1, 2, 3, 4, 5])
            .method(MethodBuilder::new("<init>", "()V").with_code())
            .build();
        let class = decode(&bytes).unwrap();
        assert!(class.methods[0].is_constructor());
    }

    #[test]
    fn type_annotations_are_placed() {
        let bytes = ClassFileBuilder::new("a/Holder")
            .extends("a/Base")
            .implements("a/Iface")
            .type_annotation(TypeAnn::new(&[0x10, 0xFF, 0xFF], &[], Ann::new("La/OnSuper;")))
            .type_annotation(TypeAnn::new(&[0x10, 0x00, 0x00], &[], Ann::new("La/OnIface;")))
            .field(
                FieldBuilder::new("names", "[Ljava/util/List;")
                    .signature("[Ljava/util/List<Ljava/lang/String;>;")
                    .type_annotation(TypeAnn::new(&[0x13], &[], Ann::new("La/Arr;")))
                    .type_annotation(TypeAnn::new(&[0x13], &[(0, 0), (3, 0)], Ann::new("La/Str;"))),
            )
            .method(
                MethodBuilder::new("get", "(I)Ljava/lang/String;")
                    .type_annotation(TypeAnn::new(&[0x14], &[], Ann::new("La/Ret;")))
                    .type_annotation(TypeAnn::new(&[0x16, 0x00], &[], Ann::new("La/Param;")))
                    .type_annotation(TypeAnn::new(&[0x15], &[], Ann::new("La/Recv;"))),
            )
            .build();
        let class = decode(&bytes).unwrap();

        // No Signature attribute: one is synthesized to carry the supertype annotations
        let signature = class.signature.as_ref().unwrap();
        assert_eq!(
            signature.to_string(),
            "extends @a.OnSuper a.Base implements @a.OnIface a.Iface"
        );

        let names = class.field("names").unwrap();
        assert_eq!(
            names.type_signature.to_string(),
            "java.util.List<@a.Str java.lang.String> @a.Arr []"
        );

        let get = &class.methods[0];
        assert_eq!(get.signature.result.to_string(), "@a.Ret java.lang.String");
        assert_eq!(get.signature.parameters[0].to_string(), "@a.Param int");
        assert_eq!(
            get.signature.receiver.as_ref().map(ToString::to_string).as_deref(),
            Some("@a.Recv a.Holder")
        );
    }

    #[test]
    fn inner_constructor_parameter_skips_outer_instance() {
        let bytes = ClassFileBuilder::new("a/Outer$Inner")
            .method(
                MethodBuilder::new("<init>", "(La/Outer;[Ljava/lang/String;)V")
                    .type_annotation(TypeAnn::new(&[0x16, 0x00], &[(0, 0)], Ann::new("La/A;"))),
            )
            .inner_class("a/Outer$Inner", Some("a/Outer"), Some("Inner"), ACC_PUBLIC)
            .build();
        let class = decode(&bytes).unwrap();

        let parameters = &class.methods[0].signature.parameters;
        assert_eq!(parameters[0].to_string(), "a.Outer");
        assert_eq!(parameters[1].to_string(), "@a.A java.lang.String[]");

        // Static nested classes have no outer instance
        let bytes = ClassFileBuilder::new("a/Outer$Nested")
            .method(
                MethodBuilder::new("<init>", "(Ljava/lang/String;)V")
                    .type_annotation(TypeAnn::new(&[0x16, 0x00], &[], Ann::new("La/A;"))),
            )
            .inner_class("a/Outer$Nested", Some("a/Outer"), Some("Nested"), ACC_STATIC)
            .build();
        let class = decode(&bytes).unwrap();
        assert_eq!(
            class.methods[0].signature.parameters[0].to_string(),
            "@a.A java.lang.String"
        );
    }

    #[test]
    fn enum_constructor_parameter_skips_name_and_ordinal() {
        let bytes = ClassFileBuilder::new("a/Color")
            .access(ACC_PUBLIC | ACC_FINAL | ACC_SUPER | ACC_ENUM)
            .extends("java/lang/Enum")
            .method(
                MethodBuilder::new("<init>", "(Ljava/lang/String;ILjava/lang/String;)V")
                    .access(ACC_PRIVATE)
                    .type_annotation(TypeAnn::new(&[0x16, 0x00], &[], Ann::new("La/Hex;"))),
            )
            .method(
                MethodBuilder::new("of", "(Ljava/lang/String;)La/Color;")
                    .access(ACC_PUBLIC | ACC_STATIC)
                    .type_annotation(TypeAnn::new(&[0x16, 0x00], &[], Ann::new("La/Hex;"))),
            )
            .build();
        let class = decode(&bytes).unwrap();
        assert_eq!(class.kind, ClassKind::Enum);

        let constructor = &class.methods[0].signature.parameters;
        assert_eq!(constructor[0].to_string(), "java.lang.String");
        assert_eq!(constructor[1].to_string(), "int");
        assert_eq!(constructor[2].to_string(), "@a.Hex java.lang.String");

        let factory = &class.methods[1].signature.parameters;
        assert_eq!(factory[0].to_string(), "@a.Hex java.lang.String");
    }

    #[test]
    fn generic_constructor_signature_is_not_shifted() {
        let bytes = ClassFileBuilder::new("a/Outer$Inner")
            .method(
                MethodBuilder::new("<init>", "(La/Outer;Ljava/util/List;)V")
                    .signature("(Ljava/util/List<Ljava/lang/String;>;)V")
                    .type_annotation(TypeAnn::new(&[0x16, 0x00], &[], Ann::new("La/A;"))),
            )
            .inner_class("a/Outer$Inner", Some("a/Outer"), Some("Inner"), ACC_PUBLIC)
            .build();
        let class = decode(&bytes).unwrap();
        assert_eq!(
            class.methods[0].signature.parameters[0].to_string(),
            "@a.A java.util.List<java.lang.String>"
        );
    }

    #[test]
    fn invalid_type_annotation_path_rejects_class() {
        let bytes = ClassFileBuilder::new("a/C")
            .field(
                FieldBuilder::new("count", "I")
                    .type_annotation(TypeAnn::new(&[0x13], &[(0, 0)], Ann::new("La/A;"))),
            )
            .build();
        assert!(decode(&bytes).unwrap_err().is_format_error());

        let bytes = ClassFileBuilder::new("a/C")
            .method(
                MethodBuilder::new("m", "()V")
                    .type_annotation(TypeAnn::new(&[0x16, 0x03], &[], Ann::new("La/A;"))),
            )
            .build();
        assert!(decode(&bytes).is_err());
    }

    #[test]
    fn malformed_signature_rejects_class() {
        let bytes = ClassFileBuilder::new("a/C")
            .field(FieldBuilder::new("x", "Ljava/util/List;").signature("Ljava/util/List<"))
            .build();
        assert!(decode(&bytes).unwrap_err().is_format_error());
    }

    #[test]
    fn decoder_is_reusable() {
        let mut decoder = ClassDecoder::new();
        let options = DecodeOptions::default();

        let first = ClassFileBuilder::new("a/First").build();
        let second = ClassFileBuilder::new("b/Second").extends("a/First").build();

        assert!(decoder.decode("bad", 0, &[0xCA, 0xFE], &options).is_err());
        assert_eq!(decoder.decode("1", 0, &first, &options).unwrap().name, "a.First");
        decoder.reset();
        let second = decoder.decode("2", 1, &second, &options).unwrap();
        assert_eq!(second.superclass.as_deref(), Some("a.First"));
        assert_eq!(decoder.decoded(), 2);
    }
}
