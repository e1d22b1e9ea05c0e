use crate::{
    file::parser::Parser,
    metadata::{
        constpool::internal_to_dotted,
        signatures::{
            ClassSegment, ClassSignature, ClassTypeSignature, MethodSignature, PrimitiveType,
            TypeParameter, TypeSignature, WildcardKind,
        },
    },
    Error::RecursionLimit,
    Result,
};

/// Maximum nesting depth of type arguments and array elements
const MAX_RECURSION_DEPTH: usize = 50;

/// Recursive-descent parser for generic signatures and plain descriptors (JVMS §4.7.9.1).
///
/// Plain field and method descriptors are a subset of the signature grammar, so the same
/// entry points serve both.
///
/// # Example
///
/// ```rust
/// use jvmscope::metadata::signatures::SignatureParser;
///
/// let mut parser = SignatureParser::new(b"<T:Ljava/lang/Object;>(TT;I)Ljava/util/List<TT;>;");
/// let sig = parser.parse_method_signature()?;
/// assert_eq!(sig.parameters.len(), 2);
/// assert_eq!(sig.to_string(), "<T> java.util.List<T> (T, int)");
/// # Ok::<(), jvmscope::Error>(())
/// ```
///
/// Use one parser instance per signature string.
pub struct SignatureParser<'a> {
    parser: Parser<'a>,
    depth: usize,
}

impl<'a> SignatureParser<'a> {
    /// Create a new `SignatureParser` over signature text
    ///
    /// ## Arguments
    /// * 'data' - The signature bytes (modified UTF-8 already decoded)
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        SignatureParser {
            parser: Parser::new(data),
            depth: 0,
        }
    }

    fn enter(&mut self) -> Result<()> {
        self.depth += 1;
        if self.depth >= MAX_RECURSION_DEPTH {
            return Err(RecursionLimit(MAX_RECURSION_DEPTH));
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    fn finish(&self) -> Result<()> {
        if self.parser.has_more_data() {
            return Err(malformed_error!(
                "Trailing data in signature at offset {}",
                self.parser.pos()
            ));
        }
        Ok(())
    }

    /// Identifier up to one of the signature delimiters
    fn parse_identifier(&mut self, stop: fn(u8) -> bool) -> Result<String> {
        let start = self.parser.pos();
        let bytes = self.parser.take_until(stop)?;
        if bytes.is_empty() {
            return Err(malformed_error!("Empty identifier in signature at offset {}", start));
        }

        match std::str::from_utf8(bytes) {
            Ok(text) => Ok(text.to_string()),
            Err(_) => Err(malformed_error!("Invalid identifier in signature at offset {}", start)),
        }
    }

    /// `JavaTypeSignature`, optionally allowing `V`
    fn parse_type(&mut self, allow_void: bool) -> Result<TypeSignature> {
        self.enter()?;
        let result = self.parse_type_inner(allow_void);
        self.leave();
        result
    }

    fn parse_type_inner(&mut self, allow_void: bool) -> Result<TypeSignature> {
        let current_byte = self.parser.peek_byte()?;
        match current_byte {
            b'L' => Ok(TypeSignature::Class(self.parse_class_type()?)),
            b'T' => self.parse_type_variable(),
            b'[' => {
                let mut dimensions = 0;
                while self.parser.peek_byte()? == b'[' {
                    self.parser.advance()?;
                    dimensions += 1;
                }
                let element = self.parse_type(false)?;
                Ok(TypeSignature::array(element, dimensions))
            }
            b'V' if !allow_void => Err(malformed_error!(
                "'void' is not a valid type at offset {}",
                self.parser.pos()
            )),
            _ => match PrimitiveType::from_descriptor(current_byte) {
                Some(kind) => {
                    self.parser.advance()?;
                    Ok(TypeSignature::primitive(kind))
                }
                None => Err(malformed_error!(
                    "Unexpected '{}' in signature at offset {}",
                    char::from(current_byte),
                    self.parser.pos()
                )),
            },
        }
    }

    /// `ReferenceTypeSignature`
    fn parse_reference_type(&mut self) -> Result<TypeSignature> {
        match self.parser.peek_byte()? {
            b'L' | b'T' | b'[' => self.parse_type(false),
            other => Err(malformed_error!(
                "Expected reference type at offset {} - found '{}'",
                self.parser.pos(),
                char::from(other)
            )),
        }
    }

    /// `T Identifier ;`
    fn parse_type_variable(&mut self) -> Result<TypeSignature> {
        self.parser.expect_byte(b'T')?;
        let name = self.parse_identifier(|b| b == b';')?;
        self.parser.expect_byte(b';')?;
        Ok(TypeSignature::type_variable(name))
    }

    /// `L PackageSpecifier? SimpleClassTypeSignature ClassTypeSignatureSuffix* ;`
    fn parse_class_type(&mut self) -> Result<ClassTypeSignature> {
        self.parser.expect_byte(b'L')?;

        let mut segments = Vec::with_capacity(1);
        loop {
            let name = self.parse_identifier(|b| matches!(b, b';' | b'<' | b'.'))?;
            let name = if segments.is_empty() {
                internal_to_dotted(&name)
            } else {
                name
            };

            let type_arguments = if self.parser.peek_byte()? == b'<' {
                self.parse_type_arguments()?
            } else {
                Vec::new()
            };

            segments.push(ClassSegment {
                name,
                type_arguments,
                annotations: Vec::new(),
            });

            match self.parser.read_be::<u8>()? {
                b';' => break,
                b'.' => continue,
                other => {
                    return Err(malformed_error!(
                        "Unexpected '{}' after class type segment at offset {}",
                        char::from(other),
                        self.parser.pos() - 1
                    ))
                }
            }
        }

        Ok(ClassTypeSignature { segments })
    }

    /// `< TypeArgument+ >`
    fn parse_type_arguments(&mut self) -> Result<Vec<TypeSignature>> {
        self.parser.expect_byte(b'<')?;

        let mut arguments = Vec::new();
        while self.parser.peek_byte()? != b'>' {
            let argument = match self.parser.peek_byte()? {
                b'*' => {
                    self.parser.advance()?;
                    TypeSignature::Wildcard {
                        kind: WildcardKind::Unbounded,
                        bound: None,
                        annotations: Vec::new(),
                    }
                }
                indicator @ (b'+' | b'-') => {
                    self.parser.advance()?;
                    let kind = if indicator == b'+' {
                        WildcardKind::Extends
                    } else {
                        WildcardKind::Super
                    };
                    TypeSignature::Wildcard {
                        kind,
                        bound: Some(Box::new(self.parse_reference_type()?)),
                        annotations: Vec::new(),
                    }
                }
                _ => self.parse_reference_type()?,
            };
            arguments.push(argument);
        }
        self.parser.advance()?;

        if arguments.is_empty() {
            return Err(malformed_error!("Empty type argument list"));
        }
        Ok(arguments)
    }

    /// `< TypeParameter+ >`, or nothing
    fn parse_type_parameters(&mut self) -> Result<Vec<TypeParameter>> {
        if !self.parser.has_more_data() || self.parser.peek_byte()? != b'<' {
            return Ok(Vec::new());
        }
        self.parser.advance()?;

        let mut parameters = Vec::new();
        while self.parser.peek_byte()? != b'>' {
            let name = self.parse_identifier(|b| b == b':')?;

            // ClassBound: ':' ReferenceTypeSignature?
            self.parser.expect_byte(b':')?;
            let class_bound = match self.parser.peek_byte()? {
                b'L' | b'T' | b'[' => Some(self.parse_reference_type()?),
                _ => None,
            };

            let mut interface_bounds = Vec::new();
            while self.parser.peek_byte()? == b':' {
                self.parser.advance()?;
                interface_bounds.push(self.parse_reference_type()?);
            }

            parameters.push(TypeParameter {
                name,
                class_bound,
                interface_bounds,
                annotations: Vec::new(),
            });
        }
        self.parser.advance()?;

        if parameters.is_empty() {
            return Err(malformed_error!("Empty type parameter list"));
        }
        Ok(parameters)
    }

    /// Parse a field signature or a plain field descriptor
    ///
    /// # Errors
    /// Returns an error if the text is malformed, nests too deeply or has trailing data
    pub fn parse_field_signature(&mut self) -> Result<TypeSignature> {
        let ty = self.parse_type(false)?;
        self.finish()?;
        Ok(ty)
    }

    /// Parse a return type descriptor, which may be `V` (annotation class values)
    ///
    /// # Errors
    /// Returns an error if the text is malformed, nests too deeply or has trailing data
    pub fn parse_return_type(&mut self) -> Result<TypeSignature> {
        let ty = self.parse_type(true)?;
        self.finish()?;
        Ok(ty)
    }

    /// Parse a method signature or a plain method descriptor
    ///
    /// # Errors
    /// Returns an error if the text is malformed, nests too deeply or has trailing data
    pub fn parse_method_signature(&mut self) -> Result<MethodSignature> {
        let type_parameters = self.parse_type_parameters()?;

        self.parser.expect_byte(b'(')?;
        let mut parameters = Vec::new();
        while self.parser.peek_byte()? != b')' {
            parameters.push(self.parse_type(false)?);
        }
        self.parser.advance()?;

        let result = self.parse_type(true)?;

        let mut throws = Vec::new();
        while self.parser.has_more_data() {
            self.parser.expect_byte(b'^')?;
            let thrown = match self.parser.peek_byte()? {
                b'L' => TypeSignature::Class(self.parse_class_type()?),
                b'T' => self.parse_type_variable()?,
                other => {
                    return Err(malformed_error!(
                        "Invalid throws signature starting with '{}'",
                        char::from(other)
                    ))
                }
            };
            throws.push(thrown);
        }

        Ok(MethodSignature {
            type_parameters,
            parameters,
            result,
            throws,
            receiver: None,
        })
    }

    /// Parse a class signature
    ///
    /// # Errors
    /// Returns an error if the text is malformed, nests too deeply or has trailing data
    pub fn parse_class_signature(&mut self) -> Result<ClassSignature> {
        let type_parameters = self.parse_type_parameters()?;
        let superclass = self.parse_class_type()?;

        let mut interfaces = Vec::new();
        while self.parser.has_more_data() {
            interfaces.push(self.parse_class_type()?);
        }

        Ok(ClassSignature {
            type_parameters,
            superclass: Some(superclass),
            interfaces,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    fn field(text: &str) -> Result<TypeSignature> {
        SignatureParser::new(text.as_bytes()).parse_field_signature()
    }

    #[test]
    fn plain_descriptors() {
        assert_eq!(field("I").unwrap(), TypeSignature::primitive(PrimitiveType::Int));
        assert_eq!(field("Ljava/lang/String;").unwrap().to_string(), "java.lang.String");
        assert_eq!(field("[[J").unwrap().to_string(), "long[][]");
        assert!(field("V").is_err());
    }

    #[test]
    fn nested_type_arguments() {
        let sig = field(
            "Lpkg/Map<Lpkg/Integer;Lpkg/Map<Lpkg/String;Lpkg/Boolean;>;>;",
        )
        .unwrap();
        assert_eq!(
            sig.to_string(),
            "pkg.Map<pkg.Integer, pkg.Map<pkg.String, pkg.Boolean>>"
        );
    }

    #[test]
    fn wildcards() {
        let sig = field("Ljava/util/Map<*+TK;-[Ljava/lang/Number;>;").unwrap();
        assert_eq!(
            sig.to_string(),
            "java.util.Map<?, ? extends K, ? super java.lang.Number[]>"
        );
    }

    #[test]
    fn inner_class_chain() {
        let sig = field("La/Outer<TT;>.Inner<Ljava/lang/String;>.Deep;").unwrap();
        let TypeSignature::Class(class) = &sig else {
            panic!("expected class type");
        };
        assert_eq!(class.segments.len(), 3);
        assert_eq!(class.name(), "a.Outer$Inner$Deep");
        assert_eq!(sig.to_string(), "a.Outer<T>.Inner<java.lang.String>.Deep");
    }

    #[test]
    fn method_signature() {
        let sig = SignatureParser::new(
            b"<T:Ljava/lang/Object;E:Ljava/lang/Exception;>(ITT;[Ljava/util/List<*>;)V^TE;^Ljava/io/IOException;",
        )
        .parse_method_signature()
        .unwrap();

        assert_eq!(sig.type_parameters.len(), 2);
        assert_eq!(sig.parameters.len(), 3);
        assert!(sig.result.is_void());
        assert_eq!(sig.throws.len(), 2);
        assert_eq!(
            sig.to_string(),
            "<T, E extends java.lang.Exception> void (int, T, java.util.List<?>[]) throws E, java.io.IOException"
        );
    }

    #[test]
    fn method_descriptor() {
        let sig = SignatureParser::new(b"(Ljava/lang/String;[B)Ljava/lang/Object;")
            .parse_method_signature()
            .unwrap();
        assert!(sig.type_parameters.is_empty());
        assert_eq!(sig.parameters[1].to_string(), "byte[]");
        assert_eq!(sig.result.class_name().as_deref(), Some("java.lang.Object"));
    }

    #[test]
    fn class_signature() {
        let sig = SignatureParser::new(
            b"<K::Ljava/lang/Comparable<TK;>;V:Ljava/lang/Object;>La/Base<TK;>;La/Iface;Ljava/io/Serializable;",
        )
        .parse_class_signature()
        .unwrap();

        assert_eq!(sig.type_parameters[0].class_bound, None);
        assert_eq!(sig.type_parameters[0].interface_bounds.len(), 1);
        assert_eq!(sig.interfaces.len(), 2);
        assert_eq!(
            sig.to_string(),
            "<K extends java.lang.Comparable<K>, V> extends a.Base<K> implements a.Iface, java.io.Serializable"
        );
    }

    #[test]
    fn return_type_allows_void() {
        let sig = SignatureParser::new(b"V").parse_return_type().unwrap();
        assert!(sig.is_void());
    }

    #[test]
    fn malformed() {
        assert!(field("").is_err());
        assert!(field("Ljava/lang/String").is_err());
        assert!(field("L;").is_err());
        assert!(field("Ljava/util/List<>;").is_err());
        assert!(field("II").is_err());
        assert!(field("Q").is_err());
        assert!(field("TT").is_err());
        assert!(SignatureParser::new(b"(I").parse_method_signature().is_err());
        assert!(SignatureParser::new(b"()V^I").parse_method_signature().is_err());
        assert!(SignatureParser::new(b"<>La/B;").parse_class_signature().is_err());
    }

    #[test]
    fn recursion_limit() {
        let mut text = String::new();
        for _ in 0..100 {
            text.push_str("La/L<");
        }
        text.push('I');

        assert!(matches!(field(&text), Err(Error::RecursionLimit(_))));
    }
}
