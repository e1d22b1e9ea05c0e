use crate::{
    file::parser::Parser,
    metadata::{
        annotations::{AnnotationInstance, AnnotationValue},
        constpool::{internal_to_dotted, ConstantPool, ConstantValue},
        signatures::parse_return_type,
    },
    Error::RecursionLimit,
    Result,
};

/// Maximum nesting depth of annotation and array element values
const MAX_RECURSION_DEPTH: usize = 50;

/// Decoder for the `annotation` and `element_value` structures (JVMS §4.7.16).
///
/// The parser borrows the cursor of the attribute being decoded and the class's constant
/// pool, which every name and constant in an annotation refers to.
pub struct AnnotationParser<'a, 'p> {
    parser: &'p mut Parser<'a>,
    pool: &'p ConstantPool,
    depth: usize,
}

impl<'a, 'p> AnnotationParser<'a, 'p> {
    /// Create a new `AnnotationParser`
    ///
    /// ## Arguments
    /// * 'parser' - Cursor positioned at the structure to decode
    /// * 'pool'   - Constant pool of the class
    pub fn new(parser: &'p mut Parser<'a>, pool: &'p ConstantPool) -> Self {
        AnnotationParser {
            parser,
            pool,
            depth: 0,
        }
    }

    /// Parse a `u2`-counted list of annotations (`Runtime*Annotations`)
    ///
    /// # Errors
    /// Returns an error if the data is malformed or references invalid pool entries
    pub fn parse_annotations(&mut self) -> Result<Vec<AnnotationInstance>> {
        let count = self.parser.read_be::<u16>()?;
        let mut annotations = Vec::with_capacity(count as usize);
        for _ in 0..count {
            annotations.push(self.parse_annotation()?);
        }
        Ok(annotations)
    }

    /// Parse a `u1`-counted list of per-parameter annotation lists
    /// (`Runtime*ParameterAnnotations`)
    ///
    /// # Errors
    /// Returns an error if the data is malformed or references invalid pool entries
    pub fn parse_parameter_annotations(&mut self) -> Result<Vec<Vec<AnnotationInstance>>> {
        let count = self.parser.read_be::<u8>()?;
        let mut parameters = Vec::with_capacity(count as usize);
        for _ in 0..count {
            parameters.push(self.parse_annotations()?);
        }
        Ok(parameters)
    }

    /// Parse one `annotation` structure
    ///
    /// # Errors
    /// Returns an error if the data is malformed or references invalid pool entries
    pub fn parse_annotation(&mut self) -> Result<AnnotationInstance> {
        self.depth += 1;
        if self.depth >= MAX_RECURSION_DEPTH {
            return Err(RecursionLimit(MAX_RECURSION_DEPTH));
        }

        let type_index = self.parser.read_be::<u16>()?;
        let name = self.class_from_descriptor(type_index)?;

        let count = self.parser.read_be::<u16>()?;
        let mut parameters = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let element_name = self.pool.utf8(self.parser.read_be::<u16>()?)?.to_string();
            let value = self.parse_element_value()?;
            parameters.push((element_name, value));
        }

        self.depth -= 1;
        Ok(AnnotationInstance { name, parameters })
    }

    /// Parse one `element_value` structure (also the body of `AnnotationDefault`)
    ///
    /// # Errors
    /// Returns an error if the data is malformed or references invalid pool entries
    pub fn parse_element_value(&mut self) -> Result<AnnotationValue> {
        self.depth += 1;
        if self.depth >= MAX_RECURSION_DEPTH {
            return Err(RecursionLimit(MAX_RECURSION_DEPTH));
        }

        let tag = self.parser.read_be::<u8>()?;
        let value = match tag {
            b'B' | b'C' | b'D' | b'F' | b'I' | b'J' | b'S' | b'Z' => {
                let index = self.parser.read_be::<u16>()?;
                let mut buffer = [0_u8; 4];
                let descriptor = char::from(tag).encode_utf8(&mut buffer);
                AnnotationValue::Constant(self.pool.constant_value(index, descriptor)?)
            }
            b's' => {
                let index = self.parser.read_be::<u16>()?;
                AnnotationValue::Constant(ConstantValue::String(
                    self.pool.utf8(index)?.to_string(),
                ))
            }
            b'e' => {
                let type_index = self.parser.read_be::<u16>()?;
                let name_index = self.parser.read_be::<u16>()?;
                AnnotationValue::Enum {
                    type_name: self.class_from_descriptor(type_index)?,
                    constant_name: self.pool.utf8(name_index)?.to_string(),
                }
            }
            b'c' => {
                let index = self.parser.read_be::<u16>()?;
                AnnotationValue::Class(parse_return_type(self.pool.utf8(index)?)?)
            }
            b'@' => AnnotationValue::Annotation(Box::new(self.parse_annotation()?)),
            b'[' => {
                let count = self.parser.read_be::<u16>()?;
                let mut values = Vec::with_capacity(count as usize);
                for _ in 0..count {
                    values.push(self.parse_element_value()?);
                }
                AnnotationValue::Array(values)
            }
            _ => {
                return Err(malformed_error!(
                    "Invalid element value tag '{}' at offset {}",
                    char::from(tag),
                    self.parser.pos() - 1
                ))
            }
        };

        self.depth -= 1;
        Ok(value)
    }

    /// Dotted class name from a `Utf8` field descriptor of the form `Lpkg/Name;`
    fn class_from_descriptor(&self, index: u16) -> Result<String> {
        let descriptor = self.pool.utf8(index)?;
        match descriptor
            .strip_prefix('L')
            .and_then(|d| d.strip_suffix(';'))
        {
            Some(internal) if !internal.is_empty() => Ok(internal_to_dotted(internal)),
            _ => Err(malformed_error!(
                "Expected a class descriptor at constant pool index {} - found '{}'",
                index,
                descriptor
            )),
        }
    }
}
