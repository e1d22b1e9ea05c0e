//! Generic signature and descriptor parsing.
//!
//! Class files describe types in two textual forms stored in the constant pool:
//!
//! - **Descriptors** (JVMS §4.3) - erased types of fields (`Ljava/util/List;`) and methods
//!   (`(I[B)V`), always present
//! - **Signatures** (JVMS §4.7.9.1) - the generic form from the `Signature` attribute
//!   (`Ljava/util/List<Ljava/lang/String;>;`), present only when generics are involved
//!
//! Descriptors are a subset of the signature grammar, so one recursive-descent
//! [`crate::metadata::signatures::SignatureParser`] handles both.
//!
//! # Signature Types
//!
//! - [`crate::metadata::signatures::TypeSignature`] - A field type, parameter, result,
//!   type argument or bound
//! - [`crate::metadata::signatures::MethodSignature`] - Type parameters, parameters, result,
//!   throws and receiver
//! - [`crate::metadata::signatures::ClassSignature`] - Type parameters, superclass and
//!   superinterfaces
//!
//! Every type node can carry type-use annotations. Those are not part of the signature text;
//! they are placed afterwards from the `Runtime*TypeAnnotations` attributes through
//! [`crate::metadata::signatures::TypeSignature::attach_annotation`].
//!
//! # Rendering
//!
//! `Display` renders Java source form with dotted, fully qualified names; `encode()` renders
//! signature text again.
//!
//! # Examples
//!
//! ```rust
//! use jvmscope::metadata::signatures::parse_field_signature;
//!
//! let text = "Lpkg/Map<Lpkg/Integer;Lpkg/Map<Lpkg/String;Lpkg/Boolean;>;>;";
//! let sig = parse_field_signature(text)?;
//!
//! assert_eq!(sig.to_string(), "pkg.Map<pkg.Integer, pkg.Map<pkg.String, pkg.Boolean>>");
//! assert_eq!(sig.encode(), text);
//! # Ok::<(), jvmscope::Error>(())
//! ```
//!
//! # References
//!
//! - JVMS SE 21, Section 4.3 - Descriptors
//! - JVMS SE 21, Section 4.7.9.1 - Signatures
//! - JVMS SE 21, Section 4.7.20.2 - The `type_path` structure

mod encoders;
mod parser;
mod placement;
mod types;

pub use encoders::*;
pub use parser::*;
pub use placement::*;
pub use types::*;

use crate::Result;

/// Parse a field signature or a plain field descriptor
///
/// ## Arguments
/// * 'text' - The signature text
///
/// # Errors
/// Returns an error if the signature is malformed or parsing fails
pub fn parse_field_signature(text: &str) -> Result<TypeSignature> {
    let mut parser = SignatureParser::new(text.as_bytes());
    parser.parse_field_signature()
}

/// Parse a method signature or a plain method descriptor
///
/// ## Arguments
/// * 'text' - The signature text
///
/// # Errors
/// Returns an error if the signature is malformed or parsing fails
pub fn parse_method_signature(text: &str) -> Result<MethodSignature> {
    let mut parser = SignatureParser::new(text.as_bytes());
    parser.parse_method_signature()
}

/// Parse a class signature
///
/// ## Arguments
/// * 'text' - The signature text
///
/// # Errors
/// Returns an error if the signature is malformed or parsing fails
pub fn parse_class_signature(text: &str) -> Result<ClassSignature> {
    let mut parser = SignatureParser::new(text.as_bytes());
    parser.parse_class_signature()
}

/// Parse a return descriptor, which may be `V`
///
/// ## Arguments
/// * 'text' - The descriptor text
///
/// # Errors
/// Returns an error if the descriptor is malformed or parsing fails
pub fn parse_return_type(text: &str) -> Result<TypeSignature> {
    let mut parser = SignatureParser::new(text.as_bytes());
    parser.parse_return_type()
}
