//! # jvmscope Prelude
//!
//! This module provides a convenient prelude for the most commonly used types and traits
//! from the jvmscope library. Import this module to get quick access to the essential
//! types for scanning class files and querying the class graph.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all jvmscope operations
pub use crate::Error;

/// The result type used throughout jvmscope
pub use crate::Result;

// ================================================================================================
// Scanning
// ================================================================================================

/// Main entry point for scanning many classes
pub use crate::scan::{ScanConfig, ScanResult, Scanner};

/// Cooperative cancellation of a running scan
pub use crate::utils::synchronization::CancellationToken;

/// Byte sources
pub use crate::file::{memory::ClassBytes, physical::ClassPathEntry, ByteSource};

/// Low-level parsing
pub use crate::Parser;

// ================================================================================================
// Descriptors
// ================================================================================================

/// Single-class decoding
pub use crate::metadata::descriptor::{ClassDecoder, DecodeOptions};

/// Class, field and method descriptors
pub use crate::metadata::descriptor::{
    ClassDescriptor, ClassDescriptorRc, ClassKind, ClassModifiers, EnclosingMethod,
    FieldDescriptor, FieldModifiers, MethodDescriptor, MethodModifiers,
};

/// Constant values of `static final` fields
pub use crate::metadata::constpool::ConstantValue;

// ================================================================================================
// Signatures and Annotations
// ================================================================================================

/// Generic signature model
pub use crate::metadata::signatures::{
    ClassSignature, ClassTypeSignature, MethodSignature, PrimitiveType, TypeParameter,
    TypeSignature, WildcardKind,
};

/// Annotation instances and element values
pub use crate::metadata::annotations::{AnnotationInstance, AnnotationValue};

// ================================================================================================
// Graph and Diagnostics
// ================================================================================================

/// The class graph and closure query results
pub use crate::metadata::graph::{ClassGraph, DescriptorSet, SetEntry};

/// Problems recorded during a scan
pub use crate::metadata::diagnostics::{
    Diagnostic, DiagnosticCategory, DiagnosticSeverity, Diagnostics,
};
