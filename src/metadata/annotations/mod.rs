//! Annotation decoding.
//!
//! Annotations are stored in the `RuntimeVisibleAnnotations` / `RuntimeInvisibleAnnotations`
//! attributes of classes, fields and methods, in the per-parameter variants on methods, and
//! as element defaults in `AnnotationDefault` on annotation type methods (JVMS §4.7.16 -
//! §4.7.22). All of them share the `annotation` and `element_value` encodings decoded by
//! [`crate::metadata::annotations::AnnotationParser`].
//!
//! # Value Model
//!
//! An [`crate::metadata::annotations::AnnotationInstance`] is the annotation type name plus
//! the explicitly given element values, in class file order. Each
//! [`crate::metadata::annotations::AnnotationValue`] is one of:
//!
//! - a primitive or `String` constant
//! - an enum constant reference
//! - a class literal (any type, including primitives and `void`)
//! - a nested annotation
//! - an array of values
//!
//! Element defaults declared on the annotation type are not merged here; see
//! [`crate::metadata::graph::ClassGraph::parameters_with_defaults`].
//!
//! # Examples
//!
//! ```rust
//! use jvmscope::metadata::{
//!     annotations::{AnnotationInstance, AnnotationValue},
//!     constpool::ConstantValue,
//! };
//!
//! let ann = AnnotationInstance::new("com.example.Retry")
//!     .with_parameter("times", AnnotationValue::Constant(ConstantValue::Int(3)));
//! assert_eq!(ann.to_string(), "@com.example.Retry(times=3)");
//! ```

mod parser;
mod types;

pub use parser::AnnotationParser;
pub use types::*;
