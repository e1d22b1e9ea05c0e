//! Rendering parsed signatures back to JVM signature text.
//!
//! The output uses internal (`/`-separated) names and re-parses to a structurally identical
//! tree. Type-use annotations and receiver types have no representation in signature text
//! and are dropped.

use crate::metadata::{
    constpool::dotted_to_internal,
    signatures::{
        ClassSignature, ClassTypeSignature, MethodSignature, TypeParameter, TypeSignature,
        WildcardKind,
    },
};

/// Append the signature text of a type.
pub fn encode_type_signature(signature: &TypeSignature, out: &mut String) {
    match signature {
        TypeSignature::Primitive { kind, .. } => out.push(kind.descriptor()),
        TypeSignature::Class(class) => encode_class_type(class, out),
        TypeSignature::Array {
            element,
            dimension_annotations,
        } => {
            for _ in dimension_annotations {
                out.push('[');
            }
            encode_type_signature(element, out);
        }
        TypeSignature::TypeVariable { name, .. } => {
            out.push('T');
            out.push_str(name);
            out.push(';');
        }
        TypeSignature::Wildcard { kind, bound, .. } => match (kind, bound) {
            (WildcardKind::Extends, Some(bound)) => {
                out.push('+');
                encode_type_signature(bound, out);
            }
            (WildcardKind::Super, Some(bound)) => {
                out.push('-');
                encode_type_signature(bound, out);
            }
            _ => out.push('*'),
        },
    }
}

/// Append the signature text of a class type.
pub fn encode_class_type(class: &ClassTypeSignature, out: &mut String) {
    out.push('L');
    for (i, segment) in class.segments.iter().enumerate() {
        if i == 0 {
            out.push_str(&dotted_to_internal(&segment.name));
        } else {
            out.push('.');
            out.push_str(&segment.name);
        }

        if !segment.type_arguments.is_empty() {
            out.push('<');
            for argument in &segment.type_arguments {
                encode_type_signature(argument, out);
            }
            out.push('>');
        }
    }
    out.push(';');
}

fn encode_type_parameters(parameters: &[TypeParameter], out: &mut String) {
    if parameters.is_empty() {
        return;
    }

    out.push('<');
    for parameter in parameters {
        out.push_str(&parameter.name);
        out.push(':');
        if let Some(bound) = &parameter.class_bound {
            encode_type_signature(bound, out);
        }
        for bound in &parameter.interface_bounds {
            out.push(':');
            encode_type_signature(bound, out);
        }
    }
    out.push('>');
}

/// Render a method signature
#[must_use]
pub fn encode_method_signature(signature: &MethodSignature) -> String {
    let mut out = String::new();
    encode_type_parameters(&signature.type_parameters, &mut out);

    out.push('(');
    for parameter in &signature.parameters {
        encode_type_signature(parameter, &mut out);
    }
    out.push(')');
    encode_type_signature(&signature.result, &mut out);

    for thrown in &signature.throws {
        out.push('^');
        encode_type_signature(thrown, &mut out);
    }
    out
}

/// Render a class signature; a missing superclass is written as `java/lang/Object`
#[must_use]
pub fn encode_class_signature(signature: &ClassSignature) -> String {
    let mut out = String::new();
    encode_type_parameters(&signature.type_parameters, &mut out);

    match &signature.superclass {
        Some(superclass) => encode_class_type(superclass, &mut out),
        None => out.push_str("Ljava/lang/Object;"),
    }
    for interface in &signature.interfaces {
        encode_class_type(interface, &mut out);
    }
    out
}

impl TypeSignature {
    /// JVM signature text of this type
    #[must_use]
    pub fn encode(&self) -> String {
        let mut out = String::new();
        encode_type_signature(self, &mut out);
        out
    }
}

impl MethodSignature {
    /// JVM signature text of this method signature
    #[must_use]
    pub fn encode(&self) -> String {
        encode_method_signature(self)
    }
}

impl ClassSignature {
    /// JVM signature text of this class signature
    #[must_use]
    pub fn encode(&self) -> String {
        encode_class_signature(self)
    }
}

#[cfg(test)]
mod tests {
    use crate::metadata::signatures::{
        parse_class_signature, parse_field_signature, parse_method_signature,
    };

    #[test]
    fn field_round_trip() {
        for text in [
            "I",
            "[[Ljava/lang/String;",
            "TT;",
            "Ljava/util/Map<Ljava/lang/Integer;Ljava/util/Map<Ljava/lang/String;Ljava/lang/Boolean;>;>;",
            "Ljava/util/List<*>;",
            "La/Outer<TT;>.Inner<+[TU;>.Deep<-Ljava/lang/Number;>;",
        ] {
            let parsed = parse_field_signature(text).unwrap();
            assert_eq!(parsed.encode(), text);
            assert_eq!(parse_field_signature(&parsed.encode()).unwrap(), parsed);
        }
    }

    #[test]
    fn method_round_trip() {
        let text = "<T::Ljava/lang/Comparable<-TT;>;X:Ljava/lang/Exception;>(TT;[IJ)TT;^TX;^Ljava/io/IOException;";
        let parsed = parse_method_signature(text).unwrap();
        assert_eq!(parsed.encode(), text);
        assert_eq!(parse_method_signature(&parsed.encode()).unwrap(), parsed);
    }

    #[test]
    fn class_round_trip() {
        let text = "<E:Ljava/lang/Object;>Ljava/util/AbstractList<TE;>;Ljava/util/RandomAccess;";
        let parsed = parse_class_signature(text).unwrap();
        assert_eq!(parsed.encode(), text);
        assert_eq!(parse_class_signature(&parsed.encode()).unwrap(), parsed);
    }
}
