//! Index arena backing the class graph.
//!
//! Descriptors reference each other by name. When the graph is built every name edge that
//! resolves is turned into a [`NodeId`], and the reverse edges closure queries need
//! (subclasses, implementors, annotated types) are derived once. Unresolved names simply
//! have no edge.

use std::fmt;

use strum::Display;

use crate::metadata::descriptor::ClassDescriptorRc;

/// Index of a descriptor inside a [`crate::metadata::graph::ClassGraph`].
///
/// Node ids are assigned in source order when the graph is built and are only meaningful
/// for the graph that produced them.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// Returns the raw index value of this node identifier
    #[must_use]
    #[inline]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

/// Kind of a name reference between two descriptors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum EdgeKind {
    /// `extends`
    #[strum(serialize = "superclass")]
    Superclass,
    /// `implements`, or `extends` between interfaces
    #[strum(serialize = "interface")]
    Interface,
    /// Class-level annotation
    #[strum(serialize = "annotation")]
    Annotation,
    /// Annotation on a field or method
    #[strum(serialize = "member annotation")]
    MemberAnnotation,
    /// Declaring class of a nested, local or anonymous class
    #[strum(serialize = "outer class")]
    OuterClass,
    /// Member class declared in `InnerClasses`
    #[strum(serialize = "inner class")]
    InnerClass,
    /// Any other class named by the constant pool or a signature
    #[strum(serialize = "dependency")]
    Dependency,
}

/// One descriptor with its resolved edges.
#[derive(Debug, Clone)]
pub(crate) struct Node {
    pub descriptor: ClassDescriptorRc,

    pub superclass: Option<NodeId>,
    pub interfaces: Vec<NodeId>,
    pub annotations: Vec<NodeId>,
    pub outer: Option<NodeId>,
    pub inner: Vec<NodeId>,
    pub dependencies: Vec<NodeId>,

    pub subclasses: Vec<NodeId>,
    pub implementors: Vec<NodeId>,
    pub annotated: Vec<NodeId>,
    pub method_annotated: Vec<NodeId>,
    pub field_annotated: Vec<NodeId>,

    /// The descriptor is an annotation type carrying `@java.lang.annotation.Inherited`
    pub inherited: bool,
}

impl Node {
    pub fn new(descriptor: ClassDescriptorRc) -> Self {
        let inherited = descriptor.is_annotation()
            && descriptor
                .annotation("java.lang.annotation.Inherited")
                .is_some();

        Node {
            descriptor,
            superclass: None,
            interfaces: Vec::new(),
            annotations: Vec::new(),
            outer: None,
            inner: Vec::new(),
            dependencies: Vec::new(),
            subclasses: Vec::new(),
            implementors: Vec::new(),
            annotated: Vec::new(),
            method_annotated: Vec::new(),
            field_annotated: Vec::new(),
            inherited,
        }
    }
}

/// Append `id` unless present; edge lists are short so a scan is enough
pub(crate) fn push_unique(list: &mut Vec<NodeId>, id: NodeId) {
    if !list.contains(&id) {
        list.push(id);
    }
}
