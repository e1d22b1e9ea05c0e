//! The class graph: every descriptor of one scan, linked by name references.
//!
//! Descriptors only name the classes they refer to. [`ClassGraph::build`] resolves those
//! names once into an index arena, so lookups never depend on the order in which classes
//! were decoded, and cyclic references (mutually meta-annotated annotation types,
//! classes referring to each other) are simply cycles in the arena. Names that do not
//! resolve leave no edge; they are reported as `Reference` diagnostics, except for
//! `java.lang.Object`, which a scan of application code rarely contains.
//!
//! # Closure queries
//!
//! Each relationship query is a cycle-safe breadth-first traversal returning a
//! [`DescriptorSet`] in discovery order. Elements found in the first layer are flagged as
//! direct, so [`DescriptorSet::direct_only`] yields the one-hop answer. The seed itself is
//! only part of the result when a cycle leads back to it. Unknown names yield an empty set.
//!
//! | Query | Relationship |
//! |-------|--------------|
//! | [`ClassGraph::ancestors_of`] | superclass chain |
//! | [`ClassGraph::descendants_of`] | subclasses |
//! | [`ClassGraph::interfaces_of`] | implemented interfaces, their superinterfaces and those of superclasses |
//! | [`ClassGraph::implementors_of`] | classes implementing an interface, directly or not |
//! | [`ClassGraph::annotations_on`] | annotations, meta-annotations, `@Inherited` annotations of superclasses |
//! | [`ClassGraph::types_with_annotation`] | the reverse of `annotations_on` |
//! | [`ClassGraph::classes_with_method_annotation`] | classes declaring an annotated method |
//! | [`ClassGraph::classes_with_field_annotation`] | classes declaring an annotated field |
//! | [`ClassGraph::inner_classes_of`] / [`ClassGraph::outer_classes_of`] | nesting |
//! | [`ClassGraph::dependencies_of`] | classes named in the constant pool or signatures |
//!
//! # Examples
//!
//! ```rust,no_run
//! use jvmscope::{ScanConfig, Scanner};
//!
//! # fn sources() -> Vec<(String, Vec<u8>)> { Vec::new() }
//! let result = Scanner::new(ScanConfig::default()).scan(sources())?;
//! let graph = result.graph();
//!
//! for class in &graph.implementors_of("java.lang.Runnable") {
//!     println!("{} implements Runnable", class.name);
//! }
//!
//! let direct = graph.descendants_of("com.example.Base").direct_only();
//! println!("{} direct subclasses", direct.len());
//! # Ok::<(), jvmscope::Error>(())
//! ```

mod arena;
mod closure;
mod registry;
mod set;

use std::collections::HashMap;

pub use arena::{EdgeKind, NodeId};
pub use registry::{DescriptorRegistry, Registration};
pub use set::{DescriptorSet, SetEntry};

use crate::{
    metadata::{
        annotations::{AnnotationInstance, AnnotationValue},
        descriptor::{ClassDescriptor, ClassDescriptorRc},
        diagnostics::{Diagnostic, DiagnosticCategory, DiagnosticSeverity, Diagnostics},
        graph::{
            arena::{push_unique, Node},
            closure::{closure, Step},
        },
    },
    Error, Result,
};

/// Root of the class hierarchy; unresolved references to it are expected
const OBJECT: &str = "java.lang.Object";

/// Immutable, name-indexed graph of the descriptors of one scan.
#[derive(Debug, Clone, Default)]
pub struct ClassGraph {
    nodes: Vec<Node>,
    by_name: HashMap<String, NodeId>,
}

impl ClassGraph {
    /// Build a graph from descriptors with unique names.
    ///
    /// Nodes are ordered by source position and then name. Every superclass, interface,
    /// class annotation and nesting reference that does not resolve is recorded in
    /// `diagnostics` when `report_unresolved` is set.
    pub fn build<I>(descriptors: I, diagnostics: &Diagnostics, report_unresolved: bool) -> Self
    where
        I: IntoIterator<Item = ClassDescriptorRc>,
    {
        let mut descriptors: Vec<ClassDescriptorRc> = descriptors.into_iter().collect();
        descriptors.sort_by(|a, b| {
            a.source_index
                .cmp(&b.source_index)
                .then_with(|| a.name.cmp(&b.name))
        });

        let by_name: HashMap<String, NodeId> = descriptors
            .iter()
            .enumerate()
            .map(|(index, descriptor)| (descriptor.name.clone(), NodeId(index)))
            .collect();
        let mut nodes: Vec<Node> = descriptors.into_iter().map(Node::new).collect();

        let mut unresolved = 0_usize;
        for index in 0..nodes.len() {
            let id = NodeId(index);
            let descriptor = nodes[index].descriptor.clone();

            let mut resolve = |kind: EdgeKind, target: &str| -> Option<NodeId> {
                let found = by_name.get(target).copied();
                if found.is_none() && report_unresolved && target != OBJECT {
                    unresolved += 1;
                    diagnostics.push(
                        Diagnostic::new(
                            DiagnosticSeverity::Warning,
                            DiagnosticCategory::Reference,
                            format!("Unresolved {kind} reference to {target}"),
                        )
                        .with_source(descriptor.source.as_str())
                        .with_class(descriptor.name.as_str()),
                    );
                }
                found
            };

            let superclass = descriptor
                .superclass
                .as_deref()
                .and_then(|s| resolve(EdgeKind::Superclass, s));
            let interfaces: Vec<NodeId> = descriptor
                .interfaces
                .iter()
                .filter_map(|i| resolve(EdgeKind::Interface, i))
                .collect();
            let annotations: Vec<NodeId> = descriptor
                .annotations
                .iter()
                .filter_map(|a| resolve(EdgeKind::Annotation, a.name.as_str()))
                .collect();
            let outer = descriptor
                .outer_class
                .as_deref()
                .and_then(|o| resolve(EdgeKind::OuterClass, o));
            let inner: Vec<NodeId> = descriptor
                .inner_classes
                .iter()
                .filter_map(|i| resolve(EdgeKind::InnerClass, i))
                .collect();

            let silent = |name: &str| by_name.get(name).copied();
            let dependencies: Vec<NodeId> = descriptor
                .referenced_classes
                .iter()
                .filter_map(|r| silent(r.as_str()))
                .collect();
            let method_annotations: Vec<NodeId> = descriptor
                .methods
                .iter()
                .flat_map(|m| &m.annotations)
                .filter_map(|a| silent(a.name.as_str()))
                .collect();
            let field_annotations: Vec<NodeId> = descriptor
                .fields
                .iter()
                .flat_map(|f| &f.annotations)
                .filter_map(|a| silent(a.name.as_str()))
                .collect();

            if let Some(target) = superclass {
                push_unique(&mut nodes[target.0].subclasses, id);
            }
            for &target in &interfaces {
                push_unique(&mut nodes[target.0].implementors, id);
            }
            for &target in &annotations {
                push_unique(&mut nodes[target.0].annotated, id);
            }
            for target in method_annotations {
                push_unique(&mut nodes[target.0].method_annotated, id);
            }
            for target in field_annotations {
                push_unique(&mut nodes[target.0].field_annotated, id);
            }
            if let Some(target) = outer {
                push_unique(&mut nodes[target.0].inner, id);
            }

            let node = &mut nodes[index];
            node.superclass = superclass;
            for target in interfaces {
                push_unique(&mut node.interfaces, target);
            }
            for target in annotations {
                push_unique(&mut node.annotations, target);
            }
            node.outer = outer;
            for target in inner {
                push_unique(&mut node.inner, target);
            }
            for target in dependencies {
                push_unique(&mut node.dependencies, target);
            }
        }

        tracing::debug!(
            "built class graph with {} classes, {} unresolved references",
            nodes.len(),
            unresolved
        );

        ClassGraph { nodes, by_name }
    }

    /// Number of classes
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if the graph has no classes
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns `true` if a class named `name` is in the graph
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Borrow the descriptor named `name`
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ClassDescriptorRc> {
        self.by_name
            .get(name)
            .map(|id| &self.nodes[id.0].descriptor)
    }

    /// Resolve a class name to its shared descriptor.
    ///
    /// Resolution has no side effects: resolving the same name twice yields the same `Arc`.
    #[must_use]
    pub fn resolve(&self, name: &str) -> Option<ClassDescriptorRc> {
        self.get(name).cloned()
    }

    /// Resolve a class name that must be present.
    ///
    /// # Errors
    /// Returns [`crate::Error::ReferenceNotFound`] if no class of that name was scanned.
    pub fn require(&self, name: &str) -> Result<ClassDescriptorRc> {
        self.resolve(name)
            .ok_or_else(|| Error::ReferenceNotFound(name.to_string()))
    }

    /// Arena index of `name`
    #[must_use]
    pub fn node_id(&self, name: &str) -> Option<NodeId> {
        self.by_name.get(name).copied()
    }

    /// Descriptor at an arena index
    #[must_use]
    pub fn descriptor(&self, id: NodeId) -> Option<&ClassDescriptorRc> {
        self.nodes.get(id.0).map(|n| &n.descriptor)
    }

    /// All descriptors in source order
    pub fn iter(&self) -> impl Iterator<Item = &ClassDescriptorRc> {
        self.nodes.iter().map(|n| &n.descriptor)
    }

    /// Resolved superclass of `class`
    #[must_use]
    pub fn resolve_superclass(&self, class: &ClassDescriptor) -> Option<ClassDescriptorRc> {
        class.superclass.as_deref().and_then(|s| self.resolve(s))
    }

    /// Resolved declared interfaces of `class`; unresolved names are skipped
    #[must_use]
    pub fn resolve_interfaces(&self, class: &ClassDescriptor) -> Vec<ClassDescriptorRc> {
        class
            .interfaces
            .iter()
            .filter_map(|i| self.resolve(i))
            .collect()
    }

    /// Resolved annotation type of an annotation instance
    #[must_use]
    pub fn resolve_annotation_type(
        &self,
        annotation: &AnnotationInstance,
    ) -> Option<ClassDescriptorRc> {
        self.resolve(&annotation.name)
    }

    /// Explicit parameters of `annotation` followed by the element defaults declared on its
    /// annotation type for every element not set explicitly.
    ///
    /// Without a resolved annotation type only the explicit parameters are returned.
    #[must_use]
    pub fn parameters_with_defaults(
        &self,
        annotation: &AnnotationInstance,
    ) -> Vec<(String, AnnotationValue)> {
        let mut parameters = annotation.parameters.clone();
        if let Some(annotation_type) = self.get(&annotation.name) {
            for method in &annotation_type.methods {
                let Some(default) = &method.default_value else {
                    continue;
                };
                if !parameters.iter().any(|(name, _)| *name == method.name) {
                    parameters.push((method.name.clone(), default.clone()));
                }
            }
        }
        parameters
    }

    /// Superclass chain of `name`, nearest first. Interfaces are not ancestors.
    #[must_use]
    pub fn ancestors_of(&self, name: &str) -> DescriptorSet {
        self.query(name, |_, node, steps| {
            if let Some(superclass) = node.superclass {
                steps.push(Step::report(superclass));
            }
        })
    }

    /// Subclasses of `name`, transitively
    #[must_use]
    pub fn descendants_of(&self, name: &str) -> DescriptorSet {
        self.query(name, |_, node, steps| {
            steps.extend(node.subclasses.iter().copied().map(Step::report));
        })
    }

    /// Interfaces of `name`: declared ones, their superinterfaces, and the interfaces of
    /// every superclass
    #[must_use]
    pub fn interfaces_of(&self, name: &str) -> DescriptorSet {
        self.query(name, |_, node, steps| {
            steps.extend(node.interfaces.iter().copied().map(Step::report));
            if let Some(superclass) = node.superclass {
                steps.push(Step::traverse(superclass));
            }
        })
    }

    /// Classes implementing the interface `name` directly, through a subinterface, or
    /// through a superclass. Subinterfaces themselves are not reported.
    #[must_use]
    pub fn implementors_of(&self, name: &str) -> DescriptorSet {
        self.query(name, |_, node, steps| {
            for &implementor in &node.implementors {
                if self.nodes[implementor.0].descriptor.is_interface() {
                    steps.push(Step::traverse(implementor));
                } else {
                    steps.push(Step::report(implementor));
                }
            }
            steps.extend(node.subclasses.iter().copied().map(Step::report));
        })
    }

    /// Annotation types applying to `name`: its own annotations, their meta-annotations,
    /// and `@Inherited` annotations of its superclasses
    #[must_use]
    pub fn annotations_on(&self, name: &str) -> DescriptorSet {
        let Some(seed) = self.node_id(name) else {
            return DescriptorSet::new();
        };

        self.query(name, |id, node, steps| {
            let own = id == seed || node.descriptor.is_annotation();
            for &annotation in &node.annotations {
                if own || self.nodes[annotation.0].inherited {
                    steps.push(Step::report(annotation));
                }
            }
            if !node.descriptor.is_annotation() {
                if let Some(superclass) = node.superclass {
                    steps.push(Step::traverse(superclass));
                }
            }
        })
    }

    /// Types annotated with the annotation `name`: directly, through a chain of
    /// meta-annotations, or by inheriting an `@Inherited` annotation from a superclass
    #[must_use]
    pub fn types_with_annotation(&self, name: &str) -> DescriptorSet {
        let Some(seed) = self.node_id(name) else {
            return DescriptorSet::new();
        };

        let carriers = self.annotation_carriers(seed);
        let mut result = DescriptorSet::new();
        for &carrier in &carriers {
            for &annotated in &self.nodes[carrier.0].annotated {
                result.insert(self.nodes[annotated.0].descriptor.clone(), carrier == seed);
            }
        }

        for &carrier in &carriers {
            if !self.nodes[carrier.0].inherited {
                continue;
            }
            for &annotated in &self.nodes[carrier.0].annotated {
                if self.nodes[annotated.0].descriptor.is_interface() {
                    continue;
                }
                let subclasses = closure(self.nodes.len(), annotated, |id, steps| {
                    let node = &self.nodes[id.0];
                    steps.extend(node.subclasses.iter().copied().map(Step::report));
                });
                for (subclass, _) in subclasses {
                    result.insert(self.nodes[subclass.0].descriptor.clone(), false);
                }
            }
        }

        result
    }

    /// Classes declaring a method annotated with `name` or with an annotation
    /// meta-annotated by it
    #[must_use]
    pub fn classes_with_method_annotation(&self, name: &str) -> DescriptorSet {
        self.member_annotation_query(name, |node| &node.method_annotated)
    }

    /// Classes declaring a field annotated with `name` or with an annotation
    /// meta-annotated by it
    #[must_use]
    pub fn classes_with_field_annotation(&self, name: &str) -> DescriptorSet {
        self.member_annotation_query(name, |node| &node.field_annotated)
    }

    /// Member and local classes nested in `name`, transitively
    #[must_use]
    pub fn inner_classes_of(&self, name: &str) -> DescriptorSet {
        self.query(name, |_, node, steps| {
            steps.extend(node.inner.iter().copied().map(Step::report));
        })
    }

    /// Enclosing classes of `name`, innermost first
    #[must_use]
    pub fn outer_classes_of(&self, name: &str) -> DescriptorSet {
        self.query(name, |_, node, steps| {
            if let Some(outer) = node.outer {
                steps.push(Step::report(outer));
            }
        })
    }

    /// Scanned classes `name` refers to, transitively
    #[must_use]
    pub fn dependencies_of(&self, name: &str) -> DescriptorSet {
        self.query(name, |_, node, steps| {
            steps.extend(node.dependencies.iter().copied().map(Step::report));
        })
    }

    /// Run the closure engine from `name`, expanding nodes with `expand`
    fn query<F>(&self, name: &str, mut expand: F) -> DescriptorSet
    where
        F: FnMut(NodeId, &Node, &mut Vec<Step>),
    {
        let Some(seed) = self.node_id(name) else {
            return DescriptorSet::new();
        };

        let found = closure(self.nodes.len(), seed, |id, steps| {
            expand(id, &self.nodes[id.0], steps);
        });
        self.collect(found)
    }

    fn collect(&self, found: Vec<(NodeId, bool)>) -> DescriptorSet {
        let mut set = DescriptorSet::new();
        for (id, direct) in found {
            set.insert(self.nodes[id.0].descriptor.clone(), direct);
        }
        set
    }

    /// `seed` followed by every annotation type carrying it through a meta-annotation chain
    fn annotation_carriers(&self, seed: NodeId) -> Vec<NodeId> {
        let meta = closure(self.nodes.len(), seed, |id, steps| {
            for &annotated in &self.nodes[id.0].annotated {
                if self.nodes[annotated.0].descriptor.is_annotation() {
                    steps.push(Step::report(annotated));
                }
            }
        });

        let mut carriers = vec![seed];
        carriers.extend(meta.into_iter().map(|(id, _)| id).filter(|id| *id != seed));
        carriers
    }

    fn member_annotation_query<F>(&self, name: &str, users: F) -> DescriptorSet
    where
        F: Fn(&Node) -> &Vec<NodeId>,
    {
        let Some(seed) = self.node_id(name) else {
            return DescriptorSet::new();
        };

        let mut result = DescriptorSet::new();
        for carrier in self.annotation_carriers(seed) {
            for &class in users(&self.nodes[carrier.0]) {
                result.insert(self.nodes[class.0].descriptor.clone(), carrier == seed);
            }
        }
        result
    }
}
