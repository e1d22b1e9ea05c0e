//! Concurrent, name-keyed store of the descriptors produced by one scan.
//!
//! Workers register finished descriptors here while the scan is running. The registry is
//! the only state the workers share: a descriptor is inserted as a fully built
//! [`ClassDescriptorRc`] or not at all, and the first registration of a name wins. Once all
//! workers are done the registry is frozen into a [`crate::metadata::graph::ClassGraph`].

use std::sync::Arc;

use dashmap::{mapref::entry::Entry, DashMap};

use crate::metadata::{
    descriptor::{ClassDescriptor, ClassDescriptorRc},
    diagnostics::Diagnostics,
    graph::ClassGraph,
};

/// Outcome of [`DescriptorRegistry::register`]
#[derive(Debug, Clone)]
pub enum Registration {
    /// The descriptor was stored under its name
    Inserted(ClassDescriptorRc),
    /// A descriptor with the same name was registered earlier; the new one was dropped
    Collision {
        /// The descriptor that keeps the name
        existing: ClassDescriptorRc,
        /// Source of the rejected descriptor
        rejected_source: String,
    },
}

impl Registration {
    /// Returns `true` if the descriptor was stored
    #[must_use]
    pub fn is_inserted(&self) -> bool {
        matches!(self, Registration::Inserted(_))
    }
}

/// Thread-safe descriptor store with first-writer-wins semantics.
///
/// # Examples
///
/// ```rust
/// use jvmscope::metadata::graph::{DescriptorRegistry, Registration};
/// # use jvmscope::metadata::descriptor::ClassDescriptor;
/// # fn demo(a: ClassDescriptor, b: ClassDescriptor) {
/// let registry = DescriptorRegistry::new();
/// assert!(registry.register(a).is_inserted());
/// if let Registration::Collision { existing, rejected_source } = registry.register(b) {
///     println!("{} from {} shadowed by {}", existing.name, rejected_source, existing.source);
/// }
/// # }
/// ```
#[derive(Debug, Default)]
pub struct DescriptorRegistry {
    classes: DashMap<String, ClassDescriptorRc>,
}

impl DescriptorRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        DescriptorRegistry {
            classes: DashMap::new(),
        }
    }

    /// Register a descriptor under its name unless the name is already taken.
    pub fn register(&self, descriptor: ClassDescriptor) -> Registration {
        match self.classes.entry(descriptor.name.clone()) {
            Entry::Occupied(entry) => Registration::Collision {
                existing: entry.get().clone(),
                rejected_source: descriptor.source,
            },
            Entry::Vacant(entry) => {
                let descriptor = Arc::new(descriptor);
                entry.insert(descriptor.clone());
                Registration::Inserted(descriptor)
            }
        }
    }

    /// Look up a registered descriptor
    #[must_use]
    pub fn get(&self, name: &str) -> Option<ClassDescriptorRc> {
        self.classes.get(name).map(|entry| entry.value().clone())
    }

    /// Returns `true` if `name` is registered
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.classes.contains_key(name)
    }

    /// Number of registered descriptors
    #[must_use]
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// Returns `true` if nothing was registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Freeze the registry into a graph, resolving all name references.
    ///
    /// ## Arguments
    /// * 'diagnostics'        - Receives a `Reference` diagnostic per unresolved edge
    /// * 'report_unresolved'  - Whether to record those diagnostics at all
    #[must_use]
    pub fn into_graph(self, diagnostics: &Diagnostics, report_unresolved: bool) -> ClassGraph {
        let descriptors = self.classes.into_iter().map(|(_, descriptor)| descriptor);
        ClassGraph::build(descriptors, diagnostics, report_unresolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::descriptor;
    use std::thread;

    #[test]
    fn first_registration_wins() {
        let registry = DescriptorRegistry::new();

        let mut first = descriptor("a.B");
        first.source = "one.jar".into();
        let mut second = descriptor("a.B");
        second.source = "two.jar".into();

        let inserted = registry.register(first);
        assert!(inserted.is_inserted());

        match registry.register(second) {
            Registration::Collision {
                existing,
                rejected_source,
            } => {
                assert_eq!(existing.source, "one.jar");
                assert_eq!(rejected_source, "two.jar");
            }
            Registration::Inserted(_) => panic!("second registration must collide"),
        }

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("a.B").unwrap().source, "one.jar");
        assert!(registry.get("a.C").is_none());
    }

    #[test]
    fn concurrent_registration_keeps_one_per_name() {
        let registry = Arc::new(DescriptorRegistry::new());

        let handles: Vec<_> = (0..8)
            .map(|worker| {
                let registry = registry.clone();
                thread::spawn(move || {
                    let mut inserted = 0;
                    for i in 0..50 {
                        let mut class = descriptor(&format!("a.C{i}"));
                        class.source = format!("worker{worker}");
                        if registry.register(class).is_inserted() {
                            inserted += 1;
                        }
                    }
                    inserted
                })
            })
            .collect();

        let total: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(total, 50);
        assert_eq!(registry.len(), 50);
    }
}
