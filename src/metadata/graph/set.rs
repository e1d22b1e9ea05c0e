//! Ordered, duplicate-free result sets of closure queries.
//!
//! A [`DescriptorSet`] remembers for every element whether it was a direct (one-hop)
//! result of the query that produced it. The set algebra keeps the order and the direct
//! flag of the first operand an element came from:
//!
//! - [`DescriptorSet::union`]: first operand, then new elements of the second
//! - [`DescriptorSet::intersect`]: elements of the first operand also in the second
//! - [`DescriptorSet::exclude`]: elements of the first operand not in the second
//!
//! Because flags follow the first operand, restricting to direct elements does not
//! distribute over the algebra. With `x` indirect in `a` and direct in `b`,
//! `a.union(&b).direct_only()` lacks `x` while `a.direct_only().union(&b.direct_only())`
//! contains it.

use std::{collections::HashSet, fmt};

use crate::metadata::descriptor::ClassDescriptorRc;

/// One member of a [`DescriptorSet`]
#[derive(Debug, Clone)]
pub struct SetEntry {
    /// The descriptor
    pub descriptor: ClassDescriptorRc,
    /// Whether the element was a one-hop result
    pub direct: bool,
}

/// Ordered set of descriptors keyed by class name.
#[derive(Debug, Clone, Default)]
pub struct DescriptorSet {
    entries: Vec<SetEntry>,
    names: HashSet<String>,
}

impl DescriptorSet {
    /// Create an empty set
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `descriptor` unless a class of the same name is present.
    ///
    /// Returns `true` if it was added.
    pub fn insert(&mut self, descriptor: ClassDescriptorRc, direct: bool) -> bool {
        if !self.names.insert(descriptor.name.clone()) {
            return false;
        }
        self.entries.push(SetEntry { descriptor, direct });
        true
    }

    /// Number of elements
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the set has no elements
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns `true` if a class named `name` is in the set
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Look up an element by class name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&SetEntry> {
        if !self.contains(name) {
            return None;
        }
        self.entries.iter().find(|e| e.descriptor.name == name)
    }

    /// Direct flag of `name`, or `None` if it is not in the set
    #[must_use]
    pub fn is_direct(&self, name: &str) -> Option<bool> {
        self.get(name).map(|e| e.direct)
    }

    /// Descriptors in order
    pub fn iter(&self) -> impl Iterator<Item = &ClassDescriptorRc> {
        self.entries.iter().map(|e| &e.descriptor)
    }

    /// Elements with their direct flag, in order
    #[must_use]
    pub fn entries(&self) -> &[SetEntry] {
        &self.entries
    }

    /// Class names in order
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.entries
            .iter()
            .map(|e| e.descriptor.name.as_str())
            .collect()
    }

    /// Elements of `self` followed by the elements of `other` not in `self`
    #[must_use]
    pub fn union(&self, other: &DescriptorSet) -> DescriptorSet {
        let mut result = self.clone();
        for entry in &other.entries {
            result.insert(entry.descriptor.clone(), entry.direct);
        }
        result
    }

    /// Elements of `self` that are also in `other`
    #[must_use]
    pub fn intersect(&self, other: &DescriptorSet) -> DescriptorSet {
        self.filter_entries(|e| other.contains(&e.descriptor.name))
    }

    /// Elements of `self` that are not in `other`
    #[must_use]
    pub fn exclude(&self, other: &DescriptorSet) -> DescriptorSet {
        self.filter_entries(|e| !other.contains(&e.descriptor.name))
    }

    /// Elements whose descriptor satisfies `predicate`
    #[must_use]
    pub fn filter<P>(&self, predicate: P) -> DescriptorSet
    where
        P: Fn(&ClassDescriptorRc) -> bool,
    {
        self.filter_entries(|e| predicate(&e.descriptor))
    }

    /// Only the elements flagged as direct
    #[must_use]
    pub fn direct_only(&self) -> DescriptorSet {
        self.filter_entries(|e| e.direct)
    }

    fn filter_entries<P>(&self, keep: P) -> DescriptorSet
    where
        P: Fn(&SetEntry) -> bool,
    {
        let mut result = DescriptorSet::new();
        for entry in self.entries.iter().filter(|e| keep(e)) {
            result.insert(entry.descriptor.clone(), entry.direct);
        }
        result
    }
}

impl PartialEq for DescriptorSet {
    /// Same names in the same order with the same direct flags
    fn eq(&self, other: &Self) -> bool {
        self.entries.len() == other.entries.len()
            && self
                .entries
                .iter()
                .zip(&other.entries)
                .all(|(a, b)| a.descriptor.name == b.descriptor.name && a.direct == b.direct)
    }
}

impl<'a> IntoIterator for &'a DescriptorSet {
    type Item = &'a ClassDescriptorRc;
    type IntoIter = std::iter::Map<std::slice::Iter<'a, SetEntry>, fn(&SetEntry) -> &ClassDescriptorRc>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries
            .iter()
            .map(entry_descriptor as fn(&SetEntry) -> &ClassDescriptorRc)
    }
}

fn entry_descriptor(entry: &SetEntry) -> &ClassDescriptorRc {
    &entry.descriptor
}

impl fmt::Display for DescriptorSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, entry) in self.entries.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", entry.descriptor.name)?;
            if entry.direct {
                write!(f, "*")?;
            }
        }
        write!(f, "]")
    }
}
