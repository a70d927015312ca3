#![forbid(unsafe_code)]

use std::fmt;

use itertools::Itertools;

use forma_collections::VecSet;

/// The name of a single automaton state.
pub type StateLabel = String;

/// An ordered, deduplicated set of state labels.
///
/// This is the substrate for NFA current-state tracking and for the compound
/// states of the subset construction. Iteration yields the labels in
/// lexicographic order, equality is set equality, and the order of insertion
/// is never observable.
#[derive(Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StateSet {
    labels: VecSet<StateLabel>,
}

impl StateSet {
    pub fn new() -> Self {
        Self { labels: VecSet::new() }
    }

    /// Returns the set only containing the given label.
    pub fn singleton(label: impl Into<StateLabel>) -> Self {
        Self {
            labels: VecSet::singleton(label.into()),
        }
    }

    /// Inserts the given label, returns true iff it was not already present.
    pub fn insert(&mut self, label: impl Into<StateLabel>) -> bool {
        self.labels.insert(label.into())
    }

    /// Inserts all labels of the other set, returns true iff the set grew.
    pub fn insert_all(&mut self, other: &StateSet) -> bool {
        self.labels.insert_all(&other.labels)
    }

    /// Removes the given label, returns true iff it was present.
    pub fn remove(&mut self, label: &str) -> bool {
        self.labels.remove(label)
    }

    /// Returns true iff the set contains the given label.
    pub fn contains(&self, label: &str) -> bool {
        self.labels.contains(label)
    }

    /// Returns true iff this set and the other set share at least one label.
    pub fn intersects(&self, other: &StateSet) -> bool {
        self.labels.intersects(&other.labels)
    }

    /// Returns true iff the set is empty.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Returns the number of labels in the set.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Returns an iterator over the labels in lexicographic order.
    pub fn iter(&self) -> impl Iterator<Item = &StateLabel> {
        self.labels.iter()
    }

    /// Returns the canonical name of the set: the sorted labels concatenated.
    ///
    /// Two equal sets always have the same canonical name. The concatenation
    /// is not injective for labels that share boundaries, `{"a", "bc"}` and
    /// `{"ab", "c"}` both yield `"abc"`; with single-character labels the
    /// name is unambiguous.
    pub fn canonical_name(&self) -> StateLabel {
        self.labels.iter().join("")
    }
}

impl<S: Into<StateLabel>> FromIterator<S> for StateSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            labels: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl fmt::Display for StateSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}}}", self.labels.iter().format(", "))
    }
}

impl fmt::Debug for StateSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self}")
    }
}
