use std::borrow::Borrow;
use std::cmp::Ordering;
use std::fmt;
use std::slice::Iter;

use itertools::Itertools;

#[macro_export]
macro_rules! vecset {
    () => {
        $crate::VecSet::new()
    };
    ($($x:expr),+ $(,)?) => {{
        let mut __set = $crate::VecSet::new();
        $( let _ = __set.insert($x); )*
        __set
    }};
}

///
/// A set that is internally represented by a sorted vector. Mostly useful for
/// a compact representation of sets that are not changed often.
///
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VecSet<T> {
    /// The internal storage with the invariant that the array is sorted.
    sorted_array: Vec<T>,
}

impl<T: Ord> VecSet<T> {
    pub fn new() -> Self {
        Self {
            sorted_array: Vec::new(),
        }
    }

    /// Returns a new set only containing the given element.
    pub fn singleton(element: T) -> Self {
        Self {
            sorted_array: vec![element],
        }
    }

    /// Returns true iff the set contains the given element. The element can be
    /// given as any borrowed form of T, for example `&str` for a `VecSet<String>`.
    pub fn contains<Q>(&self, element: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.sorted_array
            .binary_search_by(|entry| entry.borrow().cmp(element))
            .is_ok()
    }

    /// Inserts the given element into the set, returns true iff the element was
    /// inserted.
    pub fn insert(&mut self, element: T) -> bool {
        // Finds the location where to insert the element to keep the array sorted.
        if let Err(position) = self.sorted_array.binary_search(&element) {
            self.sorted_array.insert(position, element);
            return true;
        }

        false
    }

    /// Inserts all elements of the other set, returns true iff at least one
    /// element was inserted.
    pub fn insert_all(&mut self, other: &VecSet<T>) -> bool
    where
        T: Clone,
    {
        let mut changed = false;
        for element in &other.sorted_array {
            changed |= self.insert(element.clone());
        }

        changed
    }

    /// Removes the given element from the set, returns true iff the element was
    /// present.
    pub fn remove<Q>(&mut self, element: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        if let Ok(position) = self
            .sorted_array
            .binary_search_by(|entry| entry.borrow().cmp(element))
        {
            self.sorted_array.remove(position);
            return true;
        }

        false
    }

    /// Returns true iff this set is a subset of the other set.
    pub fn is_subset(&self, other: &VecSet<T>) -> bool {
        let mut self_iter = self.sorted_array.iter();
        let mut other_iter = other.sorted_array.iter();

        // Traverse both sets in order, checking that all elements of self are in other.
        let mut self_next = self_iter.next();
        let mut other_next = other_iter.next();

        while let Some(self_val) = self_next {
            match other_next {
                Some(other_val) => {
                    if self_val == other_val {
                        self_next = self_iter.next();
                        other_next = other_iter.next();
                    } else if self_val > other_val {
                        other_next = other_iter.next();
                    } else {
                        return false; // self_val < other_val
                    }
                }
                None => return false, // other is exhausted
            }
        }

        true
    }

    /// Returns true iff this set and the other set share at least one element.
    pub fn intersects(&self, other: &VecSet<T>) -> bool {
        let mut self_iter = self.sorted_array.iter();
        let mut other_iter = other.sorted_array.iter();

        // Traverse both sets in order until a common element is found.
        let mut self_next = self_iter.next();
        let mut other_next = other_iter.next();

        while let (Some(self_val), Some(other_val)) = (self_next, other_next) {
            match self_val.cmp(other_val) {
                Ordering::Equal => return true,
                Ordering::Less => self_next = self_iter.next(),
                Ordering::Greater => other_next = other_iter.next(),
            }
        }

        false
    }

    /// Returns true iff the set is empty.
    pub fn is_empty(&self) -> bool {
        self.sorted_array.is_empty()
    }

    /// Returns an iterator over the elements in the set, they are yielded in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.sorted_array.iter()
    }

    /// Returns the number of elements in the set.
    pub fn len(&self) -> usize {
        self.sorted_array.len()
    }
}

impl<T: Ord> Default for VecSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Ord> FromIterator<T> for VecSet<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = VecSet::new();
        for element in iter {
            set.insert(element);
        }

        set
    }
}

impl<'a, T> IntoIterator for &'a VecSet<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.sorted_array.iter()
    }
}

impl<T: fmt::Debug> fmt::Debug for VecSet<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{:?}}}", self.sorted_array.iter().format(", "))
    }
}
