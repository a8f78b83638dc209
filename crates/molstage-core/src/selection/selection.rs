//! Combine Selections

use std::ops::{BitAnd, BitOr};

/// Selection
///
/// A sorted, deduplicated set of atom indices identifying a subset of an
/// [`AtomStore`]. Combined with `and`/`or`/`difference` when evaluating
/// selection expressions.
///
/// [`AtomStore`]: crate::AtomStore
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Selection {
    indices: Vec<usize>,
}

impl Selection {
    pub fn new(mut indices: Vec<usize>) -> Self {
        indices.sort_unstable();
        indices.dedup();
        Selection { indices }
    }

    /// Every atom of a store with `len` atoms.
    pub fn full(len: usize) -> Self {
        Selection {
            indices: (0..len).collect(),
        }
    }

    pub fn empty() -> Self {
        Selection {
            indices: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.indices.iter().copied()
    }

    pub fn contains(&self, index: usize) -> bool {
        self.indices.binary_search(&index).is_ok()
    }

    pub fn and(&self, other: &Selection) -> Selection {
        let mut indices = Vec::new();
        let (mut a, mut b) = (0, 0);
        while a < self.indices.len() && b < other.indices.len() {
            match self.indices[a].cmp(&other.indices[b]) {
                std::cmp::Ordering::Less => a += 1,
                std::cmp::Ordering::Greater => b += 1,
                std::cmp::Ordering::Equal => {
                    indices.push(self.indices[a]);
                    a += 1;
                    b += 1;
                }
            }
        }
        Selection { indices }
    }

    pub fn or(&self, other: &Selection) -> Selection {
        let mut indices = Vec::with_capacity(self.indices.len() + other.indices.len());
        indices.extend_from_slice(&self.indices);
        indices.extend_from_slice(&other.indices);
        Selection::new(indices)
    }

    /// Indices in `self` that are not in `other`.
    pub fn difference(&self, other: &Selection) -> Selection {
        let indices = self
            .indices
            .iter()
            .filter(|&&idx| !other.contains(idx))
            .copied()
            .collect();
        Selection { indices }
    }

    /// Complement against a store with `len` atoms.
    pub fn invert(&self, len: usize) -> Selection {
        Selection::full(len).difference(self)
    }
}

impl BitAnd for &Selection {
    type Output = Selection;

    fn bitand(self, other: Self) -> Selection {
        self.and(other)
    }
}

impl BitOr for &Selection {
    type Output = Selection;

    fn bitor(self, other: Self) -> Selection {
        self.or(other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_operations() {
        let a = Selection::new(vec![5, 1, 3, 3]);
        let b = Selection::new(vec![3, 4, 5]);

        assert_eq!(a.indices(), [1, 3, 5]);
        assert_eq!((&a & &b).indices(), [3, 5]);
        assert_eq!((&a | &b).indices(), [1, 3, 4, 5]);
        assert_eq!(a.difference(&b).indices(), [1]);
        assert_eq!(a.invert(7).indices(), [0, 2, 4, 6]);
    }

    #[test]
    fn test_contains() {
        let selection = Selection::new(vec![2, 8, 4]);
        assert!(selection.contains(4));
        assert!(!selection.contains(3));
        assert!(Selection::empty().is_empty());
        assert_eq!(Selection::full(3).len(), 3);
    }
}
