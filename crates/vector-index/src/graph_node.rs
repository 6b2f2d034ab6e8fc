//! Vertex of an approximate proximity graph.

use crate::scalar::Scalar;
use crate::sorted_set::MinSortedSet;

/// Default bound on the number of neighbours per vertex.
pub const DEFAULT_MAX_DEGREE: usize = 8;

/// A stored vector's bounded-degree neighbour list.
///
/// Neighbours are kept ascending by edge distance. A node never grows beyond
/// its degree bound and always keeps the closest candidates offered so far.
#[derive(Debug, Clone)]
pub struct ProximityGraphNode<W> {
    index: usize,
    neighbours: MinSortedSet<usize, W>,
}

impl<W: Scalar> ProximityGraphNode<W> {
    pub fn new(index: usize, max_degree: usize) -> Self {
        Self {
            index,
            neighbours: MinSortedSet::new(max_degree),
        }
    }

    pub fn with_default_degree(index: usize) -> Self {
        Self::new(index, DEFAULT_MAX_DEGREE)
    }

    /// Vector index owning this node.
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Offer `candidate` at `distance` as a neighbour.
    ///
    /// Same acceptance rules as [`BoundedSortedSet::try_add`]: false for
    /// duplicates and for candidates no closer than the current furthest
    /// neighbour of a full list.
    ///
    /// [`BoundedSortedSet::try_add`]: crate::sorted_set::BoundedSortedSet::try_add
    pub fn try_add_neighbour(&mut self, candidate: usize, distance: W) -> bool {
        self.neighbours.try_add(candidate, distance)
    }

    pub fn neighbour_indices(&self) -> Vec<usize> {
        self.neighbours.keys().collect()
    }

    pub fn neighbour_weights(&self) -> Vec<W> {
        self.neighbours.weights().collect()
    }

    /// (neighbour, distance) pairs, closest first.
    pub fn neighbours(&self) -> &[(usize, W)] {
        self.neighbours.as_slice()
    }

    pub fn degree(&self) -> usize {
        self.neighbours.len()
    }

    pub fn max_degree(&self) -> usize {
        self.neighbours.capacity()
    }

    /// Distance to the furthest retained neighbour, if any.
    pub fn furthest(&self) -> Option<W> {
        self.neighbours.worst().map(|(_, w)| w)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_degree_bound_keeps_closest() {
        let mut node = ProximityGraphNode::<f32>::with_default_degree(100);
        let distances = [0.9, 0.8, 0.6, 0.5, 0.4, 0.3, 0.2, 0.1, 0.0];
        for (i, &d) in distances.iter().enumerate() {
            node.try_add_neighbour(i, d);
        }

        assert_eq!(node.degree(), 8);
        assert_eq!(
            node.neighbour_weights(),
            vec![0.0, 0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.8]
        );
        // candidate 0 carried 0.9
        assert!(!node.neighbour_indices().contains(&0));
    }

    #[test]
    fn test_follows_set_rules() {
        let mut node = ProximityGraphNode::<f64>::new(3, 4);
        let mut set = MinSortedSet::<usize, f64>::new(4);
        for (candidate, distance) in [(3, 0.0), (3, 0.2), (9, 0.7)] {
            assert_eq!(
                node.try_add_neighbour(candidate, distance),
                set.try_add(candidate, distance)
            );
        }
        assert_eq!(node.neighbours(), set.as_slice());
    }

    #[test]
    fn test_rejects_duplicates() {
        let mut node = ProximityGraphNode::<f64>::new(3, 4);
        assert!(node.try_add_neighbour(1, 0.5));
        assert!(!node.try_add_neighbour(1, 0.1));
        assert_eq!(node.neighbours(), &[(1, 0.5)]);
        assert_eq!(node.index(), 3);
        assert_eq!(node.max_degree(), 4);
        assert_eq!(node.furthest(), Some(0.5));
    }
}
