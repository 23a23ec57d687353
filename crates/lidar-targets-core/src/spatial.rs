//! kd-tree backed nearest-neighbour queries over 3D positions.

use kiddo::{KdTree, SquaredEuclidean};

/// Static 3D index. Items are indices into the slice the index was built from.
pub struct PointIndex {
    tree: KdTree<f64, 3>,
    len: usize,
}

impl PointIndex {
    pub fn new(coords: &[[f64; 3]]) -> Self {
        let coords = coords.to_vec();
        let tree: KdTree<f64, 3> = (&coords).into();
        Self {
            tree,
            len: coords.len(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Nearest indexed point as `(index, squared distance)`.
    pub fn nearest(&self, query: &[f64; 3]) -> Option<(usize, f64)> {
        if self.is_empty() {
            return None;
        }
        let nn = self.tree.nearest_one::<SquaredEuclidean>(query);
        Some((nn.item as usize, nn.distance))
    }

    /// Indices of all points within Euclidean `radius` of `query`, unordered.
    pub fn within(&self, query: &[f64; 3], radius: f64) -> Vec<usize> {
        if self.is_empty() {
            return Vec::new();
        }
        self.tree
            .within_unsorted::<SquaredEuclidean>(query, radius * radius)
            .into_iter()
            .map(|nn| nn.item as usize)
            .collect()
    }
}
