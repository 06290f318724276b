//! Generic k-d tree for nearest-neighbour snapping.
//!
//! # Build
//!
//! Items are partitioned around the median along one axis, chosen as
//! `depth % dims`, using quickselect with a uniformly random pivot.  The
//! result is balanced and builds in expected O(n log n).  The pivot RNG is
//! passed in by the caller, so the same seed yields the same tree shape.
//!
//! # Query
//!
//! [`KdTree::find_nn`] descends into the half-space containing the query
//! first, then visits the far half only when the splitting plane is at least
//! as close as the best match so far.  Distances are squared Euclidean.  A
//! positive `eps` stops the search as soon as any item within squared
//! distance `eps` is found (approximate mode); `eps <= 0` is exact.

use amod_core::{Position, SimRng};

use crate::{SpatialError, SpatialResult};

// ── KdPoint ───────────────────────────────────────────────────────────────────

/// Anything that can be indexed by the tree: a fixed number of axes with
/// a coordinate per axis.
pub trait KdPoint {
    fn dims(&self) -> usize;
    fn coord(&self, axis: usize) -> f64;
}

impl KdPoint for Position {
    #[inline]
    fn dims(&self) -> usize {
        2
    }

    #[inline]
    fn coord(&self, axis: usize) -> f64 {
        Position::coord(*self, axis)
    }
}

impl<const N: usize> KdPoint for [f64; N] {
    #[inline]
    fn dims(&self) -> usize {
        N
    }

    #[inline]
    fn coord(&self, axis: usize) -> f64 {
        self[axis]
    }
}

fn sq_dist<A: KdPoint + ?Sized, B: KdPoint + ?Sized>(a: &A, b: &B, dims: usize) -> f64 {
    (0..dims)
        .map(|i| {
            let d = a.coord(i) - b.coord(i);
            d * d
        })
        .sum()
}

// ── KdTree ────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
struct Node {
    item:  usize,
    left:  Option<usize>,
    right: Option<usize>,
}

/// A static k-d tree owning its items.
///
/// Rebuild the tree to change its contents; there is no incremental insert.
#[derive(Clone, Debug)]
pub struct KdTree<T> {
    items: Vec<T>,
    nodes: Vec<Node>,
    root:  Option<usize>,
    dims:  usize,
}

impl<T> Default for KdTree<T> {
    fn default() -> Self {
        Self { items: Vec::new(), nodes: Vec::new(), root: None, dims: 0 }
    }
}

impl<T: KdPoint> KdTree<T> {
    /// Build a tree over `items`, drawing quickselect pivots from `rng`.
    ///
    /// An empty `items` vector builds an empty tree (every query on it fails
    /// with [`SpatialError::EmptyTree`]).
    ///
    /// # Errors
    ///
    /// [`SpatialError::ZeroDimensions`] if the first item reports no axes.
    pub fn build(items: Vec<T>, rng: &mut SimRng) -> SpatialResult<Self> {
        let Some(first) = items.first() else {
            return Ok(Self::default());
        };
        let dims = first.dims();
        if dims == 0 {
            return Err(SpatialError::ZeroDimensions);
        }

        let mut order: Vec<usize> = (0..items.len()).collect();
        let mut nodes = Vec::with_capacity(items.len());
        let root = build_rec(&items, &mut order, 0, dims, rng, &mut nodes);

        Ok(Self { items, nodes, root, dims })
    }

    /// Convenience wrapper seeding a fresh RNG.
    pub fn build_seeded(items: Vec<T>, seed: u64) -> SpatialResult<Self> {
        Self::build(items, &mut SimRng::new(seed))
    }

    /// Nearest item to `query` by squared Euclidean distance.
    ///
    /// # Errors
    ///
    /// - [`SpatialError::EmptyTree`] if the tree holds no items.
    /// - [`SpatialError::DimensionMismatch`] if `query` has a different number
    ///   of axes than the indexed items.
    pub fn find_nn<Q: KdPoint + ?Sized>(&self, query: &Q, eps: f64) -> SpatialResult<&T> {
        self.find_nn_with_distance(query, eps).map(|(item, _)| item)
    }

    /// Like [`find_nn`](Self::find_nn) but also returns the squared distance.
    pub fn find_nn_with_distance<Q: KdPoint + ?Sized>(
        &self,
        query: &Q,
        eps:   f64,
    ) -> SpatialResult<(&T, f64)> {
        let root = self.root.ok_or(SpatialError::EmptyTree)?;
        if query.dims() != self.dims {
            return Err(SpatialError::DimensionMismatch { expected: self.dims, got: query.dims() });
        }

        let mut best = self.nodes[root].item;
        let mut best_dist = sq_dist(query, &self.items[best], self.dims);
        self.search(root, query, 0, eps, &mut best, &mut best_dist);
        Ok((&self.items[best], best_dist))
    }

    fn search<Q: KdPoint + ?Sized>(
        &self,
        node:      usize,
        query:     &Q,
        depth:     usize,
        eps:       f64,
        best:      &mut usize,
        best_dist: &mut f64,
    ) {
        let n = &self.nodes[node];
        let item = &self.items[n.item];

        let d = sq_dist(query, item, self.dims);
        if d < *best_dist {
            *best = n.item;
            *best_dist = d;
        }
        if *best_dist == 0.0 || *best_dist < eps {
            return;
        }

        let axis = depth % self.dims;
        let diff = query.coord(axis) - item.coord(axis);
        let (near, far) = if diff < 0.0 { (n.left, n.right) } else { (n.right, n.left) };

        if let Some(near) = near {
            self.search(near, query, depth + 1, eps, best, best_dist);
        }
        if let Some(far) = far {
            if *best_dist >= diff * diff {
                self.search(far, query, depth + 1, eps, best, best_dist);
            }
        }
    }
}

impl<T> KdTree<T> {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Indexed items in arbitrary order.
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Number of axes, or 0 for an empty tree.
    pub fn dims(&self) -> usize {
        self.dims
    }
}

// ── Build helpers ─────────────────────────────────────────────────────────────

fn build_rec<T: KdPoint>(
    items: &[T],
    order: &mut [usize],
    depth: usize,
    dims:  usize,
    rng:   &mut SimRng,
    nodes: &mut Vec<Node>,
) -> Option<usize> {
    if order.is_empty() {
        return None;
    }
    let axis = depth % dims;
    let mid = (order.len() - 1) / 2;
    quickselect(items, order, mid, axis, rng);

    let item = order[mid];
    let (lo, rest) = order.split_at_mut(mid);
    let hi = &mut rest[1..];

    let left = build_rec(items, lo, depth + 1, dims, rng, nodes);
    let right = build_rec(items, hi, depth + 1, dims, rng, nodes);

    nodes.push(Node { item, left, right });
    Some(nodes.len() - 1)
}

/// Reorder `order` so that position `k` holds the k-th smallest item along
/// `axis`, with smaller-or-equal items before it and larger-or-equal after.
fn quickselect<T: KdPoint>(
    items: &[T],
    order: &mut [usize],
    k:     usize,
    axis:  usize,
    rng:   &mut SimRng,
) {
    let key = |i: usize| items[i].coord(axis);
    let (mut low, mut high) = (0, order.len() - 1);

    while low < high {
        let pivot_idx = rng.gen_range(low..=high);
        order.swap(pivot_idx, high);
        let pivot = key(order[high]);

        let mut store = low;
        for i in low..high {
            if key(order[i]) < pivot {
                order.swap(i, store);
                store += 1;
            }
        }
        order.swap(store, high);

        match store.cmp(&k) {
            std::cmp::Ordering::Equal   => return,
            std::cmp::Ordering::Less    => low = store + 1,
            std::cmp::Ordering::Greater => high = store - 1,
        }
    }
}
