//! Unit tests for amod-spatial.

#[cfg(test)]
mod helpers {
    use amod_core::{Position, SimRng};

    /// `n` uniformly random points in a 1000 × 1000 square.
    pub fn random_points(n: usize, seed: u64) -> Vec<Position> {
        let mut rng = SimRng::new(seed);
        (0..n)
            .map(|_| Position::new(rng.gen_range(0.0..1000.0), rng.gen_range(0.0..1000.0)))
            .collect()
    }

    /// Linear scan reference: index and squared distance of the nearest point.
    pub fn brute_force(points: &[Position], q: Position) -> (usize, f64) {
        points
            .iter()
            .enumerate()
            .map(|(i, p)| (i, p.sq_distance(q)))
            .fold((usize::MAX, f64::INFINITY), |best, cur| if cur.1 < best.1 { cur } else { best })
    }
}

#[cfg(test)]
mod kdtree_tests {
    use amod_core::Position;

    use super::helpers::{brute_force, random_points};
    use crate::{KdPoint, KdTree, SpatialError};

    #[test]
    fn empty_tree_errors() {
        let tree: KdTree<Position> = KdTree::build_seeded(vec![], 1).unwrap();
        assert!(tree.is_empty());
        assert_eq!(tree.find_nn(&Position::new(0.0, 0.0), 0.0).unwrap_err(), SpatialError::EmptyTree);
    }

    #[test]
    fn single_point() {
        let p = Position::new(3.0, -2.0);
        let tree = KdTree::build_seeded(vec![p], 1).unwrap();
        assert_eq!(*tree.find_nn(&Position::new(100.0, 100.0), 0.0).unwrap(), p);
    }

    #[test]
    fn matches_brute_force_for_many_sizes() {
        for n in [1usize, 2, 3, 5, 8, 17, 64, 257, 1000] {
            let points = random_points(n, n as u64);
            let tree = KdTree::build_seeded(points.clone(), 99).unwrap();
            assert_eq!(tree.len(), n);

            for q in random_points(50, 10_000 + n as u64) {
                let (_, expected) = brute_force(&points, q);
                let (found, d) = tree.find_nn_with_distance(&q, 0.0).unwrap();
                assert_eq!(d, expected, "n={n} q={q}");
                assert_eq!(found.sq_distance(q), expected);
            }
        }
    }

    #[test]
    fn exact_hit_returns_that_point() {
        let points = random_points(200, 5);
        let tree = KdTree::build_seeded(points.clone(), 3).unwrap();
        for p in points.iter().step_by(7) {
            assert_eq!(tree.find_nn(p, 0.0).unwrap(), p);
        }
    }

    #[test]
    fn duplicate_coordinates_are_handled() {
        let points = vec![
            Position::new(1.0, 1.0),
            Position::new(1.0, 1.0),
            Position::new(1.0, 5.0),
            Position::new(1.0, 9.0),
            Position::new(1.0, 2.0),
        ];
        let tree = KdTree::build_seeded(points, 11).unwrap();
        let found = tree.find_nn(&Position::new(1.2, 8.0), 0.0).unwrap();
        assert_eq!(*found, Position::new(1.0, 9.0));
    }

    #[test]
    fn approximate_search_stays_within_eps() {
        let points = random_points(500, 21);
        let tree = KdTree::build_seeded(points.clone(), 4).unwrap();
        let eps = 400.0; // squared units
        for q in random_points(30, 22) {
            let (_, exact) = brute_force(&points, q);
            let (_, d) = tree.find_nn_with_distance(&q, eps).unwrap();
            assert!(d < eps || d == exact, "approximate result {d} vs exact {exact}");
        }
    }

    #[test]
    fn dimension_mismatch_errors() {
        let tree = KdTree::build_seeded(vec![[0.0, 0.0, 0.0], [1.0, 1.0, 1.0]], 1).unwrap();
        assert_eq!(tree.dims(), 3);
        let err = tree.find_nn(&Position::new(0.0, 0.0), 0.0).unwrap_err();
        assert_eq!(err, SpatialError::DimensionMismatch { expected: 3, got: 2 });
    }

    #[test]
    fn zero_dimensional_items_rejected() {
        #[derive(Debug)]
        struct Dimensionless;
        impl KdPoint for Dimensionless {
            fn dims(&self) -> usize { 0 }
            fn coord(&self, _axis: usize) -> f64 { 0.0 }
        }
        let err = KdTree::build_seeded(vec![Dimensionless], 1).unwrap_err();
        assert_eq!(err, SpatialError::ZeroDimensions);
    }

    #[test]
    fn same_seed_builds_same_tree() {
        let points = random_points(100, 8);
        let a = KdTree::build_seeded(points.clone(), 5).unwrap();
        let b = KdTree::build_seeded(points, 5).unwrap();
        assert_eq!(a.items(), b.items());
        let q = Position::new(500.0, 500.0);
        assert_eq!(a.find_nn(&q, 0.0).unwrap(), b.find_nn(&q, 0.0).unwrap());
    }
}

#[cfg(test)]
mod oracle_tests {
    use amod_core::{LocationId, Position};

    use crate::{DistanceOracle, EuclideanOracle};

    #[test]
    fn euclidean_distance() {
        let o = EuclideanOracle;
        assert_eq!(o.distance(Position::new(0.0, 0.0), Position::new(0.0, 10.0)), Some(10.0));
    }

    #[test]
    fn location_distance_defaults_to_positions() {
        let o: Box<dyn DistanceOracle> = Box::new(EuclideanOracle);
        let d = o.location_distance(
            LocationId(1),
            Position::new(0.0, 0.0),
            LocationId(2),
            Position::new(6.0, 8.0),
        );
        assert_eq!(d, Some(10.0));
    }
}
