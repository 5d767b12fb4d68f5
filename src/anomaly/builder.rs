use std::collections::BTreeMap;

use rand::prelude::*;

use crate::anomaly::alias::FType;
use crate::anomaly::tree::{Comparator, Node, SplitRule, Tree};

/// Per-feature `(low, high)` coordinate ranges. Ordered so a seed pins down every draw.
pub type Limits<F> = BTreeMap<String, (F, F)>;

/// Grows randomly split trees, without looking at any data.
#[derive(Debug, Clone)]
pub struct ForestBuilder<F: FType> {
    height: u32,
    padding: F,
    rng: StdRng,
}

impl<F: FType> ForestBuilder<F> {
    pub fn new(height: u32, padding: F, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        ForestBuilder {
            height,
            padding,
            rng,
        }
    }

    pub fn build_forest(&mut self, n_trees: u32, limits: &Limits<F>) -> Vec<Tree<F>> {
        (0..n_trees).map(|_| self.build_tree(limits)).collect()
    }

    /// Build one tree whose root covers `limits`.
    ///
    /// `limits` must not be empty: a split needs at least one feature to pick from.
    pub fn build_tree(&mut self, limits: &Limits<F>) -> Tree<F> {
        // #nodes = 2 ^ (height + 1) - 1
        let n_nodes = (1usize << (self.height + 1)) - 1;
        let mut nodes = Vec::with_capacity(n_nodes);
        let mut limits = limits.clone();
        self.grow(&mut nodes, &mut limits, self.height);
        Tree::from_nodes(nodes)
    }

    /// Push the subtree of the given height in pre-order and return the index of its root.
    fn grow(&mut self, nodes: &mut Vec<Node<F>>, limits: &mut Limits<F>, height: u32) -> usize {
        let idx = nodes.len();
        nodes.push(Node::leaf());
        if height == 0 {
            return idx;
        }
        let Some(feature) = limits.keys().choose(&mut self.rng).cloned() else {
            return idx;
        };
        let (low, high) = limits[&feature];
        let threshold = self.threshold(low, high);

        // The left child sees [low, threshold], the right one [threshold, high].
        limits.insert(feature.clone(), (low, threshold));
        let left = self.grow(nodes, limits, height - 1);
        limits.insert(feature.clone(), (threshold, high));
        let right = self.grow(nodes, limits, height - 1);
        limits.insert(feature.clone(), (low, high));

        nodes[idx] = Node::Internal {
            mass: Default::default(),
            split: SplitRule {
                feature,
                comparator: Comparator::LessThan,
                threshold,
            },
            left,
            right,
        };
        idx
    }

    /// Uniform draw in `[low + p * (high - low), high - p * (high - low)]`.
    fn threshold(&mut self, low: F, high: F) -> F {
        let margin = self.padding * (high - low);
        let (from, to) = (low + margin, high - margin);
        let u = F::from_f64(self.rng.gen::<f64>()).unwrap_or_else(F::zero);
        from + u * (to - from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anomaly::tree::ROOT;

    fn unit_limits(features: &[&str]) -> Limits<f64> {
        features
            .iter()
            .map(|f| (f.to_string(), (0.0, 1.0)))
            .collect()
    }

    // Check every split against the rectangle its node owns.
    fn check_subtree(
        tree: &Tree<f64>,
        idx: usize,
        limits: &Limits<f64>,
        padding: f64,
        depth: u32,
        height: u32,
    ) {
        match tree.node(idx).unwrap() {
            Node::Leaf { mass } => {
                assert_eq!(depth, height);
                assert_eq!(*mass, Default::default());
            }
            Node::Internal {
                split, left, right, ..
            } => {
                assert!(depth < height);
                let (low, high) = limits[&split.feature];
                let margin = padding * (high - low);
                assert!(split.threshold >= low + margin - 1e-12);
                assert!(split.threshold <= high - margin + 1e-12);

                let mut left_limits = limits.clone();
                left_limits.insert(split.feature.clone(), (low, split.threshold));
                check_subtree(tree, *left, &left_limits, padding, depth + 1, height);

                let mut right_limits = limits.clone();
                right_limits.insert(split.feature.clone(), (split.threshold, high));
                check_subtree(tree, *right, &right_limits, padding, depth + 1, height);
            }
        }
    }

    #[test]
    fn test_tree_shape_and_thresholds() {
        let mut limits = unit_limits(&["a", "b", "c"]);
        limits.insert("amount".to_string(), (-50.0, 2000.0));
        let mut builder = ForestBuilder::new(5, 0.15, Some(42));
        for tree in builder.build_forest(20, &limits) {
            assert_eq!(tree.len(), 63);
            assert_eq!(tree.iter().filter(|n| n.is_leaf()).count(), 32);
            check_subtree(&tree, ROOT, &limits, 0.15, 0, 5);
        }
    }

    #[test]
    fn test_seed_is_reproducible() {
        let limits = unit_limits(&["a", "b", "c", "d"]);
        let first = ForestBuilder::new(4, 0.15, Some(7)).build_forest(5, &limits);
        let second = ForestBuilder::new(4, 0.15, Some(7)).build_forest(5, &limits);
        for (a, b) in first.iter().zip(second.iter()) {
            assert_eq!(a.nodes, b.nodes);
        }
    }

    #[test]
    fn test_trees_are_independent() {
        let limits = unit_limits(&["a", "b", "c", "d"]);
        let forest = ForestBuilder::new(4, 0.15, Some(7)).build_forest(2, &limits);
        assert_ne!(forest[0].nodes, forest[1].nodes);
    }

    #[test]
    fn test_height_one() {
        let limits = unit_limits(&["only"]);
        let tree = ForestBuilder::new(1, 0.25, Some(1)).build_tree(&limits);
        assert_eq!(tree.len(), 3);
        let split = tree.node(ROOT).and_then(Node::split).unwrap();
        assert_eq!(split.feature, "only");
        assert!(split.threshold >= 0.25 && split.threshold <= 0.75);
    }

    #[test]
    fn test_zero_padding_spans_the_full_range() {
        let limits = unit_limits(&["x"]);
        let mut builder = ForestBuilder::new(1, 0.0, Some(3));
        let thresholds: Vec<f64> = (0..200)
            .map(|_| builder.build_tree(&limits).node(ROOT).and_then(Node::split).unwrap().threshold)
            .collect();
        assert!(thresholds.iter().all(|t| (0.0..=1.0).contains(t)));
        assert!(thresholds.iter().any(|t| *t < 0.1));
        assert!(thresholds.iter().any(|t| *t > 0.9));
    }
}
