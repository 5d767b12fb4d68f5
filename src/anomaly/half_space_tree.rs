use tracing::{debug, trace};

use crate::anomaly::alias::FType;
use crate::anomaly::builder::{ForestBuilder, Limits};
use crate::anomaly::config::HalfSpaceTreeConfig;
use crate::anomaly::error::HstError;
use crate::anomaly::tree::Tree;
use crate::common::{AnomalyDetector, Observation};

/// Half-space trees are an online variant of isolation forests.
/// They work well when anomalies are spread out.
/// However, they do not work well if anomalies are packed together in windows.
/// By default, this implementation assumes that each feature has values that are comprised
/// between 0 and 1, use `limits` in the config for other ranges.
///
/// Trees are grown on the first call to `learn`, over the features of that first
/// observation plus the ones listed in `limits`. Each node counts the observations that
/// walk through it. Counts of the current window go to the running mass; every
/// `window_size` observations the running mass becomes the reference mass that scores
/// are computed from. Scores are therefore 0 until the first window is complete.
///
/// # Example
///
/// ```
/// use light_hst::anomaly::config::HalfSpaceTreeConfig;
/// use light_hst::anomaly::half_space_tree::HalfSpaceTree;
/// use maplit::hashmap;
///
/// let config = HalfSpaceTreeConfig::new(10, 3, 3).with_seed(42);
/// let mut hst: HalfSpaceTree<f64> = HalfSpaceTree::new(config).unwrap();
/// for x in [0.5, 0.45, 0.43] {
///     hst.learn(&hashmap! {"x".to_string() => x});
/// }
/// assert!(hst.score(&hashmap! {"x".to_string() => 0.445}) < 0.5);
/// assert!(hst.score(&hashmap! {"x".to_string() => 0.0}) > 0.5);
/// ```
#[derive(Debug, Clone)]
pub struct HalfSpaceTree<F: FType> {
    window_size: u32,
    counter: u32,
    n_trees: u32,
    height: u32,
    limits: Limits<F>,
    builder: ForestBuilder<F>,
    trees: Option<Vec<Tree<F>>>,
    first_window: bool,
}

impl<F: FType> HalfSpaceTree<F> {
    pub fn new(config: HalfSpaceTreeConfig<F>) -> Result<Self, HstError> {
        config.validate()?;
        Ok(HalfSpaceTree {
            window_size: config.window_size,
            counter: 0,
            n_trees: config.n_trees,
            height: config.height,
            builder: ForestBuilder::new(config.height, config.padding, config.seed),
            limits: config.limits,
            trees: None,
            first_window: true,
        })
    }

    /// Update the masses with `x`, rotating them when the window is full.
    pub fn learn(&mut self, x: &Observation<F>) -> &mut Self {
        // build trees during the first pass
        if self.trees.is_none() {
            self.trees = self.grow_forest(x);
        }

        if let Some(trees) = self.trees.as_mut() {
            for tree in trees.iter_mut() {
                tree.learn(x);
            }
        }

        // Pivot if the window is full
        self.counter += 1;
        if self.counter == self.window_size {
            // A window completed before the forest existed leaves nothing to score with.
            if let Some(trees) = self.trees.as_mut() {
                for tree in trees.iter_mut() {
                    tree.rotate();
                }
                self.first_window = false;
            }
            trace!(window_size = self.window_size, "rotated half-space tree masses");
            self.counter = 0;
        }
        self
    }

    /// Anomaly score of `x` in [0, 1], higher means more anomalous.
    pub fn score(&self, x: &Observation<F>) -> F {
        let trees = match &self.trees {
            Some(trees) if !self.first_window => trees,
            _ => return F::zero(),
        };
        // Nodes below this mass are too sparse to be trusted.
        let floor = F::from_u32(self.window_size).unwrap_or_else(F::zero)
            * F::from_f64(0.1).unwrap_or_else(F::zero);

        let mut score = F::zero();
        for tree in trees.iter() {
            let mut weight = F::one();
            for (_, node) in tree.walk(x) {
                let mass = F::from_u32(node.mass().reference).unwrap_or_else(F::zero);
                score += mass * weight;
                if mass < floor {
                    break;
                }
                weight = weight + weight;
            }
        }
        let score = F::one() - score / self.max_score();
        score.max(F::zero()).min(F::one())
    }

    /// Score `x` against the last complete window, then learn it.
    pub fn score_and_learn(&mut self, x: &Observation<F>) -> F {
        let score = self.score(x);
        self.learn(x);
        score
    }

    /// Sum reached when every tree puts a full window at every level of the walk.
    pub fn max_score(&self) -> F {
        F::from(self.n_trees).unwrap_or_else(F::one)
            * F::from(self.window_size).unwrap_or_else(F::one)
            * (F::from(2.).unwrap_or_else(F::one).powi(self.height as i32 + 1) - F::one())
    }

    pub fn counter(&self) -> u32 {
        self.counter
    }

    pub fn is_first_window(&self) -> bool {
        self.first_window
    }

    pub fn n_trees(&self) -> u32 {
        self.n_trees
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn window_size(&self) -> u32 {
        self.window_size
    }

    /// `None` until the first observation with at least one feature has been learnt.
    pub fn trees(&self) -> Option<&[Tree<F>]> {
        self.trees.as_deref()
    }

    fn grow_forest(&mut self, x: &Observation<F>) -> Option<Vec<Tree<F>>> {
        let mut limits: Limits<F> = x
            .keys()
            .map(|feature| (feature.clone(), (F::zero(), F::one())))
            .collect();
        limits.extend(self.limits.iter().map(|(k, v)| (k.clone(), *v)));
        if limits.is_empty() {
            debug!("no feature to split on yet, delaying the forest");
            return None;
        }
        debug!(
            n_trees = self.n_trees,
            height = self.height,
            n_features = limits.len(),
            "building half-space trees"
        );
        Some(self.builder.build_forest(self.n_trees, &limits))
    }
}

impl<F: FType> AnomalyDetector<F> for HalfSpaceTree<F> {
    fn learn_one(&mut self, x: &Observation<F>) {
        self.learn(x);
    }
    fn score_one(&self, x: &Observation<F>) -> F {
        self.score(x)
    }
}
