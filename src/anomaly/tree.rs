use std::fmt;

use crate::anomaly::alias::FType;
use crate::common::Observation;

/// Index of the root node in every tree arena.
pub const ROOT: usize = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparator {
    LessThan,
}

impl Comparator {
    fn holds<F: FType>(&self, value: F, threshold: F) -> bool {
        match self {
            Comparator::LessThan => value < threshold,
        }
    }
}

/// Decides which side of a node an observation falls on.
#[derive(Debug, Clone, PartialEq)]
pub struct SplitRule<F: FType> {
    pub feature: String,
    pub comparator: Comparator,
    pub threshold: F,
}

impl<F: FType> SplitRule<F> {
    /// `None` when the observation lacks the split feature.
    pub fn goes_left(&self, x: &Observation<F>) -> Option<bool> {
        x.get(&self.feature)
            .map(|value| self.comparator.holds(*value, self.threshold))
    }
}

/// The two mass generations of a node.
///
/// `running` counts the observations of the window being filled, `reference` holds the
/// count of the last completed window and is what scoring reads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Mass {
    pub running: u32,
    pub reference: u32,
}

impl Mass {
    /// Freeze the running count into the reference and start a new window.
    pub fn rotate(&mut self) {
        self.reference = self.running;
        self.running = 0;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node<F: FType> {
    Leaf {
        mass: Mass,
    },
    Internal {
        mass: Mass,
        split: SplitRule<F>,
        left: usize,
        right: usize,
    },
}

impl<F: FType> Node<F> {
    pub fn leaf() -> Self {
        Node::Leaf {
            mass: Mass::default(),
        }
    }

    pub fn mass(&self) -> &Mass {
        match self {
            Node::Leaf { mass } | Node::Internal { mass, .. } => mass,
        }
    }

    pub fn mass_mut(&mut self) -> &mut Mass {
        match self {
            Node::Leaf { mass } | Node::Internal { mass, .. } => mass,
        }
    }

    pub fn split(&self) -> Option<&SplitRule<F>> {
        match self {
            Node::Leaf { .. } => None,
            Node::Internal { split, .. } => Some(split),
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf { .. })
    }
}

/// A half-space tree stored as an arena of nodes. Internal nodes refer to their children
/// by index, the root sits at [`ROOT`].
#[derive(Debug, Clone)]
pub struct Tree<F: FType> {
    pub(crate) nodes: Vec<Node<F>>,
}

impl<F: FType> Tree<F> {
    pub(crate) fn from_nodes(nodes: Vec<Node<F>>) -> Self {
        Tree { nodes }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, idx: usize) -> Option<&Node<F>> {
        self.nodes.get(idx)
    }

    /// All nodes, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &Node<F>> {
        self.nodes.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Node<F>> {
        self.nodes.iter_mut()
    }

    /// Index of the child the walk moves to from `idx`, `None` at a leaf.
    ///
    /// When `x` lacks the split feature the walk follows the child holding the larger
    /// running mass, preferring the left one on ties.
    pub(crate) fn next_index(&self, idx: usize, x: &Observation<F>) -> Option<usize> {
        match self.nodes.get(idx)? {
            Node::Leaf { .. } => None,
            Node::Internal {
                split, left, right, ..
            } => {
                let go_left = match split.goes_left(x) {
                    Some(go_left) => go_left,
                    None => {
                        self.nodes[*left].mass().running >= self.nodes[*right].mass().running
                    }
                };
                Some(if go_left { *left } else { *right })
            }
        }
    }

    /// Lazily walk `x` from the root down to a leaf.
    pub fn walk<'a>(&'a self, x: &'a Observation<F>) -> Walk<'a, F> {
        Walk {
            tree: self,
            x,
            cursor: if self.nodes.is_empty() {
                None
            } else {
                Some(ROOT)
            },
        }
    }

    /// Add one to the running mass of every node on the path of `x`.
    pub(crate) fn learn(&mut self, x: &Observation<F>) {
        let mut cursor = Some(ROOT);
        while let Some(idx) = cursor {
            self.nodes[idx].mass_mut().running += 1;
            // Sibling masses are untouched by the increment above, so the fallback sees
            // the same state a read-only walk would.
            cursor = self.next_index(idx, x);
        }
    }

    pub(crate) fn rotate(&mut self) {
        for node in self.iter_mut() {
            node.mass_mut().rotate();
        }
    }

    fn recursive_repr(&self, idx: usize, f: &mut fmt::Formatter<'_>, prefix: &str) -> fmt::Result {
        let node = &self.nodes[idx];
        let mass = node.mass();
        match node {
            Node::Leaf { .. } => writeln!(
                f,
                "{}├─Leaf {}: running={}, reference={}",
                prefix, idx, mass.running, mass.reference
            ),
            Node::Internal {
                split, left, right, ..
            } => {
                writeln!(
                    f,
                    "{}├─Node {}: {} < {:.4}, running={}, reference={}",
                    prefix, idx, split.feature, split.threshold, mass.running, mass.reference
                )?;
                let child_prefix = prefix.to_owned() + "│ ";
                self.recursive_repr(*left, f, &child_prefix)?;
                self.recursive_repr(*right, f, &child_prefix)
            }
        }
    }
}

impl<F: FType> fmt::Display for Tree<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "┌ HalfSpaceTree")?;
        if self.nodes.is_empty() {
            return Ok(());
        }
        self.recursive_repr(ROOT, f, "│ ")
    }
}

/// Iterator over the nodes visited by an observation, from the root to a leaf.
///
/// Stopping early is fine: nothing is cached and every call to [`Tree::walk`] starts over.
pub struct Walk<'a, F: FType> {
    tree: &'a Tree<F>,
    x: &'a Observation<F>,
    cursor: Option<usize>,
}

impl<'a, F: FType> Iterator for Walk<'a, F> {
    type Item = (usize, &'a Node<F>);

    fn next(&mut self) -> Option<Self::Item> {
        let idx = self.cursor?;
        self.cursor = self.tree.next_index(idx, self.x);
        Some((idx, &self.tree.nodes[idx]))
    }
}
