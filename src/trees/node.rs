use std::fmt::{self, Display, Formatter};

use crate::data::dataset::{RealNumber, Record, WholeNumber};
use crate::error::Id3Error;

/// One side of a split: either a terminal classification or a further split.
#[derive(Clone, Debug, PartialEq)]
pub enum Branch<XT: RealNumber, YT: WholeNumber> {
    Leaf(YT),
    Split(Box<SplitNode<XT, YT>>),
}

/// Internal decision node: `attribute <= threshold` goes left, `>` goes right.
#[derive(Clone, Debug, PartialEq)]
pub struct SplitNode<XT: RealNumber, YT: WholeNumber> {
    pub attribute: String,
    pub threshold: XT,
    /// Information gain of the chosen split.
    pub gain: f64,
    /// Number of training records that reached this node.
    pub samples: usize,
    pub left: Branch<XT, YT>,
    pub right: Branch<XT, YT>,
}

impl<XT: RealNumber, YT: WholeNumber> SplitNode<XT, YT> {
    /// Walks the tree from this node down to a classification.
    pub fn predict(&self, record: &Record<XT, YT>) -> Result<YT, Id3Error> {
        let mut node = self;
        loop {
            let branch = if record.require(&node.attribute)? <= node.threshold {
                &node.left
            } else {
                &node.right
            };
            match branch {
                Branch::Leaf(label) => return Ok(*label),
                Branch::Split(child) => node = &**child,
            }
        }
    }

    /// Number of split nodes, this one included.
    pub fn split_count(&self) -> usize {
        1 + self.left.split_count() + self.right.split_count()
    }

    /// Number of terminal classifications.
    pub fn leaf_count(&self) -> usize {
        self.left.leaf_count() + self.right.leaf_count()
    }

    /// Longest path in split nodes from this node to a leaf.
    pub fn depth(&self) -> usize {
        1 + self.left.depth().max(self.right.depth())
    }

    fn write_indented(&self, f: &mut Formatter<'_>, indent: usize) -> fmt::Result {
        let pad = "  ".repeat(indent);
        writeln!(
            f,
            "{pad}{} <= {} (gain {:.4}, {} samples)",
            self.attribute, self.threshold, self.gain, self.samples
        )?;
        self.left.write_indented(f, indent + 1)?;
        writeln!(f, "{pad}{} > {}", self.attribute, self.threshold)?;
        self.right.write_indented(f, indent + 1)
    }
}

impl<XT: RealNumber, YT: WholeNumber> Branch<XT, YT> {
    pub fn is_leaf(&self) -> bool {
        matches!(self, Branch::Leaf(_))
    }

    fn split_count(&self) -> usize {
        match self {
            Branch::Leaf(_) => 0,
            Branch::Split(node) => node.split_count(),
        }
    }

    fn leaf_count(&self) -> usize {
        match self {
            Branch::Leaf(_) => 1,
            Branch::Split(node) => node.leaf_count(),
        }
    }

    fn depth(&self) -> usize {
        match self {
            Branch::Leaf(_) => 0,
            Branch::Split(node) => node.depth(),
        }
    }

    fn write_indented(&self, f: &mut Formatter<'_>, indent: usize) -> fmt::Result {
        match self {
            Branch::Leaf(label) => writeln!(f, "{}class {}", "  ".repeat(indent), label),
            Branch::Split(node) => node.write_indented(f, indent),
        }
    }
}

impl<XT: RealNumber, YT: WholeNumber> Display for SplitNode<XT, YT> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        self.write_indented(f, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // x <= 5 ? (y <= 2 ? 1 : 2) : 3
    fn tree() -> SplitNode<f64, i64> {
        SplitNode {
            attribute: "x".to_string(),
            threshold: 5.0,
            gain: 0.9,
            samples: 10,
            left: Branch::Split(Box::new(SplitNode {
                attribute: "y".to_string(),
                threshold: 2.0,
                gain: 0.5,
                samples: 6,
                left: Branch::Leaf(1),
                right: Branch::Leaf(2),
            })),
            right: Branch::Leaf(3),
        }
    }

    #[test]
    fn test_predict_walks_both_sides() {
        let root = tree();
        let at = |x: f64, y: f64| Record::from_pairs([("x", x), ("y", y)], 0);
        assert_eq!(root.predict(&at(1.0, 1.0)).unwrap(), 1);
        assert_eq!(root.predict(&at(5.0, 2.0)).unwrap(), 1);
        assert_eq!(root.predict(&at(5.0, 2.5)).unwrap(), 2);
        assert_eq!(root.predict(&at(5.5, 0.0)).unwrap(), 3);
    }

    #[test]
    fn test_predict_missing_attribute() {
        let root = tree();
        let record = Record::from_pairs([("x", 1.0)], 0);
        assert!(matches!(
            root.predict(&record),
            Err(Id3Error::MissingAttribute { attribute }) if attribute == "y"
        ));
    }

    #[test]
    fn test_tree_statistics() {
        let root = tree();
        assert_eq!(root.split_count(), 2);
        assert_eq!(root.leaf_count(), 3);
        assert_eq!(root.depth(), 2);
        assert!(root.right.is_leaf());
        assert!(!root.left.is_leaf());
    }

    #[test]
    fn test_display() {
        let rendered = tree().to_string();
        let expected = "\
x <= 5 (gain 0.9000, 10 samples)
  y <= 2 (gain 0.5000, 6 samples)
    class 1
  y > 2
    class 2
x > 5
  class 3
";
        assert_eq!(rendered, expected);
    }
}
