//! Decision Tree Classifier
use std::fmt::{self, Display, Formatter};

use nalgebra::DVector;
use rand::{rngs::StdRng, Rng, SeedableRng};
use tracing::{debug, instrument};

use super::evaluator::{best_split, greedy_splits, midpoint_splits, SplitData};
use super::node::{Branch, SplitNode};
use super::params::{SplitStrategy, TreeParams};
use super::partition::{classes_of, majority_class, partition_by_attribute, split_records};
use crate::data::dataset::{Dataset, RealNumber, Record, WholeNumber};
use crate::error::Id3Error;
use crate::metrics::validation::Predictor;
use crate::pool::WorkerPool;

/// Binary tree over numeric attributes, split by information gain.
///
/// The greedy strategy sends one gain search per attribute to `pool`, so the
/// pool must not be the one the tree itself is being built on.
#[derive(Clone, Debug)]
pub struct DecisionTreeClassifier<XT: RealNumber, YT: WholeNumber> {
    root: Option<SplitNode<XT, YT>>,
    params: TreeParams,
    pool: WorkerPool,
}

impl<XT: RealNumber, YT: WholeNumber> DecisionTreeClassifier<XT, YT> {
    pub fn new(pool: WorkerPool) -> Self {
        Self::with_params(TreeParams::new(), pool)
    }

    pub fn with_params(params: TreeParams, pool: WorkerPool) -> Self {
        Self {
            root: None,
            params,
            pool,
        }
    }

    pub fn params(&self) -> &TreeParams {
        &self.params
    }

    pub fn root(&self) -> Option<&SplitNode<XT, YT>> {
        self.root.as_ref()
    }

    /// Builds the tree over every attribute of `dataset`.
    pub fn fit(&mut self, dataset: &Dataset<XT, YT>) -> Result<(), Id3Error> {
        self.fit_on(dataset, dataset.attributes())
    }

    /// Builds the tree over the given subset of `dataset`'s attributes.
    ///
    /// # Errors
    ///
    /// * [`Id3Error::EmptyDataset`] if `dataset` has no records.
    /// * [`Id3Error::NoClassificationNeeded`] if every record has the same class.
    /// * [`Id3Error::NoUsableSplit`] if no attribute separates the records.
    /// * [`Id3Error::UnknownAttribute`] if `attributes` names an unknown attribute.
    /// * Any error raised by a gain search on the worker pool.
    #[instrument(
        skip_all,
        fields(records = dataset.len(), attributes = attributes.len(), strategy = ?self.params.strategy)
    )]
    pub fn fit_on(&mut self, dataset: &Dataset<XT, YT>, attributes: &[String]) -> Result<(), Id3Error> {
        dataset.check_attributes(attributes)?;
        let rng = match self.params.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let mut induction = Induction {
            attributes,
            strategy: self.params.strategy,
            pool: &self.pool,
            rng,
        };

        let records: Vec<&Record<XT, YT>> = dataset.records().iter().collect();
        let root = induction.root(&records)?;
        debug!(
            splits = root.split_count(),
            leaves = root.leaf_count(),
            depth = root.depth(),
            "tree built"
        );
        self.root = Some(root);
        Ok(())
    }

    pub fn predict(&self, record: &Record<XT, YT>) -> Result<YT, Id3Error> {
        self.root.as_ref().ok_or(Id3Error::TreeNotBuilt)?.predict(record)
    }

    /// Classifies every record of `dataset`, in order.
    pub fn predict_dataset(&self, dataset: &Dataset<XT, YT>) -> Result<DVector<YT>, Id3Error> {
        let predictions = dataset
            .records()
            .iter()
            .map(|record| self.predict(record))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(DVector::from_vec(predictions))
    }
}

impl<XT: RealNumber, YT: WholeNumber> Predictor<XT, YT> for DecisionTreeClassifier<XT, YT> {
    fn predict_record(&self, record: &Record<XT, YT>) -> Result<YT, Id3Error> {
        self.predict(record)
    }
}

impl<XT: RealNumber, YT: WholeNumber> Display for DecisionTreeClassifier<XT, YT> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match &self.root {
            Some(root) => write!(f, "{}", root),
            None => writeln!(f, "<unfitted tree>"),
        }
    }
}

/// State of one `fit_on` call.
struct Induction<'a> {
    /// Passed unchanged to every node, including the children of a split on
    /// one of them.
    attributes: &'a [String],
    strategy: SplitStrategy,
    pool: &'a WorkerPool,
    rng: StdRng,
}

impl Induction<'_> {
    fn root<XT: RealNumber, YT: WholeNumber>(
        &mut self,
        records: &[&Record<XT, YT>],
    ) -> Result<SplitNode<XT, YT>, Id3Error> {
        let classes = classes_of(records);
        match classes.len() {
            0 => return Err(Id3Error::EmptyDataset),
            1 => {
                let label = classes.iter().map(ToString::to_string).collect();
                return Err(Id3Error::NoClassificationNeeded { label });
            }
            _ => {}
        }
        let split = self.search(records)?.ok_or(Id3Error::NoUsableSplit)?;
        self.split_node(records, split, 1)
    }

    fn grow<XT: RealNumber, YT: WholeNumber>(
        &mut self,
        records: &[&Record<XT, YT>],
        depth: u16,
    ) -> Result<Branch<XT, YT>, Id3Error> {
        if let [record] = records {
            return Ok(Branch::Leaf(record.class()));
        }
        let classes = classes_of(records);
        if classes.len() == 1 {
            let label = classes.into_iter().next().ok_or(Id3Error::EmptyDataset)?;
            return Ok(Branch::Leaf(label));
        }
        match self.search(records)? {
            Some(split) => Ok(Branch::Split(Box::new(self.split_node(records, split, depth)?))),
            None => self.fallback(classes.len(), records.len()).map(Branch::Leaf),
        }
    }

    fn search<XT: RealNumber, YT: WholeNumber>(
        &self,
        records: &[&Record<XT, YT>],
    ) -> Result<Option<SplitData<XT>>, Id3Error> {
        let partitioned = partition_by_attribute(records, self.attributes);
        let splits = match self.strategy {
            SplitStrategy::Midpoint { .. } => midpoint_splits(records, partitioned),
            SplitStrategy::Greedy => greedy_splits(self.pool, partitioned)?,
        };
        Ok(best_split(splits))
    }

    fn split_node<XT: RealNumber, YT: WholeNumber>(
        &mut self,
        records: &[&Record<XT, YT>],
        split: SplitData<XT>,
        depth: u16,
    ) -> Result<SplitNode<XT, YT>, Id3Error> {
        let (left, right) = split_records(records, &split.attribute, split.threshold);
        let depth_reached = match self.strategy {
            SplitStrategy::Midpoint { max_depth } => depth >= max_depth,
            SplitStrategy::Greedy => false,
        };
        let terminal = depth_reached || self.attributes.len() == 1;
        debug!(
            attribute = %split.attribute,
            threshold = %split.threshold,
            gain = split.information_gain,
            depth,
            left = left.len(),
            right = right.len(),
            terminal,
            "split chosen"
        );

        let (left_branch, right_branch) = if terminal {
            (majority_leaf(&left)?, majority_leaf(&right)?)
        } else {
            (self.grow(&left, depth + 1)?, self.grow(&right, depth + 1)?)
        };
        Ok(SplitNode {
            attribute: split.attribute,
            threshold: split.threshold,
            gain: split.information_gain,
            samples: records.len(),
            left: left_branch,
            right: right_branch,
        })
    }

    /// Label for a node no attribute can split: a class index drawn uniformly
    /// from `[0, num_classes)`, used as the label itself.
    fn fallback<YT: WholeNumber>(&mut self, num_classes: usize, samples: usize) -> Result<YT, Id3Error> {
        let index = self.rng.gen_range(0..num_classes);
        debug!(index, samples, "no usable split, falling back to a random class index");
        YT::from_usize(index).ok_or(Id3Error::LabelOutOfRange { index })
    }
}

fn majority_leaf<XT: RealNumber, YT: WholeNumber>(
    records: &[&Record<XT, YT>],
) -> Result<Branch<XT, YT>, Id3Error> {
    majority_class(records)
        .map(Branch::Leaf)
        .ok_or(Id3Error::EmptyDataset)
}
