use std::collections::BTreeMap;

use nalgebra::DVector;
use rand::{rngs::StdRng, Rng, SeedableRng};
use tracing::{debug, info, instrument};

use super::params::ForestParams;
use crate::data::dataset::{Dataset, RealNumber, Record, WholeNumber};
use crate::error::Id3Error;
use crate::metrics::validation::Predictor;
use crate::pool::WorkerPools;
use crate::trees::classifier::DecisionTreeClassifier;
use crate::trees::params::TreeParams;
use crate::trees::partition::most_frequent;

/// Greedy trees over random attribute subsets, combined by majority vote.
///
/// Every tree sees all records; only the attributes differ between trees.
#[derive(Clone, Debug)]
pub struct RandomForestClassifier<XT: RealNumber, YT: WholeNumber> {
    trees: Vec<DecisionTreeClassifier<XT, YT>>,
    params: ForestParams,
    pools: WorkerPools,
}

impl<XT: RealNumber, YT: WholeNumber> RandomForestClassifier<XT, YT> {
    pub fn new(pools: WorkerPools) -> Self {
        Self::with_params(ForestParams::new(), pools)
    }

    pub fn with_params(params: ForestParams, pools: WorkerPools) -> Self {
        Self {
            trees: Vec::with_capacity(params.num_trees()),
            params,
            pools,
        }
    }

    pub fn params(&self) -> &ForestParams {
        &self.params
    }

    pub fn trees(&self) -> &[DecisionTreeClassifier<XT, YT>] {
        &self.trees
    }

    /// Builds `num_trees` trees on the tree pool, each over its own sample of
    /// attributes. The first failing tree aborts the whole forest.
    #[instrument(
        skip_all,
        fields(records = dataset.len(), trees = self.params.num_trees(), sample = self.params.attribute_sample_size())
    )]
    pub fn fit(&mut self, dataset: &Dataset<XT, YT>) -> Result<(), Id3Error> {
        let attributes = dataset.attributes();
        self.params.check_sample_size(attributes.len())?;

        let mut rng = match self.params.seed() {
            Some(seed) => StdRng::seed_from_u64(seed),
            _ => StdRng::from_entropy(),
        };
        let seeds = (0..self.params.num_trees())
            .map(|_| rng.gen::<u64>())
            .collect::<Vec<_>>();

        let sample_size = self.params.attribute_sample_size();
        let pools = &self.pools;
        let trees = pools.trees().try_map(seeds, |tree_seed| {
            let mut tree_rng = StdRng::seed_from_u64(tree_seed);
            let chosen = sample_attributes(attributes, sample_size, &mut tree_rng);

            let mut params = TreeParams::new();
            params.set_seed(Some(tree_rng.gen()));
            let mut tree = DecisionTreeClassifier::with_params(params, pools.attributes().clone());
            tree.fit_on(dataset, &chosen)?;
            debug!(attributes = ?chosen, "forest member built");
            Ok(tree)
        })?;

        info!(trees = trees.len(), "forest built");
        self.trees = trees;
        Ok(())
    }

    /// Number of trees voting for each label.
    pub fn votes(&self, record: &Record<XT, YT>) -> Result<BTreeMap<YT, usize>, Id3Error> {
        if self.trees.is_empty() {
            return Err(Id3Error::TreeNotBuilt);
        }
        let mut votes = BTreeMap::new();
        for tree in &self.trees {
            *votes.entry(tree.predict(record)?).or_insert(0) += 1;
        }
        Ok(votes)
    }

    /// Majority vote; on a tie the smallest label wins.
    pub fn predict(&self, record: &Record<XT, YT>) -> Result<YT, Id3Error> {
        most_frequent(&self.votes(record)?).ok_or(Id3Error::TreeNotBuilt)
    }

    pub fn predict_dataset(&self, dataset: &Dataset<XT, YT>) -> Result<DVector<YT>, Id3Error> {
        let predictions = dataset
            .records()
            .iter()
            .map(|record| self.predict(record))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(DVector::from_vec(predictions))
    }

    #[cfg(test)]
    fn from_trees(trees: Vec<DecisionTreeClassifier<XT, YT>>, pools: WorkerPools) -> Self {
        Self {
            trees,
            params: ForestParams::new(),
            pools,
        }
    }
}

impl<XT: RealNumber, YT: WholeNumber> Predictor<XT, YT> for RandomForestClassifier<XT, YT> {
    fn predict_record(&self, record: &Record<XT, YT>) -> Result<YT, Id3Error> {
        self.predict(record)
    }

    fn vote_share(&self, record: &Record<XT, YT>, label: YT) -> Result<f64, Id3Error> {
        let votes = self.votes(record)?;
        let for_label = votes.get(&label).copied().unwrap_or(0);
        Ok(for_label as f64 / self.trees.len() as f64)
    }
}

/// `count` distinct attributes drawn uniformly, re-drawing on collision.
fn sample_attributes(attributes: &[String], count: usize, rng: &mut StdRng) -> Vec<String> {
    let mut chosen: Vec<String> = Vec::with_capacity(count);
    while chosen.len() < count {
        let candidate = &attributes[rng.gen_range(0..attributes.len())];
        if !chosen.contains(candidate) {
            chosen.push(candidate.clone());
        }
    }
    chosen
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::PoolConfig;
    use approx::assert_relative_eq;
    use std::collections::HashSet;

    fn pools() -> WorkerPools {
        let mut config = PoolConfig::new();
        config.set_attribute_workers(4).unwrap();
        config.set_tree_workers(2).unwrap();
        WorkerPools::new(&config).unwrap()
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|name| name.to_string()).collect()
    }

    // Every attribute separates the two classes on its own.
    fn separable() -> Dataset<f64, i64> {
        let attributes = names(&["a", "b", "c", "d"]);
        let records = (0..12)
            .map(|i| {
                let class = if i < 6 { 1 } else { 2 };
                let base = (class * 10) as f64;
                let values = attributes
                    .iter()
                    .enumerate()
                    .map(|(k, name)| (name.clone(), base + ((i + k) % 4) as f64));
                Record::from_pairs(values, class)
            })
            .collect();
        Dataset::new(attributes, records).unwrap()
    }

    fn one_split_tree(low: i64, high: i64, pools: &WorkerPools) -> DecisionTreeClassifier<f64, i64> {
        let records = vec![
            Record::from_pairs([("x", 1.0)], low),
            Record::from_pairs([("x", 10.0)], high),
        ];
        let dataset = Dataset::new(names(&["x"]), records).unwrap();
        let mut tree = DecisionTreeClassifier::new(pools.attributes().clone());
        tree.fit(&dataset).unwrap();
        tree
    }

    #[test]
    fn test_majority_vote() {
        let pools = pools();
        let trees = vec![
            one_split_tree(1, 2, &pools),
            one_split_tree(1, 2, &pools),
            one_split_tree(2, 1, &pools),
        ];
        let forest = RandomForestClassifier::from_trees(trees, pools);
        let record = Record::from_pairs([("x", 1.0)], 0);

        let votes = forest.votes(&record).unwrap();
        assert_eq!(votes.get(&1), Some(&2));
        assert_eq!(votes.get(&2), Some(&1));
        assert_eq!(forest.predict(&record).unwrap(), 1);
        assert_relative_eq!(forest.vote_share(&record, 1).unwrap(), 2.0 / 3.0);
        assert_relative_eq!(forest.vote_share(&record, 3).unwrap(), 0.0);
    }

    #[test]
    fn test_vote_tie_goes_to_smallest_label() {
        let pools = pools();
        let trees = vec![one_split_tree(2, 1, &pools), one_split_tree(1, 2, &pools)];
        let forest = RandomForestClassifier::from_trees(trees, pools);
        let record = Record::from_pairs([("x", 1.0)], 0);
        assert_eq!(forest.predict(&record).unwrap(), 1);
    }

    #[test]
    fn test_fit_and_predict() {
        let dataset = separable();
        let mut params = ForestParams::new();
        params.set_num_trees(5).unwrap();
        params.set_attribute_sample_size(2).unwrap();
        params.set_seed(Some(42));

        let mut forest = RandomForestClassifier::with_params(params, pools());
        forest.fit(&dataset).unwrap();

        assert_eq!(forest.trees().len(), 5);
        for tree in forest.trees() {
            let root = tree.root().unwrap();
            assert!(dataset.attributes().contains(&root.attribute));
        }
        let expected: Vec<i64> = dataset.records().iter().map(|r| r.class()).collect();
        assert_eq!(
            forest.predict_dataset(&dataset).unwrap(),
            DVector::from_vec(expected)
        );
    }

    #[test]
    fn test_fit_is_reproducible_with_seed() {
        let dataset = separable();
        let mut params = ForestParams::new();
        params.set_num_trees(4).unwrap();
        params.set_attribute_sample_size(1).unwrap();
        params.set_seed(Some(3));

        let roots = |params: ForestParams| {
            let mut forest = RandomForestClassifier::with_params(params, pools());
            forest.fit(&dataset).unwrap();
            forest
                .trees()
                .iter()
                .map(|tree| tree.root().cloned())
                .collect::<Vec<_>>()
        };
        assert_eq!(roots(params.clone()), roots(params));
    }

    #[test]
    fn test_sample_size_larger_than_attributes() {
        let mut params = ForestParams::new();
        params.set_attribute_sample_size(5).unwrap();
        let mut forest = RandomForestClassifier::with_params(params, pools());
        assert!(matches!(
            forest.fit(&separable()),
            Err(Id3Error::InvalidAttributeSampleSize {
                sample_size: 5,
                n_attributes: 4
            })
        ));
    }

    #[test]
    fn test_sample_attributes_are_distinct() {
        let attributes = names(&["a", "b", "c", "d", "e"]);
        let mut rng = StdRng::seed_from_u64(9);
        for count in 1..=attributes.len() {
            let chosen = sample_attributes(&attributes, count, &mut rng);
            assert_eq!(chosen.len(), count);
            assert_eq!(chosen.iter().collect::<HashSet<_>>().len(), count);
            assert!(chosen.iter().all(|name| attributes.contains(name)));
        }
    }

    #[test]
    fn test_unfitted_forest() {
        let forest: RandomForestClassifier<f64, i64> = RandomForestClassifier::new(pools());
        let record = Record::from_pairs([("x", 1.0)], 0);
        assert!(matches!(forest.votes(&record), Err(Id3Error::TreeNotBuilt)));
    }
}
