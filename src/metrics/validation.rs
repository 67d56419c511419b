//! k-fold cross-validation over contiguous folds.
use std::fmt::{self, Display, Formatter};

use tracing::{debug, info, instrument};

use super::confusion::{ClassMetrics, ConfusionMatrix, RocSample};
use crate::data::dataset::{Dataset, RealNumber, Record, WholeNumber};
use crate::error::Id3Error;
use crate::trees::partition::classes_of;

/// Anything that classifies a single record.
pub trait Predictor<XT: RealNumber, YT: WholeNumber> {
    fn predict_record(&self, record: &Record<XT, YT>) -> Result<YT, Id3Error>;

    /// Share of the model's votes that go to `label`. A single tree votes
    /// once, so this is 1.0 for its prediction and 0.0 otherwise.
    ///
    /// Evaluation asks for the share of the record's actual class.
    fn vote_share(&self, record: &Record<XT, YT>, label: YT) -> Result<f64, Id3Error> {
        let predicted = self.predict_record(record)?;
        Ok(if predicted == label { 1.0 } else { 0.0 })
    }
}

/// Scores `model` on `test`, adding to the running statistics.
pub fn evaluate_fold<XT, YT, P>(
    model: &P,
    test: &[&Record<XT, YT>],
    confusion: &mut ConfusionMatrix<YT>,
    class_metrics: &mut [ClassMetrics<YT>],
    roc_samples: &mut Vec<RocSample>,
) -> Result<(), Id3Error>
where
    XT: RealNumber,
    YT: WholeNumber,
    P: Predictor<XT, YT> + ?Sized,
{
    for record in test {
        let actual = record.class();
        let predicted = model.predict_record(record)?;
        confusion.increment(actual, predicted);
        for metrics in class_metrics.iter_mut() {
            metrics.record(actual, predicted);
        }
        roc_samples.push(RocSample {
            score: model.vote_share(record, actual)?,
            truth: predicted == actual,
        });
    }
    Ok(())
}

/// What the fold size is derived from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FoldSizing {
    /// `ceil(attribute_count / k)`, the historical rule.
    #[default]
    ByAttributeCount,
    /// `ceil(record_count / k)`.
    ByRecordCount,
}

#[derive(Clone, Debug)]
pub struct CrossValidation {
    k: usize,
    sizing: FoldSizing,
}

/// Statistics accumulated over every fold of one run.
#[derive(Clone, Debug)]
pub struct CrossValidationResult<YT: WholeNumber> {
    pub confusion: ConfusionMatrix<YT>,
    /// One entry per class of the full dataset, ascending.
    pub class_metrics: Vec<ClassMetrics<YT>>,
    pub roc_samples: Vec<RocSample>,
    /// Number of chunks evaluated, which can exceed `k`.
    pub folds: usize,
    /// Number of test predictions made.
    pub tested: usize,
}

impl CrossValidation {
    pub fn new(k: usize) -> Result<Self, Id3Error> {
        if k < 2 {
            return Err(Id3Error::InvalidFoldCount { k });
        }
        Ok(Self {
            k,
            sizing: FoldSizing::default(),
        })
    }

    pub fn set_sizing(&mut self, sizing: FoldSizing) {
        self.sizing = sizing;
    }

    pub fn k(&self) -> usize {
        self.k
    }

    pub fn sizing(&self) -> FoldSizing {
        self.sizing
    }

    /// Records per held-out chunk; never less than one.
    pub fn fold_size<XT: RealNumber, YT: WholeNumber>(&self, dataset: &Dataset<XT, YT>) -> usize {
        let basis = match self.sizing {
            FoldSizing::ByAttributeCount => dataset.attributes().len(),
            FoldSizing::ByRecordCount => dataset.len(),
        };
        basis.div_ceil(self.k).max(1)
    }

    /// Contiguous chunks of `fold_size` records, the last one possibly shorter.
    pub fn folds<'d, XT: RealNumber, YT: WholeNumber>(
        &self,
        dataset: &'d Dataset<XT, YT>,
    ) -> Vec<&'d [Record<XT, YT>]> {
        dataset.records().chunks(self.fold_size(dataset)).collect()
    }

    /// Holds out each chunk in turn, trains a model on the rest with `build`
    /// and scores it on the held-out chunk.
    ///
    /// Statistics accumulate across folds. The tracked classes are those of
    /// the whole dataset, so a class missing from one fold still gets counts.
    #[instrument(skip_all, fields(k = self.k, sizing = ?self.sizing, records = dataset.len()))]
    pub fn evaluate<XT, YT, P, F>(
        &self,
        dataset: &Dataset<XT, YT>,
        mut build: F,
    ) -> Result<CrossValidationResult<YT>, Id3Error>
    where
        XT: RealNumber,
        YT: WholeNumber,
        P: Predictor<XT, YT>,
        F: FnMut(&Dataset<XT, YT>) -> Result<P, Id3Error>,
    {
        let all: Vec<&Record<XT, YT>> = dataset.records().iter().collect();
        let mut result = CrossValidationResult {
            confusion: ConfusionMatrix::new(),
            class_metrics: classes_of(&all).into_iter().map(ClassMetrics::new).collect(),
            roc_samples: Vec::with_capacity(dataset.len()),
            folds: 0,
            tested: 0,
        };

        let chunks = self.folds(dataset);
        debug!(chunks = chunks.len(), fold_size = self.fold_size(dataset), "dataset partitioned");

        for (index, test) in chunks.iter().enumerate() {
            let training: Vec<Record<XT, YT>> = chunks
                .iter()
                .enumerate()
                .filter(|(other, _)| *other != index)
                .flat_map(|(_, chunk)| chunk.iter().cloned())
                .collect();
            let training = Dataset::from_validated(dataset.attributes().to_vec(), training);
            let model = build(&training)?;

            let test: Vec<&Record<XT, YT>> = test.iter().collect();
            evaluate_fold(
                &model,
                &test,
                &mut result.confusion,
                &mut result.class_metrics,
                &mut result.roc_samples,
            )?;
            result.folds += 1;
            result.tested += test.len();
            info!(
                fold = index + 1,
                of = chunks.len(),
                train = training.len(),
                test = test.len(),
                accuracy = result.confusion.accuracy(),
                "fold evaluated"
            );
        }
        Ok(result)
    }
}

impl<YT: WholeNumber> Display for CrossValidationResult<YT> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} predictions over {} folds", self.tested, self.folds)?;
        write!(f, "{}", self.confusion)?;
        writeln!(f, "row-normalized:")?;
        write!(f, "{}", self.confusion.display_normalized())?;
        writeln!(f, "accuracy:          {:.4}", self.confusion.accuracy())?;
        writeln!(f, "average precision: {:.4}", self.confusion.average_precision())?;
        writeln!(f, "average recall:    {:.4}", self.confusion.average_recall())?;
        for label in self.confusion.labels() {
            writeln!(
                f,
                "class {}: precision={:.4} recall={:.4} f-measure={:.4}",
                label,
                self.confusion.precision(label),
                self.confusion.recall(label),
                self.confusion.f_measure(label)
            )?;
        }
        for metrics in &self.class_metrics {
            writeln!(f, "{}", metrics)?;
        }
        Ok(())
    }
}
