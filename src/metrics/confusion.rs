use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{self, Display, Formatter};

use nalgebra::{DMatrix, DVector};

use crate::data::dataset::WholeNumber;
use crate::error::Id3Error;

/// Counts of `(actual, predicted)` label pairs.
#[derive(Clone, Debug, PartialEq)]
pub struct ConfusionMatrix<YT: WholeNumber> {
    counts: BTreeMap<(YT, YT), usize>,
}

impl<YT: WholeNumber> Default for ConfusionMatrix<YT> {
    fn default() -> Self {
        Self::new()
    }
}

impl<YT: WholeNumber> ConfusionMatrix<YT> {
    pub fn new() -> Self {
        Self {
            counts: BTreeMap::new(),
        }
    }

    /// Builds a matrix from paired label vectors.
    pub fn from_predictions(actual: &DVector<YT>, predicted: &DVector<YT>) -> Result<Self, Id3Error> {
        if actual.len() != predicted.len() {
            return Err(Id3Error::PredictionCountMismatch {
                expected: actual.len(),
                found: predicted.len(),
            });
        }
        let mut matrix = Self::new();
        for (&a, &p) in actual.iter().zip(predicted.iter()) {
            matrix.increment(a, p);
        }
        Ok(matrix)
    }

    pub fn increment(&mut self, actual: YT, predicted: YT) {
        *self.counts.entry((actual, predicted)).or_insert(0) += 1;
    }

    pub fn count(&self, actual: YT, predicted: YT) -> usize {
        self.counts.get(&(actual, predicted)).copied().unwrap_or(0)
    }

    /// Every label seen as actual or predicted, ascending.
    pub fn labels(&self) -> Vec<YT> {
        let labels: BTreeSet<YT> = self.counts.keys().flat_map(|&(a, p)| [a, p]).collect();
        labels.into_iter().collect()
    }

    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    /// Dense form: row = actual, column = predicted, both in `labels()` order.
    pub fn as_matrix(&self) -> (Vec<YT>, DMatrix<usize>) {
        let labels = self.labels();
        let mut matrix = DMatrix::zeros(labels.len(), labels.len());
        for (&(actual, predicted), &count) in &self.counts {
            let row = labels.iter().position(|&l| l == actual);
            let col = labels.iter().position(|&l| l == predicted);
            if let (Some(row), Some(col)) = (row, col) {
                matrix[(row, col)] = count;
            }
        }
        (labels, matrix)
    }

    /// Dense form with every row divided by its sum, so entry `(a, p)` is the
    /// share of actual `a` instances predicted as `p`. Empty rows stay zero.
    pub fn normalized(&self) -> (Vec<YT>, DMatrix<f64>) {
        let (labels, counts) = self.as_matrix();
        let mut matrix = counts.map(|count| count as f64);
        for mut row in matrix.row_iter_mut() {
            let sum = row.sum();
            if sum > 0.0 {
                row /= sum;
            }
        }
        (labels, matrix)
    }

    /// Renders [`normalized`](Self::normalized) as a table.
    pub fn display_normalized(&self) -> impl Display + '_ {
        Normalized(self)
    }

    pub fn accuracy(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        let correct: usize = self
            .counts
            .iter()
            .filter(|((actual, predicted), _)| actual == predicted)
            .map(|(_, &count)| count)
            .sum();
        correct as f64 / total as f64
    }

    /// `TP / (TP + FP)` for `label`; 0 when it was never predicted.
    pub fn precision(&self, label: YT) -> f64 {
        let tp = self.count(label, label);
        let predicted: usize = self
            .counts
            .iter()
            .filter(|((_, p), _)| *p == label)
            .map(|(_, &count)| count)
            .sum();
        ratio(tp, predicted)
    }

    /// `TP / (TP + FN)` for `label`; 0 when it never occurred.
    pub fn recall(&self, label: YT) -> f64 {
        let tp = self.count(label, label);
        let actual: usize = self
            .counts
            .iter()
            .filter(|((a, _), _)| *a == label)
            .map(|(_, &count)| count)
            .sum();
        ratio(tp, actual)
    }

    /// Harmonic mean of precision and recall; 0 when both are 0.
    pub fn f_measure(&self, label: YT) -> f64 {
        let precision = self.precision(label);
        let recall = self.recall(label);
        if precision + recall == 0.0 {
            0.0
        } else {
            2.0 * precision * recall / (precision + recall)
        }
    }

    pub fn average_precision(&self) -> f64 {
        self.average(|label| self.precision(label))
    }

    pub fn average_recall(&self) -> f64 {
        self.average(|label| self.recall(label))
    }

    fn average(&self, metric: impl Fn(YT) -> f64) -> f64 {
        let labels = self.labels();
        if labels.is_empty() {
            return 0.0;
        }
        labels.iter().map(|&label| metric(label)).sum::<f64>() / labels.len() as f64
    }
}

fn ratio(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64
    }
}

fn write_table<YT: WholeNumber, T: nalgebra::Scalar>(
    f: &mut Formatter<'_>,
    labels: &[YT],
    matrix: &DMatrix<T>,
    cell: impl Fn(&T) -> String,
) -> fmt::Result {
    write!(f, "{:>10}", "")?;
    for label in labels {
        write!(f, " {:>8}", format!("pred {}", label))?;
    }
    writeln!(f)?;
    for (row, label) in labels.iter().enumerate() {
        write!(f, "{:>10}", format!("actual {}", label))?;
        for col in 0..labels.len() {
            write!(f, " {:>8}", cell(&matrix[(row, col)]))?;
        }
        writeln!(f)?;
    }
    Ok(())
}

impl<YT: WholeNumber> Display for ConfusionMatrix<YT> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let (labels, matrix) = self.as_matrix();
        write_table(f, &labels, &matrix, |count| count.to_string())
    }
}

struct Normalized<'a, YT: WholeNumber>(&'a ConfusionMatrix<YT>);

impl<YT: WholeNumber> Display for Normalized<'_, YT> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let (labels, matrix) = self.0.normalized();
        write_table(f, &labels, &matrix, |share| format!("{:.4}", share))
    }
}

const COUNT_SEED: f64 = 0.01;

/// One-vs-rest outcome counts for one tracked class.
///
/// All four counts start at 0.01 so the rates stay defined on sparse folds.
#[derive(Clone, Debug, PartialEq)]
pub struct ClassMetrics<YT: WholeNumber> {
    class: YT,
    true_positives: f64,
    false_positives: f64,
    true_negatives: f64,
    false_negatives: f64,
}

impl<YT: WholeNumber> ClassMetrics<YT> {
    pub fn new(class: YT) -> Self {
        Self {
            class,
            true_positives: COUNT_SEED,
            false_positives: COUNT_SEED,
            true_negatives: COUNT_SEED,
            false_negatives: COUNT_SEED,
        }
    }

    pub fn class(&self) -> YT {
        self.class
    }

    /// Adds exactly one outcome for this class.
    pub fn record(&mut self, actual: YT, predicted: YT) {
        if actual == predicted {
            if actual == self.class {
                self.true_positives += 1.0;
            } else {
                self.true_negatives += 1.0;
            }
        } else if actual == self.class {
            self.false_negatives += 1.0;
        } else if predicted == self.class {
            self.false_positives += 1.0;
        } else {
            // A mistake between two other classes is still a negative here.
            self.true_negatives += 1.0;
        }
    }

    pub fn true_positives(&self) -> f64 {
        self.true_positives
    }

    pub fn false_positives(&self) -> f64 {
        self.false_positives
    }

    pub fn true_negatives(&self) -> f64 {
        self.true_negatives
    }

    pub fn false_negatives(&self) -> f64 {
        self.false_negatives
    }

    /// Sum of the four counts without their seeds.
    pub fn observed(&self) -> f64 {
        self.true_positives + self.false_positives + self.true_negatives + self.false_negatives
            - 4.0 * COUNT_SEED
    }

    /// `TP / (TP + FN)`
    pub fn tpr(&self) -> f64 {
        self.true_positives / (self.true_positives + self.false_negatives)
    }

    /// `FP / (FP + TN)`
    pub fn fpr(&self) -> f64 {
        self.false_positives / (self.false_positives + self.true_negatives)
    }
}

impl<YT: WholeNumber> Display for ClassMetrics<YT> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "class {}: tp={:.2} fp={:.2} tn={:.2} fn={:.2} tpr={:.4} fpr={:.4}",
            self.class,
            self.true_positives,
            self.false_positives,
            self.true_negatives,
            self.false_negatives,
            self.tpr(),
            self.fpr()
        )
    }
}

/// Share of the model's votes for the actual class, and whether the prediction was right.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RocSample {
    pub score: f64,
    pub truth: bool,
}
