use std::path::PathBuf;

/// Errors from tree induction, forest building and evaluation.
#[derive(Debug, thiserror::Error)]
pub enum Id3Error {
    /// Returned when the root working set carries a single class.
    #[error("no classification needed: every training record has class {label}")]
    NoClassificationNeeded {
        /// The only class present.
        label: String,
    },

    /// Returned when no attribute yields a usable split at the root.
    #[error("no attribute yields a usable split at the root")]
    NoUsableSplit,

    /// Returned when a tree is requested from zero records.
    #[error("dataset has zero records")]
    EmptyDataset,

    /// Returned when a dataset or attribute subset names no attributes.
    #[error("at least one attribute is required")]
    ZeroAttributes,

    /// Returned when an attribute name is listed twice.
    #[error("attribute {attribute} is listed more than once")]
    DuplicateAttribute {
        /// The repeated attribute name.
        attribute: String,
    },

    /// Returned when an attribute subset names an attribute the dataset lacks.
    #[error("attribute {attribute} is not part of the dataset")]
    UnknownAttribute {
        /// The unknown attribute name.
        attribute: String,
    },

    /// Returned when a record does not carry a value for an attribute.
    #[error("record has no value for attribute {attribute}")]
    MissingAttribute {
        /// The attribute without a value.
        attribute: String,
    },

    /// Returned when a value is NaN or infinite.
    #[error("non-finite value for attribute {attribute} in record {record_index}")]
    NonFiniteValue {
        /// Zero-based index of the offending record.
        record_index: usize,
        /// The attribute holding the value.
        attribute: String,
    },

    /// Returned when the midpoint strategy is given a zero depth.
    #[error("max_depth must be at least 1, got {max_depth}")]
    InvalidMaxDepth {
        /// The invalid depth.
        max_depth: u16,
    },

    /// Returned when a forest is asked for zero trees.
    #[error("num_trees must be at least 1, got {num_trees}")]
    InvalidTreeCount {
        /// The invalid tree count.
        num_trees: usize,
    },

    /// Returned when the per-tree attribute sample does not fit the attribute set.
    #[error("attribute_sample_size must be in [1, {n_attributes}], got {sample_size}")]
    InvalidAttributeSampleSize {
        /// Requested attributes per tree.
        sample_size: usize,
        /// Attributes available.
        n_attributes: usize,
    },

    /// Returned when cross-validation is asked for fewer than 2 folds.
    #[error("k must be at least 2, got {k}")]
    InvalidFoldCount {
        /// The invalid fold count.
        k: usize,
    },

    /// Returned when a worker pool is configured with zero threads.
    #[error("{pool} pool needs at least one worker")]
    InvalidWorkerCount {
        /// Name of the pool.
        pool: &'static str,
    },

    /// Returned when a random class index cannot be expressed as a label.
    #[error("class index {index} cannot be represented as a label")]
    LabelOutOfRange {
        /// The drawn index.
        index: usize,
    },

    /// Returned when actual and predicted label vectors differ in length.
    #[error("expected {expected} predictions, got {found}")]
    PredictionCountMismatch {
        /// Number of actual labels.
        expected: usize,
        /// Number of predicted labels.
        found: usize,
    },

    /// Returned when predicting with a tree that was never fitted.
    #[error("tree wasn't built yet")]
    TreeNotBuilt,

    /// Returned when a task in a worker pool panics.
    #[error("worker failure in {pool} pool: {reason}")]
    WorkerFailure {
        /// Name of the pool the task ran on.
        pool: &'static str,
        /// Panic message of the failed task.
        reason: String,
    },

    /// Returned when a worker pool cannot be started.
    #[error("failed to build worker pool")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// Returned when the input file cannot be opened or read.
    #[error("failed to read records from {path}")]
    ReadInput {
        /// Path of the input file.
        path: PathBuf,
        /// The underlying csv error.
        source: csv::Error,
    },

    /// Returned when a csv record cannot be decoded.
    #[error("malformed input on line {line}")]
    MalformedLine {
        /// One-based line number.
        line: usize,
        /// The underlying csv error.
        source: csv::Error,
    },

    /// Returned when a line has fewer fields than attributes + label.
    #[error("line {line} has no field {field}")]
    MissingField {
        /// One-based line number.
        line: usize,
        /// Name of the missing field.
        field: String,
    },

    /// Returned when a field is not a number.
    #[error("line {line}: {field} value {value:?} is not a number")]
    ParseValue {
        /// One-based line number.
        line: usize,
        /// Name of the field.
        field: String,
        /// The raw text.
        value: String,
    },

    /// Returned when a class label is not an integral number.
    #[error("line {line}: class label {value:?} is not an integral number")]
    InvalidLabel {
        /// One-based line number.
        line: usize,
        /// The raw text.
        value: String,
    },
}
