//! # Rusty-id3
//!
//! `rusty-id3` induces binary decision trees from labeled numeric data using
//! entropy and information gain, combines them into attribute-bagged forests
//! and evaluates both with k-fold cross-validation.
//!
//! ## Getting Started
//!
//! To use `rusty-id3`, add the following to your `Cargo.toml` file:
//!
//! ```toml
//! [dependencies]
//! rusty-id3 = "*"
//! ```
//!
//! ## Example Usage
//!
//! As a quick example, here's how you can use `rusty-id3` to build a greedy tree on a tiny dataset:
//!
//! ```rust
//! use rusty_id3::data::dataset::{Dataset, Record};
//! use rusty_id3::pool::WorkerPool;
//! use rusty_id3::trees::classifier::DecisionTreeClassifier;
//!
//! let records = vec![
//!     Record::from_pairs([("x", 1.0)], 1),
//!     Record::from_pairs([("x", 2.0)], 1),
//!     Record::from_pairs([("x", 10.0)], 2),
//!     Record::from_pairs([("x", 11.0)], 2),
//! ];
//! let dataset: Dataset<f64, i64> = Dataset::new(vec!["x".to_string()], records).unwrap();
//!
//! let mut tree = DecisionTreeClassifier::new(WorkerPool::new("attribute", 4).unwrap());
//! tree.fit(&dataset).unwrap();
//!
//! let prediction = tree.predict(&Record::from_pairs([("x", 1.5)], 0)).unwrap();
//! assert_eq!(prediction, 1);
//! ```

/// Records, datasets and CSV input
pub mod data;
/// Error type shared by the whole crate
pub mod error;
/// Random Forests
pub mod forests;
/// Functions for evaluating model performance
pub mod metrics;
/// Worker pools for parallel gain search and tree construction
pub mod pool;
/// Decision trees
pub mod trees;

pub use error::Id3Error;
