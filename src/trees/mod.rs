/// Decision tree classifier and its induction engine
pub mod classifier;
/// Entropy and information gain
pub mod entropy;
/// Per-attribute split search
pub mod evaluator;
/// Tree node model
pub mod node;
/// Tree parameters
pub mod params;
/// Partitioning of records and split candidates
pub mod partition;
