/// Confusion matrix and per-class outcome counts
pub mod confusion;
/// Cross-validation harness
pub mod validation;
