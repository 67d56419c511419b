/// Random forest classifier
pub mod classifier;
/// Forest parameters
pub mod params;
