/// Records, datasets and the numeric traits they are generic over
pub mod dataset;
/// CSV input
pub mod reader;
