//! Per-attribute split search.
use tracing::debug;

use super::entropy::{best_gain_for_candidates, information_gain};
use super::partition::{
    distinct_sorted_values, midpoint_split, split_candidates, value_range, ClassDistribution,
};
use crate::data::dataset::{RealNumber, Record, WholeNumber};
use crate::error::Id3Error;
use crate::pool::WorkerPool;

/// Best split found for one attribute.
#[derive(Clone, Debug, PartialEq)]
pub struct SplitData<XT: RealNumber> {
    pub attribute: String,
    pub threshold: XT,
    pub information_gain: f64,
}

/// Exhaustive search for every attribute, one task per attribute on `pool`.
///
/// An attribute with fewer than two distinct values has no candidate and
/// yields `None`. Results follow the order of `partitioned`.
pub fn greedy_splits<XT: RealNumber, YT: WholeNumber>(
    pool: &WorkerPool,
    partitioned: Vec<(&str, ClassDistribution<XT, YT>)>,
) -> Result<Vec<Option<SplitData<XT>>>, Id3Error> {
    pool.try_map(partitioned, |(attribute, distribution)| {
        let candidates = split_candidates(&distinct_sorted_values(&distribution));
        let best = best_gain_for_candidates(&distribution, &candidates).map(
            |(information_gain, threshold)| SplitData {
                attribute: attribute.to_string(),
                threshold,
                information_gain,
            },
        );
        debug!(
            attribute,
            candidates = candidates.len(),
            gain = best.as_ref().map(|split| split.information_gain),
            "attribute evaluated"
        );
        Ok(best)
    })
}

/// `(min + max) / 2` for every attribute, evaluated in order on the caller's
/// thread. An attribute whose values are all equal yields `None`, since its
/// midpoint would leave one side empty.
pub fn midpoint_splits<XT: RealNumber, YT: WholeNumber>(
    records: &[&Record<XT, YT>],
    partitioned: Vec<(&str, ClassDistribution<XT, YT>)>,
) -> Vec<Option<SplitData<XT>>> {
    partitioned
        .into_iter()
        .map(|(attribute, distribution)| {
            let threshold = midpoint_split(records, attribute)?;
            let (min, max) = value_range(records, attribute)?;
            if !(min <= threshold && threshold < max) {
                return None;
            }
            Some(SplitData {
                attribute: attribute.to_string(),
                threshold,
                information_gain: information_gain(&distribution, threshold),
            })
        })
        .collect()
}

/// The split with the highest gain across all attributes; the earliest
/// attribute wins ties.
pub fn best_split<XT: RealNumber>(splits: Vec<Option<SplitData<XT>>>) -> Option<SplitData<XT>> {
    splits.into_iter().flatten().fold(None, |best, split| match best {
        Some(best) if best.information_gain >= split.information_gain => Some(best),
        _ => Some(split),
    })
}
