//! Shannon entropy and information gain over class distributions.
use tracing::trace;

use super::partition::ClassDistribution;
use crate::data::dataset::{RealNumber, WholeNumber};

/// `-sum(p_c * log2(p_c))` over the non-empty classes of a distribution.
pub fn entropy<XT: RealNumber, YT: WholeNumber>(distribution: &ClassDistribution<XT, YT>) -> f64 {
    entropy_of_counts(distribution.values().map(Vec::len))
}

fn entropy_of_counts(counts: impl Iterator<Item = usize> + Clone) -> f64 {
    let total: usize = counts.clone().sum();
    if total == 0 {
        return 0.0;
    }
    counts
        .filter(|&count| count > 0)
        .map(|count| {
            let p = count as f64 / total as f64;
            -p * p.log2()
        })
        .sum()
}

/// Entropy reduction from splitting `distribution` at `threshold`.
pub fn information_gain<XT: RealNumber, YT: WholeNumber>(
    distribution: &ClassDistribution<XT, YT>,
    threshold: XT,
) -> f64 {
    gain_with_parent(distribution, entropy(distribution), threshold)
}

fn gain_with_parent<XT: RealNumber, YT: WholeNumber>(
    distribution: &ClassDistribution<XT, YT>,
    parent_entropy: f64,
    threshold: XT,
) -> f64 {
    let (left, right): (Vec<usize>, Vec<usize>) = distribution
        .values()
        .map(|values| {
            let left = values.iter().filter(|&&value| value <= threshold).count();
            (left, values.len() - left)
        })
        .unzip();

    let left_count: usize = left.iter().sum();
    let right_count: usize = right.iter().sum();
    let total = (left_count + right_count) as f64;
    if total == 0.0 {
        return 0.0;
    }

    let weighted = (left_count as f64 / total) * entropy_of_counts(left.iter().copied())
        + (right_count as f64 / total) * entropy_of_counts(right.iter().copied());
    parent_entropy - weighted
}

/// Best `(gain, threshold)` over `candidates`.
///
/// Every candidate is evaluated; on equal gains the earliest candidate wins.
/// Returns `None` when there are no candidates.
pub fn best_gain_for_candidates<XT: RealNumber, YT: WholeNumber>(
    distribution: &ClassDistribution<XT, YT>,
    candidates: &[XT],
) -> Option<(f64, XT)> {
    let parent_entropy = entropy(distribution);
    let mut best: Option<(f64, XT)> = None;

    for &threshold in candidates {
        let gain = gain_with_parent(distribution, parent_entropy, threshold);
        trace!(%threshold, gain, "candidate evaluated");
        if best.map_or(true, |(best_gain, _)| gain > best_gain) {
            best = Some((gain, threshold));
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trees::partition::{distinct_sorted_values, split_candidates};
    use approx::assert_relative_eq;

    fn distribution(groups: Vec<(i64, Vec<f64>)>) -> ClassDistribution<f64, i64> {
        groups.into_iter().collect()
    }

    #[test]
    fn test_entropy_single_class_is_zero() {
        let dist = distribution(vec![(1, vec![1.0, 2.0, 3.0])]);
        assert_relative_eq!(entropy(&dist), 0.0);
    }

    #[test]
    fn test_entropy_even_two_class_split_is_one() {
        let dist = distribution(vec![(1, vec![1.0, 2.0]), (2, vec![3.0, 4.0])]);
        assert_relative_eq!(entropy(&dist), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_entropy_skips_empty_classes() {
        let dist = distribution(vec![(1, vec![1.0, 2.0]), (2, vec![]), (3, vec![5.0, 6.0])]);
        assert_relative_eq!(entropy(&dist), 1.0, epsilon = 1e-12);
        assert_relative_eq!(entropy(&distribution(vec![])), 0.0);
    }

    #[test]
    fn test_entropy_four_even_classes_is_two() {
        let dist = distribution(vec![
            (1, vec![1.0]),
            (2, vec![2.0]),
            (3, vec![3.0]),
            (4, vec![4.0]),
        ]);
        assert_relative_eq!(entropy(&dist), 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_information_gain_perfect_split() {
        let dist = distribution(vec![(1, vec![1.0, 2.0]), (2, vec![10.0, 11.0])]);
        assert_relative_eq!(information_gain(&dist, 6.0), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_information_gain_with_empty_side_is_zero() {
        let dist = distribution(vec![(1, vec![1.0, 2.0]), (2, vec![10.0, 11.0])]);
        assert_relative_eq!(information_gain(&dist, 100.0), 0.0, epsilon = 1e-12);
        assert_relative_eq!(information_gain(&dist, -100.0), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_information_gain_partial_split() {
        // left: {1, 1, 2}, right: {2}
        let dist = distribution(vec![(1, vec![1.0, 2.0]), (2, vec![3.0, 10.0])]);
        let third = 1.0f64 / 3.0;
        let left = -(2.0 * third) * (2.0 * third).log2() - third * third.log2();
        let expected = 1.0 - 0.75 * left;
        assert_relative_eq!(information_gain(&dist, 5.0), expected, epsilon = 1e-12);
    }

    #[test]
    fn test_best_gain_picks_perfect_threshold() {
        let dist = distribution(vec![(1, vec![1.0, 2.0]), (2, vec![10.0, 11.0])]);
        let candidates = split_candidates(&distinct_sorted_values(&dist));
        assert_eq!(candidates, vec![1.5, 6.0, 10.5]);

        let (gain, threshold) = best_gain_for_candidates(&dist, &candidates).unwrap();
        assert_relative_eq!(gain, 1.0, epsilon = 1e-12);
        assert_relative_eq!(threshold, 6.0);
    }

    #[test]
    fn test_best_gain_ties_keep_first_candidate() {
        let single = distribution(vec![(1, vec![1.0, 2.0, 3.0])]);
        let (gain, threshold) = best_gain_for_candidates(&single, &[1.5, 2.5]).unwrap();
        assert_relative_eq!(gain, 0.0);
        assert_relative_eq!(threshold, 1.5);
        assert!(best_gain_for_candidates(&single, &[]).is_none());
    }

    #[test]
    fn test_max_gain_over_candidates_is_non_negative() {
        let dist = distribution(vec![
            (1, vec![1.0, 4.0, 9.0]),
            (2, vec![2.0, 4.5]),
            (3, vec![0.5, 7.0, 8.0]),
        ]);
        let candidates = split_candidates(&distinct_sorted_values(&dist));
        let (gain, _) = best_gain_for_candidates(&dist, &candidates).unwrap();
        assert!(gain >= 0.0);
    }
}
