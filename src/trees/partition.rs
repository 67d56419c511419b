//! Grouping of records by class, and the split candidates derived from them.
use std::collections::{BTreeMap, BTreeSet};

use crate::data::dataset::{RealNumber, Record, WholeNumber};

/// Values of one attribute, grouped by the class of the record they came from.
pub type ClassDistribution<XT, YT> = BTreeMap<YT, Vec<XT>>;

/// Distinct class labels present in `records`.
pub fn classes_of<XT: RealNumber, YT: WholeNumber>(records: &[&Record<XT, YT>]) -> BTreeSet<YT> {
    records.iter().map(|record| record.class()).collect()
}

/// Groups the values of every attribute by class, in attribute order.
///
/// Records are validated on dataset construction, so a missing value cannot
/// occur here; such a record would simply contribute nothing.
pub fn partition_by_attribute<'a, XT: RealNumber, YT: WholeNumber>(
    records: &[&Record<XT, YT>],
    attributes: &'a [String],
) -> Vec<(&'a str, ClassDistribution<XT, YT>)> {
    attributes
        .iter()
        .map(|attribute| {
            let mut distribution = ClassDistribution::new();
            for record in records {
                if let Some(value) = record.value(attribute) {
                    distribution
                        .entry(record.class())
                        .or_insert_with(Vec::new)
                        .push(value);
                }
            }
            (attribute.as_str(), distribution)
        })
        .collect()
}

/// All values of a distribution, sorted ascending with duplicates removed.
pub fn distinct_sorted_values<XT: RealNumber, YT: WholeNumber>(
    distribution: &ClassDistribution<XT, YT>,
) -> Vec<XT> {
    let mut values: Vec<XT> = distribution.values().flatten().copied().collect();
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    values.dedup();
    values
}

/// Midpoints between consecutive values: `n` values give `n - 1` candidates.
pub fn split_candidates<XT: RealNumber>(sorted_values: &[XT]) -> Vec<XT> {
    let two = XT::one() + XT::one();
    sorted_values
        .windows(2)
        .map(|pair| (pair[0] + pair[1]) / two)
        .collect()
}

/// `(min + max) / 2` of an attribute over `records`, `None` when empty.
pub fn midpoint_split<XT: RealNumber, YT: WholeNumber>(
    records: &[&Record<XT, YT>],
    attribute: &str,
) -> Option<XT> {
    value_range(records, attribute).map(|(min, max)| (min + max) / (XT::one() + XT::one()))
}

/// Smallest and largest value of an attribute over `records`.
pub fn value_range<XT: RealNumber, YT: WholeNumber>(
    records: &[&Record<XT, YT>],
    attribute: &str,
) -> Option<(XT, XT)> {
    records
        .iter()
        .filter_map(|record| record.value(attribute))
        .fold(None, |range, value| match range {
            None => Some((value, value)),
            Some((min, max)) => Some((min.min(value), max.max(value))),
        })
}

/// Splits records into `value <= threshold` and `value > threshold`,
/// keeping their relative order.
pub fn split_records<'r, XT: RealNumber, YT: WholeNumber>(
    records: &[&'r Record<XT, YT>],
    attribute: &str,
    threshold: XT,
) -> (Vec<&'r Record<XT, YT>>, Vec<&'r Record<XT, YT>>) {
    records
        .iter()
        .copied()
        .partition(|record| record.value(attribute).is_some_and(|value| value <= threshold))
}

/// Most frequent class; ties go to the smallest label.
pub fn majority_class<XT: RealNumber, YT: WholeNumber>(records: &[&Record<XT, YT>]) -> Option<YT> {
    let mut counts: BTreeMap<YT, usize> = BTreeMap::new();
    for record in records {
        *counts.entry(record.class()).or_insert(0) += 1;
    }
    most_frequent(&counts)
}

/// First key holding the highest count, in key order.
pub(crate) fn most_frequent<YT: WholeNumber>(counts: &BTreeMap<YT, usize>) -> Option<YT> {
    let mut best: Option<(YT, usize)> = None;
    for (&label, &count) in counts {
        if best.map_or(true, |(_, best_count)| count > best_count) {
            best = Some((label, count));
        }
    }
    best.map(|(label, _)| label)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn records() -> Vec<Record<f64, i64>> {
        vec![
            Record::from_pairs([("x", 1.0), ("y", 7.0)], 1),
            Record::from_pairs([("x", 2.0), ("y", 7.0)], 1),
            Record::from_pairs([("x", 10.0), ("y", 3.0)], 2),
            Record::from_pairs([("x", 11.0), ("y", 5.0)], 2),
            Record::from_pairs([("x", 4.0), ("y", 3.0)], 3),
        ]
    }

    #[test]
    fn test_split_candidates_are_midpoints() {
        assert_eq!(split_candidates(&[1.0, 2.0, 4.0]), vec![1.5, 3.0]);
        assert!(split_candidates::<f64>(&[1.0]).is_empty());
        assert!(split_candidates::<f64>(&[]).is_empty());
    }

    #[test]
    fn test_classes_of() {
        let data = records();
        let refs: Vec<_> = data.iter().collect();
        let classes: Vec<_> = classes_of(&refs).into_iter().collect();
        assert_eq!(classes, vec![1, 2, 3]);
    }

    #[test]
    fn test_partition_by_attribute_groups_values_by_class() {
        let data = records();
        let refs: Vec<_> = data.iter().collect();
        let attributes = vec!["x".to_string(), "y".to_string()];
        let partitioned = partition_by_attribute(&refs, &attributes);

        assert_eq!(partitioned.len(), 2);
        let (name, x) = &partitioned[0];
        assert_eq!(*name, "x");
        assert_eq!(x[&1], vec![1.0, 2.0]);
        assert_eq!(x[&2], vec![10.0, 11.0]);
        assert_eq!(x[&3], vec![4.0]);
        assert_eq!(partitioned[1].1[&2], vec![3.0, 5.0]);
    }

    #[test]
    fn test_distinct_sorted_values() {
        let data = records();
        let refs: Vec<_> = data.iter().collect();
        let attributes = vec!["y".to_string()];
        let partitioned = partition_by_attribute(&refs, &attributes);
        assert_eq!(distinct_sorted_values(&partitioned[0].1), vec![3.0, 5.0, 7.0]);
    }

    #[test]
    fn test_midpoint_split() {
        let data = records();
        let refs: Vec<_> = data.iter().collect();
        assert_relative_eq!(midpoint_split(&refs, "x").unwrap(), 6.0);
        assert_relative_eq!(midpoint_split(&refs, "y").unwrap(), 5.0);
        assert!(midpoint_split::<f64, i64>(&[], "x").is_none());
    }

    #[test]
    fn test_split_records_is_a_partition() {
        let data = records();
        let refs: Vec<_> = data.iter().collect();
        let (left, right) = split_records(&refs, "x", 4.0);

        assert_eq!(left.len() + right.len(), refs.len());
        assert!(left.iter().all(|r| r.value("x").unwrap() <= 4.0));
        assert!(right.iter().all(|r| r.value("x").unwrap() > 4.0));
        for record in &refs {
            let in_left = left.iter().filter(|r| std::ptr::eq(**r, *record)).count();
            let in_right = right.iter().filter(|r| std::ptr::eq(**r, *record)).count();
            assert_eq!(in_left + in_right, 1);
        }
    }

    #[test]
    fn test_majority_class_prefers_smallest_label_on_ties() {
        let data = records();
        let refs: Vec<_> = data.iter().collect();
        assert_eq!(majority_class(&refs), Some(1));
        assert_eq!(majority_class(&refs[2..]), Some(2));
        assert_eq!(majority_class::<f64, i64>(&[]), None);
    }
}
