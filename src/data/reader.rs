//! Reads `label,value_1,...,value_n` lines into a [`Dataset`].
use csv::{ErrorKind, ReaderBuilder, Trim};
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

use crate::data::dataset::{Dataset, RealNumber, Record, WholeNumber};
use crate::error::Id3Error;

/// Reads a headerless data file. Field `i + 1` of every line is the value of
/// `attributes[i]`; field 0 is the class label.
pub fn read_dataset<XT: RealNumber, YT: WholeNumber, P: AsRef<Path>>(
    path: P,
    attributes: &[String],
) -> Result<Dataset<XT, YT>, Id3Error> {
    let path = path.as_ref();
    let reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_path(path)
        .map_err(|source| Id3Error::ReadInput {
            path: path.to_path_buf(),
            source,
        })?;
    let dataset = collect_records(reader, attributes)?;
    info!(path = %path.display(), records = dataset.len(), "dataset loaded");
    Ok(dataset)
}

/// Same as [`read_dataset`], for any byte source.
pub fn dataset_from_reader<XT: RealNumber, YT: WholeNumber, R: Read>(
    source: R,
    attributes: &[String],
) -> Result<Dataset<XT, YT>, Id3Error> {
    let reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(source);
    collect_records(reader, attributes)
}

fn collect_records<XT: RealNumber, YT: WholeNumber, R: Read>(
    mut reader: csv::Reader<R>,
    attributes: &[String],
) -> Result<Dataset<XT, YT>, Id3Error> {
    let mut records = Vec::new();
    // Blank lines yield no record, so line numbers come from the reader.
    let mut last_line = 0;

    for result in reader.records() {
        let row = result.map_err(|source| Id3Error::MalformedLine {
            line: error_line(&source).unwrap_or(last_line + 1),
            source,
        })?;
        let line = row
            .position()
            .map_or(last_line + 1, |position| position.line() as usize);
        last_line = line;
        if row.iter().all(str::is_empty) {
            debug!(line, "skipping blank line");
            continue;
        }

        let raw_label = row.get(0).ok_or_else(|| Id3Error::MissingField {
            line,
            field: "class".to_string(),
        })?;
        let class = parse_label(raw_label, line)?;

        let mut pairs = Vec::with_capacity(attributes.len());
        for (position, attribute) in attributes.iter().enumerate() {
            let raw = row.get(position + 1).ok_or_else(|| Id3Error::MissingField {
                line,
                field: attribute.clone(),
            })?;
            let value = raw
                .parse::<f64>()
                .ok()
                .and_then(XT::from_f64)
                .ok_or_else(|| Id3Error::ParseValue {
                    line,
                    field: attribute.clone(),
                    value: raw.to_string(),
                })?;
            pairs.push((attribute.clone(), value));
        }
        records.push(Record::from_pairs(pairs, class));
    }

    Dataset::new(attributes.to_vec(), records)
}

fn error_line(error: &csv::Error) -> Option<usize> {
    match error.kind() {
        ErrorKind::Utf8 { pos: Some(position), .. }
        | ErrorKind::UnequalLengths { pos: Some(position), .. } => Some(position.line() as usize),
        _ => None,
    }
}

fn parse_label<YT: WholeNumber>(raw: &str, line: usize) -> Result<YT, Id3Error> {
    let invalid = || Id3Error::InvalidLabel {
        line,
        value: raw.to_string(),
    };
    let number = raw.parse::<f64>().map_err(|_| invalid())?;
    if !number.is_finite() || number.fract() != 0.0 {
        return Err(invalid());
    }
    YT::from_f64(number).ok_or_else(invalid)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|name| name.to_string()).collect()
    }

    #[test]
    fn test_reads_label_first_lines() {
        let input = "1,5.1,3.5\n2,4.9,3.0\n3.0,6.2,2.9\n";
        let dataset: Dataset<f64, i64> =
            dataset_from_reader(input.as_bytes(), &names(&["a", "b"])).unwrap();

        assert_eq!(dataset.len(), 3);
        let classes: Vec<_> = dataset.records().iter().map(|r| r.class()).collect();
        assert_eq!(classes, vec![1, 2, 3]);
        assert_eq!(dataset.records()[1].value("a"), Some(4.9));
        assert_eq!(dataset.records()[2].value("b"), Some(2.9));
    }

    #[test]
    fn test_extra_fields_are_ignored() {
        let input = "1,1.0,2.0,99.0\n";
        let dataset: Dataset<f64, i64> =
            dataset_from_reader(input.as_bytes(), &names(&["a"])).unwrap();
        assert_eq!(dataset.records()[0].values().len(), 1);
    }

    #[test]
    fn test_short_line_is_rejected() {
        let input = "1,1.0,2.0\n2,3.0\n";
        let result: Result<Dataset<f64, i64>, _> =
            dataset_from_reader(input.as_bytes(), &names(&["a", "b"]));
        assert!(matches!(
            result,
            Err(Id3Error::MissingField { line: 2, field }) if field == "b"
        ));
    }

    #[test]
    fn test_non_numeric_value_is_rejected() {
        let input = "1,abc\n";
        let result: Result<Dataset<f64, i64>, _> =
            dataset_from_reader(input.as_bytes(), &names(&["a"]));
        assert!(matches!(result, Err(Id3Error::ParseValue { line: 1, .. })));
    }

    #[test]
    fn test_errors_name_the_line_after_blank_lines() {
        let input = "1,1.0\n\n2,abc\n";
        let result: Result<Dataset<f64, i64>, _> =
            dataset_from_reader(input.as_bytes(), &names(&["a"]));
        assert!(matches!(result, Err(Id3Error::ParseValue { line: 3, .. })));

        let input = "1,1.0\n\n\n2.5,2.0\n";
        let result: Result<Dataset<f64, i64>, _> =
            dataset_from_reader(input.as_bytes(), &names(&["a"]));
        assert!(matches!(result, Err(Id3Error::InvalidLabel { line: 4, .. })));
    }

    #[test]
    fn test_blank_lines_are_skipped() {
        let input = "1,1.0\n\n2,2.0\n";
        let dataset: Dataset<f64, i64> =
            dataset_from_reader(input.as_bytes(), &names(&["a"])).unwrap();
        assert_eq!(dataset.len(), 2);
    }

    #[test]
    fn test_fractional_label_is_rejected() {
        let input = "1.5,2.0\n";
        let result: Result<Dataset<f64, i64>, _> =
            dataset_from_reader(input.as_bytes(), &names(&["a"]));
        assert!(matches!(result, Err(Id3Error::InvalidLabel { line: 1, .. })));
    }

    #[test]
    fn test_missing_file_is_reported() {
        let result: Result<Dataset<f64, i64>, _> =
            read_dataset("/definitely/not/here.csv", &names(&["a"]));
        assert!(matches!(result, Err(Id3Error::ReadInput { .. })));
    }
}
