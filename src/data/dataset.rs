use num_traits::{Float, FromPrimitive, Num, ToPrimitive};
use std::cmp::PartialOrd;
use std::collections::{HashMap, HashSet};
use std::fmt::{self, Debug, Display, Formatter};
use std::hash::Hash;
use std::ops::{AddAssign, DivAssign, MulAssign, SubAssign};

use crate::error::Id3Error;

pub trait DataValue:
    Debug
    + Clone
    + Copy
    + Num
    + FromPrimitive
    + ToPrimitive
    + AddAssign
    + SubAssign
    + MulAssign
    + DivAssign
    + Send
    + Sync
    + Display
    + 'static
{
}

impl<T> DataValue for T where
    T: Debug
        + Clone
        + Copy
        + Num
        + FromPrimitive
        + ToPrimitive
        + AddAssign
        + SubAssign
        + MulAssign
        + DivAssign
        + Send
        + Sync
        + Display
        + 'static
{
}

pub trait Number: DataValue + PartialOrd {}
impl<T> Number for T where T: DataValue + PartialOrd {}

/// Class labels: integral, hashable and totally ordered so vote and
/// distribution maps iterate in a fixed order.
pub trait WholeNumber: Number + Eq + Hash + Ord {}
impl<T> WholeNumber for T where T: Number + Eq + Hash + Ord {}

/// Attribute values.
pub trait RealNumber: Number + Float {}
impl<T> RealNumber for T where T: Number + Float {}

/// One labeled instance: attribute name to value, plus its class.
#[derive(Clone, Debug, PartialEq)]
pub struct Record<XT: RealNumber, YT: WholeNumber> {
    values: HashMap<String, XT>,
    class: YT,
}

impl<XT: RealNumber, YT: WholeNumber> Record<XT, YT> {
    pub fn new(values: HashMap<String, XT>, class: YT) -> Self {
        Self { values, class }
    }

    /// Builds a record from `(attribute, value)` pairs.
    pub fn from_pairs<S: Into<String>>(pairs: impl IntoIterator<Item = (S, XT)>, class: YT) -> Self {
        let values = pairs
            .into_iter()
            .map(|(name, value)| (name.into(), value))
            .collect();
        Self { values, class }
    }

    pub fn class(&self) -> YT {
        self.class
    }

    pub fn value(&self, attribute: &str) -> Option<XT> {
        self.values.get(attribute).copied()
    }

    /// Like [`Record::value`], but a missing attribute is an error.
    pub fn require(&self, attribute: &str) -> Result<XT, Id3Error> {
        self.value(attribute)
            .ok_or_else(|| Id3Error::MissingAttribute {
                attribute: attribute.to_string(),
            })
    }

    pub fn values(&self) -> &HashMap<String, XT> {
        &self.values
    }
}

/// Ordered records over an ordered list of attribute names.
///
/// Every record carries a finite value for every attribute; this is checked
/// once on construction so the induction engine can index values freely.
#[derive(Clone)]
pub struct Dataset<XT: RealNumber, YT: WholeNumber> {
    attributes: Vec<String>,
    records: Vec<Record<XT, YT>>,
}

impl<XT: RealNumber, YT: WholeNumber> Debug for Dataset<XT, YT> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Dataset {{\n    attributes: {:?},\n    records: [\n", self.attributes)?;

        for record in &self.records {
            write!(f, "        [")?;
            for attribute in &self.attributes {
                match record.value(attribute) {
                    Some(value) => write!(f, "{:?}, ", value)?,
                    None => write!(f, "-, ")?,
                }
            }
            writeln!(f, "] -> {:?},", record.class)?;
        }

        write!(f, "    ]\n}}")
    }
}

impl<XT: RealNumber, YT: WholeNumber> Dataset<XT, YT> {
    /// Creates a dataset, validating attribute names and record values.
    ///
    /// # Errors
    ///
    /// * [`Id3Error::ZeroAttributes`] if `attributes` is empty.
    /// * [`Id3Error::DuplicateAttribute`] if a name appears twice.
    /// * [`Id3Error::MissingAttribute`] if a record lacks an attribute.
    /// * [`Id3Error::NonFiniteValue`] if a value is NaN or infinite.
    pub fn new(attributes: Vec<String>, records: Vec<Record<XT, YT>>) -> Result<Self, Id3Error> {
        if attributes.is_empty() {
            return Err(Id3Error::ZeroAttributes);
        }
        let mut seen = HashSet::with_capacity(attributes.len());
        for attribute in &attributes {
            if !seen.insert(attribute.as_str()) {
                return Err(Id3Error::DuplicateAttribute {
                    attribute: attribute.clone(),
                });
            }
        }
        for (record_index, record) in records.iter().enumerate() {
            for attribute in &attributes {
                if !record.require(attribute)?.is_finite() {
                    return Err(Id3Error::NonFiniteValue {
                        record_index,
                        attribute: attribute.clone(),
                    });
                }
            }
        }
        Ok(Self {
            attributes,
            records,
        })
    }

    /// Builds a derived dataset from records already known to be valid.
    pub(crate) fn from_validated(attributes: Vec<String>, records: Vec<Record<XT, YT>>) -> Self {
        Self {
            attributes,
            records,
        }
    }

    pub fn attributes(&self) -> &[String] {
        &self.attributes
    }

    pub fn records(&self) -> &[Record<XT, YT>] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Checks that every name in `subset` is one of this dataset's attributes.
    pub fn check_attributes(&self, subset: &[String]) -> Result<(), Id3Error> {
        if subset.is_empty() {
            return Err(Id3Error::ZeroAttributes);
        }
        match subset.iter().find(|name| !self.attributes.contains(name)) {
            Some(unknown) => Err(Id3Error::UnknownAttribute {
                attribute: unknown.clone(),
            }),
            None => Ok(()),
        }
    }
}
