use crate::error::Id3Error;

#[derive(Clone, Debug)]
pub struct ForestParams {
    num_trees: usize,
    attribute_sample_size: usize,
    seed: Option<u64>,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self::new()
    }
}

impl ForestParams {
    pub fn new() -> Self {
        Self {
            num_trees: 10,
            attribute_sample_size: 6,
            seed: None,
        }
    }

    pub fn set_num_trees(&mut self, num_trees: usize) -> Result<(), Id3Error> {
        if num_trees < 1 {
            return Err(Id3Error::InvalidTreeCount { num_trees });
        }
        self.num_trees = num_trees;
        Ok(())
    }

    /// Attributes drawn for each tree. Checked against the dataset on `fit`.
    pub fn set_attribute_sample_size(&mut self, sample_size: usize) -> Result<(), Id3Error> {
        if sample_size < 1 {
            return Err(Id3Error::InvalidAttributeSampleSize {
                sample_size,
                n_attributes: 0,
            });
        }
        self.attribute_sample_size = sample_size;
        Ok(())
    }

    pub fn set_seed(&mut self, seed: Option<u64>) {
        self.seed = seed;
    }

    pub fn num_trees(&self) -> usize {
        self.num_trees
    }

    pub fn attribute_sample_size(&self) -> usize {
        self.attribute_sample_size
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Checks the sample size against the attributes actually available.
    pub fn check_sample_size(&self, n_attributes: usize) -> Result<(), Id3Error> {
        if self.attribute_sample_size > n_attributes {
            return Err(Id3Error::InvalidAttributeSampleSize {
                sample_size: self.attribute_sample_size,
                n_attributes,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setters_validate() {
        let mut params = ForestParams::new();
        assert!(matches!(
            params.set_num_trees(0),
            Err(Id3Error::InvalidTreeCount { num_trees: 0 })
        ));
        assert!(params.set_attribute_sample_size(0).is_err());

        params.set_num_trees(3).unwrap();
        params.set_attribute_sample_size(2).unwrap();
        params.set_seed(Some(11));
        assert_eq!(params.num_trees(), 3);
        assert_eq!(params.attribute_sample_size(), 2);
        assert_eq!(params.seed(), Some(11));
    }

    #[test]
    fn test_check_sample_size() {
        let mut params = ForestParams::new();
        params.set_attribute_sample_size(4).unwrap();
        assert!(params.check_sample_size(4).is_ok());
        assert!(matches!(
            params.check_sample_size(3),
            Err(Id3Error::InvalidAttributeSampleSize {
                sample_size: 4,
                n_attributes: 3
            })
        ));
    }
}
