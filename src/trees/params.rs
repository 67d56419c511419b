use crate::error::Id3Error;

/// How a node picks its split threshold.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SplitStrategy {
    /// One threshold per attribute, `(min + max) / 2`, with a depth bound.
    /// The root is at depth 1.
    Midpoint { max_depth: u16 },
    /// Exhaustive search over midpoints between sorted distinct values,
    /// one parallel task per attribute. No depth bound.
    Greedy,
}

#[derive(Clone, Debug)]
pub struct TreeParams {
    pub strategy: SplitStrategy,
    pub seed: Option<u64>,
}

impl Default for TreeParams {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeParams {
    pub fn new() -> Self {
        Self {
            strategy: SplitStrategy::Greedy,
            seed: None,
        }
    }

    pub fn midpoint(max_depth: u16) -> Result<Self, Id3Error> {
        let mut params = Self::new();
        params.set_strategy(SplitStrategy::Midpoint { max_depth })?;
        Ok(params)
    }

    pub fn set_strategy(&mut self, strategy: SplitStrategy) -> Result<(), Id3Error> {
        if let SplitStrategy::Midpoint { max_depth: 0 } = strategy {
            return Err(Id3Error::InvalidMaxDepth { max_depth: 0 });
        }
        self.strategy = strategy;
        Ok(())
    }

    /// Seeds the generator behind fallback classifications.
    pub fn set_seed(&mut self, seed: Option<u64>) {
        self.seed = seed;
    }

    pub fn strategy(&self) -> SplitStrategy {
        self.strategy
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    pub fn max_depth(&self) -> Option<u16> {
        match self.strategy {
            SplitStrategy::Midpoint { max_depth } => Some(max_depth),
            SplitStrategy::Greedy => None,
        }
    }
}
