//! Bounded worker pools for the two levels of parallel work.
//!
//! Attribute gain searches and whole-tree construction run on separate pools:
//! a tree task blocks on an attribute batch, and that batch must never need a
//! slot in the pool the tree task itself occupies.
use rayon::iter::{IntoParallelIterator, ParallelIterator};
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{debug, error};

use crate::error::Id3Error;

/// Worker counts for [`WorkerPools`].
#[derive(Clone, Debug)]
pub struct PoolConfig {
    attribute_workers: usize,
    tree_workers: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl PoolConfig {
    pub fn new() -> Self {
        Self {
            attribute_workers: 140,
            tree_workers: 40,
        }
    }

    pub fn set_attribute_workers(&mut self, workers: usize) -> Result<(), Id3Error> {
        if workers == 0 {
            return Err(Id3Error::InvalidWorkerCount { pool: "attribute" });
        }
        self.attribute_workers = workers;
        Ok(())
    }

    pub fn set_tree_workers(&mut self, workers: usize) -> Result<(), Id3Error> {
        if workers == 0 {
            return Err(Id3Error::InvalidWorkerCount { pool: "tree" });
        }
        self.tree_workers = workers;
        Ok(())
    }

    pub fn attribute_workers(&self) -> usize {
        self.attribute_workers
    }

    pub fn tree_workers(&self) -> usize {
        self.tree_workers
    }
}

/// A named rayon pool that runs fail-fast batches.
#[derive(Clone)]
pub struct WorkerPool {
    name: &'static str,
    pool: Arc<ThreadPool>,
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("name", &self.name)
            .field("threads", &self.pool.current_num_threads())
            .finish()
    }
}

impl WorkerPool {
    pub fn new(name: &'static str, workers: usize) -> Result<Self, Id3Error> {
        if workers == 0 {
            return Err(Id3Error::InvalidWorkerCount { pool: name });
        }
        let pool = ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(move |index| format!("{name}-{index}"))
            .build()?;
        debug!(pool = name, workers, "worker pool started");
        Ok(Self {
            name,
            pool: Arc::new(pool),
        })
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn workers(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Runs `task` over every item on this pool and blocks until the batch is
    /// done. Results keep the order of `items`.
    ///
    /// The first error stops the remaining items from being started and is
    /// returned as is. A panicking task aborts the batch and is reported as
    /// [`Id3Error::WorkerFailure`].
    pub fn try_map<I, T, F>(&self, items: Vec<I>, task: F) -> Result<Vec<T>, Id3Error>
    where
        I: Send,
        T: Send,
        F: Fn(I) -> Result<T, Id3Error> + Sync + Send,
    {
        let batch = panic::catch_unwind(AssertUnwindSafe(|| {
            self.pool
                .install(|| items.into_par_iter().map(&task).collect::<Result<Vec<T>, _>>())
        }));

        match batch {
            Ok(results) => results,
            Err(payload) => {
                let reason = panic_reason(payload.as_ref());
                error!(pool = self.name, %reason, "worker task panicked, aborting batch");
                Err(Id3Error::WorkerFailure {
                    pool: self.name,
                    reason,
                })
            }
        }
    }
}

fn panic_reason(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// The attribute-evaluation pool and the tree-construction pool.
#[derive(Clone, Debug)]
pub struct WorkerPools {
    attributes: WorkerPool,
    trees: WorkerPool,
}

impl WorkerPools {
    pub fn new(config: &PoolConfig) -> Result<Self, Id3Error> {
        Ok(Self {
            attributes: WorkerPool::new("attribute", config.attribute_workers)?,
            trees: WorkerPool::new("tree", config.tree_workers)?,
        })
    }

    pub fn attributes(&self) -> &WorkerPool {
        &self.attributes
    }

    pub fn trees(&self) -> &WorkerPool {
        &self.trees
    }
}
