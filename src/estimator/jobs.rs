use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::error::{Result, TdeError};


/// Normalizes a requested job count.
///
/// - `None` is an error for a multithreading estimator,
///   and `1` otherwise.
/// - A negative count `n` means `max(1, cpus + 1 + n)`,
///   so `-1` uses every processor.
/// - `0` means `1`.
/// - A count above the number of processors is capped.
pub fn resolve_n_jobs(n_jobs: Option<isize>, multithreading: bool)
    -> Result<usize>
{
    let cpus = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    resolve_with(n_jobs, multithreading, cpus)
}


fn resolve_with(n_jobs: Option<isize>, multithreading: bool, cpus: usize)
    -> Result<usize>
{
    let n_jobs = match n_jobs {
        Some(n) => n,
        None if multithreading => {
            return Err(TdeError::Config(
                "n_jobs must be set for an estimator \
                with the multithreading capability".into()
            ));
        },
        None => return Ok(1),
    };

    let resolved = if n_jobs < 0 {
        (cpus as isize + 1 + n_jobs).max(1) as usize
    } else {
        (n_jobs as usize).max(1)
    };
    Ok(resolved.min(cpus.max(1)))
}


/// Runs independent per-case jobs and reassembles them in case order.
/// A single job runs on the calling thread.
pub struct JobPool {
    pool: Option<ThreadPool>,
}


impl JobPool {
    /// Builds a pool with `n_jobs` workers.
    pub fn new(n_jobs: usize) -> Result<Self> {
        if n_jobs <= 1 {
            return Ok(Self::sequential());
        }
        let pool = ThreadPoolBuilder::new()
            .num_threads(n_jobs)
            .build()?;
        Ok(Self { pool: Some(pool) })
    }


    /// A pool that runs everything on the calling thread.
    pub fn sequential() -> Self {
        Self { pool: None }
    }


    /// Number of workers.
    pub fn n_jobs(&self) -> usize {
        self.pool.as_ref().map_or(1, |pool| pool.current_num_threads())
    }


    /// Computes `f(0), f(1), ..., f(n - 1)`.
    /// The output is in index order whatever the completion order.
    pub fn map_indexed<T, F>(&self, n: usize, f: F) -> Vec<T>
        where T: Send,
              F: Fn(usize) -> T + Sync + Send,
    {
        match &self.pool {
            Some(pool) => pool.install(|| {
                (0..n).into_par_iter()
                    .map(&f)
                    .collect()
            }),
            None => (0..n).map(f).collect(),
        }
    }


    /// Fallible version of [`JobPool::map_indexed`].
    pub fn try_map_indexed<T, F>(&self, n: usize, f: F) -> Result<Vec<T>>
        where T: Send,
              F: Fn(usize) -> Result<T> + Sync + Send,
    {
        match &self.pool {
            Some(pool) => pool.install(|| {
                (0..n).into_par_iter()
                    .map(&f)
                    .collect()
            }),
            None => (0..n).map(f).collect(),
        }
    }
}
