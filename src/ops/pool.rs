// ============================================================================
// WORKER POOL — bounded rayon pool plus fork-join helpers
// ============================================================================

use super::BlurError;

/// A fixed-size rayon thread pool that blur work can be confined to.
///
/// Without one, work runs on rayon's global pool. The size is fixed at
/// construction; nothing resizes it while a blur is running.
pub struct WorkerPool {
    pool: rayon::ThreadPool,
}

impl WorkerPool {
    /// Build a pool with at most `max_workers` threads.
    /// `0` lets rayon pick (one thread per logical CPU).
    pub fn new(max_workers: usize) -> Result<Self, BlurError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(max_workers)
            .thread_name(|i| format!("frostglass-blur-{}", i))
            .build()?;
        Ok(Self { pool })
    }

    /// Number of threads actually running in the pool.
    pub fn workers(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Run `op` inside this pool; every rayon call it makes uses these threads.
    pub fn install<R, F>(&self, op: F) -> R
    where
        R: Send,
        F: FnOnce() -> R + Send,
    {
        self.pool.install(op)
    }
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("workers", &self.workers())
            .finish()
    }
}

/// Run `op` in `pool` if given, otherwise on the caller's current rayon context.
pub fn install<R, F>(pool: Option<&WorkerPool>, op: F) -> R
where
    R: Send,
    F: FnOnce() -> R + Send,
{
    match pool {
        Some(pool) => pool.install(op),
        None => op(),
    }
}

/// Fork four independent tasks and wait for all of them.
pub fn join4<A, B, C, D, RA, RB, RC, RD>(a: A, b: B, c: C, d: D) -> (RA, RB, RC, RD)
where
    A: FnOnce() -> RA + Send,
    B: FnOnce() -> RB + Send,
    C: FnOnce() -> RC + Send,
    D: FnOnce() -> RD + Send,
    RA: Send,
    RB: Send,
    RC: Send,
    RD: Send,
{
    let ((ra, rb), (rc, rd)) = rayon::join(|| rayon::join(a, b), || rayon::join(c, d));
    (ra, rb, rc, rd)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_respects_worker_cap() {
        let pool = WorkerPool::new(2).unwrap();
        assert_eq!(pool.workers(), 2);
        assert_eq!(pool.install(rayon::current_num_threads), 2);
    }

    #[test]
    fn join4_keeps_result_order() {
        let out = join4(|| 1, || "two", || 3.0, || vec![4]);
        assert_eq!(out, (1, "two", 3.0, vec![4]));
    }
}
