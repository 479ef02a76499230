use crate::config::BackendConfig;
use crate::error::Result;
use crate::field::{Field2, FieldValue};
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::sync::OnceLock;

const PAR_THRESHOLD_DEFAULT: usize = 65_536;
const PAR_MIN_WORK_PER_THREAD: usize = 4096;

fn parallel_threshold_from_env() -> usize {
    static THRESHOLD: OnceLock<usize> = OnceLock::new();
    *THRESHOLD.get_or_init(|| {
        std::env::var("FLUID_PAR_THRESHOLD")
            .ok()
            .and_then(|value| value.parse::<usize>().ok())
            .filter(|value| *value > 0)
            .unwrap_or(PAR_THRESHOLD_DEFAULT)
    })
}

/// Runs a per-cell kernel over every cell of a grid-shaped buffer.
///
/// `dispatch` must not return before every cell has been written: callers
/// rely on it as the barrier between pipeline stages. The kernel only sees
/// its own output cell, so any read it performs must come from buffers other
/// than `cells`.
pub trait ComputeBackend: Send + Sync {
    fn dispatch<T, F>(&self, width: usize, cells: &mut [T], kernel: F)
    where
        T: Send,
        F: Fn(usize, usize, &mut T) + Sync;

    /// Overwrites every cell of `out` with `f(x, y)`.
    fn fill<T, F>(&self, out: &mut Field2<T>, f: F)
    where
        T: FieldValue,
        F: Fn(usize, usize) -> T + Sync,
    {
        let width = out.grid().width();
        self.dispatch(width, out.as_mut_slice(), |x, y, value| *value = f(x, y));
    }

    /// Pointwise in-place update, `f(x, y, old) -> new`.
    fn update<T, F>(&self, field: &mut Field2<T>, f: F)
    where
        T: FieldValue,
        F: Fn(usize, usize, T) -> T + Sync,
    {
        let width = field.grid().width();
        self.dispatch(width, field.as_mut_slice(), |x, y, value| *value = f(x, y, *value));
    }
}

/// Single-threaded backend, mostly for tests and tiny grids.
#[derive(Clone, Copy, Debug, Default)]
pub struct SerialBackend;

impl ComputeBackend for SerialBackend {
    fn dispatch<T, F>(&self, width: usize, cells: &mut [T], kernel: F)
    where
        T: Send,
        F: Fn(usize, usize, &mut T) + Sync,
    {
        for (i, value) in cells.iter_mut().enumerate() {
            kernel(i % width, i / width, value);
        }
    }
}

/// Data-parallel backend on rayon. Uses a dedicated pool when a thread count
/// is configured, the global pool otherwise.
#[derive(Debug)]
pub struct RayonBackend {
    pool: Option<ThreadPool>,
    threshold: usize,
}

impl RayonBackend {
    pub fn new(config: &BackendConfig) -> Result<Self> {
        let pool = match config.threads {
            Some(threads) => Some(
                ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .thread_name(|i| format!("fluid-worker-{i}"))
                    .build()?,
            ),
            None => None,
        };
        let threshold = config
            .parallel_threshold
            .unwrap_or_else(parallel_threshold_from_env);
        let backend = Self { pool, threshold };
        log::info!(
            "rayon backend ready: {} threads, parallel above {} cells",
            backend.num_threads(),
            backend.threshold
        );
        Ok(backend)
    }

    pub fn num_threads(&self) -> usize {
        match &self.pool {
            Some(pool) => pool.current_num_threads(),
            None => rayon::current_num_threads(),
        }
    }

    fn should_parallel(&self, len: usize) -> bool {
        if len < self.threshold {
            return false;
        }
        let threads = self.num_threads().max(1);
        threads > 1 && len / threads >= PAR_MIN_WORK_PER_THREAD
    }
}

impl ComputeBackend for RayonBackend {
    fn dispatch<T, F>(&self, width: usize, cells: &mut [T], kernel: F)
    where
        T: Send,
        F: Fn(usize, usize, &mut T) + Sync,
    {
        if !self.should_parallel(cells.len()) {
            SerialBackend.dispatch(width, cells, kernel);
            return;
        }
        match &self.pool {
            Some(pool) => pool.install(|| par_dispatch(width, cells, &kernel)),
            None => par_dispatch(width, cells, &kernel),
        }
    }
}

fn par_dispatch<T, F>(width: usize, cells: &mut [T], kernel: &F)
where
    T: Send,
    F: Fn(usize, usize, &mut T) + Sync,
{
    cells
        .par_iter_mut()
        .enumerate()
        .for_each(|(i, value)| kernel(i % width, i / width, value));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Grid2;

    fn forced_parallel(threads: usize) -> RayonBackend {
        RayonBackend::new(&BackendConfig {
            threads: Some(threads),
            parallel_threshold: Some(1),
        })
        .expect("thread pool")
    }

    #[test]
    fn serial_fill_visits_every_cell() {
        let grid = Grid2::new(4, 3);
        let mut field = Field2::<f32>::zeros(grid);
        SerialBackend.fill(&mut field, |x, y| (x + y * 4) as f32);
        for (i, value) in field.iter().enumerate() {
            assert_eq!(*value, i as f32);
        }
    }

    #[test]
    fn rayon_matches_serial() {
        let grid = Grid2::new(130, 129);
        let backend = forced_parallel(4);
        let mut serial = Field2::<f32>::zeros(grid);
        let mut parallel = Field2::<f32>::zeros(grid);
        SerialBackend.fill(&mut serial, |x, y| (x * 3) as f32 - y as f32);
        backend.fill(&mut parallel, |x, y| (x * 3) as f32 - y as f32);
        assert_eq!(serial, parallel);
    }

    #[test]
    fn update_receives_previous_value() {
        let grid = Grid2::new(3, 3);
        let mut field = Field2::new(grid, 2.0_f32);
        forced_parallel(2).update(&mut field, |x, _y, value| value * x as f32);
        assert_eq!(field.get(0, 1), 0.0);
        assert_eq!(field.get(2, 2), 4.0);
    }

    #[test]
    fn small_workloads_stay_serial() {
        let backend = RayonBackend::new(&BackendConfig {
            threads: Some(2),
            parallel_threshold: None,
        })
        .expect("thread pool");
        assert!(!backend.should_parallel(16));
    }
}
