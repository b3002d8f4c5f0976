//! Bounded worker pool.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use rayon::ThreadPoolBuilder;

use crate::errors::OrchestrationError;

/// Run `tasks` on a pool of `workers` threads and wait for all of them.
///
/// Results come back in task order. Returning is the join barrier: no
/// result is visible before every task has finished.
pub fn execute_tasks<T, F>(tasks: Vec<F>, workers: usize) -> Result<Vec<T>, OrchestrationError>
where
    T: Send,
    F: FnOnce() -> T + Send,
{
    let pool = ThreadPoolBuilder::new()
        .num_threads(workers.max(1))
        .thread_name(|i| format!("resoscan-worker-{i}"))
        .build()
        .map_err(|e| OrchestrationError::Pool(e.to_string()))?;

    Ok(pool.install(|| {
        use rayon::iter::{IntoParallelIterator, ParallelIterator};
        tasks.into_par_iter().map(|task| task()).collect()
    }))
}

/// Run `f`, turning a panic into its message.
pub fn isolate<T>(f: impl FnOnce() -> T) -> Result<T, String> {
    panic::catch_unwind(AssertUnwindSafe(f)).map_err(panic_message)
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[test]
    fn results_in_task_order() {
        let tasks: Vec<_> = (0..20).map(|i| move || i * 2).collect();
        let results = execute_tasks(tasks, 4).unwrap();
        assert_eq!(results, (0..20).map(|i| i * 2).collect::<Vec<_>>());
    }

    #[test]
    fn concurrency_is_bounded() {
        let active = AtomicUsize::new(0);
        let peak = AtomicUsize::new(0);
        let (active_ref, peak_ref) = (&active, &peak);
        let tasks: Vec<_> = (0..12)
            .map(|_| {
                move || {
                    let now = active_ref.fetch_add(1, Ordering::SeqCst) + 1;
                    peak_ref.fetch_max(now, Ordering::SeqCst);
                    std::thread::sleep(Duration::from_millis(10));
                    active_ref.fetch_sub(1, Ordering::SeqCst);
                }
            })
            .collect();
        execute_tasks(tasks, 3).unwrap();
        assert!(peak.load(Ordering::SeqCst) <= 3);
        assert_eq!(active.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn isolate_catches_panics() {
        assert_eq!(isolate(|| 7), Ok(7));
        let err = isolate(|| -> i32 { panic!("bad input {}", 3) }).unwrap_err();
        assert_eq!(err, "bad input 3");
        let err = isolate(|| -> i32 { panic!("static") }).unwrap_err();
        assert_eq!(err, "static");
    }

    #[test]
    fn zero_workers_still_runs() {
        let results = execute_tasks(vec![|| 1], 0).unwrap();
        assert_eq!(results, [1]);
    }
}
