use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

pub type SaveTask = Box<dyn FnOnce() + Send>;

/// Timer seam for the debounced save path. Scheduling replaces any
/// pending task; `cancel` drops it. The production impl sleeps on a
/// thread, the manual impl lets tests fire the task deterministically.
pub trait SaveScheduler: Send {
    fn schedule(&mut self, delay: Duration, task: SaveTask);
    fn cancel(&mut self);
}

/// Thread-backed scheduler. Each schedule arms a new generation; a
/// sleeping task only runs if its generation is still the latest, so a
/// later schedule or a cancel supersedes it.
#[derive(Default)]
pub struct TimerScheduler {
    generation: Arc<AtomicU64>,
}

impl TimerScheduler {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SaveScheduler for TimerScheduler {
    fn schedule(&mut self, delay: Duration, task: SaveTask) {
        let armed = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let generation = Arc::clone(&self.generation);
        thread::spawn(move || {
            thread::sleep(delay);
            if generation.load(Ordering::SeqCst) == armed {
                task();
            }
        });
    }

    fn cancel(&mut self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }
}

/// Test scheduler: holds the latest task until `fire` is called.
/// Cloning shares the slot, so a test can keep a handle while the
/// gateway owns the scheduler.
#[derive(Clone, Default)]
pub struct ManualScheduler {
    inner: Arc<Mutex<ManualInner>>,
}

#[derive(Default)]
struct ManualInner {
    pending: Option<SaveTask>,
    scheduled: u32,
    cancelled: u32,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs the pending task, if any, outside the slot lock.
    pub fn fire(&self) {
        let task = self.inner.lock().pending.take();
        if let Some(task) = task {
            task();
        }
    }

    pub fn has_pending(&self) -> bool {
        self.inner.lock().pending.is_some()
    }

    pub fn scheduled_count(&self) -> u32 {
        self.inner.lock().scheduled
    }

    pub fn cancelled_count(&self) -> u32 {
        self.inner.lock().cancelled
    }
}

impl SaveScheduler for ManualScheduler {
    fn schedule(&mut self, _delay: Duration, task: SaveTask) {
        let mut inner = self.inner.lock();
        inner.pending = Some(task);
        inner.scheduled += 1;
    }

    fn cancel(&mut self) {
        let mut inner = self.inner.lock();
        if inner.pending.take().is_some() {
            inner.cancelled += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicU32;

    #[test]
    fn manual_scheduler_coalesces_to_the_latest_task() {
        let fired = Arc::new(AtomicU32::new(0));
        let mut scheduler = ManualScheduler::new();
        let handle = scheduler.clone();

        for i in 1..=3 {
            let fired = Arc::clone(&fired);
            scheduler.schedule(
                Duration::from_millis(500),
                Box::new(move || fired.store(i, Ordering::SeqCst)),
            );
        }
        assert_eq!(handle.scheduled_count(), 3);
        assert!(handle.has_pending());

        handle.fire();
        assert_eq!(fired.load(Ordering::SeqCst), 3);
        assert!(!handle.has_pending());

        // nothing left to fire
        handle.fire();
        assert_eq!(fired.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn manual_cancel_drops_the_pending_task() {
        let fired = Arc::new(AtomicU32::new(0));
        let mut scheduler = ManualScheduler::new();
        let handle = scheduler.clone();

        let flag = Arc::clone(&fired);
        scheduler.schedule(
            Duration::from_millis(500),
            Box::new(move || {
                flag.fetch_add(1, Ordering::SeqCst);
            }),
        );
        scheduler.cancel();
        assert_eq!(handle.cancelled_count(), 1);

        handle.fire();
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn timer_scheduler_runs_after_the_delay() {
        let fired = Arc::new(AtomicU32::new(0));
        let mut scheduler = TimerScheduler::new();

        let flag = Arc::clone(&fired);
        scheduler.schedule(
            Duration::from_millis(10),
            Box::new(move || {
                flag.fetch_add(1, Ordering::SeqCst);
            }),
        );
        thread::sleep(Duration::from_millis(300));
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn timer_cancel_supersedes_a_sleeping_task() {
        let fired = Arc::new(AtomicU32::new(0));
        let mut scheduler = TimerScheduler::new();

        let flag = Arc::clone(&fired);
        scheduler.schedule(
            Duration::from_millis(50),
            Box::new(move || {
                flag.fetch_add(1, Ordering::SeqCst);
            }),
        );
        scheduler.cancel();
        thread::sleep(Duration::from_millis(300));
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }
}
