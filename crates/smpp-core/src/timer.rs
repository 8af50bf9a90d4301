//! Periodic callback worker driving link keep-alive.
//!
//! Each timer owns one dedicated thread that sleeps on a condition
//! variable and invokes the callback when the wait times out naturally.
//! Two schedules exist:
//!
//! - **fixed-interval**: every `interval`, measured from the previous
//!   firing;
//! - **minute-aligned**: the delay to the next wall-clock minute is
//!   recomputed from UTC before every wait, so the firing instants stay
//!   pinned to minute boundaries no matter how long the callback runs.
//!
//! [`SynchronousTimer::signal`] wakes the worker early without firing
//! the callback: the wake is consumed and the wait restarts. Shutdown
//! sets a flag, signals, and waits a bounded time for the worker to
//! acknowledge; a worker stuck inside a long callback is abandoned
//! rather than blocked on, and the abandonment is logged.
//!
//! A panicking callback is caught and discarded so one failing
//! invocation cannot kill the schedule.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Condvar, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use tracing::warn;

/// How long shutdown waits for the worker's acknowledgment.
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Default)]
struct TimerState {
    signaled: bool,
    shutting_down: bool,
    acknowledged: bool,
}

#[derive(Debug, Default)]
struct Shared {
    state: Mutex<TimerState>,
    wake: Condvar,
}

enum Schedule {
    Fixed(Duration),
    MinuteAligned,
}

impl Schedule {
    /// The wait before the next firing, measured now.
    fn next_delay(&self) -> Duration {
        match self {
            Schedule::Fixed(interval) => *interval,
            Schedule::MinuteAligned => {
                let now_millis = SystemTime::now()
                    .duration_since(UNIX_EPOCH)
                    .unwrap_or_default()
                    .as_millis() as u64;
                Duration::from_millis(millis_until_next_minute(now_millis))
            }
        }
    }
}

/// Milliseconds from `now_millis` (UTC epoch milliseconds) to the next
/// minute boundary. A moment exactly on the boundary waits a full minute.
fn millis_until_next_minute(now_millis: u64) -> u64 {
    60_000 - (now_millis % 60_000)
}

/// A periodic callback worker with an interruptible wait.
///
/// Dropping the timer performs the same bounded shutdown as
/// [`SynchronousTimer::shutdown`].
pub struct SynchronousTimer {
    shared: Arc<Shared>,
    worker: Option<JoinHandle<()>>,
}

impl SynchronousTimer {
    /// Starts a worker firing `callback` every `interval`.
    pub fn start<F>(interval: Duration, callback: F) -> Self
    where
        F: FnMut() + Send + 'static,
    {
        Self::spawn(Schedule::Fixed(interval), callback, "timer-worker")
    }

    /// Starts a worker firing `callback` at every wall-clock minute
    /// boundary, self-correcting for callback execution time.
    pub fn start_minute_aligned<F>(callback: F) -> Self
    where
        F: FnMut() + Send + 'static,
    {
        Self::spawn(Schedule::MinuteAligned, callback, "timer-worker-minute")
    }

    fn spawn<F>(schedule: Schedule, mut callback: F, name: &str) -> Self
    where
        F: FnMut() + Send + 'static,
    {
        let shared = Arc::new(Shared::default());
        let worker_shared = Arc::clone(&shared);

        let worker = thread::Builder::new()
            .name(name.to_string())
            .spawn(move || loop {
                let delay = schedule.next_delay();

                let guard = worker_shared
                    .state
                    .lock()
                    .unwrap_or_else(|e| e.into_inner());
                let (mut state, timeout) = worker_shared
                    .wake
                    .wait_timeout_while(guard, delay, |s| !s.signaled && !s.shutting_down)
                    .unwrap_or_else(|e| e.into_inner());

                if state.shutting_down {
                    state.acknowledged = true;
                    worker_shared.wake.notify_all();
                    return;
                }
                if !timeout.timed_out() {
                    // Woken early by signal(): consume it, skip the
                    // callback, restart the wait.
                    state.signaled = false;
                    continue;
                }
                drop(state);

                if catch_unwind(AssertUnwindSafe(|| callback())).is_err() {
                    warn!("timer callback panicked; schedule continues");
                }
            })
            .expect("spawn timer worker");

        Self {
            shared,
            worker: Some(worker),
        }
    }

    /// Wakes the worker's wait early without firing the callback.
    pub fn signal(&self) {
        let mut state = self.shared.state.lock().unwrap_or_else(|e| e.into_inner());
        state.signaled = true;
        self.shared.wake.notify_all();
    }

    /// Stops the worker, waiting up to a bounded timeout for it to
    /// acknowledge. A worker that does not acknowledge in time (it may
    /// be stuck in a long callback) is abandoned and logged; shutdown
    /// itself never hangs.
    pub fn shutdown(&mut self) {
        {
            let mut state = self.shared.state.lock().unwrap_or_else(|e| e.into_inner());
            if state.shutting_down {
                return;
            }
            state.shutting_down = true;
            self.shared.wake.notify_all();
        }

        let state = self.shared.state.lock().unwrap_or_else(|e| e.into_inner());
        let (state, _) = self
            .shared
            .wake
            .wait_timeout_while(state, SHUTDOWN_TIMEOUT, |s| !s.acknowledged)
            .unwrap_or_else(|e| e.into_inner());

        if state.acknowledged {
            drop(state);
            if let Some(worker) = self.worker.take() {
                let _ = worker.join();
            }
        } else {
            warn!("timer worker did not acknowledge shutdown in time");
            self.worker.take();
        }
    }
}

impl Drop for SynchronousTimer {
    fn drop(&mut self) {
        self.shutdown();
    }
}
