//! Global scheduler instance
//!
//! The task table is shared between the tick interrupt and the main
//! loop. Every access happens inside a critical section, and no task
//! body ever runs while the table is borrowed, so tasks may add,
//! delete and modify tasks themselves.

use core::cell::RefCell;
use critical_section::Mutex;

use crate::config::MAX_TASKS;
use crate::drivers::StatusDisplay;
use crate::hal::{Idle, TickTimer};
use crate::log_debug;
use crate::rtos::scheduler::show_status;
use crate::rtos::{Job, Scheduler, SchedulerError, TaskId};

static SCHEDULER: Mutex<RefCell<Scheduler>> = Mutex::new(RefCell::new(Scheduler::new()));

#[inline]
fn with_scheduler<T>(f: impl FnOnce(&mut Scheduler) -> T) -> T {
    critical_section::with(|cs| f(&mut SCHEDULER.borrow_ref_mut(cs)))
}

/// Empty the task table and clear the error status.
/// Call before adding tasks.
pub fn init() {
    with_scheduler(|s| s.init());
}

/// Install the tick hook. Usually called after the periodic tasks are
/// added so they start in step.
pub fn start<T: TickTimer>(tick_rate_ms: u32, timer: &mut T) {
    log_debug!("scheduler start, {} ms tick", tick_rate_ms);
    timer.set_tick_period(tick_rate_ms);
    timer.set_tick_hook(tick);
}

/// Tick hook, called from the timer interrupt.
pub fn tick(_ticks: u32) {
    with_scheduler(|s| s.tick());
}

/// Run due tasks, report status, then sleep until the next interrupt.
/// Call repeatedly from the main loop.
pub fn dispatch<D, I>(ticks: u32, display: &mut D, idle: &mut I)
where
    D: StatusDisplay,
    I: Idle,
{
    dispatch_tasks(ticks);

    if let Some(pattern) = with_scheduler(|s| s.update_status()) {
        show_status(display, pattern);
    }

    nb::block!(idle.wait_for_interrupt()).ok();
}

/// One pass over the table without reporting or idling. Returns how many
/// tasks ran.
pub fn dispatch_tasks(ticks: u32) -> usize {
    let mut ran = 0;
    for index in 0..MAX_TASKS {
        let Some((job, stamp)) = with_scheduler(|s| s.take_due(index)) else {
            continue;
        };

        job.run(ticks);
        with_scheduler(|s| s.retire(index, stamp));
        ran += 1;
    }
    ran
}

pub fn add_task(job: &'static dyn Job, delay: u32, period: u32) -> Result<TaskId, SchedulerError> {
    with_scheduler(|s| s.add_task(job, delay, period))
}

pub fn delete_task(index: TaskId) -> Result<(), SchedulerError> {
    with_scheduler(|s| s.delete_task(index))
}

pub fn modify_task_period(index: TaskId, period: u32) -> Result<(), SchedulerError> {
    with_scheduler(|s| s.modify_task_period(index, period))
}

/// Error currently latched on the status port, if any
pub fn last_error() -> Option<SchedulerError> {
    with_scheduler(|s| s.last_error())
}

pub fn task_count() -> usize {
    with_scheduler(|s| s.task_count())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::NoDisplay;
    use crate::hal::TickHook;
    use crate::rtos::TaskBuilder;
    use core::convert::Infallible;
    use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
    use std::sync::{Mutex as StdMutex, MutexGuard};

    // The scheduler is a process-wide singleton
    static SERIAL: StdMutex<()> = StdMutex::new(());

    fn setup() -> MutexGuard<'static, ()> {
        let guard = SERIAL.lock().unwrap_or_else(|e| e.into_inner());
        init();
        guard
    }

    #[derive(Default)]
    struct MockTimer {
        period_ms: Option<u32>,
        hook: Option<TickHook>,
    }

    impl TickTimer for MockTimer {
        fn set_tick_period(&mut self, ms: u32) {
            self.period_ms = Some(ms);
        }

        fn set_tick_hook(&mut self, hook: TickHook) {
            self.hook = Some(hook);
        }
    }

    struct NoIdle;

    impl Idle for NoIdle {
        fn wait_for_interrupt(&mut self) -> nb::Result<(), Infallible> {
            Ok(())
        }
    }

    fn noop(_ticks: u32) {}

    #[test]
    fn start_registers_tick_hook() {
        let _guard = setup();
        let mut timer = MockTimer::default();
        start(10, &mut timer);
        assert_eq!(timer.period_ms, Some(10));

        static RUNS: AtomicU32 = AtomicU32::new(0);
        fn count(_ticks: u32) {
            RUNS.fetch_add(1, Ordering::SeqCst);
        }

        add_task(&count, 2, 0).unwrap();
        let hook = timer.hook.unwrap();
        hook(1);
        dispatch(1, &mut NoDisplay, &mut NoIdle);
        assert_eq!(RUNS.load(Ordering::SeqCst), 0);
        hook(2);
        dispatch(2, &mut NoDisplay, &mut NoIdle);
        assert_eq!(RUNS.load(Ordering::SeqCst), 1);
        assert_eq!(task_count(), 0);
    }

    #[test]
    fn lifecycle_errors_are_returned() {
        let _guard = setup();
        for _ in 0..MAX_TASKS {
            add_task(&noop, 100, 100).unwrap();
        }
        assert_eq!(add_task(&noop, 1, 1), Err(SchedulerError::TooManyTasks));

        delete_task(0).unwrap();
        assert_eq!(delete_task(0), Err(SchedulerError::CannotDelete));
        assert_eq!(modify_task_period(0, 5), Err(SchedulerError::InvalidSlot));

        init();
        assert_eq!(task_count(), 0);
    }

    #[cfg(feature = "report_errors")]
    #[test]
    fn lifecycle_errors_are_latched() {
        let _guard = setup();
        for _ in 0..MAX_TASKS {
            add_task(&noop, 100, 100).unwrap();
        }
        add_task(&noop, 1, 1).unwrap_err();
        assert_eq!(last_error(), Some(SchedulerError::TooManyTasks));

        delete_task(0).unwrap();
        delete_task(0).unwrap_err();
        assert_eq!(last_error(), Some(SchedulerError::CannotDelete));

        init();
        assert_eq!(last_error(), None);
    }

    #[cfg(not(feature = "report_errors"))]
    #[test]
    fn errors_are_not_latched_without_reporting() {
        let _guard = setup();
        delete_task(3).unwrap_err();
        assert_eq!(last_error(), None);
    }

    #[test]
    fn task_can_delete_another_task_from_its_body() {
        let _guard = setup();

        static VICTIM: AtomicUsize = AtomicUsize::new(usize::MAX);
        static VICTIM_RUNS: AtomicU32 = AtomicU32::new(0);

        fn reaper(_ticks: u32) {
            delete_task(VICTIM.load(Ordering::SeqCst)).unwrap();
        }
        fn victim(_ticks: u32) {
            VICTIM_RUNS.fetch_add(1, Ordering::SeqCst);
        }

        add_task(&reaper, 0, 0).unwrap();
        VICTIM.store(add_task(&victim, 0, 1).unwrap(), Ordering::SeqCst);

        tick(1);
        assert_eq!(dispatch_tasks(1), 1);
        assert_eq!(VICTIM_RUNS.load(Ordering::SeqCst), 0);
        assert_eq!(task_count(), 0);
    }

    #[test]
    fn task_can_reschedule_itself() {
        let _guard = setup();

        static RUNS: AtomicU32 = AtomicU32::new(0);
        fn again(_ticks: u32) {
            if RUNS.fetch_add(1, Ordering::SeqCst) == 0 {
                TaskBuilder::new(&again).delay(3).spawn().unwrap();
            }
        }

        add_task(&again, 0, 0).unwrap();
        for t in 1..=10 {
            tick(t);
            dispatch_tasks(t);
        }
        assert_eq!(RUNS.load(Ordering::SeqCst), 2);
        assert_eq!(task_count(), 0);
    }
}
